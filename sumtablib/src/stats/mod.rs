//! Statistics: compute summary values and format them for table cells.
//!
//! This module is the first stage of the pipeline. It provides:
//!
//! - **Formatting**: rounding, placeholders, markup-aware symbols (`format`)
//! - **Summaries**: `mean_sd`, `median_iqr`, `n_perc`, `mean_ci`, ... (`summary`)
//! - **Distributions**: type-7 quantiles and Student's t (`quantile`, `tdist`)
//!
//! ## Example
//!
//! ```rust
//! use sumtablib::stats::mean_sd;
//! use sumtablib::FormatOptions;
//!
//! let mpg = [Some(21.0), Some(22.8), Some(21.0), Some(18.7)];
//! let result = mean_sd(&mpg, &FormatOptions::default()).unwrap();
//! assert_eq!(result.formatted(), "20.88 ± 1.68");
//! ```

pub mod format;
pub mod quantile;
pub mod summary;
pub mod tdist;

pub use format::{format_count, format_mean_ci, format_number, format_percent, frmt};
pub use quantile::{quantile, quantile_sorted};
pub use summary::{
    count, count_column, gmean_sd, level_matches, maximum, mean, mean_ci, mean_sd, mean_se,
    median, median_iqr, minimum, n_perc, n_perc0, n_perc_level, scalar, Level, StatisticResult,
};
pub use tdist::{t_cdf, t_quantile};

//! # sumtablib
//!
//! Publication-style summary tables: formatted descriptive statistics over
//! tabular data, optionally grouped, rendered as markdown, LaTeX or text.
//!
//! ## Overview
//!
//! The library is a small pipeline:
//!
//! - **Statistics**: `mean_sd`, `median_iqr`, `n_perc`, `mean_ci`, ... each
//!   returning numeric components and a formatted string
//! - **Specs**: row-groups of labelled expressions, hand-written or inferred
//!   from column types with `qsummary`
//! - **Tables**: a spec evaluated against every group of a dataset
//! - **Rendering**: markdown pipe tables, LaTeX tabular, padded plain text
//!
//! Formatting is controlled by an explicit [`FormatOptions`] value passed to
//! every call. Cells are plain strings once formatted.
//!
//! ## Example
//!
//! ```rust
//! use sumtablib::{
//!     build_table, render, Column, Dataset, Expression, FormatOptions, Grouping, Level,
//!     Markup, RenderOptions, RowGroup, SummarySpec,
//! };
//!
//! let data = Dataset::new()
//!     .with_column("arm", Column::categorical([Some("a"), Some("a"), Some("b"), Some("b")]))?
//!     .with_column("mpg", Column::numeric([21.0, 22.8, 21.0, 18.7]))?
//!     .with_column("vs", Column::boolean([true, true, false, false]))?;
//!
//! let spec = SummarySpec::new()
//!     .with_row_group(
//!         RowGroup::new("Miles Per Gallon")
//!             .with_row("mean (sd)", Expression::mean_sd("mpg"))?
//!             .with_row("median (IQR)", Expression::median_iqr("mpg"))?,
//!     )?
//!     .with_row_group(
//!         RowGroup::new("Straight engine").with_row("yes", Expression::n_perc("vs", Level::True))?,
//!     )?;
//!
//! let opts = FormatOptions::default().with_digits(1);
//! let grouping = Grouping::by(&data, &["arm"])?;
//! let grid = build_table(&data, Some(&grouping), &spec, &opts)?;
//! assert_eq!(grid.cell("Straight engine", "yes", "b"), Some("0 (0.0%)"));
//!
//! let markdown = render(&grid, Markup::Markdown, &RenderOptions::new().with_show_n(true))?;
//! assert!(markdown.contains("a (N = 2)"));
//! # Ok::<(), sumtablib::SummaryError>(())
//! ```

pub mod data;
pub mod error;
pub mod options;
pub mod output;
pub mod query;
pub mod stats;

pub use data::{Column, ColumnKind, Dataset, Group, Grouping};
pub use error::SummaryError;
pub use options::{CiStyle, DegeneratePolicy, FormatOptions, Markup, SdStyle, ShowN};
pub use output::{build_table, render, RenderOptions, RowGroupLayout, TableGrid, TableRow};
pub use query::{
    infer_summary, qsummary, BoundExpression, Entry, Expression, RowGroup, Stat, SummaryRow,
    SummarySpec,
};
pub use stats::{Level, StatisticResult};

/// Result type for sumtablib operations
pub type Result<T> = std::result::Result<T, SummaryError>;

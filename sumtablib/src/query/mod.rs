//! Query building: describe what each table row computes.
//!
//! This module is the second stage of the pipeline. It provides:
//!
//! - **Expressions**: a statistic plus the column it reads (`Expression`,
//!   `BoundExpression`, `Entry`)
//! - **Specs**: ordered row-groups of labelled entries (`SummarySpec`,
//!   `RowGroup`), hand-written or inferred with `infer_summary`/`qsummary`
//!
//! ## Example
//!
//! ```rust
//! use sumtablib::query::{Expression, RowGroup, SummarySpec};
//!
//! let mpg = RowGroup::new("Miles Per Gallon")
//!     .with_row("mean (sd)", Expression::mean_sd("mpg"))?
//!     .with_row("median (IQR)", Expression::median_iqr("mpg"))?;
//! let spec = SummarySpec::new().with_row_group(mpg)?;
//! assert_eq!(spec.n_rows(), 2);
//! # Ok::<(), sumtablib::SummaryError>(())
//! ```

pub mod expr;
pub mod spec;

pub use expr::{BoundExpression, Entry, Expression, Stat};
pub use spec::{infer_summary, qsummary, RowGroup, SummaryRow, SummarySpec};

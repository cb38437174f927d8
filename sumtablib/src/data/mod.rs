//! Data: in-memory datasets and their partition into groups.
//!
//! This module holds the pipeline's input. It provides:
//!
//! - **Dataset**: ordered, named, equal-length columns (`Column`)
//! - **Grouping**: row subsets keyed by the values of grouping columns
//!
//! Loading from files is left to callers; the `sumtab` binary reads CSV.

pub mod dataset;
pub mod grouping;

pub use dataset::{Column, ColumnKind, Dataset};
pub use grouping::{Group, Grouping, MISSING_KEY_LABEL, OVERALL_LABEL};

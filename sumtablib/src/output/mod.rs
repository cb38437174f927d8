//! Output: assemble and present summary tables.
//!
//! This module is the final stage of the pipeline. It provides:
//!
//! - **TableGrid**: formatted strings, one column per group, built by
//!   `build_table` and combined with `cbind`/`rbind`
//! - **Rendering**: markdown, LaTeX and plain-text serialization (`render`)
//!
//! TableGrid holds strings only. All computation happens when it is built.
//!
//! ## Example
//!
//! ```rust
//! use sumtablib::data::{Column, Dataset, Grouping};
//! use sumtablib::output::{build_table, render, RenderOptions};
//! use sumtablib::query::qsummary;
//! use sumtablib::{FormatOptions, Markup};
//!
//! let data = Dataset::new()
//!     .with_column("mpg", Column::numeric([21.0, 22.8, 21.0, 18.7]))?
//!     .with_column("am", Column::categorical([Some("manual"), Some("manual"), Some("auto"), Some("auto")]))?;
//! let grouping = Grouping::by(&data, &["am"])?;
//! let spec = qsummary(&data, &["am"]);
//! let grid = build_table(&data, Some(&grouping), &spec, &FormatOptions::default())?;
//! assert_eq!(grid.headers, vec!["auto", "manual"]);
//!
//! let text = render(&grid, Markup::Markdown, &RenderOptions::new())?;
//! assert!(text.contains("**mpg**"));
//! # Ok::<(), sumtablib::SummaryError>(())
//! ```

pub mod render;
pub mod table;

pub use render::{escape_latex, render, RenderOptions, RowGroupLayout};
pub use table::{build_table, TableGrid, TableRow};

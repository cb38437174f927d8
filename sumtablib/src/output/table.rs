//! Table assembly: evaluate a summary spec against every group.
//!
//! The data flow is:
//! 1. Dataset and optional Grouping
//! 2. SummarySpec (what each row computes)
//! 3. TableGrid (formatted strings, one column per group)
//!
//! TableGrid is a pure presentation structure - it holds strings only. It can
//! be renamed and concatenated with other grids, then rendered or serialized
//! to JSON.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::dataset::Dataset;
use crate::data::grouping::Grouping;
use crate::error::SummaryError;
use crate::options::{FormatOptions, Markup};
use crate::query::expr::Entry;
use crate::query::spec::SummarySpec;
use crate::Result;

/// Group label used in errors raised before any group is evaluated.
const ALL_GROUPS: &str = "all groups";

/// A single row of the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Label of the row-group this row belongs to
    pub row_group: String,
    /// Row label ("mean (sd)", a level name, ...)
    pub label: String,
    /// One formatted cell per column
    pub values: Vec<String>,
}

/// Assembled summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableGrid {
    /// Column headers, one per group
    pub headers: Vec<String>,
    /// Number of rows summarised in each column
    pub group_sizes: Vec<usize>,
    /// Rows in spec order
    pub rows: Vec<TableRow>,
    /// Markup the cells were formatted for
    pub markup: Markup,
}

impl TableGrid {
    /// Number of value columns
    pub fn n_columns(&self) -> usize {
        self.headers.len()
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Row-group labels in order of first appearance
    pub fn row_groups(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for row in &self.rows {
            if labels.last() != Some(&row.row_group.as_str()) {
                labels.push(&row.row_group);
            }
        }
        labels
    }

    /// Look up a single cell
    pub fn cell(&self, row_group: &str, label: &str, column: &str) -> Option<&str> {
        let col = self.headers.iter().position(|h| h == column)?;
        self.rows
            .iter()
            .find(|r| r.row_group == row_group && r.label == label)
            .and_then(|r| r.values.get(col))
            .map(String::as_str)
    }

    /// Replace the column headers. `names` must have one entry per column.
    pub fn with_column_names<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self> {
        if names.len() != self.headers.len() {
            return Err(SummaryError::shape(
                "column names",
                self.headers.len(),
                names.len(),
            ));
        }
        self.headers = names.iter().map(|n| n.as_ref().to_string()).collect();
        Ok(self)
    }

    /// Place `other`'s columns to the right of this grid's.
    ///
    /// Both grids must have the same row-groups and rows in the same order.
    pub fn cbind(mut self, other: TableGrid) -> Result<Self> {
        if self.rows.len() != other.rows.len() {
            return Err(SummaryError::shape(
                "column-wise concatenation",
                self.rows.len(),
                other.rows.len(),
            ));
        }
        if let Some(idx) = self
            .rows
            .iter()
            .zip(&other.rows)
            .position(|(a, b)| a.row_group != b.row_group || a.label != b.label)
        {
            return Err(SummaryError::ShapeMismatch {
                context: format!(
                    "column-wise concatenation: row {} is '{} / {}' on the left but '{} / {}' on the right",
                    idx + 1,
                    self.rows[idx].row_group,
                    self.rows[idx].label,
                    other.rows[idx].row_group,
                    other.rows[idx].label
                ),
                expected: self.rows.len(),
                actual: idx,
            });
        }
        check_markup(self.markup, other.markup)?;

        for (row, extra) in self.rows.iter_mut().zip(other.rows) {
            row.values.extend(extra.values);
        }
        self.headers.extend(other.headers);
        self.group_sizes.extend(other.group_sizes);
        Ok(self)
    }

    /// Append `other`'s rows below this grid's.
    ///
    /// Both grids must have the same number of columns; headers and group
    /// sizes of `self` are kept. A `(row-group, row)` pair present in both
    /// grids is rejected.
    pub fn rbind(mut self, other: TableGrid) -> Result<Self> {
        if self.headers.len() != other.headers.len() {
            return Err(SummaryError::shape(
                "row-wise concatenation",
                self.headers.len(),
                other.headers.len(),
            ));
        }
        check_markup(self.markup, other.markup)?;
        if let Some(dup) = other.rows.iter().find(|r| {
            self.rows
                .iter()
                .any(|s| s.row_group == r.row_group && s.label == r.label)
        }) {
            return Err(SummaryError::invalid(format!(
                "row '{}' in '{}' is present in both tables",
                dup.label, dup.row_group
            )));
        }
        self.rows.extend(other.rows);
        Ok(self)
    }
}

fn check_markup(left: Markup, right: Markup) -> Result<()> {
    if left != right {
        return Err(SummaryError::invalid(format!(
            "cannot combine tables formatted for {:?} and {:?}",
            left, right
        )));
    }
    Ok(())
}

/// Evaluate `spec` against every group and lay the results out as a grid.
///
/// Without a grouping the table has a single `Overall` column.
pub fn build_table(
    dataset: &Dataset,
    grouping: Option<&Grouping>,
    spec: &SummarySpec,
    opts: &FormatOptions,
) -> Result<TableGrid> {
    let overall;
    let grouping = match grouping {
        Some(g) => g,
        None => {
            overall = Grouping::overall(dataset);
            &overall
        }
    };

    // A grouping built from another dataset may point past the last row.
    let row_bound = grouping
        .groups
        .iter()
        .flat_map(|g| g.rows.iter())
        .max()
        .map_or(0, |&max| max + 1);
    if row_bound > dataset.n_rows() {
        return Err(SummaryError::shape(
            "grouping rows",
            dataset.n_rows(),
            row_bound,
        ));
    }

    // Every deferred reference must resolve before anything is computed.
    for (row_group, row) in spec.rows() {
        if let Entry::Deferred(expr) = &row.entry {
            if !dataset.has_column(&expr.column) {
                return Err(SummaryError::Evaluation {
                    row_group: row_group.label().to_string(),
                    row: row.label.clone(),
                    group: ALL_GROUPS.to_string(),
                    source: Box::new(SummaryError::UnresolvedReference {
                        column: expr.column.clone(),
                    }),
                });
            }
        }
    }

    let mut rows: Vec<TableRow> = spec
        .rows()
        .map(|(row_group, row)| TableRow {
            row_group: row_group.label().to_string(),
            label: row.label.clone(),
            values: Vec::with_capacity(grouping.len()),
        })
        .collect();

    for group in &grouping.groups {
        let subset = dataset.subset(&group.rows);
        for ((row_group, row), out) in spec.rows().zip(rows.iter_mut()) {
            let result =
                row.entry
                    .evaluate(&subset, opts)
                    .map_err(|e| SummaryError::Evaluation {
                        row_group: row_group.label().to_string(),
                        row: row.label.clone(),
                        group: group.label.clone(),
                        source: Box::new(e),
                    })?;
            out.values.push(result.formatted().to_string());
        }
    }

    debug!(
        columns = grouping.len(),
        rows = rows.len(),
        markup = ?opts.markup,
        "assembled summary table"
    );

    Ok(TableGrid {
        headers: grouping.labels(),
        group_sizes: grouping.groups.iter().map(|g| g.len()).collect(),
        rows,
        markup: opts.markup,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::data::dataset::Column;
    use crate::query::expr::Expression;
    use crate::query::spec::RowGroup;
    use crate::stats::summary::Level;
    use proptest::prelude::*;

    fn row_strategy() -> impl Strategy<Value = Vec<(f64, bool)>> {
        proptest::collection::vec((-500.0_f64..500.0, any::<bool>()), 2..40)
    }

    fn dataset(rows: &[(f64, bool)]) -> Dataset {
        Dataset::new()
            .with_column("x", Column::numeric(rows.iter().map(|r| r.0)))
            .unwrap()
            .with_column("flag", Column::boolean(rows.iter().map(|r| r.1)))
            .unwrap()
    }

    fn spec() -> SummarySpec {
        SummarySpec::new()
            .with_row_group(
                RowGroup::new("x")
                    .with_row("mean (sd)", Expression::mean_sd("x"))
                    .unwrap()
                    .with_row("median (IQR)", Expression::median_iqr("x"))
                    .unwrap()
                    .with_row("flagged", Expression::n_perc("flag", Level::True))
                    .unwrap(),
            )
            .unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn ungrouped_matches_single_group(rows in row_strategy()) {
            let data = dataset(&rows);
            let opts = FormatOptions::default();
            let implicit = build_table(&data, None, &spec(), &opts).unwrap();
            let single = Grouping::single(&data, "Overall");
            let explicit = build_table(&data, Some(&single), &spec(), &opts).unwrap();
            prop_assert_eq!(implicit, explicit);
        }

        #[test]
        fn grouped_columns_partition_rows(rows in row_strategy()) {
            let data = dataset(&rows);
            let grouping = Grouping::by(&data, &["flag"]).unwrap();
            let spec = SummarySpec::new()
                .with_row_group(RowGroup::new("x").with_row("n", Expression::count("x")).unwrap())
                .unwrap();
            let grid = build_table(&data, Some(&grouping), &spec, &FormatOptions::default()).unwrap();

            let total: usize = grid.rows[0].values.iter().map(|v| v.parse::<usize>().unwrap()).sum();
            prop_assert_eq!(total, rows.len());
            prop_assert_eq!(grid.group_sizes.iter().sum::<usize>(), rows.len());
        }
    }
}

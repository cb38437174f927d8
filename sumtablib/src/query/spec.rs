//! Summary specs: ordered row-groups of labelled entries.
//!
//! A [`SummarySpec`] is the nested `row-group -> row label -> entry` mapping
//! the table assembler walks. Both levels keep insertion order and reject
//! duplicate labels.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::expr::{Entry, Expression};
use crate::data::dataset::{Column, Dataset};
use crate::error::SummaryError;
use crate::stats::summary::Level;
use crate::Result;

/// One labelled row of a summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub entry: Entry,
}

/// A named cluster of rows rendered under one header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowGroup {
    label: String,
    rows: Vec<SummaryRow>,
}

impl RowGroup {
    /// Empty row-group
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            rows: Vec::new(),
        }
    }

    /// Builder: append a row.
    pub fn with_row(mut self, label: impl Into<String>, entry: impl Into<Entry>) -> Result<Self> {
        self.push(label, entry)?;
        Ok(self)
    }

    /// Builder: change the row-group label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Append a row. Fails if the label is already used.
    pub fn push(&mut self, label: impl Into<String>, entry: impl Into<Entry>) -> Result<()> {
        let label = label.into();
        if self.contains(&label) {
            return Err(SummaryError::invalid(format!(
                "duplicate row label '{}' in '{}'",
                label, self.label
            )));
        }
        self.rows.push(SummaryRow {
            label,
            entry: entry.into(),
        });
        Ok(())
    }

    /// Append every row of `other`, keeping this group's label.
    pub fn append(&mut self, other: RowGroup) -> Result<()> {
        if let Some(dup) = other.rows.iter().find(|r| self.contains(&r.label)) {
            return Err(SummaryError::invalid(format!(
                "duplicate row label '{}' in '{}'",
                dup.label, self.label
            )));
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Put the rows in the order given. `labels` must name every row once.
    pub fn reorder<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<()> {
        if labels.len() != self.rows.len() {
            return Err(SummaryError::shape(
                format!("reorder of '{}'", self.label),
                self.rows.len(),
                labels.len(),
            ));
        }
        self.select(labels)
    }

    /// Keep only the named rows, in the order given.
    pub fn select<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<()> {
        for (i, label) in labels.iter().enumerate() {
            let label = label.as_ref();
            if !self.contains(label) {
                return Err(SummaryError::invalid(format!(
                    "no row '{}' in '{}'",
                    label, self.label
                )));
            }
            if labels[..i].iter().any(|l| l.as_ref() == label) {
                return Err(SummaryError::invalid(format!(
                    "row '{}' selected twice",
                    label
                )));
            }
        }
        let mut remaining = std::mem::take(&mut self.rows);
        self.rows = labels
            .iter()
            .filter_map(|label| {
                let idx = remaining.iter().position(|r| r.label == label.as_ref())?;
                Some(remaining.swap_remove(idx))
            })
            .collect();
        Ok(())
    }

    /// Keep the rows for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&SummaryRow) -> bool) {
        self.rows.retain(|r| keep(r));
    }

    /// Rename one row.
    pub fn rename(&mut self, from: &str, to: impl Into<String>) -> Result<()> {
        let to = to.into();
        if from != to && self.contains(&to) {
            return Err(SummaryError::invalid(format!(
                "duplicate row label '{}' in '{}'",
                to, self.label
            )));
        }
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.label == from)
            .ok_or_else(|| SummaryError::invalid(format!("no row '{}' in '{}'", from, self.label)))?;
        row.label = to;
        Ok(())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether a row with this label exists
    pub fn contains(&self, label: &str) -> bool {
        self.rows.iter().any(|r| r.label == label)
    }

    /// Look up a row by label
    pub fn row(&self, label: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Rows in order
    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Row labels in order
    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Ordered row-groups making up a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummarySpec {
    row_groups: Vec<RowGroup>,
}

impl SummarySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append a row-group.
    pub fn with_row_group(mut self, group: RowGroup) -> Result<Self> {
        self.push(group)?;
        Ok(self)
    }

    /// Append a row-group. Fails if the label is already used.
    pub fn push(&mut self, group: RowGroup) -> Result<()> {
        if self.row_groups.iter().any(|g| g.label == group.label) {
            return Err(SummaryError::invalid(format!(
                "duplicate row-group label '{}'",
                group.label
            )));
        }
        self.row_groups.push(group);
        Ok(())
    }

    /// Row-groups in order
    pub fn row_groups(&self) -> &[RowGroup] {
        &self.row_groups
    }

    /// Look up a row-group by label
    pub fn row_group(&self, label: &str) -> Option<&RowGroup> {
        self.row_groups.iter().find(|g| g.label == label)
    }

    /// Mutable access to a row-group, for in-place edits.
    pub fn row_group_mut(&mut self, label: &str) -> Option<&mut RowGroup> {
        self.row_groups.iter_mut().find(|g| g.label == label)
    }

    /// Rename a row-group. Fails if `to` is taken by another row-group.
    pub fn rename_row_group(&mut self, from: &str, to: impl Into<String>) -> Result<()> {
        let to = to.into();
        if from != to && self.row_groups.iter().any(|g| g.label == to) {
            return Err(SummaryError::invalid(format!(
                "duplicate row-group label '{}'",
                to
            )));
        }
        let group = self
            .row_group_mut(from)
            .ok_or_else(|| SummaryError::invalid(format!("no row-group '{}'", from)))?;
        group.label = to;
        Ok(())
    }

    /// Remove a row-group, returning it
    pub fn remove(&mut self, label: &str) -> Option<RowGroup> {
        let idx = self.row_groups.iter().position(|g| g.label == label)?;
        Some(self.row_groups.remove(idx))
    }

    /// Every `(row-group, row)` pair in rendering order
    pub fn rows(&self) -> impl Iterator<Item = (&RowGroup, &SummaryRow)> {
        self.row_groups
            .iter()
            .flat_map(|g| g.rows.iter().map(move |r| (g, r)))
    }

    /// Total number of rows across row-groups
    pub fn n_rows(&self) -> usize {
        self.row_groups.iter().map(RowGroup::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }
}

/// Default rows for one column, labelled with the column name.
///
/// - numeric: `minimum`, `median (IQR)`, `mean (sd)`, `maximum`
/// - categorical: one count/percentage row per level, in level order
/// - boolean: `TRUE`, `FALSE`
pub fn infer_summary(name: &str, column: &Column) -> RowGroup {
    let rows: Vec<(String, Expression)> = match column {
        Column::Numeric(_) => vec![
            ("minimum".to_string(), Expression::minimum(name)),
            ("median (IQR)".to_string(), Expression::median_iqr(name)),
            ("mean (sd)".to_string(), Expression::mean_sd(name)),
            ("maximum".to_string(), Expression::maximum(name)),
        ],
        Column::Categorical { levels, .. } => levels
            .iter()
            .map(|level| (level.clone(), Expression::n_perc(name, Level::label(level.clone()))))
            .collect(),
        Column::Boolean(_) => vec![
            ("TRUE".to_string(), Expression::n_perc(name, Level::True)),
            ("FALSE".to_string(), Expression::n_perc(name, Level::False)),
        ],
    };
    // Levels are unique, so labels are too.
    RowGroup {
        label: name.to_string(),
        rows: rows
            .into_iter()
            .map(|(label, expr)| SummaryRow {
                label,
                entry: Entry::Deferred(expr),
            })
            .collect(),
    }
}

/// Spec with one inferred row-group per dataset column not in `exclude`.
pub fn qsummary<S: AsRef<str>>(dataset: &Dataset, exclude: &[S]) -> SummarySpec {
    let row_groups: Vec<RowGroup> = dataset
        .columns()
        .filter(|(name, _)| !exclude.iter().any(|e| e.as_ref() == *name))
        .map(|(name, column)| infer_summary(name, column))
        .collect();
    debug!(row_groups = row_groups.len(), "inferred summary spec");
    // Dataset column names are unique.
    SummarySpec { row_groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::expr::Stat;

    fn cars() -> Dataset {
        Dataset::new()
            .with_column("mpg", Column::numeric([21.0, 22.8, 21.0, 18.7]))
            .unwrap()
            .with_column(
                "am",
                Column::categorical([Some("manual"), Some("manual"), Some("auto"), None]),
            )
            .unwrap()
            .with_column("vs", Column::boolean([false, true, true, false]))
            .unwrap()
    }

    #[test]
    fn test_infer_numeric_rows() {
        let group = infer_summary("mpg", cars().column("mpg").unwrap());
        assert_eq!(group.label(), "mpg");
        assert_eq!(
            group.labels(),
            vec!["minimum", "median (IQR)", "mean (sd)", "maximum"]
        );
        assert_eq!(group.row("mean (sd)").unwrap().entry.stat(), &Stat::MeanSd);
    }

    #[test]
    fn test_infer_categorical_rows_in_level_order() {
        let group = infer_summary("am", cars().column("am").unwrap());
        assert_eq!(group.labels(), vec!["auto", "manual"]);
        assert_eq!(
            group.row("manual").unwrap().entry.stat(),
            &Stat::NPerc(Level::label("manual"))
        );
    }

    #[test]
    fn test_infer_boolean_rows() {
        let group = infer_summary("vs", cars().column("vs").unwrap());
        assert_eq!(group.labels(), vec!["TRUE", "FALSE"]);
    }

    #[test]
    fn test_qsummary_excludes_columns() {
        let spec = qsummary(&cars(), &["am"]);
        let labels: Vec<&str> = spec.row_groups().iter().map(RowGroup::label).collect();
        assert_eq!(labels, vec!["mpg", "vs"]);
        assert_eq!(spec.n_rows(), 6);
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let group = RowGroup::new("Miles Per Gallon")
            .with_row("mean", Expression::mean("mpg"))
            .unwrap();
        let err = group
            .clone()
            .with_row("mean", Expression::median("mpg"))
            .unwrap_err();
        assert!(matches!(err, SummaryError::InvalidInput(_)));

        let spec = SummarySpec::new().with_row_group(group.clone()).unwrap();
        assert!(spec.with_row_group(group).is_err());
    }

    #[test]
    fn test_rename_row_group_keeps_labels_unique() {
        let mut spec = qsummary(&cars(), &["am"]);
        spec.rename_row_group("mpg", "Miles Per Gallon").unwrap();
        assert!(spec.row_group("mpg").is_none());
        assert_eq!(spec.row_group("Miles Per Gallon").unwrap().len(), 4);

        let err = spec.rename_row_group("vs", "Miles Per Gallon").unwrap_err();
        assert!(matches!(err, SummaryError::InvalidInput(_)));
        assert!(spec.rename_row_group("hp", "Horsepower").is_err());
        spec.rename_row_group("vs", "vs").unwrap();

        let labels: Vec<&str> = spec.row_groups().iter().map(RowGroup::label).collect();
        assert_eq!(labels, vec!["Miles Per Gallon", "vs"]);
    }

    #[test]
    fn test_reorder_select_rename() {
        let mut group = infer_summary("mpg", cars().column("mpg").unwrap());
        group
            .reorder(&["mean (sd)", "median (IQR)", "minimum", "maximum"])
            .unwrap();
        assert_eq!(group.labels()[0], "mean (sd)");
        assert!(group.reorder(&["mean (sd)"]).is_err());

        group.select(&["maximum", "minimum"]).unwrap();
        assert_eq!(group.labels(), vec!["maximum", "minimum"]);
        assert!(group.select(&["median (IQR)"]).is_err());
        assert_eq!(group.len(), 2);

        group.rename("maximum", "max").unwrap();
        assert!(group.rename("minimum", "max").is_err());
        assert!(group.rename("nope", "x").is_err());
        assert_eq!(group.labels(), vec!["max", "minimum"]);
    }

    #[test]
    fn test_append_and_retain() {
        let mut group = infer_summary("mpg", cars().column("mpg").unwrap());
        let extra = RowGroup::new("extra")
            .with_row("mean (95% CI)", Expression::mean_ci("mpg"))
            .unwrap();
        group.append(extra).unwrap();
        assert_eq!(group.len(), 5);
        assert!(group
            .append(RowGroup::new("again").with_row("minimum", Expression::minimum("mpg")).unwrap())
            .is_err());

        group.retain(|row| row.entry.stat() != &Stat::Minimum);
        assert_eq!(group.len(), 4);
        assert!(!group.contains("minimum"));
    }

    #[test]
    fn test_spec_rows_iterate_in_order() {
        let spec = qsummary(&cars(), &["mpg"]);
        let pairs: Vec<(&str, &str)> = spec
            .rows()
            .map(|(g, r)| (g.label(), r.label.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("am", "auto"), ("am", "manual"), ("vs", "TRUE"), ("vs", "FALSE")]
        );
    }
}

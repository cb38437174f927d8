//! Partitioning a dataset into groups by categorical columns.
//!
//! Groups are the distinct observed combinations of the grouping columns'
//! values. Ordering is lexicographic over per-column key ranks:
//!
//! - categorical: level order
//! - boolean: FALSE before TRUE
//! - numeric: ascending value
//! - missing: after every present value, labelled `NA`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::dataset::{Column, Dataset};
use crate::error::SummaryError;
use crate::Result;

/// Label of the single group used when no grouping is requested.
pub const OVERALL_LABEL: &str = "Overall";

/// Label of a missing grouping key.
pub const MISSING_KEY_LABEL: &str = "NA";

/// One subset of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Display label ("4", "auto / 1", "Overall")
    pub label: String,
    /// Per-grouping-column key labels
    pub keys: Vec<String>,
    /// Row indices into the source dataset, ascending
    pub rows: Vec<usize>,
}

impl Group {
    /// Number of rows in the group
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the group has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An ordered partition of a dataset's rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grouping {
    /// Grouping column names (empty for the overall grouping)
    pub by: Vec<String>,
    /// Groups in display order
    pub groups: Vec<Group>,
}

impl Grouping {
    /// A single group containing every row.
    pub fn overall(dataset: &Dataset) -> Self {
        Self::single(dataset, OVERALL_LABEL)
    }

    /// A single all-inclusive group with a custom label.
    pub fn single(dataset: &Dataset, label: impl Into<String>) -> Self {
        Grouping {
            by: Vec::new(),
            groups: vec![Group {
                label: label.into(),
                keys: Vec::new(),
                rows: (0..dataset.n_rows()).collect(),
            }],
        }
    }

    /// Group rows by the distinct value combinations of `columns`.
    pub fn by<S: AsRef<str>>(dataset: &Dataset, columns: &[S]) -> Result<Self> {
        if columns.is_empty() {
            return Err(SummaryError::invalid("grouping needs at least one column"));
        }

        let keyed: Vec<(Vec<usize>, Vec<String>)> = columns
            .iter()
            .map(|name| dataset.column(name.as_ref()).map(key_ranks))
            .collect::<Result<_>>()?;

        let mut buckets: BTreeMap<Vec<usize>, Vec<usize>> = BTreeMap::new();
        for row in 0..dataset.n_rows() {
            let key: Vec<usize> = keyed.iter().map(|(ranks, _)| ranks[row]).collect();
            buckets.entry(key).or_default().push(row);
        }

        let groups: Vec<Group> = buckets
            .into_iter()
            .map(|(key, rows)| {
                let keys: Vec<String> = key
                    .iter()
                    .zip(&keyed)
                    .map(|(&rank, (_, labels))| {
                        labels
                            .get(rank)
                            .cloned()
                            .unwrap_or_else(|| MISSING_KEY_LABEL.to_string())
                    })
                    .collect();
                Group {
                    label: keys.join(" / "),
                    keys,
                    rows,
                }
            })
            .collect();

        debug!(
            by = ?columns.iter().map(AsRef::as_ref).collect::<Vec<_>>(),
            groups = groups.len(),
            "grouped dataset"
        );

        Ok(Grouping {
            by: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            groups,
        })
    }

    /// Group labels in order
    pub fn labels(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.label.clone()).collect()
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups (only for an empty dataset)
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Per-row rank of each value plus the label for each rank.
///
/// Missing rows get `usize::MAX` so they sort after every present value.
fn key_ranks(column: &Column) -> (Vec<usize>, Vec<String>) {
    match column {
        Column::Categorical { levels, codes } => (
            codes.iter().map(|c| c.unwrap_or(usize::MAX)).collect(),
            levels.clone(),
        ),
        Column::Boolean(values) => (
            values
                .iter()
                .map(|v| v.map_or(usize::MAX, usize::from))
                .collect(),
            vec!["FALSE".to_string(), "TRUE".to_string()],
        ),
        Column::Numeric(values) => {
            let mut distinct: Vec<f64> = values.iter().flatten().copied().collect();
            distinct.sort_by(f64::total_cmp);
            distinct.dedup_by(|a, b| a.total_cmp(b).is_eq());
            let ranks = values
                .iter()
                .map(|v| match v {
                    Some(x) => distinct
                        .binary_search_by(|probe| probe.total_cmp(x))
                        .unwrap_or(usize::MAX),
                    None => usize::MAX,
                })
                .collect();
            let labels = distinct.iter().map(|x| x.to_string()).collect();
            (ranks, labels)
        }
    }
}

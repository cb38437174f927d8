//! Column-oriented in-memory datasets.

use serde::{Deserialize, Serialize};

use crate::error::SummaryError;
use crate::Result;

/// Type of a column, used to pick default statistics for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Boolean,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Boolean => "boolean",
        };
        write!(f, "{}", name)
    }
}

/// A single column of values. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Column {
    /// Continuous values
    Numeric(Vec<Option<f64>>),
    /// Labels stored as indices into an ordered level list
    Categorical {
        levels: Vec<String>,
        codes: Vec<Option<usize>>,
    },
    /// Logical values
    Boolean(Vec<Option<bool>>),
}

impl Column {
    /// Numeric column with no missing values.
    pub fn numeric(values: impl IntoIterator<Item = f64>) -> Self {
        Column::Numeric(values.into_iter().map(Some).collect())
    }

    /// Boolean column with no missing values.
    pub fn boolean(values: impl IntoIterator<Item = bool>) -> Self {
        Column::Boolean(values.into_iter().map(Some).collect())
    }

    /// Categorical column from labels; levels are the distinct labels sorted
    /// lexicographically.
    pub fn categorical<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let values: Vec<Option<String>> = values.into_iter().map(|v| v.map(Into::into)).collect();
        let mut levels: Vec<String> = values.iter().flatten().cloned().collect();
        levels.sort();
        levels.dedup();
        let codes = values
            .iter()
            .map(|v| {
                v.as_ref()
                    .and_then(|label| levels.binary_search(label).ok())
            })
            .collect();
        Column::Categorical { levels, codes }
    }

    /// Categorical column with an explicit level order. Labels outside the
    /// level list are rejected.
    pub fn categorical_with_levels<I, S>(values: I, levels: Vec<String>) -> Result<Self>
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        for (i, level) in levels.iter().enumerate() {
            if levels[..i].contains(level) {
                return Err(SummaryError::invalid(format!("duplicate level '{}'", level)));
            }
        }
        let mut codes = Vec::new();
        for value in values {
            match value {
                None => codes.push(None),
                Some(label) => {
                    let label = label.as_ref();
                    let code = levels.iter().position(|l| l == label).ok_or_else(|| {
                        SummaryError::invalid(format!("value '{}' is not a declared level", label))
                    })?;
                    codes.push(Some(code));
                }
            }
        }
        Ok(Column::Categorical { levels, codes })
    }

    /// Number of rows, missing values included.
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical { codes, .. } => codes.len(),
            Column::Boolean(v) => v.len(),
        }
    }

    /// Whether the column has no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column type
    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Categorical { .. } => ColumnKind::Categorical,
            Column::Boolean(_) => ColumnKind::Boolean,
        }
    }

    /// Whether row `idx` is missing
    pub fn is_missing(&self, idx: usize) -> bool {
        match self {
            Column::Numeric(v) => v[idx].is_none(),
            Column::Categorical { codes, .. } => codes[idx].is_none(),
            Column::Boolean(v) => v[idx].is_none(),
        }
    }

    /// Number of missing values
    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_missing(i)).count()
    }

    /// Display label of row `idx` (level name, `TRUE`/`FALSE`, or the number).
    pub fn label(&self, idx: usize) -> Option<String> {
        match self {
            Column::Numeric(v) => v[idx].map(|x| x.to_string()),
            Column::Categorical { levels, codes } => codes[idx].map(|c| levels[c].clone()),
            Column::Boolean(v) => v[idx].map(|b| if b { "TRUE" } else { "FALSE" }.to_string()),
        }
    }

    /// Numeric view of the column. Fails for non-numeric columns.
    pub fn as_numeric(&self) -> Result<&[Option<f64>]> {
        match self {
            Column::Numeric(v) => Ok(v),
            other => Err(SummaryError::invalid(format!(
                "expected a numeric column, got {}",
                other.kind()
            ))),
        }
    }

    /// New column holding only the given rows, in the given order.
    pub fn take(&self, rows: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(rows.iter().map(|&i| v[i]).collect()),
            Column::Categorical { levels, codes } => Column::Categorical {
                levels: levels.clone(),
                codes: rows.iter().map(|&i| codes[i]).collect(),
            },
            Column::Boolean(v) => Column::Boolean(rows.iter().map(|&i| v[i]).collect()),
        }
    }
}

/// An ordered collection of named, equal-length columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<(String, Column)>,
}

impl Dataset {
    /// Empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append a column.
    ///
    /// The first column fixes the row count; later columns must match it.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self> {
        self.add_column(name, column)?;
        Ok(self)
    }

    /// Append a column
    pub fn add_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.columns.iter().any(|(n, _)| *n == name) {
            return Err(SummaryError::invalid(format!(
                "duplicate column name '{}'",
                name
            )));
        }
        if let Some((_, first)) = self.columns.first() {
            if first.len() != column.len() {
                return Err(SummaryError::shape(
                    format!("column '{}'", name),
                    first.len(),
                    column.len(),
                ));
            }
        }
        self.columns.push((name, column));
        Ok(())
    }

    /// Number of rows (0 for a dataset without columns)
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |(_, c)| c.len())
    }

    /// Number of columns
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate `(name, column)` pairs in order
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
            .ok_or_else(|| SummaryError::UnresolvedReference {
                column: name.to_string(),
            })
    }

    /// Whether a column with this name exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// New dataset restricted to the given rows.
    pub fn subset(&self, rows: &[usize]) -> Dataset {
        Dataset {
            columns: self
                .columns
                .iter()
                .map(|(n, c)| (n.clone(), c.take(rows)))
                .collect(),
        }
    }
}

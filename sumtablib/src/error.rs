//! Error types for sumtablib

use thiserror::Error;

/// Errors that can occur while computing statistics or assembling tables
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SummaryError {
    /// Wrong type, shape or empty data passed to a statistic function
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Row or column counts disagree (renaming, concatenation, dataset columns)
    #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// An expression references a column the data does not have
    #[error("column '{column}' not found")]
    UnresolvedReference { column: String },

    /// A statistic is undefined for the given number of values (e.g. sd with n < 2)
    #[error("{statistic} is undefined for n = {n}")]
    DegenerateStatistic { statistic: String, n: usize },

    /// A table cell failed to evaluate
    #[error("row '{row}' in '{row_group}' for group '{group}': {source}")]
    Evaluation {
        row_group: String,
        row: String,
        group: String,
        source: Box<SummaryError>,
    },
}

impl SummaryError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SummaryError::InvalidInput(message.into())
    }

    pub(crate) fn shape(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        SummaryError::ShapeMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// The innermost error, with any cell context stripped.
    pub fn root_cause(&self) -> &SummaryError {
        match self {
            SummaryError::Evaluation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_unwraps_evaluation() {
        let err = SummaryError::Evaluation {
            row_group: "Miles Per Gallon".to_string(),
            row: "mean (sd)".to_string(),
            group: "4".to_string(),
            source: Box::new(SummaryError::UnresolvedReference {
                column: "mpg".to_string(),
            }),
        };
        assert_eq!(
            err.root_cause(),
            &SummaryError::UnresolvedReference {
                column: "mpg".to_string()
            }
        );
        let message = err.to_string();
        assert!(message.contains("mean (sd)"));
        assert!(message.contains("Miles Per Gallon"));
        assert!(message.contains("column 'mpg' not found"));
    }

    #[test]
    fn test_shape_mismatch_message() {
        let err = SummaryError::shape("column names", 3, 2);
        assert_eq!(
            err.to_string(),
            "shape mismatch in column names: expected 3, got 2"
        );
    }
}

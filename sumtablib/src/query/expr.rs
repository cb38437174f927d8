//! Statistic expressions: what to compute, and against which column.
//!
//! An [`Expression`] names a statistic and a column and is resolved against
//! whatever dataset it is handed, so the same expression evaluates correctly
//! against every group subset. A [`BoundExpression`] instead carries a copy
//! of one column taken at bind time and ignores the subset it is evaluated
//! against; it is only correct when the table is built from that same,
//! ungrouped dataset.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::warn;

use crate::data::dataset::{Column, Dataset};
use crate::options::FormatOptions;
use crate::stats::summary::{self, Level, StatisticResult};
use crate::Result;

/// The statistic an expression computes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Minimum,
    Maximum,
    Mean,
    Median,
    /// Number of non-missing values
    Count,
    MeanSd,
    MeanSe,
    GmeanSd,
    MedianIqr,
    MeanCi,
    /// Count and percentage of a level, with the percent symbol
    NPerc(Level),
    /// Count and percentage of a level, without the percent symbol
    NPerc0(Level),
}

impl std::fmt::Display for Stat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stat::Minimum => write!(f, "minimum"),
            Stat::Maximum => write!(f, "maximum"),
            Stat::Mean => write!(f, "mean"),
            Stat::Median => write!(f, "median"),
            Stat::Count => write!(f, "n"),
            Stat::MeanSd => write!(f, "mean_sd"),
            Stat::MeanSe => write!(f, "mean_se"),
            Stat::GmeanSd => write!(f, "gmean_sd"),
            Stat::MedianIqr => write!(f, "median_iqr"),
            Stat::MeanCi => write!(f, "mean_ci"),
            Stat::NPerc(level) => write!(f, "n_perc({})", level),
            Stat::NPerc0(level) => write!(f, "n_perc0({})", level),
        }
    }
}

impl Stat {
    /// Compute this statistic over one column.
    pub fn evaluate(&self, column: &Column, opts: &FormatOptions) -> Result<StatisticResult> {
        let numeric = || column.as_numeric();
        match self {
            Stat::Count => Ok(summary::count_column(column)),
            Stat::NPerc(level) => summary::n_perc_level(column, level, true, opts),
            Stat::NPerc0(level) => summary::n_perc_level(column, level, false, opts),
            Stat::Minimum => summary::minimum(numeric()?, opts),
            Stat::Maximum => summary::maximum(numeric()?, opts),
            Stat::Mean => summary::mean(numeric()?, opts),
            Stat::Median => summary::median(numeric()?, opts),
            Stat::MeanSd => summary::mean_sd(numeric()?, opts),
            Stat::MeanSe => summary::mean_se(numeric()?, opts),
            Stat::GmeanSd => summary::gmean_sd(numeric()?, opts),
            Stat::MedianIqr => summary::median_iqr(numeric()?, opts),
            Stat::MeanCi => summary::mean_ci(numeric()?, opts),
        }
    }
}

fn with_digits(opts: &FormatOptions, digits: Option<usize>) -> Cow<'_, FormatOptions> {
    match digits {
        Some(d) if d != opts.digits => Cow::Owned(opts.clone().with_digits(d)),
        _ => Cow::Borrowed(opts),
    }
}

/// A deferred statistic over a named column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub stat: Stat,
    pub column: String,
    /// Overrides `FormatOptions::digits` for this expression only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digits: Option<usize>,
}

impl Expression {
    pub fn new(stat: Stat, column: impl Into<String>) -> Self {
        Self {
            stat,
            column: column.into(),
            digits: None,
        }
    }

    pub fn minimum(column: impl Into<String>) -> Self {
        Self::new(Stat::Minimum, column)
    }

    pub fn maximum(column: impl Into<String>) -> Self {
        Self::new(Stat::Maximum, column)
    }

    pub fn mean(column: impl Into<String>) -> Self {
        Self::new(Stat::Mean, column)
    }

    pub fn median(column: impl Into<String>) -> Self {
        Self::new(Stat::Median, column)
    }

    pub fn count(column: impl Into<String>) -> Self {
        Self::new(Stat::Count, column)
    }

    pub fn mean_sd(column: impl Into<String>) -> Self {
        Self::new(Stat::MeanSd, column)
    }

    pub fn mean_se(column: impl Into<String>) -> Self {
        Self::new(Stat::MeanSe, column)
    }

    pub fn gmean_sd(column: impl Into<String>) -> Self {
        Self::new(Stat::GmeanSd, column)
    }

    pub fn median_iqr(column: impl Into<String>) -> Self {
        Self::new(Stat::MedianIqr, column)
    }

    pub fn mean_ci(column: impl Into<String>) -> Self {
        Self::new(Stat::MeanCi, column)
    }

    pub fn n_perc(column: impl Into<String>, level: Level) -> Self {
        Self::new(Stat::NPerc(level), column)
    }

    pub fn n_perc0(column: impl Into<String>, level: Level) -> Self {
        Self::new(Stat::NPerc0(level), column)
    }

    /// Builder: use `digits` decimals instead of the table default
    pub fn with_digits(mut self, digits: usize) -> Self {
        self.digits = Some(digits);
        self
    }

    /// Resolve the column in `data` and compute the statistic.
    pub fn evaluate(&self, data: &Dataset, opts: &FormatOptions) -> Result<StatisticResult> {
        let column = data.column(&self.column)?;
        self.stat.evaluate(column, &with_digits(opts, self.digits))
    }

    /// Snapshot the referenced column of `dataset` into a bound expression.
    pub fn bind(self, dataset: &Dataset) -> Result<BoundExpression> {
        let values = dataset.column(&self.column)?.clone();
        Ok(BoundExpression {
            expression: self,
            values,
        })
    }
}

/// An expression tied to the values of one column at bind time.
///
/// Evaluation always reads the captured values, whatever subset is being
/// summarised. Inside a grouped table every group therefore shows the
/// statistic of the whole original column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundExpression {
    expression: Expression,
    values: Column,
}

impl BoundExpression {
    /// The expression this was bound from
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Captured column values
    pub fn values(&self) -> &Column {
        &self.values
    }

    /// Compute the statistic over the captured values.
    ///
    /// `subset_rows` is the size of the subset the caller meant to
    /// summarise; a mismatch is logged since the result then ignores it.
    pub fn evaluate(&self, subset_rows: usize, opts: &FormatOptions) -> Result<StatisticResult> {
        if subset_rows != self.values.len() {
            warn!(
                column = %self.expression.column,
                stat = %self.expression.stat,
                bound_rows = self.values.len(),
                subset_rows,
                "bound expression ignores the subset it is evaluated against"
            );
        }
        self.expression
            .stat
            .evaluate(&self.values, &with_digits(opts, self.expression.digits))
    }
}

/// A cell definition in a summary spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entry {
    /// Resolved against each group's subset
    Deferred(Expression),
    /// Always reads the values captured at bind time
    Bound(BoundExpression),
}

impl Entry {
    /// Name of the referenced column
    pub fn column(&self) -> &str {
        match self {
            Entry::Deferred(e) => &e.column,
            Entry::Bound(b) => &b.expression.column,
        }
    }

    /// The statistic computed
    pub fn stat(&self) -> &Stat {
        match self {
            Entry::Deferred(e) => &e.stat,
            Entry::Bound(b) => &b.expression.stat,
        }
    }

    /// Evaluate against a group's subset of the data.
    pub fn evaluate(&self, subset: &Dataset, opts: &FormatOptions) -> Result<StatisticResult> {
        match self {
            Entry::Deferred(e) => e.evaluate(subset, opts),
            Entry::Bound(b) => b.evaluate(subset.n_rows(), opts),
        }
    }
}

impl From<Expression> for Entry {
    fn from(e: Expression) -> Self {
        Entry::Deferred(e)
    }
}

impl From<BoundExpression> for Entry {
    fn from(b: BoundExpression) -> Self {
        Entry::Bound(b)
    }
}

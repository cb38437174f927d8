//! Formatting options shared by the formatter, statistics and renderer.
//!
//! All configuration lives in a `FormatOptions` value that callers build once
//! and pass down. Nothing here is global: two tables can be built side by side
//! with different digits or markup simply by passing different values.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Target text format for formatted values and rendered tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Markup {
    /// Plain text (UTF-8 symbols, no escaping)
    #[default]
    Plain,
    /// Markdown pipe tables
    Markdown,
    /// LaTeX tabular
    Latex,
}

impl FromStr for Markup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Ok(Markup::Plain),
            "markdown" | "md" => Ok(Markup::Markdown),
            "latex" | "tex" => Ok(Markup::Latex),
            _ => Err(format!("Unknown markup: {}", s)),
        }
    }
}

/// How the dispersion of a mean is denoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SdStyle {
    /// `mean ± sd`
    #[default]
    PlusMinus,
    /// `mean (sd)`
    Paren,
}

impl FromStr for SdStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plus_minus" | "plusminus" | "pm" => Ok(SdStyle::PlusMinus),
            "paren" | "parens" => Ok(SdStyle::Paren),
            _ => Err(format!("Unknown sd style: {}", s)),
        }
    }
}

/// Layout of a mean with confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiStyle {
    /// `mean (lower, upper)`
    #[default]
    Comma,
    /// `mean (lower to upper)`
    To,
    /// `mean (95% CI: lower, upper)`
    Level,
}

impl FromStr for CiStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "comma" => Ok(CiStyle::Comma),
            "to" => Ok(CiStyle::To),
            "level" => Ok(CiStyle::Level),
            _ => Err(format!("Unknown confidence interval style: {}", s)),
        }
    }
}

/// When numeric summaries are prefixed with the number of values used (`n; `).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowN {
    /// Always prefix
    Always,
    /// Prefix only when some values were missing
    #[default]
    IfMissing,
    /// Never prefix
    Never,
}

impl FromStr for ShowN {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" => Ok(ShowN::Always),
            "if_missing" | "ifmissing" => Ok(ShowN::IfMissing),
            "never" => Ok(ShowN::Never),
            _ => Err(format!("Unknown show-n mode: {}", s)),
        }
    }
}

/// What to do when a statistic is undefined for the data (sd with one value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Return `SummaryError::DegenerateStatistic`
    #[default]
    Fail,
    /// Report the undefined component as the missing-value placeholder
    Placeholder,
}

impl FromStr for DegeneratePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail" | "error" => Ok(DegeneratePolicy::Fail),
            "placeholder" | "na" => Ok(DegeneratePolicy::Placeholder),
            _ => Err(format!("Unknown degenerate policy: {}", s)),
        }
    }
}

/// Formatting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Decimal digits for every formatted number
    pub digits: usize,
    /// Markup the strings are produced for
    pub markup: Markup,
    /// Placeholder for missing or undefined values
    pub na_string: String,
    /// Confidence level for `mean_ci`
    pub ci_level: f64,
    /// Layout of confidence intervals
    pub ci_style: CiStyle,
    /// Layout of mean and standard deviation
    pub sd_style: SdStyle,
    /// When to prefix numeric summaries with `n; `
    pub show_n: ShowN,
    /// Drop missing values before computing
    pub na_rm: bool,
    /// Policy for undefined dispersion
    pub degenerate: DegeneratePolicy,
    /// Format all-missing input as the placeholder instead of failing
    pub empty_as_na: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            digits: 2,
            markup: Markup::Plain,
            na_string: "NA".to_string(),
            ci_level: 0.95,
            ci_style: CiStyle::Comma,
            sd_style: SdStyle::PlusMinus,
            show_n: ShowN::IfMissing,
            na_rm: true,
            degenerate: DegeneratePolicy::Fail,
            empty_as_na: false,
        }
    }
}

impl FormatOptions {
    /// Create options with the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set digits
    pub fn with_digits(mut self, digits: usize) -> Self {
        self.digits = digits;
        self
    }

    /// Builder: set markup
    pub fn with_markup(mut self, markup: Markup) -> Self {
        self.markup = markup;
        self
    }

    /// Builder: set the missing-value placeholder
    pub fn with_na_string(mut self, na_string: impl Into<String>) -> Self {
        self.na_string = na_string.into();
        self
    }

    /// Builder: set the confidence level
    pub fn with_ci_level(mut self, level: f64) -> Self {
        self.ci_level = level;
        self
    }

    /// Builder: set the confidence interval layout
    pub fn with_ci_style(mut self, style: CiStyle) -> Self {
        self.ci_style = style;
        self
    }

    /// Builder: set the mean/sd layout
    pub fn with_sd_style(mut self, style: SdStyle) -> Self {
        self.sd_style = style;
        self
    }

    /// Builder: set when to show `n`
    pub fn with_show_n(mut self, show_n: ShowN) -> Self {
        self.show_n = show_n;
        self
    }

    /// Builder: keep or drop missing values
    pub fn with_na_rm(mut self, na_rm: bool) -> Self {
        self.na_rm = na_rm;
        self
    }

    /// Builder: set the degenerate-statistic policy
    pub fn with_degenerate(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate = policy;
        self
    }

    /// Builder: format all-missing input as the placeholder
    pub fn with_empty_as_na(mut self, enable: bool) -> Self {
        self.empty_as_na = enable;
        self
    }
}

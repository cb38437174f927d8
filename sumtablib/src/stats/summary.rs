//! Summary statistics with their formatted display strings.
//!
//! Each function returns a [`StatisticResult`]: the raw numeric components
//! (`mean`, `sd`, `n`, ...) and the string that goes into a table cell.
//! Digits, markup and missing-value handling come from [`FormatOptions`].

use serde::{Deserialize, Serialize};

use super::format::{format_count, format_mean_ci, format_number, format_percent, frmt, plus_minus};
use super::quantile::quantile_sorted;
use super::tdist::t_quantile;
use crate::data::dataset::Column;
use crate::error::SummaryError;
use crate::options::{DegeneratePolicy, FormatOptions, SdStyle, ShowN};
use crate::Result;

/// Output of a statistic: named numeric components plus the display string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticResult {
    /// Statistic name (`mean_sd`, `n_perc`, ...)
    pub statistic: String,
    components: Vec<(String, f64)>,
    formatted: String,
}

impl StatisticResult {
    fn new(statistic: &str, components: Vec<(&str, f64)>, formatted: String) -> Self {
        Self {
            statistic: statistic.to_string(),
            components: components
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            formatted,
        }
    }

    /// Every component NaN, displayed as the placeholder.
    fn undefined(statistic: &str, names: &[&str], opts: &FormatOptions) -> Self {
        Self::new(
            statistic,
            names.iter().map(|n| (*n, f64::NAN)).collect(),
            opts.na_string.clone(),
        )
    }

    /// Value of a named component
    pub fn get(&self, name: &str) -> Option<f64> {
        self.components
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| *v)
    }

    /// All components in order
    pub fn components(&self) -> &[(String, f64)] {
        &self.components
    }

    /// Display string
    pub fn formatted(&self) -> &str {
        &self.formatted
    }
}

impl std::fmt::Display for StatisticResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.formatted)
    }
}

/// Target of a count/percentage: TRUE, FALSE, or a categorical level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    True,
    False,
    Label(String),
}

impl Level {
    /// Categorical level by name
    pub fn label(name: impl Into<String>) -> Self {
        Level::Label(name.into())
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::True => write!(f, "TRUE"),
            Level::False => write!(f, "FALSE"),
            Level::Label(name) => write!(f, "{}", name),
        }
    }
}

enum Prepared {
    Ready { values: Vec<f64>, dropped: usize },
    Undefined,
}

/// Drop missing values (NaN counts as missing) according to `na_rm`.
fn prepare(x: &[Option<f64>], statistic: &str, opts: &FormatOptions) -> Result<Prepared> {
    let values: Vec<f64> = x.iter().flatten().copied().filter(|v| !v.is_nan()).collect();
    let dropped = x.len() - values.len();
    if dropped > 0 && !opts.na_rm {
        return Ok(Prepared::Undefined);
    }
    if values.is_empty() {
        if opts.empty_as_na {
            return Ok(Prepared::Undefined);
        }
        return Err(SummaryError::invalid(format!(
            "{} needs at least one non-missing value",
            statistic
        )));
    }
    Ok(Prepared::Ready { values, dropped })
}

/// Prefix `n; ` according to `show_n`.
fn with_n(body: String, n: usize, dropped: usize, opts: &FormatOptions) -> String {
    let show = match opts.show_n {
        ShowN::Always => true,
        ShowN::IfMissing => dropped > 0,
        ShowN::Never => false,
    };
    if show {
        format!("{}; {}", n, body)
    } else {
        body
    }
}

fn arithmetic_mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator), honouring the degenerate policy.
fn sample_sd(values: &[f64], mean: f64, opts: &FormatOptions) -> Result<f64> {
    let n = values.len();
    if n < 2 {
        return match opts.degenerate {
            DegeneratePolicy::Fail => Err(SummaryError::DegenerateStatistic {
                statistic: "standard deviation".to_string(),
                n,
            }),
            DegeneratePolicy::Placeholder => Ok(f64::NAN),
        };
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Ok((ss / (n - 1) as f64).sqrt())
}

fn format_location_spread(location: f64, spread: f64, opts: &FormatOptions) -> String {
    let m = frmt(location, opts);
    let s = frmt(spread, opts);
    match opts.sd_style {
        SdStyle::PlusMinus => format!("{} {} {}", m, plus_minus(opts.markup), s),
        SdStyle::Paren => format!("{} ({})", m, s),
    }
}

/// Mean and sample standard deviation: `mean ± sd` or `mean (sd)`.
pub fn mean_sd(x: &[Option<f64>], opts: &FormatOptions) -> Result<StatisticResult> {
    let (values, dropped) = match prepare(x, "mean_sd", opts)? {
        Prepared::Ready { values, dropped } => (values, dropped),
        Prepared::Undefined => {
            return Ok(StatisticResult::undefined("mean_sd", &["n", "mean", "sd"], opts))
        }
    };
    let n = values.len();
    let mean = arithmetic_mean(&values);
    let sd = sample_sd(&values, mean, opts)?;
    let formatted = with_n(format_location_spread(mean, sd, opts), n, dropped, opts);
    Ok(StatisticResult::new(
        "mean_sd",
        vec![("n", n as f64), ("mean", mean), ("sd", sd)],
        formatted,
    ))
}

/// Mean and standard error of the mean: `mean ± se`.
pub fn mean_se(x: &[Option<f64>], opts: &FormatOptions) -> Result<StatisticResult> {
    let (values, dropped) = match prepare(x, "mean_se", opts)? {
        Prepared::Ready { values, dropped } => (values, dropped),
        Prepared::Undefined => {
            return Ok(StatisticResult::undefined("mean_se", &["n", "mean", "se"], opts))
        }
    };
    let n = values.len();
    let mean = arithmetic_mean(&values);
    let se = sample_sd(&values, mean, opts)? / (n as f64).sqrt();
    let formatted = with_n(format_location_spread(mean, se, opts), n, dropped, opts);
    Ok(StatisticResult::new(
        "mean_se",
        vec![("n", n as f64), ("mean", mean), ("se", se)],
        formatted,
    ))
}

/// Geometric mean and geometric standard deviation. Values must be positive.
pub fn gmean_sd(x: &[Option<f64>], opts: &FormatOptions) -> Result<StatisticResult> {
    let (values, dropped) = match prepare(x, "gmean_sd", opts)? {
        Prepared::Ready { values, dropped } => (values, dropped),
        Prepared::Undefined => {
            return Ok(StatisticResult::undefined("gmean_sd", &["n", "gmean", "gsd"], opts))
        }
    };
    if let Some(bad) = values.iter().find(|v| **v <= 0.0) {
        return Err(SummaryError::invalid(format!(
            "gmean_sd needs positive values, found {}",
            bad
        )));
    }
    let logs: Vec<f64> = values.iter().map(|v| v.ln()).collect();
    let n = logs.len();
    let log_mean = arithmetic_mean(&logs);
    let gmean = log_mean.exp();
    let gsd = sample_sd(&logs, log_mean, opts)?.exp();
    let formatted = with_n(format_location_spread(gmean, gsd, opts), n, dropped, opts);
    Ok(StatisticResult::new(
        "gmean_sd",
        vec![("n", n as f64), ("gmean", gmean), ("gsd", gsd)],
        formatted,
    ))
}

/// Median and interquartile range (type-7 quantiles): `median (Q1, Q3)`.
pub fn median_iqr(x: &[Option<f64>], opts: &FormatOptions) -> Result<StatisticResult> {
    let (mut values, dropped) = match prepare(x, "median_iqr", opts)? {
        Prepared::Ready { values, dropped } => (values, dropped),
        Prepared::Undefined => {
            return Ok(StatisticResult::undefined(
                "median_iqr",
                &["n", "median", "q1", "q3", "iqr"],
                opts,
            ))
        }
    };
    values.sort_by(f64::total_cmp);
    let n = values.len();
    // Non-empty sorted input and p in [0, 1] always yield a quantile.
    let q = |p: f64| quantile_sorted(&values, p).unwrap_or(f64::NAN);
    let (median, q1, q3) = (q(0.5), q(0.25), q(0.75));
    let body = format!("{} ({}, {})", frmt(median, opts), frmt(q1, opts), frmt(q3, opts));
    Ok(StatisticResult::new(
        "median_iqr",
        vec![
            ("n", n as f64),
            ("median", median),
            ("q1", q1),
            ("q3", q3),
            ("iqr", q3 - q1),
        ],
        with_n(body, n, dropped, opts),
    ))
}

/// Mean with a two-sided t-distribution confidence interval at `opts.ci_level`.
pub fn mean_ci(x: &[Option<f64>], opts: &FormatOptions) -> Result<StatisticResult> {
    let level = opts.ci_level;
    if !(level > 0.0 && level < 1.0) {
        return Err(SummaryError::invalid(format!(
            "confidence level must be in (0, 1), got {}",
            level
        )));
    }
    let (values, dropped) = match prepare(x, "mean_ci", opts)? {
        Prepared::Ready { values, dropped } => (values, dropped),
        Prepared::Undefined => {
            let mut undefined =
                StatisticResult::undefined("mean_ci", &["n", "mean", "lower", "upper"], opts);
            undefined.components.push(("level".to_string(), level));
            return Ok(undefined);
        }
    };
    let n = values.len();
    let mean = arithmetic_mean(&values);
    let sd = sample_sd(&values, mean, opts)?;
    let (lower, upper) = if sd.is_nan() {
        (f64::NAN, f64::NAN)
    } else {
        let df = (n - 1) as f64;
        let t = t_quantile(0.5 + level / 2.0, df).ok_or_else(|| {
            SummaryError::invalid(format!("no t quantile for level {} with {} df", level, df))
        })?;
        let half = t * sd / (n as f64).sqrt();
        (mean - half, mean + half)
    };
    let body = format_mean_ci(mean, lower, upper, level, opts.digits, opts);
    Ok(StatisticResult::new(
        "mean_ci",
        vec![
            ("n", n as f64),
            ("mean", mean),
            ("lower", lower),
            ("upper", upper),
            ("level", level),
        ],
        with_n(body, n, dropped, opts),
    ))
}

/// Count and percentage of TRUE values: `n (pct%)`, or `n (pct)` without the symbol.
///
/// The percentage base is the number of non-missing values, or every row
/// when `na_rm` is false.
pub fn n_perc(x: &[Option<bool>], show_symbol: bool, opts: &FormatOptions) -> Result<StatisticResult> {
    let statistic = if show_symbol { "n_perc" } else { "n_perc0" };
    let count = x.iter().filter(|v| **v == Some(true)).count();
    let total = if opts.na_rm {
        x.iter().filter(|v| v.is_some()).count()
    } else {
        x.len()
    };
    if total == 0 {
        if opts.empty_as_na {
            return Ok(StatisticResult::undefined(
                statistic,
                &["n", "total", "percent"],
                opts,
            ));
        }
        return Err(SummaryError::invalid(format!(
            "{} needs at least one non-missing value",
            statistic
        )));
    }
    let percent = 100.0 * count as f64 / total as f64;
    let formatted = format!(
        "{} ({})",
        format_count(count),
        format_percent(percent, opts.digits, show_symbol, opts)
    );
    Ok(StatisticResult::new(
        statistic,
        vec![
            ("n", count as f64),
            ("total", total as f64),
            ("percent", percent),
        ],
        formatted,
    ))
}

/// `n_perc` without the percent symbol.
pub fn n_perc0(x: &[Option<bool>], opts: &FormatOptions) -> Result<StatisticResult> {
    n_perc(x, false, opts)
}

/// Per-row match against `level`; missing rows stay `None`.
pub fn level_matches(column: &Column, level: &Level) -> Result<Vec<Option<bool>>> {
    match (column, level) {
        (Column::Boolean(values), Level::True) => Ok(values.clone()),
        (Column::Boolean(values), Level::False) => Ok(values.iter().map(|v| v.map(|b| !b)).collect()),
        (Column::Boolean(values), Level::Label(name)) => {
            let target = match name.to_uppercase().as_str() {
                "TRUE" | "T" => true,
                "FALSE" | "F" => false,
                _ => {
                    return Err(SummaryError::invalid(format!(
                        "'{}' is not a boolean level",
                        name
                    )))
                }
            };
            Ok(values.iter().map(|v| v.map(|b| b == target)).collect())
        }
        (Column::Categorical { levels, codes }, Level::Label(name)) => {
            let target = levels.iter().position(|l| l == name).ok_or_else(|| {
                SummaryError::invalid(format!("'{}' is not a level of the column", name))
            })?;
            Ok(codes.iter().map(|c| c.map(|c| c == target)).collect())
        }
        (column, level) => Err(SummaryError::invalid(format!(
            "cannot count level {} in a {} column",
            level,
            column.kind()
        ))),
    }
}

/// Count and percentage of rows of `column` equal to `level`.
pub fn n_perc_level(
    column: &Column,
    level: &Level,
    show_symbol: bool,
    opts: &FormatOptions,
) -> Result<StatisticResult> {
    n_perc(&level_matches(column, level)?, show_symbol, opts)
}

fn single(statistic: &str, value: f64, formatted: String) -> StatisticResult {
    StatisticResult::new(statistic, vec![(statistic, value)], formatted)
}

/// Smallest non-missing value
pub fn minimum(x: &[Option<f64>], opts: &FormatOptions) -> Result<StatisticResult> {
    match prepare(x, "minimum", opts)? {
        Prepared::Ready { values, .. } => {
            let v = values.iter().copied().fold(f64::INFINITY, f64::min);
            Ok(single("minimum", v, frmt(v, opts)))
        }
        Prepared::Undefined => Ok(StatisticResult::undefined("minimum", &["minimum"], opts)),
    }
}

/// Largest non-missing value
pub fn maximum(x: &[Option<f64>], opts: &FormatOptions) -> Result<StatisticResult> {
    match prepare(x, "maximum", opts)? {
        Prepared::Ready { values, .. } => {
            let v = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Ok(single("maximum", v, frmt(v, opts)))
        }
        Prepared::Undefined => Ok(StatisticResult::undefined("maximum", &["maximum"], opts)),
    }
}

/// Arithmetic mean
pub fn mean(x: &[Option<f64>], opts: &FormatOptions) -> Result<StatisticResult> {
    match prepare(x, "mean", opts)? {
        Prepared::Ready { values, .. } => {
            let v = arithmetic_mean(&values);
            Ok(single("mean", v, frmt(v, opts)))
        }
        Prepared::Undefined => Ok(StatisticResult::undefined("mean", &["mean"], opts)),
    }
}

/// Median (type-7)
pub fn median(x: &[Option<f64>], opts: &FormatOptions) -> Result<StatisticResult> {
    match prepare(x, "median", opts)? {
        Prepared::Ready { mut values, .. } => {
            values.sort_by(f64::total_cmp);
            let v = quantile_sorted(&values, 0.5).unwrap_or(f64::NAN);
            Ok(single("median", v, frmt(v, opts)))
        }
        Prepared::Undefined => Ok(StatisticResult::undefined("median", &["median"], opts)),
    }
}

/// Number of non-missing values. Never fails and never formats decimals.
pub fn count(x: &[Option<f64>]) -> StatisticResult {
    let n = x.iter().flatten().filter(|v| !v.is_nan()).count();
    single("n", n as f64, format_count(n))
}

/// Number of non-missing rows in any column.
pub fn count_column(column: &Column) -> StatisticResult {
    let n = column.len() - column.missing_count();
    single("n", n as f64, format_count(n))
}

/// Format a number with the configured digits and an optional sign, as a result.
pub fn scalar(statistic: &str, value: f64, show_sign: bool, opts: &FormatOptions) -> StatisticResult {
    single(
        statistic,
        value,
        format_number(value, opts.digits, show_sign, opts),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CiStyle, Markup};

    fn mpg() -> Vec<Option<f64>> {
        vec![Some(21.0), Some(22.8), Some(21.0), Some(18.7)]
    }

    fn opts() -> FormatOptions {
        FormatOptions::default()
    }

    #[test]
    fn test_mean_sd_example() {
        let r = mean_sd(&mpg(), &opts()).unwrap();
        assert_eq!(r.get("mean"), Some(20.875));
        assert!((r.get("sd").unwrap() - 1.680_029_761_641_144_8).abs() < 1e-12);
        assert_eq!(r.formatted(), "20.88 ± 1.68");
        assert_eq!(r.to_string(), "20.88 ± 1.68");
    }

    #[test]
    fn test_mean_sd_styles_and_markup() {
        let paren = opts().with_sd_style(SdStyle::Paren);
        assert_eq!(mean_sd(&mpg(), &paren).unwrap().formatted(), "20.88 (1.68)");
        let md = opts().with_markup(Markup::Markdown);
        assert_eq!(mean_sd(&mpg(), &md).unwrap().formatted(), "20.88 &plusmn; 1.68");
        let tex = opts().with_markup(Markup::Latex);
        assert_eq!(mean_sd(&mpg(), &tex).unwrap().formatted(), "20.88 $\\pm$ 1.68");
    }

    #[test]
    fn test_mean_sd_show_n_if_missing() {
        let mut x = mpg();
        x.push(None);
        let r = mean_sd(&x, &opts()).unwrap();
        assert_eq!(r.formatted(), "4; 20.88 ± 1.68");
        let never = opts().with_show_n(ShowN::Never);
        assert_eq!(mean_sd(&x, &never).unwrap().formatted(), "20.88 ± 1.68");
        let always = opts().with_show_n(ShowN::Always);
        assert_eq!(mean_sd(&mpg(), &always).unwrap().formatted(), "4; 20.88 ± 1.68");
    }

    #[test]
    fn test_mean_sd_keep_missing_is_na() {
        let mut x = mpg();
        x.push(None);
        let r = mean_sd(&x, &opts().with_na_rm(false)).unwrap();
        assert_eq!(r.formatted(), "NA");
        assert!(r.get("mean").unwrap().is_nan());
    }

    #[test]
    fn test_mean_sd_degenerate() {
        let err = mean_sd(&[Some(3.0)], &opts()).unwrap_err();
        assert_eq!(
            err,
            SummaryError::DegenerateStatistic {
                statistic: "standard deviation".to_string(),
                n: 1
            }
        );
        let lenient = opts().with_degenerate(DegeneratePolicy::Placeholder);
        let r = mean_sd(&[Some(3.0)], &lenient).unwrap();
        assert_eq!(r.formatted(), "3.00 ± NA");
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            mean_sd(&[], &opts()),
            Err(SummaryError::InvalidInput(_))
        ));
        assert!(matches!(
            median_iqr(&[None, None], &opts()),
            Err(SummaryError::InvalidInput(_))
        ));
        let r = median_iqr(&[None, None], &opts().with_empty_as_na(true)).unwrap();
        assert_eq!(r.formatted(), "NA");
    }

    #[test]
    fn test_median_iqr() {
        let r = median_iqr(&mpg(), &opts()).unwrap();
        assert_eq!(r.get("median"), Some(21.0));
        assert!((r.get("q1").unwrap() - 20.425).abs() < 1e-12);
        assert!((r.get("q3").unwrap() - 21.45).abs() < 1e-12);
        assert_eq!(r.formatted(), "21.00 (20.42, 21.45)");
    }

    #[test]
    fn test_n_perc_example() {
        let x = [Some(true), Some(false), Some(true), Some(true)];
        let one = opts().with_digits(1);
        assert_eq!(n_perc(&x, true, &one).unwrap().formatted(), "3 (75.0%)");
        assert_eq!(n_perc0(&x, &one).unwrap().formatted(), "3 (75.0)");
        let tex = one.clone().with_markup(Markup::Latex);
        assert_eq!(n_perc(&x, true, &tex).unwrap().formatted(), "3 (75.0\\%)");
    }

    #[test]
    fn test_n_perc_missing_base() {
        let x = [Some(true), None, Some(false), Some(true)];
        let one = opts().with_digits(1);
        let r = n_perc(&x, true, &one).unwrap();
        assert_eq!(r.get("total"), Some(3.0));
        assert_eq!(r.formatted(), "2 (66.7%)");
        let keep = one.with_na_rm(false);
        assert_eq!(n_perc(&x, true, &keep).unwrap().formatted(), "2 (50.0%)");
    }

    #[test]
    fn test_n_perc_zero_matches() {
        let x = [Some(false), Some(false)];
        let one = opts().with_digits(1);
        assert_eq!(n_perc(&x, true, &one).unwrap().formatted(), "0 (0.0%)");
    }

    #[test]
    fn test_n_perc_empty_fails() {
        assert!(matches!(
            n_perc(&[None], true, &opts()),
            Err(SummaryError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_level_matches() {
        let col = Column::categorical([Some("a"), Some("b"), None, Some("a")]);
        assert_eq!(
            level_matches(&col, &Level::label("a")).unwrap(),
            vec![Some(true), Some(false), None, Some(true)]
        );
        assert!(level_matches(&col, &Level::label("z")).is_err());
        assert!(level_matches(&col, &Level::True).is_err());

        let flags = Column::Boolean(vec![Some(true), None, Some(false)]);
        assert_eq!(
            level_matches(&flags, &Level::False).unwrap(),
            vec![Some(false), None, Some(true)]
        );
        assert_eq!(
            level_matches(&flags, &Level::label("true")).unwrap(),
            vec![Some(true), None, Some(false)]
        );

        let numbers = Column::numeric([1.0]);
        assert!(level_matches(&numbers, &Level::True).is_err());
    }

    #[test]
    fn test_mean_ci() {
        let r = mean_ci(&mpg(), &opts()).unwrap();
        assert_eq!(r.get("mean"), Some(20.875));
        assert!((r.get("lower").unwrap() - 18.201_697_746).abs() < 1e-6);
        assert!((r.get("upper").unwrap() - 23.548_302_254).abs() < 1e-6);
        assert_eq!(r.get("level"), Some(0.95));
        assert_eq!(r.formatted(), "20.88 (18.20, 23.55)");

        let level = opts().with_ci_style(CiStyle::Level);
        assert_eq!(
            mean_ci(&mpg(), &level).unwrap().formatted(),
            "20.88 (95% CI: 18.20, 23.55)"
        );
    }

    #[test]
    fn test_mean_ci_invalid_level() {
        let bad = opts().with_ci_level(1.5);
        assert!(matches!(
            mean_ci(&mpg(), &bad),
            Err(SummaryError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_mean_se() {
        let r = mean_se(&mpg(), &opts()).unwrap();
        assert!((r.get("se").unwrap() - 0.840_014_880_8).abs() < 1e-9);
        assert_eq!(r.formatted(), "20.88 ± 0.84");
    }

    #[test]
    fn test_gmean_sd() {
        let x = [Some(1.0), Some(10.0), Some(100.0)];
        let r = gmean_sd(&x, &opts()).unwrap();
        assert!((r.get("gmean").unwrap() - 10.0).abs() < 1e-9);
        assert!((r.get("gsd").unwrap() - 10.0).abs() < 1e-9);
        assert!(matches!(
            gmean_sd(&[Some(1.0), Some(0.0)], &opts()),
            Err(SummaryError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_scalars() {
        let x = [Some(3.0), None, Some(1.5), Some(2.0)];
        let o = opts().with_digits(1);
        assert_eq!(minimum(&x, &o).unwrap().formatted(), "1.5");
        assert_eq!(maximum(&x, &o).unwrap().formatted(), "3.0");
        assert_eq!(mean(&x, &o).unwrap().formatted(), "2.2");
        assert_eq!(median(&x, &o).unwrap().formatted(), "2.0");
        assert_eq!(count(&x).formatted(), "3");
        assert_eq!(scalar("delta", 0.25, true, &o).formatted(), "+0.2");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn values(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<Option<f64>>> {
        proptest::collection::vec(
            prop_oneof![4 => (-1e3_f64..1e3).prop_map(Some), 1 => Just(None)],
            min_len..=max_len,
        )
    }

    fn flags(max_len: usize) -> impl Strategy<Value = Vec<Option<bool>>> {
        proptest::collection::vec(
            prop_oneof![4 => any::<bool>().prop_map(Some), 1 => Just(None)],
            1..=max_len,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn shift_moves_mean_not_sd(x in values(2, 60), c in -100.0_f64..100.0) {
            prop_assume!(x.iter().flatten().count() >= 2);
            let opts = FormatOptions::default();
            let base = mean_sd(&x, &opts).unwrap();
            let shifted: Vec<Option<f64>> = x.iter().map(|v| v.map(|v| v + c)).collect();
            let moved = mean_sd(&shifted, &opts).unwrap();

            let (m, s) = (base.get("mean").unwrap(), base.get("sd").unwrap());
            let (m2, s2) = (moved.get("mean").unwrap(), moved.get("sd").unwrap());
            prop_assert!(s >= 0.0);
            prop_assert!((m2 - (m + c)).abs() < 1e-9 * m.abs().max(1e3));
            prop_assert!((s2 - s).abs() < 1e-7 * s.max(1.0));
        }

        #[test]
        fn mean_and_sd_match_direct_formulas(x in values(2, 60)) {
            let present: Vec<f64> = x.iter().flatten().copied().collect();
            prop_assume!(present.len() >= 2);
            let n = present.len() as f64;
            let mean = present.iter().sum::<f64>() / n;
            let ss: f64 = present.iter().map(|v| (v - mean).powi(2)).sum();
            let sd = (ss / (n - 1.0)).sqrt();

            let r = mean_sd(&x, &FormatOptions::default()).unwrap();
            prop_assert_eq!(r.get("n").unwrap(), n);
            prop_assert!((r.get("mean").unwrap() - mean).abs() < 1e-9 * mean.abs().max(1.0));
            prop_assert!((r.get("sd").unwrap() - sd).abs() < 1e-9 * sd.max(1.0));
        }

        #[test]
        fn true_and_false_counts_cover_non_missing(x in flags(60)) {
            prop_assume!(x.iter().any(Option::is_some));
            let opts = FormatOptions::default();
            let column = Column::Boolean(x.clone());
            let yes = n_perc_level(&column, &Level::True, true, &opts).unwrap();
            let no = n_perc_level(&column, &Level::False, true, &opts).unwrap();

            let present = x.iter().flatten().count() as f64;
            prop_assert_eq!(yes.get("n").unwrap() + no.get("n").unwrap(), present);
            prop_assert!((yes.get("percent").unwrap() + no.get("percent").unwrap() - 100.0).abs() < 1e-9);
        }

        #[test]
        fn quartiles_bracket_median(x in values(1, 60)) {
            prop_assume!(x.iter().flatten().count() >= 1);
            let r = median_iqr(&x, &FormatOptions::default()).unwrap();
            let (q1, med, q3) = (r.get("q1").unwrap(), r.get("median").unwrap(), r.get("q3").unwrap());
            prop_assert!(q1 <= med && med <= q3);
        }
    }
}

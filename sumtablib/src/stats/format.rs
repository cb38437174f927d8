//! Number formatting for summary cells.
//!
//! Every function returns plain `String`s: once a value is formatted it no
//! longer depends on the options that produced it.

use crate::options::{CiStyle, FormatOptions, Markup};

/// Round to `digits` decimals, ties to even.
///
/// The tie is decided on the scaled binary value, so `2.675` (stored as
/// 2.67499999...) rounds down while `20.875` (exact) rounds up to `20.88`.
pub fn round_half_even(value: f64, digits: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(digits as i32);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round_ties_even() / scale
}

/// Format `value` with exactly `digits` decimals.
///
/// NaN formats as the missing-value placeholder. `show_sign` prefixes
/// positive values with `+`. Zero is never printed with a minus sign.
pub fn format_number(value: f64, digits: usize, show_sign: bool, opts: &FormatOptions) -> String {
    if value.is_nan() {
        return opts.na_string.clone();
    }
    if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else if show_sign { "+" } else { "" };
        return match opts.markup {
            Markup::Latex => format!("${}\\infty$", sign),
            _ => format!("{}Inf", sign),
        };
    }

    let mut rounded = round_half_even(value, digits);
    if rounded == 0.0 {
        rounded = 0.0;
    }
    let body = format!("{:.*}", digits, rounded);
    if show_sign && rounded > 0.0 {
        format!("+{}", body)
    } else {
        body
    }
}

/// Format with the configured default digits.
pub fn frmt(value: f64, opts: &FormatOptions) -> String {
    format_number(value, opts.digits, false, opts)
}

/// Format a count (integers never carry decimals).
pub fn format_count(n: usize) -> String {
    n.to_string()
}

/// Format a percentage already on the 0–100 scale.
pub fn format_percent(value: f64, digits: usize, show_symbol: bool, opts: &FormatOptions) -> String {
    let number = format_number(value, digits, false, opts);
    if !show_symbol || value.is_nan() {
        return number;
    }
    format!("{}{}", number, percent_sign(opts.markup))
}

/// The percent sign for a markup mode (`\%` in LaTeX).
pub fn percent_sign(markup: Markup) -> &'static str {
    match markup {
        Markup::Latex => "\\%",
        Markup::Plain | Markup::Markdown => "%",
    }
}

/// The plus-minus symbol for a markup mode.
pub fn plus_minus(markup: Markup) -> &'static str {
    match markup {
        Markup::Plain => "±",
        Markup::Markdown => "&plusmn;",
        Markup::Latex => "$\\pm$",
    }
}

/// Format a mean with its confidence interval using `opts.ci_style`.
///
/// `level` is only printed by `CiStyle::Level`.
pub fn format_mean_ci(
    mean: f64,
    lower: f64,
    upper: f64,
    level: f64,
    digits: usize,
    opts: &FormatOptions,
) -> String {
    let m = format_number(mean, digits, false, opts);
    let lo = format_number(lower, digits, false, opts);
    let hi = format_number(upper, digits, false, opts);
    match opts.ci_style {
        CiStyle::Comma => format!("{} ({}, {})", m, lo, hi),
        CiStyle::To => format!("{} ({} to {})", m, lo, hi),
        CiStyle::Level => format!(
            "{} ({}{} CI: {}, {})",
            m,
            format_level(level),
            percent_sign(opts.markup),
            lo,
            hi
        ),
    }
}

/// Confidence level as a percentage without trailing zeros (0.95 -> "95",
/// 0.975 -> "97.5").
fn format_level(level: f64) -> String {
    let pct = round_half_even(level * 100.0, 6);
    let text = format!("{:.6}", pct);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

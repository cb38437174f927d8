//! Student's t distribution: CDF and quantile function.
//!
//! The CDF goes through the regularized incomplete beta function (continued
//! fraction, modified Lentz). The quantile uses closed forms for one and two
//! degrees of freedom and Newton-Raphson from the normal quantile otherwise.

use std::f64::consts::PI;

/// Quantile of the t distribution with `df` degrees of freedom.
///
/// Returns `None` when `p` is outside `(0, 1)` or `df` is not positive.
pub fn t_quantile(p: f64, df: f64) -> Option<f64> {
    if !(p > 0.0 && p < 1.0) || df.is_nan() || df <= 0.0 {
        return None;
    }
    if p == 0.5 {
        return Some(0.0);
    }
    if df == 1.0 {
        return Some((PI * (p - 0.5)).tan());
    }
    if df == 2.0 {
        let a = 4.0 * p * (1.0 - p);
        return Some(2.0 * (p - 0.5) * (2.0 / a).sqrt());
    }

    // Work in the upper half, where the CDF is concave and Newton steps from
    // the normal quantile approach the root monotonically.
    let upper = p.max(1.0 - p);
    let mut t = normal_quantile(upper)?;
    for _ in 0..100 {
        let pdf = t_pdf(t, df);
        if pdf < 1e-300 {
            break;
        }
        let delta = (t_cdf(t, df) - upper) / pdf;
        t -= delta;
        if delta.abs() < 1e-12 * t.abs().max(1.0) {
            break;
        }
    }
    Some(if p < 0.5 { -t } else { t })
}

/// CDF of the t distribution
pub fn t_cdf(t: f64, df: f64) -> f64 {
    let x = df / (df + t * t);
    let tail = 0.5 * incomplete_beta(x, df / 2.0, 0.5);
    if t > 0.0 {
        1.0 - tail
    } else {
        tail
    }
}

fn t_pdf(t: f64, df: f64) -> f64 {
    let ln_coef = ln_gamma((df + 1.0) / 2.0) - ln_gamma(df / 2.0) - 0.5 * (df * PI).ln();
    ln_coef.exp() * (1.0 + t * t / df).powf(-(df + 1.0) / 2.0)
}

/// Standard normal quantile (Acklam's rational approximation).
fn normal_quantile(p: f64) -> Option<f64> {
    if p <= 0.0 || p >= 1.0 {
        return None;
    }

    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    let z = if p < P_LOW {
        let r = (-2.0 * p.ln()).sqrt();
        (((((C[0] * r + C[1]) * r + C[2]) * r + C[3]) * r + C[4]) * r + C[5])
            / ((((D[0] * r + D[1]) * r + D[2]) * r + D[3]) * r + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        q * (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5])
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let r = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * r + C[1]) * r + C[2]) * r + C[3]) * r + C[4]) * r + C[5])
            / ((((D[0] * r + D[1]) * r + D[2]) * r + D[3]) * r + 1.0)
    };
    Some(z)
}

/// Natural log of the gamma function (Lanczos, g = 7).
fn ln_gamma(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEF: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // Reflection
        PI.ln() - (PI * x).sin().ln() - ln_gamma(1.0 - x)
    } else {
        let x = x - 1.0;
        let mut acc = COEF[0];
        for (i, c) in COEF.iter().enumerate().skip(1) {
            acc += c / (x + i as f64);
        }
        let tmp = x + G + 0.5;
        0.5 * (2.0 * PI).ln() + (x + 0.5) * tmp.ln() - tmp + acc.ln()
    }
}

/// Regularized incomplete beta function I_x(a, b).
fn incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    // I_x(a, b) = 1 - I_{1-x}(b, a); the continued fraction converges fast
    // only below the mean.
    if x > (a + 1.0) / (a + b + 2.0) {
        return 1.0 - incomplete_beta(1.0 - x, b, a);
    }

    let ln_beta = ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b);
    let prefactor = (a * x.ln() + b * (1.0 - x).ln() - ln_beta - a.ln()).exp();

    const EPS: f64 = 1e-15;
    const TINY: f64 = 1e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < TINY {
        d = TINY;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=300 {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() <= EPS {
            break;
        }
    }

    prefactor * h
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_t_quantile_reference_values() {
        // qt(0.975, df) from R
        assert!(close(t_quantile(0.975, 1.0).unwrap(), 12.706_204_736, 1e-6));
        assert!(close(t_quantile(0.975, 2.0).unwrap(), 4.302_652_730, 1e-6));
        assert!(close(t_quantile(0.975, 3.0).unwrap(), 3.182_446_305, 1e-6));
        assert!(close(t_quantile(0.975, 10.0).unwrap(), 2.228_138_852, 1e-6));
        assert!(close(t_quantile(0.95, 30.0).unwrap(), 1.697_260_887, 1e-6));
        assert!(close(t_quantile(0.995, 5.0).unwrap(), 4.032_142_984, 1e-6));
    }

    #[test]
    fn test_t_quantile_symmetry() {
        let upper = t_quantile(0.9, 7.0).unwrap();
        let lower = t_quantile(0.1, 7.0).unwrap();
        assert!(close(upper, -lower, 1e-12));
        assert_eq!(t_quantile(0.5, 4.0), Some(0.0));
    }

    #[test]
    fn test_t_quantile_invalid() {
        assert_eq!(t_quantile(0.0, 3.0), None);
        assert_eq!(t_quantile(1.0, 3.0), None);
        assert_eq!(t_quantile(0.9, 0.0), None);
        assert_eq!(t_quantile(f64::NAN, 3.0), None);
    }

    #[test]
    fn test_t_cdf_inverts_quantile() {
        for &df in &[3.0, 8.0, 25.0] {
            for &p in &[0.6, 0.8, 0.95, 0.999] {
                let t = t_quantile(p, df).unwrap();
                assert!(close(t_cdf(t, df), p, 1e-9), "df={} p={}", df, p);
            }
        }
    }

    #[test]
    fn test_normal_quantile() {
        assert!(close(normal_quantile(0.975).unwrap(), 1.959_963_985, 1e-6));
        assert_eq!(normal_quantile(1.0), None);
    }
}

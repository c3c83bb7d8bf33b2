//! Numeric output formatting.
//!
//! Averages are printed the way a C `%g` conversion prints them:
//! `precision` significant digits with trailing zeros dropped. Very large
//! or very small magnitudes switch to scientific notation.

/// Significant digits used when none are configured
pub const DEFAULT_PRECISION: usize = 6;

/// Format `value` with `precision` significant digits, `%g`-style.
///
/// A `precision` of zero is treated as one.
pub fn format_general(value: f64, precision: usize) -> String {
    let precision = precision.max(1);

    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    // Round in scientific form first: rounding can carry into the next
    // decade (9.9999995 -> 1.00000e1), and the exponent must reflect that.
    let sci = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return sci;
    };

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.unsigned_abs())
    } else {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

/// Strip trailing zeros after a decimal point, and the point itself if bare.
fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

//! Conversion between engine floats and their display text.
//!
//! `format_number` is the one place floats become strings; everything the
//! engine stores, records to history, or hands to a display goes through it.

use lazy_static::lazy_static;
use regex::Regex;

use super::state::{ERROR_SENTINEL, INFINITY_SENTINEL, NEG_INFINITY_SENTINEL};

/// Magnitudes below this collapse to zero.
pub const PRECISION: f64 = 1e-15;

/// Significant digits kept for non-integer results.
pub const SIGNIFICANT_DIGITS: usize = 16;

lazy_static! {
    /// Leading decimal literal, the prefix a lenient float parse accepts.
    static ref FLOAT_PREFIX: Regex =
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").unwrap();
}

/// Format a number for display.
///
/// Tiny magnitudes become `"0"`, integers print without a decimal point,
/// and everything else is rounded to 16 significant digits before printing
/// in shortest round-trip form.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return ERROR_SENTINEL.to_string();
    }
    if value.is_infinite() {
        let sentinel = if value > 0.0 {
            INFINITY_SENTINEL
        } else {
            NEG_INFINITY_SENTINEL
        };
        return sentinel.to_string();
    }

    if value.abs() < PRECISION {
        return "0".to_string();
    }

    if value.fract() == 0.0 {
        return render_plain(value);
    }

    // Round through scientific notation to drop representation noise
    // (0.1 + 0.2 prints as 0.3).
    let rounded = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value)
        .parse::<f64>()
        .unwrap_or(value);
    render_plain(rounded)
}

/// Shortest round-trip rendering, switching to exponent form at the extremes.
fn render_plain(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let text = format!("{:e}", value);
        match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => text,
        }
    } else {
        format!("{}", value)
    }
}

/// Parse the leading decimal literal of `text`, ignoring trailing garbage.
///
/// Returns `None` when no digits lead the text. Spellings such as `inf` or
/// `NaN` are not numbers here.
pub fn parse_float(text: &str) -> Option<f64> {
    let text = text.trim();
    if text == INFINITY_SENTINEL {
        return Some(f64::INFINITY);
    }
    if text == NEG_INFINITY_SENTINEL {
        return Some(f64::NEG_INFINITY);
    }

    let literal = FLOAT_PREFIX.find(text)?.as_str();
    literal.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiny_values_collapse_to_zero() {
        assert_eq!(format_number(1e-16), "0");
        assert_eq!(format_number(-1e-16), "0");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn test_integers_have_no_point() {
        assert_eq!(format_number(15.0), "15");
        assert_eq!(format_number(-5.0), "-5");
        assert_eq!(format_number(1024.0), "1024");
    }

    #[test]
    fn test_representation_noise_is_removed() {
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(1.0 / 3.0), "0.3333333333333333");
    }

    #[test]
    fn test_exponent_form_at_extremes() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
    }

    #[test]
    fn test_formatting_is_stable() {
        for value in [0.1 + 0.2, 1.0 / 3.0, 2.0_f64.sqrt(), 1e21, 1.5e-7, 123.456, -42.0] {
            let once = format_number(value);
            let twice = format_number(parse_float(&once).unwrap());
            assert_eq!(once, twice, "unstable for {}", value);
        }
    }

    #[test]
    fn test_non_finite_values() {
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(f64::NAN), "Error");
    }

    #[test]
    fn test_lenient_parse() {
        assert_eq!(parse_float("12"), Some(12.0));
        assert_eq!(parse_float("12."), Some(12.0));
        assert_eq!(parse_float("-0.5"), Some(-0.5));
        assert_eq!(parse_float("3abc"), Some(3.0));
        assert_eq!(parse_float("1e+21"), Some(1e21));
        assert_eq!(parse_float("-"), None);
        assert_eq!(parse_float("."), None);
        assert_eq!(parse_float("inf"), None);
        assert_eq!(parse_float("FF"), None);
    }
}

//! Engineering units and SI suffix handling.

/// Parse a SPICE-style value with an optional engineering suffix.
///
/// Suffix matching is case-insensitive. `MEG` (1e6) is matched before the
/// single `M`, which SPICE reserves for milli:
///
/// - T (tera, 1e12)
/// - G (giga, 1e9)
/// - MEG (mega, 1e6)
/// - K (kilo, 1e3)
/// - M (milli, 1e-3)
/// - U (micro, 1e-6)
/// - N (nano, 1e-9)
/// - P (pico, 1e-12)
/// - F (femto, 1e-15)
///
/// Returns `None` for anything that is not a number on this grid.
pub fn parse_value(s: &str) -> Option<f64> {
    let s = s.trim().to_uppercase();

    // Plain number (also covers exponent notation like 1e-12).
    if let Ok(v) = s.parse::<f64>() {
        return Some(v);
    }

    // Split into the numeric part and the trailing suffix.
    let num_end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.' && c != '-' && c != '+' && c != 'E')
        .unwrap_or(s.len());

    if num_end == 0 {
        return None;
    }

    let (num_str, suffix) = s.split_at(num_end);
    let value: f64 = num_str.parse().ok()?;

    let multiplier = match suffix {
        "T" => 1e12,
        "G" => 1e9,
        "MEG" => 1e6,
        "K" => 1e3,
        "" => 1.0,
        "M" => 1e-3,
        "U" => 1e-6,
        "N" => 1e-9,
        "P" => 1e-12,
        "F" => 1e-15,
        _ => return None,
    };

    Some(value * multiplier)
}

/// Format a value with the engineering suffix of its decade.
///
/// The mantissa is printed with `{}` (shortest round-tripping form) and the
/// 1e6 decade uses `meg`, so `parse_value(format_engineering(x))`
/// reproduces `x` to within one ulp for any value on the suffix grid.
pub fn format_engineering(value: f64) -> String {
    let abs = value.abs();

    let (scaled, suffix) = if abs == 0.0 {
        (0.0, "")
    } else if abs >= 1e12 {
        (value / 1e12, "t")
    } else if abs >= 1e9 {
        (value / 1e9, "g")
    } else if abs >= 1e6 {
        (value / 1e6, "meg")
    } else if abs >= 1e3 {
        (value / 1e3, "k")
    } else if abs >= 1.0 {
        (value, "")
    } else if abs >= 1e-3 {
        (value * 1e3, "m")
    } else if abs >= 1e-6 {
        (value * 1e6, "u")
    } else if abs >= 1e-9 {
        (value * 1e9, "n")
    } else if abs >= 1e-12 {
        (value * 1e12, "p")
    } else if abs >= 1e-15 {
        (value * 1e15, "f")
    } else {
        (value, "")
    };

    format!("{}{}", scaled, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|v| (v - b).abs() < b.abs() * 1e-10 + 1e-20)
    }

    #[test]
    fn test_parse_plain_number() {
        assert_eq!(parse_value("1.5"), Some(1.5));
        assert_eq!(parse_value("-2.5"), Some(-2.5));
        assert_eq!(parse_value("1e-3"), Some(1e-3));
        assert_eq!(parse_value(" 42 "), Some(42.0));
    }

    #[test]
    fn test_parse_with_suffix() {
        assert!(approx_eq(parse_value("1k"), 1e3));
        assert!(approx_eq(parse_value("4.7K"), 4.7e3));
        assert!(approx_eq(parse_value("100n"), 100e-9));
        assert!(approx_eq(parse_value("1u"), 1e-6));
        assert!(approx_eq(parse_value("10p"), 10e-12));
        assert!(approx_eq(parse_value("2f"), 2e-15));
        assert!(approx_eq(parse_value("3G"), 3e9));
        assert!(approx_eq(parse_value("1T"), 1e12));
    }

    #[test]
    fn test_meg_before_milli() {
        assert!(approx_eq(parse_value("10MEG"), 10e6));
        assert!(approx_eq(parse_value("10meg"), 10e6));
        assert!(approx_eq(parse_value("10M"), 10e-3));
        assert!(approx_eq(parse_value("10m"), 10e-3));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_value("abc"), None);
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("1x"), None);
        assert_eq!(parse_value("4.7kk"), None);
    }

    #[test]
    fn test_format_round_trip() {
        // One ulp of slack, as the scale factors are not exact powers of two.
        let within_ulp = |x: f64| {
            let back = parse_value(&format_engineering(x)).unwrap();
            let ulp = x.abs() * f64::EPSILON;
            (back - x).abs() <= ulp
        };

        for &x in &[
            0.0, 1.0, -1.0, 1e3, 4.7e3, 2.2e6, 3.3e9, 1e12, 10e-3, 47e-6, 100e-9, 22e-12, 1.5e-15,
            -5.6e3,
        ] {
            assert!(within_ulp(x), "round trip failed for {}", x);
        }
    }

    #[test]
    fn test_format_suffixes() {
        assert_eq!(format_engineering(1000.0), "1k");
        assert_eq!(format_engineering(0.001), "1m");
        assert_eq!(format_engineering(1e6), "1meg");
        assert_eq!(format_engineering(1e-9), "1n");
        assert_eq!(format_engineering(0.0), "0");
    }
}

//! Textual form of numeric values stored in case files.

/// Format a float the way the solver tooling writes it.
///
/// Integral values keep one decimal (`3000.0`, `0.0`); other values use the
/// shortest representation that parses back to the same number.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_values_keep_decimal() {
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(273.0), "273.0");
        assert_eq!(format_float(-2.0), "-2.0");
        assert_eq!(format_float(1e12), "1000000000000.0");
    }

    #[test]
    fn fractional_values_are_shortest() {
        assert_eq!(format_float(0.35), "0.35");
        assert_eq!(format_float(0.012), "0.012");
        assert_eq!(format_float(2500.5), "2500.5");
    }
}

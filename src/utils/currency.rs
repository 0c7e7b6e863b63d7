// utils/currency.rs
//
// Amounts are i64 minor units everywhere (1 major unit = 100 minor units).
// Formatting is integer-only; floats appear only in the fee calculator
// where rates are applied.

/// Render minor units as "129.95 USD" for user-facing messages.
pub fn format_minor(minor: i64, currency: &str) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{}{}.{:02} {}", sign, abs / 100, abs % 100, currency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_minor_whole_and_fractional() {
        assert_eq!(format_minor(12995, "USD"), "129.95 USD");
        assert_eq!(format_minor(500, "EUR"), "5.00 EUR");
        assert_eq!(format_minor(7, "USD"), "0.07 USD");
    }

    #[test]
    fn test_format_minor_zero_and_negative() {
        assert_eq!(format_minor(0, "USD"), "0.00 USD");
        assert_eq!(format_minor(-150, "USD"), "-1.50 USD");
    }
}

//! Currency rendering in the product's locale: digits grouped by threes with
//! a no-break space, a comma before the fraction, and the symbol last.

const GROUP_SEPARATOR: char = '\u{a0}';
const DECIMAL_SEPARATOR: char = ',';

/// Whole-unit figure such as amounts and payments.
pub fn format_money(value: f64, symbol: &str) -> String {
    format_with_digits(value, 0, symbol)
}

/// Two-digit figure such as the service fee.
pub fn format_money_precise(value: f64, symbol: &str) -> String {
    format_with_digits(value, 2, symbol)
}

fn format_with_digits(value: f64, digits: usize, symbol: &str) -> String {
    let fixed = format!("{:.*}", digits, value.abs());
    let (whole, fraction) = match fixed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::new();
    if value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    out.push_str(&group_thousands(whole));
    if let Some(fraction) = fraction {
        out.push(DECIMAL_SEPARATOR);
        out.push_str(fraction);
    }
    out.push(GROUP_SEPARATOR);
    out.push_str(symbol);
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn whole_amount_is_grouped() {
        assert_eq!(format_money(100_000.0, "₽"), "100\u{a0}000\u{a0}₽");
    }

    #[test]
    fn small_amount_has_no_separator() {
        assert_eq!(format_money(999.0, "₽"), "999\u{a0}₽");
    }

    #[test]
    fn whole_amount_rounds_fraction_away() {
        assert_eq!(format_money(9_263.45, "₽"), "9\u{a0}263\u{a0}₽");
    }

    #[test]
    fn precise_amount_keeps_two_digits() {
        assert_eq!(format_money_precise(20_000.0, "₽"), "20\u{a0}000,00\u{a0}₽");
        assert_eq!(format_money_precise(150.15, "₽"), "150,15\u{a0}₽");
    }

    #[test]
    fn millions_group_twice() {
        assert_eq!(format_money(1_234_567.0, "$"), "1\u{a0}234\u{a0}567\u{a0}$");
    }

    #[test]
    fn negative_values_keep_sign() {
        assert_eq!(format_money(-1_500.0, "₽"), "-1\u{a0}500\u{a0}₽");
    }
}

//! Amount parsing and range checks for the calculator input.

/// Lowest principal any deployment accepts.
pub const MIN_AMOUNT: i64 = 1_000;

/// Parses the leading integer of a user-entered amount.
///
/// Leading whitespace and a single sign are accepted and parsing stops at the
/// first non-digit, so `"12000abc"` reads as `12000`. Input without leading
/// digits is not a number and yields `None`, as does a value too large for
/// `i64`.
pub fn parse_amount(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    let value: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// True when the integer-parsed amount lies in `[min, max]`.
pub fn is_amount_valid(input: &str, min: i64, max: i64) -> bool {
    parse_amount(input).is_some_and(|amount| (min..=max).contains(&amount))
}

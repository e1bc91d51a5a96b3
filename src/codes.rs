//! Sequential user codes ("AW001", "AW002", ...).
//!
//! Both repositories allocate through `next_code`, always while holding
//! whatever serializes inserts (a counter row lock in Postgres, the store
//! mutex in memory).

/// Minimum digit count of the numeric suffix.
pub const CODE_WIDTH: usize = 3;

/// Formats `prefix` + counter, zero-padded to three digits.
pub fn format_code(prefix: &str, value: u32) -> String {
    format!("{prefix}{value:0width$}", width = CODE_WIDTH)
}

/// Numeric suffix of `code` when it is `prefix` followed only by digits.
pub fn parse_suffix(prefix: &str, code: &str) -> Option<u32> {
    let digits = code.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Picks the next code for `prefix`.
///
/// The value is one past the larger of the stored counter and the highest
/// numeric suffix among `existing` codes. Codes edited out of order can
/// therefore never pull the sequence backwards. Returns the new counter value
/// together with the formatted code.
pub fn next_code<'a, I>(prefix: &str, existing: I, counter: u32) -> (u32, String)
where
    I: IntoIterator<Item = &'a str>,
{
    let highest = existing
        .into_iter()
        .filter_map(|code| parse_suffix(prefix, code))
        .max()
        .unwrap_or(0);
    let value = highest.max(counter).saturating_add(1);
    (value, format_code(prefix, value))
}

//! Small pure text helpers.

/// Collapse whitespace runs (including newlines) into single spaces.
///
/// Error messages flow into single-line status displays; embedded newlines
/// would corrupt them.
#[must_use]
pub fn single_line(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_gap = false;
    for c in raw.trim().chars() {
        if c.is_whitespace() {
            in_gap = true;
        } else {
            if in_gap {
                out.push(' ');
            }
            in_gap = false;
            out.push(c);
        }
    }
    out
}

/// Truncate a string to a maximum length, adding `...` if needed.
///
/// - Trims surrounding whitespace before truncating.
/// - Uses `char` count (not bytes) to avoid splitting Unicode scalar values.
/// - Enforces a minimum `max` of 3 so the ellipsis fits.
#[must_use]
pub fn truncate_with_ellipsis(raw: &str, max: usize) -> String {
    let max = max.max(3);
    let trimmed = raw.trim();
    if trimmed.chars().count() <= max {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(max.saturating_sub(3)).collect();
    format!("{head}...")
}

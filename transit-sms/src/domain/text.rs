//! Reply text helpers.

/// Ellipsis appended to shortened text.
pub const ELLIPSIS: char = '…';

/// Shorten `text` to at most `max_chars` characters, ending in `…` when
/// anything was cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push(ELLIPSIS);
    out
}

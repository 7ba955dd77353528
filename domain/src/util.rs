//! Small string helpers for display code.

/// Longest prefix of `s` that fits in `max_bytes` and ends on a char boundary.
///
/// Oracle error bodies and explanations can be long and are often not
/// ASCII, so byte slicing must back off to the previous boundary.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

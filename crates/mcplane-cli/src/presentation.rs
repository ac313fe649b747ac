//! Shared table-formatting helpers for command output.

/// Print a horizontal separator line of the given width.
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

/// Truncate a string to at most `max_len` characters, appending an
/// ellipsis when truncation happened.
#[must_use]
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
    format!("{truncated}…")
}

/// Format an optional value for a table cell.
#[must_use]
pub fn cell(value: Option<&str>) -> &str {
    value.unwrap_or("--")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_untouched() {
        assert_eq!(truncate_string("short", 10), "short");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate_string("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_cell_default() {
        assert_eq!(cell(None), "--");
        assert_eq!(cell(Some("x")), "x");
    }
}

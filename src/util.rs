//! Shared utility functions

use unicode_width::UnicodeWidthChar;

/// Truncate a string to at most `max_cols` terminal columns, appending an
/// ellipsis when anything was cut. Width-aware so emoji and CJK text never
/// overflow a card or list row.
pub fn truncate_width(s: &str, max_cols: usize) -> String {
    let total: usize = s.chars().filter_map(|c| c.width()).sum();
    if total <= max_cols {
        return s.to_string();
    }
    let budget = max_cols.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// Short form of an opaque identifier for display fallbacks: the first
/// eight characters, respecting character boundaries.
pub fn short_id(id: &str) -> String {
    let mut out: String = id.chars().take(8).collect();
    if out.len() < id.len() {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_width_shorter_than_max() {
        assert_eq!(truncate_width("cabai", 10), "cabai");
    }

    #[test]
    fn test_truncate_width_cuts_with_ellipsis() {
        assert_eq!(truncate_width("cabai rawit merah", 10), "cabai raw…");
    }

    #[test]
    fn test_truncate_width_counts_wide_chars() {
        // Emoji are two columns wide; "🍅🍅🍅" is six columns
        let out = truncate_width("🍅🍅🍅", 5);
        assert_eq!(out, "🍅🍅…");
    }

    #[test]
    fn test_truncate_width_exact_fit() {
        assert_eq!(truncate_width("tomat", 5), "tomat");
    }

    #[test]
    fn test_short_id_truncates_long_ids() {
        assert_eq!(
            short_id("3f8a2b1c-9d4e-4f5a-8b6c-7d8e9f0a1b2c"),
            "3f8a2b1c…"
        );
    }

    #[test]
    fn test_short_id_keeps_short_ids() {
        assert_eq!(short_id("p1"), "p1");
    }
}

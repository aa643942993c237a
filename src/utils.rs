//! Common utility functions

/// Codepoint ranges treated as Japanese: CJK Unified Ideographs, Hiragana, Katakana.
pub const JAPANESE_RANGES: &[(char, char)] = &[
    ('\u{4E00}', '\u{9FFC}'),
    ('\u{3040}', '\u{309F}'),
    ('\u{30A0}', '\u{30FF}'),
];

/// Rough check for a single character. Does not separate Japanese from
/// Chinese, and ignores ideographs outside the basic block.
pub fn is_japanese_char(c: char) -> bool {
    JAPANESE_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&c))
}

/// True when any character of `s` falls in [`JAPANESE_RANGES`].
pub fn is_japanese(s: &str) -> bool {
    s.chars().any(is_japanese_char)
}

pub fn truncate_display(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

pub fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

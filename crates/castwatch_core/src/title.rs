//! Title Cleaner: builds the search query sent to the remote platform from
//! a noisy home-automation title.

use regex::Regex;
use std::sync::LazyLock;

const MAX_QUERY_LEN: usize = 500;
const LONG_TITLE_THRESHOLD: usize = 100;
const POSSESSIVE_MAX_LEN: usize = 30;

static EMOJI_OR_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[^\w\s\-'"]"#).unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Trailing parenthesized/bracketed noise suffixes, folded in from the
/// original matcher's replacement table (e.g. "(Official Video)",
/// "(Lyric Video)", "[Audio]").
static TRAILING_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[\(\[]\s*(official\s*(music\s*)?video|lyric\s*video|audio|hd|hq|official|lyrics)\s*[\)\]]\s*$",
    )
    .unwrap()
});

static POSSESSIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+(?:'s)\b(?:\s+\w+){0,3}").unwrap());

const EVENT_KEYWORDS: &[&str] = &[
    "super bowl",
    "halftime show",
    "concert",
    "live",
    "performance",
    "awards",
    "festival",
    "tour",
    "show",
];

const GENERIC_ARTISTS: &[&str] = &["youtube", "unknown", ""];

fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").trim().to_string()
}

/// Step 1: Unicode-normalize and truncate to 500 chars.
fn normalize_and_truncate(raw: &str) -> String {
    use unicode_normalization::UnicodeNormalization;
    let nfc: String = raw.nfc().collect();
    nfc.chars().take(MAX_QUERY_LEN).collect()
}

/// Step 2: strip emoji and characters outside `[\w\s\-'"]`.
fn strip_disallowed(s: &str) -> String {
    EMOJI_OR_DISALLOWED.replace_all(s, "").to_string()
}

/// Step 3: if a `|` separator is present, keep only the first segment (or
/// the first two if the first segment is shorter than 10 chars).
fn truncate_pipe_segments(s: &str) -> String {
    if !s.contains('|') {
        return s.to_string();
    }
    let segments: Vec<&str> = s.split('|').map(str::trim).collect();
    match segments.as_slice() {
        [first] => (*first).to_string(),
        [first, second, ..] if first.len() < 10 => format!("{first} {second}"),
        [first, ..] => (*first).to_string(),
        [] => String::new(),
    }
}

/// Step 4: remove trailing parenthesized/bracketed noise suffixes.
fn strip_trailing_noise(s: &str) -> String {
    TRAILING_NOISE.replace(s, "").trim().to_string()
}

/// Step 5: for long titles, extract possessive names and event phrases
/// with a small window of surrounding context.
fn extract_salient_phrases(s: &str) -> String {
    if s.len() <= LONG_TITLE_THRESHOLD {
        return s.to_string();
    }

    let mut phrases = Vec::new();
    for m in POSSESSIVE.find_iter(s) {
        if m.as_str().len() < POSSESSIVE_MAX_LEN {
            phrases.push(m.as_str().to_string());
        }
    }

    let words: Vec<&str> = s.split_whitespace().collect();
    let lower_words: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
    for keyword in EVENT_KEYWORDS {
        let keyword_words: Vec<&str> = keyword.split_whitespace().collect();
        let n = keyword_words.len();
        if n == 0 || n > lower_words.len() {
            continue;
        }
        for start in 0..=(lower_words.len() - n) {
            if lower_words[start..start + n] == keyword_words[..] {
                let ctx_start = start.saturating_sub(2);
                let ctx_end = (start + n + 2).min(words.len());
                phrases.push(words[ctx_start..ctx_end].join(" "));
            }
        }
    }

    if phrases.is_empty() {
        s.to_string()
    } else {
        phrases.join(" ")
    }
}

/// True when `artist` should not be appended: generic or empty.
fn is_generic_artist(artist: &str) -> bool {
    GENERIC_ARTISTS.contains(&artist.to_lowercase().trim())
}

/// Builds the search query sent to the remote platform from a raw
/// home-automation title and an optional artist (spec §4.3, steps 1-8).
///
/// # Examples
///
/// ```
/// use castwatch_core::title::clean_title;
///
/// let q = clean_title("Yesterday (Official Music Video)", Some("The Beatles"));
/// assert!(q.contains("Yesterday"));
/// assert!(q.contains("The Beatles"));
/// assert!(!q.to_lowercase().contains("official"));
/// ```
pub fn clean_title(raw_title: &str, artist: Option<&str>) -> String {
    let mut query = normalize_and_truncate(raw_title);
    query = strip_disallowed(&query);
    query = truncate_pipe_segments(&query);
    query = strip_trailing_noise(&query);
    query = extract_salient_phrases(&query);
    query = collapse_whitespace(&query);

    if let Some(artist) = artist {
        if !is_generic_artist(artist) && !query.to_lowercase().contains(&artist.to_lowercase()) {
            query = format!("{query} {artist}");
        }
    }

    query.chars().take(MAX_QUERY_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_500_chars_passes_through() {
        let raw = "a".repeat(500);
        let cleaned = clean_title(&raw, None);
        assert_eq!(cleaned.len(), 500);
    }

    #[test]
    fn longer_than_500_is_truncated() {
        let raw = "a".repeat(600);
        let cleaned = clean_title(&raw, None);
        assert!(cleaned.len() <= 500);
    }

    #[test]
    fn strips_trailing_official_video_suffix() {
        let cleaned = clean_title("Some Song (Official Video)", None);
        assert_eq!(cleaned, "Some Song");
    }

    #[test]
    fn strips_emoji_and_disallowed_chars() {
        let cleaned = clean_title("Cool Song 🔥🎶", None);
        assert!(!cleaned.contains('🔥'));
    }

    #[test]
    fn keeps_short_first_pipe_segment_plus_second() {
        let cleaned = clean_title("A | Real Artist Name", None);
        assert!(cleaned.contains("Real Artist Name"));
    }

    #[test]
    fn drops_second_pipe_segment_when_first_is_long() {
        let cleaned = clean_title("A Reasonably Long First Segment | Second", None);
        assert!(!cleaned.contains("Second"));
    }

    #[test]
    fn appends_non_generic_artist_once() {
        let cleaned = clean_title("Yesterday", Some("The Beatles"));
        assert_eq!(cleaned.matches("The Beatles").count(), 1);
    }

    #[test]
    fn does_not_append_generic_artist() {
        let cleaned = clean_title("Some Title", Some("Unknown"));
        assert!(!cleaned.to_lowercase().contains("unknown"));
    }
}

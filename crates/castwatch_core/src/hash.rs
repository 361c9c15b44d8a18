//! Content Hasher: deterministic normalization + SHA-256 over
//! `(artist, title, duration)`.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

static NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NOISE_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(official|video|audio|hd|hq|lyrics|music)\b").unwrap()
});

/// Normalizes an artist for content-hash purposes: lowercase, strip
/// punctuation, collapse whitespace. Unlike [`normalize_title`], noise
/// words are left in place.
fn normalize_artist(artist: &str) -> String {
    let lower = artist.to_lowercase();
    let stripped = NON_ALNUM.replace_all(&lower, "");
    WHITESPACE.replace_all(stripped.trim(), " ").trim().to_string()
}

/// Normalizes a title for content-hash purposes: lowercase, strip
/// punctuation, collapse whitespace, then remove noise words and
/// collapse whitespace again.
fn normalize_title(title: &str) -> String {
    let lower = title.to_lowercase();
    let stripped = NON_ALNUM.replace_all(&lower, "");
    let collapsed = WHITESPACE.replace_all(stripped.trim(), " ");
    let de_noised = NOISE_WORDS.replace_all(collapsed.trim(), "");
    WHITESPACE.replace_all(de_noised.trim(), " ").trim().to_string()
}

/// Computes the SHA-256 hex content hash of `(artist, title, duration)`.
///
/// `duration` of `None` is stringified as `-1` to distinguish "unknown"
/// from a genuine zero-length track. `artist`, when present, is prepended
/// with a `|` separator; when absent, no separator is emitted.
///
/// # Examples
///
/// ```
/// use castwatch_core::hash::content_hash;
///
/// let a = content_hash(Some("The Beatles"), "Yesterday", Some(125));
/// let b = content_hash(Some("The Beatles"), "Yesterday (Official Video)", Some(125));
/// assert_eq!(a, b, "noise words must not change the hash");
///
/// let c = content_hash(Some("The Beatles"), "Yesterday", Some(126));
/// assert_ne!(a, c, "a different duration must change the hash");
/// ```
pub fn content_hash(artist: Option<&str>, title: &str, duration: Option<i32>) -> String {
    let normalized_title = normalize_title(title);
    let duration_str = duration.map(|d| d.to_string()).unwrap_or_else(|| "-1".to_string());

    let payload = match artist.map(normalize_artist).filter(|a| !a.is_empty()) {
        Some(normalized_artist) => format!("{normalized_artist}|{normalized_title}|{duration_str}"),
        None => format!("{normalized_title}|{duration_str}"),
    };

    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_content_same_hash_across_calls() {
        let h1 = content_hash(Some("Artist"), "Title", Some(100));
        let h2 = content_hash(Some("Artist"), "Title", Some(100));
        assert_eq!(h1, h2);
    }

    #[test]
    fn different_artist_changes_hash() {
        let h1 = content_hash(Some("Artist A"), "Title", Some(100));
        let h2 = content_hash(Some("Artist B"), "Title", Some(100));
        assert_ne!(h1, h2);
    }

    #[test]
    fn missing_duration_is_distinct_from_zero() {
        let none = content_hash(None, "Title", None);
        let zero = content_hash(None, "Title", Some(0));
        assert_ne!(none, zero);
    }

    #[test]
    fn noise_words_are_stripped() {
        let h1 = content_hash(None, "Song Title", None);
        let h2 = content_hash(None, "Song Title (Official HD Lyrics Video)", None);
        assert_eq!(h1, h2);
    }

    #[test]
    fn whitespace_and_case_are_normalized() {
        let h1 = content_hash(None, "song title", None);
        let h2 = content_hash(None, "  SONG   TITLE  ", None);
        assert_eq!(h1, h2);
    }

    #[test]
    fn artist_noise_words_are_not_stripped() {
        let h1 = content_hash(Some("Official Video Band"), "Title", Some(1));
        let h2 = content_hash(Some("Band"), "Title", Some(1));
        assert_ne!(h1, h2, "artist noise words must change the hash");
    }

    #[test]
    fn missing_artist_has_no_leading_separator() {
        let with_artist = content_hash(Some(""), "Title", Some(1));
        let without_artist = content_hash(None, "Title", Some(1));
        assert_eq!(with_artist, without_artist);
    }
}

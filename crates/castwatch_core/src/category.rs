//! Remote platform category id → human-readable name, for admin/logging
//! display only. No invariant depends on this table; an unresolved id is
//! not an error.

/// `(category_id, display_name)` pairs, as published by the remote
/// platform's `videoCategories.list` endpoint.
const CATEGORIES: &[(&str, &str)] = &[
    ("1", "Film & Animation"),
    ("2", "Autos & Vehicles"),
    ("10", "Music"),
    ("15", "Pets & Animals"),
    ("17", "Sports"),
    ("19", "Travel & Events"),
    ("20", "Gaming"),
    ("22", "People & Blogs"),
    ("23", "Comedy"),
    ("24", "Entertainment"),
    ("25", "News & Politics"),
    ("26", "Howto & Style"),
    ("27", "Education"),
    ("28", "Science & Technology"),
    ("29", "Nonprofits & Activism"),
];

/// Looks up a display name for a remote platform category id.
///
/// Returns `None` for ids outside the known table; callers should fall
/// back to displaying the raw id rather than treating this as an error.
///
/// # Examples
///
/// ```
/// use castwatch_core::category::category_name;
///
/// assert_eq!(category_name("10"), Some("Music"));
/// assert_eq!(category_name("9999"), None);
/// ```
pub fn category_name(category_id: &str) -> Option<&'static str> {
    CATEGORIES
        .iter()
        .find(|(id, _)| *id == category_id)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_category() {
        assert_eq!(category_name("24"), Some("Entertainment"));
    }

    #[test]
    fn unknown_category_resolves_to_none() {
        assert_eq!(category_name("not-a-real-id"), None);
    }
}

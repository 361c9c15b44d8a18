//! Hybrid title similarity scoring (spec §4.4 step 3).
//!
//! Grounded on `original_source/matcher.py`'s overlap-ratio scoring,
//! restated as a typed scorer instead of a dict-mutating function.

use std::collections::HashSet;

/// Scores `candidate_title` against `query`: exact match (case-insensitive)
/// scores 1.0, a substring containment scores 0.9, otherwise the Jaccard
/// index over whitespace-separated word sets.
pub fn score_title(query: &str, candidate_title: &str) -> f64 {
    let query_lower = query.to_lowercase();
    let candidate_lower = candidate_title.to_lowercase();

    if query_lower == candidate_lower {
        return 1.0;
    }
    if candidate_lower.contains(&query_lower) {
        return 0.9;
    }
    jaccard(&query_lower, &candidate_lower)
}

fn jaccard(a: &str, b: &str) -> f64 {
    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();
    if words_a.is_empty() && words_b.is_empty() {
        return 0.0;
    }
    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_scores_one() {
        assert_eq!(score_title("Yesterday", "yesterday"), 1.0);
    }

    #[test]
    fn containment_scores_point_nine() {
        assert_eq!(score_title("Yesterday", "Yesterday (Remastered 2015)"), 0.9);
    }

    #[test]
    fn disjoint_titles_score_zero() {
        assert_eq!(score_title("Yesterday", "Tomorrow Never Knows"), 0.0);
    }

    #[test]
    fn partial_overlap_scores_between_zero_and_one() {
        let score = score_title("Flowers Miley Cyrus", "Miley Cyrus Flowers Official Video");
        assert!(score > 0.0 && score < 1.0);
    }
}

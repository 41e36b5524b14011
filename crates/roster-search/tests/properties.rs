//! Property tests for normalization and scoring.

use proptest::prelude::*;
use rapidfuzz::distance::indel;
use roster_search::{matching_ratio, normalize, score};

fn name_text() -> impl Strategy<Value = String> {
    // Arabic letters, harakat, Latin and assorted whitespace
    proptest::collection::vec(
        prop_oneof![
            proptest::char::range('\u{0621}', '\u{064A}'),
            proptest::char::range('\u{064B}', '\u{0652}'),
            proptest::char::range('a', 'z'),
            proptest::char::range('A', 'Z'),
            Just(' '),
            Just('\t'),
        ],
        0..24,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn normalize_is_idempotent(text in name_text()) {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalized_text_has_single_inner_spaces(text in name_text()) {
        let normalized = normalize(&text);
        prop_assert!(!normalized.starts_with(' '));
        prop_assert!(!normalized.ends_with(' '));
        prop_assert!(!normalized.contains("  "));
        let harakat = '\u{064B}'..='\u{0652}';
        prop_assert!(!normalized.chars().any(|c| harakat.contains(&c)));
    }

    #[test]
    fn scores_stay_in_unit_interval(query in name_text(), candidate in name_text()) {
        let query = normalize(&query);
        let candidate = normalize(&candidate);
        let words: Vec<&str> = if query.is_empty() {
            Vec::new()
        } else {
            query.split(' ').collect()
        };
        let value = score(&words, &candidate);
        prop_assert!((0.0..=1.0).contains(&value));
        if !query.is_empty() && query == candidate {
            prop_assert_eq!(value, 1.0);
        }
    }

    #[test]
    fn matching_ratio_never_exceeds_lcs_ratio(a in name_text(), b in name_text()) {
        let a = normalize(&a);
        let b = normalize(&b);
        let blocks = matching_ratio(&a, &b);
        prop_assert!((0.0..=1.0).contains(&blocks));
        if !a.is_empty() || !b.is_empty() {
            let lcs = indel::normalized_similarity(a.chars(), b.chars());
            prop_assert!(blocks <= lcs + 1e-9, "blocks {} > lcs {}", blocks, lcs);
        }
    }
}

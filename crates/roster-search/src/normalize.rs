//! Canonical comparison form for name text.
//!
//! Normalization runs in a single pass over the input:
//!
//! 1. Arabic harakat (U+064B..=U+0652) are dropped.
//! 2. Letter variants are folded through [`LETTER_FOLDS`].
//! 3. Whitespace runs collapse to one space; leading and trailing
//!    whitespace is removed.
//! 4. The result is lower-cased, which only affects non-Arabic scripts.
//!
//! The folding is lossy. Alef with hamza/madda, plain alef, teh marbuta and
//! heh, yeh and alef maksura all collapse pairwise, so two different names
//! can share one key (e.g. `علي` and `على`). Matching treats them as equal.

/// Letter folds, sorted by source code point for binary search.
pub const LETTER_FOLDS: [(char, char); 7] = [
    ('\u{0622}', '\u{0627}'), // alef with madda above -> alef
    ('\u{0623}', '\u{0627}'), // alef with hamza above -> alef
    ('\u{0624}', '\u{0648}'), // waw with hamza above -> waw
    ('\u{0625}', '\u{0627}'), // alef with hamza below -> alef
    ('\u{0626}', '\u{0649}'), // yeh with hamza above -> alef maksura
    ('\u{0629}', '\u{0647}'), // teh marbuta -> heh
    ('\u{064A}', '\u{0649}'), // yeh -> alef maksura
];

const ARABIC_RANGES: [(char, char); 5] = [
    ('\u{0600}', '\u{06FF}'),
    ('\u{0750}', '\u{077F}'),
    ('\u{08A0}', '\u{08FF}'),
    ('\u{FB50}', '\u{FDFF}'),
    ('\u{FE70}', '\u{FEFF}'),
];

fn is_arabic_diacritic(ch: char) -> bool {
    ('\u{064B}'..='\u{0652}').contains(&ch)
}

fn fold_letter(ch: char) -> char {
    LETTER_FOLDS
        .binary_search_by_key(&ch, |&(from, _)| from)
        .map(|idx| LETTER_FOLDS[idx].1)
        .unwrap_or(ch)
}

/// Maps raw text to its canonical comparison form.
///
/// Total and deterministic. The output has no leading or trailing space and
/// no internal runs of whitespace, and `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if is_arabic_diacritic(ch) {
            continue;
        }
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.extend(fold_letter(ch).to_lowercase());
    }
    out
}

/// Normalizes an optional value; absent input yields the empty string.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// Returns true if `text` has at least one character from the Arabic blocks
/// (main, supplement, extended-A, presentation forms A and B).
pub fn contains_arabic(text: &str) -> bool {
    text.chars().any(|ch| {
        ARABIC_RANGES
            .iter()
            .any(|&(lo, hi)| (lo..=hi).contains(&ch))
    })
}

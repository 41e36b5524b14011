//! Graded similarity between a name query and an indexed name.
//!
//! Both sides are expected to be normalized already (see
//! [`crate::normalize`]). Scores fall in `[0, 1]`:
//!
//! | tier              | condition                                 | score                          |
//! |-------------------|-------------------------------------------|--------------------------------|
//! | exact             | joined query equals candidate             | 1.0                            |
//! | full word overlap | every distinct query word is a candidate word | max(0.95, sequence)        |
//! | partial overlap   | some query words are candidate words      | max(sequence, ratio * 0.8), word-containment floor 0.6 |
//! | sequence          | no shared words                           | matching-blocks ratio with floors |

use std::collections::{HashMap, HashSet};

pub const EXACT_SCORE: f64 = 1.0;
pub const FULL_OVERLAP_SCORE: f64 = 0.95;
pub const PARTIAL_OVERLAP_WEIGHT: f64 = 0.8;
pub const CONTAINMENT_FLOOR: f64 = 0.8;
pub const SHARED_WORD_FLOOR: f64 = 0.6;
pub const WORD_CONTAINMENT_FLOOR: f64 = 0.6;

/// Minimum word length (in characters) for the word-containment floor.
pub const MIN_CONTAINED_WORD_CHARS: usize = 3;

/// Candidates at least this long drop their most frequent characters from
/// the block search.
const POPULAR_MIN_LEN: usize = 200;

/// Scores `candidate` against a query already split into words.
pub fn score(query_words: &[&str], candidate: &str) -> f64 {
    if query_words.is_empty() || candidate.is_empty() {
        return 0.0;
    }
    let query = query_words.join(" ");
    if query == candidate {
        return EXACT_SCORE;
    }

    let candidate_words: Vec<&str> = candidate.split_whitespace().collect();
    let query_set: HashSet<&str> = query_words.iter().copied().collect();
    let candidate_set: HashSet<&str> = candidate_words.iter().copied().collect();
    let common = query_set.intersection(&candidate_set).count();

    if common == 0 {
        return sequence_similarity(&query, candidate);
    }
    if common == query_set.len() {
        return FULL_OVERLAP_SCORE.max(sequence_similarity(&query, candidate));
    }

    // ratio over the query as typed, duplicates included
    let word_ratio = common as f64 / query_words.len() as f64;
    let mut result =
        sequence_similarity(&query, candidate).max(word_ratio * PARTIAL_OVERLAP_WEIGHT);
    if has_contained_word(query_words, &candidate_words) {
        result = result.max(WORD_CONTAINMENT_FLOOR);
    }
    result.clamp(0.0, 1.0)
}

/// Character-sequence similarity between two whole strings.
///
/// Base value is [`matching_ratio`] with `a` as the query side.
/// Substring containment floors the result at [`CONTAINMENT_FLOOR`]; a shared
/// whitespace-separated word floors it at [`SHARED_WORD_FLOOR`].
pub fn sequence_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return EXACT_SCORE;
    }

    let mut similarity = matching_ratio(a, b);
    if a.contains(b) || b.contains(a) {
        similarity = similarity.max(CONTAINMENT_FLOOR);
    }
    let a_words: HashSet<&str> = a.split_whitespace().collect();
    if b.split_whitespace().any(|word| a_words.contains(word)) {
        similarity = similarity.max(SHARED_WORD_FLOOR);
    }
    similarity.clamp(0.0, 1.0)
}

/// Ratcliff/Obershelp ratio `2 * M / (|a| + |b|)` over characters.
///
/// `M` is the size of the longest common block plus, recursively, the blocks
/// found to its left and to its right. The ratio is not symmetric and never
/// exceeds the LCS ratio of the same pair.
pub fn matching_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return EXACT_SCORE;
    }
    let matched = BlockMatcher::new(&a, &b).matched_chars();
    2.0 * matched as f64 / total as f64
}

struct BlockMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Ascending positions of each character of `b`.
    b_positions: HashMap<char, Vec<usize>>,
}

impl<'a> BlockMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b_positions: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &ch) in b.iter().enumerate() {
            b_positions.entry(ch).or_default().push(j);
        }
        if b.len() >= POPULAR_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b_positions.retain(|_, positions| positions.len() <= limit);
        }
        Self { a, b, b_positions }
    }

    /// Total size of all matching blocks.
    fn matched_chars(&self) -> usize {
        let mut matched = 0;
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];
        while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
            let (i, j, len) = self.longest_match(a_lo, a_hi, b_lo, b_hi);
            if len == 0 {
                continue;
            }
            matched += len;
            if a_lo < i && b_lo < j {
                pending.push((a_lo, i, b_lo, j));
            }
            if i + len < a_hi && j + len < b_hi {
                pending.push((i + len, a_hi, j + len, b_hi));
            }
        }
        matched
    }

    /// Longest block `a[i..i+len] == b[j..j+len]` inside the given ranges.
    /// Ties go to the smallest `i`, then the smallest `j`.
    fn longest_match(
        &self,
        a_lo: usize,
        a_hi: usize,
        b_lo: usize,
        b_hi: usize,
    ) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_len) = (a_lo, b_lo, 0);
        // run length of the match ending at each b position, previous row
        let mut runs: HashMap<usize, usize> = HashMap::new();
        for i in a_lo..a_hi {
            let mut next_runs = HashMap::new();
            if let Some(positions) = self.b_positions.get(&self.a[i]) {
                for &j in positions {
                    if j < b_lo {
                        continue;
                    }
                    if j >= b_hi {
                        break;
                    }
                    let len = j
                        .checked_sub(1)
                        .and_then(|prev| runs.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_runs.insert(j, len);
                    if len > best_len {
                        best_i = i + 1 - len;
                        best_j = j + 1 - len;
                        best_len = len;
                    }
                }
            }
            runs = next_runs;
        }

        // popular characters are absent from the position table
        while best_i > a_lo && best_j > b_lo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_len += 1;
        }
        while best_i + best_len < a_hi
            && best_j + best_len < b_hi
            && self.a[best_i + best_len] == self.b[best_j + best_len]
        {
            best_len += 1;
        }
        (best_i, best_j, best_len)
    }
}

fn has_contained_word(query_words: &[&str], candidate_words: &[&str]) -> bool {
    query_words
        .iter()
        .filter(|word| word.chars().count() >= MIN_CONTAINED_WORD_CHARS)
        .any(|query_word| {
            candidate_words
                .iter()
                .filter(|word| word.chars().count() >= MIN_CONTAINED_WORD_CHARS)
                .any(|candidate_word| {
                    candidate_word.contains(query_word) || query_word.contains(candidate_word)
                })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(score(&["محمد", "احمد"], "محمد احمد"), 1.0);
        assert_eq!(sequence_similarity("abc", "abc"), 1.0);
    }

    #[test]
    fn word_order_does_not_matter_for_full_overlap() {
        assert_eq!(score(&["احمد", "محمد"], "محمد احمد على"), 0.95);
        assert_eq!(score(&["احمد"], "محمد احمد على"), 0.95);
    }

    #[test]
    fn duplicate_query_words_still_count_as_full_overlap() {
        assert_eq!(score(&["محمد", "محمد"], "محمد احمد على"), 0.95);
    }

    #[test]
    fn partial_overlap_uses_shared_word_floor() {
        // only "ali " is common character-wise, so the 0.6 floors decide
        let value = score(&["ali", "zzzzzzzzzzzz"], "ali qqqqqq");
        assert_eq!(value, 0.6);
    }

    #[test]
    fn partial_overlap_ratio_can_exceed_floors() {
        // 3 of 4 words shared: 0.75 * 0.8 = 0.6, char similarity is higher
        let value = score(&["omar", "said", "hassan", "x"], "omar said hassan");
        assert!(value > 0.8, "got {value}");
        assert!(value < 0.95, "got {value}");
    }

    #[test]
    fn containment_without_shared_words_floors_at_point_eight() {
        let value = score(&["محمد"], "محمدين على");
        assert!(value >= 0.8, "got {value}");
        assert!(value < 0.95, "got {value}");
    }

    #[test]
    fn unrelated_text_scores_low() {
        assert_eq!(score(&["xyz"], "abc"), 0.0);
        assert!(score(&["sara"], "john") < 0.3);
    }

    #[test]
    fn empty_inputs_score_zero() {
        assert_eq!(score(&[], "abc"), 0.0);
        assert_eq!(score(&["abc"], ""), 0.0);
        assert_eq!(sequence_similarity("", "abc"), 0.0);
    }

    #[test]
    fn matching_ratio_counts_recursive_blocks() {
        assert_eq!(matching_ratio("abcd", "dcba"), 0.25);
        assert_eq!(matching_ratio("abcd", "bcde"), 0.75);
        // block "ab", then "cd" to its right
        assert_eq!(matching_ratio("abxcd", "qabcd"), 0.8);
        assert_eq!(matching_ratio("", ""), 1.0);
        assert_eq!(matching_ratio("abc", ""), 0.0);
    }

    #[test]
    fn matching_ratio_is_below_lcs_for_scattered_letters() {
        // LCS is two letters (4/11); the block search only finds one
        assert_eq!(matching_ratio("محمد", "حسن عمر"), 2.0 / 11.0);
        assert_eq!(sequence_similarity("محمد", "حسن عمر"), 2.0 / 11.0);
        assert!(score(&["محمد"], "حسن عمر") < 0.3);
    }

    #[test]
    fn long_candidates_skip_popular_characters() {
        // 243 chars: 'a' occurs 240 times, above the limit of 3
        let b = format!("{}{}", "a".repeat(240), "xyz");
        assert_eq!(matching_ratio("xyz", &b), 6.0 / 246.0);
        // no indexed block; the empty match still extends from the start
        assert_eq!(matching_ratio("aaaa", &b), 8.0 / 247.0);
    }

    #[test]
    fn short_words_do_not_trigger_containment_floor() {
        assert!(!has_contained_word(&["al"], &["ali"]));
        assert!(has_contained_word(&["ali"], &["alia"]));
        assert!(has_contained_word(&["alia"], &["ali"]));
    }
}

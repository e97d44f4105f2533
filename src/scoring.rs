//! Token similarity scoring for series keys.
//!
//! Scores are bounded to [0, 1]: Jaccard overlap of significant tokens,
//! boosted when one key's tokens are fully contained in the other's.

use rustc_hash::FxHashSet;

// ============================================================================
// Score Thresholds
// ============================================================================

/// Scores must be strictly above this to merge two keys
pub const MERGE_THRESHOLD: f64 = 0.5;

/// Words that carry no series identity
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "of", "in", "on", "at", "to", "for", "mix", "dj", "live",
];

// ============================================================================
// Tokenization
// ============================================================================

/// Significant lowercase alphanumeric words of a key.
/// Words of two characters or fewer and stop words are dropped.
pub fn name_tokens(name: &str) -> FxHashSet<String> {
    let lowered: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    lowered
        .split_whitespace()
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Similarity
// ============================================================================

/// Compute similarity between two comparison keys (0.0 to 1.0).
///
/// Jaccard similarity on significant tokens. When the smaller token set sits
/// entirely inside the larger one, the containment score
/// `0.5 + 0.5 * small / large` is used if it is higher.
/// e.g., "gai barone patterns" vs "patterns" → 0.667
pub fn similarity(a: &str, b: &str) -> f64 {
    token_similarity(&name_tokens(a), &name_tokens(b))
}

/// [`similarity`] over pre-tokenized keys, for callers that compare one key many times.
pub fn token_similarity(tokens_a: &FxHashSet<String>, tokens_b: &FxHashSet<String>) -> f64 {
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection = tokens_a.intersection(tokens_b).count();
    let union = tokens_a.union(tokens_b).count();
    let jaccard = intersection as f64 / union as f64;

    let (smaller, larger) = if tokens_a.len() <= tokens_b.len() {
        (tokens_a, tokens_b)
    } else {
        (tokens_b, tokens_a)
    };

    if smaller.is_subset(larger) {
        let containment = 0.5 + 0.5 * (smaller.len() as f64 / larger.len() as f64);
        jaccard.max(containment)
    } else {
        jaccard
    }
}

/// Merge decision: strictly above [`MERGE_THRESHOLD`].
pub fn is_similar(a: &str, b: &str) -> bool {
    similarity(a, b) > MERGE_THRESHOLD
}

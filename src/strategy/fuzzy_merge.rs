use std::mem;

use rustc_hash::FxHashSet;

use super::{Candidate, ClaimedSet, GroupingStrategy, TrackPool};
use crate::scoring::{name_tokens, token_similarity, MERGE_THRESHOLD};

/// Folds similar key-based candidates together.
///
/// One pass over ordered pairs `(i, j)` with `i < j`: when the keys score
/// above the merge threshold, `j` is absorbed into `i` and takes no further
/// part. Scores always compare the original keys, so the merge is not
/// transitive.
pub struct FuzzyMergeStrategy;

impl GroupingStrategy for FuzzyMergeStrategy {
    fn name(&self) -> &'static str {
        "fuzzy-merge"
    }

    fn generate<'a>(
        &self,
        _pool: &TrackPool<'a>,
        _claimed: &ClaimedSet,
        mut candidates: Vec<Candidate<'a>>,
    ) -> Vec<Candidate<'a>> {
        let tokens: Vec<Option<FxHashSet<String>>> = candidates
            .iter()
            .map(|c| c.origin.is_key_based().then(|| name_tokens(&c.key)))
            .collect();
        let mut consumed = vec![false; candidates.len()];

        for i in 0..candidates.len() {
            let Some(tokens_i) = &tokens[i] else {
                continue;
            };
            if consumed[i] {
                continue;
            }
            for j in (i + 1)..candidates.len() {
                if consumed[j] {
                    continue;
                }
                let Some(tokens_j) = &tokens[j] else {
                    continue;
                };
                if token_similarity(tokens_i, tokens_j) > MERGE_THRESHOLD {
                    let absorbed = mem::take(&mut candidates[j].members);
                    candidates[i].members.extend(absorbed);
                    consumed[j] = true;
                }
            }
        }

        candidates
            .into_iter()
            .zip(consumed)
            .filter_map(|(candidate, gone)| (!gone).then_some(candidate))
            .collect()
    }
}

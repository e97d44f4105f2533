//! Final candidate selection.
//!
//! Drops candidates below their minimum size, removes repeated tracks inside
//! each one and makes sure no track ends up in two non-orphan groups.

use rustc_hash::FxHashSet;

use crate::strategy::Candidate;

/// Surviving candidates in their original order.
///
/// A non-orphan candidate loses any track an earlier surviving non-orphan
/// already owns, then has to meet `min_tracks` again. Orphans are exempt.
pub fn finalize<'a>(candidates: Vec<Candidate<'a>>, min_tracks: usize) -> Vec<Candidate<'a>> {
    let mut owned: FxHashSet<i64> = FxHashSet::default();
    let mut survivors = Vec::new();

    for mut candidate in candidates {
        if !candidate.satisfies(min_tracks) {
            continue;
        }
        candidate.dedup();

        if !candidate.is_orphan() {
            candidate.members.retain(|m| !owned.contains(&m.record.id));
            if !candidate.satisfies(min_tracks) {
                continue;
            }
            owned.extend(candidate.members.iter().map(|m| m.record.id));
        }

        survivors.push(candidate);
    }

    survivors
}

//! Series detection entry point.

use std::cmp::Reverse;

use tracing::info;

use crate::merge::finalize;
use crate::models::{DetectOptions, SeriesGroup, TrackRecord};
use crate::strategy::{build_candidates, TrackPool};
use crate::synthesize::synthesize;

/// Detect likely series among untagged tracks.
///
/// Pure function of the snapshot and options: the same input always yields
/// the same groups in the same order. Orphan groups come first, then the
/// rest by descending track count.
pub fn detect_series(tracks: &[TrackRecord], options: &DetectOptions) -> Vec<SeriesGroup> {
    let pool = TrackPool::build(tracks, options);
    let candidates = build_candidates(&pool);
    let candidate_count = candidates.len();

    let mut groups: Vec<SeriesGroup> = finalize(candidates, pool.min_tracks)
        .into_iter()
        .map(synthesize)
        .collect();
    groups.sort_by_key(|g| (!g.flags.is_orphan, Reverse(g.track_count)));

    info!(
        tracks = pool.tracks.len(),
        candidates = candidate_count,
        groups = groups.len(),
        orphans = groups.iter().filter(|g| g.flags.is_orphan).count(),
        "series detection finished"
    );
    groups
}

//! Candidate group building.
//!
//! Five grouping strategies run in a fixed order. Each one receives the
//! candidates produced so far plus the set of tracks already claimed by a
//! candidate that meets its minimum size, and returns the updated candidate
//! list. The claimed set is rebuilt between stages, never shared mutably.

mod album;
mod directory;
mod filename_key;
mod fuzzy_merge;
mod tagged_match;

pub use album::AlbumStrategy;
pub use directory::DirectoryStrategy;
pub use filename_key::FilenameKeyStrategy;
pub use fuzzy_merge::FuzzyMergeStrategy;
pub use tagged_match::TaggedMatchStrategy;

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::hash::Hash;
use tracing::debug;

use crate::models::{DetectOptions, NormalizedName, SeriesMatch, TrackRecord};
use crate::normalize::normalize;

// ============================================================================
// Track Pool
// ============================================================================

/// Track with its filename already normalized.
#[derive(Clone, Debug)]
pub struct PreparedTrack<'a> {
    pub record: &'a TrackRecord,
    pub name: NormalizedName,
}

/// Snapshot prepared for one detection call.
#[derive(Debug)]
pub struct TrackPool<'a> {
    /// Tracks eligible for grouping, in snapshot order
    pub tracks: Vec<PreparedTrack<'a>>,
    /// Already tagged tracks, used as orphan match targets
    pub reference: Vec<&'a TrackRecord>,
    pub min_tracks: usize,
    pub include_tagged: bool,
}

impl<'a> TrackPool<'a> {
    /// Apply the duration filter, split off tagged tracks unless they are
    /// included, and normalize every filename.
    pub fn build(records: &'a [TrackRecord], options: &DetectOptions) -> Self {
        let filtered: Vec<&TrackRecord> = records
            .iter()
            .filter(|t| t.passes_duration_filter(options.min_duration_sec))
            .collect();

        let (eligible, reference): (Vec<&TrackRecord>, Vec<&TrackRecord>) = if options.include_tagged {
            (filtered, Vec::new())
        } else {
            let (tagged, untagged): (Vec<_>, Vec<_>) = filtered.into_iter().partition(|t| t.series_tagged);
            (untagged, tagged)
        };

        let tracks = eligible
            .par_iter()
            .map(|&record| PreparedTrack {
                record,
                name: normalize(&record.filename),
            })
            .collect();

        Self {
            tracks,
            reference,
            min_tracks: options.effective_min_tracks(),
            include_tagged: options.include_tagged,
        }
    }
}

// ============================================================================
// Candidates
// ============================================================================

/// Which strategy produced a candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CandidateOrigin {
    FilenameKey,
    Directory,
    TaggedMatch,
    Album,
}

impl CandidateOrigin {
    /// Origins whose keys take part in the fuzzy merge.
    pub fn is_key_based(self) -> bool {
        matches!(self, CandidateOrigin::FilenameKey | CandidateOrigin::Directory)
    }
}

/// A track as it appears inside a candidate.
#[derive(Clone, Debug)]
pub struct Member<'a> {
    pub record: &'a TrackRecord,
    pub display_name: String,
    pub episode: Option<String>,
}

impl<'a> Member<'a> {
    pub fn from_prepared(track: &PreparedTrack<'a>) -> Self {
        Self {
            record: track.record,
            display_name: track.name.display_name.clone(),
            episode: track.name.episode.clone(),
        }
    }

    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_name = display_name.to_string();
        self
    }
}

/// Suggestion computed up front for an orphan track.
#[derive(Clone, Debug, PartialEq)]
pub struct OrphanSuggestion {
    pub best: SeriesMatch,
    pub alternatives: Vec<SeriesMatch>,
}

#[derive(Clone, Debug)]
pub struct Candidate<'a> {
    pub origin: CandidateOrigin,
    pub key: String,
    pub members: Vec<Member<'a>>,
    pub suggestion: Option<OrphanSuggestion>,
}

impl<'a> Candidate<'a> {
    pub fn new(origin: CandidateOrigin, key: String, members: Vec<Member<'a>>) -> Self {
        Self {
            origin,
            key,
            members,
            suggestion: None,
        }
    }

    pub fn is_orphan(&self) -> bool {
        self.origin == CandidateOrigin::TaggedMatch
    }

    /// Orphans stand alone; everything else needs `min_tracks`.
    pub fn min_size(&self, min_tracks: usize) -> usize {
        if self.is_orphan() {
            1
        } else {
            min_tracks
        }
    }

    pub fn unique_len(&self) -> usize {
        self.members
            .iter()
            .map(|m| m.record.id)
            .collect::<FxHashSet<_>>()
            .len()
    }

    pub fn satisfies(&self, min_tracks: usize) -> bool {
        self.unique_len() >= self.min_size(min_tracks)
    }

    /// Drop repeated tracks, keeping the first occurrence.
    pub fn dedup(&mut self) {
        let mut seen = FxHashSet::default();
        self.members.retain(|m| seen.insert(m.record.id));
    }
}

/// Track ids owned by candidates that already meet their minimum size.
#[derive(Clone, Debug, Default)]
pub struct ClaimedSet {
    ids: FxHashSet<i64>,
}

impl ClaimedSet {
    pub fn from_candidates(candidates: &[Candidate<'_>], min_tracks: usize) -> Self {
        let ids = candidates
            .iter()
            .filter(|c| c.satisfies(min_tracks))
            .flat_map(|c| c.members.iter().map(|m| m.record.id))
            .collect();
        Self { ids }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// ============================================================================
// Strategy Pipeline
// ============================================================================

/// One stage of candidate building.
pub trait GroupingStrategy {
    fn name(&self) -> &'static str;

    /// Return the candidate list after this stage. `claimed` reflects the
    /// candidates produced by the earlier stages.
    fn generate<'a>(
        &self,
        pool: &TrackPool<'a>,
        claimed: &ClaimedSet,
        candidates: Vec<Candidate<'a>>,
    ) -> Vec<Candidate<'a>>;
}

/// Stages in the order they must run.
pub fn pipeline() -> [&'static dyn GroupingStrategy; 5] {
    [
        &FilenameKeyStrategy,
        &DirectoryStrategy,
        &FuzzyMergeStrategy,
        &TaggedMatchStrategy,
        &AlbumStrategy,
    ]
}

/// Run every stage over the pool.
pub fn build_candidates<'a>(pool: &TrackPool<'a>) -> Vec<Candidate<'a>> {
    let mut candidates = Vec::new();
    let mut claimed = ClaimedSet::default();

    for strategy in pipeline() {
        candidates = strategy.generate(pool, &claimed, candidates);
        claimed = ClaimedSet::from_candidates(&candidates, pool.min_tracks);
        debug!(
            strategy = strategy.name(),
            candidates = candidates.len(),
            claimed = claimed.len(),
            "grouping stage finished"
        );
    }

    candidates
}

/// Group items by key, keeping groups and members in first-seen order.
/// Items whose key is `None` are skipped.
pub(crate) fn group_in_order<T, K, F>(items: impl IntoIterator<Item = T>, mut key_of: F) -> Vec<(K, Vec<T>)>
where
    K: Eq + Hash + Clone,
    F: FnMut(&T) -> Option<K>,
{
    let mut index: FxHashMap<K, usize> = FxHashMap::default();
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();

    for item in items {
        let Some(key) = key_of(&item) else {
            continue;
        };
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(item),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![item]));
            }
        }
    }

    groups
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::TrackRecord;

    pub fn track(id: i64, filename: &str, directory: &str) -> TrackRecord {
        TrackRecord {
            id,
            filename: filename.to_string(),
            directory: directory.to_string(),
            ..Default::default()
        }
    }

    pub fn tagged(id: i64, filename: &str, album: &str, artist: &str) -> TrackRecord {
        TrackRecord {
            id,
            filename: filename.to_string(),
            directory: "/library/tagged".to_string(),
            matched_album: Some(album.to_string()),
            matched_artist: Some(artist.to_string()),
            series_tagged: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{tagged, track};
    use super::*;

    fn member(record: &TrackRecord) -> Member<'_> {
        Member {
            record,
            display_name: record.filename.clone(),
            episode: None,
        }
    }

    #[test]
    fn test_pool_splits_tagged_reference() {
        let records = vec![
            track(1, "Show 01.mp3", "/a"),
            tagged(2, "Show 02.mp3", "Show", "Host"),
        ];
        let pool = TrackPool::build(&records, &DetectOptions::default());
        assert_eq!(pool.tracks.len(), 1);
        assert_eq!(pool.tracks[0].record.id, 1);
        assert_eq!(pool.reference.len(), 1);

        let options = DetectOptions {
            include_tagged: true,
            ..Default::default()
        };
        let pool = TrackPool::build(&records, &options);
        assert_eq!(pool.tracks.len(), 2);
        assert!(pool.reference.is_empty());
    }

    #[test]
    fn test_pool_duration_filter() {
        let mut long = track(1, "Show 01.mp3", "/a");
        long.duration_sec = Some(3600.0);
        let short = track(2, "Show 02.mp3", "/a");
        let records = vec![long, short];
        let options = DetectOptions {
            min_duration_sec: 600.0,
            ..Default::default()
        };
        let pool = TrackPool::build(&records, &options);
        assert_eq!(pool.tracks.len(), 1);
        assert_eq!(pool.tracks[0].name.episode.as_deref(), Some("01"));
    }

    #[test]
    fn test_candidate_dedup_and_size() {
        let a = track(1, "x", "/");
        let b = track(2, "y", "/");
        let mut candidate = Candidate::new(
            CandidateOrigin::FilenameKey,
            "key".to_string(),
            vec![member(&a), member(&b), member(&a)],
        );
        assert_eq!(candidate.unique_len(), 2);
        assert!(candidate.satisfies(2));
        assert!(!candidate.satisfies(3));

        candidate.dedup();
        let ids: Vec<i64> = candidate.members.iter().map(|m| m.record.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_claimed_set_ignores_small_candidates() {
        let a = track(1, "x", "/");
        let b = track(2, "y", "/");
        let c = track(3, "z", "/");
        let candidates = vec![
            Candidate::new(CandidateOrigin::FilenameKey, "ab".into(), vec![member(&a), member(&b)]),
            Candidate::new(CandidateOrigin::FilenameKey, "c".into(), vec![member(&c)]),
            Candidate::new(CandidateOrigin::TaggedMatch, "c".into(), vec![member(&c)]),
        ];
        let claimed = ClaimedSet::from_candidates(&candidates[..2], 2);
        assert!(claimed.contains(1) && claimed.contains(2));
        assert!(!claimed.contains(3));

        // Orphans only need one track
        let claimed = ClaimedSet::from_candidates(&candidates, 2);
        assert!(claimed.contains(3));
        assert_eq!(claimed.len(), 3);
    }

    #[test]
    fn test_group_in_order_keeps_first_seen_order() {
        let groups = group_in_order(vec!["b1", "a1", "b2", "", "a2"], |s| {
            s.chars().next().map(|c| c.to_string())
        });
        assert_eq!(
            groups,
            vec![
                ("b".to_string(), vec!["b1", "b2"]),
                ("a".to_string(), vec!["a1", "a2"]),
            ]
        );
    }
}

//! Core data models for series detection.
//!
//! This module contains the input track view, the derived name parts,
//! the output group shapes and the ordered vote tally used for
//! majority decisions.

use rustc_hash::FxHashMap;
use serde::Serialize;

// ============================================================================
// Input Models
// ============================================================================

/// Track row as stored by the library scanner.
///
/// `matched_*` fields come from catalog matching or a previous series apply
/// and take precedence over the raw tag values (see the `effective_*` accessors).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackRecord {
    pub id: i64,
    pub filename: String,
    pub directory: String,
    pub album: Option<String>,
    pub matched_album: Option<String>,
    pub artist: Option<String>,
    pub matched_artist: Option<String>,
    pub genre: Option<String>,
    pub matched_genre: Option<String>,
    pub album_artist: Option<String>,
    pub matched_album_artist: Option<String>,
    pub series_tagged: bool,
    pub matched_cover_url: Option<String>,
    pub duration_sec: Option<f64>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn effective<'a>(matched: &'a Option<String>, raw: &'a Option<String>) -> Option<&'a str> {
    non_empty(matched).or_else(|| non_empty(raw))
}

impl TrackRecord {
    pub fn effective_album(&self) -> Option<&str> {
        effective(&self.matched_album, &self.album)
    }

    pub fn effective_artist(&self) -> Option<&str> {
        effective(&self.matched_artist, &self.artist)
    }

    pub fn effective_genre(&self) -> Option<&str> {
        effective(&self.matched_genre, &self.genre)
    }

    pub fn effective_album_artist(&self) -> Option<&str> {
        effective(&self.matched_album_artist, &self.album_artist)
    }

    pub fn cover_url(&self) -> Option<&str> {
        non_empty(&self.matched_cover_url)
    }

    /// Duration filter shared by detection and the tagged view.
    /// A zero threshold disables it; unknown durations fail an active filter.
    pub fn passes_duration_filter(&self, min_duration_sec: f64) -> bool {
        if min_duration_sec <= 0.0 {
            return true;
        }
        self.duration_sec.is_some_and(|d| d >= min_duration_sec)
    }
}

/// Options for one detection or aggregation call.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectOptions {
    pub min_tracks: usize,
    pub include_tagged: bool,
    pub min_duration_sec: f64,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            min_tracks: 2,
            include_tagged: false,
            min_duration_sec: 0.0,
        }
    }
}

impl DetectOptions {
    /// `min_tracks` clamped to at least one track.
    pub fn effective_min_tracks(&self) -> usize {
        self.min_tracks.max(1)
    }
}

// ============================================================================
// Derived Models
// ============================================================================

/// Name parts derived from a filename.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizedName {
    pub display_name: String,
    pub comparison_key: String,
    pub episode: Option<String>,
}

impl NormalizedName {
    /// Keys of three characters or fewer are too generic to group on.
    pub fn has_significant_key(&self) -> bool {
        crate::normalize::is_significant_key(&self.comparison_key)
    }
}

/// Sort position of an episode string: its numeric value, or 0 when absent.
pub fn episode_rank(episode: Option<&str>) -> u32 {
    episode.and_then(|e| e.parse().ok()).unwrap_or(0)
}

// ============================================================================
// Output Models
// ============================================================================

/// One track inside a detected or tagged series.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SeriesTrack {
    pub track_id: i64,
    pub filename: String,
    pub directory: String,
    pub display_name: String,
    pub episode: Option<String>,
    pub current_album: Option<String>,
    pub matched_album: Option<String>,
    pub current_artist: Option<String>,
    pub matched_artist: Option<String>,
    pub suggested_album: String,
    pub suggested_artist: String,
    pub suggested_genre: String,
    pub suggested_album_artist: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GroupFlags {
    pub is_orphan: bool,
    pub is_album_group: bool,
    pub is_tagged: bool,
}

/// A tagged series an orphan track could be filed under.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeriesMatch {
    pub series_name: String,
    pub artist: String,
    pub genre: String,
    pub album_artist: String,
    pub cover_url: Option<String>,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeriesGroup {
    pub series_name: String,
    pub track_count: usize,
    pub tracks: Vec<SeriesTrack>,
    pub suggested_album: String,
    pub suggested_artist: String,
    pub suggested_genre: String,
    pub suggested_album_artist: String,
    #[serde(flatten)]
    pub flags: GroupFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_series: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_matches: Option<Vec<SeriesMatch>>,
    pub cover_url: Option<String>,
}

impl SeriesGroup {
    pub fn track_ids(&self) -> Vec<i64> {
        self.tracks.iter().map(|t| t.track_id).collect()
    }
}

// ============================================================================
// Vote Tally
// ============================================================================

/// Insertion-ordered vote counter.
///
/// Ties resolve to the value that was seen first, so majority picks are
/// reproducible regardless of hashing.
#[derive(Debug, Default)]
pub struct VoteTally<'a> {
    counts: Vec<(&'a str, usize)>,
    index: FxHashMap<&'a str, usize>,
}

impl<'a> VoteTally<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: &'a str) {
        match self.index.get(value) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.index.insert(value, self.counts.len());
                self.counts.push((value, 1));
            }
        }
    }

    /// Most frequent value, first-seen on ties.
    pub fn winner(&self) -> Option<&'a str> {
        let mut best: Option<(&'a str, usize)> = None;
        for &(value, count) in &self.counts {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((value, count));
            }
        }
        best.map(|(value, _)| value)
    }

    pub fn top_count(&self) -> usize {
        self.counts.iter().map(|&(_, c)| c).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for VoteTally<'a> {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tally = VoteTally::new();
        for value in iter {
            tally.add(value);
        }
        tally
    }
}

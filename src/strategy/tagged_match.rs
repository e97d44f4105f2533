use rustc_hash::FxHashSet;

use super::{group_in_order, Candidate, CandidateOrigin, ClaimedSet, GroupingStrategy, Member, OrphanSuggestion, TrackPool};
use crate::models::{SeriesMatch, TrackRecord, VoteTally};
use crate::normalize::normalize_text;
use crate::scoring::{name_tokens, token_similarity, MERGE_THRESHOLD};

/// Number of runner-up series offered next to the best match
const MAX_ALTERNATIVES: usize = 4;

/// Matches leftover tracks against series the user already tagged.
///
/// A track whose key scores above the merge threshold against a tagged
/// album becomes a single-track orphan candidate carrying that album's
/// metadata as its suggestion.
pub struct TaggedMatchStrategy;

/// Summary of one tagged album used as a match target.
struct TaggedSeries {
    album: String,
    artist: String,
    genre: String,
    album_artist: String,
    cover_url: Option<String>,
    tokens: FxHashSet<String>,
}

impl TaggedSeries {
    fn from_tracks(album: &str, tracks: &[&TrackRecord]) -> Self {
        let artists: VoteTally = tracks.iter().filter_map(|t| t.effective_artist()).collect();
        let genres: VoteTally = tracks.iter().filter_map(|t| t.effective_genre()).collect();
        let album_artists: VoteTally = tracks.iter().filter_map(|t| t.effective_album_artist()).collect();

        Self {
            album: album.to_string(),
            artist: artists.winner().unwrap_or("Various").to_string(),
            genre: genres.winner().unwrap_or_default().to_string(),
            album_artist: album_artists.winner().unwrap_or_default().to_string(),
            cover_url: tracks.iter().find_map(|t| t.cover_url()).map(str::to_string),
            tokens: name_tokens(&normalize_text(album)),
        }
    }

    fn to_match(&self, score: f64) -> SeriesMatch {
        SeriesMatch {
            series_name: self.album.clone(),
            artist: self.artist.clone(),
            genre: self.genre.clone(),
            album_artist: self.album_artist.clone(),
            cover_url: self.cover_url.clone(),
            score,
        }
    }
}

fn tagged_series(reference: &[&TrackRecord]) -> Vec<TaggedSeries> {
    group_in_order(reference.iter().copied(), |&t| t.effective_album())
        .into_iter()
        .map(|(album, tracks)| TaggedSeries::from_tracks(album, &tracks))
        .collect()
}

impl GroupingStrategy for TaggedMatchStrategy {
    fn name(&self) -> &'static str {
        "tagged-match"
    }

    fn generate<'a>(
        &self,
        pool: &TrackPool<'a>,
        claimed: &ClaimedSet,
        mut candidates: Vec<Candidate<'a>>,
    ) -> Vec<Candidate<'a>> {
        if pool.include_tagged {
            return candidates;
        }
        let series = tagged_series(&pool.reference);
        if series.is_empty() {
            return candidates;
        }

        for track in &pool.tracks {
            if claimed.contains(track.record.id) || !track.name.has_significant_key() {
                continue;
            }

            let tokens = name_tokens(&track.name.comparison_key);
            let mut scored: Vec<(f64, &TaggedSeries)> = series
                .iter()
                .map(|s| (token_similarity(&tokens, &s.tokens), s))
                .collect();
            // Stable: equal scores keep first-seen album order
            scored.sort_by(|a, b| b.0.total_cmp(&a.0));

            let Some(&(best_score, best)) = scored.first() else {
                continue;
            };
            if best_score <= MERGE_THRESHOLD {
                continue;
            }

            let alternatives = scored[1..]
                .iter()
                .filter(|(score, _)| *score > 0.0)
                .take(MAX_ALTERNATIVES)
                .map(|&(score, s)| s.to_match(score))
                .collect();

            let mut candidate = Candidate::new(
                CandidateOrigin::TaggedMatch,
                track.name.comparison_key.clone(),
                vec![Member::from_prepared(track)],
            );
            candidate.suggestion = Some(OrphanSuggestion {
                best: best.to_match(best_score),
                alternatives,
            });
            candidates.push(candidate);
        }

        candidates
    }
}

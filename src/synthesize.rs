//! Turns a final candidate into an output group with suggested metadata.

use crate::models::{episode_rank, GroupFlags, SeriesGroup, SeriesTrack, VoteTally};
use crate::strategy::{Candidate, CandidateOrigin, Member};

/// Common prefixes this short are not a usable series name
const MIN_PREFIX_CHARS: usize = 3;

/// Suggested values shared by every track of a group.
struct Suggestions {
    album: String,
    artist: String,
    genre: String,
    album_artist: String,
}

// ============================================================================
// Name Selection
// ============================================================================

/// Longest prefix shared by every name, trimmed of trailing separators.
/// Falls back to the first name when nothing longer than three characters is shared.
pub fn common_prefix(names: &[&str]) -> String {
    let Some(&first) = names.first() else {
        return String::new();
    };
    if names.len() == 1 {
        return first.to_string();
    }

    let shortest = names
        .iter()
        .copied()
        .min_by_key(|n| n.chars().count())
        .unwrap_or(first);

    let mut prefix_end = 0;
    for (idx, c) in shortest.char_indices() {
        let end = idx + c.len_utf8();
        if names.iter().all(|n| n.starts_with(&shortest[..end])) {
            prefix_end = end;
        } else {
            break;
        }
    }

    let prefix = shortest[..prefix_end].trim_end_matches(|c: char| c.is_whitespace() || c == '-' || c == '_');
    if prefix.chars().count() > MIN_PREFIX_CHARS {
        prefix.to_string()
    } else {
        first.to_string()
    }
}

/// Most repeated display name, or the common prefix when every name is unique.
pub fn series_name(display_names: &[&str]) -> String {
    let tally: VoteTally = display_names.iter().copied().collect();
    match tally.winner() {
        Some(winner) if tally.top_count() > 1 => winner.to_string(),
        _ => common_prefix(display_names),
    }
}

fn majority_metadata(members: &[Member<'_>], series_name: &str) -> Suggestions {
    let artists: VoteTally = members.iter().filter_map(|m| m.record.effective_artist()).collect();
    let genres: VoteTally = members.iter().filter_map(|m| m.record.effective_genre()).collect();
    let album_artists: VoteTally = members
        .iter()
        .filter_map(|m| m.record.effective_album_artist())
        .collect();

    Suggestions {
        album: series_name.to_string(),
        artist: artists.winner().unwrap_or("Various").to_string(),
        genre: genres.winner().unwrap_or_default().to_string(),
        album_artist: album_artists.winner().unwrap_or_default().to_string(),
    }
}

fn series_track(member: &Member<'_>, suggestions: &Suggestions) -> SeriesTrack {
    let record = member.record;
    SeriesTrack {
        track_id: record.id,
        filename: record.filename.clone(),
        directory: record.directory.clone(),
        display_name: member.display_name.clone(),
        episode: member.episode.clone(),
        current_album: record.album.clone(),
        matched_album: record.matched_album.clone(),
        current_artist: record.artist.clone(),
        matched_artist: record.matched_artist.clone(),
        suggested_album: suggestions.album.clone(),
        suggested_artist: suggestions.artist.clone(),
        suggested_genre: suggestions.genre.clone(),
        suggested_album_artist: suggestions.album_artist.clone(),
    }
}

/// Order tracks by episode number, then filename.
pub fn sort_tracks(tracks: &mut [SeriesTrack]) {
    tracks.sort_by(|a, b| {
        episode_rank(a.episode.as_deref())
            .cmp(&episode_rank(b.episode.as_deref()))
            .then_with(|| a.filename.cmp(&b.filename))
    });
}

// ============================================================================
// Group Synthesis
// ============================================================================

/// Build the output group for a finalized candidate.
pub fn synthesize(candidate: Candidate<'_>) -> SeriesGroup {
    let flags = GroupFlags {
        is_orphan: candidate.is_orphan(),
        is_album_group: candidate.origin == CandidateOrigin::Album,
        is_tagged: false,
    };

    let (name, suggestions, matched, cover_url) = match &candidate.suggestion {
        Some(orphan) => {
            let best = &orphan.best;
            let suggestions = Suggestions {
                album: best.series_name.clone(),
                artist: best.artist.clone(),
                genre: best.genre.clone(),
                album_artist: best.album_artist.clone(),
            };
            let matched = (best.score, orphan.alternatives.clone());
            (best.series_name.clone(), suggestions, Some(matched), best.cover_url.clone())
        }
        None => {
            let names: Vec<&str> = candidate.members.iter().map(|m| m.display_name.as_str()).collect();
            let name = series_name(&names);
            let suggestions = majority_metadata(&candidate.members, &name);
            (name, suggestions, None, None)
        }
    };

    let mut tracks: Vec<SeriesTrack> = candidate
        .members
        .iter()
        .map(|m| series_track(m, &suggestions))
        .collect();
    sort_tracks(&mut tracks);

    let (matched_series, match_score, alternative_matches) = match matched {
        Some((score, alternatives)) => (Some(name.clone()), Some(score), Some(alternatives)),
        None => (None, None, None),
    };

    SeriesGroup {
        series_name: name,
        track_count: tracks.len(),
        tracks,
        suggested_album: suggestions.album,
        suggested_artist: suggestions.artist,
        suggested_genre: suggestions.genre,
        suggested_album_artist: suggestions.album_artist,
        flags,
        matched_series,
        match_score,
        alternative_matches,
        cover_url,
    }
}

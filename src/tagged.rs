//! Series the user already confirmed, grouped by their exact metadata.

use crate::models::{DetectOptions, GroupFlags, SeriesGroup, SeriesTrack, TrackRecord, VoteTally};
use crate::normalize::normalize;
use crate::strategy::group_in_order;
use crate::synthesize::sort_tracks;

const UNKNOWN: &str = "Unknown";

/// Grouping key of a tagged track: album, artist, genre.
type TagKey<'a> = (&'a str, &'a str, &'a str);

fn tag_key(track: &TrackRecord) -> TagKey<'_> {
    (
        track.effective_album().unwrap_or(UNKNOWN),
        track.effective_artist().unwrap_or(UNKNOWN),
        track.effective_genre().unwrap_or_default(),
    )
}

/// "Album (Artist)", or just the album when the artist says nothing.
fn display_name(album: &str, artist: &str) -> String {
    if artist == UNKNOWN || artist == "Various" {
        album.to_string()
    } else {
        format!("{album} ({artist})")
    }
}

/// The cover every member shares, if they all share exactly one.
fn shared_cover(tracks: &[&TrackRecord]) -> Option<String> {
    let first = tracks.first()?.cover_url()?;
    tracks
        .iter()
        .all(|t| t.cover_url() == Some(first))
        .then(|| first.to_string())
}

/// Group `series_tagged` tracks by album, artist and genre.
///
/// Groups below `min_tracks` are dropped; the rest are ordered by size,
/// largest first, keeping first-seen order among equals.
pub fn aggregate_tagged(tracks: &[TrackRecord], options: &DetectOptions) -> Vec<SeriesGroup> {
    let min_tracks = options.effective_min_tracks();
    let tagged = tracks
        .iter()
        .filter(|t| t.series_tagged && t.passes_duration_filter(options.min_duration_sec));

    let mut groups: Vec<SeriesGroup> = group_in_order(tagged, |&t| Some(tag_key(t)))
        .into_iter()
        .filter(|(_, members)| members.len() >= min_tracks)
        .map(|((album, artist, genre), members)| {
            let album_artists: VoteTally = members.iter().filter_map(|t| t.effective_album_artist()).collect();
            let album_artist = album_artists.winner().unwrap_or_default().to_string();

            let mut series_tracks: Vec<SeriesTrack> = members
                .iter()
                .map(|t| {
                    let name = normalize(&t.filename);
                    SeriesTrack {
                        track_id: t.id,
                        filename: t.filename.clone(),
                        directory: t.directory.clone(),
                        display_name: name.display_name,
                        episode: name.episode,
                        current_album: t.album.clone(),
                        matched_album: t.matched_album.clone(),
                        current_artist: t.artist.clone(),
                        matched_artist: t.matched_artist.clone(),
                        suggested_album: album.to_string(),
                        suggested_artist: artist.to_string(),
                        suggested_genre: genre.to_string(),
                        suggested_album_artist: album_artist.clone(),
                    }
                })
                .collect();
            sort_tracks(&mut series_tracks);

            SeriesGroup {
                series_name: display_name(album, artist),
                track_count: series_tracks.len(),
                tracks: series_tracks,
                suggested_album: album.to_string(),
                suggested_artist: artist.to_string(),
                suggested_genre: genre.to_string(),
                suggested_album_artist: album_artist,
                flags: GroupFlags {
                    is_tagged: true,
                    ..Default::default()
                },
                matched_series: None,
                match_score: None,
                alternative_matches: None,
                cover_url: shared_cover(&members),
            }
        })
        .collect();

    groups.sort_by(|a, b| b.track_count.cmp(&a.track_count));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(id: i64, album: Option<&str>, artist: Option<&str>, cover: Option<&str>) -> TrackRecord {
        TrackRecord {
            id,
            filename: format!("Show {id:03}.mp3"),
            directory: "/tagged".to_string(),
            matched_album: album.map(str::to_string),
            matched_artist: artist.map(str::to_string),
            matched_cover_url: cover.map(str::to_string),
            series_tagged: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_aggregate_groups_by_metadata() {
        let tracks = vec![
            tagged(3, Some("Technotopia"), Some("Hernan Cattaneo"), Some("c1")),
            tagged(1, Some("Technotopia"), Some("Hernan Cattaneo"), Some("c1")),
            tagged(2, Some("Patterns"), Some("Various"), Some("c2")),
            tagged(4, Some("Patterns"), Some("Various"), Some("c3")),
            tagged(5, Some("Patterns"), Some("Various"), None),
            tagged(6, Some("Lonely"), None, None),
            TrackRecord {
                series_tagged: false,
                ..tagged(7, Some("Technotopia"), Some("Hernan Cattaneo"), None)
            },
        ];
        let groups = aggregate_tagged(&tracks, &DetectOptions::default());

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].series_name, "Patterns");
        assert_eq!(groups[0].track_count, 3);
        assert_eq!(groups[0].cover_url, None);
        assert!(groups[0].flags.is_tagged);

        assert_eq!(groups[1].series_name, "Technotopia (Hernan Cattaneo)");
        assert_eq!(groups[1].suggested_album, "Technotopia");
        assert_eq!(groups[1].suggested_artist, "Hernan Cattaneo");
        assert_eq!(groups[1].cover_url.as_deref(), Some("c1"));
        assert_eq!(groups[1].track_ids(), vec![1, 3]);
    }

    #[test]
    fn test_aggregate_unknown_defaults() {
        let tracks = vec![tagged(1, None, None, None), tagged(2, None, None, None)];
        let groups = aggregate_tagged(&tracks, &DetectOptions::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].series_name, "Unknown");
        assert_eq!(groups[0].suggested_artist, "Unknown");
        assert_eq!(groups[0].suggested_genre, "");
    }

    #[test]
    fn test_aggregate_duration_filter() {
        let mut long = tagged(1, Some("Technotopia"), Some("Host"), None);
        long.duration_sec = Some(3600.0);
        let short = tagged(2, Some("Technotopia"), Some("Host"), None);
        let options = DetectOptions {
            min_tracks: 1,
            min_duration_sec: 1800.0,
            ..Default::default()
        };
        let groups = aggregate_tagged(&[long, short], &options);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].track_ids(), vec![1]);
    }
}

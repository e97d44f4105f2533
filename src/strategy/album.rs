use super::{group_in_order, Candidate, CandidateOrigin, ClaimedSet, GroupingStrategy, Member, TrackPool};
use crate::normalize::normalize_text;

/// Falls back to the album tag for tracks no other strategy claimed.
pub struct AlbumStrategy;

impl GroupingStrategy for AlbumStrategy {
    fn name(&self) -> &'static str {
        "album"
    }

    fn generate<'a>(
        &self,
        pool: &TrackPool<'a>,
        claimed: &ClaimedSet,
        mut candidates: Vec<Candidate<'a>>,
    ) -> Vec<Candidate<'a>> {
        let eligible = pool.tracks.iter().filter_map(|t| {
            if claimed.contains(t.record.id) {
                return None;
            }
            let album = t.record.effective_album().filter(|a| a.chars().count() > 2)?;
            Some((t, album))
        });

        for (key, tracks) in group_in_order(eligible, |(_, album)| Some(normalize_text(album))) {
            if tracks.len() < pool.min_tracks {
                continue;
            }
            let members = tracks
                .into_iter()
                .map(|(t, album)| Member::from_prepared(t).with_display_name(album))
                .collect();
            candidates.push(Candidate::new(CandidateOrigin::Album, key, members));
        }

        candidates
    }
}

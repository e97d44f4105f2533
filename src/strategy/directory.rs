use super::{group_in_order, Candidate, CandidateOrigin, ClaimedSet, GroupingStrategy, Member, TrackPool};
use crate::normalize::{directory_series_name, is_significant_key, normalize_text};

/// Treats a folder full of unclaimed tracks as one series named after the folder.
pub struct DirectoryStrategy;

impl GroupingStrategy for DirectoryStrategy {
    fn name(&self) -> &'static str {
        "directory"
    }

    fn generate<'a>(
        &self,
        pool: &TrackPool<'a>,
        claimed: &ClaimedSet,
        mut candidates: Vec<Candidate<'a>>,
    ) -> Vec<Candidate<'a>> {
        let min_tracks = pool.min_tracks;
        let first_new = candidates.len();
        let by_directory = group_in_order(pool.tracks.iter(), |t| Some(t.record.directory.as_str()));

        for (directory, tracks) in by_directory {
            if tracks.len() < min_tracks {
                continue;
            }
            let fresh: Vec<_> = tracks
                .into_iter()
                .filter(|t| !claimed.contains(t.record.id))
                .collect();
            if fresh.len() < min_tracks {
                continue;
            }

            let seed = directory_series_name(directory);
            let key = normalize_text(&seed);
            if !is_significant_key(&key) {
                continue;
            }

            let members = fresh
                .into_iter()
                .map(|t| Member::from_prepared(t).with_display_name(&seed));

            // Keyed by normalized folder name, not path: same-named folders on
            // different disks form one candidate
            match candidates[first_new..]
                .iter_mut()
                .find(|c| c.origin == CandidateOrigin::Directory && c.key == key)
            {
                Some(existing) => existing.members.extend(members),
                None => candidates.push(Candidate::new(CandidateOrigin::Directory, key, members.collect())),
            }
        }

        candidates
    }
}

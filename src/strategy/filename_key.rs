use super::{group_in_order, Candidate, CandidateOrigin, ClaimedSet, GroupingStrategy, Member, TrackPool};

/// Groups tracks that normalize to the same comparison key.
///
/// Every key becomes a candidate, even a single track: small groups can
/// still be absorbed by a similar key during the fuzzy merge.
pub struct FilenameKeyStrategy;

impl GroupingStrategy for FilenameKeyStrategy {
    fn name(&self) -> &'static str {
        "filename-key"
    }

    fn generate<'a>(
        &self,
        pool: &TrackPool<'a>,
        claimed: &ClaimedSet,
        mut candidates: Vec<Candidate<'a>>,
    ) -> Vec<Candidate<'a>> {
        let eligible = pool
            .tracks
            .iter()
            .filter(|t| !claimed.contains(t.record.id) && t.name.has_significant_key());

        let groups = group_in_order(eligible, |t| Some(t.name.comparison_key.clone()));

        candidates.extend(groups.into_iter().map(|(key, tracks)| {
            let members = tracks.into_iter().map(Member::from_prepared).collect();
            Candidate::new(CandidateOrigin::FilenameKey, key, members)
        }));
        candidates
    }
}

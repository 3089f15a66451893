// Case tallies per zone for one date. Every matched row is one case.
use crate::error::StatsError;
use crate::types::{CaseRow, ZoneDefinition, ZoneId};
use std::collections::BTreeMap;

/// Fold the matched case rows into a fresh per-zone count. Every zone in
/// `zone_defs` is present, starting at zero; a case in any other zone is
/// `UnknownZone`.
pub fn tally(
    matched_case_rows: &[&CaseRow],
    zone_defs: &[ZoneDefinition],
) -> Result<BTreeMap<ZoneId, u32>, StatsError> {
    let start: BTreeMap<ZoneId, u32> = zone_defs.iter().map(|z| (z.zone_id, 0)).collect();
    matched_case_rows.iter().try_fold(start, |mut counts, row| {
        let count = counts
            .get_mut(&row.zone_id)
            .ok_or(StatsError::UnknownZone(row.zone_id))?;
        *count += 1;
        Ok(counts)
    })
}

/// Zone with the most cases. Ties go to the lowest zone id.
pub fn max_case_zone(tally: &BTreeMap<ZoneId, u32>) -> Option<ZoneId> {
    let mut best: Option<(ZoneId, u32)> = None;
    for (&id, &count) in tally {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((id, count)),
        }
    }
    best.map(|(id, _)| id)
}

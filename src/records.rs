// Reconciliation of the matched rows from the three tables into one record
// per zone. Zones are joined strictly; a zone present in one table and absent
// from another is an error, never a default.
use crate::cases;
use crate::error::{StatsError, TableKind};
use crate::types::{
    CaseRow, DoseCounts, PopulationRow, VaccinationRow, ZoneDefinition, ZoneId, ZoneRecord,
};
use std::collections::BTreeMap;

/// Join matched rows by zone id.
///
/// `vaccination_block` is `None` when the vaccination table has nothing for
/// the date; the records are still built, with `doses` left empty.
pub fn build_zone_records(
    population_rows: &[&PopulationRow],
    vaccination_block: Option<&[&VaccinationRow]>,
    case_rows: &[&CaseRow],
    zone_defs: &[ZoneDefinition],
) -> Result<BTreeMap<ZoneId, ZoneRecord>, StatsError> {
    let known = |id: ZoneId| zone_defs.iter().any(|z| z.zone_id == id);

    let mut populations: BTreeMap<ZoneId, u64> = BTreeMap::new();
    for row in population_rows {
        if !known(row.zone_id) {
            return Err(StatsError::UnknownZone(row.zone_id));
        }
        match populations.get(&row.zone_id) {
            Some(&p) if p != row.population => {
                return Err(StatsError::ConflictingRows {
                    zone: row.zone_id,
                    table: TableKind::Population,
                })
            }
            Some(_) => {}
            None => {
                populations.insert(row.zone_id, row.population);
            }
        }
    }

    let doses = match vaccination_block {
        Some(block) => Some(join_doses(block, &populations)?),
        None => None,
    };

    let counts = cases::tally(case_rows, zone_defs)?;

    let mut records = BTreeMap::new();
    for def in zone_defs {
        let population = *populations.get(&def.zone_id).ok_or(StatsError::ZoneJoinError {
            zone: def.zone_id,
            missing_from: TableKind::Population,
        })?;
        records.insert(
            def.zone_id,
            ZoneRecord {
                zone: *def,
                population,
                doses: doses.as_ref().and_then(|d| d.get(&def.zone_id).copied()),
                case_count: counts.get(&def.zone_id).copied().unwrap_or(0),
            },
        );
    }
    Ok(records)
}

fn join_doses(
    block: &[&VaccinationRow],
    populations: &BTreeMap<ZoneId, u64>,
) -> Result<BTreeMap<ZoneId, DoseCounts>, StatsError> {
    let mut doses: BTreeMap<ZoneId, DoseCounts> = BTreeMap::new();
    for row in block {
        if !populations.contains_key(&row.zone_id) {
            return Err(StatsError::ZoneJoinError {
                zone: row.zone_id,
                missing_from: TableKind::Population,
            });
        }
        let counts = DoseCounts { dose1: row.dose1_count, dose2: row.dose2_count };
        if let Some(existing) = doses.insert(row.zone_id, counts) {
            if existing != counts {
                return Err(StatsError::ConflictingRows {
                    zone: row.zone_id,
                    table: TableKind::Vaccinations,
                });
            }
        }
    }
    if let Some(&zone) = populations.keys().find(|z| !doses.contains_key(*z)) {
        return Err(StatsError::ZoneJoinError { zone, missing_from: TableKind::Vaccinations });
    }
    Ok(doses)
}

// Query orchestration: match the three tables on the requested date, join the
// matches into per-zone records, then derive rates and case figures.
//
// The engine holds nothing but a borrow of the loaded tables, so every query
// starts from scratch and nothing leaks from one query into the next.
use crate::cases;
use crate::error::StatsError;
use crate::matcher::{match_all, match_snapshot_rows};
use crate::rates::{dose_rate, max_rate_zone, weighted_regional_rate};
use crate::records::build_zone_records;
use crate::table::Tables;
use crate::types::{
    zone, DataWarning, Dose, Query, QueryResult, ZoneId, ZoneRecord, ZoneSelector, ZoneStats,
    ZONES,
};
use log::{debug, warn};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    AwaitingDate,
    Matching,
    Joining,
    Computed,
    Done,
    Failed,
}

/// What the caller gets back for one query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Done(Box<QueryResult>),
    /// The population table has nothing for this date; ask for another one.
    NeedsNewDate { month: u32, day: u32 },
    Failed { phase: QueryPhase, error: StatsError },
}

pub struct StatsEngine<'a> {
    tables: &'a Tables,
}

impl<'a> StatsEngine<'a> {
    pub fn new(tables: &'a Tables) -> Self {
        StatsEngine { tables }
    }

    pub fn run(&self, query: Query) -> QueryOutcome {
        let mut phase = QueryPhase::AwaitingDate;
        match self.execute(query, &mut phase) {
            Ok(result) => {
                transition(&mut phase, QueryPhase::Done);
                QueryOutcome::Done(Box::new(result))
            }
            Err(StatsError::NoDataForDate { month, day }) => {
                transition(&mut phase, QueryPhase::AwaitingDate);
                QueryOutcome::NeedsNewDate { month, day }
            }
            Err(error) => {
                let failed_in = phase;
                transition(&mut phase, QueryPhase::Failed);
                QueryOutcome::Failed { phase: failed_in, error }
            }
        }
    }

    fn execute(&self, query: Query, phase: &mut QueryPhase) -> Result<QueryResult, StatsError> {
        let Query { month, day, selector } = query;
        if let ZoneSelector::Zone(id) = selector {
            zone(id).ok_or(StatsError::UnknownZone(id))?;
        }

        transition(phase, QueryPhase::Matching);
        let mut warnings = Vec::new();
        let population_rows = match_snapshot_rows(&self.tables.populations, month, day)?;
        let vaccination_block = match match_snapshot_rows(&self.tables.vaccinations, month, day) {
            Ok(rows) => Some(rows),
            Err(StatsError::NoDataForDate { .. }) => {
                warnings.push(DataWarning::MissingVaccinationData { month, day });
                None
            }
            Err(e) => return Err(e),
        };
        let case_rows = match_all(&self.tables.cases, month, day);
        debug!(
            "{}/{}: matched {} population, {} vaccination, {} case rows",
            month,
            day,
            population_rows.len(),
            vaccination_block.as_ref().map_or(0, |b| b.len()),
            case_rows.len()
        );

        transition(phase, QueryPhase::Joining);
        let records = build_zone_records(
            &population_rows,
            vaccination_block.as_deref(),
            &case_rows,
            &ZONES,
        )?;

        transition(phase, QueryPhase::Computed);
        let result = summarize(query, &records, case_rows.len(), warnings);
        for w in &result.warnings {
            warn!("{}", w);
        }
        Ok(result)
    }
}

fn transition(phase: &mut QueryPhase, next: QueryPhase) {
    debug!("query phase {:?} -> {:?}", phase, next);
    *phase = next;
}

fn summarize(
    query: Query,
    records: &BTreeMap<ZoneId, ZoneRecord>,
    total_cases: usize,
    mut warnings: Vec<DataWarning>,
) -> QueryResult {
    let mut per_zone = BTreeMap::new();
    for (&id, record) in records {
        let dose1_rate = checked_rate(record, Dose::First, &mut warnings);
        let dose2_rate = checked_rate(record, Dose::Second, &mut warnings);
        per_zone.insert(
            id,
            ZoneStats {
                population: record.population,
                dose1_rate,
                dose2_rate,
                case_count: record.case_count,
            },
        );
    }

    let tally: BTreeMap<ZoneId, u32> = records.iter().map(|(&id, r)| (id, r.case_count)).collect();

    QueryResult {
        month: query.month,
        day: query.day,
        selector: query.selector,
        per_zone,
        regional_population: records.values().map(|r| r.population).sum(),
        regional_dose1_rate: weighted_regional_rate(records.values(), Dose::First).map(|p| p.value()),
        regional_dose2_rate: weighted_regional_rate(records.values(), Dose::Second).map(|p| p.value()),
        max_dose1_zone: max_rate_zone(records.values(), Dose::First),
        max_dose2_zone: max_rate_zone(records.values(), Dose::Second),
        max_case_zone: cases::max_case_zone(&tally),
        total_cases,
        warnings,
    }
}

/// Rate for one zone and dose; undefined or suspicious values are recorded as
/// warnings instead of failing the query.
fn checked_rate(record: &ZoneRecord, dose: Dose, warnings: &mut Vec<DataWarning>) -> Option<f64> {
    let zone = record.zone.zone_id;
    let doses = record.doses?;
    match dose_rate(doses.get(dose), record.population) {
        Ok(rate) => {
            if !rate.in_range() {
                warnings.push(DataWarning::RateOutOfRange { zone, dose, rate: rate.value() });
            }
            Some(rate.value())
        }
        Err(e) => {
            warnings.push(DataWarning::UndefinedRate { zone, dose, reason: e.to_string() });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableKind;
    use crate::table::Table;
    use crate::types::{CaseRow, PopulationRow, VaccinationRow};
    use crate::util::round2;

    const POPULATIONS: [u64; 5] = [150_000, 90_000, 100_000, 40_000, 30_000];
    const DOSE1: [u64; 5] = [50_000, 60_000, 70_000, 20_000, 15_000];
    const DOSE2: [u64; 5] = [40_000, 30_000, 50_000, 10_000, 24_000];

    fn population_rows(month: u32, day: u32) -> Vec<PopulationRow> {
        (0..5u8)
            .map(|z| PopulationRow { month, day, zone_id: z, population: POPULATIONS[z as usize] })
            .collect()
    }

    fn vaccination_rows(month: u32, day: u32) -> Vec<VaccinationRow> {
        (0..5u8)
            .map(|z| VaccinationRow {
                month,
                day,
                zone_id: z,
                dose1_count: DOSE1[z as usize],
                dose2_count: DOSE2[z as usize],
            })
            .collect()
    }

    fn sample_tables() -> Tables {
        let mut populations = population_rows(11, 15);
        // Repeated snapshot of the Edmonton zone.
        populations.insert(3, populations[2]);
        populations.extend(population_rows(11, 14));

        let mut vaccinations = vaccination_rows(11, 15);
        vaccinations.extend(vaccination_rows(11, 14));

        let cases = [2u8, 2, 0, 2, 4, 4, 2]
            .iter()
            .map(|&z| CaseRow { month: 11, day: 15, zone_id: z })
            .chain(std::iter::once(CaseRow { month: 11, day: 14, zone_id: 1 }))
            .collect();

        Tables {
            vaccinations: Table::new(vaccinations),
            populations: Table::new(populations),
            cases: Table::new(cases),
        }
    }

    fn all(month: u32, day: u32) -> Query {
        Query { month, day, selector: ZoneSelector::All }
    }

    fn done(outcome: QueryOutcome) -> QueryResult {
        match outcome {
            QueryOutcome::Done(result) => *result,
            other => panic!("query did not complete: {:?}", other),
        }
    }

    #[test]
    fn full_query_reconciles_every_zone() {
        let tables = sample_tables();
        let result = done(StatsEngine::new(&tables).run(all(11, 15)));

        assert_eq!(result.per_zone.len(), ZONES.len());
        assert_eq!(result.regional_population, POPULATIONS.iter().sum::<u64>());
        assert_eq!(round2(result.per_zone[&0].dose1_rate.unwrap()), 33.33);
        assert_eq!(result.max_dose1_zone, Some(2));
        assert_eq!(result.max_dose2_zone, Some(4));
        assert_eq!(result.per_zone[&2].case_count, 4);
        assert_eq!(result.max_case_zone, Some(2));
        assert_eq!(result.total_cases, 7);
        let tallied: u32 = result.per_zone.values().map(|z| z.case_count).sum();
        assert_eq!(tallied as usize, result.total_cases);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn regional_rate_is_population_weighted() {
        let tables = sample_tables();
        let result = done(StatsEngine::new(&tables).run(all(11, 15)));
        let expected = DOSE1.iter().sum::<u64>() as f64 / POPULATIONS.iter().sum::<u64>() as f64 * 100.0;
        assert!((result.regional_dose1_rate.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn absent_date_needs_a_new_date() {
        let tables = sample_tables();
        let engine = StatsEngine::new(&tables);
        assert_eq!(engine.run(all(2, 30)), QueryOutcome::NeedsNewDate { month: 2, day: 30 });
    }

    #[test]
    fn date_missing_only_from_population_needs_a_new_date() {
        let mut tables = sample_tables();
        tables.populations = Table::new(population_rows(11, 14));
        let engine = StatsEngine::new(&tables);
        assert_eq!(engine.run(all(11, 15)), QueryOutcome::NeedsNewDate { month: 11, day: 15 });
        assert!(matches!(engine.run(all(11, 14)), QueryOutcome::Done(_)));
    }

    #[test]
    fn adjacent_conflicting_population_rows_fail_the_join() {
        let mut tables = sample_tables();
        let mut populations = population_rows(11, 15);
        populations.insert(3, PopulationRow { month: 11, day: 15, zone_id: 2, population: 999 });
        tables.populations = Table::new(populations);

        assert_eq!(
            StatsEngine::new(&tables).run(all(11, 15)),
            QueryOutcome::Failed {
                phase: QueryPhase::Joining,
                error: StatsError::ConflictingRows { zone: 2, table: TableKind::Population },
            }
        );
    }

    #[test]
    fn queries_do_not_share_case_counts() {
        let tables = sample_tables();
        let engine = StatsEngine::new(&tables);
        let first = done(engine.run(all(11, 15)));
        let other_day = done(engine.run(all(11, 14)));
        let again = done(engine.run(all(11, 15)));
        assert_eq!(other_day.total_cases, 1);
        assert_eq!(other_day.max_case_zone, Some(1));
        assert_eq!(first, again);
    }

    #[test]
    fn missing_vaccination_data_is_flagged_not_fatal() {
        let mut tables = sample_tables();
        tables.vaccinations = Table::new(vaccination_rows(11, 14));
        let result = done(StatsEngine::new(&tables).run(all(11, 15)));
        assert!(result.per_zone.values().all(|z| z.dose1_rate.is_none()));
        assert_eq!(result.regional_dose1_rate, None);
        assert_eq!(result.max_dose1_zone, None);
        assert_eq!(result.total_cases, 7);
        assert_eq!(
            result.warnings,
            vec![DataWarning::MissingVaccinationData { month: 11, day: 15 }]
        );
    }

    #[test]
    fn zero_population_zone_is_undefined_but_others_survive() {
        let mut tables = sample_tables();
        let mut populations = population_rows(11, 15);
        populations[3].population = 0;
        tables.populations = Table::new(populations);

        let result = done(StatsEngine::new(&tables).run(all(11, 15)));
        assert_eq!(result.per_zone[&3].dose1_rate, None);
        assert!(result.per_zone[&0].dose1_rate.is_some());
        assert!(result.regional_dose1_rate.is_some());
        assert!(result.warnings.iter().any(|w| matches!(
            w,
            DataWarning::UndefinedRate { zone: 3, dose: Dose::First, .. }
        )));
    }

    #[test]
    fn rate_above_one_hundred_is_reported() {
        let mut tables = sample_tables();
        let mut vaccinations = vaccination_rows(11, 15);
        vaccinations[4].dose1_count = 45_000;
        tables.vaccinations = Table::new(vaccinations);

        let result = done(StatsEngine::new(&tables).run(all(11, 15)));
        assert_eq!(result.per_zone[&4].dose1_rate, Some(150.0));
        assert!(result
            .warnings
            .contains(&DataWarning::RateOutOfRange { zone: 4, dose: Dose::First, rate: 150.0 }));
    }

    #[test]
    fn join_failure_is_fatal() {
        let mut tables = sample_tables();
        let mut vaccinations = vaccination_rows(11, 15);
        vaccinations.pop();
        tables.vaccinations = Table::new(vaccinations);

        let outcome = StatsEngine::new(&tables).run(all(11, 15));
        assert_eq!(
            outcome,
            QueryOutcome::Failed {
                phase: QueryPhase::Joining,
                error: StatsError::ZoneJoinError { zone: 4, missing_from: TableKind::Vaccinations },
            }
        );
    }

    #[test]
    fn single_zone_selection() {
        let tables = sample_tables();
        let engine = StatsEngine::new(&tables);
        let result = done(engine.run(Query { month: 11, day: 15, selector: ZoneSelector::Zone(2) }));
        let (def, stats) = result.selected().unwrap();
        assert_eq!(def.name, "Edmonton Zone");
        assert_eq!(stats.population, 100_000);
        assert!(matches!(
            engine.run(Query { month: 11, day: 15, selector: ZoneSelector::Zone(5) }),
            QueryOutcome::Failed { error: StatsError::UnknownZone(5), .. }
        ));
    }
}

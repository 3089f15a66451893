use crate::config::{CaseLayout, PopulationLayout, ReportConfig, VaccinationLayout};
use crate::error::{LoadError, TableKind};
use crate::table::{Table, Tables};
use crate::types::{zone, CaseRow, Dated, PopulationRow, VaccinationRow, ZoneId};
use crate::util::{days_in_month, parse_count};
use csv::{ReaderBuilder, StringRecord};
use log::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub parse_errors: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub vaccinations: TableReport,
    pub populations: TableReport,
    pub cases: TableReport,
}

impl LoadReport {
    pub fn parse_errors(&self) -> usize {
        self.vaccinations.parse_errors + self.populations.parse_errors + self.cases.parse_errors
    }
}

pub fn load_tables(config: &ReportConfig) -> Result<(Tables, LoadReport), LoadError> {
    let year = config.year;
    let (vaccinations, vacc_report) = load_table(
        &config.vaccinations_path,
        TableKind::Vaccinations,
        |rec| parse_vaccination(rec, &config.vaccination_columns, year),
    )?;
    let (populations, pop_report) = load_table(
        &config.population_path,
        TableKind::Population,
        |rec| parse_population(rec, &config.population_columns, year),
    )?;
    // An empty case table is a quiet period, not a broken export.
    let (cases, case_report) = load_table(&config.cases_path, TableKind::Cases, |rec| {
        parse_case(rec, &config.case_columns, year)
    })?;

    if vaccinations.is_empty() {
        return Err(LoadError::EmptyTable(TableKind::Vaccinations));
    }
    if populations.is_empty() {
        return Err(LoadError::EmptyTable(TableKind::Population));
    }

    let tables = Tables { vaccinations, populations, cases };
    let report = LoadReport { vaccinations: vacc_report, populations: pop_report, cases: case_report };
    Ok((tables, report))
}

fn load_table<R, F>(path: &str, kind: TableKind, parse: F) -> Result<(Table<R>, TableReport), LoadError>
where
    R: Dated,
    F: Fn(&StringRecord) -> Option<R>,
{
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| LoadError::Csv { path: path.to_string(), source })?;
    let mut report = TableReport::default();
    let mut rows = Vec::new();

    for result in rdr.records() {
        report.total_rows += 1;
        let record = match result {
            Ok(r) => r,
            Err(_) => {
                report.parse_errors += 1;
                continue;
            }
        };
        match parse(&record) {
            Some(row) => rows.push(row),
            None => report.parse_errors += 1,
        }
    }
    report.kept_rows = rows.len();

    if report.parse_errors > 0 {
        warn!("{} table {}: skipped {} malformed rows", kind, path, report.parse_errors);
    }
    info!("{} table {}: {} of {} rows loaded", kind, path, report.kept_rows, report.total_rows);
    Ok((Table::new(rows), report))
}

fn parse_date(rec: &StringRecord, month_col: usize, day_col: usize, year: i32) -> Option<(u32, u32)> {
    let month = u32::try_from(parse_count(rec.get(month_col))?).ok()?;
    let day = u32::try_from(parse_count(rec.get(day_col))?).ok()?;
    let length = days_in_month(year, month)?;
    if day == 0 || day > length {
        return None;
    }
    Some((month, day))
}

fn parse_zone(rec: &StringRecord, col: usize) -> Option<ZoneId> {
    let id = ZoneId::try_from(parse_count(rec.get(col))?).ok()?;
    zone(id).map(|z| z.zone_id)
}

fn parse_vaccination(rec: &StringRecord, cols: &VaccinationLayout, year: i32) -> Option<VaccinationRow> {
    let (month, day) = parse_date(rec, cols.month, cols.day, year)?;
    Some(VaccinationRow {
        month,
        day,
        zone_id: parse_zone(rec, cols.zone)?,
        dose1_count: parse_count(rec.get(cols.dose1))?,
        dose2_count: parse_count(rec.get(cols.dose2))?,
    })
}

fn parse_population(rec: &StringRecord, cols: &PopulationLayout, year: i32) -> Option<PopulationRow> {
    let (month, day) = parse_date(rec, cols.month, cols.day, year)?;
    Some(PopulationRow {
        month,
        day,
        zone_id: parse_zone(rec, cols.zone)?,
        population: parse_count(rec.get(cols.population))?,
    })
}

fn parse_case(rec: &StringRecord, cols: &CaseLayout, year: i32) -> Option<CaseRow> {
    let (month, day) = parse_date(rec, cols.month, cols.day, year)?;
    Some(CaseRow { month, day, zone_id: parse_zone(rec, cols.zone)? })
}

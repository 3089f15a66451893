// Console presentation of a finished query.
use crate::types::{
    zone, Dose, QueryResult, ZoneCaseRow, ZoneSelector, ZoneUptakeRow, REGION_NAME, ZONES,
};
use crate::util::{format_int, format_rate};
use tabled::{settings::Style, Table, Tabled};

pub fn render_table<T: Tabled + Clone>(rows: &[T]) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows.to_vec()).with(Style::markdown()).to_string()
}

fn zone_name(id: u8) -> &'static str {
    zone(id).map(|z| z.name).unwrap_or("unknown zone")
}

pub fn location_name(selector: ZoneSelector) -> String {
    match selector {
        ZoneSelector::Zone(id) => zone_name(id).to_string(),
        ZoneSelector::All => format!("All of {}", REGION_NAME),
    }
}

/// Uptake rows for the selected zone, or for every zone on a region query.
pub fn uptake_rows(result: &QueryResult) -> Vec<ZoneUptakeRow> {
    let wanted = |id: u8| match result.selector {
        ZoneSelector::Zone(sel) => sel == id,
        ZoneSelector::All => true,
    };
    result
        .per_zone
        .iter()
        .filter(|(id, _)| wanted(**id))
        .map(|(&id, stats)| ZoneUptakeRow {
            zone: zone_name(id).to_string(),
            population: format_int(stats.population),
            dose1_uptake: format_rate(stats.dose1_rate),
            dose2_uptake: format_rate(stats.dose2_rate),
        })
        .collect()
}

pub fn case_rows(result: &QueryResult) -> Vec<ZoneCaseRow> {
    ZONES
        .iter()
        .filter_map(|z| {
            result.per_zone.get(&z.zone_id).map(|stats| ZoneCaseRow {
                zone: z.name.to_string(),
                cases: format_int(stats.case_count),
            })
        })
        .collect()
}

pub fn print_report(result: &QueryResult) {
    println!("\nChosen date: {}/{}", result.month, result.day);
    println!("Chosen location: {}", location_name(result.selector));

    match result.selected() {
        Some((def, stats)) => {
            println!("Population in the {}: {}", def.name, format_int(stats.population));
            println!("\n---- Vaccination Rate Statistics for {} ----", def.name);
        }
        None => {
            println!("Population in all {}: {}", REGION_NAME, format_int(result.regional_population));
            println!("\n---- Vaccination Rate Statistics ----");
            println!("(percentage of population vaccinated by zone)");
        }
    }
    println!("{}\n", render_table(&uptake_rows(result)));

    if result.selector == ZoneSelector::All {
        for dose in [Dose::First, Dose::Second] {
            if let Some(id) = result.max_rate_zone(dose) {
                let rate = result.per_zone.get(&id).and_then(|s| s.rate(dose));
                println!(
                    "Highest vaccine dose {} uptake is {} in the {}.",
                    dose,
                    format_rate(rate),
                    zone_name(id)
                );
            }
        }
        for dose in [Dose::First, Dose::Second] {
            println!(
                "All of {} dose {} uptake: {}",
                REGION_NAME,
                dose,
                format_rate(result.regional_rate(dose))
            );
        }
        println!();
    }

    println!(
        "On {}/{}, there were {} recorded Covid cases in {}.",
        result.month,
        result.day,
        format_int(result.total_cases),
        REGION_NAME
    );
    if let Some(id) = result.max_case_zone {
        let count = result.per_zone.get(&id).map_or(0, |s| s.case_count);
        println!(
            "The zone with the highest number of cases on that date is the {}, at {} cases.",
            zone_name(id),
            format_int(count)
        );
    }
    println!("{}\n", render_table(&case_rows(result)));

    if !result.warnings.is_empty() {
        println!("Data warnings:");
        for w in &result.warnings {
            println!("  - {}", w);
        }
        println!();
    }
}

// Entry point and interactive CLI flow.
//
// - Load the configuration and the three source tables once.
// - Ask for a date inside the range the data covers, then for one zone or
//   the whole region.
// - Run the query; when the population table has nothing for the date,
//   ask for another date and try again.
// - After a report, the user can run another query or exit.
mod calendar;
mod cases;
mod config;
mod engine;
mod error;
mod loader;
mod matcher;
mod output;
mod rates;
mod records;
mod table;
mod types;
mod util;

use calendar::Calendar;
use config::ReportConfig;
use engine::{QueryOutcome, StatsEngine};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::io::{self, Write};
use table::Tables;
use types::{Query, ZoneSelector, ZONES};

// Tables are read once at startup and never change afterwards.
static TABLES: OnceCell<Tables> = OnceCell::new();

/// Print `prompt` and read one trimmed line. `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn parse_month(input: &str, calendar: &Calendar) -> Result<u32, &'static str> {
    let month: u32 = input.parse().map_err(|_| "That is not an integer value.")?;
    match calendar.bound(month) {
        Some(_) => Ok(month),
        None => Err("That is not a valid month."),
    }
}

fn parse_day(input: &str, month: u32, calendar: &Calendar) -> Result<u32, &'static str> {
    let day: u32 = input.parse().map_err(|_| "That is not an integer value.")?;
    calendar.validate(month, day).map_err(|_| "That is not a valid day.")?;
    Ok(day)
}

fn parse_zone(input: &str) -> Result<u8, &'static str> {
    let id: u8 = input.parse().map_err(|_| "Please enter a numerical value.")?;
    if types::zone(id).is_some() {
        Ok(id)
    } else {
        Err("That number is out of bounds.")
    }
}

fn prompt_date(calendar: &Calendar) -> Option<(u32, u32)> {
    let months = calendar.months();
    let (first, last) = (*months.first()?, *months.last()?);
    let month = loop {
        let input = read_line(&format!("Please enter a numerical month, from {} to {} here: ", first, last))?;
        match parse_month(&input, calendar) {
            Ok(m) => break m,
            Err(msg) => println!("{}\n", msg),
        }
    };
    let bound = *calendar.bound(month)?;
    let day = loop {
        let input = read_line(&format!(
            "Please enter a numerical day ({}-{}) from {} here: ",
            bound.min_day, bound.max_day, month
        ))?;
        match parse_day(&input, month, calendar) {
            Ok(d) => break d,
            Err(msg) => println!("{}", msg),
        }
    };
    Some((month, day))
}

fn prompt_location() -> Option<ZoneSelector> {
    println!("\nWould you like stats for one zone, or stats for the whole region?");
    println!("1  Stats for one zone");
    println!("2  Stats for the whole region");
    loop {
        match read_line("Enter your choice (1 or 2) here: ")?.as_str() {
            "1" => break,
            "2" => return Some(ZoneSelector::All),
            _ => println!("That is not a valid choice.\n"),
        }
    }
    loop {
        println!("\nSelect a zone from below:");
        for z in ZONES.iter() {
            println!("{}  {}", z.zone_id, z.name);
        }
        match parse_zone(&read_line("Enter your selection here: ")?) {
            Ok(id) => return Some(ZoneSelector::Zone(id)),
            Err(msg) => println!("{}", msg),
        }
    }
}

/// Ask whether to run another query. `true` for `Y`, `false` for `N`.
fn prompt_again() -> bool {
    loop {
        let Some(resp) = read_line("Run another query (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Load config and tables into `TABLES`, printing a short summary.
fn handle_load() -> Option<Calendar> {
    let config = match ReportConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to read config: {}", e);
            return None;
        }
    };
    let (tables, report) = match loader::load_tables(&config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load data: {}", e);
            return None;
        }
    };
    println!(
        "Loaded {} vaccination, {} population and {} case rows.",
        util::format_int(tables.vaccinations.len()),
        util::format_int(tables.populations.len()),
        util::format_int(tables.cases.len())
    );
    if report.parse_errors() > 0 {
        println!(
            "Note: {} rows skipped due to parse/validation errors.",
            util::format_int(report.parse_errors())
        );
    }
    if let Some(((m0, d0), (m1, d1))) = tables.vaccinations.date_range() {
        info!("vaccination data covers {}/{} to {}/{} {}", m0, d0, m1, d1, config.year);
    }
    let calendar = Calendar::from_dates(config.year, tables.vaccinations.dates());
    if calendar.is_none() {
        eprintln!("Vaccination data covers no usable dates.");
    }
    let _ = TABLES.set(tables);
    calendar
}

/// Run one query to completion, re-asking for the date while the data has
/// nothing for it. Returns `false` when input ran out.
fn handle_query(engine: &StatsEngine, calendar: &Calendar) -> bool {
    let Some((mut month, mut day)) = prompt_date(calendar) else {
        return false;
    };
    let Some(selector) = prompt_location() else {
        return false;
    };
    loop {
        match engine.run(Query { month, day, selector }) {
            QueryOutcome::Done(result) => {
                output::print_report(&result);
                return true;
            }
            QueryOutcome::NeedsNewDate { .. } => {
                println!("Sorry, there's no data available for that date. Please choose another date.");
                match prompt_date(calendar) {
                    Some((m, d)) => {
                        month = m;
                        day = d;
                    }
                    None => return false,
                }
            }
            QueryOutcome::Failed { phase, error } => {
                error!("query failed during {:?}: {}", phase, error);
                eprintln!("Error: the data for {}/{} is inconsistent: {}\n", month, day, error);
                return true;
            }
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Welcome to the Covid stats program!");
    println!("I will calculate vaccination rates and find the number of Covid cases for a date you specify.\n");

    let Some(calendar) = handle_load() else {
        std::process::exit(1);
    };
    let Some(tables) = TABLES.get() else {
        std::process::exit(1);
    };
    let engine = StatsEngine::new(tables);

    loop {
        if !handle_query(&engine, &calendar) || !prompt_again() {
            println!("Exiting the program.");
            break;
        }
    }
}

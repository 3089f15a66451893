// Dose uptake rates and their population-weighted regional aggregate.
use crate::error::StatsError;
use crate::types::{Dose, ZoneId, ZoneRecord};

/// A dose uptake percentage. The unrounded value is what gets weighted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percentage(f64);

impl Percentage {
    pub fn value(self) -> f64 {
        self.0
    }

    pub fn in_range(self) -> bool {
        (0.0..=100.0).contains(&self.0)
    }
}

pub fn dose_rate(doses_administered: u64, population: u64) -> Result<Percentage, StatsError> {
    if population == 0 {
        return Err(StatsError::DivisionByZeroPopulation);
    }
    Ok(Percentage(doses_administered as f64 / population as f64 * 100.0))
}

/// Unrounded rate of one zone, `None` when it has no doses or no population.
pub fn zone_rate(record: &ZoneRecord, dose: Dose) -> Option<Percentage> {
    let doses = record.doses?;
    dose_rate(doses.get(dose), record.population).ok()
}

/// Population-weighted mean of the zones' unrounded rates. Zones without a
/// defined rate carry no weight. `None` when no zone has a rate.
pub fn weighted_regional_rate<'a, I>(records: I, dose: Dose) -> Option<Percentage>
where
    I: IntoIterator<Item = &'a ZoneRecord>,
{
    let weighted: Vec<(f64, f64)> = records
        .into_iter()
        .filter_map(|r| zone_rate(r, dose).map(|rate| (r.population as f64, rate.value())))
        .collect();
    let total: f64 = weighted.iter().map(|(p, _)| p).sum();
    if weighted.is_empty() || total <= 0.0 {
        return None;
    }
    // Accumulate offsets from the first rate so equal rates come back exactly.
    let base = weighted[0].1;
    let offset: f64 = weighted.iter().map(|(p, rate)| (p / total) * (rate - base)).sum();
    Some(Percentage(base + offset))
}

/// Zone with the highest unrounded rate. Ties go to the lowest zone id.
pub fn max_rate_zone<'a, I>(records: I, dose: Dose) -> Option<ZoneId>
where
    I: IntoIterator<Item = &'a ZoneRecord>,
{
    let mut rated: Vec<(ZoneId, f64)> = records
        .into_iter()
        .filter_map(|r| zone_rate(r, dose).map(|rate| (r.zone.zone_id, rate.value())))
        .collect();
    rated.sort_by_key(|(id, _)| *id);
    let mut best: Option<(ZoneId, f64)> = None;
    for (id, rate) in rated {
        match best {
            Some((_, best_rate)) if rate <= best_rate => {}
            _ => best = Some((id, rate)),
        }
    }
    best.map(|(id, _)| id)
}

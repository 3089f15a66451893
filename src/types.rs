use std::collections::BTreeMap;
use std::fmt;
use tabled::Tabled;

pub type ZoneId = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneDefinition {
    pub zone_id: ZoneId,
    pub name: &'static str,
}

/// The five Alberta health zones, in zone id order.
pub const ZONES: [ZoneDefinition; 5] = [
    ZoneDefinition { zone_id: 0, name: "Calgary Zone" },
    ZoneDefinition { zone_id: 1, name: "Central Zone" },
    ZoneDefinition { zone_id: 2, name: "Edmonton Zone" },
    ZoneDefinition { zone_id: 3, name: "North Zone" },
    ZoneDefinition { zone_id: 4, name: "South Zone" },
];

pub const REGION_NAME: &str = "Alberta";

pub fn zone(zone_id: ZoneId) -> Option<&'static ZoneDefinition> {
    ZONES.iter().find(|z| z.zone_id == zone_id)
}

/// Rows that carry a (month, day) sampling date.
pub trait Dated {
    fn date(&self) -> (u32, u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaccinationRow {
    pub month: u32,
    pub day: u32,
    pub zone_id: ZoneId,
    pub dose1_count: u64,
    pub dose2_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationRow {
    pub month: u32,
    pub day: u32,
    pub zone_id: ZoneId,
    pub population: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseRow {
    pub month: u32,
    pub day: u32,
    pub zone_id: ZoneId,
}

macro_rules! impl_dated {
    ($($row:ty),*) => {
        $(
            impl Dated for $row {
                fn date(&self) -> (u32, u32) {
                    (self.month, self.day)
                }
            }
        )*
    };
}

impl_dated!(VaccinationRow, PopulationRow, CaseRow);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Dose {
    First,
    Second,
}

impl fmt::Display for Dose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dose::First => write!(f, "1"),
            Dose::Second => write!(f, "2"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoseCounts {
    pub dose1: u64,
    pub dose2: u64,
}

impl DoseCounts {
    pub fn get(&self, dose: Dose) -> u64 {
        match dose {
            Dose::First => self.dose1,
            Dose::Second => self.dose2,
        }
    }
}

/// Reconciled view of one zone for the queried date.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRecord {
    pub zone: ZoneDefinition,
    pub population: u64,
    /// `None` when the vaccination table has no block for the date.
    pub doses: Option<DoseCounts>,
    pub case_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneSelector {
    Zone(ZoneId),
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query {
    pub month: u32,
    pub day: u32,
    pub selector: ZoneSelector,
}

/// Per-zone numbers handed to presentation. Rates are unrounded percentages;
/// `None` marks an undefined rate.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneStats {
    pub population: u64,
    pub dose1_rate: Option<f64>,
    pub dose2_rate: Option<f64>,
    pub case_count: u32,
}

impl ZoneStats {
    pub fn rate(&self, dose: Dose) -> Option<f64> {
        match dose {
            Dose::First => self.dose1_rate,
            Dose::Second => self.dose2_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataWarning {
    RateOutOfRange { zone: ZoneId, dose: Dose, rate: f64 },
    UndefinedRate { zone: ZoneId, dose: Dose, reason: String },
    MissingVaccinationData { month: u32, day: u32 },
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataWarning::RateOutOfRange { zone, dose, rate } => write!(
                f,
                "dose {} rate {:.2}% for zone {} is outside 0-100%",
                dose, rate, zone
            ),
            DataWarning::UndefinedRate { zone, dose, reason } => {
                write!(f, "dose {} rate for zone {} is undefined: {}", dose, zone, reason)
            }
            DataWarning::MissingVaccinationData { month, day } => {
                write!(f, "no vaccination data for {}/{}", month, day)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub month: u32,
    pub day: u32,
    pub selector: ZoneSelector,
    pub per_zone: BTreeMap<ZoneId, ZoneStats>,
    pub regional_population: u64,
    pub regional_dose1_rate: Option<f64>,
    pub regional_dose2_rate: Option<f64>,
    pub max_dose1_zone: Option<ZoneId>,
    pub max_dose2_zone: Option<ZoneId>,
    pub max_case_zone: Option<ZoneId>,
    pub total_cases: usize,
    pub warnings: Vec<DataWarning>,
}

impl QueryResult {
    /// Stats of the selected zone; `None` for a whole-region query.
    pub fn selected(&self) -> Option<(&'static ZoneDefinition, &ZoneStats)> {
        match self.selector {
            ZoneSelector::Zone(id) => zone(id).zip(self.per_zone.get(&id)),
            ZoneSelector::All => None,
        }
    }

    pub fn regional_rate(&self, dose: Dose) -> Option<f64> {
        match dose {
            Dose::First => self.regional_dose1_rate,
            Dose::Second => self.regional_dose2_rate,
        }
    }

    pub fn max_rate_zone(&self, dose: Dose) -> Option<ZoneId> {
        match dose {
            Dose::First => self.max_dose1_zone,
            Dose::Second => self.max_dose2_zone,
        }
    }
}

#[derive(Debug, Tabled, Clone)]
pub struct ZoneUptakeRow {
    #[tabled(rename = "Zone")]
    pub zone: String,
    #[tabled(rename = "Population")]
    pub population: String,
    #[tabled(rename = "Dose1Uptake")]
    pub dose1_uptake: String,
    #[tabled(rename = "Dose2Uptake")]
    pub dose2_uptake: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct ZoneCaseRow {
    #[tabled(rename = "Zone")]
    pub zone: String,
    #[tabled(rename = "Cases")]
    pub cases: String,
}

use crate::types::ZoneId;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Vaccinations,
    Population,
    Cases,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableKind::Vaccinations => "vaccination",
            TableKind::Population => "population",
            TableKind::Cases => "case",
        };
        f.write_str(name)
    }
}

/// Failures raised while answering a single query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("no data available for {month}/{day}")]
    NoDataForDate { month: u32, day: u32 },

    #[error("population is zero, rate is undefined")]
    DivisionByZeroPopulation,

    #[error("zone {zone} has no matching rows in the {missing_from} table")]
    ZoneJoinError { zone: ZoneId, missing_from: TableKind },

    #[error("zone {zone} has conflicting rows in the {table} table")]
    ConflictingRows { zone: ZoneId, table: TableKind },

    #[error("{month}/{day} is outside the available date range")]
    DateOutOfRange { month: u32, day: u32 },

    #[error("unknown zone {0}")]
    UnknownZone(ZoneId),
}

/// Failures raised while reading configuration or the source tables.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("invalid config {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} table has no usable rows")]
    EmptyTable(TableKind),
}

// Runtime configuration: where the three exports live, the calendar year they
// cover and which column holds which field. Every field has a default, so a
// missing config file just means "use the standard export names".
use crate::error::LoadError;
use log::info;
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_ENV: &str = "COVID_REPORT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "covid_report.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VaccinationLayout {
    pub month: usize,
    pub day: usize,
    pub zone: usize,
    pub dose1: usize,
    pub dose2: usize,
}

impl Default for VaccinationLayout {
    fn default() -> Self {
        VaccinationLayout { month: 1, day: 2, zone: 3, dose1: 4, dose2: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PopulationLayout {
    pub month: usize,
    pub day: usize,
    pub zone: usize,
    pub population: usize,
}

impl Default for PopulationLayout {
    fn default() -> Self {
        PopulationLayout { month: 1, day: 2, zone: 3, population: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CaseLayout {
    pub month: usize,
    pub day: usize,
    pub zone: usize,
}

impl Default for CaseLayout {
    fn default() -> Self {
        CaseLayout { month: 1, day: 2, zone: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub vaccinations_path: String,
    pub population_path: String,
    pub cases_path: String,
    pub year: i32,
    pub vaccination_columns: VaccinationLayout,
    pub population_columns: PopulationLayout,
    pub case_columns: CaseLayout,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            vaccinations_path: "AB_vaccinations.csv".to_string(),
            population_path: "AB_population.csv".to_string(),
            cases_path: "AB_COVID_cases.csv".to_string(),
            year: 2021,
            vaccination_columns: VaccinationLayout::default(),
            population_columns: PopulationLayout::default(),
            case_columns: CaseLayout::default(),
        }
    }
}

impl ReportConfig {
    /// Read the config named by `COVID_REPORT_CONFIG`, falling back to
    /// `covid_report.json`. A missing file yields the defaults.
    pub fn load() -> Result<ReportConfig, LoadError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_path(&path)
    }

    pub fn from_path(path: &str) -> Result<ReportConfig, LoadError> {
        if !Path::new(path).exists() {
            info!("no config at {}, using defaults", path);
            return Ok(ReportConfig::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|source| LoadError::Io { path: path.to_string(), source })?;
        let config = serde_json::from_str(&text)
            .map_err(|source| LoadError::Config { path: path.to_string(), source })?;
        info!("loaded config from {}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let config = ReportConfig::from_path(path.to_str().unwrap()).unwrap();
        assert_eq!(config, ReportConfig::default());
        assert_eq!(config.year, 2021);
        assert_eq!(config.population_columns.population, 4);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"cases_path": "cases.csv", "year": 2022, "case_columns": {{"zone": 5}}}}"#
        )
        .unwrap();
        let config = ReportConfig::from_path(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.cases_path, "cases.csv");
        assert_eq!(config.year, 2022);
        assert_eq!(config.case_columns, CaseLayout { month: 1, day: 2, zone: 5 });
        assert_eq!(config.vaccinations_path, "AB_vaccinations.csv");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            ReportConfig::from_path(file.path().to_str().unwrap()),
            Err(LoadError::Config { .. })
        ));
    }
}

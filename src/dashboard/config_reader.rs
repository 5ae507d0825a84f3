use crate::dashboard::*;

use conflict_stats::builder::SelectionBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSettings {
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    pub provider: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

/// The values of the filter controls. Missing values take the dashboard defaults.
///
/// This is also the format of each line in interactive mode.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSettings {
    pub country: Option<String>,
    #[serde(rename = "fromYear")]
    pub from_year: Option<i32>,
    #[serde(rename = "toYear")]
    pub to_year: Option<i32>,
    #[serde(rename = "disorderTypes")]
    pub disorder_types: Option<Vec<String>>,
    #[serde(rename = "eventTypes")]
    pub event_types: Option<Vec<String>>,
}

impl FilterSettings {
    pub fn to_builder(&self) -> Result<SelectionBuilder, FilterError> {
        let mut builder = SelectionBuilder::new();
        if let Some(c) = &self.country {
            builder = builder.country(c.parse::<CountrySelection>()?);
        }
        if let Some(y) = self.from_year {
            builder = builder.from_year(y);
        }
        if let Some(y) = self.to_year {
            builder = builder.to_year(y);
        }
        if let Some(types) = &self.disorder_types {
            builder = builder.disorder_types(types);
        }
        if let Some(types) = &self.event_types {
            builder = builder.event_types(types);
        }
        Ok(builder)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "includeRows")]
    pub include_rows: Option<bool>,
    #[serde(rename = "topLocations")]
    pub top_locations: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(rename = "inputSettings")]
    pub input_settings: Option<InputSettings>,
    pub filters: Option<FilterSettings>,
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
}

pub fn read_config(path: &str) -> DashResult<DashboardConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashboardConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn parse_filters(line: &str) -> DashResult<FilterSettings> {
    serde_json::from_str(line).context(ParsingJsonSnafu {})
}

pub fn read_reference(path: &str) -> DashResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_full_config() {
        let js = r#"{
            "inputSettings": {
                "filePath": "Israel-Palestine.xlsx",
                "provider": "xlsx",
                "excelWorksheetName": "Sheet1"
            },
            "filters": {
                "country": "Both",
                "fromYear": 2016,
                "toYear": 2024,
                "eventTypes": ["Riots", "Protests"]
            },
            "outputSettings": {
                "outputPath": "dashboard.json",
                "includeRows": false,
                "topLocations": 20
            }
        }"#;
        let config: DashboardConfig = serde_json::from_str(js).unwrap();
        let input = config.input_settings.unwrap();
        assert_eq!(input.excel_worksheet_name, Some("Sheet1".to_string()));
        let filters = config.filters.unwrap();
        assert_eq!(filters.to_year, Some(2024));
        assert_eq!(filters.disorder_types, None);
        assert_eq!(
            filters.event_types,
            Some(vec!["Riots".to_string(), "Protests".to_string()])
        );
        assert_eq!(config.output_settings.unwrap().top_locations, Some(20));
    }

    #[test]
    fn empty_config_is_valid() {
        let config: DashboardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn filters_to_builder() {
        let filters = parse_filters(r#"{"country": "palestine", "toYear": 2020}"#).unwrap();
        let builder = filters.to_builder().unwrap();
        let expected = SelectionBuilder::new()
            .country(CountrySelection::Palestine)
            .to_year(2020);
        assert_eq!(builder, expected);

        let bad = parse_filters(r#"{"country": "Atlantis"}"#).unwrap();
        assert_eq!(
            bad.to_builder(),
            Err(FilterError::UnknownCountry("Atlantis".to_string()))
        );
        assert!(matches!(
            parse_filters("{\"fromYear\": \"soon\"}"),
            Err(DashboardError::ParsingJson { .. })
        ));
    }
}

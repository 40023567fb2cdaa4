use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query parameters of the flight options lookup
///
/// Absent parameters deserialize to empty strings so that validation reports
/// them the same way as present-but-empty ones. `language` is required but
/// does not influence the lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FlightOptionsQuery {
    #[validate(length(min = 1))]
    #[serde(rename = "marketCode", default)]
    pub market_code: String,
    #[validate(length(min = 1))]
    #[serde(rename = "regionCode", default)]
    pub region_code: String,
    #[validate(length(min = 1))]
    #[serde(default)]
    pub language: String,
    #[validate(length(min = 1))]
    #[serde(default)]
    pub status: String,
}

impl FlightOptionsQuery {
    pub fn new(market_code: &str, region_code: &str, language: &str, status: &str) -> Self {
        Self {
            market_code: market_code.to_string(),
            region_code: region_code.to_string(),
            language: language.to_string(),
            status: status.to_string(),
        }
    }

    /// Build a query from raw key/value pairs; a repeated key keeps its last
    /// value and unknown keys are ignored
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "marketCode" => query.market_code = value,
                "regionCode" => query.region_code = value,
                "language" => query.language = value,
                "status" => query.status = value,
                _ => {}
            }
        }
        query
    }
}

use serde::{Deserialize, Serialize};
use crate::models::domain::{Airport, Benefit, FlightOption};

/// Response for the flight options endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOptionsResponse {
    pub title: String,
    pub icon: String,
    #[serde(rename = "marketCode")]
    pub market_code: String,
    #[serde(rename = "regionCode")]
    pub region_code: String,
    #[serde(rename = "isRecommend")]
    pub is_recommend: bool,
    #[serde(rename = "airportCode")]
    pub airport_code: Vec<AirportResponse>,
    pub benefits: Vec<BenefitResponse>,
    pub tags: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportResponse {
    pub title: String,
    pub icon: String,
    pub city: String,
    pub code: String,
    pub wifi: bool,
}

/// Benefit entry; `isAvalible` is spelled the way existing clients read it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitResponse {
    pub title: String,
    #[serde(rename = "subTitle")]
    pub sub_title: String,
    #[serde(rename = "isAvalible")]
    pub is_available: bool,
    pub image: String,
    #[serde(rename = "toolTipText")]
    pub tool_tip_text: String,
}

impl From<Airport> for AirportResponse {
    fn from(airport: Airport) -> Self {
        Self {
            title: airport.title,
            icon: airport.icon,
            city: airport.city,
            code: airport.code,
            wifi: airport.wifi,
        }
    }
}

impl From<Benefit> for BenefitResponse {
    fn from(benefit: Benefit) -> Self {
        Self {
            title: benefit.title,
            sub_title: benefit.sub_title,
            is_available: benefit.is_available,
            image: benefit.image,
            tool_tip_text: benefit.tooltip_text,
        }
    }
}

impl FlightOptionsResponse {
    /// Project a record into the response, echoing the requested codes
    pub fn from_record(record: FlightOption, market_code: &str, region_code: &str) -> Self {
        Self {
            title: record.title,
            icon: record.icon,
            market_code: market_code.to_string(),
            region_code: region_code.to_string(),
            is_recommend: record.is_recommend,
            airport_code: record.airports.into_iter().map(AirportResponse::from).collect(),
            benefits: record.benefits.into_iter().map(BenefitResponse::from).collect(),
            tags: record.tags,
            currency: record.currency,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

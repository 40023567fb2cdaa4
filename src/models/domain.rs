use serde::{Deserialize, Serialize};

/// Content identifier assigned by the content store
pub type NodeId = u64;

/// Content kind queried by the lookup service
pub const FLIGHT_OPTIONS_KIND: &str = "flight_options";

/// Flight option record with its references resolved
///
/// File fields (`icon`) already hold resolved URIs and `currency` holds the
/// label of the referenced currency term. Reference lists keep the order the
/// store holds them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOption {
    pub id: NodeId,
    pub title: String,
    #[serde(default)]
    pub icon: String,
    #[serde(rename = "isRecommend", default)]
    pub is_recommend: bool,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub currency: String,
    #[serde(rename = "marketCode")]
    pub market_code: String,
    #[serde(rename = "regionCode")]
    pub region_code: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub airports: Vec<Airport>,
    #[serde(default)]
    pub benefits: Vec<Benefit>,
}

/// Airport referenced by a flight option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub title: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub wifi: bool,
}

/// Benefit referenced by a flight option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benefit {
    pub title: String,
    #[serde(rename = "subTitle", default)]
    pub sub_title: String,
    #[serde(rename = "isAvailable", default)]
    pub is_available: bool,
    #[serde(default)]
    pub image: String,
    #[serde(rename = "toolTipText", default)]
    pub tooltip_text: String,
}

/// Publication filter derived from the `status` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    Published,
    Unpublished,
    Any,
}

impl StatusFilter {
    /// Map the raw parameter: "1" is published, "0" unpublished, anything else
    /// applies no filter.
    pub fn from_param(value: &str) -> Self {
        match value {
            "1" => StatusFilter::Published,
            "0" => StatusFilter::Unpublished,
            _ => StatusFilter::Any,
        }
    }

    /// Required value of the `published` flag, if any
    pub fn published(self) -> Option<bool> {
        match self {
            StatusFilter::Published => Some(true),
            StatusFilter::Unpublished => Some(false),
            StatusFilter::Any => None,
        }
    }

    pub fn matches(self, published: bool) -> bool {
        self.published().map_or(true, |wanted| wanted == published)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::Published => "published",
            StatusFilter::Unpublished => "unpublished",
            StatusFilter::Any => "any",
        }
    }
}

/// Store query for flight options
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlightOptionFilter {
    pub market_code: String,
    pub region_code: String,
    pub status: StatusFilter,
}

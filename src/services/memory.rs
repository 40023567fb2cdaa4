use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::models::{Airport, Benefit, FlightOption, FlightOptionFilter, NodeId};
use crate::services::store::{ContentStore, StoreError};

/// Serialized content snapshot, as stored in fixture files
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentSnapshot {
    #[serde(rename = "flightOptions", default)]
    pub flight_options: Vec<FlightOptionNode>,
    #[serde(default)]
    pub airports: Vec<AirportNode>,
    #[serde(default)]
    pub benefits: Vec<BenefitNode>,
}

/// Flight option with references held as identifiers
#[derive(Debug, Clone, Deserialize)]
pub struct FlightOptionNode {
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
    pub airports: Vec<NodeId>,
    #[serde(default)]
    pub benefits: Vec<NodeId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AirportNode {
    pub id: NodeId,
    #[serde(flatten)]
    pub airport: Airport,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BenefitNode {
    pub id: NodeId,
    #[serde(flatten)]
    pub benefit: Benefit,
}

/// Immutable in-process content store
///
/// Used for local development (loaded from a fixture file) and in tests.
pub struct InMemoryStore {
    flight_options: BTreeMap<NodeId, FlightOptionNode>,
    airports: BTreeMap<NodeId, Airport>,
    benefits: BTreeMap<NodeId, Benefit>,
}

impl InMemoryStore {
    /// Build a store from a snapshot, rejecting duplicate identifiers
    pub fn new(snapshot: ContentSnapshot) -> Result<Self, StoreError> {
        Ok(Self {
            flight_options: index_by_id(
                "flight option",
                snapshot.flight_options.into_iter().map(|node| (node.id, node)),
            )?,
            airports: index_by_id(
                "airport",
                snapshot.airports.into_iter().map(|node| (node.id, node.airport)),
            )?,
            benefits: index_by_id(
                "benefit",
                snapshot.benefits.into_iter().map(|node| (node.id, node.benefit)),
            )?,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let snapshot: ContentSnapshot = serde_json::from_str(json)
            .map_err(|e| StoreError::Fixture(format!("Failed to parse snapshot: {}", e)))?;
        Self::new(snapshot)
    }

    /// Load a snapshot from a JSON fixture file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Fixture(format!("Failed to read {}: {}", path.display(), e)))?;
        let store = Self::from_json_str(&json)?;

        tracing::info!(
            "Loaded content snapshot from {} ({} flight options, {} airports, {} benefits)",
            path.display(),
            store.flight_options.len(),
            store.airports.len(),
            store.benefits.len()
        );

        Ok(store)
    }

    fn resolve(&self, node: &FlightOptionNode) -> Result<FlightOption, StoreError> {
        let airports = node
            .airports
            .iter()
            .map(|id| {
                self.airports.get(id).cloned().ok_or_else(|| {
                    StoreError::InvalidData(format!("Flight option {} references missing airport {}", node.id, id))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let benefits = node
            .benefits
            .iter()
            .map(|id| {
                self.benefits.get(id).cloned().ok_or_else(|| {
                    StoreError::InvalidData(format!("Flight option {} references missing benefit {}", node.id, id))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FlightOption {
            id: node.id,
            title: node.title.clone(),
            icon: node.icon.clone(),
            is_recommend: node.is_recommend,
            tags: node.tags.clone(),
            currency: node.currency.clone(),
            market_code: node.market_code.clone(),
            region_code: node.region_code.clone(),
            published: node.published,
            airports,
            benefits,
        })
    }

    fn matches(filter: &FlightOptionFilter, node: &FlightOptionNode) -> bool {
        node.market_code == filter.market_code
            && node.region_code == filter.region_code
            && filter.status.matches(node.published)
    }
}

fn index_by_id<T>(
    kind: &str,
    entries: impl Iterator<Item = (NodeId, T)>,
) -> Result<BTreeMap<NodeId, T>, StoreError> {
    let mut index = BTreeMap::new();
    for (id, value) in entries {
        if index.insert(id, value).is_some() {
            return Err(StoreError::Fixture(format!("Duplicate {} id {}", kind, id)));
        }
    }
    Ok(index)
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn find_flight_options(&self, filter: &FlightOptionFilter) -> Result<Vec<NodeId>, StoreError> {
        Ok(self
            .flight_options
            .values()
            .filter(|node| Self::matches(filter, node))
            .map(|node| node.id)
            .collect())
    }

    async fn load_flight_option(&self, id: NodeId) -> Result<Option<FlightOption>, StoreError> {
        self.flight_options
            .get(&id)
            .map(|node| self.resolve(node))
            .transpose()
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatusFilter;

    const SNAPSHOT: &str = r#"{
        "flightOptions": [
            { "id": 7, "title": "Economy", "marketCode": "US", "regionCode": "EAST",
              "published": false, "airports": [100], "benefits": [] },
            { "id": 3, "title": "Business", "marketCode": "US", "regionCode": "EAST",
              "published": true, "airports": [101, 100, 101], "benefits": [200] },
            { "id": 9, "title": "Broken", "marketCode": "MX", "regionCode": "NORTH",
              "published": true, "airports": [999] }
        ],
        "airports": [
            { "id": 100, "title": "JFK", "city": "New York", "code": "JFK", "wifi": true },
            { "id": 101, "title": "BOS", "city": "Boston", "code": "BOS" }
        ],
        "benefits": [
            { "id": 200, "title": "Lounge", "subTitle": "Free", "isAvailable": true,
              "image": "public://lounge.png", "toolTipText": "Tip" }
        ]
    }"#;

    fn filter(status: StatusFilter) -> FlightOptionFilter {
        FlightOptionFilter {
            market_code: "US".to_string(),
            region_code: "EAST".to_string(),
            status,
        }
    }

    #[tokio::test]
    async fn test_find_respects_status_filter() {
        let store = InMemoryStore::from_json_str(SNAPSHOT).unwrap();

        assert_eq!(store.find_flight_options(&filter(StatusFilter::Any)).await.unwrap(), vec![3, 7]);
        assert_eq!(store.find_flight_options(&filter(StatusFilter::Published)).await.unwrap(), vec![3]);
        assert_eq!(store.find_flight_options(&filter(StatusFilter::Unpublished)).await.unwrap(), vec![7]);
    }

    #[tokio::test]
    async fn test_load_resolves_references_in_order() {
        let store = InMemoryStore::from_json_str(SNAPSHOT).unwrap();
        let option = store.load_flight_option(3).await.unwrap().unwrap();

        let codes: Vec<&str> = option.airports.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["BOS", "JFK", "BOS"]);
        assert_eq!(option.benefits.len(), 1);
        assert_eq!(option.benefits[0].tooltip_text, "Tip");
        assert!(!option.airports[0].wifi);
    }

    #[tokio::test]
    async fn test_load_unknown_id_is_none() {
        let store = InMemoryStore::from_json_str(SNAPSHOT).unwrap();
        assert!(store.load_flight_option(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dangling_reference_is_invalid_data() {
        let store = InMemoryStore::from_json_str(SNAPSHOT).unwrap();
        let result = store.load_flight_option(9).await;
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let duplicate_option = r#"{ "flightOptions": [
            { "id": 1, "title": "A", "marketCode": "US", "regionCode": "EAST" },
            { "id": 1, "title": "B", "marketCode": "US", "regionCode": "EAST" }
        ] }"#;
        assert!(matches!(
            InMemoryStore::from_json_str(duplicate_option),
            Err(StoreError::Fixture(msg)) if msg.contains("flight option id 1")
        ));

        let duplicate_airport = r#"{ "airports": [
            { "id": 10, "title": "JFK" },
            { "id": 10, "title": "EWR" }
        ] }"#;
        assert!(matches!(
            InMemoryStore::from_json_str(duplicate_airport),
            Err(StoreError::Fixture(_))
        ));
    }

    #[test]
    fn test_malformed_snapshot_is_rejected() {
        assert!(matches!(
            InMemoryStore::from_json_str("{ not json"),
            Err(StoreError::Fixture(_))
        ));
    }
}

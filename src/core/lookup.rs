use std::sync::Arc;
use validator::Validate;

use crate::core::error::LookupError;
use crate::models::{FlightOption, FlightOptionFilter, FlightOptionsQuery, FlightOptionsResponse, StatusFilter};
use crate::services::{CacheError, CacheKey, CacheManager, ContentStore, StoreError};

/// Flight options lookup
///
/// Validates the request, queries the injected content store, picks one
/// matching record and projects it into the response document. When several
/// records match, the one with the smallest identifier wins.
#[derive(Clone)]
pub struct FlightOptionsService {
    store: Arc<dyn ContentStore>,
    cache: Option<Arc<CacheManager>>,
}

impl FlightOptionsService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store, cache: None }
    }

    /// Serve successful lookups from `cache` before touching the store
    pub fn with_cache(mut self, cache: Arc<CacheManager>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    pub async fn handle(&self, query: &FlightOptionsQuery) -> Result<FlightOptionsResponse, LookupError> {
        if let Err(errors) = query.validate() {
            tracing::info!("Rejected flight options request: {}", errors);
            return Err(LookupError::MissingParameter);
        }

        let filter = FlightOptionFilter {
            market_code: query.market_code.clone(),
            region_code: query.region_code.clone(),
            status: StatusFilter::from_param(&query.status),
        };

        let cache_key = CacheKey::flight_options(&filter);
        if let Some(cached) = self.cached(&cache_key).await {
            return Ok(cached);
        }

        let record = self
            .find_first(&filter)
            .await?
            .ok_or(LookupError::ContentNotFound)?;

        tracing::debug!(
            "Serving flight option {} for {}/{} ({} airports, {} benefits)",
            record.id,
            filter.market_code,
            filter.region_code,
            record.airports.len(),
            record.benefits.len()
        );

        let response = FlightOptionsResponse::from_record(record, &query.market_code, &query.region_code);

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&cache_key, &response).await {
                tracing::warn!("Failed to cache flight options response: {}", e);
            }
        }

        Ok(response)
    }

    /// Lowest-id record matching `filter`
    async fn find_first(&self, filter: &FlightOptionFilter) -> Result<Option<FlightOption>, StoreError> {
        let mut ids = self.store.find_flight_options(filter).await?;
        ids.sort_unstable();
        ids.dedup();

        if ids.len() > 1 {
            tracing::debug!(
                "{} flight options match {}/{}, using {}",
                ids.len(),
                filter.market_code,
                filter.region_code,
                ids[0]
            );
        }

        match ids.first() {
            Some(&id) => self.store.load_flight_option(id).await,
            None => Ok(None),
        }
    }

    async fn cached(&self, key: &str) -> Option<FlightOptionsResponse> {
        let cache = self.cache.as_ref()?;
        match cache.get(key).await {
            Ok(response) => {
                tracing::debug!("Serving cached flight options: {}", key);
                Some(response)
            }
            Err(CacheError::CacheMiss(_)) => None,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryStore;

    fn service(json: &str) -> FlightOptionsService {
        FlightOptionsService::new(Arc::new(InMemoryStore::from_json_str(json).unwrap()))
    }

    #[tokio::test]
    async fn test_validation_precedes_store_access() {
        // A dangling reference would fail the load; validation must reject first.
        let service = service(
            r#"{ "flightOptions": [ { "id": 1, "title": "X", "marketCode": "US",
                 "regionCode": "EAST", "published": true, "airports": [5] } ] }"#,
        );

        let result = service.handle(&FlightOptionsQuery::new("US", "EAST", "", "1")).await;
        assert!(matches!(result, Err(LookupError::MissingParameter)));

        let result = service.handle(&FlightOptionsQuery::new("US", "EAST", "en", "1")).await;
        assert!(matches!(result, Err(LookupError::Store(StoreError::InvalidData(_)))));
    }

    #[tokio::test]
    async fn test_smallest_id_wins() {
        let service = service(
            r#"{ "flightOptions": [
                { "id": 12, "title": "Later", "marketCode": "US", "regionCode": "EAST", "published": true },
                { "id": 4, "title": "Earlier", "marketCode": "US", "regionCode": "EAST", "published": true }
            ] }"#,
        );

        let response = service.handle(&FlightOptionsQuery::new("US", "EAST", "en", "1")).await.unwrap();
        assert_eq!(response.title, "Earlier");
    }

    #[tokio::test]
    async fn test_cache_serves_repeated_lookup() {
        let cache = Arc::new(CacheManager::in_memory(16, 900));
        let service = service(
            r#"{ "flightOptions": [
                { "id": 1, "title": "Cached", "marketCode": "US", "regionCode": "EAST", "published": true }
            ] }"#,
        )
        .with_cache(cache.clone());

        let query = FlightOptionsQuery::new("US", "EAST", "en", "1");
        let first = service.handle(&query).await.unwrap();

        let key = "flight_options:US:EAST:published";
        let stored: FlightOptionsResponse = cache.get(key).await.unwrap();
        assert_eq!(stored, first);

        let second = service.handle(&query).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let cache = Arc::new(CacheManager::in_memory(16, 900));
        let service = service(r#"{ "flightOptions": [] }"#).with_cache(cache.clone());

        let result = service.handle(&FlightOptionsQuery::new("US", "EAST", "en", "2")).await;
        assert!(matches!(result, Err(LookupError::ContentNotFound)));
        assert!(cache.get::<FlightOptionsResponse>("flight_options:US:EAST:any").await.is_err());
    }

    #[tokio::test]
    async fn test_cache_keeps_colon_bearing_codes_apart() {
        let cache = Arc::new(CacheManager::in_memory(16, 900));
        let service = service(
            r#"{ "flightOptions": [
                { "id": 1, "title": "Joined market", "marketCode": "US:EAST", "regionCode": "X", "published": true },
                { "id": 2, "title": "Joined region", "marketCode": "US", "regionCode": "EAST:X", "published": true }
            ] }"#,
        )
        .with_cache(cache);

        let market = service.handle(&FlightOptionsQuery::new("US:EAST", "X", "en", "1")).await.unwrap();
        let region = service.handle(&FlightOptionsQuery::new("US", "EAST:X", "en", "1")).await.unwrap();

        assert_eq!(market.title, "Joined market");
        assert_eq!(region.title, "Joined region");
        assert_eq!(region.market_code, "US");
        assert_eq!(region.region_code, "EAST:X");
    }
}

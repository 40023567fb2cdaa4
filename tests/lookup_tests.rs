// Lookup service tests against the bundled content snapshot

use flight_options::models::{AirportResponse, BenefitResponse};
use flight_options::{FlightOptionsQuery, FlightOptionsService, InMemoryStore, LookupError};
use std::sync::Arc;

fn fixture_service() -> FlightOptionsService {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/flight_options.json");
    let store = InMemoryStore::from_path(path).expect("Failed to load fixture");
    FlightOptionsService::new(Arc::new(store))
}

#[tokio::test]
async fn test_published_lookup_projects_record() {
    let service = fixture_service();

    let response = service
        .handle(&FlightOptionsQuery::new("US", "EAST", "en", "1"))
        .await
        .unwrap();

    assert_eq!(response.title, "Premium Economy");
    assert_eq!(response.icon, "public://flight_options/premium-economy.svg");
    assert_eq!(response.market_code, "US");
    assert_eq!(response.region_code, "EAST");
    assert!(response.is_recommend);
    assert_eq!(response.tags, "comfort,recommended");
    assert_eq!(response.currency, "USD");

    // Both airports in store order, then the single benefit
    assert_eq!(
        response.airport_code,
        vec![
            AirportResponse {
                title: "John F. Kennedy International".to_string(),
                icon: "public://airports/jfk.svg".to_string(),
                city: "New York".to_string(),
                code: "JFK".to_string(),
                wifi: true,
            },
            AirportResponse {
                title: "Logan International".to_string(),
                icon: "public://airports/bos.svg".to_string(),
                city: "Boston".to_string(),
                code: "BOS".to_string(),
                wifi: false,
            },
        ]
    );
    assert_eq!(
        response.benefits,
        vec![BenefitResponse {
            title: "Lounge access".to_string(),
            sub_title: "Before departure".to_string(),
            is_available: true,
            image: "public://benefits/lounge.png".to_string(),
            tool_tip_text: "Valid at participating lounges".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_unpublished_status_selects_unpublished_record() {
    let service = fixture_service();

    let response = service
        .handle(&FlightOptionsQuery::new("US", "EAST", "en", "0"))
        .await
        .unwrap();

    assert_eq!(response.title, "Basic Economy");
    assert!(!response.is_recommend);
    assert_eq!(response.benefits.len(), 1);
    assert!(!response.benefits[0].is_available);
}

#[tokio::test]
async fn test_other_status_applies_no_filter() {
    let service = fixture_service();

    // Records 1 (published) and 2 (unpublished) both match; the lower id wins
    let response = service
        .handle(&FlightOptionsQuery::new("US", "EAST", "en", "2"))
        .await
        .unwrap();

    assert_eq!(response.title, "Premium Economy");
}

#[tokio::test]
async fn test_language_does_not_affect_result() {
    let service = fixture_service();

    let english = service
        .handle(&FlightOptionsQuery::new("MX", "CENTRO", "en", "1"))
        .await
        .unwrap();
    let spanish = service
        .handle(&FlightOptionsQuery::new("MX", "CENTRO", "es", "1"))
        .await
        .unwrap();

    assert_eq!(english, spanish);
    assert_eq!(english.benefits.len(), 2);
}

#[tokio::test]
async fn test_no_match_is_content_not_found() {
    let service = fixture_service();

    let cases = [
        FlightOptionsQuery::new("US", "WEST", "en", "1"),
        FlightOptionsQuery::new("us", "EAST", "en", "1"),
        FlightOptionsQuery::new("MX", "CENTRO", "es", "0"),
    ];

    for query in cases {
        let result = service.handle(&query).await;
        assert!(
            matches!(result, Err(LookupError::ContentNotFound)),
            "expected not found for {:?}",
            query
        );
    }
}

#[tokio::test]
async fn test_missing_parameters_are_rejected() {
    let service = fixture_service();

    let cases = [
        FlightOptionsQuery::new("", "EAST", "en", "1"),
        FlightOptionsQuery::new("US", "", "en", "1"),
        FlightOptionsQuery::new("US", "EAST", "", "1"),
        FlightOptionsQuery::new("US", "EAST", "en", ""),
        FlightOptionsQuery::default(),
    ];

    for query in cases {
        let result = service.handle(&query).await;
        assert!(
            matches!(result, Err(LookupError::MissingParameter)),
            "expected missing parameter for {:?}",
            query
        );
    }
}

#[tokio::test]
async fn test_repeated_lookups_serialize_identically() {
    let service = fixture_service();
    let query = FlightOptionsQuery::new("US", "EAST", "en", "1");

    let first = serde_json::to_vec(&service.handle(&query).await.unwrap()).unwrap();
    let second = serde_json::to_vec(&service.handle(&query).await.unwrap()).unwrap();

    assert_eq!(first, second);
}

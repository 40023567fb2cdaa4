use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{web, HttpResponse, Responder};

use crate::core::{FlightOptionsService, LookupError};
use crate::models::{FlightOptionsQuery, HealthResponse};

/// Client freshness window for successful lookups
pub const DEFAULT_MAX_AGE_SECS: u32 = 900;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: FlightOptionsService,
    pub max_age_secs: u32,
}

impl AppState {
    pub fn new(service: FlightOptionsService) -> Self {
        Self {
            service,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
        }
    }
}

/// Configure versioned routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/flight-options", web::get().to(get_flight_options));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store = state.service.store();
    let healthy = match store.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Content store health check failed: {}", e);
            false
        }
    };

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: store.backend().to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Flight options lookup
///
/// GET /api/v1/flight-options?marketCode=US&regionCode=EAST&language=en&status=1
///
/// `status` "1" restricts to published content, "0" to unpublished content,
/// any other value applies no publication filter. A repeated parameter takes
/// its last value. Responds 400 when a parameter is missing and 404 when
/// nothing matches.
pub(crate) async fn get_flight_options(
    state: web::Data<AppState>,
    pairs: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, LookupError> {
    let query = FlightOptionsQuery::from_pairs(pairs.into_inner());

    tracing::info!(
        "Flight options lookup: market={}, region={}, language={}, status={}",
        query.market_code,
        query.region_code,
        query.language,
        query.status
    );

    let response = state.service.handle(&query).await?;

    Ok(HttpResponse::Ok()
        .insert_header(CacheControl(vec![
            CacheDirective::Public,
            CacheDirective::MaxAge(state.max_age_secs),
        ]))
        .json(response))
}

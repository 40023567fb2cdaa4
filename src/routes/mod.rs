// Route exports
pub mod flight_options;

use actix_web::{error, web, HttpRequest};

use crate::core::LookupError;

pub use flight_options::AppState;

/// Handle query payload errors
///
/// A query string that cannot be decoded is reported the same way as a
/// missing parameter.
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Query payload error on {}: {}", req.path(), err);
    LookupError::MissingParameter.into()
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
        .route("/get-flight-options", web::get().to(flight_options::get_flight_options))
        .service(
            web::scope("/api/v1")
                .configure(flight_options::configure),
        );
}

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{FlightOption, FlightOptionFilter, NodeId};
use crate::services::appwrite::AppwriteError;
use crate::services::postgres::PostgresError;

/// Errors raised by a content store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("PostgreSQL store: {0}")]
    Postgres(#[from] PostgresError),

    #[error("Appwrite store: {0}")]
    Appwrite(#[from] AppwriteError),

    #[error("Invalid content: {0}")]
    InvalidData(String),

    #[error("Fixture error: {0}")]
    Fixture(String),
}

/// Read-only access to flight option content
///
/// Implementations resolve references and file URIs before handing a record
/// back, so callers only ever see fully typed values.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Identifiers of all flight options matching the filter
    async fn find_flight_options(&self, filter: &FlightOptionFilter) -> Result<Vec<NodeId>, StoreError>;

    /// Load one flight option, `None` if the identifier no longer exists
    async fn load_flight_option(&self, id: NodeId) -> Result<Option<FlightOption>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;

    /// Short backend name reported by the health endpoint
    fn backend(&self) -> &'static str;
}

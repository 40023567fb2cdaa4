//! Flight Options - market and region content lookup service
//!
//! Answers which flight option content is configured for a market and
//! region, reading from a pluggable content store (PostgreSQL, Appwrite or
//! an in-memory snapshot) and shaping the record into the JSON document
//! clients consume.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{FlightOptionsService, LookupError};
pub use models::{FlightOption, FlightOptionsQuery, FlightOptionsResponse, StatusFilter};
pub use services::{ContentStore, InMemoryStore, StoreError};

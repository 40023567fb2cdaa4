// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Airport, Benefit, FlightOption, FlightOptionFilter, NodeId, StatusFilter, FLIGHT_OPTIONS_KIND};
pub use requests::FlightOptionsQuery;
pub use responses::{AirportResponse, BenefitResponse, ErrorResponse, FlightOptionsResponse, HealthResponse};

// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    driver_phone, LoadCriteria, LoadRequest, LoadRequestStatus, MatchResult, NewTrip,
    ReliabilityMetrics, ReliabilityRecord, ScoringRules, Trip, VehicleCandidate, MAX_RATING, MIN_RATING,
};
pub use requests::{CreateTripRequest, FindMatchesRequest, RecordReliabilityRequest};
pub use responses::{
    CreateTripResponse, ErrorResponse, FindMatchesResponse, HealthResponse, RecordReliabilityResponse,
};

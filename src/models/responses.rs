use serde::{Deserialize, Serialize};
use crate::models::domain::{LoadCriteria, MatchResult, ReliabilityRecord, Trip};

/// Response for the find matches endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchesResponse {
    pub matches: Vec<MatchResult>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    /// Criteria the ranking was computed for
    #[serde(default)]
    pub criteria: Option<LoadCriteria>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Trip creation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTripResponse {
    pub trip: Trip,
}

/// Reliability recording response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordReliabilityResponse {
    pub reliability: ReliabilityRecord,
}

use async_trait::async_trait;
use thiserror::Error;
use crate::models::{
    LoadRequest, LoadRequestStatus, NewTrip, ReliabilityMetrics, ReliabilityRecord, Trip, VehicleCandidate,
};

/// Errors that can occur when talking to the record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Record store the dispatch service reads vehicles and load requests from
///
/// Implementations own their connection handling. All methods take a fresh
/// snapshot; nothing is cached between calls.
#[async_trait]
pub trait DispatchStore: Send + Sync {
    /// Active vehicles of one type, joined with owner contact details and
    /// the most recent reliability record
    async fn fetch_candidates(&self, vehicle_type: &str) -> Result<Vec<VehicleCandidate>, StoreError>;

    async fn get_load_request(&self, id: &str) -> Result<LoadRequest, StoreError>;

    /// Owner id of a vehicle
    async fn get_vehicle_owner(&self, vehicle_id: &str) -> Result<String, StoreError>;

    async fn create_trip(&self, trip: &NewTrip) -> Result<Trip, StoreError>;

    async fn get_trip(&self, id: &str) -> Result<Trip, StoreError>;

    /// Write ratings onto the vehicle's latest reliability row, or insert
    /// one. Bumps `trips_completed` and stamps `last_trip_date` with today.
    async fn record_reliability(
        &self,
        vehicle_id: &str,
        metrics: &ReliabilityMetrics,
    ) -> Result<ReliabilityRecord, StoreError>;

    async fn update_load_request_status(
        &self,
        id: &str,
        status: LoadRequestStatus,
    ) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

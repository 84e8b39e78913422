use crate::core::{Matcher, MatchOutcome};
use crate::models::{
    CreateTripRequest, LoadCriteria, LoadRequestStatus, NewTrip, RecordReliabilityRequest, ReliabilityMetrics,
    ReliabilityRecord, Trip,
};
use crate::services::store::{DispatchStore, StoreError};
use std::sync::Arc;
use thiserror::Error;
use validator::Validate;

/// Errors surfaced by the dispatch service
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid input: {0}")]
    Validation(String),
}

/// Outcome of matching a stored load request
#[derive(Debug)]
pub struct LoadRequestMatches {
    pub criteria: LoadCriteria,
    pub outcome: MatchOutcome,
}

/// Glue between the record store and the matcher
///
/// Fetches a fresh candidate snapshot for every call and hands plain data
/// to [`Matcher`], which never sees the store.
#[derive(Clone)]
pub struct DispatchService {
    store: Arc<dyn DispatchStore>,
    matcher: Matcher,
}

impl DispatchService {
    pub fn new(store: Arc<dyn DispatchStore>, matcher: Matcher) -> Self {
        Self { store, matcher }
    }

    pub fn store(&self) -> &Arc<dyn DispatchStore> {
        &self.store
    }

    /// Rank vehicles for ad-hoc criteria
    ///
    /// A failed candidate fetch is logged and treated as an empty snapshot,
    /// so callers always get a (possibly empty) ranking.
    pub async fn match_criteria(&self, criteria: &LoadCriteria) -> MatchOutcome {
        let candidates = match self.store.fetch_candidates(&criteria.vehicle_type_needed).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch {} candidates, returning no matches: {}",
                    criteria.vehicle_type_needed,
                    e
                );
                vec![]
            }
        };

        tracing::debug!(
            "Scoring {} {} candidates (route: {:?}, weight: {:?})",
            candidates.len(),
            criteria.vehicle_type_needed,
            criteria.route,
            criteria.weight
        );

        self.matcher.find_matches(criteria, candidates)
    }

    /// Rank vehicles for a stored load request
    pub async fn match_load_request(&self, load_request_id: &str) -> Result<LoadRequestMatches, DispatchError> {
        let request = self.store.get_load_request(load_request_id).await?;
        let criteria = LoadCriteria::from_load_request(&request);
        let outcome = self.match_criteria(&criteria).await;

        tracing::info!(
            "Matched load request {}: {} of {} candidates returned",
            load_request_id,
            outcome.matches.len(),
            outcome.total_candidates
        );

        Ok(LoadRequestMatches { criteria, outcome })
    }

    /// Book the selected vehicle for a load request
    ///
    /// The owner rate defaults to the client rate. Once the trip is stored
    /// the load request is marked matched. A failure at that last step is
    /// only logged and the stored trip is still returned.
    pub async fn create_trip_from_match(
        &self,
        load_request_id: &str,
        req: &CreateTripRequest,
    ) -> Result<Trip, DispatchError> {
        if req.client_rate <= 0.0 {
            return Err(DispatchError::Validation("clientRate must be positive".to_string()));
        }
        if matches!(req.owner_rate, Some(rate) if rate <= 0.0) {
            return Err(DispatchError::Validation("ownerRate must be positive".to_string()));
        }

        // Make sure the request exists before touching trips
        let request = self.store.get_load_request(load_request_id).await?;
        let owner_id = self.store.get_vehicle_owner(&req.vehicle_id).await?;

        let new_trip = NewTrip {
            load_request_id: request.id.clone(),
            vehicle_id: req.vehicle_id.clone(),
            owner_id,
            client_rate: req.client_rate,
            owner_rate: req.owner_rate.unwrap_or(req.client_rate),
        };

        let trip = self.store.create_trip(&new_trip).await?;

        if let Err(e) = self
            .store
            .update_load_request_status(&request.id, LoadRequestStatus::Matched)
            .await
        {
            tracing::warn!(
                "Trip {} created but load request {} was not marked matched: {}",
                trip.id,
                request.id,
                e
            );
        }

        tracing::info!(
            "Created trip {} for load request {} with vehicle {}",
            trip.id,
            request.id,
            trip.vehicle_id
        );

        Ok(trip)
    }

    /// Record an operator's ratings for the vehicle that ran a trip
    pub async fn record_trip_reliability(
        &self,
        trip_id: &str,
        req: &RecordReliabilityRequest,
    ) -> Result<ReliabilityRecord, DispatchError> {
        req.validate()
            .map_err(|e| DispatchError::Validation(e.to_string()))?;

        let trip = self.store.get_trip(trip_id).await?;
        let record = self
            .store
            .record_reliability(&trip.vehicle_id, &ReliabilityMetrics::from(req))
            .await?;

        tracing::info!(
            "Recorded reliability {:.1} for vehicle {} from trip {} ({} trips completed)",
            record.metrics.average(),
            record.vehicle_id,
            trip.id,
            record.trips_completed
        );

        Ok(record)
    }
}

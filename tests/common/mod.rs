// Shared test fixtures: an in-memory record store

#![allow(dead_code)]

use async_trait::async_trait;
use dispatch_match::models::{
    LoadRequest, LoadRequestStatus, NewTrip, ReliabilityMetrics, ReliabilityRecord, Trip, VehicleCandidate,
};
use dispatch_match::services::{DispatchStore, StoreError};
use std::collections::HashMap;
use std::sync::Mutex;

pub struct StoredVehicle {
    pub candidate: VehicleCandidate,
    pub active: bool,
}

/// Record store backed by plain collections
#[derive(Default)]
pub struct InMemoryStore {
    pub vehicles: Vec<StoredVehicle>,
    pub load_requests: Mutex<HashMap<String, LoadRequest>>,
    pub trips: Mutex<Vec<Trip>>,
    pub reliability: Mutex<HashMap<String, ReliabilityRecord>>,
    pub fail_fetch: bool,
    pub fail_status_update: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vehicle(mut self, candidate: VehicleCandidate) -> Self {
        self.vehicles.push(StoredVehicle { candidate, active: true });
        self
    }

    pub fn with_inactive_vehicle(mut self, candidate: VehicleCandidate) -> Self {
        self.vehicles.push(StoredVehicle { candidate, active: false });
        self
    }

    pub fn with_load_request(self, request: LoadRequest) -> Self {
        self.load_requests
            .lock()
            .unwrap()
            .insert(request.id.clone(), request);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn failing_status_update(mut self) -> Self {
        self.fail_status_update = true;
        self
    }

    pub fn status_of(&self, id: &str) -> Option<LoadRequestStatus> {
        self.load_requests.lock().unwrap().get(id).map(|r| r.status)
    }
}

#[async_trait]
impl DispatchStore for InMemoryStore {
    async fn fetch_candidates(&self, vehicle_type: &str) -> Result<Vec<VehicleCandidate>, StoreError> {
        if self.fail_fetch {
            return Err(StoreError::ApiError("Failed to fetch vehicles: 503".to_string()));
        }

        Ok(self
            .vehicles
            .iter()
            .filter(|v| v.active && v.candidate.vehicle_type == vehicle_type)
            .map(|v| {
                let mut candidate = v.candidate.clone();
                if let Some(record) = self.reliability.lock().unwrap().get(&candidate.vehicle_id) {
                    candidate.reliability = Some(record.metrics);
                }
                candidate
            })
            .collect())
    }

    async fn get_load_request(&self, id: &str) -> Result<LoadRequest, StoreError> {
        self.load_requests
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Load request {}", id)))
    }

    async fn get_vehicle_owner(&self, vehicle_id: &str) -> Result<String, StoreError> {
        self.vehicles
            .iter()
            .find(|v| v.candidate.vehicle_id == vehicle_id)
            .map(|v| v.candidate.owner_id.clone())
            .ok_or_else(|| StoreError::NotFound(format!("Vehicle {}", vehicle_id)))
    }

    async fn create_trip(&self, trip: &NewTrip) -> Result<Trip, StoreError> {
        let mut trips = self.trips.lock().unwrap();
        let created = Trip {
            id: format!("trip-{}", trips.len() + 1),
            load_request_id: trip.load_request_id.clone(),
            vehicle_id: trip.vehicle_id.clone(),
            owner_id: trip.owner_id.clone(),
            client_rate: trip.client_rate,
            owner_rate: trip.owner_rate,
            margin_amount: Some(trip.client_rate - trip.owner_rate),
            created_at: None,
        };
        trips.push(created.clone());
        Ok(created)
    }

    async fn get_trip(&self, id: &str) -> Result<Trip, StoreError> {
        self.trips
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Trip {}", id)))
    }

    async fn record_reliability(
        &self,
        vehicle_id: &str,
        metrics: &ReliabilityMetrics,
    ) -> Result<ReliabilityRecord, StoreError> {
        let mut records = self.reliability.lock().unwrap();
        let trips_completed = records.get(vehicle_id).map(|r| r.trips_completed).unwrap_or(0) + 1;
        let record = ReliabilityRecord {
            vehicle_id: vehicle_id.to_string(),
            metrics: *metrics,
            trips_completed,
            last_trip_date: Some(chrono::Utc::now().date_naive()),
        };
        records.insert(vehicle_id.to_string(), record.clone());
        Ok(record)
    }

    async fn update_load_request_status(
        &self,
        id: &str,
        status: LoadRequestStatus,
    ) -> Result<(), StoreError> {
        if self.fail_status_update {
            return Err(StoreError::ApiError("Failed to update load request status: 503".to_string()));
        }

        let mut requests = self.load_requests.lock().unwrap();
        let request = requests
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("Load request {}", id)))?;
        request.status = status;
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(!self.fail_fetch)
    }
}

pub fn truck(id: &str, owner: &str) -> VehicleCandidate {
    VehicleCandidate::new(id, owner, "truck")
}

pub fn load_request(id: &str, pickup: &str, drop: &str, weight: Option<f64>) -> LoadRequest {
    LoadRequest {
        id: id.to_string(),
        provider_id: None,
        pickup_location: pickup.to_string(),
        drop_location: drop.to_string(),
        material_type: Some("steel coils".to_string()),
        weight_tons: weight,
        distance_km: None,
        vehicle_type_needed: "truck".to_string(),
        quoted_budget: Some(25000.0),
        status: LoadRequestStatus::Open,
        required_date: None,
        notes: None,
        created_at: None,
    }
}

use crate::models::{
    driver_phone, LoadRequest, LoadRequestStatus, NewTrip, ReliabilityMetrics, ReliabilityRecord, Trip,
    VehicleCandidate,
};
use crate::services::store::{DispatchStore, StoreError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Columns fetched for matching, with owner and latest reliability embedded
const CANDIDATE_SELECT: &str = "id,owner_id,vehicle_type,vehicle_model,registration_number,\
min_rate_per_km,payload_tons,max_distance_km,preferred_routes,avoid_routes,city_only,active,\
owners(owner_name,phone_primary,phone_alternate),\
reliability_scores(ontime_pickup_score,ontime_delivery_score,communication_score,behavior_score,vehicle_condition_score,last_trip_date)";

/// Supabase (PostgREST) client
///
/// Handles all communication with the hosted backend:
/// - Fetching vehicle candidates
/// - Reading load requests
/// - Creating trips and updating request status
/// - Recording vehicle reliability
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    client: Client,
    tables: SupabaseTables,
}

/// Table names in the hosted database
#[derive(Debug, Clone)]
pub struct SupabaseTables {
    pub vehicles: String,
    pub load_requests: String,
    pub trips: String,
    pub reliability_scores: String,
}

impl Default for SupabaseTables {
    fn default() -> Self {
        Self {
            vehicles: "vehicles".to_string(),
            load_requests: "load_requests".to_string(),
            trips: "trips".to_string(),
            reliability_scores: "reliability_scores".to_string(),
        }
    }
}

/// Owner columns embedded in a vehicle row
#[derive(Debug, Deserialize)]
struct OwnerRow {
    owner_name: Option<String>,
    phone_primary: Option<String>,
    phone_alternate: Option<String>,
}

/// PostgREST returns one-to-many embeds as arrays, but a one-to-one
/// relationship comes back as a single object. Ratings outside 1-5 are
/// dropped on the way in.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReliabilityEmbed {
    Many(Vec<ReliabilityMetrics>),
    One(ReliabilityMetrics),
}

impl ReliabilityEmbed {
    fn latest(self) -> Option<ReliabilityMetrics> {
        let latest = match self {
            ReliabilityEmbed::Many(rows) => rows.into_iter().next(),
            ReliabilityEmbed::One(row) => Some(row),
        };
        latest.map(ReliabilityMetrics::within_scale)
    }
}

#[derive(Debug, Deserialize)]
struct VehicleRow {
    id: String,
    owner_id: String,
    vehicle_type: String,
    vehicle_model: Option<String>,
    registration_number: Option<String>,
    min_rate_per_km: Option<f64>,
    payload_tons: Option<f64>,
    max_distance_km: Option<f64>,
    #[serde(default)]
    preferred_routes: Option<Vec<String>>,
    #[serde(default)]
    avoid_routes: Option<Vec<String>>,
    #[serde(default)]
    city_only: Option<bool>,
    #[serde(default)]
    owners: Option<OwnerRow>,
    #[serde(default)]
    reliability_scores: Option<ReliabilityEmbed>,
}

impl From<VehicleRow> for VehicleCandidate {
    fn from(row: VehicleRow) -> Self {
        let (owner_name, phone) = match row.owners {
            Some(owner) => (
                owner.owner_name,
                driver_phone(owner.phone_primary, owner.phone_alternate),
            ),
            None => (None, None),
        };

        VehicleCandidate {
            vehicle_id: row.id,
            owner_id: row.owner_id,
            vehicle_type: row.vehicle_type,
            vehicle_model: row.vehicle_model,
            registration_number: row.registration_number,
            min_rate_per_km: row.min_rate_per_km,
            payload_tons: row.payload_tons,
            max_distance_km: row.max_distance_km,
            preferred_routes: row.preferred_routes.unwrap_or_default(),
            avoid_routes: row.avoid_routes.unwrap_or_default(),
            city_only: row.city_only.unwrap_or(false),
            reliability: row.reliability_scores.and_then(ReliabilityEmbed::latest),
            owner_name,
            driver_phone: phone,
        }
    }
}

impl SupabaseClient {
    /// Create a new Supabase client
    ///
    /// `base_url` is the project URL, e.g. `https://xyz.supabase.co`.
    pub fn new(
        base_url: String,
        api_key: String,
        tables: SupabaseTables,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
            tables,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn first_row(response: Response, what: &str) -> Result<Value, StoreError> {
        Self::read_rows(response, what)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidResponse(format!("{}: no rows returned", what)))
    }

    async fn read_rows(response: Response, what: &str) -> Result<Vec<Value>, StoreError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to {}: {} - {}", what, status, body);
            return Err(StoreError::ApiError(format!("Failed to {}: {}", what, status)));
        }

        let json: Value = response.json().await?;

        match json {
            Value::Array(rows) => Ok(rows),
            _ => Err(StoreError::InvalidResponse("Expected an array of rows".into())),
        }
    }
}

#[async_trait]
impl DispatchStore for SupabaseClient {
    async fn fetch_candidates(&self, vehicle_type: &str) -> Result<Vec<VehicleCandidate>, StoreError> {
        let url = format!(
            "{}?select={}&vehicle_type=eq.{}&active=eq.true\
             &reliability_scores.order=last_trip_date.desc.nullslast&reliability_scores.limit=1",
            self.table_url(&self.tables.vehicles),
            urlencoding::encode(CANDIDATE_SELECT),
            urlencoding::encode(vehicle_type),
        );

        tracing::debug!("Fetching {} candidates from: {}", vehicle_type, url);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let rows = Self::read_rows(response, "fetch vehicles").await?;

        let total = rows.len();
        let candidates: Vec<VehicleCandidate> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<VehicleRow>(row) {
                Ok(row) => Some(row.into()),
                Err(e) => {
                    tracing::warn!("Skipping malformed vehicle row: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Fetched {} candidates ({} rows)", candidates.len(), total);

        Ok(candidates)
    }

    async fn get_load_request(&self, id: &str) -> Result<LoadRequest, StoreError> {
        let url = format!(
            "{}?select=*&id=eq.{}",
            self.table_url(&self.tables.load_requests),
            urlencoding::encode(id)
        );

        tracing::debug!("Fetching load request: {}", id);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let rows = Self::read_rows(response, "fetch load request").await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("Load request {}", id)))?;

        serde_json::from_value(row)
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse load request: {}", e)))
    }

    async fn get_vehicle_owner(&self, vehicle_id: &str) -> Result<String, StoreError> {
        let url = format!(
            "{}?select=owner_id&id=eq.{}",
            self.table_url(&self.tables.vehicles),
            urlencoding::encode(vehicle_id)
        );

        let response = self.authorized(self.client.get(&url)).send().await?;
        let rows = Self::read_rows(response, "fetch vehicle").await?;

        rows.first()
            .and_then(|row| row.get("owner_id"))
            .and_then(|owner| owner.as_str())
            .map(str::to_string)
            .ok_or_else(|| StoreError::NotFound(format!("Vehicle {}", vehicle_id)))
    }

    async fn create_trip(&self, trip: &NewTrip) -> Result<Trip, StoreError> {
        let url = self.table_url(&self.tables.trips);

        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", "return=representation")
            .json(&[trip])
            .send()
            .await?;

        let row = Self::first_row(response, "create trip").await?;

        let created: Trip = serde_json::from_value(row)
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse trip: {}", e)))?;

        tracing::debug!("Created trip {} for load request {}", created.id, trip.load_request_id);

        Ok(created)
    }

    async fn get_trip(&self, id: &str) -> Result<Trip, StoreError> {
        let url = format!(
            "{}?select=*&id=eq.{}",
            self.table_url(&self.tables.trips),
            urlencoding::encode(id)
        );

        let response = self.authorized(self.client.get(&url)).send().await?;
        let rows = Self::read_rows(response, "fetch trip").await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("Trip {}", id)))?;

        serde_json::from_value(row)
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse trip: {}", e)))
    }

    async fn record_reliability(
        &self,
        vehicle_id: &str,
        metrics: &ReliabilityMetrics,
    ) -> Result<ReliabilityRecord, StoreError> {
        let table = self.table_url(&self.tables.reliability_scores);

        let lookup = format!(
            "{}?select=id,trips_completed&vehicle_id=eq.{}&order=last_trip_date.desc.nullslast&limit=1",
            table,
            urlencoding::encode(vehicle_id)
        );
        let response = self.authorized(self.client.get(&lookup)).send().await?;
        let existing = Self::read_rows(response, "fetch reliability").await?.into_iter().next();

        let row_id = existing.as_ref().and_then(|row| match row.get("id") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        });
        let trips_completed = existing
            .as_ref()
            .and_then(|row| row.get("trips_completed"))
            .and_then(Value::as_i64)
            .unwrap_or(0);

        let mut body = serde_json::json!({
            "ontime_pickup_score": metrics.ontime_pickup_score,
            "ontime_delivery_score": metrics.ontime_delivery_score,
            "communication_score": metrics.communication_score,
            "behavior_score": metrics.behavior_score,
            "vehicle_condition_score": metrics.vehicle_condition_score,
            "trips_completed": trips_completed + 1,
            "last_trip_date": chrono::Utc::now().date_naive(),
        });

        let response = match &row_id {
            Some(row_id) => {
                let url = format!("{}?id=eq.{}", table, urlencoding::encode(row_id));
                self.authorized(self.client.patch(&url))
                    .header("Prefer", "return=representation")
                    .json(&body)
                    .send()
                    .await?
            }
            None => {
                body["vehicle_id"] = Value::String(vehicle_id.to_string());
                self.authorized(self.client.post(&table))
                    .header("Prefer", "return=representation")
                    .json(&[body])
                    .send()
                    .await?
            }
        };

        let row = Self::first_row(response, "save reliability").await?;
        let record: ReliabilityRecord = serde_json::from_value(row)
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse reliability: {}", e)))?;

        tracing::debug!(
            "Recorded reliability for vehicle {} ({} trips)",
            vehicle_id,
            record.trips_completed
        );

        Ok(record)
    }

    async fn update_load_request_status(
        &self,
        id: &str,
        status: LoadRequestStatus,
    ) -> Result<(), StoreError> {
        let url = format!(
            "{}?id=eq.{}",
            self.table_url(&self.tables.load_requests),
            urlencoding::encode(id)
        );

        let response = self
            .authorized(self.client.patch(&url))
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::ApiError(format!(
                "Failed to update load request status: {}",
                response.status()
            )));
        }

        tracing::debug!("Load request {} -> {}", id, status.as_str());

        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        let url = format!("{}?select=id&limit=1", self.table_url(&self.tables.vehicles));
        let response = self.authorized(self.client.get(&url)).send().await?;
        Ok(response.status().is_success())
    }
}

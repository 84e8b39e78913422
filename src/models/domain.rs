use serde::{Deserialize, Serialize};

/// Lowest and highest value of a reliability sub-score
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Operator-entered reliability ratings for a vehicle
///
/// Each sub-score is 1-5 when present. Any subset may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityMetrics {
    #[serde(alias = "ontime_pickup_score", rename = "ontimePickupScore", default)]
    pub ontime_pickup_score: Option<u8>,
    #[serde(alias = "ontime_delivery_score", rename = "ontimeDeliveryScore", default)]
    pub ontime_delivery_score: Option<u8>,
    #[serde(alias = "communication_score", rename = "communicationScore", default)]
    pub communication_score: Option<u8>,
    #[serde(alias = "behavior_score", rename = "behaviorScore", default)]
    pub behavior_score: Option<u8>,
    #[serde(alias = "vehicle_condition_score", rename = "vehicleConditionScore", default)]
    pub vehicle_condition_score: Option<u8>,
}

impl ReliabilityMetrics {
    /// Build metrics from all five sub-scores
    pub fn uniform(score: u8) -> Self {
        Self {
            ontime_pickup_score: Some(score),
            ontime_delivery_score: Some(score),
            communication_score: Some(score),
            behavior_score: Some(score),
            vehicle_condition_score: Some(score),
        }
    }

    /// Drop sub-scores outside the 1-5 scale
    pub fn within_scale(self) -> Self {
        let rated = |score: Option<u8>| score.filter(|s| (MIN_RATING..=MAX_RATING).contains(s));
        Self {
            ontime_pickup_score: rated(self.ontime_pickup_score),
            ontime_delivery_score: rated(self.ontime_delivery_score),
            communication_score: rated(self.communication_score),
            behavior_score: rated(self.behavior_score),
            vehicle_condition_score: rated(self.vehicle_condition_score),
        }
    }

    /// Mean of the sub-scores that are present, 0.0 when none are
    pub fn average(&self) -> f64 {
        let present: Vec<f64> = [
            self.ontime_pickup_score,
            self.ontime_delivery_score,
            self.communication_score,
            self.behavior_score,
            self.vehicle_condition_score,
        ]
        .into_iter()
        .flatten()
        .map(f64::from)
        .collect();

        if present.is_empty() {
            return 0.0;
        }

        present.iter().sum::<f64>() / present.len() as f64
    }
}

/// An active vehicle eligible for matching, joined with its owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleCandidate {
    #[serde(rename = "vehicleId")]
    pub vehicle_id: String,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    #[serde(rename = "vehicleType")]
    pub vehicle_type: String,
    #[serde(rename = "vehicleModel", default)]
    pub vehicle_model: Option<String>,
    #[serde(rename = "registrationNumber", default)]
    pub registration_number: Option<String>,
    #[serde(rename = "minRatePerKm", default)]
    pub min_rate_per_km: Option<f64>,
    #[serde(rename = "payloadTons", default)]
    pub payload_tons: Option<f64>,
    #[serde(rename = "maxDistanceKm", default)]
    pub max_distance_km: Option<f64>,
    #[serde(rename = "preferredRoutes", default)]
    pub preferred_routes: Vec<String>,
    #[serde(rename = "avoidRoutes", default)]
    pub avoid_routes: Vec<String>,
    #[serde(rename = "cityOnly", default)]
    pub city_only: bool,
    #[serde(rename = "reliabilityMetrics", default)]
    pub reliability: Option<ReliabilityMetrics>,
    #[serde(rename = "ownerName", default)]
    pub owner_name: Option<String>,
    #[serde(rename = "driverPhone", default)]
    pub driver_phone: Option<String>,
}

impl VehicleCandidate {
    /// Bare candidate with only the identifying fields set
    pub fn new(vehicle_id: impl Into<String>, owner_id: impl Into<String>, vehicle_type: impl Into<String>) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            owner_id: owner_id.into(),
            vehicle_type: vehicle_type.into(),
            vehicle_model: None,
            registration_number: None,
            min_rate_per_km: None,
            payload_tons: None,
            max_distance_km: None,
            preferred_routes: vec![],
            avoid_routes: vec![],
            city_only: false,
            reliability: None,
            owner_name: None,
            driver_phone: None,
        }
    }
}

/// Pick the phone an operator should call: primary first, then alternate
pub fn driver_phone(primary: Option<String>, alternate: Option<String>) -> Option<String> {
    primary
        .filter(|p| !p.is_empty())
        .or_else(|| alternate.filter(|a| !a.is_empty()))
}

/// Requirements of a load request, as seen by the matcher
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadCriteria {
    #[serde(rename = "vehicleTypeNeeded")]
    pub vehicle_type_needed: String,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(rename = "pickupLocation", default)]
    pub pickup_location: Option<String>,
    #[serde(rename = "dropLocation", default)]
    pub drop_location: Option<String>,
}

impl LoadCriteria {
    /// Criteria for a stored load request: route is "<pickup> - <drop>"
    pub fn from_load_request(request: &LoadRequest) -> Self {
        Self {
            vehicle_type_needed: request.vehicle_type_needed.clone(),
            route: Some(crate::core::route_match::build_route(
                &request.pickup_location,
                &request.drop_location,
            )),
            weight: request.weight_tons,
            pickup_location: Some(request.pickup_location.clone()),
            drop_location: Some(request.drop_location.clone()),
        }
    }

    /// The route string, if it is set and non-empty
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref().filter(|r| !r.is_empty())
    }
}

/// A scored candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(flatten)]
    pub candidate: VehicleCandidate,
    #[serde(rename = "reliabilityScore")]
    pub reliability_score: f64,
    #[serde(rename = "matchScore")]
    pub match_score: f64,
}

/// Point values used by the matcher
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringRules {
    /// Multiplier applied to the 0-5 reliability average
    pub reliability_multiplier: f64,
    pub preferred_route_bonus: f64,
    pub avoid_route_penalty: f64,
    pub capacity_fit_bonus: f64,
    pub capacity_shortfall_penalty: f64,
    pub rate_band_bonus: f64,
    /// Inclusive bounds of the "reasonable" rate per km
    pub rate_band_min: f64,
    pub rate_band_max: f64,
    pub city_only_bonus: f64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            reliability_multiplier: 20.0,
            preferred_route_bonus: 30.0,
            avoid_route_penalty: 50.0,
            capacity_fit_bonus: 20.0,
            capacity_shortfall_penalty: 30.0,
            rate_band_bonus: 10.0,
            rate_band_min: 10.0,
            rate_band_max: 50.0,
            city_only_bonus: 5.0,
        }
    }
}

/// Lifecycle of a load request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadRequestStatus {
    Open,
    Matching,
    Matched,
    Closed,
    Failed,
}

impl LoadRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadRequestStatus::Open => "open",
            LoadRequestStatus::Matching => "matching",
            LoadRequestStatus::Matched => "matched",
            LoadRequestStatus::Closed => "closed",
            LoadRequestStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for LoadRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(LoadRequestStatus::Open),
            "matching" => Ok(LoadRequestStatus::Matching),
            "matched" => Ok(LoadRequestStatus::Matched),
            "closed" => Ok(LoadRequestStatus::Closed),
            "failed" => Ok(LoadRequestStatus::Failed),
            other => Err(format!("unknown load request status: {}", other)),
        }
    }
}

/// A shipment a load provider wants transported
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadRequest {
    pub id: String,
    #[serde(default)]
    pub provider_id: Option<String>,
    pub pickup_location: String,
    pub drop_location: String,
    #[serde(default)]
    pub material_type: Option<String>,
    #[serde(default)]
    pub weight_tons: Option<f64>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    pub vehicle_type_needed: String,
    #[serde(default)]
    pub quoted_budget: Option<f64>,
    pub status: LoadRequestStatus,
    #[serde(default)]
    pub required_date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Trip to insert once an operator picks a vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTrip {
    pub load_request_id: String,
    pub vehicle_id: String,
    pub owner_id: String,
    pub client_rate: f64,
    pub owner_rate: f64,
}

/// Stored trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    #[serde(alias = "load_request_id", rename = "loadRequestId")]
    pub load_request_id: String,
    #[serde(alias = "vehicle_id", rename = "vehicleId")]
    pub vehicle_id: String,
    #[serde(alias = "owner_id", rename = "ownerId")]
    pub owner_id: String,
    #[serde(alias = "client_rate", rename = "clientRate")]
    pub client_rate: f64,
    #[serde(alias = "owner_rate", rename = "ownerRate")]
    pub owner_rate: f64,
    #[serde(alias = "margin_amount", rename = "marginAmount", default)]
    pub margin_amount: Option<f64>,
    #[serde(alias = "created_at", rename = "createdAt", default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Stored reliability row for a vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilityRecord {
    #[serde(alias = "vehicle_id", rename = "vehicleId")]
    pub vehicle_id: String,
    #[serde(flatten)]
    pub metrics: ReliabilityMetrics,
    #[serde(alias = "trips_completed", rename = "tripsCompleted", default)]
    pub trips_completed: i32,
    #[serde(alias = "last_trip_date", rename = "lastTripDate", default)]
    pub last_trip_date: Option<chrono::NaiveDate>,
}

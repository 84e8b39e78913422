use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{LoadCriteria, ReliabilityMetrics};

/// Request to find matching vehicles for ad-hoc criteria
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "vehicle_type_needed", rename = "vehicleTypeNeeded")]
    pub vehicle_type_needed: String,
    #[serde(default)]
    pub route: Option<String>,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(alias = "pickup_location", rename = "pickupLocation", default)]
    pub pickup_location: Option<String>,
    #[serde(alias = "drop_location", rename = "dropLocation", default)]
    pub drop_location: Option<String>,
}

impl From<FindMatchesRequest> for LoadCriteria {
    fn from(req: FindMatchesRequest) -> Self {
        LoadCriteria {
            vehicle_type_needed: req.vehicle_type_needed,
            route: req.route,
            weight: req.weight,
            pickup_location: req.pickup_location,
            drop_location: req.drop_location,
        }
    }
}

/// Request to turn a selected match into a trip
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTripRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "vehicle_id", rename = "vehicleId")]
    pub vehicle_id: String,
    #[validate(range(exclusive_min = 0.0))]
    #[serde(alias = "client_rate", rename = "clientRate")]
    pub client_rate: f64,
    /// Falls back to the client rate when omitted
    #[validate(range(exclusive_min = 0.0))]
    #[serde(alias = "owner_rate", rename = "ownerRate", default)]
    pub owner_rate: Option<f64>,
}

/// Ratings an operator gives a vehicle after a completed trip, each 1-5
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordReliabilityRequest {
    #[validate(range(min = 1, max = 5))]
    #[serde(alias = "ontime_pickup_score", rename = "ontimePickupScore")]
    pub ontime_pickup_score: u8,
    #[validate(range(min = 1, max = 5))]
    #[serde(alias = "ontime_delivery_score", rename = "ontimeDeliveryScore")]
    pub ontime_delivery_score: u8,
    #[validate(range(min = 1, max = 5))]
    #[serde(alias = "communication_score", rename = "communicationScore")]
    pub communication_score: u8,
    #[validate(range(min = 1, max = 5))]
    #[serde(alias = "behavior_score", rename = "behaviorScore")]
    pub behavior_score: u8,
    #[validate(range(min = 1, max = 5))]
    #[serde(alias = "vehicle_condition_score", rename = "vehicleConditionScore")]
    pub vehicle_condition_score: u8,
}

impl From<&RecordReliabilityRequest> for ReliabilityMetrics {
    fn from(req: &RecordReliabilityRequest) -> Self {
        ReliabilityMetrics {
            ontime_pickup_score: Some(req.ontime_pickup_score),
            ontime_delivery_score: Some(req.ontime_delivery_score),
            communication_score: Some(req.communication_score),
            behavior_score: Some(req.behavior_score),
            vehicle_condition_score: Some(req.vehicle_condition_score),
        }
    }
}

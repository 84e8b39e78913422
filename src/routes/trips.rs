use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{
    CreateTripRequest, CreateTripResponse, ErrorResponse, RecordReliabilityRequest, RecordReliabilityResponse,
};
use crate::routes::errors::dispatch_error_response;
use crate::routes::matches::AppState;

/// Configure trip routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/load-requests/{id}/trips", web::post().to(create_trip))
        .route("/trips/{id}/reliability", web::post().to(record_reliability));
}

/// Create a trip from a selected match
///
/// POST /api/v1/load-requests/{id}/trips
///
/// Request body:
/// ```json
/// {
///   "vehicleId": "string",
///   "clientRate": 15000.0,
///   "ownerRate": 14000.0
/// }
/// ```
async fn create_trip(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<CreateTripRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let load_request_id = path.into_inner();

    match state.service.create_trip_from_match(&load_request_id, &req).await {
        Ok(trip) => HttpResponse::Created().json(CreateTripResponse { trip }),
        Err(e) => {
            tracing::error!("Failed to create trip for load request {}: {}", load_request_id, e);
            dispatch_error_response(&e)
        }
    }
}

/// Rate the vehicle that ran a trip
///
/// POST /api/v1/trips/{id}/reliability
///
/// Every score is required and must be 1-5:
/// ```json
/// {
///   "ontimePickupScore": 5,
///   "ontimeDeliveryScore": 4,
///   "communicationScore": 4,
///   "behaviorScore": 5,
///   "vehicleConditionScore": 3
/// }
/// ```
async fn record_reliability(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<RecordReliabilityRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let trip_id = path.into_inner();

    match state.service.record_trip_reliability(&trip_id, &req).await {
        Ok(reliability) => HttpResponse::Ok().json(RecordReliabilityResponse { reliability }),
        Err(e) => {
            tracing::error!("Failed to record reliability for trip {}: {}", trip_id, e);
            dispatch_error_response(&e)
        }
    }
}

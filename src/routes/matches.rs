use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{ErrorResponse, FindMatchesRequest, FindMatchesResponse, HealthResponse, LoadCriteria};
use crate::routes::errors::dispatch_error_response;
use crate::services::DispatchService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: DispatchService,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches))
        .route("/load-requests/{id}/matches", web::get().to(match_load_request));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = match state.service.store().health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Record store health check failed: {}", e);
            false
        }
    };

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "vehicleTypeNeeded": "truck",
///   "route": "Mumbai - Pune",
///   "weight": 9.5,
///   "pickupLocation": "Mumbai",
///   "dropLocation": "Pune"
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let criteria = LoadCriteria::from(req.into_inner());

    tracing::info!(
        "Finding {} vehicles for route {:?}",
        criteria.vehicle_type_needed,
        criteria.route
    );

    let outcome = state.service.match_criteria(&criteria).await;

    tracing::info!(
        "Returning {} matches (from {} candidates)",
        outcome.matches.len(),
        outcome.total_candidates
    );

    HttpResponse::Ok().json(FindMatchesResponse {
        matches: outcome.matches,
        total_candidates: outcome.total_candidates,
        criteria: Some(criteria),
    })
}

/// Rank vehicles for a stored load request
///
/// GET /api/v1/load-requests/{id}/matches
async fn match_load_request(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let load_request_id = path.into_inner();

    match state.service.match_load_request(&load_request_id).await {
        Ok(result) => HttpResponse::Ok().json(FindMatchesResponse {
            matches: result.outcome.matches,
            total_candidates: result.outcome.total_candidates,
            criteria: Some(result.criteria),
        }),
        Err(e) => {
            tracing::error!("Failed to match load request {}: {}", load_request_id, e);
            dispatch_error_response(&e)
        }
    }
}

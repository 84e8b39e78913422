// Route exports
pub mod errors;
pub mod matches;
pub mod trips;

use actix_web::web;

pub use errors::handle_json_payload_error;
pub use matches::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(trips::configure),
    );
}

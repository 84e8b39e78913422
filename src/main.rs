use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use dispatch_match::config::{LoggingSettings, Settings, StoreBackend};
use dispatch_match::core::Matcher;
use dispatch_match::routes::{self, AppState};
use dispatch_match::services::{DispatchService, DispatchStore, PostgresStore, SupabaseClient, SupabaseTables};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn startup_error(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

/// Initialize logging; RUST_LOG wins over the configured level
fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

async fn build_store(settings: &Settings) -> std::io::Result<Arc<dyn DispatchStore>> {
    match settings.store.backend {
        StoreBackend::Supabase => {
            let supabase = settings
                .supabase
                .as_ref()
                .ok_or_else(|| startup_error("store.backend = supabase but [supabase] is missing".to_string()))?;

            let tables = SupabaseTables {
                vehicles: supabase.vehicles_table.clone(),
                load_requests: supabase.load_requests_table.clone(),
                trips: supabase.trips_table.clone(),
                reliability_scores: supabase.reliability_table.clone(),
            };

            let client = SupabaseClient::new(supabase.url.clone(), supabase.api_key.clone(), tables)
                .map_err(|e| startup_error(format!("Failed to create Supabase client: {}", e)))?;

            info!("Supabase client initialized ({})", supabase.url);
            Ok(Arc::new(client))
        }
        StoreBackend::Postgres => {
            let database = settings
                .database
                .as_ref()
                .ok_or_else(|| startup_error("store.backend = postgres but [database] is missing".to_string()))?;

            let store = PostgresStore::from_settings(
                &database.url,
                database.max_connections,
                database.min_connections,
                database.acquire_timeout_secs,
                database.idle_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                startup_error(format!("PostgreSQL connection error: {}", e))
            })?;

            info!(
                "PostgreSQL store initialized (max: {} connections)",
                database.max_connections.unwrap_or(10)
            );
            Ok(Arc::new(store))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load()
        .map_err(|e| startup_error(format!("Configuration error: {}", e)))?;

    init_tracing(&settings.logging);

    info!("Starting dispatch match service...");

    let store = build_store(&settings).await?;

    let rules = settings.scoring_rules();
    let matcher = Matcher::new(rules);

    info!("Matcher initialized with rules: {:?}", rules);

    let app_state = AppState {
        service: DispatchService::new(store, matcher),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}

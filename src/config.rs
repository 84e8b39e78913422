use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use crate::models::ScoringRules;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub supabase: Option<SupabaseSettings>,
    #[serde(default)]
    pub database: Option<DatabaseSettings>,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Which record store backs the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Supabase,
    Postgres,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_vehicles_table")]
    pub vehicles_table: String,
    #[serde(default = "default_load_requests_table")]
    pub load_requests_table: String,
    #[serde(default = "default_trips_table")]
    pub trips_table: String,
    #[serde(default = "default_reliability_table")]
    pub reliability_table: String,
}

fn default_vehicles_table() -> String { "vehicles".to_string() }
fn default_load_requests_table() -> String { "load_requests".to_string() }
fn default_trips_table() -> String { "trips".to_string() }
fn default_reliability_table() -> String { "reliability_scores".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

/// Point values for the matcher, see [`ScoringRules`]
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default = "default_reliability_multiplier")]
    pub reliability_multiplier: f64,
    #[serde(default = "default_preferred_route_bonus")]
    pub preferred_route_bonus: f64,
    #[serde(default = "default_avoid_route_penalty")]
    pub avoid_route_penalty: f64,
    #[serde(default = "default_capacity_fit_bonus")]
    pub capacity_fit_bonus: f64,
    #[serde(default = "default_capacity_shortfall_penalty")]
    pub capacity_shortfall_penalty: f64,
    #[serde(default = "default_rate_band_bonus")]
    pub rate_band_bonus: f64,
    #[serde(default = "default_rate_band_min")]
    pub rate_band_min: f64,
    #[serde(default = "default_rate_band_max")]
    pub rate_band_max: f64,
    #[serde(default = "default_city_only_bonus")]
    pub city_only_bonus: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            reliability_multiplier: default_reliability_multiplier(),
            preferred_route_bonus: default_preferred_route_bonus(),
            avoid_route_penalty: default_avoid_route_penalty(),
            capacity_fit_bonus: default_capacity_fit_bonus(),
            capacity_shortfall_penalty: default_capacity_shortfall_penalty(),
            rate_band_bonus: default_rate_band_bonus(),
            rate_band_min: default_rate_band_min(),
            rate_band_max: default_rate_band_max(),
            city_only_bonus: default_city_only_bonus(),
        }
    }
}

fn default_reliability_multiplier() -> f64 { 20.0 }
fn default_preferred_route_bonus() -> f64 { 30.0 }
fn default_avoid_route_penalty() -> f64 { 50.0 }
fn default_capacity_fit_bonus() -> f64 { 20.0 }
fn default_capacity_shortfall_penalty() -> f64 { 30.0 }
fn default_rate_band_bonus() -> f64 { 10.0 }
fn default_rate_band_min() -> f64 { 10.0 }
fn default_rate_band_max() -> f64 { 50.0 }
fn default_city_only_bonus() -> f64 { 5.0 }

impl From<&ScoringSettings> for ScoringRules {
    fn from(s: &ScoringSettings) -> Self {
        ScoringRules {
            reliability_multiplier: s.reliability_multiplier,
            preferred_route_bonus: s.preferred_route_bonus,
            avoid_route_penalty: s.avoid_route_penalty,
            capacity_fit_bonus: s.capacity_fit_bonus,
            capacity_shortfall_penalty: s.capacity_shortfall_penalty,
            rate_band_bonus: s.rate_band_bonus,
            rate_band_min: s.rate_band_min,
            rate_band_max: s.rate_band_max,
            city_only_bonus: s.city_only_bonus,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with DISPATCH__)
    /// 5. SUPABASE_URL, SUPABASE_SERVICE_KEY and DATABASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., DISPATCH__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("DISPATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_env_overrides(settings, env_var)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    ///
    /// `DISPATCH__` variables and the Supabase/Postgres overrides apply
    /// exactly as in [`Settings::load`].
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_from_with(path, env_var)
    }

    fn load_from_with<P, F>(path: P, lookup: F) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("DISPATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_env_overrides(settings, lookup)?;

        settings.try_deserialize()
    }

    /// Scoring rules for the matcher
    pub fn scoring_rules(&self) -> ScoringRules {
        ScoringRules::from(&self.scoring)
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Apply the conventional Supabase/Postgres environment variables on top of
/// the layered config
fn apply_env_overrides<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let supabase_url = lookup("SUPABASE_URL");
    let supabase_key = lookup("SUPABASE_SERVICE_KEY").or_else(|| lookup("SUPABASE_SERVICE_ROLE_KEY"));
    let database_url = lookup("DATABASE_URL");

    let mut builder = Config::builder().add_source(settings);

    if let Some(url) = supabase_url {
        builder = builder.set_override("supabase.url", url)?;
    }
    if let Some(key) = supabase_key {
        builder = builder.set_override("supabase.api_key", key)?;
    }
    if let Some(url) = database_url {
        builder = builder.set_override("database.url", url)?;
    }

    builder.build()
}

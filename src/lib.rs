//! Dispatch Match - vehicle matching service for logistics dispatch
//!
//! This library ranks vehicles for a load request. The scoring engine in
//! [`core`] is a pure function over a snapshot of vehicle records; the
//! [`services`] layer fetches that snapshot from the record store and the
//! [`routes`] layer exposes it over HTTP.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{Matcher, MatchOutcome, MAX_MATCHES};
pub use models::{LoadCriteria, MatchResult, ReliabilityMetrics, ScoringRules, VehicleCandidate};
pub use services::{DispatchService, DispatchStore, StoreError};

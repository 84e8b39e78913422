// Core algorithm exports
pub mod matcher;
pub mod route_match;
pub mod scoring;

pub use matcher::{Matcher, MatchOutcome, MAX_MATCHES};
pub use route_match::{build_route, matches_avoid_route, matches_preferred_route};
pub use scoring::{calculate_match_score, CandidateScore};

use crate::models::{LoadCriteria, MatchResult, ScoringRules, VehicleCandidate};
use crate::core::scoring::calculate_match_score;

/// Maximum number of ranked vehicles returned for one load
pub const MAX_MATCHES: usize = 10;

/// Result of the matching process
#[derive(Debug)]
pub struct MatchOutcome {
    pub matches: Vec<MatchResult>,
    pub total_candidates: usize,
}

/// Vehicle matching engine
///
/// A pure function of the criteria and the candidate snapshot it is handed.
/// Candidates are expected to be pre-filtered by vehicle type and active
/// status; the matcher only scores and ranks them.
///
/// # Pipeline Stages
/// 1. Score every candidate
/// 2. Stable sort by score, descending
/// 3. Keep the top [`MAX_MATCHES`]
#[derive(Debug, Clone)]
pub struct Matcher {
    rules: ScoringRules,
}

impl Matcher {
    pub fn new(rules: ScoringRules) -> Self {
        Self { rules }
    }

    pub fn with_default_rules() -> Self {
        Self {
            rules: ScoringRules::default(),
        }
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    /// Rank vehicles for a load
    ///
    /// # Arguments
    /// * `criteria` - Requirements of the load
    /// * `candidates` - Snapshot of active vehicles of the requested type
    ///
    /// # Returns
    /// MatchOutcome with at most [`MAX_MATCHES`] results, best first. Equal
    /// scores keep their snapshot order.
    pub fn find_matches(
        &self,
        criteria: &LoadCriteria,
        candidates: Vec<VehicleCandidate>,
    ) -> MatchOutcome {
        let total_candidates = candidates.len();

        let mut scored: Vec<MatchResult> = candidates
            .into_iter()
            .map(|candidate| {
                let score = calculate_match_score(&candidate, criteria, &self.rules);
                MatchResult {
                    candidate,
                    reliability_score: score.reliability_score,
                    match_score: score.match_score,
                }
            })
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        scored.truncate(MAX_MATCHES);

        MatchOutcome {
            matches: scored,
            total_candidates,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

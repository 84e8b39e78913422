use crate::models::{LoadCriteria, ScoringRules, VehicleCandidate};
use crate::core::route_match::{matches_avoid_route, matches_preferred_route};

/// Scores computed for one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    /// Average of the present reliability sub-scores (0-5)
    pub reliability_score: f64,
    /// Additive match score, floored at 0
    pub match_score: f64,
}

/// Calculate the match score for a vehicle against load criteria
///
/// Scoring is additive; every rule is evaluated independently and a rule
/// whose inputs are absent contributes nothing:
///
/// score = (
///     reliability * 20              # 0-100 from the 1-5 average
///   + 30 if preferred route match
///   - 50 if avoid route match
///   + 20 if payload >= weight, else - 30
///   + 10 if rate per km in [10, 50]
///   + 5  if city only (route and max distance set)
/// ).max(0)
pub fn calculate_match_score(
    candidate: &VehicleCandidate,
    criteria: &LoadCriteria,
    rules: &ScoringRules,
) -> CandidateScore {
    let reliability_score = candidate
        .reliability
        .map(|metrics| metrics.average())
        .unwrap_or(0.0);

    let mut score = reliability_score * rules.reliability_multiplier;

    let route = criteria.route();

    if let Some(route) = route {
        if !candidate.preferred_routes.is_empty()
            && matches_preferred_route(route, &candidate.preferred_routes)
        {
            score += rules.preferred_route_bonus;
        }

        if !candidate.avoid_routes.is_empty() && matches_avoid_route(route, &candidate.avoid_routes) {
            score -= rules.avoid_route_penalty;
        }
    }

    score += capacity_score(criteria.weight, candidate.payload_tons, rules);
    score += rate_score(candidate.min_rate_per_km, rules);

    // Gated on a max distance even though its value is not compared
    if route.is_some() && candidate.max_distance_km.is_some() && candidate.city_only {
        score += rules.city_only_bonus;
    }

    CandidateScore {
        reliability_score,
        match_score: score.max(0.0),
    }
}

/// Capacity fit: bonus when the payload covers the weight, penalty otherwise
#[inline]
fn capacity_score(weight: Option<f64>, payload_tons: Option<f64>, rules: &ScoringRules) -> f64 {
    match (weight, payload_tons) {
        (Some(weight), Some(payload)) if payload >= weight => rules.capacity_fit_bonus,
        (Some(_), Some(_)) => -rules.capacity_shortfall_penalty,
        _ => 0.0,
    }
}

/// Flat bonus for a rate inside the inclusive band
#[inline]
fn rate_score(min_rate_per_km: Option<f64>, rules: &ScoringRules) -> f64 {
    match min_rate_per_km {
        Some(rate) if rate >= rules.rate_band_min && rate <= rules.rate_band_max => rules.rate_band_bonus,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReliabilityMetrics;

    fn truck(id: &str) -> VehicleCandidate {
        VehicleCandidate::new(id, "owner-1", "truck")
    }

    fn criteria() -> LoadCriteria {
        LoadCriteria {
            vehicle_type_needed: "truck".to_string(),
            ..Default::default()
        }
    }

    fn with_route(route: &str) -> LoadCriteria {
        LoadCriteria {
            route: Some(route.to_string()),
            ..criteria()
        }
    }

    #[test]
    fn test_reliability_only() {
        let mut vehicle = truck("v1");
        vehicle.reliability = Some(ReliabilityMetrics::uniform(5));

        let score = calculate_match_score(&vehicle, &criteria(), &ScoringRules::default());

        assert_eq!(score.reliability_score, 5.0);
        assert_eq!(score.match_score, 100.0);
    }

    #[test]
    fn test_no_fields_scores_zero() {
        let score = calculate_match_score(&truck("v1"), &with_route("Mumbai - Pune"), &ScoringRules::default());
        assert_eq!(score.reliability_score, 0.0);
        assert_eq!(score.match_score, 0.0);
    }

    #[test]
    fn test_preferred_route_bonus() {
        let mut vehicle = truck("v1");
        vehicle.preferred_routes = vec!["Mumbai - Pune".to_string()];

        let score = calculate_match_score(&vehicle, &with_route("mumbai - pune"), &ScoringRules::default());
        assert_eq!(score.match_score, 30.0);
    }

    #[test]
    fn test_avoid_route_penalty_is_floored() {
        let mut vehicle = truck("v1");
        vehicle.reliability = Some(ReliabilityMetrics::uniform(2));
        vehicle.avoid_routes = vec!["Mumbai-Pune Express".to_string()];

        // 40 reliability - 50 avoid = -10, clamped
        let score = calculate_match_score(&vehicle, &with_route("Mumbai-Pune"), &ScoringRules::default());
        assert_eq!(score.match_score, 0.0);

        vehicle.reliability = Some(ReliabilityMetrics::uniform(4));
        let score = calculate_match_score(&vehicle, &with_route("Mumbai-Pune"), &ScoringRules::default());
        assert_eq!(score.match_score, 30.0);
    }

    #[test]
    fn test_avoid_route_direction() {
        let mut vehicle = truck("v1");
        vehicle.reliability = Some(ReliabilityMetrics::uniform(5));
        vehicle.avoid_routes = vec!["Mumbai-Pune".to_string()];

        // The requested route is not contained in the avoid entry
        let score = calculate_match_score(&vehicle, &with_route("Mumbai-Pune Express"), &ScoringRules::default());
        assert_eq!(score.match_score, 100.0);
    }

    #[test]
    fn test_preferred_and_avoid_both_fire() {
        let mut vehicle = truck("v1");
        vehicle.reliability = Some(ReliabilityMetrics::uniform(5));
        vehicle.preferred_routes = vec!["Mumbai - Pune".to_string()];
        vehicle.avoid_routes = vec!["Mumbai - Pune via ghat".to_string()];

        let score = calculate_match_score(&vehicle, &with_route("Mumbai - Pune"), &ScoringRules::default());
        assert_eq!(score.match_score, 80.0);
    }

    #[test]
    fn test_capacity_fit_and_shortfall() {
        let mut vehicle = truck("v1");
        vehicle.payload_tons = Some(10.0);
        let load = LoadCriteria {
            weight: Some(10.0),
            ..criteria()
        };
        assert_eq!(calculate_match_score(&vehicle, &load, &ScoringRules::default()).match_score, 20.0);

        vehicle.payload_tons = Some(5.0);
        // -30 clamped to zero
        assert_eq!(calculate_match_score(&vehicle, &load, &ScoringRules::default()).match_score, 0.0);
    }

    #[test]
    fn test_zero_payload_is_present() {
        let mut vehicle = truck("v1");
        vehicle.reliability = Some(ReliabilityMetrics::uniform(5));
        vehicle.payload_tons = Some(0.0);
        let load = LoadCriteria {
            weight: Some(2.0),
            ..criteria()
        };
        assert_eq!(calculate_match_score(&vehicle, &load, &ScoringRules::default()).match_score, 70.0);
    }

    #[test]
    fn test_capacity_skipped_without_weight() {
        let mut vehicle = truck("v1");
        vehicle.payload_tons = Some(1.0);
        assert_eq!(calculate_match_score(&vehicle, &criteria(), &ScoringRules::default()).match_score, 0.0);
    }

    #[test]
    fn test_rate_band_inclusive() {
        let rules = ScoringRules::default();
        assert_eq!(rate_score(Some(10.0), &rules), 10.0);
        assert_eq!(rate_score(Some(50.0), &rules), 10.0);
        assert_eq!(rate_score(Some(9.99), &rules), 0.0);
        assert_eq!(rate_score(Some(50.01), &rules), 0.0);
        assert_eq!(rate_score(None, &rules), 0.0);
    }

    #[test]
    fn test_city_only_gating() {
        let mut vehicle = truck("v1");
        vehicle.city_only = true;

        // No max distance: no bonus
        assert_eq!(
            calculate_match_score(&vehicle, &with_route("Andheri - Thane"), &ScoringRules::default()).match_score,
            0.0
        );

        vehicle.max_distance_km = Some(80.0);
        assert_eq!(
            calculate_match_score(&vehicle, &with_route("Andheri - Thane"), &ScoringRules::default()).match_score,
            5.0
        );

        // No route: no bonus
        assert_eq!(
            calculate_match_score(&vehicle, &criteria(), &ScoringRules::default()).match_score,
            0.0
        );
    }

    #[test]
    fn test_custom_rules() {
        let rules = ScoringRules {
            reliability_multiplier: 10.0,
            ..ScoringRules::default()
        };
        let mut vehicle = truck("v1");
        vehicle.reliability = Some(ReliabilityMetrics::uniform(3));
        assert_eq!(calculate_match_score(&vehicle, &criteria(), &rules).match_score, 30.0);
    }
}

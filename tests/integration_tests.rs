// Integration tests for the matching engine

use dispatch_match::core::{calculate_match_score, Matcher, MAX_MATCHES};
use dispatch_match::models::{LoadCriteria, ReliabilityMetrics, ScoringRules, VehicleCandidate};

fn create_vehicle(id: usize) -> VehicleCandidate {
    let mut vehicle = VehicleCandidate::new(format!("v-{}", id), format!("o-{}", id % 7), "truck");

    // Spread vehicles across every rule so scores vary
    vehicle.reliability = match id % 4 {
        0 => None,
        1 => Some(ReliabilityMetrics::uniform((id % 5 + 1) as u8)),
        2 => Some(ReliabilityMetrics {
            ontime_pickup_score: Some(3),
            behavior_score: Some(4),
            ..Default::default()
        }),
        _ => Some(ReliabilityMetrics::default()),
    };
    if id % 3 == 0 {
        vehicle.preferred_routes = vec!["Mumbai - Pune".to_string()];
    }
    if id % 5 == 0 {
        vehicle.avoid_routes = vec!["mumbai - pune expressway".to_string()];
    }
    vehicle.payload_tons = match id % 6 {
        0 => None,
        n => Some(n as f64 * 3.0),
    };
    vehicle.min_rate_per_km = Some((id % 70) as f64);
    vehicle.max_distance_km = if id % 2 == 0 { Some(100.0) } else { None };
    vehicle.city_only = id % 4 == 1;
    vehicle
}

fn criteria() -> LoadCriteria {
    LoadCriteria {
        vehicle_type_needed: "truck".to_string(),
        route: Some("Mumbai - Pune".to_string()),
        weight: Some(9.0),
        pickup_location: Some("Mumbai".to_string()),
        drop_location: Some("Pune".to_string()),
    }
}

#[test]
fn test_integration_ranking_invariants() {
    let matcher = Matcher::with_default_rules();

    for size in [0usize, 1, 3, 9, 10, 11, 40] {
        let candidates: Vec<VehicleCandidate> = (0..size).map(create_vehicle).collect();
        let result = matcher.find_matches(&criteria(), candidates);

        assert_eq!(result.total_candidates, size);
        assert_eq!(result.matches.len(), size.min(MAX_MATCHES));

        for m in &result.matches {
            assert!(m.match_score >= 0.0, "Score {} is negative", m.match_score);
            assert!(m.reliability_score >= 0.0 && m.reliability_score <= 5.0);
        }

        for pair in result.matches.windows(2) {
            assert!(
                pair[0].match_score >= pair[1].match_score,
                "Matches not sorted by score"
            );
        }
    }
}

#[test]
fn test_top_ten_are_the_best_ten() {
    let matcher = Matcher::with_default_rules();
    let candidates: Vec<VehicleCandidate> = (0..40).map(create_vehicle).collect();

    let mut every_score: Vec<f64> = candidates
        .iter()
        .map(|c| calculate_match_score(c, &criteria(), matcher.rules()).match_score)
        .collect();
    every_score.sort_by(|a, b| b.partial_cmp(a).unwrap());

    let result = matcher.find_matches(&criteria(), candidates);
    let returned: Vec<f64> = result.matches.iter().map(|m| m.match_score).collect();

    assert_eq!(returned, every_score[..MAX_MATCHES].to_vec());
}

#[test]
fn test_deterministic_for_equal_scores() {
    let matcher = Matcher::with_default_rules();
    let candidates: Vec<VehicleCandidate> = (0..12)
        .map(|i| VehicleCandidate::new(format!("v-{}", i), "o-1", "truck"))
        .collect();

    let first = matcher.find_matches(&criteria(), candidates.clone());
    let second = matcher.find_matches(&criteria(), candidates);

    let ids = |r: &dispatch_match::MatchOutcome| {
        r.matches
            .iter()
            .map(|m| m.candidate.vehicle_id.clone())
            .collect::<Vec<_>>()
    };

    assert_eq!(first.matches.len(), MAX_MATCHES);
    assert_eq!(ids(&first), ids(&second));
}

#[test]
fn test_full_profile_scores_every_rule() {
    let matcher = Matcher::with_default_rules();

    let mut vehicle = VehicleCandidate::new("v-best", "o-1", "truck");
    vehicle.reliability = Some(ReliabilityMetrics::uniform(4));
    vehicle.preferred_routes = vec!["Mumbai".to_string()];
    vehicle.payload_tons = Some(12.0);
    vehicle.min_rate_per_km = Some(32.0);
    vehicle.max_distance_km = Some(300.0);
    vehicle.city_only = true;

    let result = matcher.find_matches(&criteria(), vec![vehicle]);

    // 80 reliability + 30 route + 20 capacity + 10 rate + 5 city
    assert_eq!(result.matches[0].match_score, 145.0);
    assert_eq!(result.matches[0].reliability_score, 4.0);
}

#[test]
fn test_custom_rules_change_ranking() {
    let mut route_lover = VehicleCandidate::new("route", "o-1", "truck");
    route_lover.preferred_routes = vec!["Mumbai - Pune".to_string()];

    let mut reliable = VehicleCandidate::new("reliable", "o-2", "truck");
    reliable.reliability = Some(ReliabilityMetrics::uniform(2));

    let default_result = Matcher::with_default_rules()
        .find_matches(&criteria(), vec![route_lover.clone(), reliable.clone()]);
    assert_eq!(default_result.matches[0].candidate.vehicle_id, "reliable");

    let rules = ScoringRules {
        preferred_route_bonus: 60.0,
        ..ScoringRules::default()
    };
    let tuned = Matcher::new(rules).find_matches(&criteria(), vec![reliable, route_lover]);
    assert_eq!(tuned.matches[0].candidate.vehicle_id, "route");
}

#[test]
fn test_match_result_serializes_flat() {
    let matcher = Matcher::with_default_rules();
    let mut vehicle = VehicleCandidate::new("v-1", "o-1", "truck");
    vehicle.owner_name = Some("Ramesh".to_string());

    let result = matcher.find_matches(&criteria(), vec![vehicle]);
    let json = serde_json::to_value(&result.matches[0]).unwrap();

    assert_eq!(json["vehicleId"], "v-1");
    assert_eq!(json["ownerName"], "Ramesh");
    assert_eq!(json["matchScore"], 0.0);
    assert_eq!(json["reliabilityScore"], 0.0);
}

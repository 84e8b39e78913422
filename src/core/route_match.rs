//! Text heuristics for route preference and avoidance.
//!
//! Routes are free text ("Mumbai - Pune", "Delhi NCR"), so matching is plain
//! case-insensitive substring containment. The two predicates are
//! deliberately asymmetric; see each function.

/// Join pickup and drop into the route label used for matching
pub fn build_route(pickup: &str, drop: &str) -> String {
    format!("{} - {}", pickup, drop)
}

/// Does any preferred route match the requested route?
///
/// Bidirectional: a preferred entry matches when it contains the requested
/// route, or when the requested route contains it. An empty preferred entry
/// therefore matches every route.
#[inline]
pub fn matches_preferred_route(route: &str, preferred_routes: &[String]) -> bool {
    let route = route.to_lowercase();
    preferred_routes.iter().any(|preferred| {
        let preferred = preferred.to_lowercase();
        preferred.contains(&route) || route.contains(&preferred)
    })
}

/// Does any avoided route cover the requested route?
///
/// One direction only: an avoid entry matches when it contains the requested
/// route. A requested route that merely contains an avoid entry does not
/// match.
#[inline]
pub fn matches_avoid_route(route: &str, avoid_routes: &[String]) -> bool {
    let route = route.to_lowercase();
    avoid_routes
        .iter()
        .any(|avoid| avoid.to_lowercase().contains(&route))
}

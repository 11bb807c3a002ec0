#[cfg(test)]
#[path = "../../tests/unit/construction/lookahead_test.rs"]
mod lookahead_test;

use crate::config::EngineConfig;
use crate::construction::context::VehicleSnapshot;
use crate::construction::costs::assignment_cost;
use crate::construction::feasibility::{check_lifetime, check_time};
use crate::models::common::{days, round_km};
use crate::models::{RelationMatrix, Route};
use crate::utils::compare_floats;
use std::sync::Arc;

/// Scores the future opportunities a vehicle would have after completing the route:
/// up to `chain_depth` feasible follow-up routes within the `look_ahead_days` window,
/// each scored as `1000 / (cost + 100)` and combined with geometrically diminishing
/// weights. Bounded, so it biases rather than overwhelms the immediate cost.
pub fn chain_score(
    snapshot: &VehicleSnapshot,
    route: &Route,
    routes: &[Arc<Route>],
    route_index: usize,
    matrix: &RelationMatrix,
    config: &EngineConfig,
) -> f64 {
    if config.assignment.chain_depth == 0 || route_index + 1 >= routes.len() {
        return 0.;
    }

    let Some(end_location) = route.end_location_id() else {
        return 0.;
    };

    let distance = round_km(route.distance_km);
    // the swap window is not simulated forward, so the future view carries no swaps
    let future = VehicleSnapshot {
        location_id: end_location,
        available_from: route.end_time,
        km_since_last_service: snapshot.km_since_last_service + distance,
        km_this_lease_year: snapshot.km_this_lease_year + distance,
        total_lifetime_km: snapshot.total_lifetime_km + distance,
        swaps_in_window: 0,
        ..*snapshot
    };

    let window_end = route.end_time + days(config.assignment.look_ahead_days);
    let scan_end = (route_index + 1 + config.assignment.max_lookahead_routes).min(routes.len());

    let mut candidates: Vec<f64> = Vec::new();
    for next in &routes[route_index + 1..scan_end] {
        if next.start_time > window_end {
            break;
        }

        if check_time(&future, next, matrix).and_then(|_| check_lifetime(&future, next)).is_err() {
            continue;
        }

        let cost = assignment_cost(&future, next, matrix, config).score();
        if cost.is_finite() {
            candidates.push(1000. / (cost + 100.));
        }
    }

    candidates.sort_by(|a, b| compare_floats(*b, *a));

    candidates
        .iter()
        .take(config.assignment.chain_depth)
        .enumerate()
        .map(|(level, score)| score * 0.5f64.powi(level as i32))
        .sum()
}

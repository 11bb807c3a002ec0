#[cfg(test)]
#[path = "../../tests/unit/construction/costs_test.rs"]
mod costs_test;

use crate::config::EngineConfig;
use crate::construction::context::VehicleSnapshot;
use crate::models::common::{round_km, Cost, Kilometers};
use crate::models::{Relation, RelationMatrix, Route};

/// Cost components of assigning a candidate vehicle to a route.
#[derive(Clone, Copy, Debug, Default)]
pub struct CostBreakdown {
    /// Relocation fee, infinite when no direct edge exists.
    pub relocation: Cost,
    /// Overage fee projected on the future lease-year mileage.
    pub overage: Cost,
    /// Scoring bias for an overdue service.
    pub service_penalty: Cost,
}

impl CostBreakdown {
    /// The candidate score used to select among feasible vehicles.
    pub fn score(&self) -> Cost {
        self.relocation + self.overage + self.service_penalty
    }
}

/// Calculates the fee of traversing a relocation edge.
pub fn relocation_cost(relation: &Relation, config: &EngineConfig) -> Cost {
    config.costs.relocation_base_cost_pln
        + relation.distance_km * config.costs.relocation_per_km_pln
        + relation.time_hours * config.costs.relocation_per_hour_pln
}

/// Calculates the overage fee of the *future* lease-year mileage: the current
/// counter plus the rounded route distance, checked against the annual allowance.
/// Returns the fee together with the excess kilometers.
pub fn overage_cost(
    km_this_lease_year: Kilometers,
    annual_limit_km: Kilometers,
    distance_km: f64,
    config: &EngineConfig,
) -> (Cost, Kilometers) {
    let future = km_this_lease_year + round_km(distance_km);
    if future > annual_limit_km {
        let excess = future - annual_limit_km;
        (excess as f64 * config.costs.overage_per_km_pln, excess)
    } else {
        (0., 0)
    }
}

/// Returns the flat scoring penalty when the route would push the vehicle beyond
/// its service interval plus tolerance. A selection bias only, never a blocker.
pub fn service_penalty(snapshot: &VehicleSnapshot, route: &Route, config: &EngineConfig) -> Cost {
    let future = snapshot.km_since_last_service + round_km(route.distance_km);
    if future > snapshot.service_interval_km + config.service_policy.service_tolerance_km {
        config.service_policy.service_penalty_pln
    } else {
        0.
    }
}

/// Calculates the immediate cost breakdown of assigning the vehicle to the route.
/// A required relocation without a direct edge yields an infinite relocation
/// component; the feasibility kernel rejects such candidates first.
pub fn assignment_cost(
    snapshot: &VehicleSnapshot,
    route: &Route,
    matrix: &RelationMatrix,
    config: &EngineConfig,
) -> CostBreakdown {
    let relocation = match route.start_location_id() {
        Some(start) if start != snapshot.location_id => match matrix.relation(snapshot.location_id, start) {
            Some(relation) => relocation_cost(&relation, config),
            None => f64::INFINITY,
        },
        Some(_) => 0.,
        None => f64::INFINITY,
    };

    let (overage, _) = overage_cost(snapshot.km_this_lease_year, snapshot.annual_limit_km, route.distance_km, config);

    CostBreakdown { relocation, overage, service_penalty: service_penalty(snapshot, route, config) }
}

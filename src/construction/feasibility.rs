#[cfg(test)]
#[path = "../../tests/unit/construction/feasibility_test.rs"]
mod feasibility_test;

use crate::config::EngineConfig;
use crate::construction::context::VehicleSnapshot;
use crate::models::common::{hours, round_km};
use crate::models::{ReasonCode, RelationMatrix, Route};

/// Checks that the vehicle is available and, with a relocation edge when needed,
/// arrives no later than the route start. Arrival exactly at the start is feasible.
pub fn check_time(snapshot: &VehicleSnapshot, route: &Route, matrix: &RelationMatrix) -> Result<(), ReasonCode> {
    let Some(start) = route.start_location_id() else {
        return Err(ReasonCode::NoPath);
    };

    if snapshot.location_id == start {
        return if snapshot.available_from <= route.start_time { Ok(()) } else { Err(ReasonCode::Time) };
    }

    let Some(relation) = matrix.relation(snapshot.location_id, start) else {
        return Err(ReasonCode::NoPath);
    };

    if snapshot.available_from + hours(relation.time_hours) <= route.start_time {
        Ok(())
    } else {
        Err(ReasonCode::Time)
    }
}

/// Checks the lifetime contract ceiling. Hard, never overridden.
pub fn check_lifetime(snapshot: &VehicleSnapshot, route: &Route) -> Result<(), ReasonCode> {
    match snapshot.total_contract_limit_km {
        Some(limit) if snapshot.total_lifetime_km + round_km(route.distance_km) > limit => Err(ReasonCode::Lifetime),
        _ => Ok(()),
    }
}

/// Checks the rolling swap window: a route which would add a new relocation is
/// rejected once the window already holds the maximum amount of swaps. Hard.
pub fn check_swap(snapshot: &VehicleSnapshot, route: &Route, config: &EngineConfig) -> Result<(), ReasonCode> {
    let adds_relocation = route.start_location_id().is_some_and(|start| start != snapshot.location_id);

    if adds_relocation && snapshot.swaps_in_window >= config.swap_policy.max_swaps_per_period {
        Err(ReasonCode::Swap)
    } else {
        Ok(())
    }
}

/// Evaluates all feasibility predicates against the scoring snapshot,
/// returning the first violated reason code.
pub fn evaluate(
    snapshot: &VehicleSnapshot,
    route: &Route,
    matrix: &RelationMatrix,
    config: &EngineConfig,
) -> Result<(), ReasonCode> {
    check_time(snapshot, route, matrix)?;
    check_lifetime(snapshot, route)?;
    check_swap(snapshot, route, config)?;

    Ok(())
}

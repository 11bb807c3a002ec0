#[cfg(test)]
#[path = "../../tests/unit/construction/placement_test.rs"]
mod placement_test;

use crate::config::{EngineConfig, PlacementStrategy};
use crate::construction::costs::relocation_cost;
use crate::models::common::{days, Cost, LocationId, VehicleId};
use crate::models::{Fleet, PlacementSummary, RelationMatrix, RoutePlan, VehicleSpec};
use crate::utils::{compare_floats, EngineError, EngineResult};
use hashbrown::HashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Counts routes per start location within the demand window: the first
/// `lookahead_days` days after the earliest route start. Routes without a
/// derivable start location are discarded.
pub fn analyze_demand(plan: &RoutePlan, lookahead_days: i64) -> HashMap<LocationId, usize> {
    let mut demand = HashMap::default();

    let Some(window_start) = plan.start_time() else {
        return demand;
    };
    let window_end = window_start + days(lookahead_days);

    for route in plan.routes() {
        if route.start_time >= window_end {
            // routes are chronological, nothing else falls into the window
            break;
        }
        if let Some(start) = route.start_location_id() {
            *demand.entry(start).or_insert(0) += 1;
        }
    }

    demand
}

/// Orders locations by descending demand, ties broken by ascending location id.
fn sorted_demand(demand: &HashMap<LocationId, usize>) -> Vec<(LocationId, usize)> {
    let mut sorted: Vec<_> = demand.iter().map(|(&location, &count)| (location, count)).collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    sorted
}

/// Derives the hard per-location cap from the configuration.
fn concentration_cap(fleet_size: usize, config: &EngineConfig) -> usize {
    config
        .placement
        .max_vehicles_per_location
        .unwrap_or_else(|| ((fleet_size as f64 * config.placement.max_concentration) as usize).max(1))
}

/// Splits the fleet into vehicles pinned by a known initial location and those
/// the placement phase is free to position.
fn partition_fleet(fleet: &Fleet) -> (Vec<(VehicleId, LocationId)>, Vec<&Arc<VehicleSpec>>) {
    let mut pinned = Vec::new();
    let mut free = Vec::new();

    for vehicle in fleet.vehicles() {
        match vehicle.current_location_id {
            Some(location) => pinned.push((vehicle.id, location)),
            None => free.push(vehicle),
        }
    }

    (pinned, free)
}

fn proportional_placement(
    free: &[&Arc<VehicleSpec>],
    sorted: &[(LocationId, usize)],
    counts: &mut HashMap<LocationId, usize>,
    cap: usize,
) -> BTreeMap<VehicleId, LocationId> {
    let mut placements = BTreeMap::new();
    let total_demand: usize = sorted.iter().map(|(_, count)| count).sum();
    let mut cursor = 0;

    let place = |placements: &mut BTreeMap<VehicleId, LocationId>,
                     counts: &mut HashMap<LocationId, usize>,
                     cursor: &mut usize,
                     location: LocationId| {
        placements.insert(free[*cursor].id, location);
        *counts.entry(location).or_insert(0) += 1;
        *cursor += 1;
    };

    for &(location, demand) in sorted {
        if cursor >= free.len() {
            break;
        }

        let proportional = if total_demand > 0 { free.len() * demand / total_demand } else { 0 };
        let occupied = counts.get(&location).copied().unwrap_or(0);
        let needed = proportional.max(1).min(cap.saturating_sub(occupied)).min(free.len() - cursor);

        for _ in 0..needed {
            place(&mut placements, counts, &mut cursor, location);
        }
    }

    // drain leftovers into the top-demand location, spilling down the demand order
    for &(location, _) in sorted {
        while cursor < free.len() && counts.get(&location).copied().unwrap_or(0) < cap {
            place(&mut placements, counts, &mut cursor, location);
        }
    }

    // every demanded location is at cap: the overflow stays with the top location
    if let Some(&(top, _)) = sorted.first() {
        while cursor < free.len() {
            place(&mut placements, counts, &mut cursor, top);
        }
    }

    placements
}

/// Penalizes crowded locations: free below 70% of the cap, rising quadratically
/// up to the cap, then steeply beyond it.
fn concentration_penalty(occupied: usize, cap: usize) -> Cost {
    let soft = 0.7 * cap as f64;
    let occupied = occupied as f64;

    if occupied < soft {
        0.
    } else if occupied <= cap as f64 {
        let span = (cap as f64 - soft).max(f64::EPSILON);
        let ratio = (occupied - soft) / span;
        1000. * ratio * ratio
    } else {
        5000. * (occupied - cap as f64).powf(1.5)
    }
}

fn cost_matrix_placement(
    free: &[&Arc<VehicleSpec>],
    sorted: &[(LocationId, usize)],
    counts: &mut HashMap<LocationId, usize>,
    cap: usize,
) -> BTreeMap<VehicleId, LocationId> {
    let mut placements = BTreeMap::new();

    for vehicle in free {
        let mut best: Option<(LocationId, Cost)> = None;
        for &(location, demand) in sorted {
            let occupied = counts.get(&location).copied().unwrap_or(0);
            let cost = 1000. / ((demand as f64 + 2.).ln()) + concentration_penalty(occupied, cap);

            if best.map_or(true, |(_, known)| compare_floats(cost, known) == std::cmp::Ordering::Less) {
                best = Some((location, cost));
            }
        }

        if let Some((location, _)) = best {
            placements.insert(vehicle.id, location);
            *counts.entry(location).or_insert(0) += 1;
        }
    }

    placements
}

/// Estimates the relocation cost of serving the demand window from the given
/// placement: each early route is charged the cheapest reachable placed location.
fn estimate_early_cost(
    placements: &BTreeMap<VehicleId, LocationId>,
    plan: &RoutePlan,
    matrix: &RelationMatrix,
    config: &EngineConfig,
) -> Cost {
    let placed: Vec<LocationId> = {
        let mut locations: Vec<_> = placements.values().copied().collect();
        locations.sort_unstable();
        locations.dedup();
        locations
    };

    let Some(window_start) = plan.start_time() else {
        return 0.;
    };
    let window_end = window_start + days(config.placement.lookahead_days);

    plan.routes()
        .iter()
        .take_while(|route| route.start_time < window_end)
        .filter_map(|route| route.start_location_id())
        .filter_map(|start| {
            placed
                .iter()
                .filter_map(|&location| matrix.relation(location, start))
                .map(|relation| if relation.distance_km == 0. { 0. } else { relocation_cost(&relation, config) })
                .min_by(|a, b| compare_floats(*a, *b))
        })
        .sum()
}

/// Calculates the initial position of every vehicle from early-window demand.
///
/// With no demand at all, the whole free fleet falls back to the first hub,
/// or the first location when no hub exists.
pub fn calculate_placement(
    fleet: &Fleet,
    plan: &RoutePlan,
    matrix: &RelationMatrix,
    config: &EngineConfig,
) -> EngineResult<PlacementSummary> {
    let demand = analyze_demand(plan, config.placement.lookahead_days);
    let sorted = sorted_demand(&demand);
    let cap = concentration_cap(fleet.size(), config);

    let (pinned, free) = partition_fleet(fleet);
    let mut counts: HashMap<LocationId, usize> = HashMap::default();
    let mut placements: BTreeMap<VehicleId, LocationId> = BTreeMap::new();

    for (vehicle, location) in pinned {
        if !matrix.contains(location) {
            return Err(EngineError::InvalidInput(format!("vehicle {vehicle} refers to unknown location {location}")));
        }
        placements.insert(vehicle, location);
        *counts.entry(location).or_insert(0) += 1;
    }

    let free_placements = if sorted.is_empty() {
        let fallback = matrix
            .first_hub()
            .ok_or_else(|| EngineError::InvalidInput("cannot place vehicles: no locations".to_string()))?;
        free.iter().map(|vehicle| (vehicle.id, fallback.id)).collect()
    } else {
        match config.placement.strategy {
            PlacementStrategy::Proportional => proportional_placement(&free, &sorted, &mut counts, cap),
            PlacementStrategy::CostMatrix => cost_matrix_placement(&free, &sorted, &mut counts, cap),
        }
    };
    placements.extend(free_placements);

    let estimated_early_cost = estimate_early_cost(&placements, plan, matrix, config);

    Ok(summarize(placements, &demand, fleet.size(), estimated_early_cost))
}

fn summarize(
    placements: BTreeMap<VehicleId, LocationId>,
    demand: &HashMap<LocationId, usize>,
    fleet_size: usize,
    estimated_early_cost: Cost,
) -> PlacementSummary {
    let mut counts: HashMap<LocationId, usize> = HashMap::default();
    for location in placements.values() {
        *counts.entry(*location).or_insert(0) += 1;
    }

    let max_vehicles_at_location = counts.values().copied().max().unwrap_or(0);
    let vehicles_at_zero_demand = placements
        .values()
        .filter(|location| demand.get(*location).copied().unwrap_or(0) == 0)
        .count();

    PlacementSummary {
        demand: demand.iter().map(|(&location, &count)| (location, count)).collect(),
        locations_used: counts.len(),
        max_vehicles_at_location,
        concentration_ratio: if fleet_size > 0 { max_vehicles_at_location as f64 / fleet_size as f64 } else { 0. },
        vehicles_at_zero_demand,
        estimated_early_cost,
        placements,
    }
}

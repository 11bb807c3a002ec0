#[cfg(test)]
#[path = "../../tests/unit/construction/assignment_test.rs"]
mod assignment_test;

use crate::config::EngineConfig;
use crate::construction::context::{AdvanceOutcome, FleetContext};
use crate::construction::costs::{assignment_cost, CostBreakdown};
use crate::construction::{feasibility, lookahead};
use crate::models::common::VehicleId;
use crate::models::{Assignment, ReasonCode, RelationMatrix, Route, RoutePlan, UnassignedRoute};
use crate::solver::Telemetry;
use crate::utils::{compare_floats, parallel_collect, EngineResult, Parallelism, Quota};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// The assignment phase output: the ordered assignment log, the routes nothing
/// could serve, and whether the run was cut short.
#[derive(Debug, Default)]
pub struct AssignmentLog {
    /// Assignment records ordered by `(route.start_time, route.id)`.
    pub assignments: Vec<Assignment>,
    /// Routes without a feasible vehicle, with per-reason rejection counts.
    pub unassigned: Vec<UnassignedRoute>,
    /// True when a quota stopped the loop and the log is partial.
    pub cancelled: bool,
}

struct Candidate {
    vehicle_id: VehicleId,
    breakdown: CostBreakdown,
    chain: f64,
    effective: f64,
}

/// Iterates routes in chronological order and assigns each to the cheapest
/// feasible vehicle. Scoring fans out over the fleet read-only when parallelism
/// allows and re-serializes for the winning `advance`; ties break by ascending
/// vehicle id, so the log is identical in parallel and sequential mode.
pub fn assign_routes(
    ctx: &mut FleetContext,
    plan: &RoutePlan,
    matrix: &RelationMatrix,
    config: &EngineConfig,
    parallelism: Parallelism,
    telemetry: &mut Telemetry,
    quota: Option<&dyn Quota>,
) -> EngineResult<AssignmentLog> {
    let routes = plan.horizon(config.assignment.assignment_lookahead_days);
    let mut log = AssignmentLog::default();

    for (index, route) in routes.iter().enumerate() {
        if quota.is_some_and(|quota| quota.is_reached()) {
            log.cancelled = true;
            telemetry.on_cancelled();
            break;
        }

        telemetry.on_route(route);

        let scoring_ctx: &FleetContext = ctx;
        let evaluate = |&vehicle_id: &VehicleId| {
            let snapshot = scoring_ctx.snapshot_for_scoring(vehicle_id, route, config)?;

            Some(match feasibility::evaluate(&snapshot, route, matrix, config) {
                Ok(()) => {
                    let breakdown = assignment_cost(&snapshot, route, matrix, config);
                    let chain = if config.assignment.use_chain_optimization {
                        lookahead::chain_score(&snapshot, route, routes, index, matrix, config)
                    } else {
                        0.
                    };
                    let effective = breakdown.score() - config.assignment.chain_weight * chain;

                    Ok(Candidate { vehicle_id, breakdown, chain, effective })
                }
                Err(code) => Err(code),
            })
        };
        let evaluations = if parallelism.is_parallel() {
            parallel_collect(scoring_ctx.vehicle_ids(), &evaluate)
        } else {
            scoring_ctx.vehicle_ids().iter().map(&evaluate).collect::<Vec<_>>()
        };

        let mut best: Option<Candidate> = None;
        let mut reasons: BTreeMap<ReasonCode, usize> = BTreeMap::new();

        // evaluations follow ascending vehicle id, so strict improvement fixes ties
        for evaluation in evaluations.into_iter().flatten() {
            match evaluation {
                Ok(candidate) => {
                    let improves = best
                        .as_ref()
                        .map_or(true, |known| compare_floats(candidate.effective, known.effective) == Ordering::Less);
                    if improves {
                        best = Some(candidate);
                    }
                }
                Err(code) => *reasons.entry(code).or_insert(0) += 1,
            }
        }

        match best {
            Some(candidate) => {
                let outcome = ctx.advance(candidate.vehicle_id, route, matrix, config)?;
                ctx.prune_swap_window(candidate.vehicle_id, route.start_time, config);
                log.assignments.push(build_record(route, &candidate, &outcome));
                telemetry.on_assigned();
            }
            None => {
                log.unassigned.push(UnassignedRoute { route_id: route.id, date: route.start_time, reasons });
                telemetry.on_unassigned(route);
            }
        }
    }

    Ok(log)
}

fn build_record(route: &Route, candidate: &Candidate, outcome: &AdvanceOutcome) -> Assignment {
    let (relocation_from, relocation_to, relocation_distance_km, relocation_time_hours) = match outcome.relocation {
        Some((from, to, relation)) => (Some(from), Some(to), relation.distance_km, relation.time_hours),
        None => (None, None, 0., 0.),
    };

    Assignment {
        route_id: route.id,
        vehicle_id: candidate.vehicle_id,
        date: route.start_time,
        route_distance_km: route.distance_km,
        start_location_id: route.start_location_id().unwrap_or_default(),
        end_location_id: route.end_location_id().unwrap_or_default(),
        vehicle_km_before: outcome.vehicle_km_before,
        vehicle_km_after: outcome.vehicle_km_after,
        annual_km_before: outcome.annual_km_before,
        annual_km_after: outcome.annual_km_after,
        requires_relocation: outcome.relocation.is_some(),
        requires_service: outcome.serviced,
        relocation_cost: outcome.relocation_cost,
        overage_cost: outcome.overage_cost,
        service_penalty: candidate.breakdown.service_penalty,
        service_cost: outcome.service_cost,
        total_cost: outcome.accounted_cost(),
        relocation_from,
        relocation_to,
        relocation_distance_km,
        relocation_time_hours,
        overage_km: outcome.overage_km,
        chain_score: candidate.chain,
    }
}

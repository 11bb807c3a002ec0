use super::*;
use crate::config::EngineConfig;
use crate::helpers::*;
use crate::models::common::{DateTime, LocationId};
use crate::models::{Fleet, RoutePlan};
use crate::solver::TelemetryMode;
use std::collections::BTreeMap;
use time::macros::datetime;

fn run_assignment(
    placements: &[(VehicleId, LocationId)],
    plan: &RoutePlan,
    matrix: &RelationMatrix,
    config: &EngineConfig,
) -> (AssignmentLog, FleetContext) {
    run_assignment_with(placements, plan, matrix, config, Parallelism::default())
}

fn run_assignment_with(
    placements: &[(VehicleId, LocationId)],
    plan: &RoutePlan,
    matrix: &RelationMatrix,
    config: &EngineConfig,
    parallelism: Parallelism,
) -> (AssignmentLog, FleetContext) {
    let fleet = create_fleet(placements.iter().map(|&(id, _)| test_vehicle(id)).collect());
    let placements: BTreeMap<_, _> = placements.iter().copied().collect();
    let run_start = plan.start_time().unwrap_or(DateTime::UNIX_EPOCH);

    let mut ctx = FleetContext::new(&fleet, &placements, run_start).expect("cannot create fleet context");
    let mut telemetry = Telemetry::new(TelemetryMode::None, config.performance.clone());

    let log =
        assign_routes(&mut ctx, plan, matrix, config, parallelism, &mut telemetry, None).expect("cannot assign routes");

    (log, ctx)
}

#[test]
fn can_assign_vehicle_already_at_start() {
    let matrix = create_matrix(&[10], &[]);
    let config = create_config();
    let plan = create_plan(
        vec![test_route(1, 10, 10, datetime!(2024-01-01 08:00 UTC), datetime!(2024-01-01 12:00 UTC), 100.)],
        &matrix,
    );

    let (log, ctx) = run_assignment(&[(1, 10)], &plan, &matrix, &config);

    assert_eq!(log.assignments.len(), 1);
    let assignment = &log.assignments[0];
    assert_eq!((assignment.route_id, assignment.vehicle_id), (1, 1));
    assert!(!assignment.requires_relocation);
    assert_eq!(assignment.relocation_cost, 0.);
    assert_eq!(assignment.overage_cost, 0.);
    assert_eq!(assignment.annual_km_after, 100);
    assert_eq!(ctx.state(1).unwrap().km_this_lease_year, 100);
}

#[test]
fn can_prefer_cheaper_vehicle() {
    let matrix = create_matrix(&[10, 20], &[(20, 10, 300., 3.5)]);
    let config = create_config();
    let plan = create_plan(
        vec![test_route(1, 10, 10, datetime!(2024-01-01 08:00 UTC), datetime!(2024-01-01 12:00 UTC), 100.)],
        &matrix,
    );

    let (log, _) = run_assignment(&[(1, 10), (2, 20)], &plan, &matrix, &config);

    assert_eq!(log.assignments[0].vehicle_id, 1);
}

#[test]
fn can_break_score_ties_by_vehicle_id() {
    let matrix = create_matrix(&[10], &[]);
    let config = create_config();
    let plan = create_plan(
        vec![test_route(1, 10, 10, datetime!(2024-01-01 08:00 UTC), datetime!(2024-01-01 12:00 UTC), 100.)],
        &matrix,
    );

    let (log, _) = run_assignment(&[(2, 10), (1, 10)], &plan, &matrix, &config);

    assert_eq!(log.assignments[0].vehicle_id, 1);
}

#[test]
fn can_enforce_swap_policy_on_selection() {
    let matrix = create_matrix(&[10, 20, 21, 40], &[(20, 10, 300., 3.5), (10, 40, 200., 2.), (21, 40, 500., 5.)]);
    let config = create_config();
    let plan = create_plan(
        vec![
            test_route(1, 10, 10, datetime!(2024-01-05 08:00 UTC), datetime!(2024-01-05 12:00 UTC), 100.),
            test_route(2, 40, 40, datetime!(2024-02-01 08:00 UTC), datetime!(2024-02-01 12:00 UTC), 100.),
        ],
        &matrix,
    );

    let (log, ctx) = run_assignment(&[(1, 20), (2, 21)], &plan, &matrix, &config);

    assert_eq!(log.assignments.len(), 2);
    // vehicle 1 relocated on the first route and its swap window is exhausted,
    // so the second relocation goes to vehicle 2 despite being more expensive
    assert_eq!(log.assignments[0].vehicle_id, 1);
    assert_eq!(log.assignments[1].vehicle_id, 2);
    assert_eq!(ctx.state(1).unwrap().total_relocations, 1);
    assert_eq!(ctx.state(2).unwrap().total_relocations, 1);
}

#[test]
fn can_record_unassigned_route_and_continue() {
    let matrix = create_matrix(&[5, 99], &[]);
    let config = create_config();
    let plan = create_plan(
        vec![
            test_route(1, 99, 99, datetime!(2024-01-01 08:00 UTC), datetime!(2024-01-01 12:00 UTC), 100.),
            test_route(2, 5, 5, datetime!(2024-01-02 08:00 UTC), datetime!(2024-01-02 12:00 UTC), 100.),
        ],
        &matrix,
    );

    let (log, _) = run_assignment(&[(1, 5)], &plan, &matrix, &config);

    assert_eq!(log.unassigned.len(), 1);
    assert_eq!(log.unassigned[0].route_id, 1);
    assert_eq!(log.unassigned[0].reasons.get(&ReasonCode::NoPath), Some(&1));
    assert_eq!(log.assignments.len(), 1);
    assert_eq!(log.assignments[0].route_id, 2);
}

#[test]
fn can_limit_assignment_horizon() {
    let matrix = create_matrix(&[10], &[]);
    let mut config = create_config();
    config.assignment.assignment_lookahead_days = 1;

    let plan = create_plan(
        vec![
            test_route(1, 10, 10, datetime!(2024-01-01 08:00 UTC), datetime!(2024-01-01 12:00 UTC), 100.),
            test_route(2, 10, 10, datetime!(2024-01-05 08:00 UTC), datetime!(2024-01-05 12:00 UTC), 100.),
        ],
        &matrix,
    );

    let (log, _) = run_assignment(&[(1, 10)], &plan, &matrix, &config);

    assert_eq!(log.assignments.len(), 1);
    assert!(log.unassigned.is_empty());
}

#[test]
fn can_score_sequentially_with_identical_log() {
    let matrix = create_matrix(&[10, 20, 21, 40], &[(20, 10, 300., 3.5), (10, 40, 200., 2.), (21, 40, 500., 5.)]);
    let config = create_config();
    let routes = vec![
        test_route(1, 10, 10, datetime!(2024-01-05 08:00 UTC), datetime!(2024-01-05 12:00 UTC), 100.),
        test_route(2, 40, 40, datetime!(2024-02-01 08:00 UTC), datetime!(2024-02-01 12:00 UTC), 100.),
    ];
    let placements = [(1, 20), (2, 21)];

    let plan = create_plan(routes.clone(), &matrix);
    let (parallel, _) = run_assignment_with(&placements, &plan, &matrix, &config, Parallelism::default());

    let plan = create_plan(routes, &matrix);
    let (sequential, _) = run_assignment_with(&placements, &plan, &matrix, &config, Parallelism::new(1));

    assert_eq!(
        serde_json::to_string(&parallel.assignments).unwrap(),
        serde_json::to_string(&sequential.assignments).unwrap()
    );
}

#[test]
fn can_order_log_chronologically() {
    let matrix = create_matrix(&[10], &[]);
    let config = create_config();
    let plan = create_plan(
        vec![
            test_route(3, 10, 10, datetime!(2024-01-02 08:00 UTC), datetime!(2024-01-02 12:00 UTC), 100.),
            test_route(1, 10, 10, datetime!(2024-01-01 13:00 UTC), datetime!(2024-01-01 17:00 UTC), 100.),
            test_route(2, 10, 10, datetime!(2024-01-01 08:00 UTC), datetime!(2024-01-01 12:00 UTC), 100.),
        ],
        &matrix,
    );

    let (log, _) = run_assignment(&[(1, 10)], &plan, &matrix, &config);

    let ids: Vec<_> = log.assignments.iter().map(|assignment| assignment.route_id).collect();
    assert_eq!(ids, vec![2, 1, 3]);
}

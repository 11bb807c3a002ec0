use super::*;
use crate::helpers::*;
use crate::models::common::LocationId;
use time::macros::datetime;

fn test_snapshot(location: LocationId) -> VehicleSnapshot {
    VehicleSnapshot {
        vehicle_id: 1,
        location_id: location,
        available_from: datetime!(2024-01-01 00:00 UTC),
        km_since_last_service: 0,
        km_this_lease_year: 0,
        total_lifetime_km: 0,
        annual_limit_km: 150_000,
        service_interval_km: 120_000,
        total_contract_limit_km: None,
        swaps_in_window: 0,
    }
}

#[test]
fn can_calculate_relocation_fee_from_schedule() {
    let relation = Relation { distance_km: 300., time_hours: 3.5 };

    let cost = relocation_cost(&relation, &create_config());

    assert_eq!(cost, 1000. + 300. + 3.5 * 150.);
}

#[test]
fn can_calculate_overage_on_future_mileage() {
    let config = create_config();

    let (cost, excess) = overage_cost(149_950, 150_000, 200., &config);
    assert_eq!(excess, 150);
    assert!((cost - 138.).abs() < 1e-9);

    let (cost, excess) = overage_cost(149_800, 150_000, 200., &config);
    assert_eq!(excess, 0);
    assert_eq!(cost, 0.);
}

#[test]
fn can_apply_service_penalty_beyond_tolerance() {
    let config = create_config();
    let route = test_route(1, 1, 1, datetime!(2024-01-01 08:00 UTC), datetime!(2024-01-01 12:00 UTC), 500.);

    let due = VehicleSnapshot { km_since_last_service: 120_501, ..test_snapshot(1) };
    assert_eq!(service_penalty(&due, &route, &config), 500.);

    // exactly at interval plus tolerance is still allowed
    let at_boundary = VehicleSnapshot { km_since_last_service: 120_500, ..test_snapshot(1) };
    assert_eq!(service_penalty(&at_boundary, &route, &config), 0.);
}

#[test]
fn can_breakdown_assignment_cost() {
    let config = create_config();
    let matrix = create_matrix(&[10, 20], &[(20, 10, 300., 3.5)]);
    let route = test_route(1, 10, 10, datetime!(2024-01-01 08:00 UTC), datetime!(2024-01-01 12:00 UTC), 100.);

    let local = assignment_cost(&test_snapshot(10), &route, &matrix, &config);
    assert_eq!(local.score(), 0.);

    let relocating = assignment_cost(&test_snapshot(20), &route, &matrix, &config);
    assert_eq!(relocating.relocation, 1825.);
    assert_eq!(relocating.score(), 1825.);
}

#[test]
fn can_mark_missing_path_as_infinite() {
    let config = create_config();
    let matrix = create_matrix(&[5, 99], &[]);
    let route = test_route(1, 99, 99, datetime!(2024-01-01 08:00 UTC), datetime!(2024-01-01 12:00 UTC), 100.);

    let breakdown = assignment_cost(&test_snapshot(5), &route, &matrix, &config);

    assert!(breakdown.relocation.is_infinite());
}

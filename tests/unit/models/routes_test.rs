use super::*;
use crate::helpers::*;
use time::macros::datetime;

fn matrix() -> RelationMatrix {
    create_matrix(&[1, 2, 3], &[])
}

#[test]
fn can_reject_non_positive_distance() {
    let route = test_route(1, 1, 2, datetime!(2024-01-01 08:00 UTC), datetime!(2024-01-01 12:00 UTC), 0.);

    assert!(RoutePlan::new(vec![route], &matrix()).is_err());
}

#[test]
fn can_reject_end_time_not_after_start() {
    let route = test_route(1, 1, 2, datetime!(2024-01-01 08:00 UTC), datetime!(2024-01-01 08:00 UTC), 100.);

    assert!(RoutePlan::new(vec![route], &matrix()).is_err());
}

#[test]
fn can_reject_empty_segment_list() {
    let mut route = test_route(1, 1, 2, datetime!(2024-01-01 08:00 UTC), datetime!(2024-01-01 12:00 UTC), 100.);
    route.segments.clear();

    assert!(RoutePlan::new(vec![route], &matrix()).is_err());
}

#[test]
fn can_reject_unknown_segment_location() {
    let route = test_route(1, 1, 99, datetime!(2024-01-01 08:00 UTC), datetime!(2024-01-01 12:00 UTC), 100.);

    assert!(RoutePlan::new(vec![route], &matrix()).is_err());
}

#[test]
fn can_reject_duplicate_route_ids() {
    let route_a = test_route(1, 1, 2, datetime!(2024-01-01 08:00 UTC), datetime!(2024-01-01 12:00 UTC), 100.);
    let route_b = test_route(1, 2, 3, datetime!(2024-01-02 08:00 UTC), datetime!(2024-01-02 12:00 UTC), 100.);

    assert!(RoutePlan::new(vec![route_a, route_b], &matrix()).is_err());
}

#[test]
fn can_order_routes_by_start_time_then_id() {
    let matrix = matrix();
    let plan = create_plan(
        vec![
            test_route(7, 1, 2, datetime!(2024-01-02 08:00 UTC), datetime!(2024-01-02 12:00 UTC), 100.),
            test_route(5, 1, 2, datetime!(2024-01-01 08:00 UTC), datetime!(2024-01-01 12:00 UTC), 100.),
            test_route(3, 2, 3, datetime!(2024-01-01 08:00 UTC), datetime!(2024-01-01 10:00 UTC), 50.),
        ],
        &matrix,
    );

    let ids: Vec<_> = plan.routes().iter().map(|route| route.id).collect();
    assert_eq!(ids, vec![3, 5, 7]);
}

#[test]
fn can_limit_horizon_by_days() {
    let matrix = matrix();
    let plan = create_plan(
        vec![
            test_route(1, 1, 2, datetime!(2024-01-01 08:00 UTC), datetime!(2024-01-01 12:00 UTC), 100.),
            test_route(2, 1, 2, datetime!(2024-01-02 08:00 UTC), datetime!(2024-01-02 12:00 UTC), 100.),
            test_route(3, 1, 2, datetime!(2024-01-05 08:00 UTC), datetime!(2024-01-05 12:00 UTC), 100.),
        ],
        &matrix,
    );

    assert_eq!(plan.horizon(2).len(), 2);
    assert_eq!(plan.horizon(0).len(), 3);
}

#[test]
fn can_derive_endpoints_and_loop_flag() {
    let route = test_route(1, 1, 1, datetime!(2024-01-01 08:00 UTC), datetime!(2024-01-01 12:00 UTC), 100.);

    assert_eq!(route.endpoints(), Some((1, 1)));
    assert!(route.is_loop());
}

use super::*;
use crate::helpers::*;

#[test]
fn can_distinguish_annual_and_lifetime_limits() {
    let annual = VehicleSpec { leasing_limit_km: 150_000, ..test_vehicle(1) };
    assert!(!annual.has_lifetime_limit());
    assert_eq!(annual.annual_limit_km(), 150_000);
    assert_eq!(annual.total_contract_limit_km(), None);

    let lifetime = VehicleSpec { leasing_limit_km: 900_000, ..test_vehicle(2) };
    assert!(lifetime.has_lifetime_limit());
    assert_eq!(lifetime.annual_limit_km(), DEFAULT_ANNUAL_LIMIT_KM);
    assert_eq!(lifetime.total_contract_limit_km(), Some(900_000));
}

#[test]
fn can_treat_threshold_value_as_annual() {
    let vehicle = VehicleSpec { leasing_limit_km: LIFETIME_LIMIT_THRESHOLD_KM, ..test_vehicle(1) };

    assert!(!vehicle.has_lifetime_limit());
    assert_eq!(vehicle.annual_limit_km(), LIFETIME_LIMIT_THRESHOLD_KM);
}

#[test]
fn can_order_vehicles_by_id() {
    let fleet = create_fleet(vec![test_vehicle(3), test_vehicle(1), test_vehicle(2)]);

    let ids: Vec<_> = fleet.vehicles().iter().map(|vehicle| vehicle.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn can_reject_duplicate_vehicle_ids() {
    let result = Fleet::new(vec![test_vehicle(1), test_vehicle(1)]);

    assert!(result.is_err());
}

//! Shared factories for unit tests.

use crate::config::EngineConfig;
use crate::models::common::{DateTime, Distance, LocationId, RouteId, VehicleId};
use crate::models::{Fleet, Location, Relation, RelationMatrix, Route, RoutePlan, Segment, VehicleSpec};
use time::macros::datetime;

pub fn test_location(id: LocationId) -> Location {
    Location { id, name: format!("loc_{id}"), latitude: 52.2, longitude: 21.0, is_hub: false }
}

pub fn test_hub(id: LocationId) -> Location {
    Location { is_hub: true, ..test_location(id) }
}

pub fn create_matrix(locations: &[LocationId], relations: &[(LocationId, LocationId, f64, f64)]) -> RelationMatrix {
    create_matrix_with_locations(locations.iter().copied().map(test_location).collect(), relations)
}

pub fn create_matrix_with_locations(
    locations: Vec<Location>,
    relations: &[(LocationId, LocationId, f64, f64)],
) -> RelationMatrix {
    RelationMatrix::new(
        locations,
        relations
            .iter()
            .map(|&(from, to, distance_km, time_hours)| (from, to, Relation { distance_km, time_hours }))
            .collect(),
    )
    .expect("cannot create relation matrix")
}

pub fn test_vehicle(id: VehicleId) -> VehicleSpec {
    VehicleSpec {
        id,
        registration: format!("WX {id:05}"),
        brand: "DAF".to_string(),
        service_interval_km: 120_000,
        leasing_start_km: 0,
        leasing_limit_km: 150_000,
        lease_start_date: datetime!(2024-01-01 00:00 UTC),
        lease_end_date: datetime!(2025-01-01 00:00 UTC),
        current_odometer_km: 0,
        current_location_id: None,
    }
}

pub fn test_vehicle_at(id: VehicleId, location: LocationId) -> VehicleSpec {
    VehicleSpec { current_location_id: Some(location), ..test_vehicle(id) }
}

pub fn create_fleet(vehicles: Vec<VehicleSpec>) -> Fleet {
    Fleet::new(vehicles).expect("cannot create fleet")
}

pub fn test_route(
    id: RouteId,
    from: LocationId,
    to: LocationId,
    start: DateTime,
    end: DateTime,
    distance_km: Distance,
) -> Route {
    Route {
        id,
        start_time: start,
        end_time: end,
        distance_km,
        segments: vec![Segment {
            id,
            route_id: id,
            seq: 0,
            start_location_id: from,
            end_location_id: to,
            start_time: start,
            end_time: end,
            relation_id: None,
        }],
    }
}

pub fn create_plan(routes: Vec<Route>, matrix: &RelationMatrix) -> RoutePlan {
    RoutePlan::new(routes, matrix).expect("cannot create route plan")
}

pub fn create_config() -> EngineConfig {
    EngineConfig::default()
}

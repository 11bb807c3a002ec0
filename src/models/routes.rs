#[cfg(test)]
#[path = "../../tests/unit/models/routes_test.rs"]
mod routes_test;

use crate::models::common::{DateTime, Distance, LocationId, RouteId};
use crate::models::network::RelationMatrix;
use crate::utils::{EngineError, EngineResult};
use hashbrown::HashSet;
use std::sync::Arc;

/// Represents an intra-route leg between two locations.
#[derive(Clone, Debug)]
pub struct Segment {
    /// An unique segment id.
    pub id: usize,
    /// Id of the owning route.
    pub route_id: RouteId,
    /// Ordering of the segment within its route.
    pub seq: u32,
    /// Location where the leg starts.
    pub start_location_id: LocationId,
    /// Location where the leg ends.
    pub end_location_id: LocationId,
    /// Leg start time.
    pub start_time: DateTime,
    /// Leg end time.
    pub end_time: DateTime,
    /// Optional id of the relation the leg drives over.
    pub relation_id: Option<usize>,
}

/// Represents a dated delivery job composed of ordered segments.
#[derive(Clone, Debug)]
pub struct Route {
    /// An unique route id.
    pub id: RouteId,
    /// Route start time.
    pub start_time: DateTime,
    /// Route end time.
    pub end_time: DateTime,
    /// Expected driving distance in kilometers.
    pub distance_km: Distance,
    /// Ordered legs of the route.
    pub segments: Vec<Segment>,
}

impl Route {
    /// Returns the start location derived from the first segment.
    pub fn start_location_id(&self) -> Option<LocationId> {
        self.segments.first().map(|segment| segment.start_location_id)
    }

    /// Returns the end location derived from the last segment.
    pub fn end_location_id(&self) -> Option<LocationId> {
        self.segments.last().map(|segment| segment.end_location_id)
    }

    /// Returns both endpoints when the route has segments.
    pub fn endpoints(&self) -> Option<(LocationId, LocationId)> {
        self.start_location_id().zip(self.end_location_id())
    }

    /// Checks whether the route starts and ends at the same location.
    pub fn is_loop(&self) -> bool {
        matches!(self.endpoints(), Some((start, end)) if start == end)
    }
}

/// Holds all routes of a run, validated and ordered chronologically by
/// `(start_time, id)` which fixes the processing order of the assignment phase.
pub struct RoutePlan {
    routes: Vec<Arc<Route>>,
}

impl RoutePlan {
    /// Validates raw routes and creates a new `RoutePlan`.
    ///
    /// Rejected inputs, reported with the offending route id: non-positive distance,
    /// end time not after start time, an empty segment list, segments referring to
    /// locations unknown to the matrix, duplicate route ids.
    pub fn new(routes: Vec<Route>, matrix: &RelationMatrix) -> EngineResult<Self> {
        let mut seen = HashSet::with_capacity(routes.len());

        for route in &routes {
            if route.distance_km <= 0. {
                return Err(EngineError::InvalidInput(format!(
                    "route {}: distance must be positive, got {}",
                    route.id, route.distance_km
                )));
            }
            if route.end_time <= route.start_time {
                return Err(EngineError::InvalidInput(format!("route {}: end time is not after start time", route.id)));
            }
            if route.segments.is_empty() {
                return Err(EngineError::InvalidInput(format!("route {}: empty segment list", route.id)));
            }
            for segment in &route.segments {
                if !matrix.contains(segment.start_location_id) || !matrix.contains(segment.end_location_id) {
                    return Err(EngineError::InvalidInput(format!(
                        "route {}: segment {} refers to unknown location",
                        route.id, segment.id
                    )));
                }
            }
            if !seen.insert(route.id) {
                return Err(EngineError::InvalidInput(format!("duplicate route id: {}", route.id)));
            }
        }

        let mut routes: Vec<_> = routes
            .into_iter()
            .map(|mut route| {
                route.segments.sort_by_key(|segment| segment.seq);
                Arc::new(route)
            })
            .collect();
        routes.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));

        Ok(Self { routes })
    }

    /// Returns all routes in processing order.
    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    /// Returns the earliest route start time.
    pub fn start_time(&self) -> Option<DateTime> {
        self.routes.first().map(|route| route.start_time)
    }

    /// Returns the chronological prefix of routes starting within the given horizon,
    /// where zero days means all routes.
    pub fn horizon(&self, days: i64) -> &[Arc<Route>] {
        match (self.start_time(), days) {
            (Some(start), days) if days > 0 => {
                let end = start + crate::models::common::days(days);
                let cut = self.routes.partition_point(|route| route.start_time < end);
                &self.routes[..cut]
            }
            _ => &self.routes,
        }
    }

    /// Returns amount of routes.
    pub fn size(&self) -> usize {
        self.routes.len()
    }

    /// Checks whether the plan has no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

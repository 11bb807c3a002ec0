//! Models to represent engine inputs, runtime primitives and output records.

pub mod common;

mod network;
pub use self::network::{Location, Relation, RelationCache, RelationMatrix};

mod fleet;
pub use self::fleet::{Fleet, VehicleSpec, DEFAULT_ANNUAL_LIMIT_KM, LIFETIME_LIMIT_THRESHOLD_KM};

mod routes;
pub use self::routes::{Route, RoutePlan, Segment};

mod solution;
pub use self::solution::{
    Assignment, PlacementSummary, ProgressSnapshot, ReasonCode, RunMetrics, RunSolution, TelemetryMetrics,
    UnassignedRoute, VehicleSummary,
};

//! This module reimports a commonly used types.

pub use crate::config::{EngineConfig, PlacementStrategy};

pub use crate::models::common::{Cost, DateTime, Distance, Kilometers, LocationId, RouteId, VehicleId};
pub use crate::models::{
    Assignment, Fleet, Location, PlacementSummary, ReasonCode, Relation, RelationMatrix, Route, RoutePlan,
    RunMetrics, RunSolution, Segment, TelemetryMetrics, UnassignedRoute, VehicleSpec, VehicleSummary,
};

pub use crate::construction::{FleetContext, VehicleSnapshot, VehicleState};

pub use crate::solver::{Solver, SolverBuilder, TelemetryMode};

pub use crate::utils::{compare_floats, EngineError, EngineResult, InfoLogger, Parallelism, Quota, TimeQuota};

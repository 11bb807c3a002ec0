use crate::config::EngineConfig;
use crate::models::common::{Cost, DateTime, Distance, Kilometers, LocationId, RouteId, VehicleId};
use serde::Serialize;
use std::collections::BTreeMap;

/// A closed set of reasons why a vehicle was rejected for a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ReasonCode {
    /// The vehicle cannot reach the route start before it begins.
    Time,
    /// Assigning the route would cross the lifetime contract ceiling.
    Lifetime,
    /// The rolling relocation window is exhausted.
    Swap,
    /// A relocation is required but no direct edge exists.
    NoPath,
    /// Reserved for hard service enforcement; not produced by the default configuration.
    ServiceBlocked,
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            ReasonCode::Time => "TIME",
            ReasonCode::Lifetime => "LIFETIME",
            ReasonCode::Swap => "SWAP",
            ReasonCode::NoPath => "NO_PATH",
            ReasonCode::ServiceBlocked => "SERVICE_BLOCKED",
        };
        write!(f, "{value}")
    }
}

/// One record per successfully assigned route.
#[derive(Clone, Debug, Serialize)]
pub struct Assignment {
    /// Assigned route id.
    pub route_id: RouteId,
    /// Executing vehicle id.
    pub vehicle_id: VehicleId,
    /// Route start time.
    pub date: DateTime,
    /// Route distance in kilometers.
    pub route_distance_km: Distance,
    /// Route start location.
    pub start_location_id: LocationId,
    /// Route end location.
    pub end_location_id: LocationId,
    /// Odometer before the route distance is applied.
    pub vehicle_km_before: Kilometers,
    /// Odometer after the route distance is applied.
    pub vehicle_km_after: Kilometers,
    /// Lease-year mileage before the route.
    pub annual_km_before: Kilometers,
    /// Lease-year mileage after the route.
    pub annual_km_after: Kilometers,
    /// Whether the vehicle had to relocate to the route start.
    pub requires_relocation: bool,
    /// Whether a service was performed before the route.
    pub requires_service: bool,
    /// Relocation fee component.
    pub relocation_cost: Cost,
    /// Overage fee accounted for this assignment: the growth of the lease-year
    /// excess across the advance.
    pub overage_cost: Cost,
    /// Scoring bias applied for an overdue service.
    pub service_penalty: Cost,
    /// Accounted cost of a performed service, zero when none was scheduled.
    pub service_cost: Cost,
    /// Immediate accounted cost: relocation + overage + performed service.
    pub total_cost: Cost,
    /// Relocation origin, when one happened.
    pub relocation_from: Option<LocationId>,
    /// Relocation destination, when one happened.
    pub relocation_to: Option<LocationId>,
    /// Relocation edge distance in kilometers.
    pub relocation_distance_km: Distance,
    /// Relocation edge driving time in hours.
    pub relocation_time_hours: f64,
    /// Kilometers beyond the annual allowance after this route.
    pub overage_km: Kilometers,
    /// Look-ahead chain score, zero when chain optimization is off.
    pub chain_score: f64,
}

/// One record per route no vehicle could serve, with the per-reason rejection histogram.
#[derive(Clone, Debug, Serialize)]
pub struct UnassignedRoute {
    /// The route id.
    pub route_id: RouteId,
    /// Route start time.
    pub date: DateTime,
    /// Rejection counts keyed by reason.
    pub reasons: BTreeMap<ReasonCode, usize>,
}

/// Final state of a vehicle at run end.
#[derive(Clone, Debug, Serialize)]
pub struct VehicleSummary {
    /// The vehicle id.
    pub vehicle_id: VehicleId,
    /// Location the vehicle ends at.
    pub final_location_id: LocationId,
    /// Final odometer reading.
    pub current_odometer_km: Kilometers,
    /// Kilometers since the last service.
    pub km_since_last_service: Kilometers,
    /// Mileage within the current lease year.
    pub km_this_lease_year: Kilometers,
    /// Cumulative mileage over the vehicle lifetime.
    pub total_lifetime_km: Kilometers,
    /// Current lease cycle, starting at 1.
    pub lease_cycle_number: u32,
    /// Last route the vehicle executed.
    pub last_route_id: Option<RouteId>,
    /// Amount of routes completed.
    pub routes_completed: usize,
    /// Amount of relocations performed.
    pub total_relocations: usize,
    /// Amount of services performed.
    pub total_service_count: usize,
    /// Accumulated relocation fees.
    pub total_relocation_cost: Cost,
    /// Accumulated overage fees.
    pub total_overage_cost: Cost,
    /// Kilometers driven beyond annual allowances, summed across lease years.
    pub total_overage_km: Kilometers,
    /// Accumulated service costs.
    pub total_service_cost: Cost,
}

/// Placement phase output: the vehicle-to-location mapping with distribution statistics.
#[derive(Clone, Debug, Serialize)]
pub struct PlacementSummary {
    /// Initial location per vehicle; every vehicle is placed exactly once.
    pub placements: BTreeMap<VehicleId, LocationId>,
    /// Demand counts per location within the analysis window.
    pub demand: BTreeMap<LocationId, usize>,
    /// Amount of distinct locations used.
    pub locations_used: usize,
    /// Largest vehicle count at a single location.
    pub max_vehicles_at_location: usize,
    /// Share of the fleet at the most loaded location.
    pub concentration_ratio: f64,
    /// Amount of vehicles placed at locations without analyzed demand.
    pub vehicles_at_zero_demand: usize,
    /// Estimated relocation cost to serve the early window from this placement.
    pub estimated_early_cost: Cost,
}

/// A progress measurement taken at a day boundary of the assignment loop.
#[derive(Clone, Debug, Serialize)]
pub struct ProgressSnapshot {
    /// Sequential day number within the run.
    pub day_count: usize,
    /// Seconds since run start.
    pub elapsed_secs: u64,
    /// Routes processed so far.
    pub routes_processed: usize,
    /// Routes assigned so far.
    pub routes_assigned: usize,
    /// Routes without a feasible vehicle so far.
    pub routes_unassigned: usize,
}

/// Execution measurements collected when the telemetry mode tracks metrics.
#[derive(Clone, Debug, Serialize)]
pub struct TelemetryMetrics {
    /// Run duration in seconds.
    pub duration_secs: u64,
    /// Amount of distinct route days processed.
    pub days_processed: usize,
    /// Speed: routes per second.
    pub speed: f64,
    /// Snapshots taken at day boundaries.
    pub progress: Vec<ProgressSnapshot>,
}

/// Aggregate figures of a finished run.
#[derive(Clone, Debug, Serialize)]
pub struct RunMetrics {
    /// Total accounted cost.
    pub total_cost: Cost,
    /// Relocation fee share.
    pub total_relocation_cost: Cost,
    /// Overage fee share.
    pub total_overage_cost: Cost,
    /// Service cost share.
    pub total_service_cost: Cost,
    /// Amount of assigned routes.
    pub routes_assigned: usize,
    /// Amount of routes without a feasible vehicle.
    pub routes_unassigned: usize,
    /// Amount of relocations across the fleet.
    pub total_relocations: usize,
    /// Amount of services across the fleet.
    pub total_services: usize,
    /// Kilometers driven beyond annual allowances across the fleet.
    pub total_overage_km: Kilometers,
    /// Unassigned route counts keyed by dominant reason.
    pub unassigned_by_reason: BTreeMap<ReasonCode, usize>,
    /// Wall-clock duration of the run in seconds.
    pub duration_secs: u64,
    /// Echo of the configuration the run used.
    pub config: EngineConfig,
}

/// A complete run output: both phase results, the assignment log and final states.
#[derive(Clone, Debug, Serialize)]
pub struct RunSolution {
    /// Placement phase output.
    pub placement: PlacementSummary,
    /// Assignment log ordered by `(route.start_time, route.id)`.
    pub assignments: Vec<Assignment>,
    /// Routes no vehicle could serve.
    pub unassigned: Vec<UnassignedRoute>,
    /// Final per-vehicle states.
    pub vehicles: Vec<VehicleSummary>,
    /// Aggregate figures.
    pub metrics: RunMetrics,
    /// Execution measurements, present when the telemetry mode tracks metrics.
    pub telemetry: Option<TelemetryMetrics>,
    /// True when the run was cancelled and the log is partial.
    pub cancelled: bool,
}

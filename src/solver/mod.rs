//! The run driver: orchestrates the placement and assignment phases, feeds
//! progress to the configured telemetry and honors cooperative cancellation.

#[cfg(test)]
#[path = "../../tests/unit/solver/solver_test.rs"]
mod solver_test;

mod telemetry;
pub use self::telemetry::{Telemetry, TelemetryMode};

use crate::config::EngineConfig;
use crate::construction::{assign_routes, calculate_placement, AssignmentLog, FleetContext};
use crate::models::common::DateTime;
use crate::models::{Fleet, ReasonCode, RelationMatrix, RoutePlan, RunMetrics, RunSolution, VehicleSummary};
use crate::utils::{EngineResult, InfoLogger, Parallelism, Quota, TimeQuota};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Executes a complete optimization run: placement, then chronological assignment.
pub struct Solver {
    matrix: RelationMatrix,
    fleet: Fleet,
    plan: RoutePlan,
    config: EngineConfig,
    parallelism: Parallelism,
    telemetry: Telemetry,
    quota: Option<Arc<dyn Quota>>,
}

/// Provides a way to configure and build a [`Solver`] instance.
pub struct SolverBuilder {
    matrix: RelationMatrix,
    fleet: Fleet,
    plan: RoutePlan,
    config: EngineConfig,
    parallelism: Parallelism,
    mode: TelemetryMode,
    quota: Option<Arc<dyn Quota>>,
}

impl SolverBuilder {
    /// Creates a new builder over the given inputs with a default configuration
    /// and no telemetry.
    pub fn new(matrix: RelationMatrix, fleet: Fleet, plan: RoutePlan) -> Self {
        Self {
            matrix,
            fleet,
            plan,
            config: EngineConfig::default(),
            parallelism: Parallelism::default(),
            mode: TelemetryMode::None,
            quota: None,
        }
    }

    /// Sets the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Enables progress logging through the given logger.
    pub fn with_logger(mut self, logger: InfoLogger) -> Self {
        self.mode = TelemetryMode::OnlyLogging { logger };
        self
    }

    /// Sets the telemetry mode.
    pub fn with_telemetry_mode(mut self, mode: TelemetryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets data parallelism settings for candidate scoring.
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Sets a cooperative cancellation quota, checked between routes.
    pub fn with_quota(mut self, quota: Arc<dyn Quota>) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Sets a hard wall-clock budget in seconds, enforced between routes.
    pub fn with_max_time(mut self, max_time_secs: f64) -> Self {
        self.quota = Some(Arc::new(TimeQuota::new(max_time_secs)));
        self
    }

    /// Validates the configuration and builds a [`Solver`].
    pub fn build(self) -> EngineResult<Solver> {
        self.config.validate()?;

        let matrix = if self.config.performance.use_relation_cache {
            self.matrix.with_cache(self.config.performance.relation_cache_size)
        } else {
            self.matrix
        };

        let telemetry = Telemetry::new(self.mode, self.config.performance.clone());

        Ok(Solver {
            matrix,
            fleet: self.fleet,
            plan: self.plan,
            config: self.config,
            parallelism: self.parallelism,
            telemetry,
            quota: self.quota,
        })
    }
}

impl Solver {
    /// Runs placement and assignment, returning the complete solution.
    /// A reached quota yields the partial log with `cancelled` set instead of an error.
    pub fn solve(mut self) -> EngineResult<RunSolution> {
        self.telemetry.on_run_start(self.fleet.size(), self.plan.size());

        let placement = calculate_placement(&self.fleet, &self.plan, &self.matrix, &self.config)?;
        self.telemetry.on_placement(&placement);

        let run_start = self.plan.start_time().unwrap_or(DateTime::UNIX_EPOCH);
        let mut ctx = FleetContext::new(&self.fleet, &placement.placements, run_start)?;

        let log = assign_routes(
            &mut ctx,
            &self.plan,
            &self.matrix,
            &self.config,
            self.parallelism,
            &mut self.telemetry,
            self.quota.as_deref(),
        )?;

        let vehicles = ctx.summaries();
        let metrics = build_metrics(&vehicles, &log, self.telemetry.duration_secs(), self.config.clone());
        self.telemetry.on_run_end(&metrics);

        Ok(RunSolution {
            placement,
            assignments: log.assignments,
            unassigned: log.unassigned,
            vehicles,
            metrics,
            telemetry: self.telemetry.build_metrics(),
            cancelled: log.cancelled,
        })
    }
}

fn build_metrics(vehicles: &[VehicleSummary], log: &AssignmentLog, duration_secs: u64, config: EngineConfig) -> RunMetrics {
    let total_relocation_cost = vehicles.iter().map(|vehicle| vehicle.total_relocation_cost).sum::<f64>();
    let total_overage_cost = vehicles.iter().map(|vehicle| vehicle.total_overage_cost).sum::<f64>();
    let total_service_cost = vehicles.iter().map(|vehicle| vehicle.total_service_cost).sum::<f64>();

    let mut unassigned_by_reason: BTreeMap<ReasonCode, usize> = BTreeMap::new();
    for route in &log.unassigned {
        if let Some(reason) = dominant_reason(route.reasons.iter().map(|(&reason, &count)| (reason, count))) {
            *unassigned_by_reason.entry(reason).or_insert(0) += 1;
        }
    }

    RunMetrics {
        total_cost: total_relocation_cost + total_overage_cost + total_service_cost,
        total_relocation_cost,
        total_overage_cost,
        total_service_cost,
        routes_assigned: log.assignments.len(),
        routes_unassigned: log.unassigned.len(),
        total_relocations: vehicles.iter().map(|vehicle| vehicle.total_relocations).sum(),
        total_services: vehicles.iter().map(|vehicle| vehicle.total_service_count).sum(),
        total_overage_km: vehicles.iter().map(|vehicle| vehicle.total_overage_km).sum(),
        unassigned_by_reason,
        duration_secs,
        config,
    }
}

/// Picks the most frequent rejection reason; ties resolve to the earliest code.
fn dominant_reason(reasons: impl Iterator<Item = (ReasonCode, usize)>) -> Option<ReasonCode> {
    reasons.fold(None, |best, (reason, count)| match best {
        Some((_, known)) if known >= count => best,
        _ => Some((reason, count)),
    })
    .map(|(reason, _)| reason)
}

//! An explicit engine configuration with the recognized options and their defaults.
//!
//! Unknown keys in deserialized configuration are an error.

#[cfg(test)]
#[path = "../tests/unit/config_test.rs"]
mod config_test;

use crate::models::common::{Cost, Kilometers};
use crate::utils::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// Selects the placement strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStrategy {
    /// Demand-proportional distribution with a concentration cap.
    #[default]
    Proportional,
    /// Greedy assignment over a vehicle-location cost matrix.
    CostMatrix,
}

/// Placement phase options.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PlacementConfig {
    /// Placement strategy.
    pub strategy: PlacementStrategy,
    /// Demand analysis window in days.
    pub lookahead_days: i64,
    /// Maximum fraction of the fleet allowed at one location.
    pub max_concentration: f64,
    /// Hard per-location cap; `None` derives it from `max_concentration`.
    pub max_vehicles_per_location: Option<usize>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self { strategy: PlacementStrategy::default(), lookahead_days: 14, max_concentration: 0.30, max_vehicles_per_location: None }
    }
}

/// Assignment phase options.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AssignmentConfig {
    /// Horizon of routes to assign in days, zero meaning all.
    pub assignment_lookahead_days: i64,
    /// Chain scan window in days for look-ahead scoring.
    pub look_ahead_days: i64,
    /// Maximum chain length for look-ahead scoring.
    pub chain_depth: usize,
    /// Weight combining the chain score with the immediate cost.
    pub chain_weight: f64,
    /// Maximum future routes scanned per candidate.
    pub max_lookahead_routes: usize,
    /// Enables chain look-ahead scoring.
    pub use_chain_optimization: bool,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            assignment_lookahead_days: 0,
            look_ahead_days: 7,
            chain_depth: 3,
            chain_weight: 10.,
            max_lookahead_routes: 50,
            use_chain_optimization: false,
        }
    }
}

/// Rolling relocation window policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SwapPolicyConfig {
    /// Maximum relocations within the rolling window.
    pub max_swaps_per_period: usize,
    /// Length of the rolling window in days.
    pub swap_period_days: i64,
}

impl Default for SwapPolicyConfig {
    fn default() -> Self {
        Self { max_swaps_per_period: 1, swap_period_days: 90 }
    }
}

/// Service scheduling policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServicePolicyConfig {
    /// Allowed slack beyond the service interval in kilometers.
    pub service_tolerance_km: Kilometers,
    /// Service downtime in hours.
    pub service_duration_hours: i64,
    /// Scoring bias applied to candidates due for service.
    pub service_penalty_pln: Cost,
    /// Accounted cost of a performed service.
    pub service_cost_pln: Cost,
}

impl Default for ServicePolicyConfig {
    fn default() -> Self {
        Self { service_tolerance_km: 1000, service_duration_hours: 48, service_penalty_pln: 500., service_cost_pln: 1500. }
    }
}

/// Relocation and overage fee schedule.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CostConfig {
    /// Flat fee per relocation.
    pub relocation_base_cost_pln: Cost,
    /// Relocation fee per kilometer.
    pub relocation_per_km_pln: Cost,
    /// Relocation fee per driving hour.
    pub relocation_per_hour_pln: Cost,
    /// Fee per kilometer beyond the annual allowance.
    pub overage_per_km_pln: Cost,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            relocation_base_cost_pln: 1000.,
            relocation_per_km_pln: 1.,
            relocation_per_hour_pln: 150.,
            overage_per_km_pln: 0.92,
        }
    }
}

/// Reporting and caching options.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PerformanceConfig {
    /// Emit a progress event every that many processed days.
    pub progress_report_days: usize,
    /// Emit a progress event every that many processed routes.
    pub progress_report_interval: usize,
    /// Enables the bounded relation lookup cache.
    pub use_relation_cache: bool,
    /// Capacity of the relation lookup cache.
    pub relation_cache_size: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self { progress_report_days: 30, progress_report_interval: 1000, use_relation_cache: false, relation_cache_size: 10_000 }
    }
}

/// The complete engine configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EngineConfig {
    /// Placement phase options.
    pub placement: PlacementConfig,
    /// Assignment phase options.
    pub assignment: AssignmentConfig,
    /// Rolling relocation window policy.
    pub swap_policy: SwapPolicyConfig,
    /// Service scheduling policy.
    pub service_policy: ServicePolicyConfig,
    /// Relocation and overage fee schedule.
    pub costs: CostConfig,
    /// Reporting and caching options.
    pub performance: PerformanceConfig,
}

impl EngineConfig {
    /// Reads configuration from a json reader, rejecting unknown keys.
    pub fn read<R: std::io::Read>(reader: R) -> EngineResult<Self> {
        let config: Self = serde_json::from_reader(reader)
            .map_err(|err| EngineError::InvalidInput(format!("cannot deserialize config: {err}")))?;
        config.validate()?;

        Ok(config)
    }

    /// Checks option values for consistency.
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.placement.max_concentration > 0. && self.placement.max_concentration <= 1.) {
            return Err(EngineError::InvalidInput(format!(
                "placement.max_concentration must be in (0, 1], got {}",
                self.placement.max_concentration
            )));
        }
        if self.placement.lookahead_days < 0 {
            return Err(EngineError::InvalidInput("placement.lookahead_days must be non-negative".to_string()));
        }
        if self.assignment.assignment_lookahead_days < 0 {
            return Err(EngineError::InvalidInput(
                "assignment.assignment_lookahead_days must be non-negative".to_string(),
            ));
        }
        if self.swap_policy.swap_period_days <= 0 {
            return Err(EngineError::InvalidInput("swap_policy.swap_period_days must be positive".to_string()));
        }
        if self.performance.use_relation_cache && self.performance.relation_cache_size == 0 {
            return Err(EngineError::InvalidInput(
                "performance.relation_cache_size must be positive when the cache is enabled".to_string(),
            ));
        }

        Ok(())
    }
}

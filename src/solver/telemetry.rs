//! A module which provides the logic to report engine progress and collect run metrics.

use crate::config::PerformanceConfig;
use crate::models::common::format_time;
use crate::models::{PlacementSummary, ProgressSnapshot, Route, RunMetrics, TelemetryMetrics};
use crate::utils::{InfoLogger, Timer};
use time::Date;

/// Specifies a telemetry mode.
#[derive(Clone)]
pub enum TelemetryMode {
    /// No telemetry at all.
    None,
    /// Only progress logging through the given logger.
    OnlyLogging {
        /// A logger type.
        logger: InfoLogger,
    },
    /// Only execution metrics collection.
    OnlyMetrics,
    /// Both logging and metrics collection.
    All {
        /// A logger type.
        logger: InfoLogger,
    },
}

/// Tracks run progress, emits events at configured route and day cadences and,
/// depending on the mode, collects execution measurements.
pub struct Telemetry {
    mode: TelemetryMode,
    performance: PerformanceConfig,
    timer: Timer,
    current_day: Option<Date>,
    day_count: usize,
    processed: usize,
    assigned: usize,
    unassigned: usize,
    progress: Vec<ProgressSnapshot>,
}

impl Telemetry {
    /// Creates a new instance of `Telemetry`.
    pub fn new(mode: TelemetryMode, performance: PerformanceConfig) -> Self {
        Self {
            mode,
            performance,
            timer: Timer::start(),
            current_day: None,
            day_count: 0,
            processed: 0,
            assigned: 0,
            unassigned: 0,
            progress: Vec::new(),
        }
    }

    /// Reports a run start, resetting the wall clock.
    pub fn on_run_start(&mut self, vehicles: usize, routes: usize) {
        self.timer = Timer::start();
        self.log(format!("starting run: {vehicles} vehicles, {routes} routes").as_str());
    }

    /// Reports the placement phase outcome.
    pub fn on_placement(&mut self, placement: &PlacementSummary) {
        self.log(
            format!(
                "placement: {} vehicles over {} locations, max {} at one ({:.1}%), estimated early cost {:.2}",
                placement.placements.len(),
                placement.locations_used,
                placement.max_vehicles_at_location,
                placement.concentration_ratio * 100.,
                placement.estimated_early_cost
            )
            .as_str(),
        );
    }

    /// Reports a route entering the assignment loop, emitting progress lines at the
    /// configured route interval and day boundaries, and taking a metrics snapshot
    /// at each day boundary.
    pub fn on_route(&mut self, route: &Route) {
        self.processed += 1;

        let day = route.start_time.date();
        if self.current_day != Some(day) {
            self.current_day = Some(day);
            self.day_count += 1;

            if self.tracks_metrics() {
                self.progress.push(ProgressSnapshot {
                    day_count: self.day_count,
                    elapsed_secs: self.timer.elapsed_secs(),
                    routes_processed: self.processed,
                    routes_assigned: self.assigned,
                    routes_unassigned: self.unassigned,
                });
            }

            let cadence = self.performance.progress_report_days;
            if cadence > 0 && self.day_count % cadence == 0 {
                self.log(format!("progress: day {} ({day}), {} routes assigned", self.day_count, self.assigned).as_str());
            }
        }

        let interval = self.performance.progress_report_interval;
        if interval > 0 && self.processed % interval == 0 {
            self.log(format!("progress: {} routes processed, {} assigned", self.processed, self.assigned).as_str());
        }
    }

    /// Reports a successful assignment.
    pub fn on_assigned(&mut self) {
        self.assigned += 1;
    }

    /// Reports a route no vehicle can serve.
    pub fn on_unassigned(&mut self, route: &Route) {
        self.unassigned += 1;
        self.log(format!("no feasible vehicle for route {} at {}", route.id, format_time(route.start_time)).as_str());
    }

    /// Reports a cancelled run.
    pub fn on_cancelled(&mut self) {
        self.log(format!("run cancelled after {} routes", self.processed).as_str());
    }

    /// Reports the final aggregate figures.
    pub fn on_run_end(&mut self, metrics: &RunMetrics) {
        self.log(
            format!(
                "run completed in {}s: {} assigned, {} unassigned, total cost {:.2} (relocation {:.2}, overage {:.2}, service {:.2})",
                metrics.duration_secs,
                metrics.routes_assigned,
                metrics.routes_unassigned,
                metrics.total_cost,
                metrics.total_relocation_cost,
                metrics.total_overage_cost,
                metrics.total_service_cost
            )
            .as_str(),
        );
    }

    /// Returns collected execution measurements, `None` unless the mode tracks metrics.
    pub fn build_metrics(&self) -> Option<TelemetryMetrics> {
        if !self.tracks_metrics() {
            return None;
        }

        let elapsed = self.timer.elapsed_secs_as_f64();
        Some(TelemetryMetrics {
            duration_secs: self.timer.elapsed_secs(),
            days_processed: self.day_count,
            speed: if elapsed > 0. { self.processed as f64 / elapsed } else { 0. },
            progress: self.progress.clone(),
        })
    }

    /// Returns elapsed run duration in seconds.
    pub fn duration_secs(&self) -> u64 {
        self.timer.elapsed_secs()
    }

    fn tracks_metrics(&self) -> bool {
        matches!(self.mode, TelemetryMode::OnlyMetrics | TelemetryMode::All { .. })
    }

    fn log(&self, message: &str) {
        match &self.mode {
            TelemetryMode::OnlyLogging { logger } | TelemetryMode::All { logger } => (logger)(message),
            TelemetryMode::None | TelemetryMode::OnlyMetrics => {}
        }
    }
}

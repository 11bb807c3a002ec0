#[cfg(test)]
#[path = "../../tests/unit/construction/context_test.rs"]
mod context_test;

use crate::config::EngineConfig;
use crate::construction::costs;
use crate::models::common::{
    add_lease_year, days, hours, round_km, Cost, DateTime, Kilometers, LocationId, RouteId, VehicleId,
};
use crate::models::{Fleet, Relation, RelationMatrix, Route, VehicleSpec, VehicleSummary};
use crate::utils::{EngineError, EngineResult};
use hashbrown::HashMap;
use std::collections::{BTreeMap, VecDeque};

/// A relocation performed at some point of the run, kept within the rolling swap window.
#[derive(Clone, Debug)]
pub struct RelocationEvent {
    /// When the relocation happened.
    pub time: DateTime,
    /// Origin location.
    pub from: LocationId,
    /// Destination location.
    pub to: LocationId,
}

/// Mutable runtime record of a single vehicle. All mutations flow through
/// [`FleetContext::advance`], which is the transactional unit of assignment.
#[derive(Clone, Debug)]
pub struct VehicleState {
    /// The vehicle id.
    pub vehicle_id: VehicleId,
    /// Where the vehicle currently idles.
    pub current_location_id: LocationId,
    /// Current odometer reading.
    pub current_odometer_km: Kilometers,
    /// Kilometers accumulated since the last service.
    pub km_since_last_service: Kilometers,
    /// Kilometers accumulated within the current lease year.
    pub km_this_lease_year: Kilometers,
    /// Cumulative lifetime kilometers.
    pub total_lifetime_km: Kilometers,
    /// Moment from which the vehicle can take work.
    pub available_from: DateTime,
    /// Last executed route.
    pub last_route_id: Option<RouteId>,
    /// Current lease cycle, starting at 1.
    pub lease_cycle_number: u32,
    /// Start of the current lease year.
    pub lease_start_date: DateTime,
    /// End of the current lease year.
    pub lease_end_date: DateTime,
    /// Cached annual allowance.
    pub annual_limit_km: Kilometers,
    /// Cached service interval.
    pub service_interval_km: Kilometers,
    /// Cached lifetime ceiling, if the contract has one.
    pub total_contract_limit_km: Option<Kilometers>,
    /// Relocations within the rolling swap window, oldest first.
    pub relocations: VecDeque<RelocationEvent>,
    /// Amount of routes completed.
    pub routes_completed: usize,
    /// Amount of relocations performed.
    pub total_relocations: usize,
    /// Amount of services performed.
    pub total_service_count: usize,
    /// Accumulated service costs.
    pub total_service_cost: Cost,
    /// Accumulated relocation fees.
    pub total_relocation_cost: Cost,
    /// Accumulated overage fees.
    pub total_overage_cost: Cost,
    /// Kilometers beyond annual allowances, summed across lease years.
    pub total_overage_km: Kilometers,
}

impl VehicleState {
    fn new(spec: &VehicleSpec, location: LocationId, available_from: DateTime) -> Self {
        Self {
            vehicle_id: spec.id,
            current_location_id: location,
            current_odometer_km: spec.current_odometer_km,
            km_since_last_service: 0,
            km_this_lease_year: 0,
            total_lifetime_km: spec.current_odometer_km,
            available_from,
            last_route_id: None,
            lease_cycle_number: 1,
            lease_start_date: spec.lease_start_date,
            lease_end_date: spec.lease_end_date,
            annual_limit_km: spec.annual_limit_km(),
            service_interval_km: spec.service_interval_km,
            total_contract_limit_km: spec.total_contract_limit_km(),
            relocations: VecDeque::new(),
            routes_completed: 0,
            total_relocations: 0,
            total_service_count: 0,
            total_service_cost: 0.,
            total_relocation_cost: 0.,
            total_overage_cost: 0.,
            total_overage_km: 0,
        }
    }

    /// Counts relocations within the trailing window `[until - period, until)`.
    pub fn swaps_within(&self, until: DateTime, period_days: i64) -> usize {
        let cutoff = until - days(period_days);
        self.relocations.iter().filter(|event| event.time >= cutoff && event.time < until).count()
    }

    fn roll_lease_cycles(&mut self, now: DateTime) {
        while now >= self.lease_end_date {
            self.lease_start_date = add_lease_year(self.lease_start_date);
            self.lease_end_date = add_lease_year(self.lease_end_date);
            self.km_this_lease_year = 0;
            self.lease_cycle_number += 1;
        }
    }

    fn summarize(&self) -> VehicleSummary {
        VehicleSummary {
            vehicle_id: self.vehicle_id,
            final_location_id: self.current_location_id,
            current_odometer_km: self.current_odometer_km,
            km_since_last_service: self.km_since_last_service,
            km_this_lease_year: self.km_this_lease_year,
            total_lifetime_km: self.total_lifetime_km,
            lease_cycle_number: self.lease_cycle_number,
            last_route_id: self.last_route_id,
            routes_completed: self.routes_completed,
            total_relocations: self.total_relocations,
            total_service_count: self.total_service_count,
            total_relocation_cost: self.total_relocation_cost,
            total_overage_cost: self.total_overage_cost,
            total_overage_km: self.total_overage_km,
            total_service_cost: self.total_service_cost,
        }
    }
}

/// A cheap read-only view of a vehicle used by the cost and feasibility kernels.
/// The lease roll is applied and the swap window pre-counted, so scoring never mutates.
#[derive(Clone, Copy, Debug)]
pub struct VehicleSnapshot {
    /// The vehicle id.
    pub vehicle_id: VehicleId,
    /// Where the vehicle currently idles.
    pub location_id: LocationId,
    /// Moment from which the vehicle can take work.
    pub available_from: DateTime,
    /// Kilometers since the last service.
    pub km_since_last_service: Kilometers,
    /// Lease-year kilometers with the lease roll applied.
    pub km_this_lease_year: Kilometers,
    /// Cumulative lifetime kilometers.
    pub total_lifetime_km: Kilometers,
    /// Annual allowance.
    pub annual_limit_km: Kilometers,
    /// Service interval.
    pub service_interval_km: Kilometers,
    /// Lifetime ceiling, if any.
    pub total_contract_limit_km: Option<Kilometers>,
    /// Relocations already inside the rolling window at route start.
    pub swaps_in_window: usize,
}

/// What a single `advance` did to the vehicle, used to build the assignment record.
#[derive(Clone, Debug)]
pub struct AdvanceOutcome {
    /// Whether a service was performed before departure.
    pub serviced: bool,
    /// Accounted service cost, zero when no service was performed.
    pub service_cost: Cost,
    /// The traversed relocation edge, when one was needed.
    pub relocation: Option<(LocationId, LocationId, Relation)>,
    /// Relocation fee, zero when no relocation happened.
    pub relocation_cost: Cost,
    /// Accounted overage fee of this advance.
    pub overage_cost: Cost,
    /// Kilometers beyond the annual allowance after the route.
    pub overage_km: Kilometers,
    /// Odometer before the route distance was applied.
    pub vehicle_km_before: Kilometers,
    /// Odometer after the route distance was applied.
    pub vehicle_km_after: Kilometers,
    /// Lease-year kilometers before the route distance was applied.
    pub annual_km_before: Kilometers,
    /// Lease-year kilometers after the route distance was applied.
    pub annual_km_after: Kilometers,
}

impl AdvanceOutcome {
    /// Immediate accounted cost of the advance: relocation, overage and performed service.
    pub fn accounted_cost(&self) -> Cost {
        self.relocation_cost + self.overage_cost + self.service_cost
    }
}

/// Owns all vehicle states of a run, keyed by vehicle id.
pub struct FleetContext {
    states: HashMap<VehicleId, VehicleState>,
    vehicle_ids: Vec<VehicleId>,
}

impl FleetContext {
    /// Creates runtime states for the whole fleet from the placement mapping.
    /// Vehicles become available 24 hours before the run start to allow initial relocations.
    pub fn new(fleet: &Fleet, placements: &BTreeMap<VehicleId, LocationId>, run_start: DateTime) -> EngineResult<Self> {
        let available_from = run_start - hours(24.);

        let mut states = HashMap::with_capacity(fleet.size());
        let mut vehicle_ids = Vec::with_capacity(fleet.size());

        for spec in fleet.vehicles() {
            let location = placements
                .get(&spec.id)
                .copied()
                .ok_or_else(|| EngineError::Internal(format!("vehicle {} is missing from placement", spec.id)))?;
            states.insert(spec.id, VehicleState::new(spec, location, available_from));
            vehicle_ids.push(spec.id);
        }

        Ok(Self { states, vehicle_ids })
    }

    /// Returns vehicle ids in ascending order.
    pub fn vehicle_ids(&self) -> &[VehicleId] {
        &self.vehicle_ids
    }

    /// Returns the state of a vehicle.
    pub fn state(&self, vehicle: VehicleId) -> Option<&VehicleState> {
        self.states.get(&vehicle)
    }

    /// Returns a scoring snapshot of the vehicle as of the route start: the lease
    /// cycle is rolled forward on a shadow copy and the swap window pre-counted.
    pub fn snapshot_for_scoring(&self, vehicle: VehicleId, route: &Route, config: &EngineConfig) -> Option<VehicleSnapshot> {
        let state = self.states.get(&vehicle)?;

        let mut km_this_lease_year = state.km_this_lease_year;
        let mut lease_end = state.lease_end_date;
        while route.start_time >= lease_end {
            lease_end = add_lease_year(lease_end);
            km_this_lease_year = 0;
        }

        Some(VehicleSnapshot {
            vehicle_id: state.vehicle_id,
            location_id: state.current_location_id,
            available_from: state.available_from,
            km_since_last_service: state.km_since_last_service,
            km_this_lease_year,
            total_lifetime_km: state.total_lifetime_km,
            annual_limit_km: state.annual_limit_km,
            service_interval_km: state.service_interval_km,
            total_contract_limit_km: state.total_contract_limit_km,
            swaps_in_window: state.swaps_within(route.start_time, config.swap_policy.swap_period_days),
        })
    }

    /// The sole commit path of an assignment: rolls lease cycles, performs a due
    /// service, traverses the relocation edge, applies mileage, moves the vehicle
    /// and accumulates monetary totals.
    pub fn advance(
        &mut self,
        vehicle: VehicleId,
        route: &Route,
        matrix: &RelationMatrix,
        config: &EngineConfig,
    ) -> EngineResult<AdvanceOutcome> {
        let (start, end) = route
            .endpoints()
            .ok_or_else(|| EngineError::Internal(format!("route {} has no segments", route.id)))?;
        let state = self
            .states
            .get_mut(&vehicle)
            .ok_or_else(|| EngineError::Internal(format!("unknown vehicle: {vehicle}")))?;

        state.roll_lease_cycles(route.start_time);

        let distance = round_km(route.distance_km);
        let annual_excess_pre = (state.km_this_lease_year - state.annual_limit_km).max(0);

        let serviced =
            state.km_since_last_service + distance > state.service_interval_km + config.service_policy.service_tolerance_km;
        let service_cost = if serviced {
            state.km_since_last_service = 0;
            state.available_from += hours(config.service_policy.service_duration_hours as f64);
            state.total_service_count += 1;
            state.total_service_cost += config.service_policy.service_cost_pln;
            config.service_policy.service_cost_pln
        } else {
            0.
        };

        let mut relocation = None;
        let mut relocation_cost = 0.;
        if state.current_location_id != start {
            let from = state.current_location_id;
            let edge = matrix.relation(from, start).ok_or_else(|| {
                EngineError::Internal(format!("vehicle {vehicle}: no relation from {from} to {start} on route {}", route.id))
            })?;

            relocation_cost = costs::relocation_cost(&edge, config);
            state.relocations.push_back(RelocationEvent { time: route.start_time, from, to: start });
            state.total_relocations += 1;
            state.total_relocation_cost += relocation_cost;

            let relocation_km = round_km(edge.distance_km);
            state.current_odometer_km += relocation_km;
            state.km_this_lease_year += relocation_km;
            state.total_lifetime_km += relocation_km;
            state.km_since_last_service += relocation_km;

            relocation = Some((from, start, edge));
        }

        let vehicle_km_before = state.current_odometer_km;
        let annual_km_before = state.km_this_lease_year;

        state.current_odometer_km += distance;
        state.km_this_lease_year += distance;
        state.total_lifetime_km += distance;
        state.km_since_last_service += distance;

        let annual_excess_post = (state.km_this_lease_year - state.annual_limit_km).max(0);
        let overage_cost = (annual_excess_post - annual_excess_pre) as f64 * config.costs.overage_per_km_pln;
        state.total_overage_cost += overage_cost;
        state.total_overage_km += annual_excess_post - annual_excess_pre;

        state.current_location_id = end;
        state.available_from = route.end_time;
        state.last_route_id = Some(route.id);
        state.routes_completed += 1;

        if let Some(limit) = state.total_contract_limit_km {
            if state.total_lifetime_km > limit {
                return Err(EngineError::Internal(format!(
                    "vehicle {vehicle} crossed its lifetime limit on route {}: {} > {limit}; state: {state:?}",
                    route.id, state.total_lifetime_km
                )));
            }
        }

        Ok(AdvanceOutcome {
            serviced,
            service_cost,
            relocation,
            relocation_cost,
            overage_cost,
            overage_km: annual_excess_post,
            vehicle_km_before,
            vehicle_km_after: state.current_odometer_km,
            annual_km_before,
            annual_km_after: state.km_this_lease_year,
        })
    }

    /// Discards relocations which left the rolling swap window. Runs after each advance.
    pub fn prune_swap_window(&mut self, vehicle: VehicleId, now: DateTime, config: &EngineConfig) {
        if let Some(state) = self.states.get_mut(&vehicle) {
            let cutoff = now - days(config.swap_policy.swap_period_days);
            while state.relocations.front().is_some_and(|event| event.time < cutoff) {
                state.relocations.pop_front();
            }
        }
    }

    /// Returns final per-vehicle summaries ordered by vehicle id.
    pub fn summaries(&self) -> Vec<VehicleSummary> {
        self.vehicle_ids.iter().filter_map(|id| self.states.get(id)).map(VehicleState::summarize).collect()
    }
}

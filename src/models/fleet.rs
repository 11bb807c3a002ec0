#[cfg(test)]
#[path = "../../tests/unit/models/fleet_test.rs"]
mod fleet_test;

use crate::models::common::{DateTime, Kilometers, LocationId, VehicleId};
use crate::utils::{EngineError, EngineResult};
use hashbrown::HashMap;
use std::sync::Arc;

/// Leasing limits above this threshold describe a lifetime contract ceiling,
/// values at or below it describe an annual allowance.
pub const LIFETIME_LIMIT_THRESHOLD_KM: Kilometers = 200_000;

/// Annual allowance assumed for vehicles whose contract carries a lifetime limit.
pub const DEFAULT_ANNUAL_LIMIT_KM: Kilometers = 150_000;

/// Represents an immutable vehicle definition with its leasing contract.
#[derive(Clone, Debug)]
pub struct VehicleSpec {
    /// An unique vehicle id.
    pub id: VehicleId,
    /// Registration plate.
    pub registration: String,
    /// Vehicle brand.
    pub brand: String,
    /// Kilometers between mandated services.
    pub service_interval_km: Kilometers,
    /// Odometer value at lease start.
    pub leasing_start_km: Kilometers,
    /// Leasing limit, annual or lifetime depending on magnitude.
    pub leasing_limit_km: Kilometers,
    /// Start of the current lease year.
    pub lease_start_date: DateTime,
    /// End of the current lease year.
    pub lease_end_date: DateTime,
    /// Current odometer reading.
    pub current_odometer_km: Kilometers,
    /// Known initial location; `None` means the placement phase decides.
    pub current_location_id: Option<LocationId>,
}

impl VehicleSpec {
    /// Checks whether the leasing limit describes a lifetime contract ceiling.
    pub fn has_lifetime_limit(&self) -> bool {
        self.leasing_limit_km > LIFETIME_LIMIT_THRESHOLD_KM
    }

    /// Returns the annual mileage allowance.
    pub fn annual_limit_km(&self) -> Kilometers {
        if self.has_lifetime_limit() {
            DEFAULT_ANNUAL_LIMIT_KM
        } else {
            self.leasing_limit_km
        }
    }

    /// Returns the lifetime contract ceiling, if the contract has one.
    pub fn total_contract_limit_km(&self) -> Option<Kilometers> {
        if self.has_lifetime_limit() {
            Some(self.leasing_limit_km)
        } else {
            None
        }
    }
}

/// Represents all vehicles available to serve routes.
pub struct Fleet {
    vehicles: Vec<Arc<VehicleSpec>>,
    index: HashMap<VehicleId, Arc<VehicleSpec>>,
}

impl Fleet {
    /// Creates a new `Fleet`, ordering vehicles by id for deterministic iteration.
    pub fn new(vehicles: Vec<VehicleSpec>) -> EngineResult<Self> {
        let mut vehicles: Vec<_> = vehicles.into_iter().map(Arc::new).collect();
        vehicles.sort_by_key(|vehicle| vehicle.id);

        let mut index = HashMap::with_capacity(vehicles.len());
        for vehicle in &vehicles {
            if index.insert(vehicle.id, vehicle.clone()).is_some() {
                return Err(EngineError::InvalidInput(format!("duplicate vehicle id: {}", vehicle.id)));
            }
        }

        Ok(Self { vehicles, index })
    }

    /// Returns all vehicles ordered by id.
    pub fn vehicles(&self) -> &[Arc<VehicleSpec>] {
        &self.vehicles
    }

    /// Returns a vehicle by its id.
    pub fn vehicle(&self, id: VehicleId) -> Option<&Arc<VehicleSpec>> {
        self.index.get(&id)
    }

    /// Returns fleet size.
    pub fn size(&self) -> usize {
        self.vehicles.len()
    }
}

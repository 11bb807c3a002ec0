#[cfg(test)]
#[path = "../../tests/unit/models/network_test.rs"]
mod network_test;

use crate::models::common::{Distance, LocationId};
use crate::utils::{EngineError, EngineResult};
use hashbrown::HashMap;
use std::sync::RwLock;

/// Represents a geographic location known to the engine.
#[derive(Clone, Debug)]
pub struct Location {
    /// An unique location id.
    pub id: LocationId,
    /// A human readable name.
    pub name: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Whether the location is a fleet base.
    pub is_hub: bool,
}

/// Represents a directed relocation edge between two locations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Relation {
    /// Driving distance in kilometers.
    pub distance_km: Distance,
    /// Driving time in hours.
    pub time_hours: f64,
}

impl Relation {
    /// A zero-cost relation used for identity lookups.
    pub const ZERO: Relation = Relation { distance_km: 0., time_hours: 0. };
}

/// Indexes the location-relation edges for O(1) lookup of `(from, to)` pairs.
///
/// The graph is directional and no symmetric closure is assumed: absence of an
/// edge means there is no direct relocation path between the two locations.
pub struct RelationMatrix {
    locations: Vec<Location>,
    index: HashMap<LocationId, usize>,
    relations: HashMap<(LocationId, LocationId), Relation>,
    cache: Option<RelationCache>,
}

impl RelationMatrix {
    /// Creates a new `RelationMatrix` from locations and directed edges.
    /// Edges referring to unknown locations or carrying negative values are rejected.
    pub fn new(
        locations: Vec<Location>,
        relations: Vec<(LocationId, LocationId, Relation)>,
    ) -> EngineResult<Self> {
        let mut index = HashMap::with_capacity(locations.len());
        for (position, location) in locations.iter().enumerate() {
            if index.insert(location.id, position).is_some() {
                return Err(EngineError::InvalidInput(format!("duplicate location id: {}", location.id)));
            }
        }

        let mut edges = HashMap::with_capacity(relations.len());
        for (from, to, relation) in relations {
            if !index.contains_key(&from) || !index.contains_key(&to) {
                return Err(EngineError::InvalidInput(format!("relation ({from}, {to}) refers to unknown location")));
            }
            if relation.distance_km < 0. || relation.time_hours < 0. {
                return Err(EngineError::InvalidInput(format!("relation ({from}, {to}) has negative distance or time")));
            }
            edges.insert((from, to), relation);
        }

        Ok(Self { locations, index, relations: edges, cache: None })
    }

    /// Enables a bounded LRU cache in front of relation lookups.
    /// The cache is a performance aid only: lookups behave identically with it on or off.
    pub fn with_cache(mut self, capacity: usize) -> Self {
        self.cache = if capacity > 0 { Some(RelationCache::new(capacity)) } else { None };
        self
    }

    /// Returns the direct relation between two locations, if any.
    /// An identity pair resolves to [`Relation::ZERO`] without requiring an edge row.
    pub fn relation(&self, from: LocationId, to: LocationId) -> Option<Relation> {
        if from == to {
            return Some(Relation::ZERO);
        }

        match self.cache.as_ref() {
            Some(cache) => cache.get_or_insert((from, to), || self.relations.get(&(from, to)).copied()),
            None => self.relations.get(&(from, to)).copied(),
        }
    }

    /// Checks whether the location id is known.
    pub fn contains(&self, location: LocationId) -> bool {
        self.index.contains_key(&location)
    }

    /// Returns all locations in input order.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Returns the first hub in input order, falling back to the first location.
    pub fn first_hub(&self) -> Option<&Location> {
        self.locations.iter().find(|location| location.is_hub).or_else(|| self.locations.first())
    }

    /// Returns amount of directed edges.
    pub fn size(&self) -> usize {
        self.relations.len()
    }
}

type CacheKey = (LocationId, LocationId);

struct CacheState {
    entries: HashMap<CacheKey, (u64, Option<Relation>)>,
    clock: u64,
}

/// A bounded relation lookup cache with least-recently-used eviction.
pub struct RelationCache {
    capacity: usize,
    state: RwLock<CacheState>,
}

impl RelationCache {
    /// Creates a new cache with the given non-zero capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: RwLock::new(CacheState { entries: HashMap::with_capacity(capacity.max(1)), clock: 0 }),
        }
    }

    /// Returns a cached value or computes, stores and returns it.
    /// Misses evict the least recently used entry once capacity is reached.
    pub fn get_or_insert<F>(&self, key: CacheKey, compute: F) -> Option<Relation>
    where
        F: FnOnce() -> Option<Relation>,
    {
        let mut state = match self.state.write() {
            Ok(state) => state,
            // a poisoned cache falls back to the underlying lookup
            Err(_) => return compute(),
        };

        state.clock += 1;
        let stamp = state.clock;

        if let Some((used_at, value)) = state.entries.get_mut(&key) {
            *used_at = stamp;
            return *value;
        }

        let value = compute();

        if state.entries.len() >= self.capacity {
            let oldest = state.entries.iter().min_by_key(|(_, entry)| entry.0).map(|(key, _)| *key);
            if let Some(oldest) = oldest {
                state.entries.remove(&oldest);
            }
        }
        state.entries.insert(key, (stamp, value));

        value
    }

    /// Returns amount of cached entries.
    pub fn len(&self) -> usize {
        self.state.read().map(|state| state.entries.len()).unwrap_or(0)
    }

    /// Checks whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

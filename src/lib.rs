//! A crate which implements a two-phase optimization engine for a leased truck fleet:
//! given a fixed set of vehicles, a directed graph of locations with relocation costs,
//! and a long stream of dated delivery routes, it decides where each vehicle should
//! start (*placement*) and which vehicle executes each route (*assignment*).
//!
//! The objective is to minimize monetary cost composed of inter-location relocation
//! fees, mileage-overage penalties against annual leasing limits, and service-interval
//! penalties, while respecting hard contract constraints: lifetime mileage ceilings,
//! time feasibility and a rolling relocation (swap) window.
//!
//! # Key points
//!
//! The crate is a pure engine: it consumes already-parsed entities (locations,
//! relations, vehicles, routes) and emits record structs. Ingestion (CSV/JSON/HTTP)
//! and report formatting are left to external collaborators.
//!
//! Model definitions are split into the following groups:
//!
//! - [`models`] contains input entities, the relation matrix and output records
//! - [`construction`] contains the placement and assignment heuristics together
//!   with the runtime vehicle state they mutate
//! - [`solver`] contains the run driver which orchestrates both phases and reports
//!   progress
//!
//! # Examples
//!
//! The simplest way to run the engine is through the [`solver::SolverBuilder`]:
//!
//! ```ignore
//! use fleet_core::prelude::*;
//!
//! let solution = SolverBuilder::new(matrix, fleet, plan)
//!     .with_config(EngineConfig::default())
//!     .build()?
//!     .solve()?;
//!
//! for assignment in &solution.assignments {
//!     println!("route {} -> vehicle {}", assignment.route_id, assignment.vehicle_id);
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

#[cfg(test)]
#[path = "../tests/helpers/mod.rs"]
mod helpers;

pub mod config;
pub mod construction;
pub mod models;
pub mod prelude;
pub mod solver;
pub mod utils;

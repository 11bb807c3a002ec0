//! Contains the placement and assignment heuristics together with the runtime
//! vehicle state they mutate.

mod context;
pub use self::context::{AdvanceOutcome, FleetContext, RelocationEvent, VehicleSnapshot, VehicleState};

mod costs;
pub use self::costs::{assignment_cost, overage_cost, relocation_cost, service_penalty, CostBreakdown};

mod feasibility;
pub use self::feasibility::{check_lifetime, check_swap, check_time, evaluate};

mod placement;
pub use self::placement::{analyze_demand, calculate_placement};

mod lookahead;
pub use self::lookahead::chain_score;

mod assignment;
pub use self::assignment::{assign_routes, AssignmentLog};

//! Service layer: the coach-facing planner and the live display runtime.

pub mod live;
pub mod planner;

pub use live::LiveService;
pub use planner::PlannerSession;

//! Role agents for trip planning
//!
//! A role agent is a persona (role, goal, backstory) plus the capabilities
//! it advertises. Each one renders a task into a prompt and asks the
//! completion gateway for exactly one piece of the plan.

pub mod loader;
pub mod role;

pub use loader::CrewLoader;
pub use role::RoleAgent;

//! Trip planning: requests in, per-role plan text out

pub mod coordinator;
pub mod request;

pub use coordinator::{Coordinator, PlanResult};
pub use request::{TravelDates, TripRequest};

pub mod health;
pub mod role;
pub mod rsvp;

pub use health::{health_check, metrics, readiness_check};

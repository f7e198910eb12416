pub mod clock;
pub mod config;
pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;

pub use engine::{BookingCoordinator, EngineError};

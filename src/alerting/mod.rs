pub mod cycle_service;
pub mod state;

pub use cycle_service::{CycleCoordinator, CycleError, CycleReport};

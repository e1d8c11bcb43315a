//! Bus module: orchestrator producer/consumer di atas core

mod event_bus;

pub use event_bus::{Counters, EventBus};

/// Alert rules and delivery fan-out

pub mod bus;
pub mod engine;

pub use bus::{run_log_sink, AlertBus};
pub use engine::{AlertEngine, AlertEvent, AlertKind};

//! Runtime side of fleetcheck: device registry, check engine, defect tracking, the
//! suite orchestrator and report output.

pub mod artifacts;
pub mod checks;
pub mod config;
pub mod defects;
pub mod events;
pub mod orchestrator;
pub mod registry;

pub use artifacts::*;
pub use checks::*;
pub use config::*;
pub use defects::*;
pub use events::*;
pub use orchestrator::*;
pub use registry::*;

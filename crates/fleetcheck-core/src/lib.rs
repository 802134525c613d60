//! Functional core of the fleet verification harness.
//!
//! Everything here is pure: check evaluation, severity classification and report
//! aggregation take plain data and return plain data. Device I/O, timing, logging and
//! defect bookkeeping live in `fleetcheck-runner`.

pub mod device;
pub mod evaluate;
pub mod ids;
pub mod model;
pub mod payload;
pub mod report;
pub mod severity;
pub mod time;
pub mod types;

pub use device::*;
pub use evaluate::*;
pub use ids::*;
pub use model::*;
pub use payload::*;
pub use report::*;
pub use severity::*;
pub use time::*;
pub use types::*;

//! Device access boundary: the [`DeviceAdapter`] trait the check engine calls, plus the
//! simulator and an in-memory scripted adapter.

pub mod error;
pub mod scripted;
pub mod simulator;
pub mod traits;

pub use error::*;
pub use scripted::*;
pub use simulator::*;
pub use traits::*;

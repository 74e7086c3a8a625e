//! Hardware abstraction for the MAC core.
//!
//! This module contains:
//! - [`critical`]: Scoped interrupt-disabling guard
//! - [`defs`]: Platform timing and radio constants
//! - [`timer`]: The MAC timer capability
//! - [`radio`]: The radio capability

pub mod critical;
pub mod defs;
mod radio;
mod timer;

pub use critical::CriticalSection;
pub use radio::RadioControl;
pub use timer::{HardwareTimer, TimerInterrupt};

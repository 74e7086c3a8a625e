//! IEEE 802.15.4 MAC low-level core.
//!
//! Backoff timing, receiver arbitration and deferred radio parameter changes
//! for a single-chip 802.15.4 radio. Hardware is reached through the
//! [`hal::HardwareTimer`] and [`hal::RadioControl`] traits; the [`sim`]
//! module implements both so everything runs and is tested on the host.

pub mod config;
pub mod hal;
pub mod mac;
pub mod sim;

// Re-export commonly used items
pub use config::{ConfigError, MacConfig};
pub use hal::{CriticalSection, HardwareTimer, RadioControl, TimerInterrupt};
pub use mac::{
    BackoffClient, BackoffTimer, CompareState, MacLowLevel, MacRadio, MacRandom, RadioActivity,
    RxOnOff, RxTxHooks,
};

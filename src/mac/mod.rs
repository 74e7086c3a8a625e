//! IEEE 802.15.4 MAC low level.
//!
//! This module contains:
//! - [`backoff_timer`]: Wrapping backoff clock with a schedulable trigger
//! - [`rx_onoff`]: Receiver on/off arbitration
//! - [`radio`]: Deferred channel and power changes, scans, address registers
//! - [`energy_detect`]: Peak RSSI measurement for energy detect scans
//! - [`random`]: Noise-seeded pseudo-random bytes
//! - [`low_level`]: Start-up, reset and timer interrupt dispatch
//!
//! Every component is a context object holding `Cell`s and borrowing its
//! collaborators, so the whole MAC is built once and passed by reference to
//! the interrupt entry points. Shared state is only touched inside a
//! [`CriticalSection`](crate::hal::CriticalSection).

mod activity;
pub mod backoff_timer;
pub mod energy_detect;
pub mod low_level;
pub mod radio;
pub mod random;
pub mod rx_onoff;

pub use activity::RadioActivity;
pub use backoff_timer::{BackoffClient, BackoffTimer, CompareState};
pub use energy_detect::EnergyDetect;
pub use low_level::MacLowLevel;
pub use radio::{MacRadio, RxFilter, ScanMode};
pub use random::MacRandom;
pub use rx_onoff::{rx_flags, RxOnOff, RxTxHooks};

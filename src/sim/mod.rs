//! Deterministic host fakes for the MAC hardware.
//!
//! This module contains:
//! - [`SimTimer`]: MAC timer stepped one backoff period at a time
//! - [`SimRadio`]: Radio that records every strobe and register write
//! - [`SimClient`]: Upper layer that records every callback
//!
//! Interrupts never fire on their own. Tests and the host simulator step the
//! timer and call the interrupt entry points synchronously, so callback order
//! and resulting state can be asserted exactly.

mod client;
#[cfg(test)]
pub(crate) mod logger;
mod radio;
mod timer;

pub use client::{ClientEvent, SimClient};
pub use radio::{RadioEvent, SimRadio};
pub use timer::SimTimer;

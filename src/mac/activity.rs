//! Receive/transmit activity facts.
//!
//! The frame receive and transmit state machines own these flags; the
//! backoff clock, the receiver arbitration and the radio parameter logic only
//! read them. Flags are plain `Cell`s written from interrupt context, so every
//! decision that combines more than one of them takes a critical section.

use std::cell::Cell;

/// Shared "is the radio busy" facts.
#[derive(Debug, Default)]
pub struct RadioActivity {
    rx_active: Cell<bool>,
    tx_active: Cell<bool>,
    tx_frame_dequeued: Cell<bool>,
}

impl RadioActivity {
    /// All flags clear: nothing in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// A frame is being received.
    pub fn rx_active(&self) -> bool {
        self.rx_active.get()
    }

    /// A transmit is in progress.
    pub fn tx_active(&self) -> bool {
        self.tx_active.get()
    }

    /// The active transmit's frame has already been taken off the transmit
    /// queue, so an off request may turn the receiver off underneath it.
    pub fn tx_frame_dequeued(&self) -> bool {
        self.tx_frame_dequeued.get()
    }

    pub fn set_rx_active(&self, active: bool) {
        self.rx_active.set(active);
    }

    pub fn set_tx_active(&self, active: bool) {
        self.tx_active.set(active);
    }

    pub fn set_tx_frame_dequeued(&self, dequeued: bool) {
        self.tx_frame_dequeued.set(dequeued);
    }

    /// Neither a receive nor a transmit is in progress.
    pub fn is_idle(&self) -> bool {
        !self.rx_active.get() && !self.tx_active.get()
    }
}

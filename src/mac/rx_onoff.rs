//! Receiver on/off arbitration.
//!
//! Several parties want the receiver on for their own reasons: the upper MAC
//! while idle, a scan, a poll waiting for data. Each reason is a bit in the
//! enable flags. The receiver goes on when any reason appears and goes off
//! only when no reason is left and the frame state machines are idle, so an
//! off request never cuts a frame in half.
//!
//! A transmit whose frame has already left the transmit queue does not hold
//! the receiver on.
//!
//! # Example
//!
//! ```
//! use mac_low_level::mac::{rx_flags, RadioActivity, RxOnOff};
//! use mac_low_level::sim::SimRadio;
//!
//! let radio = SimRadio::new();
//! let activity = RadioActivity::new();
//! let rx = RxOnOff::new(&radio, &activity);
//! rx.init();
//!
//! rx.enable(rx_flags::WHEN_IDLE);
//! assert!(radio.is_receiving());
//!
//! rx.disable(rx_flags::WHEN_IDLE);
//! assert!(!radio.is_receiving());
//! ```

use super::activity::RadioActivity;
use crate::hal::critical::{self, CriticalSection};
use crate::hal::RadioControl;
use log::{debug, trace};
use std::cell::Cell;

/// Reasons for keeping the receiver on.
pub mod rx_flags {
    /// The upper MAC wants to receive while idle.
    pub const WHEN_IDLE: u8 = 0x01;
    /// A poll is waiting for its data frame.
    pub const POLL: u8 = 0x02;
    /// A scan is in progress.
    pub const SCAN: u8 = 0x04;
    /// Listening for beacons as a device.
    pub const BEACON_DEVICE: u8 = 0x08;
    /// A transmit expects an acknowledgement.
    pub const TX_ACK: u8 = 0x10;
}

/// Hooks into the frame state machines, run after a forced receiver off.
pub trait RxTxHooks {
    /// Abandon any receive that was in flight.
    fn rx_halt_cleanup(&self);

    /// Start a transmit that queued up while the receiver was forced off.
    fn start_queued_frame(&self);
}

/// Receiver arbitration state.
pub struct RxOnOff<'a, R: RadioControl> {
    radio: &'a R,
    activity: &'a RadioActivity,
    hooks: Cell<Option<&'a dyn RxTxHooks>>,
    enable_flags: Cell<u8>,
    rx_on: Cell<bool>,
}

impl<'a, R: RadioControl> RxOnOff<'a, R> {
    pub fn new(radio: &'a R, activity: &'a RadioActivity) -> Self {
        Self {
            radio,
            activity,
            hooks: Cell::new(None),
            enable_flags: Cell::new(0),
            rx_on: Cell::new(false),
        }
    }

    pub fn set_hooks(&self, hooks: &'a dyn RxTxHooks) {
        self.hooks.set(Some(hooks));
    }

    /// Clear all enable reasons and the receiver shadow flag.
    pub fn init(&self) {
        critical::with(|| {
            self.enable_flags.set(0);
            self.rx_on.set(false);
        });
    }

    /// Add enable reasons and turn the receiver on.
    pub fn enable(&self, flags: u8) {
        debug_assert!(flags != 0, "rx enable flags must be non-zero");

        critical::with(|| self.enable_flags.set(self.enable_flags.get() | flags));
        self.rx_on();
    }

    /// Add enable reasons without touching the receiver.
    ///
    /// Used when a transmit has just finished and the radio is already back
    /// in receive.
    pub fn soft_enable(&self, flags: u8) {
        debug_assert!(flags != 0, "rx enable flags must be non-zero");

        critical::with(|| self.enable_flags.set(self.enable_flags.get() | flags));
    }

    /// Remove enable reasons. The receiver is turned off if none remain and
    /// the radio is idle.
    pub fn disable(&self, flags: u8) {
        debug_assert!(flags != 0, "rx enable flags must be non-zero");

        let remaining = critical::with(|| {
            let remaining = self.enable_flags.get() & !flags;
            self.enable_flags.set(remaining);
            remaining
        });

        if remaining == 0 {
            self.off_request();
        }
    }

    /// Force the receiver off whatever the radio is doing, then let the
    /// frame state machines recover. Only for reset and recovery paths.
    pub fn hard_disable(&self) {
        critical::with(|| {
            self.enable_flags.set(0);
            // Make rx_off() see the receiver as on so the strobe always goes out
            self.rx_on.set(true);
        });
        self.rx_off();
        debug!("receiver forced off");

        if let Some(hooks) = self.hooks.get() {
            hooks.rx_halt_cleanup();
            hooks.start_queued_frame();
        }
    }

    /// Turn the receiver on if any enable reason is set.
    pub fn on_request(&self) {
        if self.enable_flags() != 0 {
            self.rx_on();
        }
    }

    /// Turn the receiver off if no enable reason is set and neither a
    /// receive nor a queued transmit needs it.
    pub fn off_request(&self) {
        let switched = {
            let _cs = CriticalSection::enter();
            if self.enable_flags.get() != 0 {
                return;
            }

            let activity = self.activity;
            if !activity.rx_active() && (!activity.tx_active() || activity.tx_frame_dequeued()) {
                let switched = self.strobe_off();

                // A receive may have started in the window before the strobe
                self.radio.flush_rx_fifo();
                self.radio.clear_rx_threshold_interrupt();
                switched
            } else {
                false
            }
        };
        if switched {
            self.indicate_off();
        }
    }

    /// Strobe the receiver on if it is not already.
    pub fn rx_on(&self) {
        let switched = {
            let _cs = CriticalSection::enter();
            let switched = !self.rx_on.get();
            if switched {
                self.rx_on.set(true);
                self.radio.rx_on();
                self.radio.rx_indicator(true);
            }
            switched
        };
        if switched {
            trace!("receiver on");
        }
    }

    /// Strobe the radio off if the receiver is on.
    pub fn rx_off(&self) {
        if critical::with(|| self.strobe_off()) {
            self.indicate_off();
        }
    }

    /// Caller must hold a critical section. Returns whether the receiver
    /// was on.
    fn strobe_off(&self) -> bool {
        if !self.rx_on.get() {
            return false;
        }
        self.rx_on.set(false);
        self.radio.rxtx_off();
        true
    }

    fn indicate_off(&self) {
        self.radio.rx_indicator(false);
        trace!("receiver off");
    }

    /// Shadow of the receiver state.
    pub fn is_rx_on(&self) -> bool {
        critical::with(|| self.rx_on.get())
    }

    pub fn enable_flags(&self) -> u8 {
        critical::with(|| self.enable_flags.get())
    }
}

//! Energy detect measurement.
//!
//! While a measurement runs, the timer's period interrupt samples RSSI once
//! per backoff and the peak is kept. Stopping converts the peak to an
//! 802.15.4 energy level.

use crate::hal::critical;
use crate::hal::defs::rssi_to_ed;
use crate::hal::{HardwareTimer, RadioControl};
use log::debug;
use std::cell::Cell;

pub struct EnergyDetect<'a, T: HardwareTimer, R: RadioControl> {
    timer: &'a T,
    radio: &'a R,
    max_rssi: Cell<i8>,
}

impl<'a, T: HardwareTimer, R: RadioControl> EnergyDetect<'a, T, R> {
    pub fn new(timer: &'a T, radio: &'a R) -> Self {
        Self {
            timer,
            radio,
            max_rssi: Cell::new(i8::MIN),
        }
    }

    /// Reset the peak and start sampling on every period interrupt.
    pub fn start(&self) {
        critical::with(|| self.max_rssi.set(i8::MIN));
        self.timer.clear_period_interrupt();
        self.timer.enable_period_interrupt();
        debug!("energy detect started");
    }

    /// Record one RSSI sample. Called from the period interrupt.
    pub fn sample(&self) {
        let rssi = self.radio.rssi();
        if rssi > self.max_rssi.get() {
            self.max_rssi.set(rssi);
        }
    }

    /// Stop sampling and return the energy level of the peak.
    pub fn stop(&self) -> u8 {
        self.timer.disable_period_interrupt();
        let ed = rssi_to_ed(critical::with(|| self.max_rssi.get()));
        debug!("energy detect stopped, level {}", ed);
        ed
    }

    /// Highest RSSI seen since the last start.
    pub fn max_rssi(&self) -> i8 {
        critical::with(|| self.max_rssi.get())
    }
}

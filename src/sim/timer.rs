//! Simulated MAC timer.

use crate::hal::defs::{BACKOFF_COUNT_MAX, TIMER_TICKS_PER_BACKOFF, TIMER_TICKS_PER_SYMBOL};
use crate::hal::{HardwareTimer, TimerInterrupt};
use std::cell::{Cell, RefCell};

/// MAC timer advanced one backoff period at a time.
///
/// The overflow counter is 20 bits wide like the hardware one. Forced delays
/// are recorded rather than applied, since the fake has no sub-backoff time.
#[derive(Debug)]
pub struct SimTimer {
    count: Cell<u32>,
    compare: Cell<u32>,
    compare_enabled: Cell<bool>,
    compare_flag: Cell<bool>,
    period_enabled: Cell<bool>,
    period_flag: Cell<bool>,
    forced_delays: RefCell<Vec<u16>>,
}

impl Default for SimTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimTimer {
    pub fn new() -> Self {
        Self {
            count: Cell::new(0),
            compare: Cell::new(BACKOFF_COUNT_MAX),
            compare_enabled: Cell::new(false),
            compare_flag: Cell::new(false),
            period_enabled: Cell::new(false),
            period_flag: Cell::new(false),
            forced_delays: RefCell::new(Vec::new()),
        }
    }

    /// Advance one backoff period.
    ///
    /// Returns `true` when the overflow counter reached the compare value
    /// with the compare interrupt enabled, i.e. when the caller should run
    /// the compare handler.
    pub fn step(&self) -> bool {
        let count = (self.count.get() + 1) & BACKOFF_COUNT_MAX;
        self.count.set(count);
        self.period_flag.set(true);

        if count == self.compare.get() {
            self.compare_flag.set(true);
            self.compare_enabled.get()
        } else {
            false
        }
    }

    /// Highest-priority interrupt that is both flagged and enabled.
    pub fn pending_interrupt(&self) -> Option<TimerInterrupt> {
        if self.compare_flag.get() && self.compare_enabled.get() {
            Some(TimerInterrupt::OverflowCompare)
        } else if self.period_flag.get() && self.period_enabled.get() {
            Some(TimerInterrupt::Period)
        } else {
            None
        }
    }

    pub fn compare(&self) -> u32 {
        self.compare.get()
    }

    pub fn compare_interrupt_enabled(&self) -> bool {
        self.compare_enabled.get()
    }

    pub fn period_interrupt_enabled(&self) -> bool {
        self.period_enabled.get()
    }

    /// Most recent [`force_delay`](HardwareTimer::force_delay) argument.
    pub fn last_forced_delay(&self) -> Option<u16> {
        self.forced_delays.borrow().last().copied()
    }
}

impl HardwareTimer for SimTimer {
    fn count(&self) -> u32 {
        self.count.get()
    }

    fn set_count(&self, count: u32) {
        self.count.set(count & BACKOFF_COUNT_MAX);
    }

    fn set_compare(&self, compare: u32) {
        self.compare.set(compare & BACKOFF_COUNT_MAX);
    }

    fn force_delay(&self, ticks: u16) {
        self.forced_delays.borrow_mut().push(ticks);
    }

    fn ticks_per_backoff(&self) -> u16 {
        TIMER_TICKS_PER_BACKOFF
    }

    fn ticks_per_symbol(&self) -> u16 {
        TIMER_TICKS_PER_SYMBOL
    }

    fn enable_compare_interrupt(&self) {
        self.compare_enabled.set(true);
    }

    fn disable_compare_interrupt(&self) {
        self.compare_enabled.set(false);
    }

    fn clear_compare_interrupt(&self) {
        self.compare_flag.set(false);
    }

    fn enable_period_interrupt(&self) {
        self.period_enabled.set(true);
    }

    fn disable_period_interrupt(&self) {
        self.period_enabled.set(false);
    }

    fn clear_period_interrupt(&self) {
        self.period_flag.set(false);
    }
}

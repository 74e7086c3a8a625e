//! MAC timer capability.
//!
//! The hardware timer counts ticks within one backoff period and wraps every
//! [`ticks_per_backoff`](HardwareTimer::ticks_per_backoff) ticks. Each wrap
//! increments a separate overflow counter: that counter is the raw backoff
//! count, and it raises the compare interrupt when it equals the compare
//! register.

/// Source of a MAC timer interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerInterrupt {
    /// Overflow counter matched the compare register.
    OverflowCompare,
    /// Tick counter wrapped, i.e. one backoff period elapsed. Only enabled
    /// while energy detect is sampling.
    Period,
}

/// Register-level access to the MAC timer.
///
/// Methods take `&self`: implementations write hardware registers (or, in a
/// fake, interior-mutable state) and are called from both foreground and
/// interrupt context.
pub trait HardwareTimer {
    /// Current overflow (backoff) count.
    fn count(&self) -> u32;

    /// Overwrite the overflow (backoff) count.
    fn set_count(&self, count: u32);

    /// Program the overflow compare register.
    fn set_compare(&self, compare: u32);

    /// Write the live tick counter directly, delaying the timer by `ticks`
    /// relative to its current period. The timer must be running.
    fn force_delay(&self, ticks: u16);

    /// Ticks in one backoff period.
    fn ticks_per_backoff(&self) -> u16;

    /// Ticks in one symbol.
    fn ticks_per_symbol(&self) -> u16;

    fn enable_compare_interrupt(&self);
    fn disable_compare_interrupt(&self);
    fn clear_compare_interrupt(&self);

    fn enable_period_interrupt(&self);
    fn disable_period_interrupt(&self);
    fn clear_period_interrupt(&self);
}

//! Scoped critical sections.
//!
//! Every field shared between foreground code and an interrupt handler is
//! accessed while a [`CriticalSection`] guard is alive. Entering saves the
//! current interrupt state and disables interrupts; dropping the guard
//! restores the saved state rather than unconditionally re-enabling, so
//! sections nest.
//!
//! The actual interrupt masking is provided by the `critical-section` crate.
//! On the target it maps to the MCU's global interrupt-enable flag, on the
//! host to a global reentrant lock.
//!
//! # Example
//!
//! ```
//! use mac_low_level::hal::critical::{self, CriticalSection};
//!
//! assert!(!critical::interrupts_disabled());
//! {
//!     let _cs = CriticalSection::enter();
//!     assert!(critical::interrupts_disabled());
//! }
//! assert!(!critical::interrupts_disabled());
//! ```

use critical_section::RestoreState;
use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Guard that keeps interrupts disabled for its lifetime.
///
/// Guards must be released in reverse order of acquisition. The guard is
/// neither `Send` nor `Sync`, and holding it by value in a local makes scope
/// order match acquisition order. Dropping it early with [`drop`] is allowed
/// as long as no guard entered after it is still alive.
#[must_use = "the critical section ends as soon as the guard is dropped"]
pub struct CriticalSection {
    restore: RestoreState,
    _not_send: PhantomData<*const ()>,
}

impl CriticalSection {
    /// Save the interrupt state and disable interrupts.
    pub fn enter() -> Self {
        // Safety: the matching release happens in Drop, and the guard cannot
        // leave this thread, so acquire/release stay paired and ordered.
        let restore = unsafe { critical_section::acquire() };
        DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self {
            restore,
            _not_send: PhantomData,
        }
    }
}

impl Drop for CriticalSection {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get() - 1));
        // Safety: `restore` came from the acquire in `enter`.
        unsafe { critical_section::release(self.restore) };
    }
}

/// Run `f` inside a critical section.
pub fn with<R>(f: impl FnOnce() -> R) -> R {
    let _cs = CriticalSection::enter();
    f()
}

/// Returns `true` while the current context holds at least one guard.
pub fn interrupts_disabled() -> bool {
    DEPTH.with(|depth| depth.get() > 0)
}

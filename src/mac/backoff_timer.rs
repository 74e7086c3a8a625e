//! Backoff clock.
//!
//! Turns the MAC timer's overflow counter into a wrapping backoff clock with
//! two logical events, both driven by the single hardware compare register:
//!
//! - **rollover**: the count reached the rollover value and wraps to zero
//! - **trigger**: a one-shot deadline scheduled by the caller
//!
//! At most one trigger is pending. A trigger that lies at or behind the
//! current count cannot fire before the next rollover, so the compare
//! register first serves the rollover and is then re-armed for the trigger.
//!
//! # State machine
//!
//! | From | Event | To |
//! |------|-------|----|
//! | `Rollover` | `set_trigger`, room left this cycle | `Trigger` |
//! | `Rollover` | `set_trigger(0)` | `RolloverAndTrigger` |
//! | `Rollover` | `set_trigger`, no room left | `RolloverAndArmTrigger` |
//! | `Trigger` | compare fires | `Rollover` |
//! | `RolloverAndTrigger` | compare fires (both events) | `Rollover` |
//! | `RolloverAndArmTrigger` | compare fires (rollover) | `Trigger` |
//! | any | `cancel_trigger` | `Rollover` |
//!
//! # Example
//!
//! ```
//! use mac_low_level::mac::{BackoffTimer, CompareState, RadioActivity};
//! use mac_low_level::sim::{ClientEvent, SimClient, SimTimer};
//!
//! let timer = SimTimer::new();
//! let activity = RadioActivity::new();
//! let client = SimClient::new();
//! let clock = BackoffTimer::new(&timer, &activity, 100);
//! clock.set_client(&client);
//! clock.init();
//!
//! clock.set_count(97);
//! clock.set_trigger(3);
//! assert_eq!(clock.compare_state(), CompareState::RolloverAndArmTrigger);
//!
//! for _ in 0..6 {
//!     if timer.step() {
//!         clock.compare_isr();
//!     }
//! }
//! assert_eq!(client.events(), vec![ClientEvent::Rollover, ClientEvent::Trigger]);
//! ```

use super::activity::RadioActivity;
use crate::hal::critical::{self, CriticalSection};
use crate::hal::defs::TICKS_EXPECTED_AT_SFD;
use crate::hal::HardwareTimer;
use log::{debug, trace};
use std::cell::Cell;

/// Receiver of backoff clock events.
///
/// Both callbacks run in interrupt context and must not block.
pub trait BackoffClient {
    /// The clock wrapped to zero. Runs with interrupts disabled, so keep it
    /// short.
    fn rollover(&self);

    /// The scheduled trigger was reached. Runs after the clock has released
    /// its critical section; arming the next trigger from here is allowed.
    fn trigger(&self);
}

/// Which logical event(s) the hardware compare register represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareState {
    /// Compare is the rollover; no trigger pending.
    Rollover,
    /// Compare is the trigger, later in the current cycle.
    Trigger,
    /// Compare is the rollover and the trigger is at backoff 0, so one
    /// interrupt serves both.
    RolloverAndTrigger,
    /// Compare is the rollover; once it fires the compare is re-armed for
    /// the trigger in the next cycle.
    RolloverAndArmTrigger,
}

/// Effect of a compare interrupt in a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareTransition {
    /// Reset the count and signal rollover.
    pub rollover: bool,
    /// Signal the trigger.
    pub trigger: bool,
    /// New state, with the compare re-armed to match it. `None` leaves both
    /// untouched.
    pub next: Option<CompareState>,
}

impl CompareState {
    /// State for a newly armed trigger given the current count.
    pub fn for_trigger(trigger: u32, count: u32) -> Self {
        if trigger > count {
            Self::Trigger
        } else if trigger == 0 {
            Self::RolloverAndTrigger
        } else {
            Self::RolloverAndArmTrigger
        }
    }

    /// Transition table for a compare interrupt.
    pub fn on_compare(self) -> CompareTransition {
        match self {
            Self::Rollover => CompareTransition {
                rollover: true,
                trigger: false,
                next: None,
            },
            Self::Trigger => CompareTransition {
                rollover: false,
                trigger: true,
                next: Some(Self::Rollover),
            },
            Self::RolloverAndTrigger => CompareTransition {
                rollover: true,
                trigger: true,
                next: Some(Self::Rollover),
            },
            Self::RolloverAndArmTrigger => CompareTransition {
                rollover: true,
                trigger: false,
                next: Some(Self::Trigger),
            },
        }
    }

    /// Returns true if a trigger is pending in this state.
    pub fn trigger_pending(self) -> bool {
        self != Self::Rollover
    }
}

/// Signed backoff offset of a received frame from the expected arrival at
/// backoff 0. Frames recorded in the second half of the cycle are treated as
/// early arrivals for the next cycle.
pub fn backoff_delta(received_count: u32, rollover: u32) -> i32 {
    if received_count > rollover / 2 {
        received_count as i32 - rollover as i32
    } else {
        received_count as i32
    }
}

/// Timer ticks to delay so the SFD capture lines up with
/// [`TICKS_EXPECTED_AT_SFD`]. The flag is set when the capture was earlier
/// than expected within its backoff and the delay wrapped around one full
/// backoff period.
pub fn sfd_tick_delay(received_sub_tick: u16, ticks_per_backoff: u16) -> (u16, bool) {
    if received_sub_tick >= TICKS_EXPECTED_AT_SFD {
        (received_sub_tick - TICKS_EXPECTED_AT_SFD, false)
    } else {
        let ticks = received_sub_tick
            .wrapping_sub(TICKS_EXPECTED_AT_SFD)
            .wrapping_add(ticks_per_backoff);
        (ticks, true)
    }
}

/// Wrapping backoff clock with one schedulable trigger.
pub struct BackoffTimer<'a, T: HardwareTimer> {
    timer: &'a T,
    activity: &'a RadioActivity,
    client: Cell<Option<&'a dyn BackoffClient>>,
    default_rollover: u32,
    rollover: Cell<u32>,
    trigger: Cell<u32>,
    state: Cell<CompareState>,
}

impl<'a, T: HardwareTimer> BackoffTimer<'a, T> {
    /// Create a backoff clock. Nothing touches the hardware until [`init`].
    ///
    /// [`init`]: Self::init
    pub fn new(timer: &'a T, activity: &'a RadioActivity, default_rollover: u32) -> Self {
        debug_assert!(default_rollover > 0, "rollover must be non-zero");
        Self {
            timer,
            activity,
            client: Cell::new(None),
            default_rollover,
            rollover: Cell::new(default_rollover),
            trigger: Cell::new(0),
            state: Cell::new(CompareState::Rollover),
        }
    }

    /// Register the receiver of rollover and trigger events.
    pub fn set_client(&self, client: &'a dyn BackoffClient) {
        self.client.set(Some(client));
    }

    /// Start the clock from zero with the default rollover and enable the
    /// compare interrupt.
    pub fn init(&self) {
        critical::with(|| self.state.set(CompareState::Rollover));
        self.timer.set_count(0);
        self.set_rollover(self.default_rollover);
        self.timer.clear_compare_interrupt();
        self.timer.enable_compare_interrupt();
        debug!("backoff clock started, rollover {}", self.default_rollover);
    }

    /// Re-initialize after a MAC reset. Interrupts must already be disabled.
    pub fn reset(&self) {
        debug_assert!(
            critical::interrupts_disabled(),
            "backoff clock reset requires interrupts disabled"
        );
        self.timer.disable_compare_interrupt();
        self.init();
    }

    /// Set the count at which the clock wraps to zero.
    pub fn set_rollover(&self, rollover: u32) {
        debug_assert!(
            rollover > self.timer.count(),
            "rollover must be greater than count"
        );

        let _cs = CriticalSection::enter();
        self.rollover.set(rollover);
        self.timer.set_compare(rollover);
    }

    /// Current rollover value.
    pub fn rollover(&self) -> u32 {
        self.rollover.get()
    }

    /// Overwrite the current count. No trigger may be pending.
    pub fn set_count(&self, count: u32) {
        debug_assert!(
            self.state.get() == CompareState::Rollover,
            "trigger cannot be active while changing count"
        );
        debug_assert!(
            count < self.rollover.get(),
            "count must be less than rollover"
        );

        let _cs = CriticalSection::enter();
        self.timer.set_count(count);
    }

    /// Current count.
    pub fn count(&self) -> u32 {
        let _cs = CriticalSection::enter();
        self.timer.count()
    }

    /// Last trigger value passed to [`set_trigger`](Self::set_trigger).
    pub fn trigger(&self) -> u32 {
        self.trigger.get()
    }

    /// Current compare state.
    pub fn compare_state(&self) -> CompareState {
        critical::with(|| self.state.get())
    }

    /// Schedule the trigger for backoff `trigger`, in this cycle if it is
    /// still ahead of the count, otherwise in the next one. Replaces any
    /// pending trigger.
    pub fn set_trigger(&self, trigger: u32) {
        debug_assert!(
            trigger < self.rollover.get(),
            "trigger backoff must be less than rollover"
        );

        let state = {
            let _cs = CriticalSection::enter();
            self.trigger.set(trigger);
            let state = CompareState::for_trigger(trigger, self.timer.count());
            self.state.set(state);
            self.timer.set_compare(self.compare_value(state));
            state
        };
        trace!("trigger {} armed as {:?}", trigger, state);
    }

    /// Drop any pending trigger. Always safe to call.
    pub fn cancel_trigger(&self) {
        let _cs = CriticalSection::enter();
        self.state.set(CompareState::Rollover);
        self.timer.set_compare(self.rollover.get());
    }

    /// Realign the clock to a received frame.
    ///
    /// `received_count` and `received_sub_tick` are the backoff count and
    /// timer tick captured at the frame's SFD. The frame is expected at
    /// backoff 0, at tick [`TICKS_EXPECTED_AT_SFD`]; the timer is delayed and
    /// the count shifted by the difference. Returns the backoff shift so the
    /// caller can adjust its own channel timing.
    ///
    /// A rollover that lands while the count is being adjusted is not
    /// accounted for.
    pub fn realign(&self, received_count: u32, received_sub_tick: u16) -> i32 {
        debug_assert!(!self.activity.tx_active(), "cannot realign during transmit");

        let rollover = self.rollover.get();
        let mut delta = backoff_delta(received_count, rollover);

        let (delay_ticks, wrapped) =
            sfd_tick_delay(received_sub_tick, self.timer.ticks_per_backoff());
        if wrapped {
            delta -= 1;
        }

        let cs = CriticalSection::enter();
        let corrected = (self.timer.count() as i64 - delta as i64).rem_euclid(rollover as i64);

        // TODO: handle the compare firing between the count read above and the
        // write below; the rollover is lost or doubled when it does.
        self.timer.force_delay(delay_ticks);
        self.timer.set_count(corrected as u32);
        drop(cs);

        debug!(
            "realigned: backoff delta {}, tick delay {}, count {}",
            delta, delay_ticks, corrected
        );
        delta
    }

    /// Compare interrupt handler. Called from the MAC timer interrupt.
    ///
    /// The rollover callback runs before the trigger callback, and the
    /// trigger callback runs after the critical section is released.
    pub fn compare_isr(&self) {
        let cs = CriticalSection::enter();
        let state = self.state.get();
        let transition = state.on_compare();

        if transition.rollover {
            self.timer.set_count(0);
            if let Some(client) = self.client.get() {
                client.rollover();
            }
        }

        if let Some(next) = transition.next {
            self.state.set(next);
            self.timer.set_compare(self.compare_value(next));
        }
        drop(cs);

        if let Some(next) = transition.next {
            trace!("backoff compare {:?} -> {:?}", state, next);
        }

        if transition.trigger {
            if let Some(client) = self.client.get() {
                client.trigger();
            }
        }
    }

    fn compare_value(&self, state: CompareState) -> u32 {
        match state {
            CompareState::Trigger => self.trigger.get(),
            _ => self.rollover.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::defs::{DEFAULT_BACKOFF_ROLLOVER, TIMER_TICKS_PER_BACKOFF};
    use crate::sim::{logger, ClientEvent, SimClient, SimTimer};

    fn run(timer: &SimTimer, clock: &BackoffTimer<'_, SimTimer>, backoffs: u32) {
        for _ in 0..backoffs {
            if timer.step() {
                clock.compare_isr();
            }
        }
    }

    #[test]
    fn test_init_defaults() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let clock = BackoffTimer::new(&timer, &activity, DEFAULT_BACKOFF_ROLLOVER);
        timer.set_count(1234);

        clock.init();

        assert_eq!(clock.compare_state(), CompareState::Rollover);
        assert_eq!(clock.count(), 0);
        assert_eq!(clock.rollover(), DEFAULT_BACKOFF_ROLLOVER);
        assert_eq!(timer.compare(), DEFAULT_BACKOFF_ROLLOVER);
        assert!(timer.compare_interrupt_enabled());
    }

    #[test]
    fn test_set_count_round_trip() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.init();

        for count in [0, 1, 50, 98, 99] {
            clock.set_count(count);
            assert_eq!(clock.count(), count);
        }
    }

    #[test]
    fn test_set_rollover_moves_compare() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.init();
        clock.set_count(10);

        clock.set_rollover(20);
        assert_eq!(clock.rollover(), 20);
        assert_eq!(timer.compare(), 20);
    }

    #[test]
    fn test_plain_rollover_wraps_count() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let client = SimClient::new();
        let clock = BackoffTimer::new(&timer, &activity, 10);
        clock.set_client(&client);
        clock.init();

        run(&timer, &clock, 25);

        assert_eq!(client.count(ClientEvent::Rollover), 2);
        assert_eq!(client.count(ClientEvent::Trigger), 0);
        assert_eq!(clock.count(), 5);
        assert_eq!(clock.compare_state(), CompareState::Rollover);
    }

    #[test]
    fn test_trigger_ahead_fires_once() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let client = SimClient::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.set_client(&client);
        clock.init();
        clock.set_count(10);

        clock.set_trigger(40);
        assert_eq!(clock.compare_state(), CompareState::Trigger);
        assert_eq!(timer.compare(), 40);

        run(&timer, &clock, 30);

        assert_eq!(client.events(), vec![ClientEvent::Trigger]);
        assert_eq!(clock.count(), 40);
        assert_eq!(clock.compare_state(), CompareState::Rollover);
        assert_eq!(timer.compare(), 100);
    }

    #[test]
    fn test_trigger_at_zero_fires_with_rollover() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let client = SimClient::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.set_client(&client);
        clock.init();

        clock.set_trigger(0);
        assert_eq!(clock.compare_state(), CompareState::RolloverAndTrigger);
        assert_eq!(timer.compare(), 100);

        run(&timer, &clock, 100);

        assert_eq!(
            client.events(),
            vec![ClientEvent::Rollover, ClientEvent::Trigger]
        );
        assert_eq!(clock.compare_state(), CompareState::Rollover);
        assert_eq!(timer.compare(), 100);
    }

    #[test]
    fn test_rollover_inside_and_trigger_outside_critical_section() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let client = SimClient::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.set_client(&client);
        clock.init();

        clock.set_trigger(0);
        clock.compare_isr();

        assert_eq!(
            client.events_with_context(),
            vec![(ClientEvent::Rollover, true), (ClientEvent::Trigger, false)]
        );
    }

    #[test]
    fn test_trigger_behind_arms_after_rollover() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let client = SimClient::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.set_client(&client);
        clock.init();
        clock.set_count(60);

        clock.set_trigger(30);
        assert_eq!(clock.compare_state(), CompareState::RolloverAndArmTrigger);
        assert_eq!(timer.compare(), 100);

        // First interrupt: rollover only, compare re-armed to the trigger
        run(&timer, &clock, 40);
        assert_eq!(client.events(), vec![ClientEvent::Rollover]);
        assert_eq!(clock.compare_state(), CompareState::Trigger);
        assert_eq!(timer.compare(), 30);

        // Second interrupt: trigger only
        run(&timer, &clock, 30);
        assert_eq!(
            client.events(),
            vec![ClientEvent::Rollover, ClientEvent::Trigger]
        );
        assert_eq!(clock.compare_state(), CompareState::Rollover);
    }

    #[test]
    fn test_trigger_equal_to_count_waits_a_cycle() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let client = SimClient::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.set_client(&client);
        clock.init();
        clock.set_count(30);

        clock.set_trigger(30);
        assert_eq!(clock.compare_state(), CompareState::RolloverAndArmTrigger);

        run(&timer, &clock, 99);
        assert_eq!(client.events(), vec![ClientEvent::Rollover]);
        run(&timer, &clock, 1);
        assert_eq!(
            client.events(),
            vec![ClientEvent::Rollover, ClientEvent::Trigger]
        );
    }

    #[test]
    fn test_end_to_end_rollover_then_trigger() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let client = SimClient::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.set_client(&client);
        clock.init();
        clock.set_count(97);

        clock.set_trigger(3);
        assert_eq!(clock.compare_state(), CompareState::RolloverAndArmTrigger);

        run(&timer, &clock, 3);
        assert_eq!(clock.count(), 0);
        assert_eq!(client.events(), vec![ClientEvent::Rollover]);
        assert_eq!(clock.compare_state(), CompareState::Trigger);
        assert_eq!(timer.compare(), 3);

        run(&timer, &clock, 3);
        assert_eq!(
            client.events(),
            vec![ClientEvent::Rollover, ClientEvent::Trigger]
        );
        assert_eq!(clock.compare_state(), CompareState::Rollover);
        assert_eq!(timer.compare(), 100);
    }

    #[test]
    fn test_cancel_trigger_from_every_state() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let client = SimClient::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.set_client(&client);
        clock.init();
        clock.set_count(50);

        for trigger in [70, 0, 20] {
            clock.set_trigger(trigger);
            assert!(clock.compare_state().trigger_pending());
            clock.cancel_trigger();
            assert_eq!(clock.compare_state(), CompareState::Rollover);
            assert_eq!(timer.compare(), 100);
        }

        run(&timer, &clock, 100);
        assert_eq!(client.count(ClientEvent::Trigger), 0);
        assert_eq!(client.count(ClientEvent::Rollover), 1);
    }

    #[test]
    fn test_set_trigger_replaces_pending_trigger() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let client = SimClient::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.set_client(&client);
        clock.init();

        clock.set_trigger(50);
        clock.set_trigger(20);
        assert_eq!(clock.trigger(), 20);

        run(&timer, &clock, 60);
        assert_eq!(client.count(ClientEvent::Trigger), 1);
    }

    /// Client that re-arms the trigger every `period` backoffs.
    struct Periodic<'a> {
        clock: &'a BackoffTimer<'a, SimTimer>,
        period: u32,
        fired: Cell<u32>,
    }

    impl BackoffClient for Periodic<'_> {
        fn rollover(&self) {}

        fn trigger(&self) {
            self.fired.set(self.fired.get() + 1);
            let next = (self.clock.trigger() + self.period) % self.clock.rollover();
            self.clock.set_trigger(next);
        }
    }

    #[test]
    fn test_trigger_callback_can_rearm() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        let periodic = Periodic {
            clock: &clock,
            period: 30,
            fired: Cell::new(0),
        };
        clock.set_client(&periodic);
        clock.init();

        clock.set_trigger(30);
        // Triggers at 30, 60, 90, then 20 and 50 of the next cycle
        run(&timer, &clock, 150);
        assert_eq!(periodic.fired.get(), 5);
    }

    #[test]
    fn test_transition_table() {
        let t = CompareState::Rollover.on_compare();
        assert!(t.rollover && !t.trigger);
        assert_eq!(t.next, None);

        let t = CompareState::Trigger.on_compare();
        assert!(!t.rollover && t.trigger);
        assert_eq!(t.next, Some(CompareState::Rollover));

        let t = CompareState::RolloverAndTrigger.on_compare();
        assert!(t.rollover && t.trigger);
        assert_eq!(t.next, Some(CompareState::Rollover));

        let t = CompareState::RolloverAndArmTrigger.on_compare();
        assert!(t.rollover && !t.trigger);
        assert_eq!(t.next, Some(CompareState::Trigger));
    }

    #[test]
    fn test_for_trigger() {
        assert_eq!(CompareState::for_trigger(5, 4), CompareState::Trigger);
        assert_eq!(CompareState::for_trigger(0, 0), CompareState::RolloverAndTrigger);
        assert_eq!(CompareState::for_trigger(0, 9), CompareState::RolloverAndTrigger);
        assert_eq!(CompareState::for_trigger(4, 4), CompareState::RolloverAndArmTrigger);
        assert_eq!(CompareState::for_trigger(3, 9), CompareState::RolloverAndArmTrigger);
    }

    #[test]
    fn test_backoff_delta_halves() {
        assert_eq!(backoff_delta(0, 100), 0);
        assert_eq!(backoff_delta(50, 100), 50);
        assert_eq!(backoff_delta(51, 100), -49);
        assert_eq!(backoff_delta(99, 100), -1);
    }

    #[test]
    fn test_realign_on_schedule_is_noop() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.init();
        clock.set_count(42);

        let delta = clock.realign(0, TICKS_EXPECTED_AT_SFD);

        assert_eq!(delta, 0);
        assert_eq!(timer.last_forced_delay(), Some(0));
        assert_eq!(clock.count(), 42);
    }

    #[test]
    fn test_realign_late_frame_pulls_count_back() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.init();
        clock.set_count(12);

        let delta = clock.realign(10, TICKS_EXPECTED_AT_SFD + 300);

        assert_eq!(delta, 10);
        assert_eq!(timer.last_forced_delay(), Some(300));
        assert_eq!(clock.count(), 2);
    }

    #[test]
    fn test_realign_early_frame_pushes_count_forward() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.init();
        clock.set_count(5);

        // Recorded at 97: three backoffs before the expected rollover
        let delta = clock.realign(97, TICKS_EXPECTED_AT_SFD);

        assert_eq!(delta, -3);
        assert_eq!(clock.count(), 8);
    }

    #[test]
    fn test_realign_sub_tick_underflow_wraps() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.init();
        clock.set_count(20);

        let sub_tick = TICKS_EXPECTED_AT_SFD - 100;
        let delta = clock.realign(10, sub_tick);

        // One less than the naive delta of 10
        assert_eq!(delta, 9);
        assert_eq!(
            timer.last_forced_delay(),
            Some(sub_tick + TIMER_TICKS_PER_BACKOFF - TICKS_EXPECTED_AT_SFD)
        );
        assert_eq!(clock.count(), 11);
    }

    #[test]
    fn test_realign_wraps_count_below_zero() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.init();
        clock.set_count(3);

        let delta = clock.realign(10, TICKS_EXPECTED_AT_SFD);

        assert_eq!(delta, 10);
        assert_eq!(clock.count(), 93);
    }

    #[test]
    fn test_realign_wraps_count_past_rollover() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.init();
        clock.set_count(98);

        let delta = clock.realign(96, TICKS_EXPECTED_AT_SFD);

        assert_eq!(delta, -4);
        assert_eq!(clock.count(), 2);
    }

    #[test]
    fn test_sfd_tick_delay() {
        assert_eq!(sfd_tick_delay(TICKS_EXPECTED_AT_SFD, 10_240), (0, false));
        assert_eq!(sfd_tick_delay(TICKS_EXPECTED_AT_SFD + 1, 10_240), (1, false));
        assert_eq!(
            sfd_tick_delay(TICKS_EXPECTED_AT_SFD - 1, 10_240),
            (10_239, true)
        );
        assert_eq!(
            sfd_tick_delay(0, 10_240),
            (10_240 - TICKS_EXPECTED_AT_SFD, true)
        );
    }

    #[test]
    fn test_reset_reinitializes_with_interrupts_disabled() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.init();
        clock.set_count(50);
        clock.set_trigger(70);

        critical::with(|| clock.reset());

        assert_eq!(clock.compare_state(), CompareState::Rollover);
        assert_eq!(clock.count(), 0);
        assert_eq!(timer.compare(), 100);
        assert!(timer.compare_interrupt_enabled());
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "trigger backoff must be less than rollover")]
    fn test_trigger_at_rollover_is_contract_violation() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.init();
        clock.set_trigger(100);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "rollover must be greater than count")]
    fn test_rollover_below_count_is_contract_violation() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.init();
        clock.set_count(50);
        clock.set_rollover(50);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "trigger cannot be active while changing count")]
    fn test_set_count_with_pending_trigger_is_contract_violation() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.init();
        clock.set_trigger(10);
        clock.set_count(5);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "cannot realign during transmit")]
    fn test_realign_during_transmit_is_contract_violation() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.init();
        activity.set_tx_active(true);
        clock.realign(0, TICKS_EXPECTED_AT_SFD);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "reset requires interrupts disabled")]
    fn test_reset_with_interrupts_enabled_is_contract_violation() {
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.init();
        clock.reset();
    }

    #[test]
    fn test_logging_runs_with_interrupts_enabled() {
        logger::capture();
        let timer = SimTimer::new();
        let activity = RadioActivity::new();
        let clock = BackoffTimer::new(&timer, &activity, 100);
        clock.init();

        clock.set_count(97);
        clock.set_trigger(3);
        run(&timer, &clock, 6);
        clock.realign(2, TICKS_EXPECTED_AT_SFD + 10);

        let records = logger::take();
        for prefix in ["trigger 3 armed", "backoff compare", "realigned"] {
            assert!(
                records.iter().any(|(message, _)| message.starts_with(prefix)),
                "missing {:?} in {:?}",
                prefix,
                records
            );
        }
        assert!(records.iter().all(|(_, masked)| !masked), "{:?}", records);
    }
}

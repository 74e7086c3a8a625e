//! MAC low-level lifecycle and timer interrupt dispatch.
//!
//! Ties the components to one timer and one radio: start-up ordering, MAC
//! reset, and routing of the MAC timer interrupt to the backoff clock or to
//! energy detect.
//!
//! # Example
//!
//! ```
//! use mac_low_level::config::MacConfig;
//! use mac_low_level::mac::{BackoffTimer, MacLowLevel, MacRadio, MacRandom, RadioActivity, RxOnOff};
//! use mac_low_level::sim::{SimRadio, SimTimer};
//!
//! let config = MacConfig { channel: 15, ..Default::default() };
//! let timer = SimTimer::new();
//! let radio = SimRadio::new();
//! let activity = RadioActivity::new();
//! let random = MacRandom::new();
//! let rx = RxOnOff::new(&radio, &activity);
//! let mac_radio = MacRadio::new(&timer, &radio, &activity, &rx);
//! let backoff = BackoffTimer::new(&timer, &activity, config.backoff_rollover);
//!
//! let mac = MacLowLevel::new(&timer, &radio, &random, &rx, &mac_radio, &backoff, config).unwrap();
//! mac.init();
//!
//! timer.step();
//! while let Some(source) = timer.pending_interrupt() {
//!     mac.timer_isr(source);
//! }
//! assert_eq!(backoff.count(), 1);
//! assert_eq!(radio.channel(), 15);
//! ```

use super::backoff_timer::BackoffTimer;
use super::radio::MacRadio;
use super::random::MacRandom;
use super::rx_onoff::RxOnOff;
use crate::config::{ConfigError, MacConfig};
use crate::hal::critical;
use crate::hal::{HardwareTimer, RadioControl, TimerInterrupt};
use log::{debug, info};

pub struct MacLowLevel<'a, T: HardwareTimer, R: RadioControl> {
    timer: &'a T,
    radio: &'a R,
    random: &'a MacRandom,
    rx: &'a RxOnOff<'a, R>,
    mac_radio: &'a MacRadio<'a, T, R>,
    backoff: &'a BackoffTimer<'a, T>,
    config: MacConfig,
}

impl<'a, T: HardwareTimer, R: RadioControl> MacLowLevel<'a, T, R> {
    /// Bind the components to a validated configuration. Nothing touches the
    /// hardware until [`init`](Self::init).
    pub fn new(
        timer: &'a T,
        radio: &'a R,
        random: &'a MacRandom,
        rx: &'a RxOnOff<'a, R>,
        mac_radio: &'a MacRadio<'a, T, R>,
        backoff: &'a BackoffTimer<'a, T>,
        config: MacConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            timer,
            radio,
            random,
            rx,
            mac_radio,
            backoff,
            config,
        })
    }

    /// Power-up initialization.
    ///
    /// The random generator is seeded first, while the receiver is still
    /// free for noise sampling.
    pub fn init(&self) {
        self.random.init(self.radio);

        self.rx.init();
        self.mac_radio.init();
        self.backoff.init();
        self.backoff.set_rollover(self.config.backoff_rollover);

        self.radio.enable_rx_threshold_interrupt();

        self.mac_radio.set_channel(self.config.channel);
        self.mac_radio.set_tx_power(self.config.tx_power_minus_dbm);

        info!(
            "MAC low level up: channel {}, rollover {}",
            self.config.channel, self.config.backoff_rollover
        );
    }

    /// MAC reset. The caller must have interrupts disabled.
    ///
    /// The receiver is forced off, scans and energy detect are stopped, and
    /// the backoff clock restarts from zero with the configured rollover.
    pub fn reset(&self) {
        debug_assert!(
            critical::interrupts_disabled(),
            "MAC reset requires interrupts disabled"
        );

        self.rx.hard_disable();
        self.mac_radio.reset();
        self.backoff.reset();
        self.backoff.set_rollover(self.config.backoff_rollover);
        debug!("MAC low level reset");
    }

    /// MAC timer interrupt entry point.
    pub fn timer_isr(&self, source: TimerInterrupt) {
        match source {
            TimerInterrupt::OverflowCompare => {
                self.timer.disable_compare_interrupt();
                self.timer.clear_compare_interrupt();
                self.backoff.compare_isr();
                self.timer.enable_compare_interrupt();
            }
            TimerInterrupt::Period => {
                self.mac_radio.energy_detect().sample();
                self.timer.clear_period_interrupt();
            }
        }
    }

    pub fn config(&self) -> &MacConfig {
        &self.config
    }
}

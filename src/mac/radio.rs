//! Radio parameter control.
//!
//! Channel and transmit power can be requested at any time but are only
//! written to the radio when it is safe: the channel never changes under an
//! active transmit, the power never changes under an active receive or
//! transmit. A request that cannot be applied yet stays pending until the
//! receive or transmit completion path calls
//! [`update_channel`](MacRadio::update_channel) /
//! [`update_tx_power`](MacRadio::update_tx_power).
//!
//! The module also owns the radio's address filtering registers, the receive
//! filter used during scans, and energy detect.
//!
//! # Example
//!
//! ```
//! use mac_low_level::mac::{MacRadio, RadioActivity, RxOnOff};
//! use mac_low_level::sim::{SimRadio, SimTimer};
//!
//! let timer = SimTimer::new();
//! let radio = SimRadio::new();
//! let activity = RadioActivity::new();
//! let rx = RxOnOff::new(&radio, &activity);
//! let mac_radio = MacRadio::new(&timer, &radio, &activity, &rx);
//! mac_radio.init();
//!
//! // Deferred while transmitting
//! activity.set_tx_active(true);
//! mac_radio.set_channel(20);
//! assert_eq!(mac_radio.channel(), 11);
//!
//! // Applied by the transmit completion path
//! activity.set_tx_active(false);
//! mac_radio.update_channel();
//! assert_eq!(mac_radio.channel(), 20);
//! assert_eq!(radio.channel(), 20);
//! ```

use super::activity::RadioActivity;
use super::energy_detect::EnergyDetect;
use super::rx_onoff::RxOnOff;
use crate::hal::critical::{self, CriticalSection};
use crate::hal::defs::{
    CHANNEL_DEFAULT, CHANNEL_MAX_ACCEPTED, CHANNEL_MIN, TX_POWER_DEFAULT, TX_POWER_MAX_MINUS_DBM,
    TX_POWER_TABLE,
};
use crate::hal::{HardwareTimer, RadioControl};
use log::debug;
use std::cell::Cell;

/// PAN ID used while scanning for networks.
pub const BROADCAST_PAN_ID: u16 = 0xFFFF;

/// Frames the receive path drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RxFilter {
    /// Normal operation.
    #[default]
    Off,
    /// Drop everything (energy detect scan).
    All,
    /// Drop all but beacons (active and passive scan).
    NonBeaconFrames,
    /// Drop all but MAC commands (orphan scan).
    NonCommandFrames,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    EnergyDetect,
    Active,
    Passive,
    Orphan,
}

impl ScanMode {
    /// Receive filter in effect while scanning in this mode.
    pub fn rx_filter(self) -> RxFilter {
        match self {
            Self::EnergyDetect => RxFilter::All,
            Self::Orphan => RxFilter::NonCommandFrames,
            Self::Active | Self::Passive => RxFilter::NonBeaconFrames,
        }
    }
}

/// Requested and applied radio parameters.
pub struct MacRadio<'a, T: HardwareTimer, R: RadioControl> {
    radio: &'a R,
    activity: &'a RadioActivity,
    rx: &'a RxOnOff<'a, R>,
    energy_detect: EnergyDetect<'a, T, R>,
    requested_channel: Cell<u8>,
    channel: Cell<u8>,
    requested_tx_power: Cell<u8>,
    tx_power: Cell<u8>,
    rx_filter: Cell<RxFilter>,
    pan_id: Cell<u16>,
}

impl<'a, T: HardwareTimer, R: RadioControl> MacRadio<'a, T, R> {
    pub fn new(
        timer: &'a T,
        radio: &'a R,
        activity: &'a RadioActivity,
        rx: &'a RxOnOff<'a, R>,
    ) -> Self {
        Self {
            radio,
            activity,
            rx,
            energy_detect: EnergyDetect::new(timer, radio),
            requested_channel: Cell::new(CHANNEL_DEFAULT),
            channel: Cell::new(CHANNEL_DEFAULT),
            requested_tx_power: Cell::new(TX_POWER_DEFAULT),
            tx_power: Cell::new(TX_POWER_DEFAULT),
            rx_filter: Cell::new(RxFilter::Off),
            pan_id: Cell::new(BROADCAST_PAN_ID),
        }
    }

    /// Reset the shadows to the radio's power-on register values.
    pub fn init(&self) {
        critical::with(|| {
            self.requested_channel.set(CHANNEL_DEFAULT);
            self.channel.set(CHANNEL_DEFAULT);
            self.requested_tx_power.set(TX_POWER_DEFAULT);
            self.tx_power.set(TX_POWER_DEFAULT);
            self.rx_filter.set(RxFilter::Off);
        });
    }

    /// Abort any scan or energy measurement.
    pub fn reset(&self) {
        self.stop_scan();
        self.energy_detect.stop();
    }

    pub fn set_pan_coordinator(&self, pan_coordinator: bool) {
        self.radio.set_pan_coordinator(pan_coordinator);
    }

    /// Set the PAN ID. The value is remembered so a scan can restore it.
    pub fn set_pan_id(&self, pan_id: u16) {
        self.pan_id.set(pan_id);
        self.radio.set_pan_id(pan_id);
    }

    pub fn set_short_addr(&self, short_addr: u16) {
        self.radio.set_short_addr(short_addr);
    }

    pub fn set_ieee_addr(&self, ieee_addr: &[u8; 8]) {
        self.radio.set_ieee_addr(ieee_addr);
    }

    /// Request a transmit power `minus_dbm` below maximum. Values beyond the
    /// radio's range are clamped to its lowest setting.
    pub fn set_tx_power(&self, minus_dbm: u8) {
        let minus_dbm = minus_dbm.min(TX_POWER_MAX_MINUS_DBM);

        let written = {
            let _cs = CriticalSection::enter();
            self.requested_tx_power.set(TX_POWER_TABLE[usize::from(minus_dbm)]);
            if self.activity.is_idle() {
                self.apply_tx_power()
            } else {
                None
            }
        };
        if let Some(register) = written {
            debug!("tx power register 0x{:02X}", register);
        }
    }

    /// Write the requested transmit power if it differs from the applied one.
    pub fn update_tx_power(&self) {
        let written = {
            let _cs = CriticalSection::enter();
            self.apply_tx_power()
        };
        if let Some(register) = written {
            debug!("tx power register 0x{:02X}", register);
        }
    }

    /// Must be called with interrupts disabled. Returns the register value
    /// written, if any.
    fn apply_tx_power(&self) -> Option<u8> {
        let requested = self.requested_tx_power.get();
        if requested == self.tx_power.get() {
            return None;
        }
        self.tx_power.set(requested);
        self.radio.set_tx_power(requested);
        Some(requested)
    }

    /// Request a channel. Applied at once unless a transmit is active.
    pub fn set_channel(&self, channel: u8) {
        // Accepts 27 and 28 although only 11..=26 are defined channels
        debug_assert!(
            (CHANNEL_MIN..=CHANNEL_MAX_ACCEPTED).contains(&channel),
            "illegal channel {}",
            channel
        );

        critical::with(|| self.requested_channel.set(channel));

        if !self.activity.tx_active() {
            self.update_channel();
        }
    }

    /// Tune to the requested channel if it differs from the applied one.
    /// Any receive in progress is abandoned.
    pub fn update_channel(&self) {
        let changed = critical::with(|| {
            let requested = self.requested_channel.get();
            if requested != self.channel.get() {
                self.channel.set(requested);
                Some(requested)
            } else {
                None
            }
        });

        if let Some(channel) = changed {
            self.rx.rx_off();
            self.radio.set_channel(channel);
            self.rx.on_request();
            debug!("channel {}", channel);
        }
    }

    /// Set up receive filtering for a scan. Filtering must be off.
    pub fn start_scan(&self, mode: ScanMode) {
        debug_assert!(
            self.rx_filter.get() == RxFilter::Off,
            "receive filter must be off to start a scan"
        );

        self.rx_filter.set(mode.rx_filter());
        if matches!(mode, ScanMode::Active | ScanMode::Passive) {
            self.radio.set_pan_id(BROADCAST_PAN_ID);
        }
        debug!("scan started: {:?}", mode);
    }

    /// Turn receive filtering off and restore the PAN ID.
    pub fn stop_scan(&self) {
        self.rx_filter.set(RxFilter::Off);
        self.radio.set_pan_id(self.pan_id.get());
    }

    pub fn energy_detect_start(&self) {
        self.energy_detect.start();
    }

    /// Stop energy detect and return the measured level.
    pub fn energy_detect_stop(&self) -> u8 {
        self.energy_detect.stop()
    }

    pub fn energy_detect(&self) -> &EnergyDetect<'a, T, R> {
        &self.energy_detect
    }

    /// Channel the radio is tuned to.
    pub fn channel(&self) -> u8 {
        critical::with(|| self.channel.get())
    }

    pub fn requested_channel(&self) -> u8 {
        critical::with(|| self.requested_channel.get())
    }

    /// Transmit power register value in effect.
    pub fn tx_power(&self) -> u8 {
        critical::with(|| self.tx_power.get())
    }

    pub fn requested_tx_power(&self) -> u8 {
        critical::with(|| self.requested_tx_power.get())
    }

    pub fn rx_filter(&self) -> RxFilter {
        self.rx_filter.get()
    }

    pub fn pan_id(&self) -> u16 {
        self.pan_id.get()
    }
}

//! Simulated radio.

use crate::hal::defs::{CHANNEL_DEFAULT, TX_POWER_DEFAULT};
use crate::hal::RadioControl;
use std::cell::{Cell, RefCell};

/// A register-level action taken on the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioEvent {
    RxOn,
    RxTxOff,
    FlushRxFifo,
    ClearRxThreshold,
    EnableRxThreshold,
    Channel(u8),
    TxPower(u8),
    PanCoordinator(bool),
    PanId(u16),
    ShortAddr(u16),
    IeeeAddr([u8; 8]),
    EnterNoiseSampling,
    ExitNoiseSampling,
}

/// Radio that records every strobe and register write.
///
/// Register state starts at the hardware reset values. Noise bits come from
/// a xorshift generator; a zero seed makes the noise source stuck at zero.
#[derive(Debug)]
pub struct SimRadio {
    events: RefCell<Vec<RadioEvent>>,
    receiving: Cell<bool>,
    noise_sampling: Cell<bool>,
    indicator: Cell<bool>,
    channel: Cell<u8>,
    tx_power: Cell<u8>,
    pan_coordinator: Cell<bool>,
    pan_id: Cell<u16>,
    short_addr: Cell<u16>,
    ieee_addr: Cell<[u8; 8]>,
    rssi: Cell<i8>,
    noise: Cell<u32>,
}

impl Default for SimRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl SimRadio {
    pub const DEFAULT_NOISE_SEED: u32 = 0x2545_F491;

    pub fn new() -> Self {
        Self {
            events: RefCell::new(Vec::new()),
            receiving: Cell::new(false),
            noise_sampling: Cell::new(false),
            indicator: Cell::new(false),
            channel: Cell::new(CHANNEL_DEFAULT),
            tx_power: Cell::new(TX_POWER_DEFAULT),
            pan_coordinator: Cell::new(false),
            pan_id: Cell::new(0xFFFF),
            short_addr: Cell::new(0xFFFF),
            ieee_addr: Cell::new([0; 8]),
            rssi: Cell::new(-100),
            noise: Cell::new(Self::DEFAULT_NOISE_SEED),
        }
    }

    /// Every recorded action, oldest first.
    pub fn events(&self) -> Vec<RadioEvent> {
        self.events.borrow().clone()
    }

    /// Return the recorded actions and start a fresh log.
    pub fn take_events(&self) -> Vec<RadioEvent> {
        self.events.take()
    }

    /// Number of recorded occurrences of `event`.
    pub fn count(&self, event: RadioEvent) -> usize {
        self.events.borrow().iter().filter(|e| **e == event).count()
    }

    pub fn is_receiving(&self) -> bool {
        self.receiving.get()
    }

    pub fn is_noise_sampling(&self) -> bool {
        self.noise_sampling.get()
    }

    pub fn indicator_on(&self) -> bool {
        self.indicator.get()
    }

    pub fn channel(&self) -> u8 {
        self.channel.get()
    }

    pub fn tx_power(&self) -> u8 {
        self.tx_power.get()
    }

    pub fn pan_coordinator(&self) -> bool {
        self.pan_coordinator.get()
    }

    pub fn pan_id(&self) -> u16 {
        self.pan_id.get()
    }

    pub fn short_addr(&self) -> u16 {
        self.short_addr.get()
    }

    pub fn ieee_addr(&self) -> [u8; 8] {
        self.ieee_addr.get()
    }

    /// Value returned by subsequent RSSI reads.
    pub fn set_rssi(&self, rssi: i8) {
        self.rssi.set(rssi);
    }

    pub fn set_noise_seed(&self, seed: u32) {
        self.noise.set(seed);
    }

    fn record(&self, event: RadioEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl RadioControl for SimRadio {
    fn rx_on(&self) {
        self.receiving.set(true);
        self.record(RadioEvent::RxOn);
    }

    fn rxtx_off(&self) {
        self.receiving.set(false);
        self.record(RadioEvent::RxTxOff);
    }

    fn flush_rx_fifo(&self) {
        self.record(RadioEvent::FlushRxFifo);
    }

    fn clear_rx_threshold_interrupt(&self) {
        self.record(RadioEvent::ClearRxThreshold);
    }

    fn enable_rx_threshold_interrupt(&self) {
        self.record(RadioEvent::EnableRxThreshold);
    }

    fn set_channel(&self, channel: u8) {
        self.channel.set(channel);
        self.record(RadioEvent::Channel(channel));
    }

    fn set_tx_power(&self, register_value: u8) {
        self.tx_power.set(register_value);
        self.record(RadioEvent::TxPower(register_value));
    }

    fn set_pan_coordinator(&self, pan_coordinator: bool) {
        self.pan_coordinator.set(pan_coordinator);
        self.record(RadioEvent::PanCoordinator(pan_coordinator));
    }

    fn set_pan_id(&self, pan_id: u16) {
        self.pan_id.set(pan_id);
        self.record(RadioEvent::PanId(pan_id));
    }

    fn set_short_addr(&self, short_addr: u16) {
        self.short_addr.set(short_addr);
        self.record(RadioEvent::ShortAddr(short_addr));
    }

    fn set_ieee_addr(&self, ieee_addr: &[u8; 8]) {
        self.ieee_addr.set(*ieee_addr);
        self.record(RadioEvent::IeeeAddr(*ieee_addr));
    }

    fn rssi(&self) -> i8 {
        self.rssi.get()
    }

    fn enter_noise_sampling(&self) {
        self.noise_sampling.set(true);
        self.receiving.set(true);
        self.record(RadioEvent::EnterNoiseSampling);
    }

    fn noise_bit(&self) -> bool {
        let mut x = self.noise.get();
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.noise.set(x);
        x & 1 == 1
    }

    fn exit_noise_sampling(&self) {
        self.noise_sampling.set(false);
        self.receiving.set(false);
        self.record(RadioEvent::ExitNoiseSampling);
    }

    fn rx_indicator(&self, on: bool) {
        self.indicator.set(on);
    }
}

//! Host simulation of the MAC low level.
//!
//! Runs the MAC against the simulated timer and radio and logs what it does:
//! - a trigger armed behind the count, fired after the rollover
//! - a periodic trigger re-armed from its own callback
//! - receiver arbitration around a receive and a transmit
//! - a deferred channel change and a frame realignment
//! - an energy detect scan over random channel noise
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin backoff-sim [config.json]
//! RUST_LOG=trace cargo run --bin backoff-sim
//! ```

use log::{error, info};
use mac_low_level::hal::critical;
use mac_low_level::hal::defs::TICKS_EXPECTED_AT_SFD;
use mac_low_level::mac::{
    rx_flags, BackoffClient, BackoffTimer, MacLowLevel, MacRadio, MacRandom, RadioActivity,
    RxOnOff, RxTxHooks, ScanMode,
};
use mac_low_level::sim::{SimRadio, SimTimer};
use mac_low_level::MacConfig;
use rand_core::{OsRng, RngCore};
use std::cell::Cell;

/// Backoffs between periodic triggers.
const TRIGGER_PERIOD: u32 = 16;

/// Upper layer that logs every callback and optionally re-arms the trigger.
struct Upper<'a> {
    clock: &'a BackoffTimer<'a, SimTimer>,
    periodic: Cell<bool>,
    rollovers: Cell<u32>,
    triggers: Cell<u32>,
}

impl BackoffClient for Upper<'_> {
    fn rollover(&self) {
        self.rollovers.set(self.rollovers.get() + 1);
        info!("rollover #{}", self.rollovers.get());
    }

    fn trigger(&self) {
        self.triggers.set(self.triggers.get() + 1);
        info!(
            "trigger #{} at backoff {}",
            self.triggers.get(),
            self.clock.count()
        );

        if self.periodic.get() {
            let next = (self.clock.trigger() + TRIGGER_PERIOD) % self.clock.rollover();
            self.clock.set_trigger(next);
        }
    }
}

impl RxTxHooks for Upper<'_> {
    fn rx_halt_cleanup(&self) {
        info!("receive halted");
    }

    fn start_queued_frame(&self) {
        info!("no frame queued");
    }
}

fn load_config() -> Result<MacConfig, String> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(MacConfig::default());
    };

    let json =
        std::fs::read_to_string(&path).map_err(|e| format!("cannot read {}: {}", path, e))?;
    MacConfig::from_json(&json).map_err(|e| format!("{}: {}", path, e))
}

fn service(timer: &SimTimer, mac: &MacLowLevel<'_, SimTimer, SimRadio>, backoffs: u32) {
    for _ in 0..backoffs {
        timer.step();
        while let Some(source) = timer.pending_interrupt() {
            mac.timer_isr(source);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("=== MAC low-level simulation ===");
    info!("{:?}", config);

    let timer = SimTimer::new();
    let radio = SimRadio::new();
    radio.set_noise_seed(OsRng.next_u32());
    let activity = RadioActivity::new();
    let random = MacRandom::new();
    let rx = RxOnOff::new(&radio, &activity);
    let mac_radio = MacRadio::new(&timer, &radio, &activity, &rx);
    let backoff = BackoffTimer::new(&timer, &activity, config.backoff_rollover);
    let upper = Upper {
        clock: &backoff,
        periodic: Cell::new(false),
        rollovers: Cell::new(0),
        triggers: Cell::new(0),
    };
    backoff.set_client(&upper);
    rx.set_hooks(&upper);

    let mac = match MacLowLevel::new(&timer, &radio, &random, &rx, &mac_radio, &backoff, config) {
        Ok(mac) => mac,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    mac.init();
    let rollover = backoff.rollover();

    info!("--- trigger behind the count ---");
    backoff.set_count(rollover.saturating_sub(3));
    backoff.set_trigger(3u32.min(rollover - 1));
    info!("armed as {:?}", backoff.compare_state());
    service(&timer, &mac, 6);
    info!("now {:?} at backoff {}", backoff.compare_state(), backoff.count());

    info!("--- periodic trigger every {} backoffs ---", TRIGGER_PERIOD);
    upper.periodic.set(true);
    backoff.set_trigger((backoff.count() + 1) % rollover);
    service(&timer, &mac, TRIGGER_PERIOD * 4);
    upper.periodic.set(false);
    backoff.cancel_trigger();
    info!(
        "{} rollovers, {} triggers so far",
        upper.rollovers.get(),
        upper.triggers.get()
    );

    info!("--- receiver arbitration ---");
    rx.enable(rx_flags::WHEN_IDLE);
    activity.set_rx_active(true);
    rx.disable(rx_flags::WHEN_IDLE);
    info!("disabled mid-receive, receiver on: {}", rx.is_rx_on());
    activity.set_rx_active(false);
    rx.off_request();
    info!("after receive, receiver on: {}", rx.is_rx_on());

    info!("--- deferred channel change ---");
    let next_channel = if mac_radio.channel() == 26 { 11 } else { 26 };
    activity.set_tx_active(true);
    mac_radio.set_channel(next_channel);
    info!(
        "requested {} during transmit, tuned to {}",
        mac_radio.requested_channel(),
        mac_radio.channel()
    );
    activity.set_tx_active(false);
    mac_radio.update_channel();
    info!("after transmit, tuned to {}", mac_radio.channel());

    info!("--- realign to a received frame ---");
    let late_by = (random.random_byte() % 8) as u32;
    let delta = backoff.realign(late_by, TICKS_EXPECTED_AT_SFD + 200);
    info!("frame {} backoffs late, clock moved by {}", late_by, delta);

    info!("--- energy detect scan ---");
    mac_radio.start_scan(ScanMode::EnergyDetect);
    mac_radio.energy_detect_start();
    for _ in 0..8 {
        radio.set_rssi(-100 + (OsRng.next_u32() % 80) as i8);
        service(&timer, &mac, 1);
    }
    let level = mac_radio.energy_detect_stop();
    mac_radio.stop_scan();
    info!(
        "peak RSSI {} dBm, energy level {}",
        mac_radio.energy_detect().max_rssi(),
        level
    );

    info!("--- reset ---");
    critical::with(|| mac.reset());
    info!(
        "backoff {} of {}, receiver on: {}",
        backoff.count(),
        backoff.rollover(),
        rx.is_rx_on()
    );
}

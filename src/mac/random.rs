//! Pseudo-random bytes for CSMA backoff exponents and sequence numbers.
//!
//! A 16-bit Galois LFSR seeded from receiver ADC noise. Not suitable for
//! anything cryptographic.
//!
//! # Example
//!
//! ```
//! use mac_low_level::mac::MacRandom;
//! use mac_low_level::sim::SimRadio;
//! use rand_core::RngCore;
//!
//! let radio = SimRadio::new();
//! let mut random = MacRandom::new();
//! random.init(&radio);
//!
//! let backoff_exponent = random.random_byte() & 0x07;
//! assert!(backoff_exponent < 8);
//!
//! let mut buf = [0u8; 4];
//! random.fill_bytes(&mut buf);
//! ```

use crate::hal::critical;
use crate::hal::RadioControl;
use log::debug;
use rand_core::{impls, RngCore};
use std::cell::Cell;

/// Seed used when the noise source produced sixteen zero bits.
pub const DEFAULT_RANDOM_SEED: u16 = 0xBEEF;

/// Feedback taps for x^16 + x^14 + x^13 + x^11 + 1.
const LFSR_TAPS: u16 = 0xB400;

#[derive(Debug)]
pub struct MacRandom {
    lfsr: Cell<u16>,
}

impl Default for MacRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl MacRandom {
    pub fn new() -> Self {
        Self {
            lfsr: Cell::new(DEFAULT_RANDOM_SEED),
        }
    }

    /// Seed from sixteen bits of receiver noise. The radio is left off.
    pub fn init<R: RadioControl>(&self, radio: &R) {
        radio.enter_noise_sampling();
        let seed = (0..16).fold(0u16, |seed, _| (seed << 1) | u16::from(radio.noise_bit()));
        radio.exit_noise_sampling();

        self.seed(seed);
        debug!("random seeded with 0x{:04X}", self.lfsr.get());
    }

    /// Seed directly. A zero seed is replaced with [`DEFAULT_RANDOM_SEED`].
    pub fn seed(&self, seed: u16) {
        let seed = if seed == 0 { DEFAULT_RANDOM_SEED } else { seed };
        critical::with(|| self.lfsr.set(seed));
    }

    /// Clock the generator once and return its high byte.
    pub fn random_byte(&self) -> u8 {
        critical::with(|| {
            let state = self.lfsr.get();
            let mut next = state >> 1;
            if state & 1 != 0 {
                next ^= LFSR_TAPS;
            }
            self.lfsr.set(next);
            (next >> 8) as u8
        })
    }

    pub fn state(&self) -> u16 {
        self.lfsr.get()
    }
}

impl RngCore for MacRandom {
    fn next_u32(&mut self) -> u32 {
        impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest.iter_mut() {
            *byte = self.random_byte();
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

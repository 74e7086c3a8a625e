//! Platform constants for the single-chip 802.15.4 radio/MCU.
//!
//! Timing values assume the 32 MHz system clock; the MAC timer runs at the
//! CPU clock, so one microsecond is exactly 32 timer ticks.

// ==================== IEEE 802.15.4 PHY/MAC timing ====================

/// Microseconds per symbol at 2.4 GHz (62.5 ksymbol/s).
pub const USECS_PER_SYMBOL: u16 = 16;

/// Symbols per backoff period (aUnitBackoffPeriod).
pub const SYMBOLS_PER_BACKOFF: u16 = 20;

/// Microseconds per backoff period.
pub const USECS_PER_BACKOFF: u16 = USECS_PER_SYMBOL * SYMBOLS_PER_BACKOFF;

/// Preamble field length in symbols.
pub const PREAMBLE_FIELD_LENGTH: u16 = 8;

/// Start-of-frame delimiter field length in symbols.
pub const SFD_FIELD_LENGTH: u16 = 2;

/// aBaseSuperframeDuration expressed in backoff periods (960 symbols).
pub const BASE_SUPERFRAME_BACKOFFS: u32 = 960 / SYMBOLS_PER_BACKOFF as u32;

// ==================== MAC timer ====================

/// System clock in MHz. The only supported speed.
pub const CPU_CLOCK_MHZ: u16 = 32;

/// Timer ticks per microsecond (never fractional).
pub const TIMER_TICKS_PER_USEC: u16 = CPU_CLOCK_MHZ;

/// Timer ticks per backoff period; the hardware timer period.
pub const TIMER_TICKS_PER_BACKOFF: u16 = CPU_CLOCK_MHZ * USECS_PER_BACKOFF;

/// Timer ticks per symbol.
pub const TIMER_TICKS_PER_SYMBOL: u16 = CPU_CLOCK_MHZ * USECS_PER_SYMBOL;

/// Largest value the hardware overflow (backoff) counter can hold; it is
/// 20 bits wide.
pub const BACKOFF_COUNT_MAX: u32 = 0x000F_FFFF;

/// Rollover programmed by backoff clock init: the superframe duration at
/// beacon order 14.
pub const DEFAULT_BACKOFF_ROLLOVER: u32 = BASE_SUPERFRAME_BACKOFFS << 14;

// ==================== SFD alignment ====================

/// Lower bound of the characterized receive plus transmit propagation
/// delay inside the radio, in nanoseconds.
pub const RX_TX_PROP_DELAY_MIN_NS: u32 = 3076;
/// Upper bound of the characterized propagation delay, in nanoseconds.
pub const RX_TX_PROP_DELAY_MAX_NS: u32 = 3284;

/// Average propagation delay rounded to whole timer ticks.
pub const RX_TX_PROP_DELAY_AVG_TICKS: u16 = {
    let avg_ns = (RX_TX_PROP_DELAY_MIN_NS + RX_TX_PROP_DELAY_MAX_NS) / 2;
    ((TIMER_TICKS_PER_USEC as u32 * avg_ns + 500) / 1000) as u16
};

/// Symbols from the transmit strobe until the preamble goes over the air.
pub const SYMBOLS_FROM_STROBE_TO_PREAMBLE: u16 = 12;

/// Symbol offset within a backoff at which the SFD signal occurs for a frame
/// strobed exactly on a backoff boundary.
///
/// Strobe to SFD spans 22 symbols, longer than one backoff, so only the
/// remainder matters.
pub const SYMBOLS_EXPECTED_AT_SFD: u16 =
    (SYMBOLS_FROM_STROBE_TO_PREAMBLE + PREAMBLE_FIELD_LENGTH + SFD_FIELD_LENGTH)
        % SYMBOLS_PER_BACKOFF;

const _: () = assert!(
    SYMBOLS_EXPECTED_AT_SFD == 2,
    "slotted alignment symbol offset must be 2"
);

/// Timer tick within a backoff at which a perfectly aligned SFD is captured.
///
/// Includes the propagation delay, so the local time base ends up skewed by
/// the transmit-side delay; transmits therefore go out on time without any
/// further correction.
pub const TICKS_EXPECTED_AT_SFD: u16 =
    SYMBOLS_EXPECTED_AT_SFD * TIMER_TICKS_PER_SYMBOL + RX_TX_PROP_DELAY_AVG_TICKS;

// ==================== Radio ====================

/// Lowest 802.15.4 channel in the 2.4 GHz band.
pub const CHANNEL_MIN: u8 = 11;

/// Highest documented 2.4 GHz channel.
pub const CHANNEL_MAX: u8 = 26;

/// Upper bound accepted by the channel precondition, wider than
/// [`CHANNEL_MAX`]. [`MacConfig`](crate::config::MacConfig) still rejects
/// 27 and 28.
pub const CHANNEL_MAX_ACCEPTED: u8 = 28;

/// Channel the radio comes out of reset on.
pub const CHANNEL_DEFAULT: u8 = 11;

/// Transmit power register value the radio comes out of reset with (0 dBm).
pub const TX_POWER_DEFAULT: u8 = 0x1F;

/// Largest supported attenuation in dB.
pub const TX_POWER_MAX_MINUS_DBM: u8 = 25;

/// Transmit power register values indexed by attenuation in dB.
///
/// Datasheet values at 0, -1, -3, -5, -7, -10, -15 and -25 dBm; the rest
/// round to the next weaker setting.
pub const TX_POWER_TABLE: [u8; TX_POWER_MAX_MINUS_DBM as usize + 1] = [
    0x1F, // 0 dBm
    0x1B, // -1 dBm
    0x1B, // -2
    0x17, // -3 dBm
    0x17, // -4
    0x13, // -5 dBm
    0x13, // -6
    0x0F, // -7 dBm
    0x0F, // -8
    0x0F, // -9
    0x0B, // -10 dBm
    0x0B, // -11
    0x0B, // -12
    0x0B, // -13
    0x0B, // -14
    0x07, // -15 dBm
    0x07, // -16
    0x07, // -17
    0x07, // -18
    0x07, // -19
    0x07, // -20
    0x07, // -21
    0x07, // -22
    0x07, // -23
    0x07, // -24
    0x03, // -25 dBm
];

/// RSSI register offset in dBm.
pub const RSSI_OFFSET: i8 = -38;

/// Convert a raw RSSI reading into an energy-detect level.
pub const fn rssi_to_ed(rssi: i8) -> u8 {
    if rssi < RSSI_OFFSET {
        0
    } else {
        (rssi as i16 - RSSI_OFFSET as i16) as u8
    }
}

/// Convert an energy-detect level into a link quality indication.
pub const fn ed_to_lqi(ed: u8) -> u8 {
    if ed > 63 {
        255
    } else {
        ed << 2
    }
}

/// Convert a raw RSSI reading straight to link quality.
pub const fn rssi_to_lqi(rssi: i8) -> u8 {
    ed_to_lqi(rssi_to_ed(rssi))
}

//! MAC low-level configuration.
//!
//! Values the board or the host simulator may override at start-up. Missing
//! fields fall back to the platform defaults.
//!
//! # Example
//!
//! ```
//! use mac_low_level::config::MacConfig;
//!
//! let config = MacConfig::from_json(r#"{ "channel": 20 }"#).unwrap();
//! assert_eq!(config.channel, 20);
//! assert_eq!(config.tx_power_minus_dbm, 0);
//! assert!(config.validate().is_ok());
//! ```

use crate::hal::defs::{
    BACKOFF_COUNT_MAX, CHANNEL_DEFAULT, CHANNEL_MAX, CHANNEL_MIN, DEFAULT_BACKOFF_ROLLOVER,
    TX_POWER_MAX_MINUS_DBM,
};
use serde::Deserialize;
use std::fmt;

/// Start-up settings for the MAC low level.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MacConfig {
    /// Backoff count at which the clock wraps.
    pub backoff_rollover: u32,
    /// 802.15.4 channel (11-26).
    pub channel: u8,
    /// Transmit power in dB below maximum (0-25).
    pub tx_power_minus_dbm: u8,
}

impl Default for MacConfig {
    fn default() -> Self {
        Self {
            backoff_rollover: DEFAULT_BACKOFF_ROLLOVER,
            channel: CHANNEL_DEFAULT,
            tx_power_minus_dbm: 0,
        }
    }
}

impl MacConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backoff_rollover == 0 {
            return Err(ConfigError::RolloverZero);
        }
        if self.backoff_rollover > BACKOFF_COUNT_MAX {
            return Err(ConfigError::RolloverTooLarge {
                rollover: self.backoff_rollover,
                max: BACKOFF_COUNT_MAX,
            });
        }
        if !(CHANNEL_MIN..=CHANNEL_MAX).contains(&self.channel) {
            return Err(ConfigError::ChannelOutOfRange(self.channel));
        }
        if self.tx_power_minus_dbm > TX_POWER_MAX_MINUS_DBM {
            return Err(ConfigError::TxPowerOutOfRange {
                minus_dbm: self.tx_power_minus_dbm,
                max: TX_POWER_MAX_MINUS_DBM,
            });
        }

        Ok(())
    }
}

/// Errors from configuration parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Rollover must be at least one backoff.
    RolloverZero,
    /// Rollover does not fit the hardware overflow counter.
    RolloverTooLarge { rollover: u32, max: u32 },
    /// Channel outside 11-26.
    ChannelOutOfRange(u8),
    /// Attenuation beyond the power table.
    TxPowerOutOfRange { minus_dbm: u8, max: u8 },
    /// Malformed JSON.
    InvalidFormat(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RolloverZero => write!(f, "backoff rollover cannot be zero"),
            Self::RolloverTooLarge { rollover, max } => {
                write!(f, "backoff rollover too large: {} (max {})", rollover, max)
            }
            Self::ChannelOutOfRange(channel) => write!(
                f,
                "channel {} out of range ({}-{})",
                channel, CHANNEL_MIN, CHANNEL_MAX
            ),
            Self::TxPowerOutOfRange { minus_dbm, max } => {
                write!(f, "tx power -{} dBm out of range (max -{})", minus_dbm, max)
            }
            Self::InvalidFormat(msg) => write!(f, "invalid format: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

//! Link configuration

use pixelosd_hal::uart::{UartConfig, DEFAULT_BAUDRATE};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How long to wait for a response
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u32 = 500;

/// Pause between info polls while the OSD boots
pub const DEFAULT_BOOT_RETRY_DELAY_MS: u32 = 100;

/// Link parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// Bit rate to negotiate once the OSD is up
    pub baudrate: u32,
    /// Bit rate the OSD listens on after power-up
    pub default_baudrate: u32,
    /// Deadline for each command/response exchange
    pub response_timeout_ms: u32,
    /// Delay between info polls during bring-up
    pub boot_retry_delay_ms: u32,
    /// Give up bring-up after this many info polls (`None` polls forever)
    pub boot_attempts: Option<u32>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baudrate: DEFAULT_BAUDRATE,
            default_baudrate: DEFAULT_BAUDRATE,
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
            boot_retry_delay_ms: DEFAULT_BOOT_RETRY_DELAY_MS,
            boot_attempts: None,
        }
    }
}

impl LinkConfig {
    /// Default configuration negotiating `baudrate` after bring-up
    pub fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            ..Self::default()
        }
    }

    /// Bound the bring-up poll
    pub fn boot_attempts(mut self, attempts: u32) -> Self {
        self.boot_attempts = Some(attempts);
        self
    }

    /// UART configuration for the power-up bit rate
    pub fn default_uart(&self) -> UartConfig {
        UartConfig::with_baudrate(self.default_baudrate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.baudrate, 115_200);
        assert_eq!(config.default_baudrate, 115_200);
        assert_eq!(config.response_timeout_ms, 500);
        assert_eq!(config.boot_retry_delay_ms, 100);
        assert_eq!(config.boot_attempts, None);
    }

    #[test]
    fn test_builders() {
        let config = LinkConfig::with_baudrate(921_600).boot_attempts(5);
        assert_eq!(config.baudrate, 921_600);
        assert_eq!(config.default_baudrate, 115_200);
        assert_eq!(config.boot_attempts, Some(5));
        assert_eq!(config.default_uart().baudrate, 115_200);
    }
}

//! Link bring-up
//!
//! ```text
//!   configure UART @ default rate
//!              │
//!              ▼
//!   ┌─▶ info request ── no/bad answer ── delay ─┐
//!   │          │                                │
//!   └──────────┼────────────────────────────────┘
//!              ▼ accepted
//!   rate differs? ── yes ──▶ set data rate, follow OSD
//!              │
//!              ▼
//!   drawing reset, clear screen
//! ```

use pixelosd_hal::uart::{Uart, UartConfig};
use embedded_hal::delay::DelayNs;
use pixelosd_hal::Clock;
use pixelosd_protocol::{InfoResponse, OsdCommand};

use crate::error::LinkError;
use crate::osd::PixelOsd;
use crate::transceiver::LinkResult;

/// State of an established link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Session {
    /// Bit rate both ends are using
    pub baudrate: u32,
    /// What the OSD reported during bring-up
    pub info: InfoResponse,
}

impl<E> LinkError<E> {
    /// Whether the bring-up poll should try again after this error
    fn retry_on_boot(&self) -> bool {
        !matches!(self, LinkError::Transport(_) | LinkError::Encode(_))
    }
}

impl<U: Uart, C: Clock, D: DelayNs> PixelOsd<U, C, D> {
    /// Bring the link up
    ///
    /// Polls the OSD until it answers an info request, negotiates the
    /// configured bit rate, then resets drawing state and clears the
    /// screen. Returns the bit rate in use.
    ///
    /// Polling is unbounded unless [`LinkConfig::boot_attempts`] is set.
    /// A failed rate negotiation is not fatal; the link stays at the
    /// rate it was polled at.
    ///
    /// Calling `begin` again polls at the rate of the current session, so
    /// a link that already switched rate is found where it is. Only
    /// [`reboot`](Self::reboot) returns to the power-up rate.
    ///
    /// [`LinkConfig::boot_attempts`]: crate::config::LinkConfig::boot_attempts
    pub fn begin(&mut self) -> LinkResult<u32, U> {
        let uart_config = match self.session {
            Some(session) => UartConfig::with_baudrate(session.baudrate),
            None => self.config.default_uart(),
        };
        self.link.configure(&uart_config)?;

        let info = self.wait_for_boot()?;
        info!(
            "PixelOSD {}.{}.{} ({}x{} grid)",
            info.version_major,
            info.version_minor,
            info.version_patch,
            info.grid_columns,
            info.grid_rows
        );
        self.session = Some(Session {
            baudrate: uart_config.baudrate,
            info,
        });

        let target = self.config.baudrate;
        if target != uart_config.baudrate {
            match self.set_data_rate(target) {
                Ok(applied) => debug!("link at {} baud", applied),
                Err(LinkError::Transport(e)) => return Err(LinkError::Transport(e)),
                Err(_) => warn!(
                    "rate change to {} failed, staying at {}",
                    target, uart_config.baudrate
                ),
            }
        }

        self.draw(&OsdCommand::DrawingReset)?;
        self.draw(&OsdCommand::ClearScreen)?;

        Ok(self.baudrate())
    }

    /// Bit rate in use
    pub fn baudrate(&self) -> u32 {
        self.session
            .map(|s| s.baudrate)
            .unwrap_or(self.config.default_baudrate)
    }

    fn wait_for_boot(&mut self) -> LinkResult<InfoResponse, U> {
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            match self.info() {
                Ok(info) => return Ok(info),
                Err(e) if !e.retry_on_boot() => return Err(e),
                Err(_) => {}
            }

            if self.config.boot_attempts.is_some_and(|max| attempt >= max) {
                warn!("OSD not answering after {} attempts", attempt);
                return Err(LinkError::Timeout);
            }
            debug!("waiting for OSD (attempt {})", attempt);
            self.delay.delay_ms(self.config.boot_retry_delay_ms);
        }
    }
}

//! Command/response exchange over the byte transport
//!
//! ```text
//!   host                                   OSD
//!    │ ── "$A" len id payload crc ────────▶ │
//!    │                                      │
//!    │ ◀──────── "$A" len id payload crc ── │   id == expected: accept
//!    │ ◀──────── "$A" len 0  [id]    crc ── │   error frame:    reject
//!    │ ◀──────── anything else ──────────── │   discard, keep waiting
//! ```
//!
//! Exactly one request is outstanding at a time; every operation takes
//! `&mut self`. The receiver is reset at the start of each exchange, so a
//! late reply to an earlier request is just another frame to discard.

use pixelosd_hal::uart::{Uart, UartConfig};
use pixelosd_hal::Clock;
use pixelosd_protocol::{
    write_frame, CommandId, DecodeError, FrameReceiver, OsdCommand, Progress, Response,
};

use crate::error::LinkError;

/// Result type for link operations over transport `U`
pub type LinkResult<T, U> = Result<T, LinkError<<U as pixelosd_hal::uart::ErrorType>::Error>>;

/// Owns the transport, the deadline clock and the frame receiver
pub struct Transceiver<U, C> {
    uart: U,
    clock: C,
    receiver: FrameReceiver,
}

impl<U: Uart, C: Clock> Transceiver<U, C> {
    pub fn new(uart: U, clock: C) -> Self {
        Self {
            uart,
            clock,
            receiver: FrameReceiver::new(),
        }
    }

    pub fn uart(&self) -> &U {
        &self.uart
    }

    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Give back the transport and clock
    pub fn release(self) -> (U, C) {
        (self.uart, self.clock)
    }

    /// Reconfigure the transport
    pub fn configure(&mut self, config: &UartConfig) -> LinkResult<(), U> {
        debug!("uart reconfigured to {} baud", config.baudrate);
        self.uart.configure(config).map_err(LinkError::Transport)
    }

    /// Frame and transmit one command, then flush
    pub fn send_command(
        &mut self,
        id: CommandId,
        fixed: &[u8],
        variable: Option<&[u8]>,
    ) -> LinkResult<(), U> {
        let uart = &mut self.uart;
        write_frame(id.as_u8(), fixed, variable, |byte| {
            uart.write_byte(byte).map_err(LinkError::Transport)
        })?;
        self.uart.flush().map_err(LinkError::Transport)
    }

    /// Transmit a typed command
    pub fn send(&mut self, command: &OsdCommand<'_>) -> LinkResult<(), U> {
        let fixed = command.fixed_payload()?;
        let descriptor = command.id().descriptor();
        debug_assert_eq!(fixed.len(), descriptor.fixed_len);
        debug_assert_eq!(command.variable().is_some(), descriptor.variable);
        trace!("send {}", command.id());
        self.send_command(command.id(), &fixed, command.variable())
    }

    /// Wait for the response to `expected`, decoded per the dispatch table
    pub fn exchange(&mut self, expected: CommandId, timeout_ms: u32) -> LinkResult<Response, U> {
        let kind = expected.descriptor().response;
        self.exchange_with(expected, timeout_ms, |payload| kind.decode(payload))
    }

    /// Wait for the response to `expected` and decode it with `decode`
    ///
    /// Frames for other commands and error frames for other commands are
    /// dropped. Returns as soon as a frame for `expected` (or an error frame
    /// naming it) arrives, or with [`LinkError::Timeout`] once `timeout_ms`
    /// has elapsed.
    pub fn exchange_with<T, F>(
        &mut self,
        expected: CommandId,
        timeout_ms: u32,
        decode: F,
    ) -> LinkResult<T, U>
    where
        F: FnOnce(&[u8]) -> Result<T, DecodeError>,
    {
        self.receiver.reset();
        let start = self.clock.now_ms();

        loop {
            if self.clock.now_ms().saturating_sub(start) >= u64::from(timeout_ms) {
                warn!("no response to {} within {} ms", expected, timeout_ms);
                return Err(LinkError::Timeout);
            }

            if !self.uart.available().map_err(LinkError::Transport)? {
                continue;
            }
            let Some(byte) = self.uart.read_byte().map_err(LinkError::Transport)? else {
                continue;
            };

            match self.receiver.feed(byte) {
                Ok(Progress::Pending) => continue,
                Ok(Progress::Complete) => {}
                Err(e) => {
                    debug!("framing error: {}", e);
                    continue;
                }
            }

            let Some(frame) = self.receiver.frame() else {
                continue;
            };

            if frame.command == expected.as_u8() {
                return decode(frame.payload).map_err(|e| {
                    warn!("bad {} response: {}", expected, e);
                    LinkError::DecodeMismatch(e)
                });
            }

            if frame.is_error_for(expected) {
                debug!("{} rejected", expected);
                return Err(LinkError::Rejected);
            }

            trace!("discarding frame {} while waiting for {}", frame.command, expected);
        }
    }

    /// Send a command and wait for its response
    pub fn request(&mut self, command: &OsdCommand<'_>, timeout_ms: u32) -> LinkResult<Response, U> {
        self.send(command)?;
        self.exchange(command.id(), timeout_ms)
    }

    /// Send a command and decode its response with `decode`
    pub fn request_with<T, F>(
        &mut self,
        command: &OsdCommand<'_>,
        timeout_ms: u32,
        decode: F,
    ) -> LinkResult<T, U>
    where
        F: FnOnce(&[u8]) -> Result<T, DecodeError>,
    {
        self.send(command)?;
        self.exchange_with(command.id(), timeout_ms, decode)
    }
}

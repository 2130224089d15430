//! Typed OSD driver
//!
//! [`PixelOsd`] wraps a [`Transceiver`] with the link configuration and a
//! retry delay, and exposes one method per request command. Write-only
//! commands all go through [`PixelOsd::draw`].

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use heapless::String;
use pixelosd_hal::uart::{Uart, UartConfig};
use pixelosd_hal::Clock;
use pixelosd_protocol::response::{decode_bool, decode_byte, decode_font, decode_u32};
use pixelosd_protocol::{BitmapOptions, CharData, InfoResponse, OsdCommand, Point};

use crate::config::LinkConfig;
use crate::session::Session;
use crate::transceiver::{LinkResult, Transceiver};

/// Longest string [`PixelOsd::draw_fmt`] renders
pub const MAX_TEXT_LEN: usize = 64;

/// A PixelOSD attached over `U`
pub struct PixelOsd<U, C, D> {
    pub(crate) link: Transceiver<U, C>,
    pub(crate) delay: D,
    pub(crate) config: LinkConfig,
    pub(crate) session: Option<Session>,
}

impl<U: Uart, C: Clock, D: DelayNs> PixelOsd<U, C, D> {
    /// Create a driver; nothing is sent until [`begin`](Self::begin)
    pub fn new(uart: U, clock: C, delay: D, config: LinkConfig) -> Self {
        Self {
            link: Transceiver::new(uart, clock),
            delay,
            config,
            session: None,
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Link state established by [`begin`](Self::begin)
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn transceiver(&mut self) -> &mut Transceiver<U, C> {
        &mut self.link
    }

    /// Give back the transport, clock and delay
    pub fn release(self) -> (U, C, D) {
        let (uart, clock) = self.link.release();
        (uart, clock, self.delay)
    }

    fn timeout(&self) -> u32 {
        self.config.response_timeout_ms
    }

    /// Query version and capabilities
    pub fn info(&mut self) -> LinkResult<InfoResponse, U> {
        let timeout = self.timeout();
        self.link
            .request_with(&OsdCommand::Info, timeout, InfoResponse::decode)
    }

    /// Read one character from the font
    pub fn read_font(&mut self, character: u16) -> LinkResult<CharData, U> {
        let timeout = self.timeout();
        let (_, data) =
            self.link
                .request_with(&OsdCommand::ReadFont { character }, timeout, decode_font)?;
        Ok(data)
    }

    /// Replace one character in the font, returning what the OSD stored
    ///
    /// The font lives in RAM until [`OsdCommand::WriteFlash`] is sent.
    pub fn write_font(&mut self, character: u16, data: &CharData) -> LinkResult<CharData, U> {
        let timeout = self.timeout();
        let (_, stored) = self.link.request_with(
            &OsdCommand::WriteFont { character, data },
            timeout,
            decode_font,
        )?;
        Ok(stored)
    }

    /// Configured camera input
    pub fn camera(&mut self) -> LinkResult<u8, U> {
        let timeout = self.timeout();
        self.link
            .request_with(&OsdCommand::GetCamera, timeout, decode_byte)
    }

    /// Camera input currently shown
    pub fn active_camera(&mut self) -> LinkResult<u8, U> {
        let timeout = self.timeout();
        self.link
            .request_with(&OsdCommand::GetActiveCamera, timeout, decode_byte)
    }

    pub fn osd_enabled(&mut self) -> LinkResult<bool, U> {
        let timeout = self.timeout();
        self.link
            .request_with(&OsdCommand::GetOsdEnabled, timeout, decode_bool)
    }

    /// Ask the OSD to switch bit rate and follow it
    ///
    /// The transport is reconfigured to whatever rate the OSD reports back,
    /// which may differ from `baudrate`. Returns the new rate.
    pub fn set_data_rate(&mut self, baudrate: u32) -> LinkResult<u32, U> {
        let timeout = self.timeout();
        let applied = self
            .link
            .request_with(&OsdCommand::SetDataRate(baudrate), timeout, decode_u32)?;
        if applied != baudrate {
            warn!("requested {} baud, OSD applied {}", baudrate, applied);
        }
        self.link.configure(&UartConfig::with_baudrate(applied))?;
        if let Some(session) = self.session.as_mut() {
            session.baudrate = applied;
        }
        Ok(applied)
    }

    /// Send a command without waiting for a reply
    ///
    /// Any reply a request command provokes is discarded by the next
    /// exchange.
    pub fn draw(&mut self, command: &OsdCommand<'_>) -> LinkResult<(), U> {
        self.link.send(command)
    }

    /// Rotate the transformation matrix by `degrees`
    pub fn ctm_rotate_deg(&mut self, degrees: f32) -> LinkResult<(), U> {
        self.draw(&OsdCommand::CtmRotate(degrees.to_radians()))
    }

    /// Rotate the transformation matrix by `degrees` about (`cx`, `cy`)
    pub fn ctm_rotate_about_deg(&mut self, degrees: f32, cx: f32, cy: f32) -> LinkResult<(), U> {
        self.draw(&OsdCommand::CtmRotateAbout {
            angle: degrees.to_radians(),
            cx,
            cy,
        })
    }

    /// Format and draw a string
    ///
    /// Output past [`MAX_TEXT_LEN`] bytes is cut at the last whole
    /// character that fits.
    pub fn draw_fmt(
        &mut self,
        point: Point,
        options: BitmapOptions,
        args: core::fmt::Arguments<'_>,
    ) -> LinkResult<(), U> {
        let mut text = Truncating::default();
        if text.write_fmt(args).is_err() {
            debug!("text truncated to {} bytes", text.0.len());
        }
        self.draw(&OsdCommand::DrawString {
            point,
            options,
            text: text.0.as_bytes(),
        })
    }

    /// Run `f` between transaction begin and commit
    ///
    /// The OSD applies everything drawn inside `f` in one frame. Commit is
    /// skipped if `f` fails.
    pub fn transaction<F>(&mut self, f: F) -> LinkResult<(), U>
    where
        F: FnOnce(&mut Self) -> LinkResult<(), U>,
    {
        self.draw(&OsdCommand::TransactionBegin)?;
        f(self)?;
        self.draw(&OsdCommand::TransactionCommit)
    }

    /// Restart the OSD, optionally into its bootloader
    ///
    /// The session is dropped; call [`begin`](Self::begin) again afterwards.
    pub fn reboot(&mut self, to_bootloader: bool) -> LinkResult<(), U> {
        self.draw(&OsdCommand::Reboot { to_bootloader })?;
        self.session = None;
        Ok(())
    }
}

/// Formatting sink that keeps every character that fits
#[derive(Default)]
struct Truncating(String<MAX_TEXT_LEN>);

impl Write for Truncating {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for c in s.chars() {
            self.0.push(c).map_err(|_| core::fmt::Error)?;
        }
        Ok(())
    }
}

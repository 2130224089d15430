//! Host-side driver for FrSky PixelOSD processors
//!
//! Builds on [`pixelosd_protocol`] for framing and on [`pixelosd_hal`] for
//! the byte transport:
//!
//! - [`Transceiver`] - sends frames and waits for the matching response
//! - [`PixelOsd`] - bring-up, typed requests and drawing
//! - [`LinkConfig`] - bit rates, deadlines and boot polling
//!
//! ```ignore
//! let mut osd = PixelOsd::new(uart, clock, delay, LinkConfig::with_baudrate(921_600));
//! osd.begin()?;
//! osd.transaction(|osd| {
//!     osd.draw(&OsdCommand::ClearScreen)?;
//!     osd.draw_fmt(Point::new(12, 20), BitmapOptions(0), format_args!("ALT {}m", alt))
//! })?;
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod osd;
pub mod session;
pub mod transceiver;

#[cfg(test)]
mod test_utils;

pub use config::LinkConfig;
pub use error::LinkError;
pub use osd::PixelOsd;
pub use session::Session;
pub use transceiver::{LinkResult, Transceiver};

pub use pixelosd_hal as hal;
pub use pixelosd_protocol as protocol;

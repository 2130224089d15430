//! PixelOSD Hardware Abstraction Layer
//!
//! This crate defines the transport boundary the link driver consumes. The
//! OSD is attached over a half-duplex UART without flow control, so the
//! driver only needs a handful of byte-level primitives plus a monotonic
//! clock for response deadlines.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pixelosd-driver (transceiver, session) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pixelosd-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ board UART    │       │ embedded-io   │
//! │ (user impl)   │       │ port (IoUart) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`], [`uart::UartConfigure`] - Serial link
//! - [`time::Clock`] - Millisecond time source for deadlines
//!
//! Delays use [`embedded_hal::delay::DelayNs`] directly.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

pub mod io;
pub mod time;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use io::IoUart;
pub use time::Clock;
pub use uart::{Uart, UartConfig, UartConfigure, UartRx, UartTx};

pub use embedded_hal::delay::DelayNs;

//! FrSky PixelOSD wire protocol
//!
//! This crate defines the framing used between a flight controller (or any
//! host MCU) and a PixelOSD video overlay processor over a half-duplex UART.
//! The host sends commands; a handful of them are answered by the OSD.
//!
//! # Frame Format
//!
//! ```text
//! ┌────────┬─────────┬─────┬─────────────┬────────────────────┬─────┐
//! │ HEADER │ LENGTH  │ CMD │ FIXED       │ VARIABLE           │ CRC │
//! │ "$A"   │ uvarint │ 1B  │ 0–66B       │ uvarint len + data │ 1B  │
//! └────────┴─────────┴─────┴─────────────┴────────────────────┴─────┘
//!            └──────────────── CRC-8 / 0xD5 ────────────────┘
//! ```
//!
//! Nothing here touches hardware: [`frame::write_frame`] emits bytes into a
//! caller-supplied sink and [`frame::FrameReceiver`] is fed one byte at a
//! time.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod crc;
pub mod frame;
pub mod geometry;
pub mod message;
pub mod response;
pub mod varint;

pub use command::{CommandDescriptor, CommandId, ResponseKind};
pub use crc::{crc8, Crc8};
pub use frame::{
    encode_frame, frame_len, message_length, write_frame, FrameError, FrameReceiver, FrameView,
    ParseState, Progress, HEADER, MAX_RESPONSE_LEN,
};
pub use geometry::{BitmapOptions, Color, Outline, Point, Rect, Size, TvStandard, Triangle};
pub use message::{Matrix, OsdCommand};
pub use response::{CharData, DecodeError, InfoResponse, Response, CHAR_LEN};

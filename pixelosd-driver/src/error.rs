//! Link error type

use pixelosd_protocol::{DecodeError, FrameError};

/// Errors from a command exchange
///
/// `E` is the transport's error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// The byte transport failed
    Transport(E),
    /// No matching response before the deadline
    Timeout,
    /// The OSD answered with an error frame for this command
    Rejected,
    /// A response arrived but its payload could not be decoded
    DecodeMismatch(DecodeError),
    /// The command could not be framed
    Encode(FrameError),
}

impl<E> From<FrameError> for LinkError<E> {
    fn from(e: FrameError) -> Self {
        LinkError::Encode(e)
    }
}

impl<E> From<DecodeError> for LinkError<E> {
    fn from(e: DecodeError) -> Self {
        LinkError::DecodeMismatch(e)
    }
}

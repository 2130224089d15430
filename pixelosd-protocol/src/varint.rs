//! Unsigned variable-length integers
//!
//! Little-endian base-128: seven data bits per byte, high bit set on every
//! byte except the last. Used for the frame length and for the length
//! prefix of variable payloads.

use heapless::Vec;

/// Longest encoding of a `u32`
pub const MAX_UVARINT_LEN: usize = 5;

/// Continuation flag
const CONTINUATION: u8 = 0x80;

/// An encoded uvarint
pub type Uvarint = Vec<u8, MAX_UVARINT_LEN>;

/// Errors from multi-byte decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VarintError {
    /// Value does not fit in 32 bits
    Overflow,
}

/// Encode a value
pub fn encode(mut value: u32) -> Uvarint {
    let mut out = Vec::new();
    while value >= 0x80 {
        // Capacity covers the full u32 range
        let _ = out.push((value as u8 & 0x7F) | CONTINUATION);
        value >>= 7;
    }
    let _ = out.push(value as u8 & 0x7F);
    out
}

/// Emit a value byte by byte
pub fn write<E>(mut value: u32, mut put: impl FnMut(u8) -> Result<(), E>) -> Result<(), E> {
    while value >= 0x80 {
        put((value as u8 & 0x7F) | CONTINUATION)?;
        value >>= 7;
    }
    put(value as u8 & 0x7F)
}

/// Number of bytes [`encode`] produces for `value`
pub const fn encoded_len(value: u32) -> usize {
    if value <= 127 {
        1
    } else if value <= 16_383 {
        2
    } else if value <= 2_097_151 {
        3
    } else if value <= 268_435_455 {
        4
    } else {
        5
    }
}

/// Decode a single-byte uvarint
///
/// Returns the low seven bits and whether this byte terminates the value.
/// Response lengths never exceed 127, so the receiver only ever expects a
/// terminating byte; a continuation byte there is a framing error.
pub const fn decode_byte(byte: u8) -> (u8, bool) {
    (byte & 0x7F, byte & CONTINUATION == 0)
}

/// Incremental multi-byte decoder
#[derive(Debug, Clone, Default)]
pub struct UvarintDecoder {
    value: u32,
    shift: u32,
}

impl UvarintDecoder {
    /// Create a decoder at the start of a value
    pub const fn new() -> Self {
        Self { value: 0, shift: 0 }
    }

    /// Feed the next byte
    ///
    /// Returns `Ok(Some(value))` on the terminating byte, after which the
    /// decoder is ready for the next value.
    pub fn push(&mut self, byte: u8) -> Result<Option<u32>, VarintError> {
        let (bits, is_final) = decode_byte(byte);
        if self.shift >= 32 || (self.shift == 28 && bits > 0x0F) {
            *self = Self::new();
            return Err(VarintError::Overflow);
        }
        self.value |= (bits as u32) << self.shift;
        if is_final {
            let value = self.value;
            *self = Self::new();
            Ok(Some(value))
        } else {
            self.shift += 7;
            Ok(None)
        }
    }
}

/// Decode a complete uvarint from the front of `bytes`
///
/// Returns the value and the number of bytes consumed, or `None` if the
/// input ends before the terminating byte.
pub fn decode(bytes: &[u8]) -> Result<Option<(u32, usize)>, VarintError> {
    let mut decoder = UvarintDecoder::new();
    for (i, &byte) in bytes.iter().enumerate() {
        if let Some(value) = decoder.push(byte)? {
            return Ok(Some((value, i + 1)));
        }
    }
    Ok(None)
}

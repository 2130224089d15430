//! Typed decoding of accepted responses
//!
//! The payload handed to [`ResponseKind::decode`] is everything after the
//! command id of a CRC-valid frame. Multi-byte fields are little-endian.

use crate::command::ResponseKind;
use crate::geometry::TvStandard;

/// Bytes of glyph pixel data in a character
pub const CHAR_DATA_LEN: usize = 54;

/// Bytes of per-character metadata
pub const CHAR_METADATA_LEN: usize = 10;

/// Size of a complete character record
pub const CHAR_LEN: usize = CHAR_DATA_LEN + CHAR_METADATA_LEN;

/// Size of the info response payload
pub const INFO_LEN: usize = 17;

/// Tag that opens every info response
pub const INFO_MAGIC: [u8; 3] = *b"AGH";

/// Payload decoding failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Payload shorter than the response layout
    Truncated,
    /// Info response does not start with [`INFO_MAGIC`]
    BadMagic,
}

/// One font character: pixel data followed by metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CharData {
    pub data: [u8; CHAR_DATA_LEN],
    pub metadata: [u8; CHAR_METADATA_LEN],
}

impl Default for CharData {
    fn default() -> Self {
        Self {
            data: [0; CHAR_DATA_LEN],
            metadata: [0; CHAR_METADATA_LEN],
        }
    }
}

impl CharData {
    /// Split a 64-byte record
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let record = bytes.get(..CHAR_LEN).ok_or(DecodeError::Truncated)?;
        let (data, metadata) = record.split_at(CHAR_DATA_LEN);
        let mut out = Self::default();
        out.data.copy_from_slice(data);
        out.metadata.copy_from_slice(metadata);
        Ok(out)
    }

    /// Wire representation
    pub fn to_bytes(&self) -> [u8; CHAR_LEN] {
        let mut out = [0u8; CHAR_LEN];
        out[..CHAR_DATA_LEN].copy_from_slice(&self.data);
        out[CHAR_DATA_LEN..].copy_from_slice(&self.metadata);
        out
    }
}

/// Version and capabilities reported by the OSD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InfoResponse {
    pub version_major: u8,
    pub version_minor: u8,
    pub version_patch: u8,
    pub grid_rows: u8,
    pub grid_columns: u8,
    pub pixels_width: u16,
    pub pixels_height: u16,
    /// `None` if the OSD reports a standard this crate doesn't know
    pub tv_standard: Option<TvStandard>,
    pub has_detected_camera: bool,
    pub max_frame_size: u16,
    pub context_stack_size: u8,
}

impl InfoResponse {
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let p = payload.get(..INFO_LEN).ok_or(DecodeError::Truncated)?;
        if p[..3] != INFO_MAGIC {
            return Err(DecodeError::BadMagic);
        }
        Ok(Self {
            version_major: p[3],
            version_minor: p[4],
            version_patch: p[5],
            grid_rows: p[6],
            grid_columns: p[7],
            pixels_width: u16::from_le_bytes([p[8], p[9]]),
            pixels_height: u16::from_le_bytes([p[10], p[11]]),
            tv_standard: TvStandard::from_u8(p[12]),
            has_detected_camera: p[13] != 0,
            max_frame_size: u16::from_le_bytes([p[14], p[15]]),
            context_stack_size: p[16],
        })
    }
}

/// A decoded response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    Info(InfoResponse),
    Font { character: u16, data: CharData },
    Byte(u8),
    Bool(bool),
    U32(u32),
    /// Frame accepted for a command whose reply carries nothing of interest
    Ack,
}

/// Single byte response
pub fn decode_byte(payload: &[u8]) -> Result<u8, DecodeError> {
    payload.first().copied().ok_or(DecodeError::Truncated)
}

/// Single byte response, nonzero meaning true
pub fn decode_bool(payload: &[u8]) -> Result<bool, DecodeError> {
    decode_byte(payload).map(|b| b != 0)
}

/// Little-endian `u32` response
pub fn decode_u32(payload: &[u8]) -> Result<u32, DecodeError> {
    let b = payload.get(..4).ok_or(DecodeError::Truncated)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Font response: character index then the character record
pub fn decode_font(payload: &[u8]) -> Result<(u16, CharData), DecodeError> {
    let chr = payload.get(..2).ok_or(DecodeError::Truncated)?;
    let character = u16::from_le_bytes([chr[0], chr[1]]);
    let data = CharData::from_bytes(&payload[2..])?;
    Ok((character, data))
}

impl ResponseKind {
    /// Interpret an accepted payload
    pub fn decode(self, payload: &[u8]) -> Result<Response, DecodeError> {
        match self {
            ResponseKind::None => Ok(Response::Ack),
            ResponseKind::Info => InfoResponse::decode(payload).map(Response::Info),
            ResponseKind::Font => decode_font(payload)
                .map(|(character, data)| Response::Font { character, data }),
            ResponseKind::Byte => decode_byte(payload).map(Response::Byte),
            ResponseKind::Bool => decode_bool(payload).map(Response::Bool),
            ResponseKind::U32 => decode_u32(payload).map(Response::U32),
        }
    }
}

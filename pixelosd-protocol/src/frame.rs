//! Frame encoding and decoding for the PixelOSD link.
//!
//! Frame format:
//! - HEADER (2 bytes): `'$'`, `'A'`
//! - LENGTH (uvarint): bytes from COMMAND through the end of the payloads
//! - COMMAND (1 byte): command identifier
//! - PAYLOAD (0..N bytes): fixed, packed, command-specific fields
//! - VARIABLE (optional): uvarint length followed by that many raw bytes
//! - CRC (1 byte): CRC-8/0xD5 over LENGTH through the end of VARIABLE
//!
//! Responses from the OSD never exceed [`MAX_RESPONSE_LEN`] bytes of body,
//! so their length always fits a single uvarint byte.

use heapless::Vec;

use crate::command::CommandId;
use crate::crc::Crc8;
use crate::varint;

/// Frame synchronization bytes
pub const HEADER: [u8; 2] = [b'$', b'A'];

/// Largest response body (command + payload) the OSD sends
pub const MAX_RESPONSE_LEN: usize = 67;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Length field is not a single terminating uvarint byte, or is zero
    InvalidLength,
    /// Declared length exceeds [`MAX_RESPONSE_LEN`]
    Oversized,
    /// CRC mismatch
    InvalidChecksum,
    /// Payload length does not fit the 32-bit length field
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Value of the LENGTH field for a command
///
/// `1 + fixed + (uvarint_len(var) + var)` when a variable payload is present.
pub fn message_length(fixed_len: usize, variable_len: Option<usize>) -> Result<u32, FrameError> {
    let mut len = fixed_len.checked_add(1).ok_or(FrameError::PayloadTooLarge)?;
    if let Some(var_len) = variable_len {
        let prefix = u32::try_from(var_len).map_err(|_| FrameError::PayloadTooLarge)?;
        len = len
            .checked_add(varint::encoded_len(prefix))
            .and_then(|l| l.checked_add(var_len))
            .ok_or(FrameError::PayloadTooLarge)?;
    }
    u32::try_from(len).map_err(|_| FrameError::PayloadTooLarge)
}

/// Total bytes on the wire for a command
pub fn frame_len(fixed_len: usize, variable_len: Option<usize>) -> Result<usize, FrameError> {
    let length = message_length(fixed_len, variable_len)?;
    Ok(HEADER.len() + varint::encoded_len(length) + length as usize + 1)
}

/// Emit a complete frame one byte at a time
///
/// Every byte after the header except the CRC itself is folded into the
/// CRC as it is emitted. Sizes are validated before the first byte goes
/// out, so a rejected command never leaves a partial frame on the wire.
///
/// Returns the number of bytes emitted.
pub fn write_frame<E>(
    command: u8,
    fixed: &[u8],
    variable: Option<&[u8]>,
    mut put: impl FnMut(u8) -> Result<(), E>,
) -> Result<usize, E>
where
    E: From<FrameError>,
{
    let length = message_length(fixed.len(), variable.map(<[u8]>::len))?;

    for &byte in &HEADER {
        put(byte)?;
    }

    let mut crc = Crc8::new();
    let mut body = 0usize;
    let mut emit = |byte: u8| -> Result<(), E> {
        crc.update(byte);
        body += 1;
        put(byte)
    };

    varint::write(length, &mut emit)?;
    emit(command)?;
    for &byte in fixed {
        emit(byte)?;
    }
    if let Some(data) = variable {
        // Length checked by message_length
        varint::write(data.len() as u32, &mut emit)?;
        for &byte in data {
            emit(byte)?;
        }
    }

    put(crc.value())?;
    Ok(HEADER.len() + body + 1)
}

/// Encode a frame into a byte buffer
///
/// Returns the number of bytes written
pub fn encode_frame(
    command: u8,
    fixed: &[u8],
    variable: Option<&[u8]>,
    buffer: &mut [u8],
) -> Result<usize, FrameError> {
    let mut pos = 0;
    write_frame(command, fixed, variable, |byte| {
        let slot = buffer.get_mut(pos).ok_or(FrameError::BufferTooSmall)?;
        *slot = byte;
        pos += 1;
        Ok(())
    })
}

/// A received frame, borrowed from the receiver's buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameView<'a> {
    /// Raw command identifier
    pub command: u8,
    /// Everything after the command identifier
    pub payload: &'a [u8],
}

impl FrameView<'_> {
    /// Command identifier, if known
    pub fn command_id(&self) -> Option<CommandId> {
        CommandId::from_u8(self.command)
    }

    /// Whether this is an error frame referring to `command`
    pub fn is_error_for(&self, command: CommandId) -> bool {
        self.command == CommandId::Error.as_u8() && self.payload.first() == Some(&command.as_u8())
    }
}

/// Receiver states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseState {
    /// Discarding bytes until `'$'`
    AwaitHeader1,
    /// Got `'$'`, waiting for `'A'`
    AwaitHeader2,
    /// Waiting for the single-byte length
    ReadLength,
    /// Collecting command and payload bytes
    ReadBody,
    /// Waiting for the CRC
    ReadCrc,
    /// A valid frame is available from [`FrameReceiver::frame`]
    Complete,
}

/// Outcome of feeding one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Progress {
    /// More bytes are needed
    Pending,
    /// A CRC-valid frame has been received
    Complete,
}

/// State machine for parsing incoming frames
///
/// Any framing fault drops the partial frame and returns the machine to
/// [`ParseState::AwaitHeader1`], so a link joined mid-stream (or garbled by
/// a device reset) always recovers at the next header. The receive buffer
/// is fixed-size; no allocation happens per frame.
#[derive(Debug, Clone)]
pub struct FrameReceiver {
    state: ParseState,
    crc: Crc8,
    declared_len: usize,
    buffer: Vec<u8, MAX_RESPONSE_LEN>,
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReceiver {
    /// Create a new frame receiver
    pub const fn new() -> Self {
        Self {
            state: ParseState::AwaitHeader1,
            crc: Crc8::new(),
            declared_len: 0,
            buffer: Vec::new(),
        }
    }

    /// Reset the receiver state
    pub fn reset(&mut self) {
        self.state = ParseState::AwaitHeader1;
        self.crc.reset();
        self.declared_len = 0;
        self.buffer.clear();
    }

    /// Current parse state
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// The frame completed by the last [`feed`](Self::feed), if any
    pub fn frame(&self) -> Option<FrameView<'_>> {
        if self.state != ParseState::Complete {
            return None;
        }
        let (&command, payload) = self.buffer.split_first()?;
        Some(FrameView { command, payload })
    }

    /// Feed a single byte to the receiver
    ///
    /// Returns `Ok(Progress::Complete)` when a CRC-valid frame has been
    /// received, `Ok(Progress::Pending)` when more bytes are needed, or
    /// `Err` when a partial frame was dropped. Errors are informational;
    /// the receiver has already resynchronised.
    pub fn feed(&mut self, byte: u8) -> Result<Progress, FrameError> {
        match self.state {
            ParseState::AwaitHeader1 | ParseState::Complete => {
                self.state = if byte == HEADER[0] {
                    ParseState::AwaitHeader2
                } else {
                    ParseState::AwaitHeader1
                };
                Ok(Progress::Pending)
            }
            ParseState::AwaitHeader2 => {
                if byte == HEADER[1] {
                    self.crc.reset();
                    self.declared_len = 0;
                    self.buffer.clear();
                    self.state = ParseState::ReadLength;
                } else if byte != HEADER[0] {
                    self.state = ParseState::AwaitHeader1;
                }
                // A repeated '$' may be the real start of a frame
                Ok(Progress::Pending)
            }
            ParseState::ReadLength => {
                self.crc.update(byte);
                let (length, is_final) = varint::decode_byte(byte);
                if !is_final || length == 0 {
                    return self.fail(FrameError::InvalidLength);
                }
                if length as usize > MAX_RESPONSE_LEN {
                    return self.fail(FrameError::Oversized);
                }
                self.declared_len = length as usize;
                self.state = ParseState::ReadBody;
                Ok(Progress::Pending)
            }
            ParseState::ReadBody => {
                self.crc.update(byte);
                if self.buffer.push(byte).is_err() {
                    return self.fail(FrameError::Oversized);
                }
                if self.buffer.len() >= self.declared_len {
                    self.state = ParseState::ReadCrc;
                }
                Ok(Progress::Pending)
            }
            ParseState::ReadCrc => {
                if byte != self.crc.value() {
                    return self.fail(FrameError::InvalidChecksum);
                }
                self.state = ParseState::Complete;
                Ok(Progress::Complete)
            }
        }
    }

    fn fail(&mut self, error: FrameError) -> Result<Progress, FrameError> {
        self.reset();
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::crc8;
    use proptest::prelude::*;
    use std::vec::Vec as StdVec;

    #[derive(Debug, Default)]
    struct Fed {
        frames: StdVec<(u8, StdVec<u8>)>,
        errors: StdVec<FrameError>,
    }

    fn feed_all(receiver: &mut FrameReceiver, bytes: &[u8]) -> Fed {
        let mut fed = Fed::default();
        for &byte in bytes {
            match receiver.feed(byte) {
                Ok(Progress::Complete) => {
                    let frame = receiver.frame().unwrap();
                    fed.frames.push((frame.command, frame.payload.to_vec()));
                }
                Ok(Progress::Pending) => {}
                Err(e) => fed.errors.push(e),
            }
        }
        fed
    }

    fn encode(command: u8, fixed: &[u8], variable: Option<&[u8]>) -> StdVec<u8> {
        let mut out = StdVec::new();
        write_frame::<FrameError>(command, fixed, variable, |b| {
            out.push(b);
            Ok(())
        })
        .unwrap();
        out
    }

    #[test]
    fn test_encode_info_request() {
        let bytes = encode(CommandId::Info.as_u8(), &[1], None);

        assert_eq!(bytes.len(), 6);
        assert_eq!(&bytes[..2], b"$A");
        assert_eq!(bytes[2], 2); // length: command + 1 payload byte
        assert_eq!(bytes[3], 1); // command
        assert_eq!(bytes[4], 1); // payload
        assert_eq!(bytes[5], crc8(&[2, 1, 1]));
    }

    #[test]
    fn test_encode_empty_payload() {
        let bytes = encode(CommandId::ClearScreen.as_u8(), &[], None);
        assert_eq!(bytes, [b'$', b'A', 1, 41, crc8(&[1, 41])]);
    }

    #[test]
    fn test_encode_variable_payload() {
        let fixed = [0x0A, 0x40, 0x01, 0x00];
        let bytes = encode(CommandId::DrawString.as_u8(), &fixed, Some(&b"Hi"[..]));

        // command + fixed + uvarint(2) + "Hi"
        assert_eq!(bytes[2], 8);
        assert_eq!(bytes[3], 48);
        assert_eq!(&bytes[4..8], &fixed);
        assert_eq!(bytes[8], 2);
        assert_eq!(&bytes[9..11], b"Hi");
        assert_eq!(bytes[11], crc8(&bytes[2..11]));
        assert_eq!(bytes.len(), frame_len(4, Some(2)).unwrap());
    }

    #[test]
    fn test_encode_empty_variable_payload() {
        let bytes = encode(CommandId::DrawGridString.as_u8(), &[0, 0, 0], Some(&[][..]));
        // command + fixed + uvarint(0)
        assert_eq!(bytes[2], 5);
        assert_eq!(bytes[7], 0);
        assert_eq!(bytes.len(), 9);
    }

    #[test]
    fn test_encode_long_bitmap_uses_multibyte_lengths() {
        let bitmap = [0x55u8; 200];
        let bytes = encode(CommandId::DrawBitmap.as_u8(), &[0; 7], Some(&bitmap[..]));

        // 1 + 7 + 2 + 200 = 210 needs two length bytes
        assert_eq!(message_length(7, Some(200)), Ok(210));
        assert_eq!(&bytes[2..4], &[0xD2, 0x01]);
        // Variable length prefix 200 also takes two bytes
        assert_eq!(&bytes[12..14], &[0xC8, 0x01]);
        assert_eq!(bytes.len(), frame_len(7, Some(200)).unwrap());
        assert_eq!(*bytes.last().unwrap(), crc8(&bytes[2..bytes.len() - 1]));
    }

    #[test]
    fn test_message_length() {
        assert_eq!(message_length(0, None), Ok(1));
        assert_eq!(message_length(66, None), Ok(67));
        assert_eq!(message_length(4, Some(0)), Ok(6));
        assert_eq!(message_length(4, Some(127)), Ok(1 + 4 + 1 + 127));
        assert_eq!(message_length(4, Some(128)), Ok(1 + 4 + 2 + 128));
    }

    #[test]
    fn test_encode_frame_buffer_too_small() {
        let mut buffer = [0u8; 4];
        assert_eq!(
            encode_frame(CommandId::Info.as_u8(), &[1], None, &mut buffer),
            Err(FrameError::BufferTooSmall)
        );

        let mut buffer = [0u8; 6];
        assert_eq!(encode_frame(CommandId::Info.as_u8(), &[1], None, &mut buffer), Ok(6));
    }

    #[test]
    fn test_receive_roundtrip() {
        let bytes = encode(CommandId::GetOsdEnabled.as_u8(), &[1], None);
        let mut receiver = FrameReceiver::new();
        let fed = feed_all(&mut receiver, &bytes);

        assert_eq!(fed.frames, [(7, vec![1])]);
        assert!(fed.errors.is_empty());
        assert_eq!(receiver.state(), ParseState::Complete);
    }

    #[test]
    fn test_frame_only_available_when_complete() {
        let bytes = encode(4, &[2], None);
        let mut receiver = FrameReceiver::new();
        assert!(receiver.frame().is_none());

        feed_all(&mut receiver, &bytes[..bytes.len() - 1]);
        assert!(receiver.frame().is_none());

        receiver.feed(*bytes.last().unwrap()).unwrap();
        assert_eq!(
            receiver.frame(),
            Some(FrameView {
                command: 4,
                payload: &[2]
            })
        );

        // Next byte starts over
        receiver.feed(0x00).unwrap();
        assert!(receiver.frame().is_none());
        assert_eq!(receiver.state(), ParseState::AwaitHeader1);
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut stream = encode(4, &[1], None);
        stream.extend(encode(6, &[2], None));
        let mut receiver = FrameReceiver::new();

        let fed = feed_all(&mut receiver, &stream);
        assert_eq!(fed.frames, [(4, vec![1]), (6, vec![2])]);
    }

    #[test]
    fn test_resync_after_garbage() {
        let frame = encode(CommandId::GetCamera.as_u8(), &[3], None);

        // Header followed by an impossible length, then the real frame
        let mut stream = vec![0x00, 0xFF, b'$', b'A', 0xC8];
        stream.extend(&frame);

        let mut receiver = FrameReceiver::new();
        let fed = feed_all(&mut receiver, &stream);

        assert_eq!(fed.frames, [(4, vec![3])]);
        assert_eq!(fed.errors, [FrameError::InvalidLength]);
    }

    #[test]
    fn test_resync_on_repeated_dollar() {
        let frame = encode(4, &[9], None);
        let mut stream = vec![b'$', b'$'];
        stream.extend(&frame[1..]);

        let mut receiver = FrameReceiver::new();
        let fed = feed_all(&mut receiver, &stream);
        assert_eq!(fed.frames, [(4, vec![9])]);
    }

    #[test]
    fn test_broken_header_falls_back() {
        let mut receiver = FrameReceiver::new();
        receiver.feed(b'$').unwrap();
        assert_eq!(receiver.state(), ParseState::AwaitHeader2);
        receiver.feed(b'B').unwrap();
        assert_eq!(receiver.state(), ParseState::AwaitHeader1);
    }

    #[test]
    fn test_oversized_length_rejected() {
        let mut receiver = FrameReceiver::new();
        let fed = feed_all(&mut receiver, &[b'$', b'A', (MAX_RESPONSE_LEN + 1) as u8]);
        assert_eq!(fed.errors, [FrameError::Oversized]);
        assert_eq!(receiver.state(), ParseState::AwaitHeader1);
    }

    #[test]
    fn test_zero_length_rejected() {
        let mut receiver = FrameReceiver::new();
        let fed = feed_all(&mut receiver, &[b'$', b'A', 0]);
        assert_eq!(fed.errors, [FrameError::InvalidLength]);
    }

    #[test]
    fn test_max_length_accepted() {
        let payload = [0xA5u8; MAX_RESPONSE_LEN - 1];
        let bytes = encode(CommandId::ReadFont.as_u8(), &payload, None);
        let mut receiver = FrameReceiver::new();
        let fed = feed_all(&mut receiver, &bytes);
        assert_eq!(fed.frames.len(), 1);
        assert_eq!(fed.frames[0].1, payload.to_vec());
    }

    #[test]
    fn test_crc_mismatch_drops_frame() {
        let mut bytes = encode(4, &[1], None);
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;

        let mut receiver = FrameReceiver::new();
        let fed = feed_all(&mut receiver, &bytes);
        assert!(fed.frames.is_empty());
        assert_eq!(fed.errors, [FrameError::InvalidChecksum]);
        assert_eq!(receiver.state(), ParseState::AwaitHeader1);
    }

    #[test]
    fn test_error_frame_detection() {
        let frame = FrameView {
            command: 0,
            payload: &[CommandId::ReadFont.as_u8()],
        };
        assert!(frame.is_error_for(CommandId::ReadFont));
        assert!(!frame.is_error_for(CommandId::Info));

        let empty = FrameView {
            command: 0,
            payload: &[],
        };
        assert!(!empty.is_error_for(CommandId::Error));
    }

    proptest! {
        #[test]
        fn prop_encode_then_receive(
            command in any::<u8>(),
            payload in proptest::collection::vec(any::<u8>(), 0..MAX_RESPONSE_LEN),
        ) {
            let bytes = encode(command, &payload, None);
            let mut receiver = FrameReceiver::new();
            let fed = feed_all(&mut receiver, &bytes);

            prop_assert!(fed.errors.is_empty());
            prop_assert_eq!(fed.frames, vec![(command, payload)]);
        }

        #[test]
        fn prop_corrupted_body_rejected(
            command in any::<u8>(),
            payload in proptest::collection::vec(any::<u8>(), 0..MAX_RESPONSE_LEN),
            index in any::<proptest::sample::Index>(),
            mask in 1u8..=255,
        ) {
            let mut bytes = encode(command, &payload, None);
            // Body spans the command id through the last payload byte
            let body = 3..bytes.len() - 1;
            let i = body.start + index.index(body.len());
            bytes[i] ^= mask;

            let mut receiver = FrameReceiver::new();
            let fed = feed_all(&mut receiver, &bytes);

            prop_assert!(fed.frames.is_empty());
            prop_assert_eq!(fed.errors, vec![FrameError::InvalidChecksum]);
            prop_assert_eq!(receiver.state(), ParseState::AwaitHeader1);
        }

        #[test]
        fn prop_leading_noise_ignored(
            noise in proptest::collection::vec(any::<u8>().prop_filter("no header", |b| *b != b'$'), 0..32),
            payload in proptest::collection::vec(any::<u8>(), 0..8),
        ) {
            let mut stream = noise;
            stream.extend(encode(2, &payload, None));

            let mut receiver = FrameReceiver::new();
            let fed = feed_all(&mut receiver, &stream);
            prop_assert_eq!(fed.frames, vec![(2u8, payload)]);
        }
    }
}

//! Scripted transport, clock and delay for driver tests

use std::cell::Cell;
use std::collections::VecDeque;
use std::vec::Vec;

use pixelosd_hal::uart::{ErrorType, UartConfig, UartConfigure, UartRx, UartTx};
use embedded_hal::delay::DelayNs;
use pixelosd_hal::Clock;
use pixelosd_protocol::{write_frame, CommandId, FrameError};

/// Transport error raised by [`MockUart`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// A UART that records what the driver writes and plays back canned replies
///
/// Each flush moves the next scripted reply (if any) into the receive queue,
/// so replies line up with the commands that provoke them.
#[derive(Debug, Default)]
pub struct MockUart {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub replies: VecDeque<Vec<u8>>,
    pub configured: Vec<u32>,
    pub flushes: usize,
    pub fail_writes: bool,
}

impl MockUart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next flush
    pub fn reply(&mut self, bytes: Vec<u8>) -> &mut Self {
        self.replies.push_back(bytes);
        self
    }

    /// Queue silence for the next flush
    pub fn silence(&mut self) -> &mut Self {
        self.replies.push_back(Vec::new());
        self
    }

    /// Command ids of every frame written so far
    pub fn sent_commands(&self) -> Vec<u8> {
        let mut receiver = pixelosd_protocol::FrameReceiver::new();
        let mut ids = Vec::new();
        for &byte in &self.tx {
            // Host frames can exceed the response limit; only ids matter here
            if let Ok(pixelosd_protocol::Progress::Complete) = receiver.feed(byte) {
                if let Some(frame) = receiver.frame() {
                    ids.push(frame.command);
                }
            }
        }
        ids
    }
}

impl ErrorType for MockUart {
    type Error = MockError;
}

impl UartTx for MockUart {
    fn write_byte(&mut self, byte: u8) -> Result<(), MockError> {
        if self.fail_writes {
            return Err(MockError);
        }
        self.tx.push(byte);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), MockError> {
        self.flushes += 1;
        if let Some(reply) = self.replies.pop_front() {
            self.rx.extend(reply);
        }
        Ok(())
    }
}

impl UartRx for MockUart {
    fn available(&mut self) -> Result<bool, MockError> {
        Ok(!self.rx.is_empty())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, MockError> {
        Ok(self.rx.pop_front())
    }
}

impl UartConfigure for MockUart {
    fn configure(&mut self, config: &UartConfig) -> Result<(), MockError> {
        self.configured.push(config.baudrate);
        Ok(())
    }
}

/// Clock that advances by a fixed step every time it is read
#[derive(Debug)]
pub struct MockClock {
    now: Cell<u64>,
    step: u64,
}

impl MockClock {
    pub fn new(step: u64) -> Self {
        Self {
            now: Cell::new(0),
            step,
        }
    }

    /// Current time without advancing
    pub fn peek(&self) -> u64 {
        self.now.get()
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now + self.step);
        now
    }
}

/// Delay that only records what was requested
#[derive(Debug, Default)]
pub struct MockDelay {
    pub total_ns: u64,
    pub calls: usize,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
        self.calls += 1;
    }
}

/// A complete frame as the OSD would send it
pub fn osd_frame(command: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let _ = write_frame::<FrameError>(command, payload, None, |b| {
        out.push(b);
        Ok(())
    });
    out
}

/// An error frame rejecting `command`
pub fn error_frame(command: CommandId) -> Vec<u8> {
    osd_frame(CommandId::Error.as_u8(), &[command.as_u8()])
}

/// A well-formed info payload
pub fn info_payload() -> [u8; 17] {
    [
        b'A', b'G', b'H', 2, 1, 0, 16, 30, 0x60, 0x01, 0x20, 0x01, 1, 1, 0x00, 0x02, 8,
    ]
}

/// Info response frame
pub fn info_frame() -> Vec<u8> {
    osd_frame(CommandId::Info.as_u8(), &info_payload())
}

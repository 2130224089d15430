//! CRC-8 used by the PixelOSD link
//!
//! Polynomial 0xD5 (x^8 + x^7 + x^6 + x^4 + x^2 + 1), initial value 0,
//! MSB first, no reflection and no final XOR. This is the catalogued
//! CRC-8/DVB-S2.
//!
//! The CRC covers everything between the header and the CRC byte: the
//! length, command id, fixed payload and variable payload (with its
//! length prefix).

/// Generator polynomial
pub const POLYNOMIAL: u8 = 0xD5;

/// Running CRC over a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Crc8 {
    value: u8,
}

impl Crc8 {
    /// Start a new CRC at the seed value 0
    pub const fn new() -> Self {
        Self { value: 0 }
    }

    /// Fold one byte into the CRC
    pub fn update(&mut self, byte: u8) {
        self.value ^= byte;
        for _ in 0..8 {
            if self.value & 0x80 != 0 {
                self.value = (self.value << 1) ^ POLYNOMIAL;
            } else {
                self.value <<= 1;
            }
        }
    }

    /// Fold a run of bytes into the CRC
    pub fn update_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.update(byte);
        }
    }

    /// Current CRC value
    pub const fn value(&self) -> u8 {
        self.value
    }

    /// Restart at the seed value
    pub fn reset(&mut self) {
        self.value = 0;
    }
}

/// CRC of a complete byte sequence
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = Crc8::new();
    crc.update_slice(data);
    crc.value()
}

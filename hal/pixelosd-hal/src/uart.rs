//! UART serial communication abstractions
//!
//! Provides the byte-at-a-time transport the OSD link is built on. The
//! link is strictly polled: the driver asks whether a byte is available,
//! reads it, and never blocks waiting for input.

/// Error type shared by all halves of a UART
pub trait ErrorType {
    /// Error type for transport operations
    type Error: core::fmt::Debug;
}

impl<T: ErrorType + ?Sized> ErrorType for &mut T {
    type Error = T::Error;
}

/// UART transmitter
pub trait UartTx: ErrorType {
    /// Write a single byte
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Write data to the UART
    ///
    /// Blocks until all data has been queued or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for &byte in data {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Block until every queued byte has left the wire
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx: ErrorType {
    /// Check whether at least one received byte is waiting
    fn available(&mut self) -> Result<bool, Self::Error>;

    /// Read a single byte, or `None` if nothing is waiting
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

/// Runtime reconfiguration of the serial link
pub trait UartConfigure: ErrorType {
    /// Apply a new line configuration (bit rate, framing)
    ///
    /// Implementations reopen or reprogram the peripheral; bytes in flight
    /// may be lost.
    fn configure(&mut self, config: &UartConfig) -> Result<(), Self::Error>;
}

/// Combined UART interface
///
/// For UARTs that provide both TX and RX on a single peripheral and can be
/// reconfigured at runtime.
pub trait Uart: UartTx + UartRx + UartConfigure {}

// Blanket implementation
impl<T: UartTx + UartRx + UartConfigure> Uart for T {}

impl<T: UartTx + ?Sized> UartTx for &mut T {
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        T::write_byte(self, byte)
    }

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        T::write_blocking(self, data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        T::flush(self)
    }
}

impl<T: UartRx + ?Sized> UartRx for &mut T {
    fn available(&mut self) -> Result<bool, Self::Error> {
        T::available(self)
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        T::read_byte(self)
    }
}

impl<T: UartConfigure + ?Sized> UartConfigure for &mut T {
    fn configure(&mut self, config: &UartConfig) -> Result<(), Self::Error> {
        T::configure(self, config)
    }
}

/// Default bit rate the OSD boots with
pub const DEFAULT_BAUDRATE: u32 = 115_200;

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: DEFAULT_BAUDRATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl UartConfig {
    /// 8N1 at the given bit rate, the only framing the OSD speaks
    pub fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            ..Self::default()
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Loopback {
        buf: [u8; 8],
        head: usize,
        tail: usize,
        flushes: u8,
    }

    impl ErrorType for Loopback {
        type Error = ();
    }

    impl UartTx for Loopback {
        fn write_byte(&mut self, byte: u8) -> Result<(), ()> {
            if self.tail == self.buf.len() {
                return Err(());
            }
            self.buf[self.tail] = byte;
            self.tail += 1;
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            self.flushes += 1;
            Ok(())
        }
    }

    impl UartRx for Loopback {
        fn available(&mut self) -> Result<bool, ()> {
            Ok(self.head < self.tail)
        }

        fn read_byte(&mut self) -> Result<Option<u8>, ()> {
            if self.head < self.tail {
                self.head += 1;
                Ok(Some(self.buf[self.head - 1]))
            } else {
                Ok(None)
            }
        }
    }

    #[test]
    fn test_default_config_is_8n1() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, DEFAULT_BAUDRATE);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
    }

    #[test]
    fn test_with_baudrate_keeps_framing() {
        let config = UartConfig::with_baudrate(921_600);
        assert_eq!(config.baudrate, 921_600);
        assert_eq!(config.data_bits, DataBits::Eight);
    }

    #[test]
    fn test_write_blocking_uses_write_byte() {
        let mut uart = Loopback {
            buf: [0; 8],
            head: 0,
            tail: 0,
            flushes: 0,
        };
        uart.write_blocking(b"$A").unwrap();
        uart.flush().unwrap();

        assert_eq!(uart.flushes, 1);
        assert!(uart.available().unwrap());
        assert_eq!(uart.read_byte().unwrap(), Some(b'$'));
        assert_eq!(uart.read_byte().unwrap(), Some(b'A'));
        assert_eq!(uart.read_byte().unwrap(), None);
        assert!(!uart.available().unwrap());
    }

    #[test]
    fn test_write_blocking_propagates_error() {
        let mut uart = Loopback {
            buf: [0; 8],
            head: 0,
            tail: 0,
            flushes: 0,
        };
        assert_eq!(uart.write_blocking(&[0u8; 9]), Err(()));
    }

    fn send_one<T: UartTx>(mut tx: T, byte: u8) -> Result<(), T::Error> {
        tx.write_byte(byte)?;
        tx.flush()
    }

    #[test]
    fn test_mut_ref_forwards() {
        let mut uart = Loopback {
            buf: [0; 8],
            head: 0,
            tail: 0,
            flushes: 0,
        };
        send_one(&mut uart, 0x42).unwrap();
        assert_eq!(uart.read_byte().unwrap(), Some(0x42));
        assert_eq!(uart.flushes, 1);
    }
}

//! Adapter from `embedded-io` ports to the UART traits
//!
//! Most HALs expose their serial peripherals through `embedded-io`'s
//! blocking `Read`/`Write`/`ReadReady` traits. Bit-rate changes are not
//! covered by `embedded-io`, so the adapter takes a closure that knows how
//! to reprogram the concrete peripheral.

use embedded_io::{Read, ReadReady, Write};

use crate::uart::{ErrorType, UartConfig, UartConfigure, UartRx, UartTx};

/// UART built from an `embedded-io` port and a reconfiguration hook
pub struct IoUart<T, F> {
    io: T,
    reconfigure: F,
}

impl<T, F> IoUart<T, F>
where
    T: embedded_io::ErrorType,
    F: FnMut(&mut T, &UartConfig) -> Result<(), T::Error>,
{
    /// Wrap a port; `reconfigure` is invoked on every [`UartConfigure::configure`]
    pub fn new(io: T, reconfigure: F) -> Self {
        Self { io, reconfigure }
    }
}

impl<T, F> IoUart<T, F> {
    /// Borrow the underlying port
    pub fn inner(&self) -> &T {
        &self.io
    }

    /// Mutably borrow the underlying port
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.io
    }

    /// Release the underlying port
    pub fn into_inner(self) -> T {
        self.io
    }
}

impl<T: embedded_io::ErrorType, F> ErrorType for IoUart<T, F> {
    type Error = T::Error;
}

impl<T: Write, F> UartTx for IoUart<T, F> {
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.io.write_all(&[byte])
    }

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.io.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.io.flush()
    }
}

impl<T: Read + ReadReady, F> UartRx for IoUart<T, F> {
    fn available(&mut self) -> Result<bool, Self::Error> {
        self.io.read_ready()
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        // `read` blocks on an empty port, so only call it when data is ready
        if !self.io.read_ready()? {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        match self.io.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}

impl<T, F> UartConfigure for IoUart<T, F>
where
    T: embedded_io::ErrorType,
    F: FnMut(&mut T, &UartConfig) -> Result<(), T::Error>,
{
    fn configure(&mut self, config: &UartConfig) -> Result<(), Self::Error> {
        (self.reconfigure)(&mut self.io, config)
    }
}

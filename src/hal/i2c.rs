//! I2C Bus Abstractions
//!
//! The [`Transport`] trait is the boundary between the register model and
//! the physical bus. [`I2cTransport`] adapts any blocking `embedded-hal`
//! I2C implementation. [`ShadowMap`] keeps the last-written register words.

use crate::config::{RANDOM_ACCESS_I2C_ADDR, SEQUENTIAL_I2C_ADDR};

/// Driver error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// The transport reported a failure (NACK, arbitration loss, bus busy)
    Bus(E),
    /// A single-register read returned fewer bytes than requested
    ShortRead {
        /// Bytes requested
        expected: usize,
        /// Bytes the transport delivered
        available: usize,
    },
}

#[cfg(feature = "embedded")]
impl<E: core::fmt::Debug> defmt::Format for Error<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Bus(e) => defmt::write!(f, "bus error: {}", defmt::Debug2Format(e)),
            Self::ShortRead {
                expected,
                available,
            } => defmt::write!(f, "short read: {}/{} bytes", available, expected),
        }
    }
}

/// Bus operation result
pub type BusResult<T, E> = Result<T, Error<E>>;

/// I2C device address wrapper
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusAddress(u8);

impl BusAddress {
    /// Sequential access: reads start at register 0x0A and auto-increment
    pub const SEQUENTIAL: Self = Self(SEQUENTIAL_I2C_ADDR);

    /// Random access: the first written byte selects the register
    pub const RANDOM_ACCESS: Self = Self(RANDOM_ACCESS_I2C_ADDR);

    /// Create from 7-bit address
    #[must_use]
    pub const fn new(addr: u8) -> Self {
        Self(addr & 0x7F)
    }

    /// Get the 7-bit address
    #[must_use]
    pub const fn addr(self) -> u8 {
        self.0
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BusAddress {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "0x{=u8:02X}", self.0);
    }
}

/// Byte-level bus transport
///
/// Bytes are delivered in the order given. Reads report how many bytes
/// actually arrived, which may be fewer than the buffer length. No retries
/// are performed at this level.
pub trait Transport {
    /// Transport failure type
    type Error;

    /// Write bytes to a device in one transaction
    fn write(&mut self, address: BusAddress, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Read up to `buffer.len()` bytes, returning the number available
    fn read(&mut self, address: BusAddress, buffer: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write then read with a repeated start, returning the number of bytes read
    fn write_read(
        &mut self,
        address: BusAddress,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<usize, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn write(&mut self, address: BusAddress, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write(address, bytes)
    }

    fn read(&mut self, address: BusAddress, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(address, buffer)
    }

    fn write_read(
        &mut self,
        address: BusAddress,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<usize, Self::Error> {
        (**self).write_read(address, bytes, buffer)
    }
}

/// [`Transport`] over a blocking `embedded-hal` I2C bus
///
/// `embedded-hal` reads either fill the buffer or fail, so successful reads
/// always report the full length.
pub struct I2cTransport<I> {
    i2c: I,
}

impl<I: embedded_hal::i2c::I2c> I2cTransport<I> {
    /// Wrap an I2C bus
    #[must_use]
    pub const fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Give back the wrapped bus
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: embedded_hal::i2c::I2c> Transport for I2cTransport<I> {
    type Error = I::Error;

    fn write(&mut self, address: BusAddress, bytes: &[u8]) -> Result<(), Self::Error> {
        self.i2c.write(address.addr(), bytes)
    }

    fn read(&mut self, address: BusAddress, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        self.i2c.read(address.addr(), buffer)?;
        Ok(buffer.len())
    }

    fn write_read(
        &mut self,
        address: BusAddress,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<usize, Self::Error> {
        self.i2c.write_read(address.addr(), bytes, buffer)?;
        Ok(buffer.len())
    }
}

/// Shadow copy of the last value written to each register
///
/// Starts from the power-on values and is only updated after a successful
/// write. Never read back from hardware.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShadowMap<const N: usize> {
    values: [u16; N],
}

impl<const N: usize> ShadowMap<N> {
    /// Create a shadow map holding the given power-on values
    #[must_use]
    pub const fn new(initial: [u16; N]) -> Self {
        Self { values: initial }
    }

    /// Get a register value (0 out of range)
    #[must_use]
    pub fn get(&self, index: usize) -> u16 {
        self.values.get(index).copied().unwrap_or(0)
    }

    /// Whether `word` has to be transmitted for register `index`
    #[must_use]
    pub fn needs_write(&self, index: usize, word: u16, force: bool) -> bool {
        index < N && (force || self.values[index] != word)
    }

    /// Record a successfully written value
    pub fn store(&mut self, index: usize, word: u16) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = word;
        }
    }

    /// All shadow values
    #[must_use]
    pub const fn values(&self) -> &[u16; N] {
        &self.values
    }

    /// Iterator over registers whose value differs from `words`
    pub fn changed<'a>(&'a self, words: &'a [u16; N]) -> impl Iterator<Item = (usize, u16)> + 'a {
        self.values
            .iter()
            .zip(words.iter())
            .enumerate()
            .filter(|(_, (old, new))| old != new)
            .map(|(i, (_, &new))| (i, new))
    }
}

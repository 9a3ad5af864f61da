//! Serial link abstraction below the protocol decoder.
//!
//! The monitor talks over a fixed 1200/8/N/1 link. Only the receive side is
//! used while polling, so the link is configured without transmit.

use std::fmt;
use std::io;

use crate::error::LinkError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
    Mark,
    Space,
}

impl Parity {
    fn code(&self) -> char {
        match self {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
            Parity::Mark => 'M',
            Parity::Space => 'S',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopBits {
    One,
    OnePointFive,
    Two,
}

impl StopBits {
    fn code(&self) -> &'static str {
        match self {
            StopBits::One => "1",
            StopBits::OnePointFive => "1.5",
            StopBits::Two => "2",
        }
    }
}

/// Line settings of a serial link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkConfig {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: StopBits,
    /// Whether the host may write to the device (half-duplex).
    pub transmit: bool,
}

impl fmt::Display for LinkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{} {}",
            self.baud_rate,
            self.data_bits,
            self.parity.code(),
            self.stop_bits.code(),
            if self.transmit { "rx+tx" } else { "rx" }
        )
    }
}

/// The only configuration the water rower monitor accepts.
pub const WATERROWER_LINK: LinkConfig = LinkConfig {
    baud_rate: 1200,
    data_bits: 8,
    parity: Parity::None,
    stop_bits: StopBits::One,
    transmit: false,
};

/// A raw byte stream from the physical link.
pub trait ByteSource {
    /// Apply line settings. Drivers that cannot honour a setting should keep
    /// their previous value so the mismatch surfaces in [`ByteSource::config`].
    fn configure(&mut self, config: &LinkConfig) -> Result<(), LinkError>;

    /// The line settings currently in effect.
    fn config(&self) -> LinkConfig;

    /// Read one byte, blocking until it is available.
    fn read(&mut self) -> io::Result<u8>;

    /// Number of bytes that can be read without blocking.
    fn available(&self) -> usize;

    /// Write one byte. Only valid on links configured with `transmit`.
    fn write(&mut self, byte: u8) -> io::Result<()> {
        let _ = byte;
        Err(io::Error::new(io::ErrorKind::Unsupported, "link is receive-only"))
    }
}

/// Configure `source` with `expected` and verify the settings were taken.
pub fn ensure_config<S: ByteSource>(
    source: &mut S,
    expected: &LinkConfig,
) -> Result<(), LinkError> {
    source.configure(expected)?;
    let actual = source.config();
    if actual != *expected {
        return Err(LinkError::Mismatch {
            expected: *expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link_mock::MockByteSource;

    #[test]
    fn test_display() {
        assert_eq!(WATERROWER_LINK.to_string(), "1200/8/N/1 rx");
    }

    #[test]
    fn test_ensure_config() {
        let mut source = MockByteSource::new();
        ensure_config(&mut source, &WATERROWER_LINK).unwrap();
        assert_eq!(source.config(), WATERROWER_LINK);
    }

    #[test]
    fn test_ensure_config_rejects_fixed_baud() {
        let mut source = MockByteSource::fixed_baud(9600);
        let err = ensure_config(&mut source, &WATERROWER_LINK).unwrap_err();
        match err {
            LinkError::Mismatch { actual, .. } => assert_eq!(actual.baud_rate, 9600),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_default_write_is_unsupported() {
        let mut source = MockByteSource::new();
        let err = source.write(0x01).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }
}

use std::collections::VecDeque;
use std::io;

use crate::error::LinkError;
use crate::link::{ByteSource, LinkConfig, Parity, StopBits};

/// Scripted byte source: reads drain queued input and fail with
/// `UnexpectedEof` once it is empty instead of blocking.
#[derive(Clone, Debug)]
pub struct MockByteSource {
    pub input: VecDeque<u8>,
    pub config: LinkConfig,
    pub fixed_baud: Option<u32>,
}

impl Default for MockByteSource {
    fn default() -> Self {
        Self {
            input: VecDeque::new(),
            config: LinkConfig {
                baud_rate: 9600,
                data_bits: 8,
                parity: Parity::None,
                stop_bits: StopBits::One,
                transmit: true,
            },
            fixed_baud: None,
        }
    }
}

impl MockByteSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A driver stuck at one baud rate.
    pub fn fixed_baud(baud_rate: u32) -> Self {
        let mut source = Self::default();
        source.config.baud_rate = baud_rate;
        source.fixed_baud = Some(baud_rate);
        source
    }

    pub fn with_input(bytes: &[u8]) -> Self {
        let mut source = Self::default();
        source.setup_input(bytes);
        source
    }

    /// Queue bytes behind any input not yet read.
    pub fn setup_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }
}

impl ByteSource for MockByteSource {
    fn configure(&mut self, config: &LinkConfig) -> Result<(), LinkError> {
        self.config = *config;
        if let Some(baud) = self.fixed_baud {
            self.config.baud_rate = baud;
        }
        Ok(())
    }

    fn config(&self) -> LinkConfig {
        self.config
    }

    fn read(&mut self) -> io::Result<u8> {
        self.input
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no input queued"))
    }

    fn available(&self) -> usize {
        self.input.len()
    }
}

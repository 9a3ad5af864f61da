//! Decoder for the water rower monitor's legacy serial protocol.
//!
//! The monitor pushes a stream of frames, each an opcode byte in `0xFB..=0xFF`
//! followed by zero to two payload bytes. Anything else on the wire is
//! consumed as a single-byte frame without effect. The decoder keeps the
//! sub-metre distance remainder between frames; [`Protocol::reset`] clears it
//! when a new session starts.

use crate::error::DecodeError;
use crate::link::{ensure_config, ByteSource, WATERROWER_LINK};
use crate::models::Measurement;
use crate::trace::{hex, Trace};

/// Comment written to the trace before the first frame.
pub const PROTOCOL_NAME: &str = "protocol 3";

/// Distance increments arrive in tenths of a metre.
const DECIMETERS_PER_METER: u32 = 10;

/// Speed is reported in tenths of the unit the measurement uses.
const SPEED_SCALE: u32 = 10;

/// Longest frame: opcode plus two payload bytes.
const MAX_FRAME_LEN: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    /// Heart rate, one byte, absolute.
    Pulse,
    /// End of a stroke, no payload.
    Stroke,
    /// Two bytes of meta data with no effect on the measurement.
    Meta,
    /// Distance increment in decimetres, one byte.
    Distance,
    /// Stroke rate and speed, one byte each.
    Rate,
    Unknown(u8),
}

impl Opcode {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0xFB => Opcode::Pulse,
            0xFC => Opcode::Stroke,
            0xFD => Opcode::Meta,
            0xFE => Opcode::Distance,
            0xFF => Opcode::Rate,
            other => Opcode::Unknown(other),
        }
    }

    pub fn payload_len(&self) -> usize {
        match self {
            Opcode::Stroke | Opcode::Unknown(_) => 0,
            Opcode::Pulse | Opcode::Distance => 1,
            Opcode::Meta | Opcode::Rate => 2,
        }
    }
}

/// Stateful frame decoder over a byte source.
pub struct Protocol<S: ByteSource, T: Trace> {
    source: S,
    trace: T,
    announced: bool,
    /// Distance not yet reported, in decimetres. Always below one metre.
    remainder: u32,
}

impl<S: ByteSource, T: Trace> Protocol<S, T> {
    /// Configure the link for the monitor, failing if the source does not take it.
    pub fn new(mut source: S, trace: T) -> Result<Self, DecodeError> {
        ensure_config(&mut source, &WATERROWER_LINK)?;
        Ok(Self {
            source,
            trace,
            announced: false,
            remainder: 0,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn trace(&self) -> &T {
        &self.trace
    }

    pub fn into_parts(self) -> (S, T) {
        (self.source, self.trace)
    }

    /// Forget fractional distance carried over from the previous session.
    pub fn reset(&mut self) {
        self.remainder = 0;
    }

    /// Decode exactly one frame into `measurement`.
    ///
    /// Blocks on the source. When the source fails mid-frame the partial
    /// bytes are traced and `measurement` is left untouched.
    pub fn decode(&mut self, measurement: &mut Measurement) -> Result<Opcode, DecodeError> {
        if !self.announced {
            self.trace.comment(PROTOCOL_NAME);
            self.announced = true;
        }

        let mut frame = [0u8; MAX_FRAME_LEN];
        frame[0] = self.source.read()?;
        let opcode = Opcode::from_byte(frame[0]);
        let len = 1 + opcode.payload_len();

        for idx in 1..len {
            match self.source.read() {
                Ok(byte) => frame[idx] = byte,
                Err(err) => {
                    self.trace.on_input(&frame[..idx]);
                    log::warn!(
                        "partial frame {} after {} of {} bytes: {}",
                        hex(&frame[..idx]),
                        idx,
                        len,
                        err
                    );
                    return Err(err.into());
                }
            }
        }

        let frame = &frame[..len];
        self.trace.on_input(frame);
        self.apply(opcode, &frame[1..], measurement);
        log::debug!("frame {} -> {:?}", hex(frame), opcode);
        Ok(opcode)
    }

    /// Decode frames while the source has bytes buffered, returning the frame count.
    pub fn transfer(&mut self, measurement: &mut Measurement) -> Result<usize, DecodeError> {
        let mut frames = 0;
        while self.source.available() > 0 {
            self.decode(measurement)?;
            frames += 1;
        }
        Ok(frames)
    }

    fn apply(&mut self, opcode: Opcode, payload: &[u8], measurement: &mut Measurement) {
        match opcode {
            Opcode::Pulse => {
                measurement.pulse = u32::from(payload[0]);
            }
            Opcode::Stroke => {
                measurement.strokes = measurement.strokes.saturating_add(1);
            }
            Opcode::Meta => {}
            Opcode::Distance => {
                self.remainder += u32::from(payload[0]);
                measurement.distance = measurement
                    .distance
                    .saturating_add(self.remainder / DECIMETERS_PER_METER);
                self.remainder %= DECIMETERS_PER_METER;
            }
            Opcode::Rate => {
                measurement.stroke_rate = u32::from(payload[0]);
                measurement.speed = u32::from(payload[1]) * SPEED_SCALE;
            }
            Opcode::Unknown(byte) => {
                log::trace!("ignoring unknown opcode {:02X}", byte);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{ByteSource, Parity, StopBits};
    use crate::link_mock::MockByteSource;
    use crate::trace::StringTrace;

    fn protocol() -> Protocol<MockByteSource, StringTrace> {
        Protocol::new(MockByteSource::new(), StringTrace::new()).unwrap()
    }

    fn feed(
        protocol: &mut Protocol<MockByteSource, StringTrace>,
        measurement: &mut Measurement,
        bytes: &[u8],
    ) {
        protocol.source_mut().setup_input(bytes);
        protocol.transfer(measurement).unwrap();
    }

    #[test]
    fn test_configures_link() {
        let protocol = protocol();
        let config = protocol.source().config();
        assert_eq!(config.baud_rate, 1200);
        assert_eq!(config.data_bits, 8);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
        assert!(!config.transmit);
    }

    #[test]
    fn test_rejects_misconfigured_link() {
        let result = Protocol::new(MockByteSource::fixed_baud(9600), StringTrace::new());
        assert!(matches!(result, Err(DecodeError::Link(_))));
    }

    #[test]
    fn test_frames() {
        let mut protocol = protocol();
        let mut m = Measurement::default();

        feed(&mut protocol, &mut m, &[0xFE, 0x19]);
        assert_eq!(m.distance, 2);
        feed(&mut protocol, &mut m, &[0xFE, 0x05]);
        assert_eq!(m.distance, 3);

        feed(&mut protocol, &mut m, &[0xFC]);
        assert_eq!(m.strokes, 1);

        feed(&mut protocol, &mut m, &[0xFD, 0x01, 0x02]);

        feed(&mut protocol, &mut m, &[0xFB, 0x01]);
        assert_eq!(m.pulse, 1);
        feed(&mut protocol, &mut m, &[0xFB, 0x01]);
        assert_eq!(m.pulse, 1);

        feed(&mut protocol, &mut m, &[0xFF, 0x01, 0x02]);
        assert_eq!(m.stroke_rate, 1);
        assert_eq!(m.speed, 20);
        feed(&mut protocol, &mut m, &[0xFF, 0x01, 0x02]);
        assert_eq!(m.stroke_rate, 1);
        assert_eq!(m.speed, 20);

        feed(&mut protocol, &mut m, &[0x01, 0x02, 0x03]);

        assert_eq!(
            protocol.trace().to_string(),
            "#protocol 3<FE 19<FE 05<FC<FD 01 02<FB 01<FB 01<FF 01 02<FF 01 02<01<02<03"
        );
        assert_eq!(m.distance, 3);
        assert_eq!(m.strokes, 1);
    }

    #[test]
    fn test_decode_one_frame_per_call() {
        let mut protocol = protocol();
        let mut m = Measurement::default();
        protocol.source_mut().setup_input(&[0xFC, 0xFC, 0xFB, 0x40]);

        assert_eq!(protocol.decode(&mut m).unwrap(), Opcode::Stroke);
        assert_eq!(m.strokes, 1);
        assert_eq!(protocol.source().available(), 3);

        assert_eq!(protocol.decode(&mut m).unwrap(), Opcode::Stroke);
        assert_eq!(protocol.decode(&mut m).unwrap(), Opcode::Pulse);
        assert_eq!(m.strokes, 2);
        assert_eq!(m.pulse, 0x40);
    }

    #[test]
    fn test_meta_keeps_stream_aligned() {
        let mut protocol = protocol();
        let mut m = Measurement::default();
        // payload bytes that look like opcodes must not be decoded as such
        feed(&mut protocol, &mut m, &[0xFD, 0xFC, 0xFE, 0xFC]);
        assert_eq!(m.strokes, 1);
        assert_eq!(m.distance, 0);
    }

    #[test]
    fn test_distance_remainder_does_not_drift() {
        let mut protocol = protocol();
        let mut m = Measurement::default();
        for _ in 0..1000 {
            feed(&mut protocol, &mut m, &[0xFE, 0x03]);
        }
        // 3000 decimetres
        assert_eq!(m.distance, 300);

        feed(&mut protocol, &mut m, &[0xFE, 0x09]);
        assert_eq!(m.distance, 300);
        feed(&mut protocol, &mut m, &[0xFE, 0x01]);
        assert_eq!(m.distance, 301);
    }

    #[test]
    fn test_large_increment() {
        let mut protocol = protocol();
        let mut m = Measurement::default();
        feed(&mut protocol, &mut m, &[0xFE, 0xFF]);
        assert_eq!(m.distance, 25);
        feed(&mut protocol, &mut m, &[0xFE, 0x05]);
        assert_eq!(m.distance, 26);
    }

    #[test]
    fn test_reset_drops_remainder() {
        let mut protocol = protocol();
        let mut m = Measurement::default();
        feed(&mut protocol, &mut m, &[0xFE, 0x09]);
        protocol.reset();
        let mut m = Measurement::default();
        feed(&mut protocol, &mut m, &[0xFE, 0x09]);
        assert_eq!(m.distance, 0);
    }

    #[test]
    fn test_partial_frame_leaves_measurement() {
        let mut protocol = protocol();
        let mut m = Measurement::default();
        feed(&mut protocol, &mut m, &[0xFF, 0x10, 0x05]);
        let before = m.clone();

        protocol.source_mut().setup_input(&[0xFF, 0x20]);
        let err = protocol.decode(&mut m).unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
        assert_eq!(m, before);
        assert!(protocol.trace().as_str().ends_with("<FF 20"));
    }

    #[test]
    fn test_exhausted_source() {
        let mut protocol = protocol();
        let mut m = Measurement::default();
        assert!(matches!(protocol.decode(&mut m), Err(DecodeError::Io(_))));
        assert_eq!(protocol.trace().as_str(), "#protocol 3");
        assert_eq!(protocol.transfer(&mut m).unwrap(), 0);
    }
}

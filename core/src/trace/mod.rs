//! Byte-level traces of the monitor link.
//!
//! A trace file has one directive per line: `<` followed by the hex bytes of a
//! frame read from the monitor, `>` for bytes written to it, and `#` for
//! comments. Any other line is ignored. Recorded sessions can be replayed
//! through the decoder to get the same measurement back.

pub mod parser;
pub mod recorder;

pub use parser::{parse_directive, parse_trace, Directive};
pub use recorder::{hex, NullTrace, StringTrace, Trace, WriterTrace};

use crate::error::TraceError;
use crate::link_mock::MockByteSource;
use crate::models::Measurement;
use crate::protocol::Protocol;

/// Feed every input directive of `text` through a fresh decoder.
pub fn replay<T: Trace>(text: &str, trace: T) -> Result<(Measurement, T), TraceError> {
    let directives = parse_trace(text)?;
    let mut protocol = Protocol::new(MockByteSource::new(), trace)?;
    let mut measurement = Measurement::default();

    for bytes in directives.iter().filter_map(Directive::input) {
        protocol.source_mut().setup_input(bytes);
        protocol.transfer(&mut measurement)?;
    }

    let (_, trace) = protocol.into_parts();
    Ok((measurement, trace))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay() {
        let text = "#protocol 3\n<FE 19\n<FE 05\n<FC\n>01\n<FB 50\n<FF 1A 30\n";
        let (m, _) = replay(text, NullTrace).unwrap();
        assert_eq!(m.distance, 3);
        assert_eq!(m.strokes, 1);
        assert_eq!(m.pulse, 0x50);
        assert_eq!(m.stroke_rate, 0x1A);
        assert_eq!(m.speed, 0x30 * 10);
    }

    #[test]
    fn test_replay_round_trips_recording() {
        let text = "<FE 19\n<FC\n<FD 01 02\n<07\n";
        let (_, recorded) = replay(text, WriterTrace::new(Vec::new())).unwrap();
        let recorded = String::from_utf8(recorded.into_inner()).unwrap();
        assert_eq!(recorded, format!("#protocol 3\n{text}"));

        let (again, _) = replay(&recorded, NullTrace).unwrap();
        let (first, _) = replay(text, NullTrace).unwrap();
        assert_eq!(again, first);
    }

    #[test]
    fn test_replay_ignores_foreign_lines() {
        let (m, _) = replay("<FC\nprotocol noise\n<FC\n", NullTrace).unwrap();
        assert_eq!(m.strokes, 2);
    }

    #[test]
    fn test_replay_truncated_frame() {
        let err = replay("<FE\n", NullTrace).unwrap_err();
        assert!(matches!(err, TraceError::Replay(_)));
    }
}

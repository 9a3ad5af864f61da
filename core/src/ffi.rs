//! Entry points exported to the host app.

use crate::error::TraceError;
use crate::models::Measurement;
use crate::trace::{replay, NullTrace};

/// Decode a recorded trace and return the final measurement.
#[uniffi::export]
pub fn replay_trace(trace: String) -> Result<Measurement, TraceError> {
    let (measurement, _) = replay(&trace, NullTrace)?;
    Ok(measurement)
}

/// Line settings the monitor requires, e.g. `1200/8/N/1 rx`.
#[uniffi::export]
pub fn link_settings() -> String {
    crate::link::WATERROWER_LINK.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_trace() {
        let m = replay_trace("#protocol 3\n<FE 19\n<FC\n".to_string()).unwrap();
        assert_eq!(m.distance, 2);
        assert_eq!(m.strokes, 1);
    }

    #[test]
    fn test_replay_trace_error() {
        assert!(replay_trace("garbage".to_string()).is_err());
    }

    #[test]
    fn test_link_settings() {
        assert_eq!(link_settings(), "1200/8/N/1 rx");
    }
}

use thiserror::Error;

use crate::link::LinkConfig;

/// Error type for configuring the serial link below the decoder.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinkError {
    #[error("link configuration mismatch: expected {expected}, got {actual}")]
    Mismatch {
        expected: LinkConfig,
        actual: LinkConfig,
    },

    #[error("link unavailable: {0}")]
    Unavailable(String),
}

/// Error type for decoding frames off a byte source.
///
/// Unknown opcodes are not errors, they are consumed and traced.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("byte source failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Link(#[from] LinkError),
}

/// Error type for reading and replaying trace files.
#[derive(Error, Debug, uniffi::Error)]
#[uniffi(flat_error)]
pub enum TraceError {
    #[error("trace parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("trace replay failed: {0}")]
    Replay(#[from] DecodeError),
}

/// Error type for the persistence collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The referenced entity no longer exists.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Error type for a single location provider.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location provider unavailable: {0}")]
    Unavailable(String),
}

/// Error type for session engine operations.
#[derive(Error, Debug)]
pub enum GymError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{Parity, StopBits, WATERROWER_LINK};

    #[test]
    fn test_store_error_display() {
        let err = StoreError::not_found("program", "p-1");
        assert_eq!(err.to_string(), "program not found: p-1");
        assert!(err.is_not_found());

        let err = StoreError::Backend("disk full".to_string());
        assert_eq!(err.to_string(), "store backend error: disk full");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_link_error_display() {
        let actual = LinkConfig {
            baud_rate: 9600,
            data_bits: 8,
            parity: Parity::Even,
            stop_bits: StopBits::One,
            transmit: false,
        };
        let err = LinkError::Mismatch {
            expected: WATERROWER_LINK,
            actual,
        };
        assert_eq!(
            err.to_string(),
            "link configuration mismatch: expected 1200/8/N/1 rx, got 9600/8/E/1 rx"
        );

        let err = LinkError::Unavailable("ttyUSB0 detached".to_string());
        assert_eq!(err.to_string(), "link unavailable: ttyUSB0 detached");
    }

    #[test]
    fn test_trace_error_display() {
        let err = TraceError::Parse {
            line: 3,
            message: "bad hex".to_string(),
        };
        assert_eq!(err.to_string(), "trace parse error at line 3: bad hex");

        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "drained");
        let err = TraceError::Replay(DecodeError::Io(io));
        assert_eq!(err.to_string(), "trace replay failed: byte source failed: drained");
    }
}

//! Error types for each stage of a poll cycle.
//!
//! None of these escape the binary: every one of them ends up rendered as an
//! empty JSON object.

use thiserror::Error;

/// Errors reported by a [`Transport`](crate::Transport) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Nothing arrived within the allotted time.
    #[error("timed out")]
    Timeout,

    /// No device matching the requested address was discovered.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// The notification subscription ended.
    #[error("end of notification stream")]
    EndOfStream,

    /// Operation attempted without an established session.
    #[error("not connected")]
    NotConnected,

    /// Any other failure from the underlying link.
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for TransportError {
    fn from(err: anyhow::Error) -> Self {
        TransportError::Other(format!("{err:#}"))
    }
}

impl From<bluest::Error> for TransportError {
    fn from(err: bluest::Error) -> Self {
        TransportError::Other(err.to_string())
    }
}

/// Failure to assemble a response frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Every attempt timed out or failed.
    #[error("no response after {attempts} attempts")]
    NoResponse {
        /// Attempts made.
        attempts: u32,
    },
}

/// Failure to decode an assembled frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Start marker or terminator missing.
    #[error("malformed frame: {0}")]
    MalformedFrame(&'static str),

    /// Markers are present but the payload is shorter than the field layout.
    #[error("payload too short: expected at least {expected} bytes, got {actual}")]
    PayloadTooShort {
        /// Minimum payload length.
        expected: usize,
        /// Payload length received.
        actual: usize,
    },
}

/// Terminal outcome of a failed poll cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    /// The device never reported a successful connection.
    #[error("connect timeout after {attempts} attempts")]
    ConnectTimeout {
        /// Attempts made.
        attempts: u32,
    },

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

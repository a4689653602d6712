use tokio::time::Duration;

use crate::error::FrameError;
use crate::error::TransportError;
use crate::frame::TERMINATOR;
use crate::transport::Transport;

/// The device answers one request with exactly this many notifications.
pub const CHUNKS_PER_FRAME: usize = 2;

/// Result of a single request/receive attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(Vec<u8>),
    Timeout,
    Error(TransportError),
}

impl From<TransportError> for AttemptOutcome {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => AttemptOutcome::Timeout,
            err => AttemptOutcome::Error(err),
        }
    }
}

/// Request a response from the device and read it whole.
///
/// Each attempt sends `command`, then concatenates [`CHUNKS_PER_FRAME`] chunks,
/// each bounded by `receive_timeout`. An attempt that times out, fails, or
/// yields a buffer not ending in the terminator is dropped entirely and the
/// next one starts again from the send.
///
/// The returned buffer is only known to end in the terminator; the start
/// marker is checked when decoding.
pub async fn assemble<T: Transport>(
    transport: &mut T,
    command: &[u8],
    max_attempts: u32,
    receive_timeout: Duration,
) -> Result<Vec<u8>, FrameError> {
    for attempt in 1..=max_attempts {
        tracing::info!("BMS requesting data (try {attempt})");
        match attempt_once(transport, command, receive_timeout).await {
            AttemptOutcome::Success(buffer) => {
                tracing::info!("BMS received data");
                return Ok(buffer);
            }
            AttemptOutcome::Timeout => {
                tracing::debug!("BMS: attempt {attempt} timed out");
            }
            AttemptOutcome::Error(err) => {
                tracing::debug!("BMS: attempt {attempt} failed: {err}");
            }
        }
    }

    tracing::info!("BMS answering timeout");
    Err(FrameError::NoResponse {
        attempts: max_attempts,
    })
}

async fn attempt_once<T: Transport>(
    transport: &mut T,
    command: &[u8],
    receive_timeout: Duration,
) -> AttemptOutcome {
    if let Err(err) = transport.send_command(command).await {
        return err.into();
    }

    let mut buffer = Vec::new();
    for n in 1..=CHUNKS_PER_FRAME {
        match transport.receive_chunk(receive_timeout).await {
            Ok(chunk) => {
                tracing::trace!("BMS answering {n}: {}", hex::encode(&chunk));
                buffer.extend_from_slice(&chunk);
            }
            Err(err) => return err.into(),
        }
    }

    if buffer.last() != Some(&TERMINATOR) {
        tracing::trace!("BMS: reply without terminator: {}", hex::encode(&buffer));
        return AttemptOutcome::Timeout;
    }
    AttemptOutcome::Success(buffer)
}

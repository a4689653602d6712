use tokio::time::Duration;

use crate::error::TransportError;

/// A point to point link to a single BMS.
///
/// Implementations deliver the device's reply as a series of raw chunks in
/// arrival order. Every wait is bounded by the timeout passed in.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Establish a session with the device at `address`.
    async fn connect(&mut self, address: &str, timeout: Duration) -> Result<(), TransportError>;

    /// Send a command verbatim.
    async fn send_command(&mut self, command: &[u8]) -> Result<(), TransportError>;

    /// Wait for the next chunk of response data.
    async fn receive_chunk(&mut self, timeout: Duration) -> Result<Vec<u8>, TransportError>;

    /// Tear down the session. Must be safe to call when not connected.
    async fn disconnect(&mut self) -> Result<(), TransportError>;
}

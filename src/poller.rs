//! One request/decode cycle against a BMS.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Serializer;
use tokio::time::Duration;

use crate::error::PollError;
use crate::frame_assembler::assemble;
use crate::message::basic_info_message::REQUEST;
use crate::telemetry_record::TelemetryRecord;
use crate::transport::Transport;

/// What gets printed whenever a poll cycle fails.
pub const EMPTY_OUTPUT: &str = "{}";

/// Settings for a poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Address of the device, as understood by the transport
    pub address: String,
    pub connect_attempts: u32,
    pub request_attempts: u32,
    /// Bound on each connect and each receive
    pub timeout: Duration,
}

impl PollConfig {
    pub const DEFAULT_ATTEMPTS: u32 = 10;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            connect_attempts: Self::DEFAULT_ATTEMPTS,
            request_attempts: Self::DEFAULT_ATTEMPTS,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

/// Connect, fetch the basic info block and decode it.
///
/// `disconnect` is called on every path once connecting has been tried,
/// whether or not it succeeded, so no stale session is left on the device.
pub async fn poll<T: Transport>(
    transport: &mut T,
    config: &PollConfig,
) -> Result<TelemetryRecord, PollError> {
    let response = fetch(transport, config).await;

    tracing::info!("BMS disconnecting");
    if let Err(err) = transport.disconnect().await {
        tracing::warn!("BMS: disconnect failed: {err}");
    }

    let response = response?;
    tracing::info!("BMS answer: {}", hex::encode(&response));
    Ok(TelemetryRecord::decode(response)?)
}

async fn fetch<T: Transport>(transport: &mut T, config: &PollConfig) -> Result<Vec<u8>, PollError> {
    connect(transport, config).await?;
    let response = assemble(transport, &REQUEST, config.request_attempts, config.timeout).await?;
    Ok(response)
}

async fn connect<T: Transport>(transport: &mut T, config: &PollConfig) -> Result<(), PollError> {
    for attempt in 1..=config.connect_attempts {
        tracing::info!("BMS connect (try {attempt})");
        match transport.connect(&config.address, config.timeout).await {
            Ok(()) => {
                tracing::info!("BMS connection successful");
                return Ok(());
            }
            Err(err) => tracing::debug!("BMS: connect failed: {err}"),
        }
    }

    tracing::info!("BMS connect timeout");
    Err(PollError::ConnectTimeout {
        attempts: config.connect_attempts,
    })
}

/// Render the outcome of a poll cycle as printed: the record as a JSON object
/// indented by one space, or [`EMPTY_OUTPUT`] on any failure.
pub fn render(result: &Result<TelemetryRecord, PollError>) -> String {
    match result {
        Ok(record) => to_json(record).unwrap_or_else(|err| {
            tracing::warn!("BMS: failed to serialize record: {err}");
            EMPTY_OUTPUT.to_string()
        }),
        Err(err) => {
            tracing::info!("BMS: no data: {err}");
            EMPTY_OUTPUT.to_string()
        }
    }
}

fn to_json(record: &TelemetryRecord) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b" "));
    record.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

use std::collections::VecDeque;

use jbdread::{poll, render, DecodeError, FrameError, PollConfig, PollError, Transport, TransportError, REQUEST_BASIC_INFO};
use tokio::time::Duration;

/// An in-memory device that fails the first `connect_failures` connects and then
/// answers every command from a script of chunks.
#[derive(Default)]
struct ScriptedTransport {
    connect_failures: u32,
    chunks: VecDeque<Result<Vec<u8>, TransportError>>,
    connects: u32,
    commands: Vec<Vec<u8>>,
    disconnects: u32,
}

impl ScriptedTransport {
    fn answering(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|h| Ok(hex::decode(h).unwrap())).collect(),
            ..Default::default()
        }
    }
}

impl Transport for ScriptedTransport {
    async fn connect(&mut self, _address: &str, _timeout: Duration) -> Result<(), TransportError> {
        self.connects += 1;
        if self.connects <= self.connect_failures {
            return Err(TransportError::Timeout);
        }
        Ok(())
    }

    async fn send_command(&mut self, command: &[u8]) -> Result<(), TransportError> {
        self.commands.push(command.to_vec());
        Ok(())
    }

    async fn receive_chunk(&mut self, _timeout: Duration) -> Result<Vec<u8>, TransportError> {
        self.chunks.pop_front().unwrap_or(Err(TransportError::Timeout))
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        self.disconnects += 1;
        Ok(())
    }
}

fn config() -> PollConfig {
    PollConfig {
        timeout: Duration::from_millis(10),
        ..PollConfig::new("A4:C1:38:0B:6B:FC")
    }
}

#[tokio::test]
async fn test_end_to_end() {
    let mut transport = ScriptedTransport::answering(&[
        "dd03001b052800001bb22aef0002290a00000000",
        "000025410304020b740b6bfc3977",
    ]);
    let record = poll(&mut transport, &config()).await.unwrap();

    assert_eq!(record.main_voltage, 13.2);
    assert_eq!(record.main_current, 0.0);
    assert_eq!(record.remaining_capacity, 70.9);
    assert_eq!(record.nominal_capacity, 109.91);
    assert_eq!(record.cycle_count, 2);
    assert_eq!(record.protection_state, 0);
    assert_eq!(record.protection_label, "ok");
    assert_eq!(record.state_of_charge, 65);

    assert_eq!(transport.commands, vec![REQUEST_BASIC_INFO.to_vec()]);
    assert_eq!(transport.disconnects, 1);
}

#[tokio::test]
async fn test_fault_reported() {
    let mut transport = ScriptedTransport::answering(&[
        "dd03001b052800001bb22aef0002290a000000000400",
        "25410304020b740b6bfc3977",
    ]);
    let output = render(&poll(&mut transport, &config()).await);
    assert!(output.contains(r#""ProtectState": 1024"#), "{output}");
    assert!(output.contains(r#""ProtectStateBin": "0000010000000000""#), "{output}");
    assert!(output.contains(r#""ProtectStateText": "ShortCircuit""#), "{output}");
}

#[tokio::test]
async fn test_no_response_prints_empty_object() {
    let mut transport = ScriptedTransport::default();
    let result = poll(&mut transport, &config()).await;

    assert_eq!(result, Err(PollError::Frame(FrameError::NoResponse { attempts: 10 })));
    assert_eq!(render(&result), "{}");
    assert_eq!(transport.commands.len(), 10);
    assert_eq!(transport.disconnects, 1);
}

#[tokio::test]
async fn test_connect_timeout_still_disconnects() {
    let mut transport = ScriptedTransport {
        connect_failures: u32::MAX,
        ..Default::default()
    };
    let result = poll(&mut transport, &config()).await;

    assert_eq!(result, Err(PollError::ConnectTimeout { attempts: 10 }));
    assert_eq!(render(&result), "{}");
    assert_eq!(transport.connects, 10);
    assert!(transport.commands.is_empty());
    assert_eq!(transport.disconnects, 1);
}

#[tokio::test]
async fn test_connect_retried() {
    let mut transport = ScriptedTransport {
        connect_failures: 3,
        ..ScriptedTransport::answering(&[
            "dd03001b052800001bb22aef0002290a00000000",
            "000025410304020b740b6bfc3977",
        ])
    };
    assert!(poll(&mut transport, &config()).await.is_ok());
    assert_eq!(transport.connects, 4);
}

#[tokio::test]
async fn test_malformed_frame_prints_empty_object() {
    let mut transport = ScriptedTransport::answering(&[
        "dd04001b052800001bb22aef0002290a00000000",
        "000025410304020b740b6bfc3977",
    ]);
    let result = poll(&mut transport, &config()).await;

    assert_eq!(
        result,
        Err(PollError::Decode(DecodeError::MalformedFrame("unexpected start marker")))
    );
    assert_eq!(render(&result), "{}");
    assert_eq!(transport.disconnects, 1);
}

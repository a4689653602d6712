//! Read status data from JBD-protocol LiFePO4 Battery Management Systems over Bluetooth Low Energy
//! 
//! Tested with a LIONTRON LX Smart BMS 12.8V 100Ah bought in 2021.
//! 
//! The BMS has a BLE interface exposing a UART-like GATT service. One fixed request asks for
//! the "basic info" block; the reply arrives split over two notifications and is reassembled
//! and decoded here.
//! 
//! Currently the following data can be accessed:
//! 
//! - Pack voltage (V)
//! - Current (A)
//! - Remaining and nominal capacity (Ah)
//! - Cycles (count)
//! - Protection status, raw and as a label
//! - State of charge (%)
//! 
//! # Example
//! 
//! ```no_run
//! # #[tokio::main]
//! # pub async fn main(){
//!     let mut transport = jbdread::BleTransport::default();
//!     let config = jbdread::PollConfig::new("A4:C1:38:0B:6B:FC");
//!     let result = jbdread::poll(&mut transport, &config).await;
//!     println!("{}", jbdread::render(&result));
//! # }
//! ```

mod ble_transport;
mod error;
mod frame;
mod frame_assembler;
pub mod logging;
mod message;
mod poller;
mod protection;
mod telemetry_record;
mod transport;

pub use ble_transport::BleTransport;
pub use error::{DecodeError, FrameError, PollError, TransportError};
pub use frame::{RawFrame, REQUEST_BASIC_INFO, START_MARKER, TERMINATOR};
pub use frame_assembler::{assemble, AttemptOutcome, CHUNKS_PER_FRAME};
pub use poller::{poll, render, PollConfig, EMPTY_OUTPUT};
pub use protection::{ProtectionFault, ProtectionState};
pub use telemetry_record::{decode, TelemetryRecord};
pub use transport::Transport;

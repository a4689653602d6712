use serde::Serialize;

use crate::error::DecodeError;
use crate::frame::RawFrame;
use crate::message::basic_info_message::BasicInfoMessage;

/// The reported state of the battery.
///
/// Serializes to the JSON object printed by the command line tool, keys in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    /// Pack voltage in V
    #[serde(rename = "Vmain")]
    pub main_voltage: f64,
    /// Pack current in A, sign as defined by the device
    #[serde(rename = "Imain")]
    pub main_current: f64,
    /// Remaining capacity in Ah
    #[serde(rename = "RemainCap")]
    pub remaining_capacity: f64,
    /// Nominal capacity in Ah
    #[serde(rename = "NominalCap")]
    pub nominal_capacity: f64,
    /// Lifetime number of battery cycles (count)
    #[serde(rename = "NumberCycles")]
    pub cycle_count: i16,
    /// Raw protection status word
    #[serde(rename = "ProtectState")]
    pub protection_state: u16,
    /// `protection_state` as 16 binary digits, most significant first
    #[serde(rename = "ProtectStateBin")]
    pub protection_state_bin: String,
    /// State of charge in %
    #[serde(rename = "SoC")]
    pub state_of_charge: u8,
    /// Single label summarizing `protection_state`
    #[serde(rename = "ProtectStateText")]
    pub protection_label: String,
}

impl TelemetryRecord {
    /// Decode a response buffer into a record.
    pub fn decode(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        let msg = BasicInfoMessage::new(RawFrame::new(bytes)?)?;
        Ok(Self::from_message(&msg))
    }

    fn from_message(msg: &BasicInfoMessage) -> Self {
        let protection = msg.protection_state();
        Self {
            main_voltage: centi(msg.voltage_cv()),
            main_current: centi(msg.current_ca()),
            remaining_capacity: centi(msg.remaining_capacity_cah()),
            nominal_capacity: centi(msg.nominal_capacity_cah()),
            cycle_count: msg.cycles_count(),
            protection_state: protection.0,
            protection_state_bin: protection.binary(),
            state_of_charge: msg.state_of_charge_pct(),
            protection_label: protection.label().to_string(),
        }
    }
}

fn centi(raw: i16) -> f64 {
    raw as f64 / 100.0
}

/// Decode a response buffer into a [`TelemetryRecord`].
pub fn decode(bytes: &[u8]) -> Result<TelemetryRecord, DecodeError> {
    TelemetryRecord::decode(bytes.to_vec())
}

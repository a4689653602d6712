use crate::error::DecodeError;
use crate::frame::RawFrame;
use crate::protection::ProtectionState;

pub(crate) use crate::frame::REQUEST_BASIC_INFO as REQUEST;

const VOLTAGE_OFFSET: usize = 0;
const CURRENT_OFFSET: usize = 2;
const REMAINING_CAPACITY_OFFSET: usize = 4;
const NOMINAL_CAPACITY_OFFSET: usize = 6;
const CYCLES_OFFSET: usize = 8;
const PROTECTION_OFFSET: usize = 16;
const SOC_OFFSET: usize = 19;

/// Shortest payload holding every field read here.
pub(crate) const MIN_PAYLOAD_LEN: usize = SOC_OFFSET + 1;

/// A message type which contains the basic info block: pack voltage, current,
/// capacities, cycles, protection status and state of charge.
pub(crate) struct BasicInfoMessage(RawFrame);

impl BasicInfoMessage {
    pub fn new(frame: RawFrame) -> Result<Self, DecodeError> {
        let actual = frame.payload().len();
        if actual < MIN_PAYLOAD_LEN {
            return Err(DecodeError::PayloadTooShort {
                expected: MIN_PAYLOAD_LEN,
                actual,
            });
        }
        if !frame.checksum_ok() {
            tracing::debug!("BMS: checksum mismatch in {}", hex::encode(frame.as_bytes()));
        }
        Ok(Self(frame))
    }

    fn i16_at(&self, offset: usize) -> i16 {
        let p = self.0.payload();
        i16::from_be_bytes([p[offset], p[offset + 1]])
    }

    /// Pack voltage in V/100
    pub fn voltage_cv(&self) -> i16 {
        self.i16_at(VOLTAGE_OFFSET)
    }

    /// Pack current in A/100, sign as reported by the device
    pub fn current_ca(&self) -> i16 {
        self.i16_at(CURRENT_OFFSET)
    }

    /// Remaining capacity in Ah/100
    pub fn remaining_capacity_cah(&self) -> i16 {
        self.i16_at(REMAINING_CAPACITY_OFFSET)
    }

    /// Nominal capacity in Ah/100
    pub fn nominal_capacity_cah(&self) -> i16 {
        self.i16_at(NOMINAL_CAPACITY_OFFSET)
    }

    pub fn cycles_count(&self) -> i16 {
        self.i16_at(CYCLES_OFFSET)
    }

    pub fn protection_state(&self) -> ProtectionState {
        let p = self.0.payload();
        ProtectionState(u16::from_be_bytes([p[PROTECTION_OFFSET], p[PROTECTION_OFFSET + 1]]))
    }

    /// State of charge in %
    pub fn state_of_charge_pct(&self) -> u8 {
        self.0.payload()[SOC_OFFSET]
    }
}

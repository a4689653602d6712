//! The protection status word.
//!
//! Bit `n` means `value & (1 << n)`. Only bits 0..=12 carry a fault; the upper
//! three are set by some firmwares without any fault present and are ignored.

use std::fmt;

/// A fault flagged by one bit of the protection status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionFault {
    CellBlockOverVolt,
    CellBlockUnderVol,
    BatteryOverVol,
    BatteryUnderVol,
    ChargingOverTemp,
    ChargingLowTemp,
    DischargingOverTemp,
    DischargingLowTemp,
    ChargingOverCurrent,
    DischargingOverCurrent,
    ShortCircuit,
    ForeEndICError,
    MOSSoftwareLockIn,
}

impl ProtectionFault {
    /// Every fault, in ascending bit order.
    pub const ALL: [ProtectionFault; 13] = [
        ProtectionFault::CellBlockOverVolt,
        ProtectionFault::CellBlockUnderVol,
        ProtectionFault::BatteryOverVol,
        ProtectionFault::BatteryUnderVol,
        ProtectionFault::ChargingOverTemp,
        ProtectionFault::ChargingLowTemp,
        ProtectionFault::DischargingOverTemp,
        ProtectionFault::DischargingLowTemp,
        ProtectionFault::ChargingOverCurrent,
        ProtectionFault::DischargingOverCurrent,
        ProtectionFault::ShortCircuit,
        ProtectionFault::ForeEndICError,
        ProtectionFault::MOSSoftwareLockIn,
    ];

    pub fn bit(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            ProtectionFault::CellBlockOverVolt => "CellBlockOverVolt",
            ProtectionFault::CellBlockUnderVol => "CellBlockUnderVol",
            ProtectionFault::BatteryOverVol => "BatteryOverVol",
            ProtectionFault::BatteryUnderVol => "BatteryUnderVol",
            ProtectionFault::ChargingOverTemp => "ChargingOverTemp",
            ProtectionFault::ChargingLowTemp => "ChargingLowTemp",
            ProtectionFault::DischargingOverTemp => "DischargingOverTemp",
            ProtectionFault::DischargingLowTemp => "DischargingLowTemp",
            ProtectionFault::ChargingOverCurrent => "ChargingOverCurrent",
            ProtectionFault::DischargingOverCurrent => "DischargingOverCurrent",
            ProtectionFault::ShortCircuit => "ShortCircuit",
            ProtectionFault::ForeEndICError => "ForeEndICError",
            ProtectionFault::MOSSoftwareLockIn => "MOSSoftwareLockIn",
        }
    }
}

impl fmt::Display for ProtectionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The raw 16 bit protection status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectionState(pub u16);

impl ProtectionState {
    pub const OK_LABEL: &'static str = "ok";

    /// 16 characters of `0`/`1`, most significant bit first.
    pub fn binary(self) -> String {
        format!("{:016b}", self.0)
    }

    pub fn is_set(self, fault: ProtectionFault) -> bool {
        self.0 & (1 << fault.bit()) != 0
    }

    /// All flagged faults in ascending bit order.
    pub fn faults(self) -> Vec<ProtectionFault> {
        ProtectionFault::ALL
            .into_iter()
            .filter(|&fault| self.is_set(fault))
            .collect()
    }

    /// A single label for the word.
    ///
    /// Bits are scanned from 0 upwards and each set bit overwrites the label, so
    /// when several faults are flagged the highest one is reported. Use
    /// [`ProtectionState::faults`] to get all of them.
    pub fn label(self) -> &'static str {
        let mut label = Self::OK_LABEL;
        for fault in ProtectionFault::ALL {
            if self.is_set(fault) {
                label = fault.label();
            }
        }
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_when_fault_bits_clear() {
        assert_eq!(ProtectionState(0).label(), "ok");
    }

    #[test]
    fn test_ok_ignores_upper_bits() {
        for high in 0u16..8 {
            let state = ProtectionState(high << 13);
            assert_eq!(state.label(), "ok", "{}", state.binary());
            assert!(state.faults().is_empty());
        }
    }

    #[test]
    fn test_single_bits() {
        for fault in ProtectionFault::ALL {
            let state = ProtectionState(1 << fault.bit());
            assert_eq!(state.label(), fault.label());
            assert_eq!(state.faults(), vec![fault]);
        }
    }

    #[test]
    fn test_highest_set_bit_wins() {
        assert_eq!(ProtectionState(0b0000_0000_0000_0011).label(), "CellBlockUnderVol");
        assert_eq!(ProtectionState(0b0001_0000_0000_0001).label(), "MOSSoftwareLockIn");
        assert_eq!(ProtectionState(0b0000_0100_1000_0000).label(), "ShortCircuit");
    }

    #[test]
    fn test_upper_bits_do_not_mask_faults() {
        assert_eq!(ProtectionState(0b1110_0000_0001_0000).label(), "ChargingOverTemp");
    }

    #[test]
    fn test_faults_ascending() {
        let state = ProtectionState(0b0000_0100_0000_0101);
        assert_eq!(
            state.faults(),
            vec![
                ProtectionFault::CellBlockOverVolt,
                ProtectionFault::BatteryOverVol,
                ProtectionFault::ShortCircuit,
            ]
        );
    }

    #[test]
    fn test_binary() {
        assert_eq!(ProtectionState(0).binary(), "0000000000000000");
        assert_eq!(ProtectionState(0x8001).binary(), "1000000000000001");
        assert_eq!(ProtectionState(u16::MAX).binary().len(), 16);
    }
}

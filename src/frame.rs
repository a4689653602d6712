//! The JBD response frame.
//!
//! Byte layout of a "basic info" response:
//!
//! Start Byte | End Byte | Meaning
//! 0          | 1        | Start marker `[0xDD, 0x03]`
//! 2          | 2        | Status (0x00 on success)
//! 3          | 3        | Length of the payload
//! 4          | x        | The payload
//! x+1        | x+2      | Checksum over bytes 2..=x
//! x+3        | x+3      | Terminator `0x77`

use crate::error::DecodeError;

pub const START_MARKER: [u8; 2] = [0xDD, 0x03];
pub const TERMINATOR: u8 = 0x77;
/// Start marker plus status and length bytes.
pub const HEADER_LEN: usize = 4;

/// A verbatim message to send which requests the basic info block
pub const REQUEST_BASIC_INFO: [u8; 7] = [0xDD, 0xA5, 0x03, 0x00, 0xFF, 0xFD, 0x77];

/// A response buffer whose markers have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame(Vec<u8>);

impl RawFrame {
    pub fn new(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        if !bytes.starts_with(&START_MARKER) {
            return Err(DecodeError::MalformedFrame("unexpected start marker"));
        }
        if bytes.last() != Some(&TERMINATOR) {
            return Err(DecodeError::MalformedFrame("missing terminator"));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Everything after the 4 header bytes, trailing checksum and terminator included.
    pub fn payload(&self) -> &[u8] {
        self.0.get(HEADER_LEN..).unwrap_or(&[])
    }

    /// Check the trailing checksum.
    ///
    /// The checksum is the two's complement of the byte sum from the status byte
    /// up to the checksum, sent big endian. A frame too short to hold one never
    /// passes.
    pub fn checksum_ok(&self) -> bool {
        let len = self.0.len();
        if len < HEADER_LEN + 3 {
            return false;
        }
        let actual = u16::from_be_bytes([self.0[len - 3], self.0[len - 2]]);
        actual == checksum(&self.0[2..len - 3])
    }
}

fn checksum(data: &[u8]) -> u16 {
    let sum = data.iter().fold(0u16, |acc, &b| acc.wrapping_add(b as u16));
    0u16.wrapping_sub(sum)
}

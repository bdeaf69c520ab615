//! # UART Link Wrapper
//!
//! Wraps a bus instruction with the serial parameters the bridge uses to
//! forward it onto the servo bus.
//!
//! Checksummed layout:
//! ```text
//! BAUD_CODE | LEN_LO LEN_HI | bus instruction [| LINK_CK]
//! ```
//!
//! LUCI layout:
//! ```text
//! 00 | BAUD_CODE | bus instruction
//! ```
//!
//! Input is a validated [`BusInstruction`], so the length field always fits.

use bytes::BufMut;
use tracing::warn;

use super::WireLayout;
use crate::dynamixel::checksum::checksum;
use crate::dynamixel::sync_write::BusInstruction;

/// Baud rates the bridge can drive the bus at; the baud code is the index
pub const LUCI_BAUD_RATES: [u32; 8] = [
    2_000_000, 1_000_000, 500_000, 222_222, 117_647, 100_000, 57_142, 9_615,
];

/// Default bus baud rate (AX-12 factory setting rounded by the bridge)
pub const DEFAULT_BAUD_RATE: u32 = 57_142;

/// UART port selector placed before the baud code in the LUCI layout
pub const LUCI_UART_PORT: u8 = 0x00;

/// Look up the baud code for a baud rate
///
/// # Returns
///
/// * `Option<u8>` - Code, or `None` if the bridge cannot run at this rate
pub fn baud_code(baud_rate: u32) -> Option<u8> {
    LUCI_BAUD_RATES
        .iter()
        .position(|&rate| rate == baud_rate)
        .map(|index| index as u8)
}

/// Baud code for a baud rate, falling back to the default rate
///
/// An unknown rate is logged at `warn` and encoded as [`DEFAULT_BAUD_RATE`].
pub fn resolve_baud_code(baud_rate: u32) -> u8 {
    match baud_code(baud_rate) {
        Some(code) => code,
        None => {
            warn!(
                "Baud rate {} not supported by the bridge, using {}",
                baud_rate, DEFAULT_BAUD_RATE
            );
            // 57142 is in the table
            baud_code(DEFAULT_BAUD_RATE).unwrap_or(6)
        }
    }
}

/// Wrap a bus instruction in the checksummed link layout
///
/// # Arguments
///
/// * `instruction` - Validated SYNC WRITE instruction
/// * `baud_rate` - Bus baud rate in bit/s
///
/// # Examples
///
/// ```
/// use dxl_bridge::dynamixel::protocol::{MotorCommand, MotorFamily};
/// use dxl_bridge::dynamixel::sync_write::BusInstruction;
/// use dxl_bridge::luci::link::wrap;
///
/// let commands = [MotorCommand::new(1, MotorFamily::Ax12, 150.0, 30.0)];
/// let instruction = BusInstruction::from_commands(&commands).unwrap();
/// let link = wrap(&instruction, 57142);
/// assert_eq!(&link[..3], &[6, 13, 0]);
/// ```
pub fn wrap(instruction: &BusInstruction, baud_rate: u32) -> Vec<u8> {
    wrap_with_layout(instruction, baud_rate, WireLayout::Checksummed, false)
}

/// Wrap a bus instruction using the given layout
///
/// `link_checksum` appends a complement-of-sum byte over the link header and
/// instruction. It only applies to [`WireLayout::Checksummed`].
pub fn wrap_with_layout(
    instruction: &BusInstruction,
    baud_rate: u32,
    layout: WireLayout,
    link_checksum: bool,
) -> Vec<u8> {
    let bus = instruction.encode();
    let code = resolve_baud_code(baud_rate);

    match layout {
        WireLayout::Checksummed => {
            let mut link = Vec::with_capacity(3 + bus.len() + 1);
            link.put_u8(code);
            // At most 258 bytes (50 motors)
            link.put_u16_le(bus.len() as u16);
            link.put_slice(&bus);
            if link_checksum {
                let ck = checksum(&link);
                link.put_u8(ck);
            }
            link
        }
        WireLayout::Luci => {
            let mut link = Vec::with_capacity(2 + bus.len());
            link.put_u8(LUCI_UART_PORT);
            link.put_u8(code);
            link.put_slice(&bus);
            link
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamixel::checksum::verify;
    use crate::dynamixel::protocol::{MotorCommand, MotorFamily, DXL_SYNC_WRITE_MAX_MOTORS};

    fn instruction(count: u8) -> BusInstruction {
        let commands: Vec<MotorCommand> = (1..=count)
            .map(|id| MotorCommand::new(id, MotorFamily::Ax12, 150.0, 30.0))
            .collect();
        BusInstruction::from_commands(&commands).unwrap()
    }

    #[test]
    fn test_baud_codes() {
        assert_eq!(baud_code(2_000_000), Some(0));
        assert_eq!(baud_code(222_222), Some(3));
        assert_eq!(baud_code(57_142), Some(6));
        assert_eq!(baud_code(9_615), Some(7));
        assert_eq!(baud_code(115_200), None);
    }

    #[test]
    fn test_unknown_baud_falls_back_to_default() {
        assert_eq!(resolve_baud_code(115_200), 6);
        assert_eq!(resolve_baud_code(1_000_000), 1);
    }

    #[test]
    fn test_wrap_checksummed() {
        let instruction = instruction(2);
        let bus = instruction.encode();
        let link = wrap(&instruction, 1_000_000);
        assert_eq!(link[0], 1);
        assert_eq!(u16::from_le_bytes([link[1], link[2]]) as usize, bus.len());
        assert_eq!(&link[3..], &bus[..]);
    }

    #[test]
    fn test_wrap_largest_instruction() {
        let instruction = instruction(DXL_SYNC_WRITE_MAX_MOTORS as u8);
        let link = wrap(&instruction, 57_142);
        assert_eq!(u16::from_le_bytes([link[1], link[2]]), 258);
        assert_eq!(link.len(), 3 + 258);
    }

    #[test]
    fn test_wrap_with_link_checksum() {
        let instruction = instruction(1);
        let link = wrap_with_layout(&instruction, 57_142, WireLayout::Checksummed, true);
        assert_eq!(link.len(), 3 + instruction.encoded_len() + 1);
        let (body, ck) = link.split_at(link.len() - 1);
        assert!(verify(body, ck[0]));
    }

    #[test]
    fn test_wrap_luci() {
        let instruction = instruction(1);
        let link = wrap_with_layout(&instruction, 222_222, WireLayout::Luci, false);
        assert_eq!(&link[..2], &[0x00, 3]);
        assert_eq!(&link[2..], &instruction.encode()[..]);
    }

    #[test]
    fn test_link_checksum_ignored_for_luci() {
        let instruction = instruction(1);
        let plain = wrap_with_layout(&instruction, 57_142, WireLayout::Luci, false);
        let flagged = wrap_with_layout(&instruction, 57_142, WireLayout::Luci, true);
        assert_eq!(plain, flagged);
    }
}

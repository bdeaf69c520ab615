//! # Sync-Write Encoder
//!
//! Turns a batch of motor commands into the exact bytes handed to the
//! transport: SYNC WRITE instruction, wrapped in a link frame, wrapped in a
//! transport frame.
//!
//! Encoding is a pure function of its inputs. All structural checks run
//! before any byte is produced.

use tracing::{debug, trace};

use super::frame::{check_module_number, frame, frame_luci, DEFAULT_MODULE_NUMBER};
use super::link::{wrap_with_layout, DEFAULT_BAUD_RATE};
use super::WireLayout;
use crate::config::BusConfig;
use crate::dynamixel::convert::ValueClamped;
use crate::dynamixel::protocol::MotorCommand;
use crate::dynamixel::sync_write::BusInstruction;
use crate::error::EncodeError;

/// A complete frame plus what happened while encoding it
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFrame {
    /// Bytes to transmit
    pub bytes: Vec<u8>,

    /// Number of motor data groups in the frame
    pub motor_count: usize,

    /// Inputs bounded to the motors' physical range
    pub clamped: Vec<ValueClamped>,
}

impl EncodedFrame {
    /// True if any input was clamped
    pub fn has_clamped(&self) -> bool {
        !self.clamped.is_empty()
    }
}

/// Encoder settings shared by every frame sent to one bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWriteEncoder {
    pub layout: WireLayout,
    pub baud_rate: u32,
    pub module_number: u16,
    pub link_checksum: bool,
}

impl Default for SyncWriteEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_BAUD_RATE, DEFAULT_MODULE_NUMBER)
    }
}

impl From<&BusConfig> for SyncWriteEncoder {
    fn from(config: &BusConfig) -> Self {
        Self::new(config.baud_rate, config.module_number)
            .with_layout(config.layout)
            .with_link_checksum(config.link_checksum)
    }
}

impl SyncWriteEncoder {
    /// Checksummed layout without a link checksum
    pub fn new(baud_rate: u32, module_number: u16) -> Self {
        Self {
            layout: WireLayout::Checksummed,
            baud_rate,
            module_number,
            link_checksum: false,
        }
    }

    pub fn with_layout(mut self, layout: WireLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_link_checksum(mut self, link_checksum: bool) -> Self {
        self.link_checksum = link_checksum;
        self
    }

    /// Encode a batch of commands into one transport frame
    ///
    /// # Errors
    ///
    /// * `ModuleOutOfRange` - Module number not addressable
    /// * `EmptyBatch`, `TooManyMotors`, `InvalidMotorId`, `DuplicateMotorId` -
    ///   Batch structure problems
    pub fn encode(&self, commands: &[MotorCommand]) -> Result<EncodedFrame, EncodeError> {
        check_module_number(self.module_number)?;
        let instruction = BusInstruction::from_commands(commands)?;

        let link = wrap_with_layout(&instruction, self.baud_rate, self.layout, self.link_checksum);
        let bytes = match self.layout {
            WireLayout::Checksummed => frame(&link, self.module_number)?,
            WireLayout::Luci => frame_luci(&link, self.module_number)?,
        };

        for entry in instruction.entries() {
            trace!(
                "Motor {}: position {} ticks, velocity {} ticks",
                entry.motor_id, entry.ticks.position, entry.ticks.velocity
            );
        }
        trace!("Bus instruction: {:02X?}", instruction.encode());
        trace!("Link frame ({} bytes): {:02X?}", link.len(), link);
        debug!(
            "Encoded sync write for {} motors ({} bytes, {:?} layout): {:02X?}",
            commands.len(),
            bytes.len(),
            self.layout,
            bytes
        );

        Ok(EncodedFrame {
            bytes,
            motor_count: instruction.entries().len(),
            clamped: instruction.clamped().to_vec(),
        })
    }
}

/// Encode a sync write using the checksummed layout
///
/// # Arguments
///
/// * `commands` - Per-motor targets, sent in the given order
/// * `baud_rate` - Bus baud rate (see [`super::link::LUCI_BAUD_RATES`])
/// * `module_number` - Bridge module (1..=254)
///
/// # Examples
///
/// ```
/// use dxl_bridge::dynamixel::protocol::{MotorCommand, MotorFamily};
/// use dxl_bridge::luci::encoder::encode_sync_write;
///
/// let commands = [MotorCommand::new(1, MotorFamily::Ax12, 150.0, 30.0)];
/// let bytes = encode_sync_write(&commands, 57142, 254).unwrap();
/// assert_eq!(&bytes[..3], &[0x00, 0x02, 0xFE]);
/// ```
pub fn encode_sync_write(
    commands: &[MotorCommand],
    baud_rate: u32,
    module_number: u16,
) -> Result<Vec<u8>, EncodeError> {
    SyncWriteEncoder::new(baud_rate, module_number)
        .encode(commands)
        .map(|encoded| encoded.bytes)
}

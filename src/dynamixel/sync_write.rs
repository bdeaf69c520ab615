//! # SYNC WRITE Instruction Builder
//!
//! Builds the protocol 1.0 SYNC WRITE packet that sets goal position and
//! moving speed on several motors at once.
//!
//! ```text
//! FF FF | FE | LEN | 83 | 1E | 04 | (ID PL PH VL VH) * n | CK
//! ```
//!
//! `LEN = (4 + 1) * n + 4` and `CK` is the complement-of-sum over every byte
//! from the broadcast id through the last data byte.

use std::collections::HashSet;

use bytes::BufMut;

use super::checksum::checksum;
use super::convert::{convert_command, Ticks, ValueClamped};
use super::protocol::*;
use crate::error::EncodeError;

/// Per-motor data block of a SYNC WRITE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWriteEntry {
    pub motor_id: u8,
    pub ticks: Ticks,
}

/// A validated SYNC WRITE instruction, ready to serialize
#[derive(Debug, Clone, PartialEq)]
pub struct BusInstruction {
    entries: Vec<SyncWriteEntry>,
    clamped: Vec<ValueClamped>,
}

/// Check batch structure: non-empty, fits one frame, valid and unique ids
///
/// # Errors
///
/// * `EmptyBatch` - No commands
/// * `TooManyMotors` - More than [`DXL_SYNC_WRITE_MAX_MOTORS`] commands
/// * `InvalidMotorId` - Id 0 or above 253
/// * `DuplicateMotorId` - Same id twice
pub fn validate_batch(commands: &[MotorCommand]) -> Result<(), EncodeError> {
    if commands.is_empty() {
        return Err(EncodeError::EmptyBatch);
    }

    if commands.len() > DXL_SYNC_WRITE_MAX_MOTORS {
        return Err(EncodeError::TooManyMotors {
            count: commands.len(),
            max: DXL_SYNC_WRITE_MAX_MOTORS,
        });
    }

    if let Some(command) = commands
        .iter()
        .find(|command| !(DXL_MOTOR_ID_MIN..=DXL_MOTOR_ID_MAX).contains(&command.id))
    {
        return Err(EncodeError::InvalidMotorId(command.id));
    }

    let mut seen = HashSet::with_capacity(commands.len());
    for command in commands {
        if !seen.insert(command.id) {
            return Err(EncodeError::DuplicateMotorId(command.id));
        }
    }

    Ok(())
}

impl BusInstruction {
    /// Validate a batch and convert every command to register ticks
    ///
    /// Motors keep the order they were supplied in.
    pub fn from_commands(commands: &[MotorCommand]) -> Result<Self, EncodeError> {
        validate_batch(commands)?;

        let mut entries = Vec::with_capacity(commands.len());
        let mut clamped = Vec::new();

        for command in commands {
            let conversion = convert_command(command);
            entries.push(SyncWriteEntry {
                motor_id: command.id,
                ticks: conversion.ticks,
            });
            clamped.extend(conversion.clamped);
        }

        Ok(Self { entries, clamped })
    }

    /// Motor data blocks, in wire order
    pub fn entries(&self) -> &[SyncWriteEntry] {
        &self.entries
    }

    /// Inputs that were bounded during conversion
    pub fn clamped(&self) -> &[ValueClamped] {
        &self.clamped
    }

    /// Value of the length field: `(width + 1) * n + 4`
    pub fn length_field(&self) -> u8 {
        ((DXL_SYNC_WRITE_DATA_WIDTH as usize + 1) * self.entries.len()
            + DXL_SYNC_WRITE_FIXED_LENGTH) as u8
    }

    /// Total packet size in bytes (preamble + id + length field contents)
    pub fn encoded_len(&self) -> usize {
        DXL_PREAMBLE.len() + 1 + 1 + self.length_field() as usize
    }

    /// Serialize to wire bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(self.encoded_len());

        packet.put_slice(&DXL_PREAMBLE);
        packet.put_u8(DXL_BROADCAST_ID);
        packet.put_u8(self.length_field());
        packet.put_u8(DXL_INST_SYNC_WRITE);
        packet.put_u8(DXL_GOAL_POSITION_ADDR);
        packet.put_u8(DXL_SYNC_WRITE_DATA_WIDTH);

        for entry in &self.entries {
            packet.put_u8(entry.motor_id);
            packet.put_u16_le(entry.ticks.position);
            packet.put_u16_le(entry.ticks.velocity);
        }

        // Checksum skips the preamble
        let ck = checksum(&packet[DXL_PREAMBLE.len()..]);
        packet.put_u8(ck);

        packet
    }
}

/// Build the SYNC WRITE packet for a batch of commands
///
/// # Examples
///
/// ```
/// use dxl_bridge::dynamixel::protocol::{MotorCommand, MotorFamily};
/// use dxl_bridge::dynamixel::sync_write::build;
///
/// let packet = build(&[MotorCommand::new(1, MotorFamily::Ax12, 150.0, 30.0)]).unwrap();
/// assert_eq!(&packet[..5], &[0xFF, 0xFF, 0xFE, 0x09, 0x83]);
/// ```
pub fn build(commands: &[MotorCommand]) -> Result<Vec<u8>, EncodeError> {
    Ok(BusInstruction::from_commands(commands)?.encode())
}

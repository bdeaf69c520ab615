//! # LUCI Bridge Framing Module
//!
//! Framing used by the TCP/IP bridge that forwards packets onto the servo bus.
//!
//! This module handles:
//! - Baud code lookup and UART link wrapping
//! - Outer transport framing with module addressing and checksum
//! - The full sync-write encode pipeline

use serde::Deserialize;

pub mod link;
pub mod frame;
pub mod encoder;

/// Byte layout of the link and transport layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireLayout {
    /// Length-prefixed link frame inside a checksummed transport frame
    #[default]
    Checksummed,

    /// Layout emitted by the bridge's mobile app: no outer checksum
    Luci,
}

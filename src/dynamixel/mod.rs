//! # Dynamixel Protocol Module
//!
//! Implementation of the Dynamixel protocol 1.0 pieces needed to drive a
//! servo chain with synchronized writes.
//!
//! This module handles:
//! - Motor family profiles (angle range, tick resolution, speed limits)
//! - Degree/RPM to register tick conversion with clamping
//! - SYNC WRITE packet encoding (goal position + moving speed)
//! - Complement-of-sum checksum calculation

pub mod protocol;
pub mod convert;
pub mod sync_write;
pub mod checksum;

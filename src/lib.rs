//! # DXL Bridge Library
//!
//! Drive a chain of Dynamixel servos through a LUCI TCP/IP bridge.
//!
//! This library builds the triple-nested frame the bridge expects: a
//! Dynamixel SYNC WRITE instruction, wrapped in a UART link frame, wrapped
//! in a transport frame, and hands it to a [`transport::FrameSender`].

pub mod config;
pub mod error;
pub mod dynamixel;
pub mod luci;
pub mod transport;
pub mod fleet;

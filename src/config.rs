//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::dynamixel::protocol::{
    MotorFamily, DXL_MOTOR_ID_MAX, DXL_MOTOR_ID_MIN, DXL_SYNC_WRITE_MAX_MOTORS,
};
use crate::error::{BridgeError, Result};
use crate::luci::frame::{check_module_number, DEFAULT_MODULE_NUMBER};
use crate::luci::link::{LUCI_BAUD_RATES, DEFAULT_BAUD_RATE};
use crate::luci::WireLayout;
use crate::transport::serial::{DEFAULT_SERIAL_BAUD, SERIAL_BAUD_RATES};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub transport: TransportConfig,
    pub bus: BusConfig,
    pub fleet: FleetConfig,
}

/// Link used to reach the bridge
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Wi-Fi bridge over TCP
    #[default]
    Tcp,
    /// Bridge plugged in over USB serial
    Serial,
}

/// Connection to the bridge
#[derive(Debug, Deserialize, Clone)]
pub struct TransportConfig {
    #[serde(default)]
    pub kind: TransportKind,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_inter_frame_delay_ms")]
    pub inter_frame_delay_ms: u64,

    #[serde(default = "default_register_on_connect")]
    pub register_on_connect: bool,

    #[serde(default = "default_serial_port")]
    pub serial_port: String,

    #[serde(default = "default_serial_baud")]
    pub serial_baud: u32,
}

/// Servo bus and framing parameters
#[derive(Debug, Deserialize, Clone)]
pub struct BusConfig {
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_module_number")]
    pub module_number: u16,

    #[serde(default)]
    pub layout: WireLayout,

    #[serde(default)]
    pub link_checksum: bool,
}

/// Motors driven by the convenience helpers
#[derive(Debug, Deserialize, Clone)]
pub struct FleetConfig {
    #[serde(default = "default_motor_ids")]
    pub motor_ids: Vec<u8>,

    #[serde(default = "default_family")]
    pub family: MotorFamily,

    #[serde(default = "default_velocity_rpm")]
    pub velocity_rpm: f64,

    #[serde(default = "default_neutral_pose")]
    pub neutral_pose: Vec<f64>,
}

// Default value functions
fn default_host() -> String { "192.168.1.100".to_string() }
fn default_port() -> u16 { 7777 }
fn default_connect_timeout_ms() -> u64 { 5000 }
fn default_inter_frame_delay_ms() -> u64 { 35 }
fn default_register_on_connect() -> bool { true }
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_serial_baud() -> u32 { DEFAULT_SERIAL_BAUD }

fn default_baud_rate() -> u32 { DEFAULT_BAUD_RATE }
fn default_module_number() -> u16 { DEFAULT_MODULE_NUMBER }

fn default_motor_ids() -> Vec<u8> { (1..=12).collect() }
fn default_family() -> MotorFamily { MotorFamily::Ax12 }
fn default_velocity_rpm() -> f64 { 30.0 }
fn default_neutral_pose() -> Vec<f64> {
    vec![150.0, 90.0, 150.0, 150.0, 210.0, 150.0, 150.0, 90.0, 150.0, 150.0, 210.0, 150.0]
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::default(),
            host: default_host(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
            inter_frame_delay_ms: default_inter_frame_delay_ms(),
            register_on_connect: default_register_on_connect(),
            serial_port: default_serial_port(),
            serial_baud: default_serial_baud(),
        }
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            baud_rate: default_baud_rate(),
            module_number: default_module_number(),
            layout: WireLayout::default(),
            link_checksum: false,
        }
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            motor_ids: default_motor_ids(),
            family: default_family(),
            velocity_rpm: default_velocity_rpm(),
            neutral_pose: default_neutral_pose(),
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> BridgeError {
    BridgeError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dxl_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Transport
        match self.transport.kind {
            TransportKind::Tcp => {
                if self.transport.host.is_empty() {
                    return Err(invalid("transport host cannot be empty"));
                }

                if self.transport.port == 0 {
                    return Err(invalid("transport port must be non-zero"));
                }
            }
            TransportKind::Serial => {
                if self.transport.serial_port.is_empty() {
                    return Err(invalid("serial_port cannot be empty"));
                }

                if !SERIAL_BAUD_RATES.contains(&self.transport.serial_baud) {
                    return Err(invalid(format!(
                        "serial_baud must be one of: {:?}",
                        SERIAL_BAUD_RATES
                    )));
                }
            }
        }

        if self.transport.connect_timeout_ms == 0 || self.transport.connect_timeout_ms > 60000 {
            return Err(invalid("connect_timeout_ms must be between 1 and 60000"));
        }

        if self.transport.inter_frame_delay_ms > 1000 {
            return Err(invalid("inter_frame_delay_ms must be at most 1000"));
        }

        // Bus
        if !LUCI_BAUD_RATES.contains(&self.bus.baud_rate) {
            return Err(invalid(format!(
                "baud_rate must be one of: {:?}",
                LUCI_BAUD_RATES
            )));
        }

        check_module_number(self.bus.module_number).map_err(invalid)?;

        // Fleet
        let fleet = &self.fleet;
        if fleet.motor_ids.is_empty() {
            return Err(invalid("fleet motor_ids cannot be empty"));
        }

        if fleet.motor_ids.len() > DXL_SYNC_WRITE_MAX_MOTORS {
            return Err(invalid(format!(
                "fleet has {} motors, at most {} fit in one frame",
                fleet.motor_ids.len(),
                DXL_SYNC_WRITE_MAX_MOTORS
            )));
        }

        let mut seen = HashSet::new();
        for &id in &fleet.motor_ids {
            if !(DXL_MOTOR_ID_MIN..=DXL_MOTOR_ID_MAX).contains(&id) {
                return Err(invalid(format!("motor id {} is out of range (must be 1-253)", id)));
            }
            if !seen.insert(id) {
                return Err(invalid(format!("motor id {} is listed twice", id)));
            }
        }

        if fleet.neutral_pose.len() != fleet.motor_ids.len() {
            return Err(invalid(format!(
                "neutral_pose has {} entries but motor_ids has {}",
                fleet.neutral_pose.len(),
                fleet.motor_ids.len()
            )));
        }

        let profile = fleet.family.profile();
        for &angle in &fleet.neutral_pose {
            if !(0.0..=profile.angle_range_degrees).contains(&angle) {
                return Err(invalid(format!(
                    "neutral angle {} is outside 0-{} for {}",
                    angle, profile.angle_range_degrees, fleet.family
                )));
            }
        }

        if !(fleet.velocity_rpm > 0.0 && fleet.velocity_rpm <= profile.max_velocity_rpm) {
            return Err(invalid(format!(
                "velocity_rpm must be in (0, {}] for {}",
                profile.max_velocity_rpm, fleet.family
            )));
        }

        Ok(())
    }
}

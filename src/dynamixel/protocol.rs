//! # Dynamixel Protocol Constants and Types
//!
//! Protocol 1.0 definitions for the SYNC WRITE instruction and the
//! per-family unit profiles used to convert degrees and RPM into ticks.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::EncodeError;

/// Packet preamble (always 0xFF 0xFF)
pub const DXL_PREAMBLE: [u8; 2] = [0xFF, 0xFF];

/// Broadcast id, addresses every motor on the bus
pub const DXL_BROADCAST_ID: u8 = 0xFE;

/// SYNC WRITE instruction code
pub const DXL_INST_SYNC_WRITE: u8 = 0x83;

/// Goal position register (followed by moving speed at 32)
pub const DXL_GOAL_POSITION_ADDR: u8 = 30;

/// Bytes written per motor: goal position (2) + moving speed (2)
pub const DXL_SYNC_WRITE_DATA_WIDTH: u8 = 4;

/// Lowest assignable motor id
pub const DXL_MOTOR_ID_MIN: u8 = 1;

/// Highest assignable motor id (254 is broadcast)
pub const DXL_MOTOR_ID_MAX: u8 = 253;

/// Fixed bytes counted by the length field besides motor data:
/// instruction + start address + data width + checksum
pub const DXL_SYNC_WRITE_FIXED_LENGTH: usize = 4;

/// Maximum motors per SYNC WRITE
///
/// The length field is a single byte: (4 + 1) * n + 4 <= 255 gives n <= 50.
pub const DXL_SYNC_WRITE_MAX_MOTORS: usize =
    (u8::MAX as usize - DXL_SYNC_WRITE_FIXED_LENGTH) / (DXL_SYNC_WRITE_DATA_WIDTH as usize + 1);

/// Supported Dynamixel families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
#[repr(u8)]
pub enum MotorFamily {
    Ax12 = 0,
    Ax18 = 1,
    Mx28 = 2,
    Mx64 = 3,
    Mx106 = 4,
    Xl320 = 5,
}

/// Unit profile of a motor family
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorFamilyProfile {
    /// Mechanical range covered by the position register, in degrees
    pub angle_range_degrees: f64,

    /// Position register value at the end of the range
    pub tick_resolution: u16,

    /// Speed reached at the top of the moving speed register, in RPM
    pub max_velocity_rpm: f64,

    /// Moving speed register value at `max_velocity_rpm`
    pub velocity_resolution: u16,
}

const AX_PROFILE: MotorFamilyProfile = MotorFamilyProfile {
    angle_range_degrees: 300.0,
    tick_resolution: 1023,
    max_velocity_rpm: 114.0,
    velocity_resolution: 1023,
};

const MX_PROFILE: MotorFamilyProfile = MotorFamilyProfile {
    angle_range_degrees: 360.0,
    tick_resolution: 4095,
    max_velocity_rpm: 117.0,
    velocity_resolution: 1023,
};

/// Profile table indexed by `MotorFamily as usize`
pub static MOTOR_FAMILY_PROFILES: [MotorFamilyProfile; 6] = [
    AX_PROFILE, // AX-12
    AX_PROFILE, // AX-18
    MX_PROFILE, // MX-28
    MX_PROFILE, // MX-64
    MX_PROFILE, // MX-106
    AX_PROFILE, // XL-320
];

impl MotorFamily {
    /// All families, in wire-code order
    pub const ALL: [MotorFamily; 6] = [
        MotorFamily::Ax12,
        MotorFamily::Ax18,
        MotorFamily::Mx28,
        MotorFamily::Mx64,
        MotorFamily::Mx106,
        MotorFamily::Xl320,
    ];

    /// Unit profile for this family
    pub fn profile(self) -> &'static MotorFamilyProfile {
        &MOTOR_FAMILY_PROFILES[self as usize]
    }

    /// Numeric code used by the bridge tooling
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Canonical display name (e.g. "AX-12")
    pub fn name(self) -> &'static str {
        match self {
            MotorFamily::Ax12 => "AX-12",
            MotorFamily::Ax18 => "AX-18",
            MotorFamily::Mx28 => "MX-28",
            MotorFamily::Mx64 => "MX-64",
            MotorFamily::Mx106 => "MX-106",
            MotorFamily::Xl320 => "XL-320",
        }
    }
}

impl fmt::Display for MotorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for MotorFamily {
    type Error = EncodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        MotorFamily::ALL
            .get(code as usize)
            .copied()
            .ok_or_else(|| EncodeError::InvalidMotorFamily(format!("code {}", code)))
    }
}

impl FromStr for MotorFamily {
    type Err = EncodeError;

    /// Accepts "AX12", "AX-12", "ax_12", ... (case and separator insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_uppercase())
            .collect();

        match normalized.as_str() {
            "AX12" | "AX12A" => Ok(MotorFamily::Ax12),
            "AX18" | "AX18A" => Ok(MotorFamily::Ax18),
            "MX28" => Ok(MotorFamily::Mx28),
            "MX64" => Ok(MotorFamily::Mx64),
            "MX106" => Ok(MotorFamily::Mx106),
            "XL320" => Ok(MotorFamily::Xl320),
            _ => Err(EncodeError::InvalidMotorFamily(s.to_string())),
        }
    }
}

impl TryFrom<String> for MotorFamily {
    type Error = EncodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Target for a single motor in a sync-write batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorCommand {
    /// Bus id (1..=253)
    pub id: u8,

    /// Motor family, selects the unit profile
    pub family: MotorFamily,

    /// Goal position in degrees
    pub target_angle_degrees: f64,

    /// Moving speed in RPM
    pub target_velocity_rpm: f64,
}

impl MotorCommand {
    pub fn new(id: u8, family: MotorFamily, target_angle_degrees: f64, target_velocity_rpm: f64) -> Self {
        Self {
            id,
            family,
            target_angle_degrees,
            target_velocity_rpm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_constants() {
        assert_eq!(DXL_PREAMBLE, [0xFF, 0xFF]);
        assert_eq!(DXL_BROADCAST_ID, 0xFE);
        assert_eq!(DXL_INST_SYNC_WRITE, 0x83);
        assert_eq!(DXL_GOAL_POSITION_ADDR, 0x1E);
        assert_eq!(DXL_SYNC_WRITE_DATA_WIDTH, 4);
    }

    #[test]
    fn test_max_motors_fits_length_byte() {
        assert_eq!(DXL_SYNC_WRITE_MAX_MOTORS, 50);
        let length = (DXL_SYNC_WRITE_DATA_WIDTH as usize + 1) * DXL_SYNC_WRITE_MAX_MOTORS + 4;
        assert!(length <= u8::MAX as usize);
        assert!(length + 5 > u8::MAX as usize);
    }

    #[test]
    fn test_profiles() {
        let ax = MotorFamily::Ax12.profile();
        assert_eq!(ax.angle_range_degrees, 300.0);
        assert_eq!(ax.tick_resolution, 1023);
        assert_eq!(ax.max_velocity_rpm, 114.0);

        let mx = MotorFamily::Mx106.profile();
        assert_eq!(mx.angle_range_degrees, 360.0);
        assert_eq!(mx.tick_resolution, 4095);
        assert_eq!(mx.max_velocity_rpm, 117.0);
        assert_eq!(mx.velocity_resolution, 1023);

        assert_eq!(MotorFamily::Ax18.profile(), MotorFamily::Ax12.profile());
        assert_eq!(MotorFamily::Xl320.profile().tick_resolution, 1023);
    }

    #[test]
    fn test_xl320_uses_ax_scaling() {
        let xl = MotorFamily::Xl320.profile();
        assert_eq!(xl, MotorFamily::Ax12.profile());
        assert_eq!(xl.angle_range_degrees, 300.0);
        assert_eq!(xl.max_velocity_rpm, 114.0);
        assert_ne!(xl, MotorFamily::Mx28.profile());
    }

    #[test]
    fn test_family_codes_round_trip() {
        for family in MotorFamily::ALL {
            assert_eq!(MotorFamily::try_from(family.code()).unwrap(), family);
        }
        assert_eq!(MotorFamily::Mx28.code(), 2);
    }

    #[test]
    fn test_unknown_family_code() {
        let err = MotorFamily::try_from(6).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidMotorFamily(_)));
    }

    #[test]
    fn test_family_from_str() {
        assert_eq!("AX12".parse::<MotorFamily>().unwrap(), MotorFamily::Ax12);
        assert_eq!("ax-18a".parse::<MotorFamily>().unwrap(), MotorFamily::Ax18);
        assert_eq!("MX_106".parse::<MotorFamily>().unwrap(), MotorFamily::Mx106);
        assert_eq!("xl320".parse::<MotorFamily>().unwrap(), MotorFamily::Xl320);
        assert!(matches!(
            "RX28".parse::<MotorFamily>(),
            Err(EncodeError::InvalidMotorFamily(name)) if name == "RX28"
        ));
    }

    #[test]
    fn test_family_display() {
        assert_eq!(MotorFamily::Mx64.to_string(), "MX-64");
        let parsed: MotorFamily = MotorFamily::Mx64.to_string().parse().unwrap();
        assert_eq!(parsed, MotorFamily::Mx64);
    }
}

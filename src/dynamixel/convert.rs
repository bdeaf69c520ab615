//! # Value Converter
//!
//! Maps degrees and RPM onto position and moving-speed register ticks for a
//! motor family. Out-of-range inputs are clamped, never rejected, and every
//! clamp is reported as a [`ValueClamped`] record.
//!
//! A moving speed of 0 ticks means "maximum speed, no control" on the bus.
//! Requests that would land on 0 are remapped to [`MIN_VELOCITY_TICKS`].

use tracing::warn;

use super::protocol::{MotorCommand, MotorFamily};

/// Slowest real moving speed; 0 is the unregulated "max speed" sentinel
pub const MIN_VELOCITY_TICKS: u16 = 1;

/// Which physical quantity was bounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClampedQuantity {
    /// Angle outside `[0, angle_range_degrees]`
    Angle,

    /// Velocity outside `[0, max_velocity_rpm]`
    Velocity,

    /// Velocity that converts to the 0-tick sentinel, raised to the minimum tick
    ZeroVelocity,
}

/// Non-fatal signal: an input was bounded to fit the motor's range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueClamped {
    pub motor_id: u8,
    pub quantity: ClampedQuantity,

    /// Value as supplied by the caller (degrees or RPM)
    pub requested: f64,

    /// Value actually encoded (degrees or RPM, before tick rounding)
    pub applied: f64,
}

/// Register values for one motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticks {
    pub position: u16,
    pub velocity: u16,
}

/// Result of converting one command
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub ticks: Ticks,
    pub clamped: Vec<ValueClamped>,
}

/// Bound `value` to `[0, max]`, mapping NaN to 0
///
/// Returns the bounded value and whether it differs from the input.
fn bound(value: f64, max: f64) -> (f64, bool) {
    if value.is_nan() {
        return (0.0, true);
    }
    let bounded = value.clamp(0.0, max);
    (bounded, bounded != value)
}

/// Scale a bounded physical value onto `[0, resolution]`
fn scale(value: f64, range: f64, resolution: u16) -> u16 {
    (value / range * resolution as f64).round() as u16
}

/// Convert an angle to position ticks
///
/// `position_ticks = round(clamp(angle, 0, range) / range * resolution)`
///
/// # Returns
///
/// * `(u16, bool)` - Ticks and whether the angle was clamped
pub fn angle_to_ticks(angle_degrees: f64, family: MotorFamily) -> (u16, bool) {
    let profile = family.profile();
    let (angle, clamped) = bound(angle_degrees, profile.angle_range_degrees);
    (
        scale(angle, profile.angle_range_degrees, profile.tick_resolution),
        clamped,
    )
}

/// Convert a velocity to moving-speed ticks, before the zero-tick remap
///
/// # Returns
///
/// * `(u16, bool)` - Ticks and whether the velocity was clamped
pub fn velocity_to_ticks(velocity_rpm: f64, family: MotorFamily) -> (u16, bool) {
    let profile = family.profile();
    let (velocity, clamped) = bound(velocity_rpm, profile.max_velocity_rpm);
    (
        scale(velocity, profile.max_velocity_rpm, profile.velocity_resolution),
        clamped,
    )
}

/// Convert one angle/velocity pair for a motor family
///
/// Never fails. Clamps are returned in [`Conversion::clamped`] and logged at
/// `warn` level.
///
/// # Arguments
///
/// * `motor_id` - Id recorded in clamp reports
/// * `angle_degrees` - Goal position in degrees
/// * `velocity_rpm` - Moving speed in RPM
/// * `family` - Motor family selecting the unit profile
///
/// # Examples
///
/// ```
/// use dxl_bridge::dynamixel::convert::convert;
/// use dxl_bridge::dynamixel::protocol::MotorFamily;
///
/// let conversion = convert(1, 180.0, 30.0, MotorFamily::Ax12);
/// assert_eq!(conversion.ticks.position, 614);
/// assert!(conversion.clamped.is_empty());
/// ```
pub fn convert(motor_id: u8, angle_degrees: f64, velocity_rpm: f64, family: MotorFamily) -> Conversion {
    let profile = family.profile();
    let mut clamped = Vec::new();

    let (position, angle_clamped) = angle_to_ticks(angle_degrees, family);
    if angle_clamped {
        clamped.push(ValueClamped {
            motor_id,
            quantity: ClampedQuantity::Angle,
            requested: angle_degrees,
            applied: bound(angle_degrees, profile.angle_range_degrees).0,
        });
    }

    let (mut velocity, velocity_clamped) = velocity_to_ticks(velocity_rpm, family);
    if velocity_clamped {
        clamped.push(ValueClamped {
            motor_id,
            quantity: ClampedQuantity::Velocity,
            requested: velocity_rpm,
            applied: bound(velocity_rpm, profile.max_velocity_rpm).0,
        });
    }

    if velocity < MIN_VELOCITY_TICKS {
        velocity = MIN_VELOCITY_TICKS;
        clamped.push(ValueClamped {
            motor_id,
            quantity: ClampedQuantity::ZeroVelocity,
            requested: velocity_rpm,
            applied: MIN_VELOCITY_TICKS as f64 / profile.velocity_resolution as f64
                * profile.max_velocity_rpm,
        });
    }

    for report in &clamped {
        warn!(
            "Motor {} ({}): {:?} {} clamped to {}",
            motor_id, family, report.quantity, report.requested, report.applied
        );
    }

    Conversion {
        ticks: Ticks { position, velocity },
        clamped,
    }
}

/// Convert a [`MotorCommand`]
pub fn convert_command(command: &MotorCommand) -> Conversion {
    convert(
        command.id,
        command.target_angle_degrees,
        command.target_velocity_rpm,
        command.family,
    )
}

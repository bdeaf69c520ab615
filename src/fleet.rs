//! # Fleet Helpers
//!
//! Caller-side shortcuts for driving every motor of a robot at once.
//! A fleet fixes the motor ids, family and default speed so a pose is just
//! a list of angles.

use tracing::info;

use crate::config::FleetConfig;
use crate::dynamixel::protocol::{MotorCommand, MotorFamily};
use crate::error::{BridgeError, Result};
use crate::luci::encoder::{EncodedFrame, SyncWriteEncoder};
use crate::transport::{send_sync_write, FrameSender};

/// Neutral standing pose of the 12-servo robot, in degrees
pub const NEUTRAL_POSE: [f64; 12] = [
    150.0, 90.0, 150.0, 150.0, 210.0, 150.0, 150.0, 90.0, 150.0, 150.0, 210.0, 150.0,
];

/// Speed used when a pose does not specify one, in RPM
pub const DEFAULT_VELOCITY_RPM: f64 = 30.0;

/// A set of motors driven together
#[derive(Debug, Clone, PartialEq)]
pub struct Fleet {
    motor_ids: Vec<u8>,
    family: MotorFamily,
    velocity_rpm: f64,
    neutral_pose: Vec<f64>,
}

impl Default for Fleet {
    /// Motors 1-12, all AX-12, 30 RPM
    fn default() -> Self {
        Self {
            motor_ids: (1..=12).collect(),
            family: MotorFamily::Ax12,
            velocity_rpm: DEFAULT_VELOCITY_RPM,
            neutral_pose: NEUTRAL_POSE.to_vec(),
        }
    }
}

impl From<&FleetConfig> for Fleet {
    fn from(config: &FleetConfig) -> Self {
        Self {
            motor_ids: config.motor_ids.clone(),
            family: config.family,
            velocity_rpm: config.velocity_rpm,
            neutral_pose: config.neutral_pose.clone(),
        }
    }
}

impl Fleet {
    pub fn motor_ids(&self) -> &[u8] {
        &self.motor_ids
    }

    pub fn family(&self) -> MotorFamily {
        self.family
    }

    pub fn len(&self) -> usize {
        self.motor_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motor_ids.is_empty()
    }

    fn check_len(&self, got: usize) -> Result<()> {
        if got != self.len() {
            return Err(BridgeError::PoseLengthMismatch {
                expected: self.len(),
                got,
            });
        }
        Ok(())
    }

    /// Build one command per motor from a pose
    ///
    /// # Arguments
    ///
    /// * `positions_degrees` - One angle per motor, in fleet order
    /// * `velocities_rpm` - One speed per motor, or `None` for the fleet default
    ///
    /// # Errors
    ///
    /// Returns `PoseLengthMismatch` if either list length differs from the fleet size
    pub fn commands(
        &self,
        positions_degrees: &[f64],
        velocities_rpm: Option<&[f64]>,
    ) -> Result<Vec<MotorCommand>> {
        self.check_len(positions_degrees.len())?;
        if let Some(velocities) = velocities_rpm {
            self.check_len(velocities.len())?;
        }

        Ok(self
            .motor_ids
            .iter()
            .zip(positions_degrees)
            .enumerate()
            .map(|(i, (&id, &angle))| {
                let velocity = velocities_rpm.map_or(self.velocity_rpm, |v| v[i]);
                MotorCommand::new(id, self.family, angle, velocity)
            })
            .collect())
    }

    /// Commands for the neutral pose at the default speed
    pub fn neutral_commands(&self) -> Result<Vec<MotorCommand>> {
        self.commands(&self.neutral_pose, None)
    }

    /// Send a pose to every motor in one frame
    pub async fn send_pose<S>(
        &self,
        sender: &mut S,
        encoder: &SyncWriteEncoder,
        positions_degrees: &[f64],
        velocities_rpm: Option<&[f64]>,
    ) -> Result<EncodedFrame>
    where
        S: FrameSender + ?Sized,
    {
        let commands = self.commands(positions_degrees, velocities_rpm)?;
        send_sync_write(sender, encoder, &commands).await
    }

    /// Move every motor to the neutral pose
    pub async fn move_to_neutral<S>(
        &self,
        sender: &mut S,
        encoder: &SyncWriteEncoder,
    ) -> Result<EncodedFrame>
    where
        S: FrameSender + ?Sized,
    {
        info!("Moving {} motors to neutral", self.len());
        let commands = self.neutral_commands()?;
        send_sync_write(sender, encoder, &commands).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamixel::convert::angle_to_ticks;
    use crate::transport::sender_trait::mocks::RecordingSender;

    #[test]
    fn test_default_fleet() {
        let fleet = Fleet::default();
        assert_eq!(fleet.len(), 12);
        assert_eq!(fleet.motor_ids(), &(1..=12).collect::<Vec<u8>>()[..]);
        assert_eq!(fleet.family(), MotorFamily::Ax12);
    }

    #[test]
    fn test_neutral_commands() {
        let commands = Fleet::default().neutral_commands().unwrap();
        assert_eq!(commands.len(), 12);
        for (i, command) in commands.iter().enumerate() {
            assert_eq!(command.id as usize, i + 1);
            assert_eq!(command.target_angle_degrees, NEUTRAL_POSE[i]);
            assert_eq!(command.target_velocity_rpm, DEFAULT_VELOCITY_RPM);
        }
    }

    #[test]
    fn test_custom_velocities() {
        let fleet = Fleet::default();
        let velocities = [10.0; 12];
        let commands = fleet.commands(&NEUTRAL_POSE, Some(&velocities)).unwrap();
        assert!(commands.iter().all(|c| c.target_velocity_rpm == 10.0));
    }

    #[test]
    fn test_pose_length_mismatch() {
        let fleet = Fleet::default();
        assert!(matches!(
            fleet.commands(&[150.0; 11], None),
            Err(BridgeError::PoseLengthMismatch { expected: 12, got: 11 })
        ));
        assert!(matches!(
            fleet.commands(&NEUTRAL_POSE, Some(&[30.0; 3])),
            Err(BridgeError::PoseLengthMismatch { expected: 12, got: 3 })
        ));
    }

    #[test]
    fn test_from_config() {
        let config = FleetConfig {
            motor_ids: vec![4, 5],
            family: MotorFamily::Mx64,
            velocity_rpm: 12.0,
            neutral_pose: vec![180.0, 90.0],
        };
        let commands = Fleet::from(&config).neutral_commands().unwrap();
        assert_eq!(
            commands,
            vec![
                MotorCommand::new(4, MotorFamily::Mx64, 180.0, 12.0),
                MotorCommand::new(5, MotorFamily::Mx64, 90.0, 12.0),
            ]
        );
    }

    #[test]
    fn test_move_to_neutral_frame() {
        let mut sender = RecordingSender::new();
        let encoder = SyncWriteEncoder::default();

        let encoded = tokio_test::block_on(Fleet::default().move_to_neutral(&mut sender, &encoder))
            .unwrap();
        assert_eq!(encoded.motor_count, 12);
        assert!(!encoded.has_clamped());

        let frames = sender.sent_frames();
        assert_eq!(frames.len(), 1);

        // transport header(5) + link header(3) + bus header(7)
        let groups = &frames[0][15..15 + 12 * 5];
        for (i, group) in groups.chunks(5).enumerate() {
            assert_eq!(group[0] as usize, i + 1);
            let (expected, _) = angle_to_ticks(NEUTRAL_POSE[i], MotorFamily::Ax12);
            assert_eq!(u16::from_le_bytes([group[1], group[2]]), expected);
            assert_eq!(u16::from_le_bytes([group[3], group[4]]), 269);
        }
        // bus checksum, then transport checksum
        assert_eq!(frames[0].len(), 15 + 60 + 2);
    }

    #[tokio::test]
    async fn test_send_pose_failure_propagates() {
        let mut sender = RecordingSender::new();
        sender.set_failure("bridge unreachable");

        let result = Fleet::default()
            .send_pose(&mut sender, &SyncWriteEncoder::default(), &NEUTRAL_POSE, None)
            .await;
        assert!(matches!(result, Err(BridgeError::Transport(_))));
        assert!(sender.sent_frames().is_empty());
    }
}

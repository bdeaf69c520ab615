//! # Error Types
//!
//! Custom error types for DXL Bridge using `thiserror`.

use thiserror::Error;

/// Structural errors raised while building a sync-write frame
///
/// Every variant is detected before any byte is produced, so a failed
/// encode never leaves a partially valid frame behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// No motors supplied
    #[error("empty batch: at least one motor command is required")]
    EmptyBatch,

    /// Two commands address the same motor
    #[error("duplicate motor id {0} in batch")]
    DuplicateMotorId(u8),

    /// Motor id outside the addressable bus range
    #[error("motor id {0} is outside 1..=253")]
    InvalidMotorId(u8),

    /// Batch does not fit in a single sync-write instruction
    #[error("batch of {count} motors exceeds the maximum of {max} per frame")]
    TooManyMotors { count: usize, max: usize },

    /// Module number outside the bridge's addressable range
    #[error("module number {0} is outside 1..=254")]
    ModuleOutOfRange(u16),

    /// Payload too long for a transport frame's 16-bit length field
    #[error("link frame of {len} bytes exceeds the maximum of {max}")]
    FrameTooLarge { len: usize, max: usize },

    /// Unknown motor family code or name
    #[error("invalid motor family: {0}")]
    InvalidMotorFamily(String),
}

/// Main error type for DXL Bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Frame encoding errors
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport connection or transmission errors
    #[error("Transport error: {0}")]
    Transport(String),

    /// Pose does not match the fleet it is meant for
    #[error("pose has {got} entries but the fleet has {expected} motors")]
    PoseLengthMismatch { expected: usize, got: usize },
}

/// Result type alias for DXL Bridge
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_error_messages() {
        assert_eq!(
            EncodeError::DuplicateMotorId(3).to_string(),
            "duplicate motor id 3 in batch"
        );
        assert_eq!(
            EncodeError::ModuleOutOfRange(300).to_string(),
            "module number 300 is outside 1..=254"
        );
    }

    #[test]
    fn test_encode_error_converts_into_bridge_error() {
        let err: BridgeError = EncodeError::EmptyBatch.into();
        assert!(matches!(err, BridgeError::Encode(EncodeError::EmptyBatch)));
    }
}

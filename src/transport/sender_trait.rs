//! Trait abstraction for frame transmission to enable testing

use async_trait::async_trait;

use crate::error::Result;

#[cfg(test)]
use mockall::automock;

/// Transmits complete frames to the bridge
///
/// `send` takes `&mut self`, so a sender has at most one frame in flight.
/// The servo bus has no correlation id, which makes interleaved writes
/// unsafe. Implementations must not retry: replaying a motion command can
/// apply the motion twice.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FrameSender: Send {
    /// Write one complete frame
    async fn send(&mut self, frame: &[u8]) -> Result<()>;
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use crate::error::BridgeError;
    use std::sync::{Arc, Mutex};

    /// Sender that records every frame it is given
    #[derive(Clone, Default)]
    pub struct RecordingSender {
        pub frames: Arc<Mutex<Vec<Vec<u8>>>>,
        pub fail: Arc<Mutex<Option<String>>>,
    }

    impl RecordingSender {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn sent_frames(&self) -> Vec<Vec<u8>> {
            self.frames.lock().unwrap().clone()
        }

        pub fn set_failure(&self, message: &str) {
            *self.fail.lock().unwrap() = Some(message.to_string());
        }
    }

    #[async_trait]
    impl FrameSender for RecordingSender {
        async fn send(&mut self, frame: &[u8]) -> Result<()> {
            if let Some(message) = self.fail.lock().unwrap().clone() {
                return Err(BridgeError::Transport(message));
            }
            self.frames.lock().unwrap().push(frame.to_vec());
            Ok(())
        }
    }
}

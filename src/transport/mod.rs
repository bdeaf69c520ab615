//! # Transport Module
//!
//! Handles the link to the LUCI bridge, over TCP or USB serial.
//!
//! This module handles:
//! - Connecting to the bridge with a timeout
//! - Announcing the client with the registration packet (TCP only)
//! - Writing one frame at a time, paced by the inter-frame delay
//!
//! Responses from the bridge are never read; the command path is write-only.

pub mod port_trait;
pub mod sender_trait;
pub mod serial;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, info};

use crate::config::{TransportConfig, TransportKind};
use crate::dynamixel::protocol::MotorCommand;
use crate::error::{BridgeError, Result};
use crate::luci::encoder::{EncodedFrame, SyncWriteEncoder};
use crate::luci::frame::LUCI_REGISTER_PACKET;

pub use sender_trait::FrameSender;
pub use serial::SerialFrameSender;

/// TCP connection to the bridge
pub struct TcpFrameSender {
    /// Connected socket
    stream: TcpStream,
    /// Remote address (e.g., 192.168.0.132:7777)
    peer: String,
    /// Pause after each frame so the bridge can drain it onto the bus
    inter_frame_delay: Duration,
}

impl std::fmt::Debug for TcpFrameSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpFrameSender")
            .field("peer", &self.peer)
            .field("inter_frame_delay", &self.inter_frame_delay)
            .finish_non_exhaustive()
    }
}

impl TcpFrameSender {
    /// Connect to the bridge
    ///
    /// Sends the registration packet first when `register_on_connect` is set.
    ///
    /// # Errors
    ///
    /// Returns error if the connection times out, is refused, or the
    /// registration packet cannot be written. No retry is attempted.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dxl_bridge::config::TransportConfig;
    /// use dxl_bridge::transport::TcpFrameSender;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let sender = TcpFrameSender::connect(&TransportConfig::default()).await?;
    ///     println!("Connected to {}", sender.peer());
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(config: &TransportConfig) -> Result<Self> {
        let peer = format!("{}:{}", config.host, config.port);
        debug!("Connecting to bridge at {}", peer);

        let connect_timeout = Duration::from_millis(config.connect_timeout_ms);
        let stream = timeout(connect_timeout, TcpStream::connect(peer.as_str()))
            .await
            .map_err(|_| {
                BridgeError::Transport(format!(
                    "Timed out connecting to {} after {} ms",
                    peer, config.connect_timeout_ms
                ))
            })?
            .map_err(|e| BridgeError::Transport(format!("Failed to connect to {}: {}", peer, e)))?;

        stream.set_nodelay(true)?;

        let mut sender = Self {
            stream,
            peer,
            inter_frame_delay: Duration::from_millis(config.inter_frame_delay_ms),
        };

        if config.register_on_connect {
            sender.register().await?;
        }

        info!("Connected to bridge at {}", sender.peer);
        Ok(sender)
    }

    /// Announce this client to the bridge
    async fn register(&mut self) -> Result<()> {
        self.write_frame(&LUCI_REGISTER_PACKET).await?;
        debug!("Sent registration packet to {}", self.peer);
        Ok(())
    }

    async fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.stream
            .write_all(frame)
            .await
            .map_err(|e| BridgeError::Transport(format!("Failed to write frame: {}", e)))?;

        self.stream
            .flush()
            .await
            .map_err(|e| BridgeError::Transport(format!("Failed to flush socket: {}", e)))?;

        Ok(())
    }

    /// Remote address of the bridge
    pub fn peer(&self) -> &str {
        &self.peer
    }
}

#[async_trait]
impl FrameSender for TcpFrameSender {
    async fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.write_frame(frame).await?;
        debug!("Sent frame ({} bytes) to {}", frame.len(), self.peer);

        if !self.inter_frame_delay.is_zero() {
            sleep(self.inter_frame_delay).await;
        }
        Ok(())
    }
}

/// Open the sender selected by `config.kind`
///
/// # Errors
///
/// Returns the connect or open error of the selected transport.
pub async fn open_sender(config: &TransportConfig) -> Result<Box<dyn FrameSender>> {
    let sender: Box<dyn FrameSender> = match config.kind {
        TransportKind::Tcp => Box::new(TcpFrameSender::connect(config).await?),
        TransportKind::Serial => Box::new(SerialFrameSender::open(config).await?),
    };
    Ok(sender)
}

/// Encode a batch and hand it to the sender
///
/// Encoding errors are returned before anything is sent. A failed send is
/// returned unchanged and never retried.
///
/// # Returns
///
/// * `Result<EncodedFrame>` - The frame that was sent
pub async fn send_sync_write<S>(
    sender: &mut S,
    encoder: &SyncWriteEncoder,
    commands: &[MotorCommand],
) -> Result<EncodedFrame>
where
    S: FrameSender + ?Sized,
{
    let encoded = encoder.encode(commands)?;
    sender.send(&encoded.bytes).await?;
    Ok(encoded)
}

//! # USB Serial Transport
//!
//! Sends bridge frames over a USB serial link instead of TCP. The bridge
//! accepts the same frames on both links; the serial side has no
//! registration packet.
//!
//! The port is opened 8N1 without flow control, both buffers are cleared,
//! and the link is given a short settle time before the first frame.

use async_trait::async_trait;
use tokio::time::{sleep, Duration};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info};

use super::port_trait::{SerialPortIO, TokioSerialPort};
use super::FrameSender;
use crate::config::TransportConfig;
use crate::error::{BridgeError, Result};

/// Default host-to-bridge serial rate
pub const DEFAULT_SERIAL_BAUD: u32 = 57_600;

/// Serial rates accepted by the configuration
pub const SERIAL_BAUD_RATES: [u32; 7] = [9_600, 19_200, 38_400, 57_600, 115_200, 230_400, 1_000_000];

/// Time the bridge needs after the port opens before it accepts frames
pub const SERIAL_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Frame sender over a serial port
pub struct SerialFrameSender<P: SerialPortIO = TokioSerialPort> {
    /// Port handle
    port: P,
    /// Device path (e.g., /dev/ttyUSB0 or COM20)
    device_path: String,
    /// Pause after each frame so the bridge can drain it onto the bus
    inter_frame_delay: Duration,
}

impl<P: SerialPortIO> std::fmt::Debug for SerialFrameSender<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialFrameSender")
            .field("device_path", &self.device_path)
            .field("inter_frame_delay", &self.inter_frame_delay)
            .finish_non_exhaustive()
    }
}

impl SerialFrameSender<TokioSerialPort> {
    /// Open the configured serial port
    ///
    /// # Errors
    ///
    /// Returns error if the port cannot be opened or its buffers cannot be
    /// cleared. No retry is attempted.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dxl_bridge::config::{TransportConfig, TransportKind};
    /// use dxl_bridge::transport::serial::SerialFrameSender;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let config = TransportConfig {
    ///         kind: TransportKind::Serial,
    ///         serial_port: "/dev/ttyUSB0".to_string(),
    ///         ..TransportConfig::default()
    ///     };
    ///     let sender = SerialFrameSender::open(&config).await?;
    ///     println!("Opened {}", sender.device_path());
    ///     Ok(())
    /// }
    /// ```
    pub async fn open(config: &TransportConfig) -> Result<Self> {
        let path = config.serial_port.as_str();
        debug!("Opening serial port {} at {} baud", path, config.serial_baud);

        let stream = tokio_serial::new(path, config.serial_baud)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(Duration::from_millis(config.connect_timeout_ms))
            .open_native_async()
            .map_err(|e| BridgeError::Transport(format!("Failed to open {}: {}", path, e)))?;

        let sender = Self::attach(
            TokioSerialPort::new(stream),
            path,
            Duration::from_millis(config.inter_frame_delay_ms),
        )?;
        sleep(SERIAL_SETTLE_DELAY).await;

        info!("Opened bridge serial port {} ({} baud)", path, config.serial_baud);
        Ok(sender)
    }
}

impl<P: SerialPortIO> SerialFrameSender<P> {
    /// Take over an already opened port, discarding stale buffered bytes
    pub fn attach(mut port: P, device_path: &str, inter_frame_delay: Duration) -> Result<Self> {
        port.clear_buffers().map_err(|e| {
            BridgeError::Transport(format!("Failed to clear {} buffers: {}", device_path, e))
        })?;

        Ok(Self {
            port,
            device_path: device_path.to_string(),
            inter_frame_delay,
        })
    }

    /// Path of the opened serial device
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[async_trait]
impl<P: SerialPortIO> FrameSender for SerialFrameSender<P> {
    async fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.port
            .write_all(frame)
            .await
            .map_err(|e| BridgeError::Transport(format!("Failed to write frame: {}", e)))?;

        self.port
            .flush()
            .await
            .map_err(|e| BridgeError::Transport(format!("Failed to flush serial port: {}", e)))?;

        debug!("Sent frame ({} bytes) to {}", frame.len(), self.device_path);

        if !self.inter_frame_delay.is_zero() {
            sleep(self.inter_frame_delay).await;
        }
        Ok(())
    }
}

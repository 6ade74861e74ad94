//! Camera Capture for the Space Apples Playground
//!
//! Supplies a live sequence of front-camera frames to the signal extractor.
//! Supports:
//! - Synthetic blank frames (no camera attached)
//! - Replaying a still image as a live stream
//! - A paced background capture service feeding a tokio channel

pub mod frame;
pub mod source;

pub use frame::VideoFrame;
pub use source::{open_source, CaptureService, FrameSource, StillImageSource, SyntheticSource};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Camera error types
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open camera: {0}")]
    Open(String),

    #[error("Frame read failed: {0}")]
    Read(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Capture width
    pub width: u32,
    /// Capture height
    pub height: u32,
    /// Target FPS
    pub fps: u32,
    /// Frames buffered between capture thread and consumer
    pub channel_capacity: usize,
    /// Still image replayed instead of a live camera
    pub image_path: Option<String>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self::front()
    }
}

impl CameraConfig {
    /// Create front camera config (playground default)
    pub fn front() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
            channel_capacity: 4,
            image_path: None,
        }
    }

    /// Check the configuration can drive a capture loop
    pub fn validate(&self) -> Result<(), CameraError> {
        if self.width == 0 || self.height == 0 {
            return Err(CameraError::Config(format!(
                "frame size {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        if self.fps == 0 {
            return Err(CameraError::Config("fps must be non-zero".into()));
        }
        if self.channel_capacity == 0 {
            return Err(CameraError::Config("channel_capacity must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_front_defaults() {
        let config = CameraConfig::default();
        assert_eq!(config.width, 640);
        assert_eq!(config.fps, 30);
        assert!(config.image_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_fps() {
        let config = CameraConfig {
            fps: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CameraError::Config(_))));
    }
}

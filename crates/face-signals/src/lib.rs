//! Face Signals
//!
//! Turns camera frames into the two scalars that steer the playground:
//! - Tilt slope (head roll, from the line between the eyes)
//! - Eye gap (eyelid separation, sizes the character's eyes)
//!
//! Landmark detection itself sits behind [`LandmarkEstimator`]; the
//! [`SignalExtractor`] throttles calls to it and publishes the latest values
//! through a single-slot watch channel.

pub mod config;
pub mod extractor;
pub mod landmarks;

pub use config::SignalConfig;
pub use extractor::{FrameOutcome, SignalExtractor, Signals};
pub use landmarks::{EyeLandmarks, FaceObservation, LandmarkEstimator, MockEstimator, Point2};

use thiserror::Error;

/// Signal extraction error types
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Landmark estimation failed: {0}")]
    Estimator(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

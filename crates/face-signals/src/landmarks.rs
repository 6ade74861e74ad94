//! Face landmark data and the estimator seam

use camera_capture::VideoFrame;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::SignalError;

/// Point in normalized image coordinates (0-1, y up)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Ordered eye contour, starting at the reference corner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EyeLandmarks {
    pub points: Vec<Point2>,
}

impl EyeLandmarks {
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Reference point used for the tilt line
    pub fn reference(&self) -> Option<Point2> {
        self.points.first().copied()
    }

    pub fn y_at(&self, index: usize) -> Option<f64> {
        self.points.get(index).map(|p| p.y)
    }
}

/// One detected face. Either eye may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceObservation {
    pub left_eye: Option<EyeLandmarks>,
    pub right_eye: Option<EyeLandmarks>,
}

impl FaceObservation {
    pub fn new(left_eye: EyeLandmarks, right_eye: EyeLandmarks) -> Self {
        Self {
            left_eye: Some(left_eye),
            right_eye: Some(right_eye),
        }
    }

    /// Both eye contours, if both are present and non-empty
    pub fn eyes(&self) -> Option<(&EyeLandmarks, &EyeLandmarks)> {
        let left = self.left_eye.as_ref().filter(|e| !e.points.is_empty())?;
        let right = self.right_eye.as_ref().filter(|e| !e.points.is_empty())?;
        Some((left, right))
    }
}

/// Locates faces in a frame and returns their eye contours.
///
/// An empty result means no face. Implementations may be slow and block; the
/// extractor only calls them on throttled frames, from a blocking thread.
pub trait LandmarkEstimator: Send {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<FaceObservation>, SignalError>;
}

impl<F> LandmarkEstimator for F
where
    F: FnMut(&VideoFrame) -> Result<Vec<FaceObservation>, SignalError> + Send,
{
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<FaceObservation>, SignalError> {
        self(frame)
    }
}

/// Synthetic face whose head rolls back and forth with the frame sequence.
///
/// Stands in for a real detector when none is available.
#[derive(Debug, Clone)]
pub struct MockEstimator {
    /// Frames per full sway cycle
    pub period_frames: u32,
    /// Peak roll angle (radians)
    pub amplitude_rad: f64,
    /// Vertical eye radius in normalized units
    pub aperture: f64,
}

impl Default for MockEstimator {
    fn default() -> Self {
        Self {
            period_frames: 300,
            amplitude_rad: 0.15,
            aperture: 0.02,
        }
    }
}

const CONTOUR_POINTS: usize = 8;
const EYE_RADIUS_X: f64 = 0.04;
const FACE_CENTER: Point2 = Point2::new(0.5, 0.6);
const EYE_OFFSET_X: f64 = 0.15;

impl MockEstimator {
    /// Roll angle for a given frame sequence number
    pub fn roll_at(&self, sequence: u32) -> f64 {
        let period = self.period_frames.max(1);
        let phase = (sequence % period) as f64 / period as f64;
        self.amplitude_rad * (phase * TAU).sin()
    }

    fn eye(&self, center: Point2, roll: f64) -> EyeLandmarks {
        let (sin, cos) = roll.sin_cos();
        let points = (0..CONTOUR_POINTS)
            .map(|i| {
                let theta = i as f64 * TAU / CONTOUR_POINTS as f64;
                let local_x = center.x - FACE_CENTER.x + EYE_RADIUS_X * theta.cos();
                let local_y = center.y - FACE_CENTER.y + self.aperture * theta.sin();
                Point2::new(
                    FACE_CENTER.x + local_x * cos - local_y * sin,
                    FACE_CENTER.y + local_x * sin + local_y * cos,
                )
            })
            .collect();
        EyeLandmarks::new(points)
    }
}

impl LandmarkEstimator for MockEstimator {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<FaceObservation>, SignalError> {
        let roll = self.roll_at(frame.sequence);
        let left = self.eye(Point2::new(FACE_CENTER.x - EYE_OFFSET_X, FACE_CENTER.y), roll);
        let right = self.eye(Point2::new(FACE_CENTER.x + EYE_OFFSET_X, FACE_CENTER.y), roll);
        Ok(vec![FaceObservation::new(left, right)])
    }
}

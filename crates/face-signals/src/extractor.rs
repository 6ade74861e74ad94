//! Throttled signal extraction from face landmarks

use camera_capture::VideoFrame;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::landmarks::{EyeLandmarks, LandmarkEstimator};
use crate::{SignalConfig, SignalError};

/// Latest published signals
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Signals {
    /// Vertical over horizontal change between the eye reference points
    pub tilt_slope: f64,
    /// Mean upper-minus-lower lid height across both eyes
    pub eye_gap: f64,
}

/// What a single `on_frame` call did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Not a throttled frame; estimator not called
    Throttled,
    /// Estimator returned an error
    EstimatorFailed,
    /// Estimator found no face
    NoFace,
    /// Faces found but none had usable eye data
    Unchanged,
    /// At least one face contributed; carries the signals now published
    Updated(Signals),
}

/// Head tilt as slope of the line between eye reference points.
///
/// `None` when the eyes share an x coordinate or the result is not finite.
pub fn tilt_slope(left: &EyeLandmarks, right: &EyeLandmarks) -> Option<f64> {
    let l = left.reference()?;
    let r = right.reference()?;
    let dx = r.x - l.x;
    if dx == 0.0 {
        return None;
    }
    let slope = (r.y - l.y) / dx;
    slope.is_finite().then_some(slope)
}

/// Eye aperture proxy: mean lid separation of both eyes
pub fn eye_gap(left: &EyeLandmarks, right: &EyeLandmarks, config: &SignalConfig) -> Option<f64> {
    let lid_gap = |eye: &EyeLandmarks| -> Option<f64> {
        Some(eye.y_at(config.upper_lid_index)? - eye.y_at(config.lower_lid_index)?)
    };
    let gap = (lid_gap(left)? + lid_gap(right)?) / 2.0;
    gap.is_finite().then_some(gap)
}

/// Runs the estimator on every Nth frame and publishes the derived signals.
///
/// Single writer; readers hold the `watch::Receiver` returned by [`new`](Self::new)
/// and poll it whenever they like. Values are never decayed: with no face the
/// last published signals stay in place.
pub struct SignalExtractor<E> {
    estimator: E,
    config: SignalConfig,
    frames_seen: u64,
    estimator_calls: u64,
    signals: Signals,
    publisher: watch::Sender<Signals>,
}

impl<E: LandmarkEstimator> SignalExtractor<E> {
    /// Create an extractor and the receiver the game loop polls
    pub fn new(
        estimator: E,
        config: SignalConfig,
    ) -> Result<(Self, watch::Receiver<Signals>), SignalError> {
        config.validate()?;
        let (publisher, receiver) = watch::channel(Signals::default());

        Ok((
            Self {
                estimator,
                config,
                frames_seen: 0,
                estimator_calls: 0,
                signals: Signals::default(),
                publisher,
            },
            receiver,
        ))
    }

    /// Process one incoming frame
    pub fn on_frame(&mut self, frame: &VideoFrame) -> FrameOutcome {
        self.frames_seen += 1;
        if self.frames_seen % self.config.throttle_every != 0 {
            return FrameOutcome::Throttled;
        }

        self.estimator_calls += 1;
        let faces = match self.estimator.detect(frame) {
            Ok(faces) => faces,
            Err(e) => {
                warn!("Landmark estimation failed on frame {}: {}", frame.sequence, e);
                return FrameOutcome::EstimatorFailed;
            }
        };

        if faces.is_empty() {
            trace!("No face in frame {}", frame.sequence);
            return FrameOutcome::NoFace;
        }

        // Every usable face overwrites the previous one; the last wins.
        let mut next = self.signals;
        let mut contributed = false;
        for face in &faces {
            let Some((left, right)) = face.eyes() else {
                debug!("Face without both eyes in frame {}, skipping", frame.sequence);
                continue;
            };

            if let Some(gap) = eye_gap(left, right, &self.config) {
                next.eye_gap = gap;
                contributed = true;
            }

            match tilt_slope(left, right) {
                Some(slope) => {
                    next.tilt_slope = slope;
                    contributed = true;
                }
                None => debug!("Degenerate eye line in frame {}, slope kept", frame.sequence),
            }
        }

        if !contributed {
            return FrameOutcome::Unchanged;
        }

        if next != self.signals {
            self.signals = next;
            self.publisher.send_replace(next);
        }
        FrameOutcome::Updated(next)
    }

    /// Consume frames until the channel closes or every signal reader is
    /// gone.
    ///
    /// Blocks the calling thread, estimator calls included. Must not be
    /// called from an async task; see [`spawn`](Self::spawn).
    pub fn run(mut self, mut frames: mpsc::Receiver<VideoFrame>) -> Self {
        info!(
            "Starting signal extractor (estimator every {} frames)",
            self.config.throttle_every
        );

        while let Some(frame) = frames.blocking_recv() {
            if self.publisher.is_closed() {
                debug!("No signal readers left, stopping");
                break;
            }
            self.on_frame(&frame);
        }

        info!(
            "Frame channel closed after {} frames ({} estimator calls)",
            self.frames_seen, self.estimator_calls
        );
        self
    }

    /// Run on tokio's blocking pool so slow estimators never hold an async
    /// worker thread
    pub fn spawn(self, frames: mpsc::Receiver<VideoFrame>) -> JoinHandle<Self>
    where
        E: 'static,
    {
        tokio::task::spawn_blocking(move || self.run(frames))
    }

    /// Most recently published signals
    pub fn latest(&self) -> Signals {
        self.signals
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    pub fn estimator_calls(&self) -> u64 {
        self.estimator_calls
    }
}

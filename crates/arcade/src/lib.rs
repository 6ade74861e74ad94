//! Space Apples Arcade
//!
//! Head-tilt steered catch game:
//! - Spawner timer drops one apple at a time
//! - Stepper timer moves the player by the latest tilt slope
//! - Score counts apples caught when a move finishes over one
//!
//! Rendering is left to a [`Presenter`]; onboarding copy and starfield layout
//! are provided as plain data for it.

pub mod config;
pub mod game;
pub mod game_loop;
pub mod geometry;
pub mod onboarding;
pub mod presenter;
pub mod scene;

pub use config::GameConfig;
pub use game::{Catch, Game, GameSnapshot, ScoreBoard, Transition};
pub use game_loop::GameLoop;
pub use geometry::Rect;
pub use onboarding::{Onboarding, OnboardingStep, Slide};
pub use presenter::{Presenter, PresenterEvent, RecordingPresenter, TracingPresenter};
pub use scene::{character_eye_height, starfield, Star};

use thiserror::Error;

/// Arcade error types
#[derive(Error, Debug)]
pub enum ArcadeError {
    #[error("Configuration error: {0}")]
    Config(String),
}

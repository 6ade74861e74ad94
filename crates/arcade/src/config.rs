//! Game configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ArcadeError;

/// Game loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Spawner period (milliseconds)
    pub spawn_period_ms: u64,

    /// Stepper period (milliseconds)
    pub step_period_ms: u64,

    /// Eased move duration; collision is checked when it completes (milliseconds)
    pub transition_ms: u64,

    /// Player offset change per unit of tilt slope
    pub gain: f64,

    /// Play area size (points)
    pub play_width: f64,
    pub play_height: f64,

    /// Character size (points)
    pub player_width: f64,
    pub player_height: f64,

    /// How far the character extends below the bottom edge
    pub player_overhang: f64,

    /// Apple size (points)
    pub target_width: f64,
    pub target_height: f64,

    /// Distance from the bottom edge to the apple's top
    pub target_lift: f64,

    /// Score at which the label switches to the "that's enough" message
    pub saturation_threshold: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            spawn_period_ms: 1000,
            step_period_ms: 210,
            transition_ms: 200,
            gain: 100.0,
            play_width: 1024.0,
            play_height: 768.0,
            player_width: 222.0,
            player_height: 433.0,
            player_overhang: 150.0,
            target_width: 100.0,
            target_height: 50.0,
            target_lift: 150.0,
            saturation_threshold: 20,
        }
    }
}

impl GameConfig {
    pub fn spawn_period(&self) -> Duration {
        Duration::from_millis(self.spawn_period_ms)
    }

    pub fn step_period(&self) -> Duration {
        Duration::from_millis(self.step_period_ms)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn validate(&self) -> Result<(), ArcadeError> {
        if self.spawn_period_ms == 0 || self.step_period_ms == 0 {
            return Err(ArcadeError::Config("timer periods must be non-zero".into()));
        }
        if !(self.play_width > 0.0 && self.play_height > 0.0) {
            return Err(ArcadeError::Config(format!(
                "play area {}x{} is empty",
                self.play_width, self.play_height
            )));
        }
        if !self.gain.is_finite() {
            return Err(ArcadeError::Config("gain must be finite".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let config = GameConfig::default();
        assert_eq!(config.spawn_period(), Duration::from_secs(1));
        assert_eq!(config.step_period(), Duration::from_millis(210));
        assert!(config.transition() < config.step_period());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_period_rejected() {
        let config = GameConfig {
            step_period_ms: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ArcadeError::Config(_))));
    }

    #[test]
    fn test_empty_play_area_rejected() {
        let config = GameConfig {
            play_width: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}

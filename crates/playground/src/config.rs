//! Layered playground configuration

use arcade::{GameConfig, Slide};
use camera_capture::CameraConfig;
use ::config::{Config, Environment, File};
use face_signals::SignalConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::PlaygroundError;

/// Onboarding carousel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardingConfig {
    /// Time each slide stays up before its button is pressed (milliseconds)
    pub auto_advance_ms: u64,

    /// Replacement slide copy
    pub slides: Option<Vec<Slide>>,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            auto_advance_ms: 1500,
            slides: None,
        }
    }
}

impl OnboardingConfig {
    pub fn auto_advance(&self) -> Duration {
        Duration::from_millis(self.auto_advance_ms)
    }
}

/// Top-level playground configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    /// tracing level filter (trace, debug, info, warn, error)
    pub log_level: String,

    pub camera: CameraConfig,
    pub signals: SignalConfig,
    pub game: GameConfig,
    pub onboarding: OnboardingConfig,

    /// Stop after this long; run until Ctrl-C when unset (milliseconds)
    pub run_for_ms: Option<u64>,

    /// Seed for apple placement; random when unset
    pub seed: Option<u64>,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            camera: CameraConfig::default(),
            signals: SignalConfig::default(),
            game: GameConfig::default(),
            onboarding: OnboardingConfig::default(),
            run_for_ms: None,
            seed: None,
        }
    }
}

impl PlaygroundConfig {
    /// Load defaults, then `path` (or `./playground.*` if present), then
    /// `PLAYGROUND__SECTION__KEY` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, PlaygroundError> {
        Self::load_with(path, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix("PLAYGROUND")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with(path: Option<&Path>, environment: Environment) -> Result<Self, PlaygroundError> {
        let mut builder = Config::builder();
        builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("playground").required(false)),
        };
        builder = builder.add_source(environment);

        let loaded: Self = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), PlaygroundError> {
        self.camera.validate()?;
        self.signals.validate()?;
        self.game.validate()?;
        Ok(())
    }

    pub fn run_for(&self) -> Option<Duration> {
        self.run_for_ms.map(Duration::from_millis)
    }
}

//! Game state: player offset, the single apple, and the score

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::{GameConfig, Rect};

/// Monotonic apple counter with its display label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    count: u32,
    saturation_threshold: u32,
}

impl ScoreBoard {
    pub fn new(saturation_threshold: u32) -> Self {
        Self {
            count: 0,
            saturation_threshold,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Add one catch and return the new count
    pub fn increment(&mut self) -> u32 {
        self.count = self.count.saturating_add(1);
        self.count
    }

    /// Whether the label has switched to the "that's enough" message.
    /// Counting carries on regardless.
    pub fn is_saturated(&self) -> bool {
        self.count >= self.saturation_threshold
    }

    pub fn label(&self) -> String {
        if self.is_saturated() {
            format!("{} apples!! That's enough, isn't it?", self.count)
        } else {
            format!("{} space apples", self.count)
        }
    }
}

/// An eased move of the player towards `offset`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Identifies the move; a newer step makes older generations stale
    pub generation: u64,
    /// Player offset the move ends at
    pub offset: f64,
    /// Player rect the move ends at
    pub player: Rect,
    pub duration: Duration,
}

/// An apple caught at the end of a move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Catch {
    pub target: Rect,
    pub score: u32,
}

/// Point-in-time view of the game
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub offset: f64,
    pub player: Rect,
    pub target: Option<Rect>,
    pub score: u32,
    pub label: String,
}

/// Game state owned by the game loop
#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    /// Horizontal offset of the player's centre from the play-area centre.
    /// Never clamped.
    offset: f64,
    target: Option<Rect>,
    score: ScoreBoard,
    generation: u64,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        Self {
            score: ScoreBoard::new(config.saturation_threshold),
            config,
            offset: 0.0,
            target: None,
            generation: 0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Place the player directly (no transition)
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    pub fn target(&self) -> Option<Rect> {
        self.target
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    /// Player bounding box at the current offset
    pub fn player_rect(&self) -> Rect {
        let c = &self.config;
        Rect::new(
            c.play_width / 2.0 + self.offset - c.player_width / 2.0,
            c.play_height + c.player_overhang - c.player_height,
            c.player_width,
            c.player_height,
        )
    }

    /// Spawner tick: drop an apple at a uniformly random x if none is live
    pub fn spawn<R: Rng>(&mut self, rng: &mut R) -> Option<Rect> {
        if self.target.is_some() {
            return None;
        }
        let x = rng.gen_range(0.0..=self.config.play_width);
        self.spawn_at(x)
    }

    /// Drop an apple with its left edge at `x`, unless one is already live
    pub fn spawn_at(&mut self, x: f64) -> Option<Rect> {
        if self.target.is_some() {
            return None;
        }
        let c = &self.config;
        let target = Rect::new(
            x,
            c.play_height - c.target_lift,
            c.target_width,
            c.target_height,
        );
        debug!("Apple spawned at x={:.1}", x);
        self.target = Some(target);
        Some(target)
    }

    /// Stepper tick: move by `-slope * gain` and start a transition.
    ///
    /// Starting a transition interrupts any still pending.
    pub fn step(&mut self, slope: f64) -> Transition {
        let delta = slope * self.config.gain;
        if delta.is_finite() {
            self.offset -= delta;
        }
        self.generation += 1;

        Transition {
            generation: self.generation,
            offset: self.offset,
            player: self.player_rect(),
            duration: self.config.transition(),
        }
    }

    /// Transition finished: score if the player now overlaps the apple.
    ///
    /// Completions of interrupted transitions are ignored, so a burst of
    /// steps can skip collision checks.
    pub fn complete(&mut self, generation: u64) -> Option<Catch> {
        if generation != self.generation {
            debug!(
                "Transition {} interrupted by {}, skipping collision check",
                generation, self.generation
            );
            return None;
        }

        let target = self.target?;
        if !target.intersects(&self.player_rect()) {
            return None;
        }

        self.target = None;
        let score = self.score.increment();
        info!("Apple caught, score {}", score);
        Some(Catch { target, score })
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            offset: self.offset,
            player: self.player_rect(),
            target: self.target,
            score: self.score.count(),
            label: self.score.label(),
        }
    }
}

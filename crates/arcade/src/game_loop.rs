//! Timer-driven game loop

use face_signals::Signals;
use rand::Rng;
use std::future::Future;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::scene::{character_eye_height, starfield};
use crate::{ArcadeError, Game, GameConfig, GameSnapshot, Presenter};

/// Owns the game and runs its two timers on one task.
///
/// The spawner drops an apple whenever none is live; the stepper reads the
/// latest tilt slope, moves the player and schedules a collision check for
/// when the eased move finishes. All state changes happen on the loop task.
pub struct GameLoop<P, R> {
    game: Game,
    presenter: P,
    rng: R,
    signals: watch::Receiver<Signals>,
}

impl<P, R> GameLoop<P, R>
where
    P: Presenter,
    R: Rng + Send,
{
    pub fn new(
        config: GameConfig,
        signals: watch::Receiver<Signals>,
        presenter: P,
        rng: R,
    ) -> Result<Self, ArcadeError> {
        config.validate()?;
        Ok(Self {
            game: Game::new(config),
            presenter,
            rng,
            signals,
        })
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Run both timers until `shutdown` resolves, then report the final state
    pub async fn run_until<F>(mut self, shutdown: F) -> GameSnapshot
    where
        F: Future<Output = ()>,
    {
        let config = self.game.config().clone();
        info!(
            "Starting game loop (spawn every {}ms, step every {}ms, gain {})",
            config.spawn_period_ms, config.step_period_ms, config.gain
        );

        self.presenter
            .scene_ready(&starfield(config.play_width, config.play_height));

        let start = Instant::now();
        let mut spawn_tick = interval_at(start + config.spawn_period(), config.spawn_period());
        spawn_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut step_tick = interval_at(start + config.step_period(), config.step_period());
        step_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<u64>();
        let mut signals_open = true;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = spawn_tick.tick() => self.on_spawn_tick(),
                _ = step_tick.tick() => self.on_step_tick(&done_tx),
                Some(generation) = done_rx.recv() => self.on_transition_done(generation),
                changed = self.signals.changed(), if signals_open => match changed {
                    Ok(()) => self.on_signals_changed(),
                    Err(_) => {
                        debug!("Signal publisher gone, keeping last values");
                        signals_open = false;
                    }
                },
            }
        }

        let snapshot = self.game.snapshot();
        info!(
            "Game loop stopped: {} (offset {:.1})",
            snapshot.label, snapshot.offset
        );
        snapshot
    }

    fn on_spawn_tick(&mut self) {
        if let Some(target) = self.game.spawn(&mut self.rng) {
            self.presenter.target_spawned(target);
        }
    }

    fn on_step_tick(&mut self, done: &mpsc::UnboundedSender<u64>) {
        // Stale reads are fine; the extractor publishes on its own schedule.
        let slope = self.signals.borrow().tilt_slope;
        let transition = self.game.step(slope);
        self.presenter
            .player_moved(transition.player, transition.duration);

        let done = done.clone();
        tokio::spawn(async move {
            tokio::time::sleep(transition.duration).await;
            let _ = done.send(transition.generation);
        });
    }

    fn on_transition_done(&mut self, generation: u64) {
        if let Some(catch) = self.game.complete(generation) {
            self.presenter.target_removed(catch.target);
            self.presenter.score_changed(&self.game.score().label());
        }
    }

    fn on_signals_changed(&mut self) {
        let eye_gap = self.signals.borrow_and_update().eye_gap;
        self.presenter.eyes_resized(character_eye_height(eye_gap));
    }
}

//! Presentation seam: fire-and-forget view mutations

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

use crate::{Rect, Slide, Star};

/// Receives view mutations from onboarding and the game loop.
///
/// Calls are imperative and unacknowledged; an implementation renders them
/// however it likes.
pub trait Presenter: Send {
    fn show_slide(&mut self, index: usize, slide: &Slide);

    fn scene_ready(&mut self, stars: &[Star]);

    /// Animate the player to `player` over `duration`
    fn player_moved(&mut self, player: Rect, duration: Duration);

    fn target_spawned(&mut self, target: Rect);

    fn target_removed(&mut self, target: Rect);

    fn score_changed(&mut self, label: &str);

    fn eyes_resized(&mut self, eye_height: f64);
}

/// Logs every mutation; used when there is no screen to draw on
#[derive(Debug, Default)]
pub struct TracingPresenter;

impl Presenter for TracingPresenter {
    fn show_slide(&mut self, index: usize, slide: &Slide) {
        info!("[slide {}] {} [{}]", index + 1, slide.text, slide.button);
    }

    fn scene_ready(&mut self, stars: &[Star]) {
        info!("Scene ready with {} stars", stars.len());
    }

    fn player_moved(&mut self, player: Rect, duration: Duration) {
        debug!(
            "Player -> x={:.1} over {}ms",
            player.x,
            duration.as_millis()
        );
    }

    fn target_spawned(&mut self, target: Rect) {
        info!("Apple falling at x={:.1}", target.x);
    }

    fn target_removed(&mut self, target: Rect) {
        debug!("Apple at x={:.1} removed", target.x);
    }

    fn score_changed(&mut self, label: &str) {
        info!("Score: {}", label);
    }

    fn eyes_resized(&mut self, eye_height: f64) {
        debug!("Eye height {:.1}", eye_height);
    }
}

/// A recorded presenter call
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterEvent {
    Slide { index: usize, button: String },
    Scene { stars: usize },
    PlayerMoved { x: f64, duration: Duration },
    TargetSpawned(Rect),
    TargetRemoved(Rect),
    Score(String),
    Eyes(f64),
}

/// Keeps every call in a shared log. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    events: Arc<Mutex<Vec<PresenterEvent>>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PresenterEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn push(&self, event: PresenterEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

impl Presenter for RecordingPresenter {
    fn show_slide(&mut self, index: usize, slide: &Slide) {
        self.push(PresenterEvent::Slide {
            index,
            button: slide.button.clone(),
        });
    }

    fn scene_ready(&mut self, stars: &[Star]) {
        self.push(PresenterEvent::Scene { stars: stars.len() });
    }

    fn player_moved(&mut self, player: Rect, duration: Duration) {
        self.push(PresenterEvent::PlayerMoved {
            x: player.x,
            duration,
        });
    }

    fn target_spawned(&mut self, target: Rect) {
        self.push(PresenterEvent::TargetSpawned(target));
    }

    fn target_removed(&mut self, target: Rect) {
        self.push(PresenterEvent::TargetRemoved(target));
    }

    fn score_changed(&mut self, label: &str) {
        self.push(PresenterEvent::Score(label.to_string()));
    }

    fn eyes_resized(&mut self, eye_height: f64) {
        self.push(PresenterEvent::Eyes(eye_height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_clones_share_log() {
        let recorder = RecordingPresenter::new();
        let mut handle = recorder.clone();

        handle.score_changed("1 space apples");
        handle.target_spawned(Rect::new(1.0, 2.0, 3.0, 4.0));

        assert_eq!(
            recorder.events(),
            vec![
                PresenterEvent::Score("1 space apples".into()),
                PresenterEvent::TargetSpawned(Rect::new(1.0, 2.0, 3.0, 4.0)),
            ]
        );
    }
}

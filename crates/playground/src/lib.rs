//! Space Apples Playground
//!
//! Wires the pieces together: onboarding slides, frame capture, throttled
//! signal extraction and the game loop.

pub mod config;

pub use crate::config::{OnboardingConfig, PlaygroundConfig};

use arcade::{ArcadeError, GameLoop, GameSnapshot, Onboarding, Presenter, TracingPresenter};
use camera_capture::{open_source, CameraError, CaptureService, VideoFrame};
use face_signals::{LandmarkEstimator, MockEstimator, SignalError, SignalExtractor};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Playground error types
#[derive(Error, Debug)]
pub enum PlaygroundError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Signal error: {0}")]
    Signals(#[from] SignalError),

    #[error("Game error: {0}")]
    Arcade(#[from] ArcadeError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Frame and estimator counts from the extractor task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionStats {
    pub frames_seen: u64,
    pub estimator_calls: u64,
}

/// Outcome of one game session
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub game: GameSnapshot,
    /// `None` when capture never started
    pub extraction: Option<ExtractionStats>,
}

/// Initialize logging
pub fn init_logging(level: &str) -> Result<(), PlaygroundError> {
    let level: Level = level
        .parse()
        .map_err(|_| PlaygroundError::Logging(format!("unknown log level {:?}", level)))?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| PlaygroundError::Logging(e.to_string()))
}

/// Show every slide, pressing its button after `delay`
pub async fn play_onboarding<P: Presenter>(
    onboarding: &mut Onboarding,
    presenter: &mut P,
    delay: Duration,
) {
    while let Some(slide) = onboarding.current() {
        presenter.show_slide(onboarding.index(), slide);
        tokio::time::sleep(delay).await;
        onboarding.advance();
    }
    info!("Onboarding finished, starting game");
}

/// Run a game session.
///
/// `frames` is `None` when no camera could be opened: the game still runs
/// but the player never responds to head movement.
pub async fn run_game<E, P, F>(
    config: &PlaygroundConfig,
    frames: Option<mpsc::Receiver<VideoFrame>>,
    estimator: E,
    presenter: P,
    shutdown: F,
) -> Result<RunSummary, PlaygroundError>
where
    E: LandmarkEstimator + 'static,
    P: Presenter,
    F: Future<Output = ()>,
{
    let (extractor, signals) = SignalExtractor::new(estimator, config.signals.clone())?;

    let extractor_task = match frames {
        Some(frames) => Some(extractor.spawn(frames)),
        None => {
            warn!("No frames available; the player will not respond to head movement");
            None
        }
    };

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let game_loop = GameLoop::new(config.game.clone(), signals, presenter, rng)?;
    let game = game_loop.run_until(shutdown).await;

    // The loop dropped its signal receiver, so the extractor exits on its
    // next frame or when capture closes the channel.
    let extraction = match extractor_task {
        Some(task) => {
            let extractor = task.await?;
            Some(ExtractionStats {
                frames_seen: extractor.frames_seen(),
                estimator_calls: extractor.estimator_calls(),
            })
        }
        None => None,
    };

    Ok(RunSummary { game, extraction })
}

/// Resolve after `run_for`, or on Ctrl-C
pub async fn shutdown_signal(run_for: Option<Duration>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Ctrl-C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    match run_for {
        Some(limit) => {
            tokio::select! {
                _ = tokio::time::sleep(limit) => info!("Run time of {}ms elapsed", limit.as_millis()),
                _ = ctrl_c => info!("Interrupted"),
            }
        }
        None => ctrl_c.await,
    }
}

/// Full playground: onboarding, then capture and game until shutdown
pub async fn run(config: PlaygroundConfig) -> Result<RunSummary, PlaygroundError> {
    let mut presenter = TracingPresenter;

    let mut onboarding = match &config.onboarding.slides {
        Some(slides) => Onboarding::new(slides.clone()),
        None => Onboarding::default(),
    };
    play_onboarding(&mut onboarding, &mut presenter, config.onboarding.auto_advance()).await;

    let frames = match open_source(&config.camera)
        .and_then(|source| CaptureService::spawn(source, &config.camera))
    {
        Ok(capture) => Some(capture.into_receiver()),
        Err(e) => {
            warn!("Capture did not start: {}", e);
            None
        }
    };

    run_game(
        &config,
        frames,
        MockEstimator::default(),
        presenter,
        shutdown_signal(config.run_for()),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade::{PresenterEvent, RecordingPresenter};
    use face_signals::{EyeLandmarks, FaceObservation, Point2};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn level_eye(corner_x: f64) -> EyeLandmarks {
        let mut points = vec![Point2::new(corner_x, 0.5); 8];
        points[2] = Point2::new(corner_x, 0.52);
        points[5] = Point2::new(corner_x, 0.48);
        EyeLandmarks::new(points)
    }

    /// Estimator returning `faces` on every call, counting calls
    fn counting_estimator(
        faces: Vec<FaceObservation>,
        calls: Arc<AtomicU64>,
    ) -> impl FnMut(&VideoFrame) -> Result<Vec<FaceObservation>, SignalError> + Send + 'static {
        move |_: &VideoFrame| -> Result<Vec<FaceObservation>, SignalError> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(faces.clone())
        }
    }

    /// Closed channel holding `count` frames
    async fn frames(count: u32) -> mpsc::Receiver<VideoFrame> {
        let (tx, rx) = mpsc::channel(count.max(1) as usize);
        for seq in 0..count {
            tx.send(VideoFrame::blank(4, 4, seq)).await.unwrap();
        }
        rx
    }

    fn after(ms: u64) -> tokio::time::Sleep {
        tokio::time::sleep(Duration::from_millis(ms))
    }

    #[tokio::test(start_paused = true)]
    async fn test_level_face_keeps_player_still() {
        let calls = Arc::new(AtomicU64::new(0));
        let face = FaceObservation::new(level_eye(0.35), level_eye(0.65));
        let estimator = counting_estimator(vec![face], calls.clone());

        let summary = run_game(
            &PlaygroundConfig::default(),
            Some(frames(25).await),
            estimator,
            RecordingPresenter::new(),
            after(1000),
        )
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(
            summary.extraction,
            Some(ExtractionStats {
                frames_seen: 25,
                estimator_calls: 5,
            })
        );
        assert_eq!(summary.game.offset, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_face_never_moves_player() {
        let calls = Arc::new(AtomicU64::new(0));
        let estimator = counting_estimator(Vec::new(), calls.clone());
        let presenter = RecordingPresenter::new();

        let summary = run_game(
            &PlaygroundConfig::default(),
            Some(frames(100).await),
            estimator,
            presenter.clone(),
            after(3000),
        )
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 20);
        assert_eq!(summary.game.offset, 0.0);
        assert!(presenter
            .events()
            .iter()
            .all(|e| !matches!(e, PresenterEvent::Eyes(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_camera_game_still_runs() {
        let calls = Arc::new(AtomicU64::new(0));
        let presenter = RecordingPresenter::new();

        let summary = run_game(
            &PlaygroundConfig {
                seed: Some(3),
                ..Default::default()
            },
            None,
            counting_estimator(Vec::new(), calls.clone()),
            presenter.clone(),
            after(1500),
        )
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(summary.extraction.is_none());
        assert_eq!(summary.game.offset, 0.0);
        assert!(presenter
            .events()
            .iter()
            .any(|e| matches!(e, PresenterEvent::TargetSpawned(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_onboarding_shows_every_slide() {
        let mut onboarding = Onboarding::default();
        let mut presenter = RecordingPresenter::new();

        play_onboarding(&mut onboarding, &mut presenter, Duration::from_millis(1500)).await;

        let slides: Vec<_> = presenter
            .events()
            .into_iter()
            .filter_map(|e| match e {
                PresenterEvent::Slide { index, button } => Some((index, button)),
                _ => None,
            })
            .collect();
        assert_eq!(slides.len(), 5);
        assert_eq!(slides[4], (4, "Start game!".to_string()));
        assert!(onboarding.is_finished());
    }

    #[test]
    fn test_slow_estimator_leaves_timers_running() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();

        let config = PlaygroundConfig {
            signals: face_signals::SignalConfig {
                throttle_every: 1,
                ..Default::default()
            },
            seed: Some(1),
            ..Default::default()
        };
        let estimator = |_: &VideoFrame| -> Result<Vec<FaceObservation>, SignalError> {
            std::thread::sleep(Duration::from_millis(180));
            Ok(Vec::new())
        };
        let presenter = RecordingPresenter::new();

        // Enough queued work to keep the estimator busy past shutdown
        let (tx, rx) = mpsc::channel(8);
        for seq in 0..8 {
            tx.try_send(VideoFrame::blank(4, 4, seq)).unwrap();
        }

        let started = std::time::Instant::now();
        let summary = runtime
            .block_on(async {
                run_game(
                    &config,
                    Some(rx),
                    estimator,
                    presenter.clone(),
                    tokio::time::sleep(Duration::from_millis(1050)),
                )
                .await
            })
            .unwrap();
        let elapsed = started.elapsed();
        drop(tx);

        let steps = presenter
            .events()
            .iter()
            .filter(|e| matches!(e, PresenterEvent::PlayerMoved { .. }))
            .count();
        assert!(steps >= 3, "only {} stepper ticks", steps);
        assert!(elapsed < Duration::from_millis(1600), "session took {:?}", elapsed);

        // Stopped at the first frame after the game loop went away
        let stats = summary.extraction.unwrap();
        assert!(stats.frames_seen < 8);
    }

    #[test]
    fn test_unknown_log_level() {
        assert!(matches!(
            init_logging("chatty"),
            Err(PlaygroundError::Logging(_))
        ));
    }
}

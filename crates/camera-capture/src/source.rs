//! Frame sources and the background capture service

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbImage;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, warn};

use crate::{CameraConfig, CameraError, VideoFrame};

/// Blocking producer of video frames.
///
/// `Ok(None)` ends the stream. Errors are per-frame; the capture loop logs
/// them and asks again on the next tick.
pub trait FrameSource: Send + 'static {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError>;
}

impl FrameSource for Box<dyn FrameSource> {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError> {
        (**self).next_frame()
    }
}

/// Pick the source a camera config describes: the still image if one is
/// set, otherwise synthetic frames
pub fn open_source(config: &CameraConfig) -> Result<Box<dyn FrameSource>, CameraError> {
    match &config.image_path {
        Some(path) => Ok(Box::new(StillImageSource::open(path)?)),
        None => Ok(Box::new(SyntheticSource::new(config.width, config.height))),
    }
}

/// Endless black frames, used when no camera is attached
pub struct SyntheticSource {
    width: u32,
    height: u32,
    sequence: u32,
    started: Instant,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            sequence: 0,
            started: Instant::now(),
        }
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError> {
        let mut frame = VideoFrame::blank(self.width, self.height, self.sequence);
        frame.timestamp_ns = self.started.elapsed().as_nanos() as u64;
        self.sequence = self.sequence.wrapping_add(1);
        Ok(Some(frame))
    }
}

/// Replays one decoded image as a live stream
pub struct StillImageSource {
    image: RgbImage,
    sequence: u32,
    started: Instant,
}

impl StillImageSource {
    /// Decode the image at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CameraError> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| CameraError::Open(format!("{}: {}", path.display(), e)))?
            .to_rgb8();

        info!(
            "Replaying still image {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );

        Ok(Self::from_image(image))
    }

    pub fn from_image(image: RgbImage) -> Self {
        Self {
            image,
            sequence: 0,
            started: Instant::now(),
        }
    }
}

impl FrameSource for StillImageSource {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError> {
        let ts = self.started.elapsed().as_nanos() as u64;
        let frame = VideoFrame::from_rgb_image(&self.image, ts, self.sequence);
        self.sequence = self.sequence.wrapping_add(1);
        Ok(Some(frame))
    }
}

/// Paced capture thread feeding a tokio channel
pub struct CaptureService {
    receiver: mpsc::Receiver<VideoFrame>,
    running: Arc<AtomicBool>,
}

impl CaptureService {
    /// Spawn the capture thread for `source` at the configured rate
    pub fn spawn<S: FrameSource>(mut source: S, config: &CameraConfig) -> Result<Self, CameraError> {
        config.validate()?;

        let (tx, rx) = mpsc::channel::<VideoFrame>(config.channel_capacity);
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let interval = Duration::from_micros(1_000_000 / config.fps as u64);

        info!(
            "Starting capture at {} fps (buffer {} frames)",
            config.fps, config.channel_capacity
        );

        std::thread::Builder::new()
            .name("frame-capture".into())
            .spawn(move || {
                while running_clone.load(Ordering::SeqCst) {
                    match source.next_frame() {
                        Ok(Some(frame)) => match tx.try_send(frame) {
                            Ok(()) => {}
                            Err(TrySendError::Full(frame)) => {
                                debug!("Consumer busy, dropping frame {}", frame.sequence);
                            }
                            Err(TrySendError::Closed(_)) => {
                                debug!("Frame receiver dropped");
                                break;
                            }
                        },
                        Ok(None) => {
                            info!("Frame source exhausted");
                            break;
                        }
                        Err(e) => {
                            warn!("Frame read error: {}", e);
                        }
                    }
                    std::thread::sleep(interval);
                }
                running_clone.store(false, Ordering::SeqCst);
            })
            .map_err(|e| {
                error!("Failed to spawn capture thread: {}", e);
                CameraError::Open(e.to_string())
            })?;

        Ok(Self {
            receiver: rx,
            running,
        })
    }

    /// Receive next frame
    pub async fn next(&mut self) -> Option<VideoFrame> {
        self.receiver.recv().await
    }

    /// Ask the capture thread to exit after its current frame
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Whether the capture thread is still producing
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Hand the frame channel to a consumer task.
    ///
    /// The capture thread exits once the returned receiver is dropped.
    pub fn into_receiver(self) -> mpsc::Receiver<VideoFrame> {
        self.receiver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    struct CountedSource {
        remaining: u32,
        sequence: u32,
    }

    impl FrameSource for CountedSource {
        fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError> {
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            self.sequence += 1;
            Ok(Some(VideoFrame::blank(2, 2, self.sequence)))
        }
    }

    struct FlakySource {
        calls: u32,
    }

    impl FrameSource for FlakySource {
        fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError> {
            self.calls += 1;
            match self.calls {
                1 => Err(CameraError::Read("sensor glitch".into())),
                2 => Ok(Some(VideoFrame::blank(2, 2, 2))),
                _ => Ok(None),
            }
        }
    }

    /// Endless frames, counting every poll
    struct PolledSource {
        polls: Arc<AtomicU32>,
    }

    impl FrameSource for PolledSource {
        fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError> {
            let n = self.polls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(VideoFrame::blank(2, 2, n)))
        }
    }

    fn fast_config() -> CameraConfig {
        CameraConfig {
            width: 2,
            height: 2,
            fps: 1000,
            channel_capacity: 8,
            image_path: None,
        }
    }

    #[test]
    fn test_synthetic_source_sequences() {
        let mut source = SyntheticSource::new(8, 6);
        let first = source.next_frame().unwrap().unwrap();
        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(first.sequence, 0);
        assert_eq!(second.sequence, 1);
        assert_eq!((second.width, second.height), (8, 6));
    }

    #[test]
    fn test_still_image_source_repeats() {
        let mut img = RgbImage::new(3, 1);
        img.put_pixel(2, 0, image::Rgb([200, 100, 50]));
        let mut source = StillImageSource::from_image(img);

        for expected in 0..3 {
            let frame = source.next_frame().unwrap().unwrap();
            assert_eq!(frame.sequence, expected);
            assert_eq!(frame.get_pixel(2, 0), Some([200, 100, 50]));
        }
    }

    #[test]
    fn test_still_image_missing_file() {
        let result = StillImageSource::open("/definitely/not/here.png");
        assert!(matches!(result, Err(CameraError::Open(_))));
    }

    #[tokio::test]
    async fn test_service_delivers_then_closes() {
        let source = CountedSource {
            remaining: 3,
            sequence: 0,
        };
        let mut service = CaptureService::spawn(source, &fast_config()).unwrap();

        let mut sequences = Vec::new();
        while let Some(frame) = service.next().await {
            sequences.push(frame.sequence);
        }
        assert_eq!(sequences, vec![1, 2, 3]);
        assert!(!service.is_running());
    }

    #[tokio::test]
    async fn test_service_skips_read_errors() {
        let mut service = CaptureService::spawn(FlakySource { calls: 0 }, &fast_config()).unwrap();

        let frame = service.next().await.expect("frame after glitch");
        assert_eq!(frame.sequence, 2);
        assert!(service.next().await.is_none());
    }

    #[tokio::test]
    async fn test_full_channel_drops_frames() {
        let source = CountedSource {
            remaining: 40,
            sequence: 0,
        };
        let config = CameraConfig {
            channel_capacity: 1,
            ..fast_config()
        };
        let mut service = CaptureService::spawn(source, &config).unwrap();

        // Let the source run dry while nobody reads
        while service.is_running() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let mut sequences = Vec::new();
        while let Some(frame) = service.next().await {
            sequences.push(frame.sequence);
        }
        assert_eq!(sequences, vec![1]);
    }

    #[tokio::test]
    async fn test_dropped_receiver_stops_capture() {
        let polls = Arc::new(AtomicU32::new(0));
        let source = PolledSource {
            polls: polls.clone(),
        };
        let mut service = CaptureService::spawn(source, &fast_config()).unwrap();
        assert!(service.next().await.is_some());

        drop(service.into_receiver());
        tokio::time::sleep(Duration::from_millis(50)).await;
        let settled = polls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(polls.load(Ordering::SeqCst), settled);
    }

    #[test]
    fn test_open_source_prefers_image() {
        let synthetic = open_source(&CameraConfig::front());
        assert!(synthetic.is_ok());

        let config = CameraConfig {
            image_path: Some("/definitely/not/here.png".into()),
            ..CameraConfig::front()
        };
        assert!(matches!(open_source(&config), Err(CameraError::Open(_))));
    }

    #[test]
    fn test_boxed_source() {
        let mut source: Box<dyn FrameSource> = Box::new(SyntheticSource::new(3, 3));
        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame.width, 3);
    }

    #[test]
    fn test_spawn_rejects_invalid_config() {
        let config = CameraConfig {
            channel_capacity: 0,
            ..fast_config()
        };
        let result = CaptureService::spawn(SyntheticSource::new(2, 2), &config);
        assert!(matches!(result, Err(CameraError::Config(_))));
    }
}

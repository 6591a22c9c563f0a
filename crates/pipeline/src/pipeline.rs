//! The caption pipeline state machine.
//!
//! Two independent schedules meet here: the capture source pushes raw
//! frames through [`CaptionPipeline::submit_frame`] at camera rate, and the
//! settings poller publishes overlay snapshots at its own 1 Hz cadence.
//! They share only the [`OverlayCell`]; the frame path never waits on the
//! settings path.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use cap_channel::{ChannelError, SettingsPoller, SettingsTransport, SettingsWatcher};
use cap_common::cell::OverlayCell;
use cap_common::config::PipelineConfig;
use cap_common::frame::RawFrame;
use cap_common::render::RenderOverlay;
use cap_common::settings::Settings;
use cap_compositor::Compositor;

use crate::sink::OutputSink;

/// Pipeline lifecycle state. A stopped pipeline can be started again.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PipelineState {
    /// Constructed; no polling, no frame intake.
    Idle,
    /// Frames are composited and delivered as they arrive.
    Running,
    /// Polling cancelled, frame intake closed.
    Stopped,
}

/// Pipeline errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Settings channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// The live compositing pipeline.
///
/// `start()`/`stop()` are the only external control surface. Frame
/// delivery happens through [`Self::submit_frame`], callable from the
/// capture callback thread while start/stop run elsewhere.
pub struct CaptionPipeline {
    config: PipelineConfig,
    cell: Arc<OverlayCell>,
    compositor: Compositor,
    sink: Arc<dyn OutputSink>,
    poller: Option<SettingsPoller>,
    state: PipelineState,
    /// Frame intake gate, cleared before poller shutdown so no frame is
    /// accepted after `stop()` returns.
    accepting: Arc<AtomicBool>,
    frames_in: AtomicU64,
    frames_out: AtomicU64,
}

impl CaptionPipeline {
    pub fn new(config: PipelineConfig, sink: Arc<dyn OutputSink>) -> Self {
        Self {
            config,
            cell: Arc::new(OverlayCell::new(Settings::default())),
            compositor: Compositor::new(),
            sink,
            poller: None,
            state: PipelineState::Idle,
            accepting: Arc::new(AtomicBool::new(false)),
            frames_in: AtomicU64::new(0),
            frames_out: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Frames accepted through [`Self::submit_frame`] so far.
    ///
    /// A caller can watch this to surface a "no frames arriving" condition;
    /// recovering the capture source is the source's concern, not ours.
    pub fn frames_in(&self) -> u64 {
        self.frames_in.load(Ordering::Relaxed)
    }

    /// Frames successfully composited and delivered to the sink.
    pub fn frames_out(&self) -> u64 {
        self.frames_out.load(Ordering::Relaxed)
    }

    /// Begin settings polling (immediate first poll, then the configured
    /// interval) and open frame intake. No-op when already running.
    pub fn start(
        &mut self,
        transport: Box<dyn SettingsTransport>,
        renderer: Box<dyn RenderOverlay>,
    ) -> Result<(), PipelineError> {
        if self.state == PipelineState::Running {
            debug!("start() while running, ignoring");
            return Ok(());
        }

        let initial = self.cell.load().settings;
        let watcher = SettingsWatcher::new(transport, renderer, self.cell.clone(), initial);
        self.poller = Some(SettingsPoller::spawn(watcher, self.config.poll_interval)?);

        self.accepting.store(true, Ordering::Release);
        self.state = PipelineState::Running;
        info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            canvas = %self.config.canvas,
            "Pipeline started"
        );
        Ok(())
    }

    /// Composite and deliver one camera frame.
    ///
    /// Never blocks on the settings path: the overlay snapshot is a cheap
    /// atomic load and compositing runs lock-free on this thread. A frame
    /// that cannot be converted is dropped with a warning; the next frame
    /// is processed as normal (live video tolerates drops better than
    /// added latency, so there is no retry or queueing layer).
    pub fn submit_frame(&self, frame: RawFrame) {
        if !self.accepting.load(Ordering::Acquire) {
            debug!(pts = %frame.pts, "Frame intake closed, dropping frame");
            return;
        }
        self.frames_in.fetch_add(1, Ordering::Relaxed);

        let snapshot = self.cell.load();
        match self.compositor.compose(
            &frame,
            snapshot.overlay.as_deref(),
            snapshot.settings.enable_camera,
        ) {
            Ok(composited) => {
                self.frames_out.fetch_add(1, Ordering::Relaxed);
                self.sink.deliver(composited);
            }
            Err(e) => {
                warn!(error = %e, pts = %frame.pts, "Dropping frame that failed to composite");
            }
        }
    }

    /// Cancel polling and close frame intake. Idempotent.
    ///
    /// The intake gate closes before the poller is joined, so no frame is
    /// accepted after this returns; an in-flight `submit_frame` that
    /// already passed the gate finishes on its own thread (best-effort
    /// drain, not a synchronization barrier).
    pub fn stop(&mut self) {
        if self.state != PipelineState::Running {
            return;
        }
        self.accepting.store(false, Ordering::Release);
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
        }
        self.state = PipelineState::Stopped;
        info!(
            frames_in = self.frames_in(),
            frames_out = self.frames_out(),
            "Pipeline stopped"
        );
    }
}

impl Drop for CaptionPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use cap_channel::MemoryTransport;
    use cap_common::color::PixelFormat;
    use cap_common::error::RenderError;
    use cap_common::frame::{CompositedFrame, OverlayImage};
    use cap_common::types::{Resolution, TimeCode};

    struct NullRenderer;

    impl RenderOverlay for NullRenderer {
        fn render(&self, _settings: &Settings) -> Result<OverlayImage, RenderError> {
            Ok(OverlayImage::transparent(Resolution::new(1, 1)))
        }
    }

    fn counting_sink() -> (Arc<dyn OutputSink>, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let sink: Arc<dyn OutputSink> = Arc::new(move |_f: CompositedFrame| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (sink, count)
    }

    fn frame() -> RawFrame {
        let res = Resolution::new(2, 2);
        RawFrame {
            data: vec![0u8; res.rgba_byte_size()],
            resolution: res,
            format: PixelFormat::Bgra8,
            pts: TimeCode::ZERO,
        }
    }

    #[test]
    fn idle_pipeline_drops_frames() {
        let (sink, count) = counting_sink();
        let pipeline = CaptionPipeline::new(PipelineConfig::default(), sink);
        assert_eq!(pipeline.state(), PipelineState::Idle);

        pipeline.submit_frame(frame());
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(pipeline.frames_in(), 0);
    }

    #[test]
    fn running_pipeline_delivers_frames() {
        let (sink, count) = counting_sink();
        let mut pipeline = CaptionPipeline::new(PipelineConfig::default(), sink);
        pipeline
            .start(Box::new(MemoryTransport::new()), Box::new(NullRenderer))
            .unwrap();
        assert_eq!(pipeline.state(), PipelineState::Running);

        pipeline.submit_frame(frame());
        pipeline.submit_frame(frame());
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(pipeline.frames_in(), 2);
        assert_eq!(pipeline.frames_out(), 2);
    }

    #[test]
    fn bad_frame_is_dropped_but_pipeline_continues() {
        let (sink, count) = counting_sink();
        let mut pipeline = CaptionPipeline::new(PipelineConfig::default(), sink);
        pipeline
            .start(Box::new(MemoryTransport::new()), Box::new(NullRenderer))
            .unwrap();

        let mut bad = frame();
        bad.data.truncate(2); // too small for the declared resolution
        pipeline.submit_frame(bad);
        pipeline.submit_frame(frame());

        assert_eq!(pipeline.frames_in(), 2);
        assert_eq!(pipeline.frames_out(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_is_idempotent_and_closes_intake() {
        let (sink, count) = counting_sink();
        let mut pipeline = CaptionPipeline::new(PipelineConfig::default(), sink);
        pipeline
            .start(Box::new(MemoryTransport::new()), Box::new(NullRenderer))
            .unwrap();

        pipeline.stop();
        assert_eq!(pipeline.state(), PipelineState::Stopped);
        pipeline.stop();
        assert_eq!(pipeline.state(), PipelineState::Stopped);

        pipeline.submit_frame(frame());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn start_while_running_is_a_noop() {
        let (sink, _) = counting_sink();
        let mut pipeline = CaptionPipeline::new(PipelineConfig::default(), sink);
        pipeline
            .start(Box::new(MemoryTransport::new()), Box::new(NullRenderer))
            .unwrap();
        pipeline
            .start(Box::new(MemoryTransport::new()), Box::new(NullRenderer))
            .unwrap();
        assert_eq!(pipeline.state(), PipelineState::Running);
    }

    #[test]
    fn restart_after_stop_is_allowed() {
        let (sink, count) = counting_sink();
        let mut pipeline = CaptionPipeline::new(PipelineConfig::default(), sink);
        pipeline
            .start(Box::new(MemoryTransport::new()), Box::new(NullRenderer))
            .unwrap();
        pipeline.stop();
        pipeline
            .start(Box::new(MemoryTransport::new()), Box::new(NullRenderer))
            .unwrap();
        assert_eq!(pipeline.state(), PipelineState::Running);

        pipeline.submit_frame(frame());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}

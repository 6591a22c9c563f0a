//! The settings poll loop.
//!
//! [`SettingsWatcher`] is the pure polling step (read, decode, compare,
//! render, publish) so its behavior is testable without threads.
//! [`SettingsPoller`] drives a watcher on a named worker thread: an
//! immediate first poll, then a fixed `tick` cadence, until `stop()` (or
//! drop) shuts it down. Stopping cancels the ticker for good; no poll
//! fires after `stop()` returns.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Sender};
use crossbeam::select;
use tracing::{debug, info, warn};

use cap_common::cell::{OverlayCell, OverlaySnapshot};
use cap_common::render::RenderOverlay;
use cap_common::settings::Settings;

use crate::error::ChannelError;
use crate::transport::SettingsTransport;

/// One poll step over a transport, with the active settings held between
/// polls for value-equality deduplication.
pub struct SettingsWatcher {
    transport: Box<dyn SettingsTransport>,
    renderer: Box<dyn RenderOverlay>,
    cell: Arc<OverlayCell>,
    active: Settings,
}

impl SettingsWatcher {
    pub fn new(
        transport: Box<dyn SettingsTransport>,
        renderer: Box<dyn RenderOverlay>,
        cell: Arc<OverlayCell>,
        initial: Settings,
    ) -> Self {
        Self {
            transport,
            renderer,
            cell,
            active: initial,
        }
    }

    /// The currently active settings value.
    pub fn active(&self) -> &Settings {
        &self.active
    }

    /// Execute one poll: read the latest payload, decode it, and re-render
    /// the overlay if the candidate differs from the active settings.
    ///
    /// Every failure degrades: transport errors and empty carriers are
    /// retried next tick, malformed payloads are logged and ignored, and a
    /// render failure adopts the new settings but keeps the previous
    /// overlay image so a later successful render recovers.
    pub fn poll_once(&mut self) {
        let payload = match self.transport.read_latest() {
            Ok(Some(payload)) => payload,
            Ok(None) => return,
            Err(e) => {
                debug!(error = %e, "Settings transport read failed, retrying next tick");
                return;
            }
        };

        let candidate = match crate::decode::decode_payload(&payload) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed settings payload");
                return;
            }
        };

        if candidate == self.active {
            return;
        }

        info!(
            text = %candidate.text,
            position = ?candidate.position,
            enable_camera = candidate.enable_camera,
            "Settings changed, re-rendering overlay"
        );

        let overlay = match self.renderer.render(&candidate) {
            Ok(image) => Some(Arc::new(image)),
            Err(e) => {
                warn!(error = %e, "Overlay render failed, keeping previous image");
                self.cell.load().overlay
            }
        };

        self.active = candidate.clone();
        self.cell.store(OverlaySnapshot {
            settings: candidate,
            overlay,
        });
    }
}

/// Handle to the settings poll thread.
pub struct SettingsPoller {
    stop_tx: Option<Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SettingsPoller {
    /// Spawn the poll thread: one immediate poll, then one per `interval`.
    pub fn spawn(mut watcher: SettingsWatcher, interval: Duration) -> Result<Self, ChannelError> {
        let (stop_tx, stop_rx) = channel::bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("settings-poll".to_string())
            .spawn(move || {
                debug!(interval_ms = interval.as_millis() as u64, "Settings poller started");
                watcher.poll_once();

                let ticker = channel::tick(interval);
                loop {
                    select! {
                        recv(ticker) -> _ => watcher.poll_once(),
                        recv(stop_rx) -> _ => break,
                    }
                }
                debug!("Settings poller stopped");
            })
            .map_err(ChannelError::Spawn)?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stop the poll thread and wait for it to exit. Idempotent.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            // A dropped sender also wakes the select, so a send failure
            // (thread already gone) is fine.
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SettingsPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use cap_common::error::RenderError;
    use cap_common::frame::OverlayImage;
    use cap_common::types::Resolution;

    use crate::decode::encode_payload;
    use crate::transport::MemoryTransport;

    /// Counts render calls; renders a 1x1 opaque overlay.
    struct CountingRenderer {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl RenderOverlay for CountingRenderer {
        fn render(&self, _settings: &Settings) -> Result<OverlayImage, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RenderError::NoFont {
                    requested: String::new(),
                });
            }
            let mut image = OverlayImage::transparent(Resolution::new(1, 1));
            image.pixels = vec![255, 255, 255, 255];
            Ok(image)
        }
    }

    fn watcher(
        transport: MemoryTransport,
        fail: bool,
    ) -> (SettingsWatcher, Arc<AtomicUsize>, Arc<OverlayCell>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let cell = Arc::new(OverlayCell::new(Settings::default()));
        let w = SettingsWatcher::new(
            Box::new(transport),
            Box::new(CountingRenderer {
                calls: calls.clone(),
                fail,
            }),
            cell.clone(),
            Settings::default(),
        );
        (w, calls, cell)
    }

    fn changed_settings() -> Settings {
        let mut s = Settings::default();
        s.text = "LIVE".into();
        s
    }

    #[test]
    fn identical_payload_renders_exactly_once() {
        let transport = MemoryTransport::new();
        let (mut watcher, calls, _) = watcher(transport.clone(), false);

        transport.publish(encode_payload(&changed_settings()));
        watcher.poll_once();
        watcher.poll_once();
        watcher.poll_once();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn changed_payload_triggers_re_render() {
        let transport = MemoryTransport::new();
        let (mut watcher, calls, cell) = watcher(transport.clone(), false);

        transport.publish(encode_payload(&changed_settings()));
        watcher.poll_once();

        let mut other = changed_settings();
        other.text = "BRB".into();
        transport.publish(encode_payload(&other));
        watcher.poll_once();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cell.load().settings, other);
    }

    #[test]
    fn empty_transport_is_a_noop() {
        let (mut watcher, calls, cell) = watcher(MemoryTransport::new(), false);
        watcher.poll_once();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(cell.load().settings, Settings::default());
    }

    #[test]
    fn malformed_payload_retains_active_settings() {
        let transport = MemoryTransport::new();
        let (mut watcher, calls, cell) = watcher(transport.clone(), false);

        transport.publish("!!! definitely not base64 !!!");
        watcher.poll_once();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(*watcher.active(), Settings::default());
        assert!(cell.load().overlay.is_none());
    }

    #[test]
    fn payload_matching_active_settings_is_not_rendered() {
        let transport = MemoryTransport::new();
        let (mut watcher, calls, _) = watcher(transport.clone(), false);

        // Same value as the initial active settings: no render.
        transport.publish(encode_payload(&Settings::default()));
        watcher.poll_once();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn render_failure_adopts_settings_and_keeps_previous_overlay() {
        let transport = MemoryTransport::new();
        let (mut watcher, calls, cell) = watcher(transport.clone(), true);

        transport.publish(encode_payload(&changed_settings()));
        watcher.poll_once();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let snap = cell.load();
        assert_eq!(snap.settings, changed_settings());
        assert!(snap.overlay.is_none()); // there was no previous overlay

        // Same payload again: settings were adopted, so no re-render storm.
        watcher.poll_once();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn poller_polls_immediately_and_stops_idempotently() {
        let transport = MemoryTransport::new();
        transport.publish(encode_payload(&changed_settings()));

        let (watcher, calls, cell) = watcher(transport, false);
        let mut poller =
            SettingsPoller::spawn(watcher, Duration::from_secs(3600)).unwrap();

        // The first poll fires immediately, not after the first interval.
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while calls.load(Ordering::SeqCst) == 0 && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cell.load().overlay.is_some());

        poller.stop();
        poller.stop(); // idempotent
    }
}

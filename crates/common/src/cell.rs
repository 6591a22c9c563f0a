//! Atomic settings/overlay handoff between the poll thread and the frame path.
//!
//! Two independent schedules touch this state: the 1 Hz settings poller
//! (writer) and the per-frame compositing callback (reader). The cell
//! publishes a complete [`OverlaySnapshot`] under a `parking_lot` lock held
//! only long enough to clone an `Arc`, so the frame path never observes a
//! half-updated settings/overlay pair and never blocks on rendering work.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::frame::OverlayImage;
use crate::settings::Settings;

/// A consistent view of the active settings and the overlay rendered from them.
#[derive(Clone, Debug, Default)]
pub struct OverlaySnapshot {
    /// The active settings value.
    pub settings: Settings,
    /// The cached overlay, `None` until the first render lands (startup race:
    /// the compositor passes the background through unchanged).
    pub overlay: Option<Arc<OverlayImage>>,
}

/// Single-writer/multiple-reader cell holding the published snapshot.
#[derive(Debug, Default)]
pub struct OverlayCell {
    inner: RwLock<OverlaySnapshot>,
}

impl OverlayCell {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: RwLock::new(OverlaySnapshot {
                settings,
                overlay: None,
            }),
        }
    }

    /// Clone the current snapshot. Cheap: the overlay pixels are behind an
    /// `Arc`, only the settings struct is deep-cloned.
    pub fn load(&self) -> OverlaySnapshot {
        self.inner.read().clone()
    }

    /// Replace the whole snapshot. Readers see either the previous snapshot
    /// or this one, never a mix.
    pub fn store(&self, snapshot: OverlaySnapshot) {
        debug!(
            text = %snapshot.settings.text,
            has_overlay = snapshot.overlay.is_some(),
            "Publishing overlay snapshot"
        );
        *self.inner.write() = snapshot;
    }
}

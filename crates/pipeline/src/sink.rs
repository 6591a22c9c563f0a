//! The downstream frame consumer.

use cap_common::frame::CompositedFrame;

/// Receives each composited frame, delegate-style.
///
/// Ownership of the buffer transfers to the sink; the pipeline never
/// touches a frame again after delivery. Called on the capture callback's
/// thread, so implementations should hand the buffer off rather than do
/// heavy work inline.
pub trait OutputSink: Send + Sync {
    fn deliver(&self, frame: CompositedFrame);
}

/// Plain functions and closures work as sinks.
impl<F> OutputSink for F
where
    F: Fn(CompositedFrame) + Send + Sync,
{
    fn deliver(&self, frame: CompositedFrame) {
        self(frame)
    }
}

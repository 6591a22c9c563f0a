//! `cap-pipeline`: Lifecycle glue for the live caption compositing pipeline.
//!
//! Architecture:
//!
//! ```text
//! settings-poll thread (1 Hz)         capture callback (per frame)
//! ┌─────────────────────┐            ┌──────────────────────────┐
//! │ transport → decode  │            │ submit_frame()           │
//! │ compare → render    │─ publish ─▶│  - load overlay snapshot │
//! │ (cap-channel)       │ OverlayCell│  - compose (cap-compositor)
//! └─────────────────────┘            │  - deliver to OutputSink │
//!                                    └──────────────────────────┘
//! ```
//!
//! The pipeline is `Idle` until `start()`, composites while `Running`, and
//! drops every frame after `stop()` returns. There is no paused state:
//! disabling the camera is a settings-level visual toggle handled by the
//! compositor, not a lifecycle transition.

pub mod pipeline;
pub mod sink;

pub use pipeline::{CaptionPipeline, PipelineError, PipelineState};
pub use sink::OutputSink;

//! Pipeline configuration.

use std::time::Duration;

use crate::types::Resolution;

/// Top-level pipeline configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Overlay canvas resolution (also the no-camera background size).
    pub canvas: Resolution,
    /// Settings poll cadence. The first poll fires immediately on start.
    pub poll_interval: Duration,
    /// Caption distance from the top/bottom canvas edge in pixels.
    pub margin: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            canvas: Resolution::CANVAS,
            poll_interval: Duration::from_secs(1),
            margin: 40,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.canvas, Resolution::CANVAS);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.margin, 40);
    }
}

use std::time::Duration;

use crate::matching::DEFAULT_MATCH_THRESHOLD;

/// Tunables for the scan pipeline and loops.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Suppression window for repeat scans of the same raw key.
    pub cooldown: Duration,

    /// Face acceptance threshold in descriptor space (lower is stricter).
    pub match_threshold: f32,

    /// Cadence of the polling loop (face-frame re-evaluation).
    pub tick_interval: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(2),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            tick_interval: Duration::from_millis(200),
        }
    }
}

impl ScanConfig {
    /// Face-recognition defaults: re-detections of the same person arrive
    /// every tick, so the suppression window is longer than for QR.
    pub fn face_defaults() -> Self {
        Self {
            cooldown: Duration::from_secs(5),
            ..Self::default()
        }
    }
}

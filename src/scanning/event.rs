use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Identity signal extracted by an external scanner collaborator: either a
/// decoded QR string or a face embedding from a detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScanPayload {
    QrCode(String),
    Descriptor(Vec<f32>),
}

/// One raw scan delivered to the pipeline. `raw_key` identifies the
/// physical scan for deduplication: the decoded string for QR, a
/// per-detection key chosen by the face collaborator (typically the best
/// candidate's label) for face mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanEvent {
    pub raw_key: String,
    pub payload: ScanPayload,
    /// When the scanner produced the event. The dedup window is measured
    /// from this instant, so a backlogged channel cannot stretch a
    /// suppression window past the actual decode times.
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl ScanEvent {
    /// Event for a decoded QR string; the decoded text is its own dedup key.
    pub fn qr(decoded: impl Into<String>) -> Self {
        let decoded = decoded.into();
        Self {
            raw_key: decoded.clone(),
            payload: ScanPayload::QrCode(decoded),
            timestamp: Instant::now(),
        }
    }

    pub fn face(raw_key: impl Into<String>, descriptor: Vec<f32>) -> Self {
        Self {
            raw_key: raw_key.into(),
            payload: ScanPayload::Descriptor(descriptor),
            timestamp: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_are_stamped_at_creation() {
        let before = Instant::now();
        let event = ScanEvent::qr("S042");
        let after = Instant::now();

        assert_eq!(event.raw_key, "S042");
        assert!(event.timestamp >= before);
        assert!(event.timestamp <= after);
    }
}

use log::info;

use crate::db::models::Subject;

/// Terminal per-event outcome, handed to the presentation collaborator.
/// Recognized outcomes carry the resolved subject so the sink can speak
/// or display name and roll number.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    MarkedPresent(Subject),
    AlreadyMarked(Subject),
    Unrecognized,
    /// Repeat of a raw key still inside its cooldown window. Silent by
    /// default: sinks are not invoked for suppressed events.
    Suppressed,
}

impl ScanOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            ScanOutcome::MarkedPresent(_) => "marked_present",
            ScanOutcome::AlreadyMarked(_) => "already_marked",
            ScanOutcome::Unrecognized => "unrecognized",
            ScanOutcome::Suppressed => "suppressed",
        }
    }
}

/// Boundary to the external presentation layer (toasts, text-to-speech,
/// success sounds). Implementations must be cheap and non-blocking; the
/// pipeline calls them while holding its lock.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, outcome: &ScanOutcome);
}

/// Default sink: logs each outcome.
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, outcome: &ScanOutcome) {
        match outcome {
            ScanOutcome::MarkedPresent(subject) => {
                info!("{}, roll {}, present", subject.name, subject.roll_no);
            }
            ScanOutcome::AlreadyMarked(subject) => {
                info!("{}, roll {}, already present", subject.name, subject.roll_no);
            }
            ScanOutcome::Unrecognized => info!("identity not recognized"),
            ScanOutcome::Suppressed => {}
        }
    }
}

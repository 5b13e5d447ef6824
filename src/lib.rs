//! Attendance check-in engine.
//!
//! Turns raw identity signals (decoded QR strings or recognized face
//! descriptors) into correct, idempotent, once-per-day attendance records:
//! a time-windowed dedup gate, an identity-resolution step and an
//! idempotent per-subject, per-day ledger, driven by a polling or
//! callback-fed scan loop. Scanning hardware, presentation and HTTP
//! surfaces are external collaborators behind [`scanning::FrameSource`]
//! and [`scanning::NotificationSink`].

pub mod catalog;
pub mod db;
pub mod dedup;
pub mod ledger;
pub mod matching;
pub mod scanning;

pub use catalog::IdentityCatalog;
pub use db::{AttendanceRecord, Database, NewSubject, Subject, Term, DESCRIPTOR_LEN};
pub use dedup::DedupCache;
pub use ledger::{AttendanceLedger, MarkOutcome};
pub use matching::{Match, Matcher};
pub use scanning::{
    FrameSource, NotificationSink, ScanConfig, ScanController, ScanEvent, ScanOutcome,
    ScanPayload, ScanPipeline,
};

pub mod state;

pub use state::{AttendanceLedger, MarkOutcome};

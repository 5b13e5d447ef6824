pub mod attendance;
pub mod subject;

pub use attendance::AttendanceRecord;
pub use subject::{NewSubject, Subject, Term, DESCRIPTOR_LEN};

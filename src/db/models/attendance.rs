use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One subject marked present on one calendar day. Absence is the lack of
/// a record; nothing ever reverts a record within the same day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub subject_id: String,
    pub date: NaiveDate,
    pub marked_at: DateTime<Utc>,
}

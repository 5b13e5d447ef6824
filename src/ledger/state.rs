use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::db::models::AttendanceRecord;

/// Result of a `mark` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// No record existed for this subject and day; one was created.
    Created,
    /// A record already existed; nothing changed.
    AlreadyPresent,
}

/// Per-subject, per-day attendance state. Absence is implicit: a subject
/// with no record for a date is absent. `mark` is the only transition and
/// it is idempotent — the first mark of the day wins and is never
/// overwritten or reverted.
#[derive(Debug, Default)]
pub struct AttendanceLedger {
    records: HashMap<(String, NaiveDate), AttendanceRecord>,
}

impl AttendanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds already-persisted records (e.g. today's rows after a restart)
    /// so re-scans report `AlreadyPresent` instead of re-creating.
    /// Existing in-memory entries are kept; the first mark still wins.
    pub fn preload(&mut self, records: impl IntoIterator<Item = AttendanceRecord>) {
        for record in records {
            self.records
                .entry((record.subject_id.clone(), record.date))
                .or_insert(record);
        }
    }

    pub fn mark(
        &mut self,
        subject_id: &str,
        date: NaiveDate,
        marked_at: DateTime<Utc>,
    ) -> MarkOutcome {
        let key = (subject_id.to_string(), date);
        if self.records.contains_key(&key) {
            return MarkOutcome::AlreadyPresent;
        }

        self.records.insert(
            key,
            AttendanceRecord {
                subject_id: subject_id.to_string(),
                date,
                marked_at,
            },
        );
        MarkOutcome::Created
    }

    pub fn record(&self, subject_id: &str, date: NaiveDate) -> Option<&AttendanceRecord> {
        self.records.get(&(subject_id.to_string(), date))
    }

    pub fn is_present(&self, subject_id: &str, date: NaiveDate) -> bool {
        self.record(subject_id, date).is_some()
    }

    /// Everyone marked present on `date`, in no particular order.
    pub fn present_on(&self, date: NaiveDate) -> Vec<&AttendanceRecord> {
        self.records
            .values()
            .filter(|record| record.date == date)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 30, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_first_mark_creates_record() {
        let mut ledger = AttendanceLedger::new();
        let today = day("2026-08-30");

        assert!(!ledger.is_present("s-1", today));
        assert_eq!(ledger.mark("s-1", today, at(9, 0)), MarkOutcome::Created);
        assert!(ledger.is_present("s-1", today));
    }

    #[test]
    fn test_repeat_marks_are_idempotent() {
        let mut ledger = AttendanceLedger::new();
        let today = day("2026-08-30");

        assert_eq!(ledger.mark("s-1", today, at(9, 0)), MarkOutcome::Created);
        assert_eq!(
            ledger.mark("s-1", today, at(10, 30)),
            MarkOutcome::AlreadyPresent
        );
        assert_eq!(
            ledger.mark("s-1", today, at(15, 45)),
            MarkOutcome::AlreadyPresent
        );

        // The first mark's timestamp survives.
        assert_eq!(ledger.record("s-1", today).unwrap().marked_at, at(9, 0));
    }

    #[test]
    fn test_new_day_is_a_fresh_keyspace() {
        let mut ledger = AttendanceLedger::new();

        assert_eq!(
            ledger.mark("s-1", day("2026-08-30"), at(9, 0)),
            MarkOutcome::Created
        );
        assert_eq!(
            ledger.mark("s-1", day("2026-08-31"), at(9, 0)),
            MarkOutcome::Created
        );
    }

    #[test]
    fn test_subjects_are_independent() {
        let mut ledger = AttendanceLedger::new();
        let today = day("2026-08-30");

        assert_eq!(ledger.mark("s-1", today, at(9, 0)), MarkOutcome::Created);
        assert_eq!(ledger.mark("s-2", today, at(9, 1)), MarkOutcome::Created);
        assert_eq!(ledger.present_on(today).len(), 2);
    }

    #[test]
    fn test_preload_marks_subjects_already_present() {
        let mut ledger = AttendanceLedger::new();
        let today = day("2026-08-30");

        ledger.preload(vec![AttendanceRecord {
            subject_id: "s-1".to_string(),
            date: today,
            marked_at: at(8, 55),
        }]);

        assert_eq!(
            ledger.mark("s-1", today, at(9, 0)),
            MarkOutcome::AlreadyPresent
        );
        assert_eq!(ledger.record("s-1", today).unwrap().marked_at, at(8, 55));
    }
}

use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, Utc};

use crate::catalog::IdentityCatalog;
use crate::db::{models::AttendanceRecord, Database};
use crate::dedup::DedupCache;
use crate::ledger::AttendanceLedger;
use crate::matching::Matcher;

use super::config::ScanConfig;
use super::event::ScanEvent;
use super::notify::{NotificationSink, ScanOutcome};

/// The check-in pipeline: admit (dedup) → resolve (match) → mark (ledger),
/// with write-through persistence on the first mark of the day.
///
/// One pipeline instance serves a session; both scan loops share it behind
/// a mutex so the admit and mark steps are atomic with respect to
/// concurrent scans of the same subject.
pub struct ScanPipeline {
    catalog: Arc<IdentityCatalog>,
    matcher: Matcher,
    dedup: DedupCache,
    ledger: AttendanceLedger,
    db: Database,
    sink: Arc<dyn NotificationSink>,
}

impl ScanPipeline {
    /// Builds a pipeline for a new session. Fails when the catalog is
    /// empty (nothing could ever be recognized) and preloads today's
    /// already-persisted records so a restarted session reports
    /// `AlreadyMarked` instead of double-marking.
    pub async fn new(
        config: &ScanConfig,
        catalog: Arc<IdentityCatalog>,
        db: Database,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self> {
        if catalog.is_empty() {
            bail!("no enrolled subjects available for this session");
        }

        let mut ledger = AttendanceLedger::new();
        let today = Utc::now().date_naive();
        let existing = db
            .attendance_for_date(today)
            .await
            .context("failed to load today's attendance records")?;
        ledger.preload(existing);

        Ok(Self {
            matcher: Matcher::new(Arc::clone(&catalog), config.match_threshold),
            dedup: DedupCache::new(config.cooldown),
            catalog,
            ledger,
            db,
            sink,
        })
    }

    /// Runs one event through the pipeline. Recognition failures are
    /// ordinary outcomes; the only error is a failed persistence write.
    pub async fn process(
        &mut self,
        event: &ScanEvent,
        now: Instant,
        today: NaiveDate,
    ) -> Result<ScanOutcome> {
        if !self.dedup.offer(&event.raw_key, now) {
            // Same physical scan still in its cooldown window; nothing is
            // resolved, marked or announced.
            return Ok(ScanOutcome::Suppressed);
        }

        let Some(matched) = self.matcher.resolve(&event.payload) else {
            let outcome = ScanOutcome::Unrecognized;
            self.sink.notify(&outcome);
            return Ok(outcome);
        };

        let subject = self
            .catalog
            .subject(&matched.subject_id)
            .ok_or_else(|| anyhow!("matched subject {} missing from catalog", matched.subject_id))?
            .clone();

        let outcome = if self.ledger.is_present(&subject.id, today) {
            ScanOutcome::AlreadyMarked(subject)
        } else {
            // Persist before committing the in-memory transition, so a
            // failed write leaves the subject markable by a later scan
            // instead of stranding an unpersisted Present state.
            let marked_at = Utc::now();
            let record = AttendanceRecord {
                subject_id: subject.id.clone(),
                date: today,
                marked_at,
            };
            self.db
                .insert_attendance(&record)
                .await
                .context("attendance write-through failed")?;
            self.ledger.mark(&subject.id, today, marked_at);
            ScanOutcome::MarkedPresent(subject)
        };

        self.sink.notify(&outcome);
        Ok(outcome)
    }

    pub fn catalog(&self) -> &IdentityCatalog {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{NewSubject, Subject, Term};
    use crate::scanning::notify::LogSink;
    use std::sync::Mutex;
    use std::time::Duration;

    struct RecordingSink {
        seen: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
            })
        }

        fn kinds(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl NotificationSink for RecordingSink {
        fn notify(&self, outcome: &ScanOutcome) {
            self.seen.lock().unwrap().push(outcome.kind().to_string());
        }
    }

    async fn setup() -> (ScanPipeline, Database, Arc<RecordingSink>, String) {
        let db = Database::open_in_memory().unwrap();
        let subject = db
            .enroll_subject(NewSubject {
                name: "Hark Dhami".to_string(),
                faculty: "BSc CSIT".to_string(),
                term: Term::Semester("3".to_string()),
                descriptors: Vec::new(),
                dob: None,
                address: None,
                phone: None,
                photo: None,
            })
            .await
            .unwrap();

        let catalog =
            IdentityCatalog::from_subjects(db.list_subjects().await.unwrap()).unwrap();
        let sink = RecordingSink::new();
        let pipeline = ScanPipeline::new(
            &ScanConfig::default(),
            Arc::new(catalog),
            db.clone(),
            sink.clone(),
        )
        .await
        .unwrap();

        (pipeline, db, sink, subject.qr_code)
    }

    #[tokio::test]
    async fn test_refuses_to_start_with_empty_catalog() {
        let db = Database::open_in_memory().unwrap();
        let catalog = IdentityCatalog::from_subjects(Vec::new()).unwrap();
        let result =
            ScanPipeline::new(&ScanConfig::default(), Arc::new(catalog), db, Arc::new(LogSink))
                .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_created_mark_writes_through() {
        let (mut pipeline, db, sink, qr) = setup().await;
        let today = Utc::now().date_naive();

        let outcome = pipeline
            .process(&ScanEvent::qr(qr), Instant::now(), today)
            .await
            .unwrap();

        assert!(matches!(outcome, ScanOutcome::MarkedPresent(_)));
        assert_eq!(db.attendance_for_date(today).await.unwrap().len(), 1);
        assert_eq!(sink.kinds(), ["marked_present"]);
    }

    #[tokio::test]
    async fn test_unrecognized_writes_nothing() {
        let (mut pipeline, db, sink, _) = setup().await;
        let today = Utc::now().date_naive();

        let outcome = pipeline
            .process(&ScanEvent::qr("not-a-registered-code"), Instant::now(), today)
            .await
            .unwrap();

        assert!(matches!(outcome, ScanOutcome::Unrecognized));
        assert!(db.attendance_for_date(today).await.unwrap().is_empty());
        assert_eq!(sink.kinds(), ["unrecognized"]);
    }

    #[tokio::test]
    async fn test_suppressed_is_silent() {
        let (mut pipeline, _db, sink, qr) = setup().await;
        let today = Utc::now().date_naive();
        let t0 = Instant::now();

        pipeline
            .process(&ScanEvent::qr(qr.clone()), t0, today)
            .await
            .unwrap();
        let outcome = pipeline
            .process(&ScanEvent::qr(qr), t0 + Duration::from_millis(500), today)
            .await
            .unwrap();

        assert!(matches!(outcome, ScanOutcome::Suppressed));
        // Only the first event reached the sink.
        assert_eq!(sink.kinds(), ["marked_present"]);
    }

    #[tokio::test]
    async fn test_failed_write_through_keeps_subject_markable() {
        // Catalog knows a subject the store does not, so the write-through
        // insert violates the attendance foreign key.
        let now = Utc::now();
        let ghost = Subject {
            id: "ghost".to_string(),
            name: "Ghost".to_string(),
            roll_no: 1,
            faculty: "BSc CSIT".to_string(),
            term: Term::Semester("3".to_string()),
            qr_code: "QR-GHOST".to_string(),
            descriptors: Vec::new(),
            dob: None,
            address: None,
            phone: None,
            photo: None,
            created_at: now,
            updated_at: now,
        };

        let db = Database::open_in_memory().unwrap();
        let catalog = IdentityCatalog::from_subjects(vec![ghost]).unwrap();
        let sink = RecordingSink::new();
        let mut pipeline = ScanPipeline::new(
            &ScanConfig::default(),
            Arc::new(catalog),
            db.clone(),
            sink.clone(),
        )
        .await
        .unwrap();

        let today = Utc::now().date_naive();
        let t0 = Instant::now();

        let first = pipeline
            .process(&ScanEvent::qr("QR-GHOST"), t0, today)
            .await;
        assert!(first.is_err());
        assert!(db.attendance_for_date(today).await.unwrap().is_empty());

        // Past the cooldown: the mark was never committed, so the scan
        // retries the write rather than reporting already marked.
        let retry = pipeline
            .process(&ScanEvent::qr("QR-GHOST"), t0 + Duration::from_secs(10), today)
            .await;
        assert!(retry.is_err());
        assert!(db.attendance_for_date(today).await.unwrap().is_empty());

        // Nothing was ever announced for the failed marks.
        assert!(sink.kinds().is_empty());
    }

    #[tokio::test]
    async fn test_restarted_session_reports_already_marked() {
        let (mut pipeline, db, _sink, qr) = setup().await;
        let today = Utc::now().date_naive();
        pipeline
            .process(&ScanEvent::qr(qr.clone()), Instant::now(), today)
            .await
            .unwrap();

        // New session over the same store: preload picks up today's record.
        let catalog =
            IdentityCatalog::from_subjects(db.list_subjects().await.unwrap()).unwrap();
        let mut second = ScanPipeline::new(
            &ScanConfig::default(),
            Arc::new(catalog),
            db.clone(),
            Arc::new(LogSink),
        )
        .await
        .unwrap();

        let outcome = second
            .process(&ScanEvent::qr(qr), Instant::now(), today)
            .await
            .unwrap();
        assert!(matches!(outcome, ScanOutcome::AlreadyMarked(_)));
        assert_eq!(db.attendance_for_date(today).await.unwrap().len(), 1);
    }
}

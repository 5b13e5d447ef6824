use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Row};

use crate::db::{
    helpers::{parse_date, parse_datetime},
    models::AttendanceRecord,
    Database,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn row_to_record(row: &Row) -> Result<AttendanceRecord> {
    let date: String = row.get("date")?;
    let marked_at: String = row.get("marked_at")?;

    Ok(AttendanceRecord {
        subject_id: row.get("subject_id")?,
        date: parse_date(&date, "date")?,
        marked_at: parse_datetime(&marked_at, "marked_at")?,
    })
}

impl Database {
    /// Write-through target for ledger `Created` transitions. The
    /// `(subject_id, date)` pair is unique; re-inserting an existing pair
    /// is a no-op and returns `false`, so a restarted session can never
    /// produce a second record for the day.
    pub async fn insert_attendance(&self, record: &AttendanceRecord) -> Result<bool> {
        let record = record.clone();
        self.execute(move |conn| {
            let inserted = conn
                .execute(
                    "INSERT INTO attendance (subject_id, date, marked_at)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT (subject_id, date) DO NOTHING",
                    params![
                        record.subject_id,
                        record.date.format(DATE_FORMAT).to_string(),
                        record.marked_at.to_rfc3339(),
                    ],
                )
                .context("failed to insert attendance record")?;
            Ok(inserted > 0)
        })
        .await
    }

    /// Records for one calendar day, used to preload the ledger at
    /// session start.
    pub async fn attendance_for_date(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>> {
        self.execute(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT subject_id, date, marked_at FROM attendance
                     WHERE date = ?1 ORDER BY marked_at",
                )
                .context("failed to prepare attendance-by-date query")?;

            let mut rows = stmt.query(params![date.format(DATE_FORMAT).to_string()])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(row_to_record(row)?);
            }
            Ok(records)
        })
        .await
    }

    /// A subject's full attendance history, oldest first.
    pub async fn attendance_for_subject(
        &self,
        subject_id: &str,
    ) -> Result<Vec<AttendanceRecord>> {
        let subject_id = subject_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT subject_id, date, marked_at FROM attendance
                     WHERE subject_id = ?1 ORDER BY date",
                )
                .context("failed to prepare attendance-by-subject query")?;

            let mut rows = stmt.query(params![subject_id])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(row_to_record(row)?);
            }
            Ok(records)
        })
        .await
    }
}

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::db::{
    helpers::{descriptors_to_json, parse_datetime, parse_descriptors, to_u32},
    models::{NewSubject, Subject, Term, DESCRIPTOR_LEN},
    Database,
};

fn row_to_subject(row: &Row) -> Result<Subject> {
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    let roll_no: i64 = row.get("roll_no")?;
    let semester: Option<String> = row.get("semester")?;
    let year: Option<String> = row.get("year")?;
    let descriptors: Option<String> = row.get("descriptors")?;

    Ok(Subject {
        id: row.get("id")?,
        name: row.get("name")?,
        roll_no: to_u32(roll_no, "roll_no")?,
        faculty: row.get("faculty")?,
        term: Term::from_columns(semester, year)?,
        qr_code: row.get("qr_code")?,
        descriptors: parse_descriptors(descriptors, "descriptors")?,
        dob: row.get("dob")?,
        address: row.get("address")?,
        phone: row.get("phone")?,
        photo: row.get("photo")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(info, _)
            if info.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl Database {
    /// Registers a subject, allocating the next roll number within its
    /// `(faculty, term)` group: `max(existing) + 1`, starting at 1 for an
    /// empty group. Allocation and insert run in one transaction on the
    /// single db thread, so concurrent enrollments cannot collide.
    pub async fn enroll_subject(&self, new: NewSubject) -> Result<Subject> {
        for descriptor in &new.descriptors {
            if descriptor.len() != DESCRIPTOR_LEN {
                return Err(anyhow!(
                    "reference descriptor has length {} (expected {DESCRIPTOR_LEN})",
                    descriptor.len()
                ));
            }
        }

        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open enrollment transaction")?;

            let (semester, year) = new.term.columns();
            let max_roll: i64 = tx
                .query_row(
                    "SELECT COALESCE(MAX(roll_no), 0) FROM subjects
                     WHERE faculty = ?1 AND semester IS ?2 AND year IS ?3",
                    params![new.faculty, semester, year],
                    |row| row.get(0),
                )
                .context("failed to query highest roll number in group")?;

            let roll_no = to_u32(max_roll, "roll_no")? + 1;
            let id = Uuid::new_v4().to_string();
            let qr_code = Subject::qr_payload(&id, &new.name, roll_no, &new.faculty, &new.term);
            let now = Utc::now();
            let subject = Subject {
                id,
                name: new.name,
                roll_no,
                faculty: new.faculty,
                term: new.term,
                qr_code,
                descriptors: new.descriptors,
                dob: new.dob,
                address: new.address,
                phone: new.phone,
                photo: new.photo,
                created_at: now,
                updated_at: now,
            };

            insert_subject_row(&tx, &subject)?;
            tx.commit().context("failed to commit enrollment")?;
            Ok(subject)
        })
        .await
    }

    /// Inserts a subject with an explicit roll number. Fails when the
    /// `(faculty, term, roll_no)` tuple is already taken.
    pub async fn insert_subject(&self, subject: &Subject) -> Result<()> {
        let record = subject.clone();
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open insert transaction")?;
            insert_subject_row(&tx, &record)?;
            tx.commit().context("failed to commit subject insert")
        })
        .await
    }

    /// All subjects in enrollment (rowid) order — the catalog load.
    pub async fn list_subjects(&self) -> Result<Vec<Subject>> {
        self.execute(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, name, roll_no, faculty, semester, year, qr_code, descriptors,
                            dob, address, phone, photo, created_at, updated_at
                     FROM subjects ORDER BY rowid",
                )
                .context("failed to prepare subject listing")?;

            let mut rows = stmt.query([])?;
            let mut subjects = Vec::new();
            while let Some(row) = rows.next()? {
                subjects.push(row_to_subject(row)?);
            }
            Ok(subjects)
        })
        .await
    }
}

fn insert_subject_row(tx: &rusqlite::Transaction<'_>, subject: &Subject) -> Result<()> {
    let (semester, year) = subject.term.columns();
    tx.execute(
        "INSERT INTO subjects (id, name, roll_no, faculty, semester, year, qr_code,
                               descriptors, dob, address, phone, photo, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            subject.id,
            subject.name,
            subject.roll_no,
            subject.faculty,
            semester,
            year,
            subject.qr_code,
            descriptors_to_json(&subject.descriptors)?,
            subject.dob,
            subject.address,
            subject.phone,
            subject.photo,
            subject.created_at.to_rfc3339(),
            subject.updated_at.to_rfc3339(),
        ],
    )
    .map_err(|err| {
        if is_unique_violation(&err) {
            anyhow!(
                "duplicate roll number {} for faculty {} in this term",
                subject.roll_no,
                subject.faculty
            )
        } else {
            anyhow::Error::new(err).context("failed to insert subject")
        }
    })?;
    Ok(())
}

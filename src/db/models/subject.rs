//! Subject (student) data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Face embedding length produced by the recognition collaborator.
pub const DESCRIPTOR_LEN: usize = 128;

/// The academic grouping a roll number is unique within, combined with
/// `faculty`. Courses are tracked either by semester or by year, never
/// both and never neither.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Term {
    Semester(String),
    Year(String),
}

impl Term {
    /// The two nullable storage columns this term maps to.
    pub fn columns(&self) -> (Option<&str>, Option<&str>) {
        match self {
            Term::Semester(s) => (Some(s.as_str()), None),
            Term::Year(y) => (None, Some(y.as_str())),
        }
    }

    pub fn from_columns(semester: Option<String>, year: Option<String>) -> anyhow::Result<Self> {
        match (semester, year) {
            (Some(s), None) => Ok(Term::Semester(s)),
            (None, Some(y)) => Ok(Term::Year(y)),
            (None, None) => anyhow::bail!("subject row has neither semester nor year"),
            (Some(_), Some(_)) => anyhow::bail!("subject row has both semester and year"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub roll_no: u32,
    pub faculty: String,
    pub term: Term,
    /// Canonical decoded-QR string for this subject, generated at enrollment.
    pub qr_code: String,
    /// Reference face embeddings; each exactly `DESCRIPTOR_LEN` long.
    pub descriptors: Vec<Vec<f32>>,
    pub dob: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Enrollment input; the store assigns `id`, `roll_no` and `qr_code`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubject {
    pub name: String,
    pub faculty: String,
    pub term: Term,
    #[serde(default)]
    pub descriptors: Vec<Vec<f32>>,
    pub dob: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<String>,
}

impl Subject {
    /// The payload encoded into the subject's printed QR code. Scans are
    /// resolved by exact match against this string, so it must be stable
    /// for the subject's lifetime.
    pub fn qr_payload(id: &str, name: &str, roll_no: u32, faculty: &str, term: &Term) -> String {
        let (semester, year) = term.columns();
        serde_json::json!({
            "id": id,
            "name": name,
            "rollNo": roll_no,
            "faculty": faculty,
            "semester": semester,
            "year": year,
        })
        .to_string()
    }
}

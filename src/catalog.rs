use std::collections::HashMap;

use anyhow::{bail, Result};

use crate::db::models::Subject;

/// The session's known subjects, loaded once at startup.
///
/// Insertion order is preserved and meaningful: face matching breaks
/// near-ties in favor of the earlier-registered subject, so `iter` must
/// walk subjects in the order they were enrolled.
pub struct IdentityCatalog {
    subjects: Vec<Subject>,
    by_qr: HashMap<String, usize>,
    by_id: HashMap<String, usize>,
}

impl IdentityCatalog {
    pub fn from_subjects(subjects: Vec<Subject>) -> Result<Self> {
        let mut by_qr = HashMap::with_capacity(subjects.len());
        let mut by_id = HashMap::with_capacity(subjects.len());

        for (index, subject) in subjects.iter().enumerate() {
            if by_id.insert(subject.id.clone(), index).is_some() {
                bail!("duplicate subject id {} in catalog", subject.id);
            }
            if by_qr.insert(subject.qr_code.clone(), index).is_some() {
                bail!("duplicate qr code for subject {}", subject.id);
            }
        }

        Ok(Self {
            subjects,
            by_qr,
            by_id,
        })
    }

    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.by_id.get(id).map(|index| &self.subjects[*index])
    }

    /// Exact, case-sensitive lookup of a decoded QR string.
    pub fn lookup_qr(&self, raw: &str) -> Option<&Subject> {
        self.by_qr.get(raw).map(|index| &self.subjects[*index])
    }

    /// Subjects in enrollment order.
    pub fn iter(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.iter()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

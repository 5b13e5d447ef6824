use std::sync::Arc;

use crate::catalog::IdentityCatalog;
use crate::scanning::ScanPayload;

use super::descriptor::descriptor_distance;

/// Distances within this much of the running minimum count as a tie, and
/// ties keep the earlier-registered subject.
pub const MATCH_EPSILON: f32 = 1e-6;

/// Default face acceptance threshold in normalized descriptor space;
/// lower is stricter.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub subject_id: String,
    /// Distance of the accepted candidate; 0.0 for exact QR hits.
    pub distance: f32,
}

/// Resolves a raw payload to a catalog subject. Pure: no payload, however
/// malformed, produces an error — unrecognized input is `None`.
pub struct Matcher {
    catalog: Arc<IdentityCatalog>,
    threshold: f32,
}

impl Matcher {
    pub fn new(catalog: Arc<IdentityCatalog>, threshold: f32) -> Self {
        Self { catalog, threshold }
    }

    pub fn resolve(&self, payload: &ScanPayload) -> Option<Match> {
        match payload {
            ScanPayload::QrCode(decoded) => self.resolve_qr(decoded),
            ScanPayload::Descriptor(descriptor) => self.resolve_descriptor(descriptor),
        }
    }

    fn resolve_qr(&self, decoded: &str) -> Option<Match> {
        if decoded.is_empty() {
            return None;
        }
        self.catalog.lookup_qr(decoded).map(|subject| Match {
            subject_id: subject.id.clone(),
            distance: 0.0,
        })
    }

    fn resolve_descriptor(&self, descriptor: &[f32]) -> Option<Match> {
        let mut best: Option<Match> = None;

        for subject in self.catalog.iter() {
            for reference in &subject.descriptors {
                let distance = descriptor_distance(descriptor, reference);
                let improves = match &best {
                    // Strictly-better-than-epsilon improvement required, so
                    // a near-equal later subject never displaces an earlier one.
                    Some(current) => distance + MATCH_EPSILON < current.distance,
                    None => true,
                };
                if improves {
                    best = Some(Match {
                        subject_id: subject.id.clone(),
                        distance,
                    });
                }
            }
        }

        best.filter(|m| m.distance <= self.threshold)
    }
}

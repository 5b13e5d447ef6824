//! Scripted check-in simulation against an in-memory store. Useful for a
//! manual smoke run of the full pipeline without camera or scanner
//! hardware: `RUST_LOG=info cargo run --bin rollcall-sim`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use rand::Rng;

use rollcall::{
    Database, FrameSource, IdentityCatalog, NewSubject, ScanConfig, ScanController, ScanEvent,
    ScanPipeline, Subject, Term, DESCRIPTOR_LEN,
};
use rollcall::scanning::LogSink;

/// Deterministic synthetic "camera": yields one scripted batch of events
/// per poll, then empty frames.
struct ScriptedCamera {
    frames: Vec<Vec<ScanEvent>>,
    next: usize,
}

impl ScriptedCamera {
    fn new(frames: Vec<Vec<ScanEvent>>) -> Self {
        Self { frames, next: 0 }
    }
}

impl FrameSource for ScriptedCamera {
    fn poll(&mut self) -> Result<Vec<ScanEvent>> {
        let frame = self.frames.get(self.next).cloned().unwrap_or_default();
        self.next += 1;
        Ok(frame)
    }
}

fn synthetic_descriptor(rng: &mut impl Rng) -> Vec<f32> {
    (0..DESCRIPTOR_LEN).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

/// A noisy re-detection of an enrolled face, well inside the 0.6 threshold.
fn jittered(reference: &[f32], rng: &mut impl Rng) -> Vec<f32> {
    reference
        .iter()
        .map(|component| component + rng.gen_range(-0.01..0.01))
        .collect()
}

async fn enroll_class(db: &Database) -> Result<Vec<Subject>> {
    let names = ["Hark Dhami", "Janak Saud", "Suresh Raj Pant", "Deepak Bohora"];
    let mut rng = rand::thread_rng();
    let mut subjects = Vec::new();

    for name in names {
        let subject = db
            .enroll_subject(NewSubject {
                name: name.to_string(),
                faculty: "BSc CSIT".to_string(),
                term: Term::Semester("3".to_string()),
                descriptors: vec![synthetic_descriptor(&mut rng)],
                dob: None,
                address: None,
                phone: None,
                photo: None,
            })
            .await
            .with_context(|| format!("failed to enroll {name}"))?;
        info!("enrolled {} with roll {}", subject.name, subject.roll_no);
        subjects.push(subject);
    }

    Ok(subjects)
}

async fn run_qr_session(db: &Database, subjects: &[Subject]) -> Result<()> {
    info!("--- QR session ---");
    let config = ScanConfig::default();
    let catalog = IdentityCatalog::from_subjects(db.list_subjects().await?)?;
    let pipeline =
        ScanPipeline::new(&config, Arc::new(catalog), db.clone(), Arc::new(LogSink)).await?;

    let mut controller = ScanController::new(pipeline, config.tick_interval);
    let events = controller.start_stream()?;

    // First decode marks, the rapid repeat is suppressed, an unknown code
    // is rejected, and a later repeat of the first code is already marked.
    events.send(ScanEvent::qr(subjects[0].qr_code.clone())).await?;
    events.send(ScanEvent::qr(subjects[0].qr_code.clone())).await?;
    events.send(ScanEvent::qr("{\"roll\":\"99\"}")).await?;
    events.send(ScanEvent::qr(subjects[1].qr_code.clone())).await?;

    tokio::time::sleep(Duration::from_millis(100)).await;
    controller.stop().await
}

async fn run_face_session(db: &Database, subjects: &[Subject]) -> Result<()> {
    info!("--- face session ---");
    let mut rng = rand::thread_rng();
    let catalog = IdentityCatalog::from_subjects(db.list_subjects().await?)?;
    let config = ScanConfig::face_defaults();
    let pipeline =
        ScanPipeline::new(&config, Arc::new(catalog), db.clone(), Arc::new(LogSink)).await?;

    // Two consecutive frames see the same two faces; the second frame's
    // detections fall inside the cooldown and are suppressed.
    let frame: Vec<ScanEvent> = subjects[2..4]
        .iter()
        .map(|subject| {
            ScanEvent::face(
                format!("face:{}", subject.roll_no),
                jittered(&subject.descriptors[0], &mut rng),
            )
        })
        .collect();
    let camera = ScriptedCamera::new(vec![frame.clone(), frame]);

    let mut controller = ScanController::new(pipeline, config.tick_interval);
    controller.start_polling(Box::new(camera))?;

    tokio::time::sleep(config.tick_interval * 3).await;
    controller.stop().await
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let db = Database::open_in_memory()?;
    let subjects = enroll_class(&db).await?;

    run_qr_session(&db, &subjects).await?;
    run_face_session(&db, &subjects).await?;

    let today = Utc::now().date_naive();
    let records = db.attendance_for_date(today).await?;
    info!("{} of {} subjects marked present today", records.len(), subjects.len());
    for record in &records {
        info!("  {} marked at {}", record.subject_id, record.marked_at);
    }

    Ok(())
}

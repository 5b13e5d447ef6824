//! Store-side registration invariants: roll numbers allocate sequentially
//! within a (faculty, term) group and duplicates are rejected.

use chrono::Utc;
use uuid::Uuid;

use rollcall::{Database, NewSubject, Subject, Term};

fn new_subject(name: &str, faculty: &str, term: Term) -> NewSubject {
    NewSubject {
        name: name.to_string(),
        faculty: faculty.to_string(),
        term,
        descriptors: Vec::new(),
        dob: None,
        address: None,
        phone: None,
        photo: None,
    }
}

fn explicit_subject(faculty: &str, term: Term, roll_no: u32) -> Subject {
    let now = Utc::now();
    let id = Uuid::new_v4().to_string();
    Subject {
        qr_code: Subject::qr_payload(&id, "Explicit", roll_no, faculty, &term),
        id,
        name: "Explicit".to_string(),
        roll_no,
        faculty: faculty.to_string(),
        term,
        descriptors: Vec::new(),
        dob: None,
        address: None,
        phone: None,
        photo: None,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn first_enrollment_in_empty_group_gets_roll_one() {
    let db = Database::open_in_memory().unwrap();
    let term = Term::Semester("3".to_string());

    let subject = db
        .enroll_subject(new_subject("Hark Dhami", "BSc CSIT", term))
        .await
        .unwrap();

    assert_eq!(subject.roll_no, 1);
}

#[tokio::test]
async fn enrollment_continues_from_highest_roll_in_group() {
    let db = Database::open_in_memory().unwrap();
    let term = Term::Semester("3".to_string());

    for name in ["Hark Dhami", "Janak Saud", "Suresh Raj Pant"] {
        db.enroll_subject(new_subject(name, "BSc CSIT", term.clone()))
            .await
            .unwrap();
    }

    let next = db
        .enroll_subject(new_subject("Deepak Bohora", "BSc CSIT", term))
        .await
        .unwrap();
    assert_eq!(next.roll_no, 4);
}

#[tokio::test]
async fn groups_allocate_independently() {
    let db = Database::open_in_memory().unwrap();

    let a = db
        .enroll_subject(new_subject("A", "BSc CSIT", Term::Semester("3".to_string())))
        .await
        .unwrap();
    let b = db
        .enroll_subject(new_subject("B", "BSc CSIT", Term::Semester("5".to_string())))
        .await
        .unwrap();
    let c = db
        .enroll_subject(new_subject("C", "BBA", Term::Semester("3".to_string())))
        .await
        .unwrap();
    let d = db
        .enroll_subject(new_subject("D", "BE Civil", Term::Year("2".to_string())))
        .await
        .unwrap();

    // Every group is empty, so everyone gets roll 1.
    assert_eq!(a.roll_no, 1);
    assert_eq!(b.roll_no, 1);
    assert_eq!(c.roll_no, 1);
    assert_eq!(d.roll_no, 1);
}

#[tokio::test]
async fn explicit_duplicate_roll_is_rejected() {
    let db = Database::open_in_memory().unwrap();
    let term = Term::Semester("3".to_string());

    for name in ["A", "B", "C"] {
        db.enroll_subject(new_subject(name, "BSc CSIT", term.clone()))
            .await
            .unwrap();
    }

    let result = db
        .insert_subject(&explicit_subject("BSc CSIT", term.clone(), 2))
        .await;
    assert!(result.is_err());

    // The same roll in an untouched group is fine.
    db.insert_subject(&explicit_subject("BBA", term, 2))
        .await
        .unwrap();
}

#[tokio::test]
async fn catalog_load_returns_subjects_in_enrollment_order() {
    let db = Database::open_in_memory().unwrap();
    let term = Term::Year("1".to_string());

    let names = ["First", "Second", "Third"];
    for name in names {
        db.enroll_subject(new_subject(name, "BE Computer", term.clone()))
            .await
            .unwrap();
    }

    let listed = db.list_subjects().await.unwrap();
    let listed_names: Vec<&str> = listed.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(listed_names, names);
}

use std::sync::LazyLock;

use chrono::{TimeZone, Utc};
use portfolio_models::contact::{Contact, ContactSubmission};
use serde_json::json;

pub static FOO_SUBMISSION: LazyLock<ContactSubmission> = LazyLock::new(|| ContactSubmission {
    name: "Al".try_into().unwrap(),
    email: "a@b.com".parse().unwrap(),
    subject: "Hello there".try_into().unwrap(),
    message: "This is a test message.".try_into().unwrap(),
});

pub static FOO: LazyLock<Contact> = LazyLock::new(|| Contact {
    id: 1.into(),
    submission: FOO_SUBMISSION.clone(),
    created_at: Utc.with_ymd_and_hms(2024, 3, 14, 13, 37, 42).unwrap(),
});

pub static BAR_SUBMISSION: LazyLock<ContactSubmission> = LazyLock::new(|| ContactSubmission {
    name: "Max Mustermann".try_into().unwrap(),
    email: "max.mustermann@example.de".parse().unwrap(),
    subject: "Project inquiry".try_into().unwrap(),
    message: "Hi!\nI would like to talk about a project.\n\nBest regards,\nMax"
        .try_into()
        .unwrap(),
});

pub static BAR: LazyLock<Contact> = LazyLock::new(|| Contact {
    id: 2.into(),
    submission: BAR_SUBMISSION.clone(),
    created_at: Utc.with_ymd_and_hms(2024, 4, 7, 10, 23, 0).unwrap(),
});

/// The request body a client sends for `submission`.
pub fn submission_json(submission: &ContactSubmission) -> serde_json::Value {
    json!({
        "name": submission.name.as_str(),
        "email": submission.email.as_str(),
        "subject": submission.subject.as_str(),
        "message": submission.message.as_str(),
    })
}

/// A request body violating the length rules of name, subject and message.
pub fn invalid_submission_json() -> serde_json::Value {
    json!({
        "name": "A",
        "email": "a@b.com",
        "subject": "Hi",
        "message": "short",
    })
}

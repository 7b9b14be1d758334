use chrono::{DateTime, Utc};
use portfolio_models::contact::Contact;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiContact {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<Contact> for ApiContact {
    fn from(value: Contact) -> Self {
        let submission = value.submission;
        Self {
            id: *value.id,
            name: submission.name.into_inner(),
            email: submission.email.as_str().into(),
            subject: submission.subject.into_inner(),
            message: submission.message.into_inner(),
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiContactSubmitResponse {
    pub message: &'static str,
    pub contact: ApiContact,
    /// Whether the site owner has been notified.
    pub email_sent: bool,
}

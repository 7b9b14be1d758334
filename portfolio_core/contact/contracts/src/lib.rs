use std::future::Future;

use portfolio_models::{contact::Contact, schema::ValidationError};
use thiserror::Error;

use crate::notification::NotificationOutcome;

pub mod notification;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactFeatureService: Send + Sync + 'static {
    /// Validate, store and announce a contact form submission.
    ///
    /// Once the contact has been stored this succeeds, whether or not the
    /// notification could be delivered.
    fn submit(
        &self,
        input: serde_json::Value,
    ) -> impl Future<Output = Result<ContactSubmitted, ContactSubmitError>> + Send;

    /// Return all stored contacts ordered by id.
    fn list_contacts(&self) -> impl Future<Output = Result<Vec<Contact>, ContactListError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmitted {
    pub contact: Contact,
    pub notification: NotificationOutcome,
}

#[derive(Debug, Error)]
pub enum ContactSubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ContactListError {
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockContactFeatureService {
    pub fn with_submit(
        mut self,
        input: serde_json::Value,
        result: Result<ContactSubmitted, ContactSubmitError>,
    ) -> Self {
        self.expect_submit()
            .once()
            .with(mockall::predicate::eq(input))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }

    pub fn with_list_contacts(mut self, result: Result<Vec<Contact>, ContactListError>) -> Self {
        self.expect_list_contacts()
            .once()
            .return_once(move || Box::pin(std::future::ready(result)));
        self
    }
}

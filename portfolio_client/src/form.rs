use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use portfolio_models::schema::{ContactField, ValidationError, CONTACT_SCHEMA};
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ContactApiError, ContactApiService, ContactFormValues, ContactSubmitResponse};

pub const SUCCESS_TITLE: &str = "Message sent successfully!";
pub const FAILURE_TITLE: &str = "Failed to send message";
pub const FAILURE_FALLBACK: &str = "There was a problem sending your message. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Validating,
    /// A request is in flight, further submits are refused.
    Submitting,
    Succeeded(Feedback),
    Failed(Feedback),
}

/// The notice shown to the visitor after a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Error)]
pub enum ContactFormError {
    #[error("A submission is already in progress")]
    Busy,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// The contact form.
///
/// Clones share the same state.
#[derive(Debug)]
pub struct ContactForm<Api> {
    api: Arc<Api>,
    owner_name: Arc<str>,
    inner: Arc<Mutex<FormInner>>,
}

impl<Api> Clone for ContactForm<Api> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            owner_name: Arc::clone(&self.owner_name),
            inner: Arc::clone(&self.inner),
        }
    }
}

#[derive(Debug)]
struct FormInner {
    values: ContactFormValues,
    errors: BTreeMap<ContactField, Vec<String>>,
    state: FormState,
}

impl<Api: ContactApiService> ContactForm<Api> {
    pub fn new(api: Api, owner_name: &str) -> Self {
        Self {
            api: Arc::new(api),
            owner_name: owner_name.into(),
            inner: Arc::new(Mutex::new(FormInner {
                values: ContactFormValues::default(),
                errors: BTreeMap::new(),
                state: FormState::Idle,
            })),
        }
    }

    pub fn state(&self) -> FormState {
        self.lock().state.clone()
    }

    pub fn values(&self) -> ContactFormValues {
        self.lock().values.clone()
    }

    /// The messages of all rules the current value of `field` violates.
    pub fn field_errors(&self, field: ContactField) -> Vec<String> {
        self.lock().errors.get(&field).cloned().unwrap_or_default()
    }

    pub fn can_submit(&self) -> bool {
        self.lock().state != FormState::Submitting
    }

    /// Update a field and validate its new value.
    ///
    /// Editing after a submit has finished returns the form to
    /// [`FormState::Idle`].
    pub fn set_field(&self, field: ContactField, value: impl Into<String>) -> Vec<String> {
        let value = value.into();
        let messages = CONTACT_SCHEMA
            .check_field(field, &value)
            .into_iter()
            .map(|violation| violation.message.into_owned())
            .collect::<Vec<_>>();

        let mut inner = self.lock();
        *field_mut(&mut inner.values, field) = value;
        if messages.is_empty() {
            inner.errors.remove(&field);
        } else {
            inner.errors.insert(field, messages.clone());
        }
        if matches!(inner.state, FormState::Succeeded(_) | FormState::Failed(_)) {
            inner.state = FormState::Idle;
        }

        messages
    }

    /// Validate the form and send it to the server.
    ///
    /// If validation fails, no request is sent and the form stays editable.
    /// Otherwise the form ends up in [`FormState::Succeeded`] (with cleared
    /// values) or [`FormState::Failed`] (with the values preserved), which is
    /// also returned. Dropping the returned future mid-request leaves the form
    /// in [`FormState::Failed`].
    pub async fn submit(&self) -> Result<FormState, ContactFormError> {
        let values = {
            let mut inner = self.lock();
            if inner.state == FormState::Submitting {
                return Err(ContactFormError::Busy);
            }
            inner.state = FormState::Validating;

            if let Err(err) = CONTACT_SCHEMA.validate(&input_json(&inner.values)) {
                debug!("Contact form is invalid: {err}");
                inner.errors = field_errors(&err);
                inner.state = FormState::Idle;
                return Err(err.into());
            }

            inner.errors.clear();
            inner.state = FormState::Submitting;
            inner.values.clone()
        };

        let in_flight = InFlight {
            inner: &self.inner,
            finished: false,
        };
        let result = self.api.submit(&values).await;
        in_flight.finish();

        let mut inner = self.lock();
        inner.state = match result {
            Ok(response) => {
                inner.values = ContactFormValues::default();
                FormState::Succeeded(self.success_feedback(&response))
            }
            Err(err) => {
                warn!("Failed to submit contact form: {err:#}");
                FormState::Failed(failure_feedback(err))
            }
        };

        Ok(inner.state.clone())
    }

    /// Clear all fields and return to [`FormState::Idle`].
    ///
    /// Has no effect on the state while a submission is in flight.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.values = ContactFormValues::default();
        inner.errors.clear();
        if inner.state != FormState::Submitting {
            inner.state = FormState::Idle;
        }
    }

    fn success_feedback(&self, response: &ContactSubmitResponse) -> Feedback {
        let description = if response.email_sent {
            format!(
                "Thanks for reaching out. {} will be notified and get back to you soon.",
                self.owner_name
            )
        } else {
            "Thanks for reaching out. Your message was saved, but there was an issue sending the \
             notification email."
                .into()
        };

        Feedback {
            title: SUCCESS_TITLE.into(),
            description,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormInner> {
        lock(&self.inner)
    }
}

/// Marks the form as failed if a submit future is dropped while its request is
/// still in flight.
struct InFlight<'a> {
    inner: &'a Mutex<FormInner>,
    finished: bool,
}

impl InFlight<'_> {
    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        let mut inner = lock(self.inner);
        if inner.state == FormState::Submitting {
            debug!("Contact form submission was cancelled");
            inner.state = FormState::Failed(fallback_feedback());
        }
    }
}

fn lock(inner: &Mutex<FormInner>) -> MutexGuard<'_, FormInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn fallback_feedback() -> Feedback {
    Feedback {
        title: FAILURE_TITLE.into(),
        description: FAILURE_FALLBACK.into(),
    }
}

fn failure_feedback(err: ContactApiError) -> Feedback {
    match err {
        ContactApiError::Rejected {
            message: Some(message),
            ..
        } => Feedback {
            title: FAILURE_TITLE.into(),
            description: message,
        },
        ContactApiError::Rejected { message: None, .. } | ContactApiError::Other(_) => {
            fallback_feedback()
        }
    }
}

fn field_mut(values: &mut ContactFormValues, field: ContactField) -> &mut String {
    match field {
        ContactField::Name => &mut values.name,
        ContactField::Email => &mut values.email,
        ContactField::Subject => &mut values.subject,
        ContactField::Message => &mut values.message,
    }
}

fn field_errors(err: &ValidationError) -> BTreeMap<ContactField, Vec<String>> {
    err.violations
        .iter()
        .fold(BTreeMap::new(), |mut errors, violation| {
            if let Some(field) = violation.field {
                errors
                    .entry(field)
                    .or_insert_with(Vec::new)
                    .push(violation.message.clone().into_owned());
            }
            errors
        })
}

fn input_json(values: &ContactFormValues) -> serde_json::Value {
    serde_json::json!({
        "name": values.name,
        "email": values.email,
        "subject": values.subject,
        "message": values.message,
    })
}

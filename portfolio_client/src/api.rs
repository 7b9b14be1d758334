use std::{future::Future, sync::Arc};

use anyhow::Context;
use chrono::{DateTime, Utc};
use portfolio_utils::trace_instrument;
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::http::HttpClient;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait ContactApiService: Send + Sync + 'static {
    /// Send a contact form submission to the server.
    fn submit(
        &self,
        values: &ContactFormValues,
    ) -> impl Future<Output = Result<ContactSubmitResponse, ContactApiError>> + Send;

    /// Fetch all stored contacts.
    fn list_contacts(
        &self,
    ) -> impl Future<Output = Result<Vec<ContactRecord>, ContactApiError>> + Send;
}

/// The raw values of the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFormValues {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmitResponse {
    pub message: String,
    pub contact: ContactRecord,
    pub email_sent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum ContactApiError {
    /// The server answered with an error status. `message` is the message
    /// from the response body, if there was one.
    #[error("Request failed with status {status}")]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(any(test, feature = "mock"))]
impl MockContactApiService {
    pub fn with_submit(
        mut self,
        values: ContactFormValues,
        result: Result<ContactSubmitResponse, ContactApiError>,
    ) -> Self {
        self.expect_submit()
            .once()
            .with(mockall::predicate::eq(values))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }
}

#[derive(Debug, Clone)]
pub struct ContactApiServiceImpl {
    base_url: Arc<Url>,
    client: HttpClient,
}

impl ContactApiServiceImpl {
    /// Endpoints are resolved relative to `base_url`, so a base url with a path
    /// needs a trailing slash (`https://example.com/portfolio/`).
    pub fn new(base_url: Url) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            client: HttpClient::new()?,
        })
    }

    fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Failed to build url for {path}"))
    }
}

impl ContactApiService for ContactApiServiceImpl {
    #[trace_instrument(skip(self, values))]
    async fn submit(
        &self,
        values: &ContactFormValues,
    ) -> Result<ContactSubmitResponse, ContactApiError> {
        let response = self
            .client
            .post(self.endpoint("api/contact")?)
            .json(values)
            .send()
            .await
            .context("Failed to send contact submission")?;

        parse_response(response).await
    }

    #[trace_instrument(skip(self))]
    async fn list_contacts(&self) -> Result<Vec<ContactRecord>, ContactApiError> {
        let response = self
            .client
            .get(self.endpoint("api/contacts")?)
            .send()
            .await
            .context("Failed to fetch contacts")?;

        parse_response(response).await
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    response: Response,
) -> Result<T, ContactApiError> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .map(|body| body.message);
        return Err(ContactApiError::Rejected { status, message });
    }

    response
        .json()
        .await
        .context("Failed to parse response")
        .map_err(Into::into)
}

use std::future::Future;

use portfolio_models::email_address::EmailAddressWithName;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait EmailService: Send + Sync + 'static {
    /// Send an email.
    ///
    /// Returns the server's acceptance reply if the email has been accepted
    /// for delivery and `None` if the server refused it.
    fn send(
        &self,
        email: Email,
    ) -> impl Future<Output = anyhow::Result<Option<EmailReceipt>>> + Send;

    fn ping(&self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// A plain text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub recipient: EmailAddressWithName,
    pub subject: String,
    pub body: String,
    pub reply_to: Option<EmailAddressWithName>,
}

/// The reply of a mail server which accepted an email, e.g.
/// `2.0.0 Ok: queued as 4XJ3k`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailReceipt(pub String);

#[cfg(feature = "mock")]
impl MockEmailService {
    pub fn with_send(mut self, email: Email, result: Option<EmailReceipt>) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(email))
            .return_once(move |_| Box::pin(std::future::ready(Ok(result))));
        self
    }

    pub fn with_send_error(mut self) -> Self {
        self.expect_send().once().return_once(|_| {
            Box::pin(std::future::ready(Err(anyhow::anyhow!(
                "connection refused"
            ))))
        });
        self
    }

    pub fn with_ping(mut self, ok: bool) -> Self {
        self.expect_ping().once().return_once(move || {
            Box::pin(std::future::ready(if ok {
                Ok(())
            } else {
                Err(anyhow::anyhow!("Failed to ping smtp server"))
            }))
        });
        self
    }
}

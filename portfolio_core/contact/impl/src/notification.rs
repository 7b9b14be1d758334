use std::{sync::Arc, time::Duration};

use portfolio_core_contact_contracts::notification::{
    ContactNotificationService, NotificationOutcome,
};
use portfolio_email_contracts::{Email, EmailService};
use portfolio_models::{contact::Contact, email_address::EmailAddressWithName};
use portfolio_utils::trace_instrument;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ContactNotificationServiceImpl<Email> {
    email: Email,
    config: ContactNotificationConfig,
}

#[derive(Debug, Clone)]
pub struct ContactNotificationConfig {
    pub recipient: Arc<EmailAddressWithName>,
    /// Upper bound for the whole delivery attempt.
    pub timeout: Duration,
}

impl<Email> ContactNotificationServiceImpl<Email> {
    pub fn new(email: Email, config: ContactNotificationConfig) -> Self {
        Self { email, config }
    }
}

impl<EmailS> ContactNotificationService for ContactNotificationServiceImpl<EmailS>
where
    EmailS: EmailService,
{
    #[trace_instrument(skip(self, contact), fields(id = %contact.id))]
    async fn send_contact_notification(&self, contact: &Contact) -> NotificationOutcome {
        let email = notification_email((*self.config.recipient).clone(), contact);

        match tokio::time::timeout(self.config.timeout, self.email.send(email)).await {
            Ok(Ok(Some(receipt))) => {
                info!(reference = %receipt.0, "Sent contact notification");
                NotificationOutcome::Delivered(receipt.0)
            }
            Ok(Ok(None)) => {
                warn!("Mail server refused contact notification");
                NotificationOutcome::Failed
            }
            Ok(Err(err)) => {
                warn!("Failed to send contact notification: {err:#}");
                NotificationOutcome::Failed
            }
            Err(_) => {
                warn!(
                    "Sending contact notification timed out after {:?}",
                    self.config.timeout
                );
                NotificationOutcome::Failed
            }
        }
    }
}

fn notification_email(recipient: EmailAddressWithName, contact: &Contact) -> Email {
    let submission = &contact.submission;
    Email {
        recipient,
        subject: format!("New Contact Form Submission: {}", *submission.subject),
        body: format!(
            "New Contact Form Submission\n\nName: {}\nEmail: {}\nSubject: {}\nSubmitted on: \
             {}\n\nMessage:\n{}\n",
            *submission.name,
            submission.email,
            *submission.subject,
            contact.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            *submission.message,
        ),
        reply_to: Some(
            submission
                .email
                .clone()
                .with_name((*submission.name).clone()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use portfolio_demo::contact::{BAR, FOO};
    use portfolio_email_contracts::{EmailReceipt, MockEmailService};
    use pretty_assertions::assert_eq;

    use super::*;

    fn config() -> ContactNotificationConfig {
        ContactNotificationConfig {
            recipient: Arc::new("Site Owner <owner@example.com>".parse().unwrap()),
            timeout: Duration::from_secs(8),
        }
    }

    fn bar_email() -> Email {
        Email {
            recipient: "Site Owner <owner@example.com>".parse().unwrap(),
            subject: "New Contact Form Submission: Project inquiry".into(),
            body: "New Contact Form Submission\n\nName: Max Mustermann\nEmail: \
                   max.mustermann@example.de\nSubject: Project inquiry\nSubmitted on: 2024-04-07 \
                   10:23:00 UTC\n\nMessage:\nHi!\nI would like to talk about a project.\n\nBest \
                   regards,\nMax\n"
                .into(),
            reply_to: Some(
                "Max Mustermann <max.mustermann@example.de>"
                    .parse()
                    .unwrap(),
            ),
        }
    }

    #[tokio::test]
    async fn delivered() {
        // Arrange
        let email = MockEmailService::new().with_send(
            bar_email(),
            Some(EmailReceipt("2.0.0 Ok: queued as 4XJ3k".into())),
        );
        let sut = ContactNotificationServiceImpl::new(email, config());

        // Act
        let result = sut.send_contact_notification(&BAR).await;

        // Assert
        assert_eq!(
            result,
            NotificationOutcome::Delivered("2.0.0 Ok: queued as 4XJ3k".into())
        );
    }

    #[tokio::test]
    async fn refused() {
        let email = MockEmailService::new().with_send(bar_email(), None);
        let sut = ContactNotificationServiceImpl::new(email, config());

        let result = sut.send_contact_notification(&BAR).await;

        assert_eq!(result, NotificationOutcome::Failed);
    }

    #[tokio::test]
    async fn transport_error() {
        let email = MockEmailService::new().with_send_error();
        let sut = ContactNotificationServiceImpl::new(email, config());

        let result = sut.send_contact_notification(&FOO).await;

        assert_eq!(result, NotificationOutcome::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout() {
        // Arrange
        let mut email = MockEmailService::new();
        email
            .expect_send()
            .once()
            .return_once(|_| {
                Box::pin(std::future::pending::<anyhow::Result<Option<EmailReceipt>>>())
            });
        let sut = ContactNotificationServiceImpl::new(email, config());

        // Act
        let result = sut.send_contact_notification(&FOO).await;

        // Assert
        assert_eq!(result, NotificationOutcome::Failed);
    }
}

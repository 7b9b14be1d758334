use std::future::Future;

use portfolio_models::contact::Contact;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactNotificationService: Send + Sync + 'static {
    /// Tell the site owner about a new contact.
    ///
    /// Never fails: any problem is logged and reported as
    /// [`NotificationOutcome::Failed`].
    fn send_contact_notification(
        &self,
        contact: &Contact,
    ) -> impl Future<Output = NotificationOutcome> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// The mail server accepted the notification and replied with the given
    /// reference.
    Delivered(String),
    Failed,
}

impl NotificationOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

#[cfg(feature = "mock")]
impl MockContactNotificationService {
    pub fn with_send_contact_notification(
        mut self,
        contact: Contact,
        result: NotificationOutcome,
    ) -> Self {
        self.expect_send_contact_notification()
            .once()
            .with(mockall::predicate::eq(contact))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }
}

use std::future::Future;

use portfolio_models::contact::{Contact, ContactSubmission};

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactRepository<Txn: Send + Sync + 'static>: Send + Sync + 'static {
    /// Store a new contact.
    ///
    /// The repository assigns the id and the creation timestamp. The contact
    /// becomes visible to other transactions once `txn` is committed.
    fn create(
        &self,
        txn: &mut Txn,
        submission: &ContactSubmission,
    ) -> impl Future<Output = anyhow::Result<Contact>> + Send;

    /// Return all contacts ordered by id.
    fn list(&self, txn: &mut Txn) -> impl Future<Output = anyhow::Result<Vec<Contact>>> + Send;
}

#[cfg(feature = "mock")]
impl<Txn: Send + Sync + 'static> MockContactRepository<Txn> {
    pub fn with_create(mut self, submission: ContactSubmission, result: Contact) -> Self {
        self.expect_create()
            .once()
            .with(
                mockall::predicate::always(),
                mockall::predicate::eq(submission),
            )
            .return_once(|_, _| Box::pin(std::future::ready(Ok(result))));
        self
    }

    pub fn with_create_error(mut self) -> Self {
        self.expect_create().once().return_once(|_, _| {
            Box::pin(std::future::ready(Err(anyhow::anyhow!(
                "contact store is unavailable"
            ))))
        });
        self
    }

    pub fn with_list(mut self, result: Vec<Contact>) -> Self {
        self.expect_list()
            .once()
            .return_once(|_| Box::pin(std::future::ready(Ok(result))));
        self
    }
}

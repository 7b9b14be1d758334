use portfolio_core_contact_contracts::{
    notification::ContactNotificationService, ContactFeatureService, ContactListError,
    ContactSubmitError, ContactSubmitted,
};
use portfolio_models::{contact::Contact, schema::CONTACT_SCHEMA};
use portfolio_persistence_contracts::{contact::ContactRepository, Database, Transaction};
use portfolio_utils::trace_instrument;
use tracing::{debug, info};

pub mod notification;


#[derive(Debug, Clone)]
pub struct ContactFeatureServiceImpl<Db, ContactRepo, Notification> {
    db: Db,
    contact_repo: ContactRepo,
    notification: Notification,
}

impl<Db, ContactRepo, Notification> ContactFeatureServiceImpl<Db, ContactRepo, Notification> {
    pub fn new(db: Db, contact_repo: ContactRepo, notification: Notification) -> Self {
        Self {
            db,
            contact_repo,
            notification,
        }
    }
}

impl<Db, ContactRepo, Notification> ContactFeatureService
    for ContactFeatureServiceImpl<Db, ContactRepo, Notification>
where
    Db: Database,
    ContactRepo: ContactRepository<Db::Transaction>,
    Notification: ContactNotificationService,
{
    #[trace_instrument(skip(self, input))]
    async fn submit(
        &self,
        input: serde_json::Value,
    ) -> Result<ContactSubmitted, ContactSubmitError> {
        let submission = CONTACT_SCHEMA
            .validate(&input)
            .inspect_err(|err| debug!("Rejected contact submission: {err}"))?;

        let mut txn = self.db.begin_transaction().await?;
        let contact = self.contact_repo.create(&mut txn, &submission).await?;
        txn.commit().await?;

        info!(id = %contact.id, "Stored contact");

        let notification = self.notification.send_contact_notification(&contact).await;

        Ok(ContactSubmitted {
            contact,
            notification,
        })
    }

    #[trace_instrument(skip(self))]
    async fn list_contacts(&self) -> Result<Vec<Contact>, ContactListError> {
        let mut txn = self.db.begin_transaction().await?;
        self.contact_repo
            .list(&mut txn)
            .await
            .map_err(Into::into)
    }
}

use portfolio_models::contact::{Contact, ContactSubmission};
use portfolio_persistence_contracts::contact::ContactRepository;

use crate::{insert_sorted, MemoryTransaction};

#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryContactRepository;

impl ContactRepository<MemoryTransaction> for MemoryContactRepository {
    async fn create(
        &self,
        txn: &mut MemoryTransaction,
        submission: &ContactSubmission,
    ) -> anyhow::Result<Contact> {
        let (id, created_at) = txn.state.tick();

        let contact = Contact {
            id: id.into(),
            submission: submission.clone(),
            created_at,
        };
        txn.pending.push(contact.clone());

        Ok(contact)
    }

    async fn list(&self, txn: &mut MemoryTransaction) -> anyhow::Result<Vec<Contact>> {
        let mut contacts = txn.state.contacts.read().await.clone();
        insert_sorted(&mut contacts, txn.pending.clone());
        Ok(contacts)
    }
}

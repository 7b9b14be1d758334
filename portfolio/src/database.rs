use portfolio_config::PersistenceConfig;
use portfolio_persistence_memory::{MemoryDatabase, MemoryDatabaseConfig};

/// Open the contact store, restoring its snapshot if configured.
pub async fn open(config: &PersistenceConfig) -> anyhow::Result<MemoryDatabase> {
    MemoryDatabase::open(MemoryDatabaseConfig {
        snapshot_path: config.snapshot_path.clone(),
        max_contacts: config.max_contacts,
    })
    .await
}

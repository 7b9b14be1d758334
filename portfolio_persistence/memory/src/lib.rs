use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use anyhow::{ensure, Context};
use chrono::{DateTime, Utc};
use portfolio_models::contact::Contact;
use portfolio_persistence_contracts::{Database, Transaction};
use portfolio_utils::trace_instrument;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, trace};

pub mod contact;

/// A database keeping all records in memory.
///
/// If a snapshot path is configured, the complete state is written to that
/// file on every commit and restored by [`MemoryDatabase::open`].
#[derive(Debug, Clone)]
pub struct MemoryDatabase {
    state: Arc<State>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDatabaseConfig {
    pub snapshot_path: Option<PathBuf>,
    pub max_contacts: Option<usize>,
}

#[derive(Debug)]
struct State {
    config: MemoryDatabaseConfig,
    clock: Mutex<Clock>,
    /// Committed contacts, sorted by id.
    contacts: RwLock<Vec<Contact>>,
}

/// Hands out ids together with creation timestamps, so that ordering by id
/// never disagrees with ordering by `created_at`.
#[derive(Debug)]
struct Clock {
    next_id: u64,
    last: Option<DateTime<Utc>>,
}

impl Clock {
    fn tick(&mut self) -> (u64, DateTime<Utc>) {
        let id = self.next_id;
        self.next_id += 1;

        let now = self.last.map_or_else(Utc::now, |last| Utc::now().max(last));
        self.last = Some(now);

        (id, now)
    }
}

impl State {
    fn clock(&self) -> MutexGuard<'_, Clock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reserve the id and timestamp of a new record.
    fn tick(&self) -> (u64, DateTime<Utc>) {
        self.clock().tick()
    }
}

#[derive(Serialize, Deserialize)]
struct Snapshot<C> {
    next_id: u64,
    contacts: C,
}

impl MemoryDatabase {
    pub fn new(config: MemoryDatabaseConfig) -> Self {
        Self::from_parts(config, 1, Vec::new())
    }

    /// Create a database and restore the snapshot, if one has been configured
    /// and exists.
    pub async fn open(config: MemoryDatabaseConfig) -> anyhow::Result<Self> {
        let Some(path) = config.snapshot_path.as_deref() else {
            return Ok(Self::new(config));
        };

        let content = match tokio::fs::read(path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("No snapshot found at {}, starting empty", path.display());
                return Ok(Self::new(config));
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to read snapshot at {}", path.display())
                })
            }
        };

        let Snapshot {
            next_id,
            mut contacts,
        } = serde_json::from_slice::<Snapshot<Vec<Contact>>>(&content)
            .with_context(|| format!("Failed to parse snapshot at {}", path.display()))?;
        contacts.sort_by_key(|c| c.id);

        let next_id = contacts
            .last()
            .map(|c| *c.id + 1)
            .unwrap_or(1)
            .max(next_id);

        info!(
            "Restored {} contacts from snapshot at {}",
            contacts.len(),
            path.display()
        );

        Ok(Self::from_parts(config, next_id, contacts))
    }

    fn from_parts(config: MemoryDatabaseConfig, next_id: u64, contacts: Vec<Contact>) -> Self {
        Self {
            state: Arc::new(State {
                config,
                clock: Mutex::new(Clock {
                    next_id,
                    last: contacts.iter().map(|c| c.created_at).max(),
                }),
                contacts: RwLock::new(contacts),
            }),
        }
    }

    /// Return the number of committed contacts.
    pub async fn len(&self) -> usize {
        self.state.contacts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Database for MemoryDatabase {
    type Transaction = MemoryTransaction;

    async fn begin_transaction(&self) -> anyhow::Result<Self::Transaction> {
        trace!("begin transaction");

        Ok(MemoryTransaction {
            state: Arc::clone(&self.state),
            pending: Vec::new(),
        })
    }

    #[trace_instrument(skip(self))]
    async fn ping(&self) -> anyhow::Result<()> {
        let Some(path) = self.state.config.snapshot_path.as_deref() else {
            return Ok(());
        };

        let dir = snapshot_dir(path);
        let metadata = tokio::fs::metadata(dir)
            .await
            .with_context(|| format!("Failed to access snapshot directory {}", dir.display()))?;
        ensure!(
            metadata.is_dir(),
            "Snapshot directory {} is not a directory",
            dir.display()
        );

        Ok(())
    }
}

/// Records staged by a transaction.
///
/// Dropping the transaction without committing discards them.
#[derive(Debug)]
pub struct MemoryTransaction {
    state: Arc<State>,
    pending: Vec<Contact>,
}

impl Transaction for MemoryTransaction {
    async fn commit(self) -> anyhow::Result<()> {
        trace!("commit transaction");

        let Self { state, pending } = self;
        if pending.is_empty() {
            return Ok(());
        }

        let mut contacts = state.contacts.write().await;

        if let Some(max) = state.config.max_contacts {
            ensure!(
                contacts.len() + pending.len() <= max,
                "contact store is full ({max} contacts)"
            );
        }

        match state.config.snapshot_path.as_deref() {
            Some(path) => {
                let mut next = contacts.clone();
                insert_sorted(&mut next, pending);
                let next_id = state.clock().next_id;
                write_snapshot(path, next_id, &next)
                    .await
                    .context("Failed to commit transaction")?;
                *contacts = next;
            }
            None => insert_sorted(&mut contacts, pending),
        }

        Ok(())
    }

    async fn rollback(self) -> anyhow::Result<()> {
        trace!("rollback transaction");
        Ok(())
    }
}

fn insert_sorted(contacts: &mut Vec<Contact>, new: Vec<Contact>) {
    for contact in new {
        let idx = contacts.partition_point(|c| c.id < contact.id);
        contacts.insert(idx, contact);
    }
}

fn snapshot_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

async fn write_snapshot(path: &Path, next_id: u64, contacts: &[Contact]) -> anyhow::Result<()> {
    let content = serde_json::to_vec(&Snapshot { next_id, contacts })?;

    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, content)
        .await
        .with_context(|| format!("Failed to write snapshot to {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to move snapshot to {}", path.display()))?;

    trace!(path = %path.display(), "wrote snapshot");

    Ok(())
}

use std::{collections::HashSet, path::PathBuf};

use portfolio_demo::contact::{BAR_SUBMISSION, FOO_SUBMISSION};
use portfolio_persistence_contracts::{contact::ContactRepository, Database, Transaction};
use portfolio_persistence_memory::{
    contact::MemoryContactRepository, MemoryDatabase, MemoryDatabaseConfig,
};
use pretty_assertions::assert_eq;
use uuid::Uuid;

const REPO: MemoryContactRepository = MemoryContactRepository;

#[tokio::test]
async fn create_and_list() {
    let db = MemoryDatabase::new(Default::default());

    let mut txn = db.begin_transaction().await.unwrap();
    let foo = REPO.create(&mut txn, &FOO_SUBMISSION).await.unwrap();
    let bar = REPO.create(&mut txn, &BAR_SUBMISSION).await.unwrap();
    txn.commit().await.unwrap();

    assert_eq!(*foo.id, 1);
    assert_eq!(*bar.id, 2);
    assert_eq!(foo.submission, *FOO_SUBMISSION);
    assert!(foo.created_at <= bar.created_at);

    let mut txn = db.begin_transaction().await.unwrap();
    let result = REPO.list(&mut txn).await.unwrap();
    assert_eq!(result, [foo, bar]);
}

#[tokio::test]
async fn identical_submissions_are_distinct_records() {
    let db = MemoryDatabase::new(Default::default());

    let mut txn = db.begin_transaction().await.unwrap();
    let first = REPO.create(&mut txn, &FOO_SUBMISSION).await.unwrap();
    let second = REPO.create(&mut txn, &FOO_SUBMISSION).await.unwrap();
    txn.commit().await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(db.len().await, 2);
}

#[tokio::test]
async fn uncommitted_contacts_are_isolated() {
    let db = MemoryDatabase::new(Default::default());

    let mut txn = db.begin_transaction().await.unwrap();
    let foo = REPO.create(&mut txn, &FOO_SUBMISSION).await.unwrap();

    assert_eq!(REPO.list(&mut txn).await.unwrap(), [foo.clone()]);

    let mut other = db.begin_transaction().await.unwrap();
    assert!(REPO.list(&mut other).await.unwrap().is_empty());
    assert!(db.is_empty().await);

    txn.commit().await.unwrap();
    assert_eq!(REPO.list(&mut other).await.unwrap(), [foo]);
}

#[tokio::test]
async fn rollback_discards_contacts() {
    let db = MemoryDatabase::new(Default::default());

    let mut txn = db.begin_transaction().await.unwrap();
    let rolled_back = REPO.create(&mut txn, &FOO_SUBMISSION).await.unwrap();
    txn.rollback().await.unwrap();

    let mut txn = db.begin_transaction().await.unwrap();
    REPO.create(&mut txn, &BAR_SUBMISSION).await.unwrap();
    drop(txn);

    assert!(db.is_empty().await);

    let mut txn = db.begin_transaction().await.unwrap();
    let created = REPO.create(&mut txn, &BAR_SUBMISSION).await.unwrap();
    txn.commit().await.unwrap();

    assert!(created.id > rolled_back.id);
    assert_eq!(db.len().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_get_unique_increasing_ids() {
    let db = MemoryDatabase::new(Default::default());

    let tasks = (0..64)
        .map(|_| {
            let db = db.clone();
            tokio::spawn(async move {
                let mut txn = db.begin_transaction().await.unwrap();
                let contact = REPO.create(&mut txn, &FOO_SUBMISSION).await.unwrap();
                txn.commit().await.unwrap();
                contact.id
            })
        })
        .collect::<Vec<_>>();

    let mut ids = HashSet::new();
    for task in tasks {
        assert!(ids.insert(task.await.unwrap()));
    }
    assert_eq!(ids.len(), 64);

    let mut txn = db.begin_transaction().await.unwrap();
    let listed = REPO.list(&mut txn).await.unwrap();
    assert_eq!(
        listed.iter().map(|c| *c.id).collect::<Vec<_>>(),
        (1..=64).collect::<Vec<_>>()
    );
    assert!(listed
        .windows(2)
        .all(|w| w[0].created_at <= w[1].created_at));
}

#[tokio::test]
async fn max_contacts() {
    let db = MemoryDatabase::new(MemoryDatabaseConfig {
        max_contacts: Some(1),
        ..Default::default()
    });

    let mut txn = db.begin_transaction().await.unwrap();
    REPO.create(&mut txn, &FOO_SUBMISSION).await.unwrap();
    txn.commit().await.unwrap();

    let mut txn = db.begin_transaction().await.unwrap();
    REPO.create(&mut txn, &BAR_SUBMISSION).await.unwrap();
    let err = txn.commit().await.unwrap_err();

    assert!(err.to_string().contains("full"), "{err}");
    assert_eq!(db.len().await, 1);
}

#[tokio::test]
async fn snapshot_survives_restart() {
    let dir = TempDir::new();
    let config = MemoryDatabaseConfig {
        snapshot_path: Some(dir.0.join("contacts.json")),
        max_contacts: None,
    };

    let db = MemoryDatabase::open(config.clone()).await.unwrap();
    db.ping().await.unwrap();

    let mut txn = db.begin_transaction().await.unwrap();
    let foo = REPO.create(&mut txn, &FOO_SUBMISSION).await.unwrap();
    let bar = REPO.create(&mut txn, &BAR_SUBMISSION).await.unwrap();
    txn.commit().await.unwrap();
    drop(db);

    let db = MemoryDatabase::open(config).await.unwrap();
    let mut txn = db.begin_transaction().await.unwrap();
    assert_eq!(REPO.list(&mut txn).await.unwrap(), [foo, bar.clone()]);

    let next = REPO.create(&mut txn, &FOO_SUBMISSION).await.unwrap();
    assert!(next.id > bar.id);
    assert!(next.created_at >= bar.created_at);
}

#[tokio::test]
async fn snapshot_write_failure_fails_commit() {
    let dir = TempDir::new();
    let config = MemoryDatabaseConfig {
        snapshot_path: Some(dir.0.join("missing").join("contacts.json")),
        max_contacts: None,
    };

    let db = MemoryDatabase::open(config).await.unwrap();
    assert!(db.ping().await.is_err());

    let mut txn = db.begin_transaction().await.unwrap();
    REPO.create(&mut txn, &FOO_SUBMISSION).await.unwrap();
    assert!(txn.commit().await.is_err());

    assert!(db.is_empty().await);
}

#[tokio::test]
async fn corrupt_snapshot() {
    let dir = TempDir::new();
    let path = dir.0.join("contacts.json");
    std::fs::write(&path, "not json").unwrap();

    let result = MemoryDatabase::open(MemoryDatabaseConfig {
        snapshot_path: Some(path),
        max_contacts: None,
    })
    .await;

    assert!(result.is_err());
}

struct TempDir(PathBuf);

impl TempDir {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("portfolio-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&path).unwrap();
        Self(path)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

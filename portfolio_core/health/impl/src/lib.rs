use std::{sync::Arc, time::Duration};

use portfolio_core_health_contracts::{HealthFeatureService, HealthStatus};
use portfolio_email_contracts::EmailService;
use portfolio_persistence_contracts::Database;
use portfolio_utils::trace_instrument;
use tokio::{sync::RwLock, time::Instant};
use tracing::error;

#[derive(Debug, Clone)]
pub struct HealthFeatureServiceImpl<Db, Email> {
    db: Db,
    email: Email,
    config: HealthFeatureConfig,
    state: Arc<State>,
}

#[derive(Debug, Clone)]
pub struct HealthFeatureConfig {
    pub cache_ttl: Duration,
    /// Skip the smtp check if notifications are disabled.
    pub check_email: bool,
}

#[derive(Debug, Default)]
struct State {
    cache: RwLock<Option<CachedStatus>>,
}

#[derive(Debug)]
struct CachedStatus {
    status: HealthStatus,
    timestamp: Instant,
}

impl<Db, Email> HealthFeatureServiceImpl<Db, Email> {
    pub fn new(db: Db, email: Email, config: HealthFeatureConfig) -> Self {
        Self {
            db,
            email,
            config,
            state: Default::default(),
        }
    }
}

impl<Db, Email> HealthFeatureService for HealthFeatureServiceImpl<Db, Email>
where
    Db: Database,
    Email: EmailService,
{
    #[trace_instrument(skip(self))]
    async fn get_status(&self) -> HealthStatus {
        let now = Instant::now();
        let cache_guard = self.state.cache.read().await;
        if let Some(cached) = cache_guard
            .as_ref()
            .filter(|c| now < c.timestamp + self.config.cache_ttl)
        {
            return cached.status;
        }
        drop(cache_guard);

        let mut cache_guard = self.state.cache.write().await;
        if let Some(cached) = cache_guard
            .as_ref()
            .filter(|c| now < c.timestamp + self.config.cache_ttl)
        {
            return cached.status;
        }

        let database = self
            .db
            .ping()
            .await
            .inspect_err(|err| error!("Failed to ping database: {err:#}"))
            .is_ok();

        let email = if self.config.check_email {
            let ok = self
                .email
                .ping()
                .await
                .inspect_err(|err| error!("Failed to ping smtp server: {err:#}"))
                .is_ok();
            Some(ok)
        } else {
            None
        };

        let status = HealthStatus { database, email };

        cache_guard
            .insert(CachedStatus {
                status,
                timestamp: now,
            })
            .status
    }
}

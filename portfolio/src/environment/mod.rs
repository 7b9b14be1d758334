use std::sync::Arc;

use portfolio_config::Config;
use portfolio_core_contact_impl::notification::{
    ContactNotificationConfig, ContactNotificationServiceImpl,
};
use portfolio_core_health_impl::HealthFeatureConfig;
use types::{
    ContactFeature, ContactNotification, ContactRepo, Database, Email, HealthFeature, RestServer,
};

pub mod types;

/// Wires the services of the application together.
#[derive(Debug, Clone)]
pub struct Provider {
    database: Database,
    email: Email,
    config: ConfigProvider,
}

impl Provider {
    pub fn new(config: ConfigProvider, database: Database, email: Email) -> Self {
        Self {
            database,
            email,
            config,
        }
    }

    pub fn rest_server(&self) -> RestServer {
        RestServer::new(self.health_feature(), self.contact_feature())
    }

    pub fn health_feature(&self) -> HealthFeature {
        HealthFeature::new(
            self.database.clone(),
            self.email.clone(),
            self.config.health_feature_config.clone(),
        )
    }

    pub fn contact_feature(&self) -> ContactFeature {
        ContactFeature::new(
            self.database.clone(),
            ContactRepo::default(),
            self.contact_notification(),
        )
    }

    pub fn contact_notification(&self) -> ContactNotification {
        ContactNotificationServiceImpl::new(
            self.email.clone(),
            self.config.contact_notification_config.clone(),
        )
    }
}

/// The service configs derived from [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    contact_notification_config: ContactNotificationConfig,
    health_feature_config: HealthFeatureConfig,
}

impl ConfigProvider {
    pub fn new(config: &Config) -> Self {
        let contact_notification_config = ContactNotificationConfig {
            recipient: Arc::new(
                config
                    .contact
                    .email
                    .clone()
                    .with_name(config.contact.owner_name.clone()),
            ),
            timeout: config.contact.notification_timeout.into(),
        };

        let health_feature_config = HealthFeatureConfig {
            cache_ttl: config.health.cache_ttl.into(),
            check_email: config.email.smtp_url.is_some(),
        };

        Self {
            contact_notification_config,
            health_feature_config,
        }
    }
}

use portfolio_core_contact_impl::{
    notification::ContactNotificationServiceImpl, ContactFeatureServiceImpl,
};
use portfolio_core_health_impl::HealthFeatureServiceImpl;
use portfolio_email_impl::EmailServiceImpl;
use portfolio_persistence_memory::{contact::MemoryContactRepository, MemoryDatabase};

// API
pub type RestServer = portfolio_api_rest::RestServer<HealthFeature, ContactFeature>;

// Persistence
pub type Database = MemoryDatabase;
pub type ContactRepo = MemoryContactRepository;

// Email
pub type Email = EmailServiceImpl;

// Core
pub type HealthFeature = HealthFeatureServiceImpl<Database, Email>;
pub type ContactFeature = ContactFeatureServiceImpl<Database, ContactRepo, ContactNotification>;
pub type ContactNotification = ContactNotificationServiceImpl<Email>;

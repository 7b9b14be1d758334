use portfolio_config::EmailConfig;
use portfolio_email_impl::{EmailServiceConfig, EmailServiceImpl};

/// Create the email service. No connection is established until the first
/// email is sent or [`EmailServiceImpl::init`] is called.
pub fn build(config: &EmailConfig) -> EmailServiceImpl {
    EmailServiceImpl::new(EmailServiceConfig {
        smtp_url: config.smtp_url.clone(),
        from: config.from.clone(),
        timeout: config.timeout.into(),
    })
}

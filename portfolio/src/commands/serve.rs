use portfolio_config::Config;
use portfolio_persistence_contracts::Database;
use tracing::{info, warn};

use crate::{
    database, email,
    environment::{ConfigProvider, Provider},
};

pub async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Opening contact store");
    let database = database::open(&config.persistence).await?;
    database.ping().await?;

    let email = email::build(&config.email);
    if config.email.smtp_url.is_some() {
        info!("Connecting to smtp server");
        email.init().await;
    } else {
        warn!("No smtp url configured, contact notifications are disabled");
    }

    let provider = Provider::new(ConfigProvider::new(&config), database, email);
    let server = provider.rest_server();
    info!(
        "Starting http server on {}:{}",
        config.http.host, config.http.port
    );
    server
        .serve(config.http.host, config.http.port, config.http.port_attempts)
        .await
}

use std::{io, net::IpAddr};

use anyhow::{bail, Context};
use axum::Router;
use portfolio_core_contact_contracts::ContactFeatureService;
use portfolio_core_health_contracts::HealthFeatureService;
use tokio::net::TcpListener;
use tracing::{info, warn};

mod errors;
mod middlewares;
mod models;
mod routes;

#[derive(Debug, Clone)]
pub struct RestServer<Health, Contact> {
    health: Health,
    contact: Contact,
}

impl<Health, Contact> RestServer<Health, Contact>
where
    Health: HealthFeatureService,
    Contact: ContactFeatureService,
{
    pub fn new(health: Health, contact: Contact) -> Self {
        Self { health, contact }
    }

    /// Serve on `host:port` until ctrl+c is pressed.
    ///
    /// If `port` is already in use, up to `port_attempts - 1` subsequent ports
    /// are tried.
    pub async fn serve(self, host: IpAddr, port: u16, port_attempts: u16) -> anyhow::Result<()> {
        let listener = bind(host, port, port_attempts).await?;
        info!("Listening on http://{}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(Into::into)
    }

    pub fn router(self) -> Router<()> {
        let router = Router::new()
            .merge(routes::health::router(self.health.into()))
            .merge(routes::contact::router(self.contact.into()));

        let router = middlewares::panic_handler::add(router);
        let router = middlewares::trace::add(router);
        let router = middlewares::request_id::add(router);
        middlewares::cors::add(router)
    }
}

async fn bind(host: IpAddr, port: u16, port_attempts: u16) -> anyhow::Result<TcpListener> {
    for offset in 0..port_attempts.max(1) {
        let Some(port) = port.checked_add(offset) else {
            break;
        };

        match TcpListener::bind((host, port)).await {
            Ok(listener) => return Ok(listener),
            Err(err) if err.kind() == io::ErrorKind::AddrInUse => {
                warn!("Port {port} is already in use");
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to bind to {host}:{port}"))
            }
        }
    }

    bail!("Failed to find a free port in {port}..+{port_attempts} on {host}")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl+c: {err}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

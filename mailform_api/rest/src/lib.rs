use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::Router;
use mailform_core_contact_contracts::ContactFeatureService;
use mailform_core_health_contracts::HealthFeatureService;
use tokio::net::TcpListener;
use tracing::info;

mod errors;
mod extractors;
mod middlewares;
mod models;
mod routes;

#[derive(Debug, Clone)]
pub struct RestServer<Health, Contact> {
    health: Health,
    contact: Contact,
    config: RestServerConfig,
}

#[derive(Debug, Clone)]
pub struct RestServerConfig {
    pub address: SocketAddr,
    pub real_ip: Option<Arc<RealIpConfig>>,
    pub allowed_origins: Vec<String>,
    /// Mount `POST /api/test-email`.
    pub test_email: bool,
}

/// Take the client address from `header`, but only on requests coming from
/// `set_from`.
#[derive(Debug, Clone)]
pub struct RealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

impl<Health, Contact> RestServer<Health, Contact>
where
    Health: HealthFeatureService,
    Contact: ContactFeatureService,
{
    pub fn new(health: Health, contact: Contact, config: RestServerConfig) -> Self {
        Self {
            health,
            contact,
            config,
        }
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let address = self.config.address;
        let router = self.router();
        let listener = TcpListener::bind(address)
            .await
            .with_context(|| format!("Failed to bind to {address}"))?;

        info!(%address, "listening for http requests");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(Into::into)
    }

    fn router(self) -> Router<()> {
        let api = Router::new()
            .merge(routes::health::router(self.health.into()))
            .merge(routes::contact::router(
                self.contact.into(),
                self.config.test_email,
            ));

        let router = Router::new()
            .nest("/api", api)
            .fallback(routes::not_found);

        let router = middlewares::panic_handler::add(router);
        let router = middlewares::trace::add(router);
        let router = middlewares::client_ip::add(self.config.real_ip)(router);
        let router = middlewares::request_id::add(router);
        middlewares::cors::add(&self.config.allowed_origins)(router)
    }
}

use std::sync::Arc;

use mailform_api_rest::{RealIpConfig, RestServerConfig};
use mailform_config::Config;
use mailform_core_contact_impl::{
    compose::{ContactComposeServiceConfig, ContactComposeServiceImpl},
    ContactFeatureConfig, ContactFeatureServiceImpl,
};
use mailform_core_health_impl::{HealthFeatureConfig, HealthFeatureServiceImpl};
use mailform_models::email_address::EmailAddressWithName;
use mailform_shared_impl::rate_limit::{RateLimitServiceConfig, RateLimitServiceImpl};
use types::{
    ContactCompose, ContactFeature, Email, HealthFeature, RateLimit, RestServer, Template, Time,
};

pub mod types;

/// Owns the process wide services and wires them into the feature services.
#[derive(Debug, Clone)]
pub struct Provider {
    time: Time,
    rate_limit: RateLimit,
    email: Email,
    template: Template,
    config: ConfigProvider,
}

/// The parts of [`Config`] the services are built from.
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    rest_server: RestServerConfig,
    rate_limit: RateLimitServiceConfig,
    contact_feature: ContactFeatureConfig,
    contact_compose: ContactComposeServiceConfig,
    health_feature: HealthFeatureConfig,
}

impl ConfigProvider {
    pub fn new(config: &Config) -> Self {
        let transport_timeout = config
            .email
            .as_ref()
            .map(|email| *email.timeout)
            .unwrap_or_default();

        Self {
            rest_server: RestServerConfig {
                address: config.http.address,
                real_ip: config.http.real_ip.as_ref().map(|real_ip| {
                    RealIpConfig {
                        header: real_ip.header.clone(),
                        set_from: real_ip.set_from,
                    }
                    .into()
                }),
                allowed_origins: config.http.allowed_origins.clone(),
                test_email: config.http.test_email,
            },
            rate_limit: RateLimitServiceConfig {
                max_requests: config.contact.rate_limit.max_requests,
                window: *config.contact.rate_limit.window,
            },
            contact_feature: ContactFeatureConfig { transport_timeout },
            contact_compose: contact_compose_config(
                config.contact.recipient.clone(),
                config.contact.preview_length,
            ),
            health_feature: HealthFeatureConfig {
                cache_ttl: *config.health.cache_ttl,
            },
        }
    }
}

pub fn contact_compose_config(
    recipient: EmailAddressWithName,
    preview_length: usize,
) -> ContactComposeServiceConfig {
    ContactComposeServiceConfig {
        recipient: Arc::new(recipient),
        preview_length,
    }
}

impl Provider {
    pub fn new(config: ConfigProvider, email: Email, template: Template) -> Self {
        Self {
            time: Time::default(),
            rate_limit: RateLimitServiceImpl::new(config.rate_limit.clone()),
            email,
            template,
            config,
        }
    }

    pub fn rest_server(&self) -> RestServer {
        RestServer::new(
            self.health_feature(),
            self.contact_feature(),
            self.config.rest_server.clone(),
        )
    }

    pub fn contact_feature(&self) -> ContactFeature {
        ContactFeatureServiceImpl::new(
            self.time,
            self.rate_limit.clone(),
            self.email.clone(),
            self.contact_compose(),
            self.config.contact_feature.clone(),
        )
    }

    pub fn contact_compose(&self) -> ContactCompose {
        ContactComposeServiceImpl::new(
            self.template.clone(),
            self.config.contact_compose.clone(),
        )
    }

    pub fn health_feature(&self) -> HealthFeature {
        HealthFeatureServiceImpl::new(
            self.time,
            self.email.clone(),
            self.config.health_feature.clone(),
        )
    }
}

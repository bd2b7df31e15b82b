use mailform_core_contact_impl::{compose::ContactComposeServiceImpl, ContactFeatureServiceImpl};
use mailform_core_health_impl::HealthFeatureServiceImpl;
use mailform_email_impl::EmailServiceImpl;
use mailform_shared_impl::{rate_limit::RateLimitServiceImpl, time::TimeServiceImpl};
use mailform_templates_impl::TemplateServiceImpl;

// API
pub type RestServer = mailform_api_rest::RestServer<HealthFeature, ContactFeature>;

// Shared
pub type Time = TimeServiceImpl;
pub type RateLimit = RateLimitServiceImpl;

// Email
pub type Email = EmailServiceImpl;
pub type Template = TemplateServiceImpl;

// Core
pub type ContactCompose = ContactComposeServiceImpl<Template>;
pub type ContactFeature = ContactFeatureServiceImpl<Time, RateLimit, Email, ContactCompose>;
pub type HealthFeature = HealthFeatureServiceImpl<Time, Email>;

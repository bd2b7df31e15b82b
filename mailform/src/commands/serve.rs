use mailform_config::Config;
use mailform_email_contracts::EmailService;
use mailform_templates_impl::TemplateServiceImpl;
use tracing::{info, warn};

use crate::{
    email,
    environment::{ConfigProvider, Provider},
};

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let email = email::connect(config.email.as_ref())?;
    if email.is_configured() {
        info!("Connecting to smtp server");
        if let Err(err) = email.ping().await {
            warn!("smtp server is not reachable, submissions will fail until it is: {err:#}");
        }
    }

    let template = TemplateServiceImpl::new()?;

    let provider = Provider::new(ConfigProvider::new(&config), email, template);
    let server = provider.rest_server();
    info!("Starting http server on {}", config.http.address);
    server.serve().await
}

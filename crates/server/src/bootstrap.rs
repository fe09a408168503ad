use std::sync::Arc;

use cardscope_catalog::{CardCatalog, CatalogError, CatalogSettings, HttpCatalogClient};
use cardscope_core::config::AppConfig;
use cardscope_outlook::{LlmError, OutlookService};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub catalog: Arc<dyn CardCatalog>,
    pub outlook: Arc<OutlookService>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("catalog client setup failed: {0}")]
    Catalog(#[source] CatalogError),
    #[error("llm client setup failed: {0}")]
    Llm(#[source] LlmError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let catalog = HttpCatalogClient::new(CatalogSettings::from(&config.catalog))
        .map_err(BootstrapError::Catalog)?;
    info!(
        event_name = "system.bootstrap.catalog_ready",
        correlation_id = "bootstrap",
        base_url = %config.catalog.base_url,
        api_key_configured = config.catalog.has_api_key(),
        page_size = config.catalog.page_size,
        "catalog client initialized"
    );

    let outlook = OutlookService::from_config(&config).map_err(BootstrapError::Llm)?;
    info!(
        event_name = "system.bootstrap.outlook_ready",
        correlation_id = "bootstrap",
        llm_configured = outlook.is_configured(),
        model = %config.llm.model,
        directions_source = %outlook
            .directions()
            .source
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "built-in".to_string()),
        "outlook service initialized"
    );

    Ok(Application { config, catalog: Arc::new(catalog), outlook: Arc::new(outlook) })
}

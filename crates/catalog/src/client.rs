use std::time::Duration;

use async_trait::async_trait;
use cardscope_core::config::CatalogConfig;
use cardscope_core::{pricing, ApplicationError, CardPage, CardRecord};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, info};

pub const API_KEY_HEADER: &str = "X-Api-Key";

const ERROR_BODY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("catalog unreachable: {0}")]
    Connect(String),
    #[error("catalog returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("catalog response could not be decoded: {0}")]
    Decode(String),
    #[error("catalog request failed: {0}")]
    Transport(String),
    #[error("catalog client could not be built: {0}")]
    Build(String),
}

impl From<CatalogError> for ApplicationError {
    fn from(value: CatalogError) -> Self {
        match value {
            CatalogError::Timeout { .. } => Self::UpstreamTimeout(value.to_string()),
            CatalogError::Connect(_) => Self::UpstreamUnreachable(value.to_string()),
            CatalogError::Status { .. } | CatalogError::Decode(_) | CatalogError::Transport(_) => {
                Self::Upstream(value.to_string())
            }
            CatalogError::Build(_) => Self::Configuration(value.to_string()),
        }
    }
}

/// One page of card records for a catalog query.
#[async_trait]
pub trait CardCatalog: Send + Sync {
    async fn fetch_page(&self, query: &str, page: u32) -> Result<Vec<CardRecord>, CatalogError>;

    fn page_size(&self) -> u32;
}

#[derive(Clone, Debug)]
pub struct CatalogSettings {
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub page_size: u32,
    pub order_by: String,
    pub timeout: Duration,
}

impl From<&CatalogConfig> for CatalogSettings {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            page_size: config.page_size,
            order_by: config.order_by.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

pub struct HttpCatalogClient {
    client: Client,
    settings: CatalogSettings,
}

impl HttpCatalogClient {
    pub fn new(settings: CatalogSettings) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|error| CatalogError::Build(error.to_string()))?;
        Ok(Self { client, settings })
    }

    fn classify(&self, error: reqwest::Error) -> CatalogError {
        if error.is_timeout() {
            CatalogError::Timeout { timeout_ms: self.settings.timeout.as_millis() as u64 }
        } else if error.is_connect() {
            CatalogError::Connect(error.to_string())
        } else if error.is_decode() {
            CatalogError::Decode(error.to_string())
        } else {
            CatalogError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl CardCatalog for HttpCatalogClient {
    async fn fetch_page(&self, query: &str, page: u32) -> Result<Vec<CardRecord>, CatalogError> {
        let page = page.max(1);
        let params = [
            ("q", query.to_string()),
            ("page", page.to_string()),
            ("pageSize", self.settings.page_size.to_string()),
            ("orderBy", self.settings.order_by.clone()),
        ];

        info!(
            event_name = "catalog.fetch.start",
            page,
            page_size = self.settings.page_size,
            query = %query,
            api_key_configured = self.settings.api_key.is_some(),
            "fetching catalog page"
        );

        let mut request = self.client.get(&self.settings.base_url).query(&params);
        if let Some(api_key) = &self.settings.api_key {
            request = request.header(API_KEY_HEADER, api_key.expose_secret());
        }

        let response = request.send().await.map_err(|error| self.classify(error))?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect(),
            });
        }

        let mut body: CardPage = response.json().await.map_err(|error| self.classify(error))?;
        pricing::annotate(&mut body.data);

        debug!(
            event_name = "catalog.fetch.completed",
            page,
            returned = body.data.len(),
            total_count = body.total_count.unwrap_or_default(),
            "catalog page fetched"
        );

        Ok(body.data)
    }

    fn page_size(&self) -> u32 {
        self.settings.page_size
    }
}

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use cardscope_core::config::CatalogConfig;
use cardscope_outlook::OutlookService;
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

#[derive(Clone)]
pub struct HealthState {
    catalog: CatalogConfig,
    outlook: Arc<OutlookService>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub catalog: HealthCheck,
    pub outlook: HealthCheck,
    pub cached_outlooks: usize,
    pub checked_at: String,
}

pub fn router(catalog: CatalogConfig, outlook: Arc<OutlookService>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { catalog, outlook })
}

pub async fn spawn(
    bind_address: &str,
    port: u16,
    catalog: CatalogConfig,
    outlook: Arc<OutlookService>,
) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.health.start",
        correlation_id = "bootstrap",
        bind_address = %address,
        "health endpoint started"
    );

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router(catalog, outlook)).await {
            error!(
                event_name = "system.health.error",
                correlation_id = "bootstrap",
                error = %error,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let catalog = catalog_check(&state.catalog);
    let ready = catalog.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "cardscope-server runtime initialized".to_string(),
        },
        catalog,
        outlook: outlook_check(&state.outlook),
        cached_outlooks: state.outlook.cache().len(),
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn catalog_check(catalog: &CatalogConfig) -> HealthCheck {
    let url = catalog.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return HealthCheck {
            status: "degraded",
            detail: format!("catalog base url `{url}` is not an http(s) url"),
        };
    }

    let detail = if catalog.has_api_key() {
        format!("catalog at {url} with api key")
    } else {
        format!("catalog at {url} without api key; anonymous rate limits apply")
    };
    HealthCheck { status: "ready", detail }
}

fn outlook_check(outlook: &OutlookService) -> HealthCheck {
    if outlook.is_configured() {
        HealthCheck { status: "ready", detail: "llm credentials configured".to_string() }
    } else {
        HealthCheck {
            status: "placeholder",
            detail: "llm credentials missing; outlooks use the placeholder text".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};
    use cardscope_core::config::AppConfig;
    use cardscope_outlook::{Directions, GenerationSettings, OutlookService};

    use crate::health::{health, HealthState};

    fn unconfigured_outlook() -> Arc<OutlookService> {
        Arc::new(OutlookService::new(None, Directions::default(), GenerationSettings::default()))
    }

    #[tokio::test]
    async fn health_is_ready_with_default_catalog() {
        let config = AppConfig::default();

        let (status, Json(payload)) = health(State(HealthState {
            catalog: config.catalog,
            outlook: unconfigured_outlook(),
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.catalog.status, "ready");
        assert!(payload.catalog.detail.contains("without api key"));
        assert_eq!(payload.outlook.status, "placeholder");
        assert_eq!(payload.cached_outlooks, 0);
    }

    #[tokio::test]
    async fn health_is_degraded_when_catalog_url_is_unusable() {
        let mut config = AppConfig::default();
        config.catalog.base_url = "cards.example/v2".to_string();

        let (status, Json(payload)) = health(State(HealthState {
            catalog: config.catalog,
            outlook: unconfigured_outlook(),
        }))
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.catalog.status, "degraded");
        assert_eq!(payload.service.status, "ready");
    }
}

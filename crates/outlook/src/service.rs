use std::sync::Arc;

use cardscope_core::config::{AppConfig, LlmConfig};
use cardscope_core::outlook::{build_prompt, cache_key, OutlookCache, OutlookPayload};
use tracing::{debug, info, warn};

use crate::directions::{load_directions, Directions};
use crate::llm::{CompletionRequest, LlmClient, LlmError, OpenAiChatClient};

pub const PLACEHOLDER_OUTLOOK: &str = "(AI not configured) Based on set, rarity, and recent prices, collector interest could vary. \
Consider historical demand and reprint risk; condition and grading remain key drivers.";

pub const FAILURE_NOTICE: &str = "AI service error. Try again later.";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self { max_tokens: 180, temperature: 0.4 }
    }
}

impl From<&LlmConfig> for GenerationSettings {
    fn from(config: &LlmConfig) -> Self {
        Self { max_tokens: config.max_tokens, temperature: config.temperature }
    }
}

/// Cache-first outlook generation.
///
/// Only successful completions are memoized. The placeholder returned when no
/// client is configured and the failure notice returned when a call fails are
/// never cached, so the same card can still get a real outlook later.
pub struct OutlookService {
    client: Option<Arc<dyn LlmClient>>,
    cache: Arc<OutlookCache>,
    directions: Directions,
    settings: GenerationSettings,
}

impl OutlookService {
    pub fn new(
        client: Option<Arc<dyn LlmClient>>,
        directions: Directions,
        settings: GenerationSettings,
    ) -> Self {
        Self { client, cache: Arc::new(OutlookCache::new()), directions, settings }
    }

    pub fn with_cache(mut self, cache: Arc<OutlookCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, LlmError> {
        let client = OpenAiChatClient::from_config(&config.llm)?
            .map(|client| Arc::new(client) as Arc<dyn LlmClient>);
        let directions = load_directions(&config.outlook.directions_paths);

        Ok(Self::new(client, directions, GenerationSettings::from(&config.llm)))
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn directions(&self) -> &Directions {
        &self.directions
    }

    pub fn cache(&self) -> &Arc<OutlookCache> {
        &self.cache
    }

    pub fn key_for(&self, payload: &OutlookPayload) -> String {
        cache_key(payload, &self.directions.text)
    }

    pub async fn outlook_for(&self, payload: &OutlookPayload) -> String {
        let key = self.key_for(payload);
        if let Some(cached) = self.cache.get(&key) {
            debug!(event_name = "outlook.cache.hit", cache_key = %key, "outlook served from cache");
            return cached;
        }

        let Some(client) = &self.client else {
            info!(
                event_name = "outlook.placeholder",
                cache_key = %key,
                "llm not configured; returning placeholder outlook"
            );
            return PLACEHOLDER_OUTLOOK.to_string();
        };

        let request = CompletionRequest {
            system: self.directions.text.clone(),
            prompt: build_prompt(payload),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let outcome = client.complete(&request).await.and_then(|text| {
            let text = text.trim().to_string();
            if text.is_empty() {
                Err(LlmError::InvalidResponse("completion was blank".to_string()))
            } else {
                Ok(text)
            }
        });

        match outcome {
            Ok(text) => {
                self.cache.insert(key.clone(), text.clone());
                info!(
                    event_name = "outlook.generated",
                    cache_key = %key,
                    cached_entries = self.cache.len(),
                    "outlook generated and cached"
                );
                text
            }
            Err(error) => {
                warn!(
                    event_name = "outlook.failed",
                    cache_key = %key,
                    error = %error,
                    "outlook generation failed"
                );
                FAILURE_NOTICE.to_string()
            }
        }
    }
}

use std::env;
use std::fs;
use std::path::Path;

use cardscope_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

use super::CommandResult;

struct FieldSource<'a> {
    doc: Option<&'a Value>,
    path: Option<&'a Path>,
}

impl FieldSource<'_> {
    fn line(&self, key_path: &str, value: impl AsRef<str>, env_keys: &[&str]) -> String {
        render_line(key_path, value.as_ref(), self.describe(key_path, env_keys))
    }

    fn describe(&self, key_path: &str, env_keys: &[&str]) -> String {
        if let Some(env_key) = env_keys.iter().find(|key| env_is_set(key)) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = self.doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .path
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

pub fn run() -> CommandResult {
    match render(LoadOptions::default()) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(message) => CommandResult::failure("config", "config_validation", message, 2),
    }
}

pub fn render(options: LoadOptions) -> Result<String, String> {
    let explicit_path = options.config_path.clone();
    let config =
        AppConfig::load(options).map_err(|error| format!("config validation failed: {error}"))?;

    let config_file_path = resolve_config_path(explicit_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = FieldSource { doc: config_file_doc.as_ref(), path: config_file_path.as_deref() };

    let directions = config
        .outlook
        .directions_paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend([
        source.line(
            "catalog.base_url",
            &config.catalog.base_url,
            &["CARDSCOPE_CATALOG_BASE_URL"],
        ),
        source.line(
            "catalog.api_key",
            redact_secret(config.catalog.api_key.as_ref()),
            &["CARDSCOPE_CATALOG_API_KEY", "POKEMON_TCG_API_KEY"],
        ),
        source.line(
            "catalog.page_size",
            config.catalog.page_size.to_string(),
            &["CARDSCOPE_CATALOG_PAGE_SIZE"],
        ),
        source.line(
            "catalog.timeout_secs",
            config.catalog.timeout_secs.to_string(),
            &["CARDSCOPE_CATALOG_TIMEOUT_SECS"],
        ),
        source.line(
            "catalog.order_by",
            &config.catalog.order_by,
            &["CARDSCOPE_CATALOG_ORDER_BY"],
        ),
        source.line(
            "llm.api_key",
            redact_secret(config.llm.api_key.as_ref()),
            &["CARDSCOPE_LLM_API_KEY", "OPENAI_API_KEY"],
        ),
        source.line("llm.base_url", &config.llm.base_url, &["CARDSCOPE_LLM_BASE_URL"]),
        source.line("llm.model", &config.llm.model, &["CARDSCOPE_LLM_MODEL", "OPENAI_MODEL"]),
        source.line(
            "llm.timeout_secs",
            config.llm.timeout_secs.to_string(),
            &["CARDSCOPE_LLM_TIMEOUT_SECS"],
        ),
        source.line(
            "llm.temperature",
            config.llm.temperature.to_string(),
            &["CARDSCOPE_LLM_TEMPERATURE"],
        ),
        source.line(
            "llm.max_tokens",
            config.llm.max_tokens.to_string(),
            &["CARDSCOPE_LLM_MAX_TOKENS"],
        ),
        source.line("outlook.directions_paths", directions, &["CARDSCOPE_OUTLOOK_DIRECTIONS_PATH"]),
        source.line(
            "server.bind_address",
            &config.server.bind_address,
            &["CARDSCOPE_SERVER_BIND_ADDRESS"],
        ),
        source.line("server.port", config.server.port.to_string(), &["CARDSCOPE_SERVER_PORT"]),
        source.line(
            "server.health_check_port",
            config.server.health_check_port.to_string(),
            &["CARDSCOPE_SERVER_HEALTH_CHECK_PORT"],
        ),
        source.line(
            "server.templates_dir",
            config.server.templates_dir.display().to_string(),
            &["CARDSCOPE_SERVER_TEMPLATES_DIR"],
        ),
        source.line(
            "logging.level",
            &config.logging.level,
            &["CARDSCOPE_LOGGING_LEVEL", "CARDSCOPE_LOG_LEVEL"],
        ),
        source.line(
            "logging.format",
            format!("{:?}", config.logging.format),
            &["CARDSCOPE_LOGGING_FORMAT", "CARDSCOPE_LOG_FORMAT"],
        ),
    ]);

    Ok(lines.join("\n"))
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn env_is_set(key: &str) -> bool {
    env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false)
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_secret(secret: Option<&SecretString>) -> String {
    let Some(secret) = secret else {
        return "<unset>".to_string();
    };
    let trimmed = secret.expose_secret().trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::redact_secret;

    #[test]
    fn redaction_keeps_only_key_prefix() {
        let openai: SecretString = "sk-live-abcdef".to_string().into();
        let opaque: SecretString = "0f9a8b7c".to_string().into();

        assert_eq!(redact_secret(Some(&openai)), "sk-***");
        assert_eq!(redact_secret(Some(&opaque)), "<redacted>");
        assert_eq!(redact_secret(None), "<unset>");
    }
}

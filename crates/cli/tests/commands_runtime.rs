use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use cardscope_cli::commands::{config, doctor, query};
use cardscope_core::config::LoadOptions;
use cardscope_core::FilterSet;
use serde_json::Value;

#[test]
fn query_emits_clauses_in_fixed_order() {
    let result = query::run(&FilterSet {
        name: Some(" Pikachu ".to_string()),
        set_name: Some("Jungle".to_string()),
        number: None,
        rarity: Some("   ".to_string()),
        card_type: Some("Lightning".to_string()),
    });

    assert_eq!(result.exit_code, 0);
    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "query");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["message"], r#"name:"Pikachu" set.name:"Jungle" types:"Lightning""#);
    assert!(payload.get("error_class").is_none());
    assert_eq!(payload["details"]["filters"]["name"], "Pikachu");
    assert_eq!(payload["details"]["filters"]["type"], "Lightning");
    assert!(payload["details"]["filters"]["rarity"].is_null());
}

#[test]
fn query_without_filters_is_unrestricted() {
    let result = query::run(&FilterSet::default());

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["message"], "");
}

#[test]
fn doctor_warns_without_credentials() {
    with_env(&[("CARDSCOPE_OUTLOOK_DIRECTIONS_PATH", "/nonexistent/ai_directions.txt")], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 0, "missing keys are warnings, not failures");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "warn");
        assert_eq!(payload["checks"][0]["name"], "config_validation");
        assert_eq!(payload["checks"][0]["status"], "pass");
        assert_eq!(payload["checks"][1]["name"], "catalog_key_readiness");
        assert_eq!(payload["checks"][1]["status"], "warn");
        assert_eq!(payload["checks"][2]["name"], "outlook_readiness");
        assert_eq!(payload["checks"][2]["status"], "warn");
        let details = payload["checks"][2]["details"].as_str().unwrap_or_default();
        assert!(details.contains("built-in directions"));
    });
}

#[test]
fn doctor_passes_with_keys_and_reports_directions_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let directions = dir.path().join("ai_directions.txt");
    fs::write(&directions, "Be brief and cautious.\n").expect("write directions");
    let directions = directions.display().to_string();

    with_env(
        &[
            ("POKEMON_TCG_API_KEY", "catalog-key"),
            ("OPENAI_API_KEY", "sk-test-123"),
            ("CARDSCOPE_OUTLOOK_DIRECTIONS_PATH", directions.as_str()),
        ],
        || {
            let report = doctor::build_report(no_file());

            assert_eq!(report.overall_status, doctor::CheckStatus::Pass);
            assert!(report.checks.iter().all(|check| check.status == doctor::CheckStatus::Pass));
            assert!(report.checks[2].details.contains(&directions));
            assert!(report.checks[2].details.contains("gpt-4o-mini"));
        },
    );
}

#[test]
fn doctor_fails_and_skips_on_invalid_config() {
    with_env(&[("CARDSCOPE_CATALOG_PAGE_SIZE", "lots")], || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 1);

        assert!(result.output.starts_with("doctor: one or more readiness checks failed"));
        assert!(result.output.contains("- [fail] config_validation:"));
        assert!(result.output.contains("- [skip] catalog_key_readiness:"));
        assert!(result.output.contains("- [skip] outlook_readiness:"));
    });
}

#[test]
fn config_attributes_legacy_env_aliases_and_redacts_secrets() {
    with_env(&[("POKEMON_TCG_API_KEY", "abc123"), ("OPENAI_API_KEY", "sk-proj-secretvalue")], || {
        let output = config::render(no_file()).expect("config should render");

        assert!(output.contains(
            "- catalog.api_key = <redacted> (source: env (POKEMON_TCG_API_KEY))"
        ));
        assert!(output.contains("- llm.api_key = sk-*** (source: env (OPENAI_API_KEY))"));
        assert!(output.contains("- catalog.page_size = 20 (source: default)"));
        assert!(!output.contains("abc123"));
        assert!(!output.contains("secretvalue"));
    });
}

#[test]
fn config_attributes_file_values() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("cardscope.toml");
    fs::write(&path, "[catalog]\npage_size = 50\n\n[server]\nport = 5050\n").expect("write config");

    with_env(&[], || {
        let output = config::render(LoadOptions {
            config_path: Some(path.clone()),
            ..LoadOptions::default()
        })
        .expect("config should render");

        let file_source = format!("(source: file ({}))", path.display());
        assert!(output.contains(&format!("- catalog.page_size = 50 {file_source}")));
        assert!(output.contains(&format!("- server.port = 5050 {file_source}")));
        assert!(output.contains("- llm.api_key = <unset> (source: default)"));
    });
}

#[test]
fn config_reports_validation_failure_as_structured_error() {
    with_env(&[("CARDSCOPE_LLM_TEMPERATURE", "9.5")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

fn no_file() -> LoadOptions {
    LoadOptions {
        config_path: Some(PathBuf::from("does-not-exist.toml")),
        ..LoadOptions::default()
    }
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "CARDSCOPE_CATALOG_BASE_URL",
        "CARDSCOPE_CATALOG_API_KEY",
        "CARDSCOPE_CATALOG_PAGE_SIZE",
        "CARDSCOPE_CATALOG_TIMEOUT_SECS",
        "CARDSCOPE_CATALOG_ORDER_BY",
        "CARDSCOPE_LLM_API_KEY",
        "CARDSCOPE_LLM_BASE_URL",
        "CARDSCOPE_LLM_MODEL",
        "CARDSCOPE_LLM_TIMEOUT_SECS",
        "CARDSCOPE_LLM_TEMPERATURE",
        "CARDSCOPE_LLM_MAX_TOKENS",
        "CARDSCOPE_OUTLOOK_DIRECTIONS_PATH",
        "CARDSCOPE_SERVER_BIND_ADDRESS",
        "CARDSCOPE_SERVER_PORT",
        "CARDSCOPE_SERVER_HEALTH_CHECK_PORT",
        "CARDSCOPE_SERVER_TEMPLATES_DIR",
        "CARDSCOPE_LOGGING_LEVEL",
        "CARDSCOPE_LOGGING_FORMAT",
        "CARDSCOPE_LOG_LEVEL",
        "CARDSCOPE_LOG_FORMAT",
        "POKEMON_TCG_API_KEY",
        "OPENAI_API_KEY",
        "OPENAI_MODEL",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}

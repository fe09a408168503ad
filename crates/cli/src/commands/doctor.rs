use cardscope_core::config::{AppConfig, LoadOptions};
use cardscope_outlook::load_directions;
use serde::Serialize;
use serde_json::json;

use super::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
pub struct DoctorCheck {
    pub name: &'static str,
    pub status: CheckStatus,
    pub details: String,
}

#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub overall_status: CheckStatus,
    pub summary: String,
    pub checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report(LoadOptions::default());
    let exit_code = if report.overall_status == CheckStatus::Fail { 1 } else { 0 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            json!({
                "overall_status": "fail",
                "summary": "doctor serialization failed",
                "error": error.to_string(),
            })
            .to_string()
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

pub fn build_report(options: LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_catalog_key(&config));
            checks.push(check_outlook(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["catalog_key_readiness", "outlook_readiness"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let (overall_status, summary) = if failed {
        (CheckStatus::Fail, "doctor: one or more readiness checks failed")
    } else if all_pass {
        (CheckStatus::Pass, "doctor: all readiness checks passed")
    } else {
        (CheckStatus::Warn, "doctor: ready with warnings")
    };

    DoctorReport { overall_status, summary: summary.to_string(), checks }
}

fn check_catalog_key(config: &AppConfig) -> DoctorCheck {
    if config.catalog.has_api_key() {
        DoctorCheck {
            name: "catalog_key_readiness",
            status: CheckStatus::Pass,
            details: format!("api key configured for {}", config.catalog.base_url),
        }
    } else {
        DoctorCheck {
            name: "catalog_key_readiness",
            status: CheckStatus::Warn,
            details: "no catalog api key; searches run with anonymous rate limits".to_string(),
        }
    }
}

fn check_outlook(config: &AppConfig) -> DoctorCheck {
    let directions = load_directions(&config.outlook.directions_paths);
    let source = directions
        .source
        .as_ref()
        .map(|path| format!("directions from `{}`", path.display()))
        .unwrap_or_else(|| "built-in directions".to_string());

    if config.llm.is_configured() {
        DoctorCheck {
            name: "outlook_readiness",
            status: CheckStatus::Pass,
            details: format!("model `{}` at {}; {source}", config.llm.model, config.llm.base_url),
        }
    } else {
        DoctorCheck {
            name: "outlook_readiness",
            status: CheckStatus::Warn,
            details: format!("no llm api key; outlooks use the placeholder text; {source}"),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

use maintflow_client::{ApiRequest, Backend};
use maintflow_core::config::{AppConfig, LoadOptions};
use maintflow_core::Resource;
use serde::Serialize;

use crate::commands::{http_backend, runtime};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_access_token(&config));
            checks.push(check_backend_reachability(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("access_token_readiness"));
            checks.push(skipped("backend_reachability"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn skipped(name: &'static str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: "skipped because configuration did not load".to_string(),
    }
}

fn check_access_token(config: &AppConfig) -> DoctorCheck {
    if config.has_access_token() {
        DoctorCheck {
            name: "access_token_readiness",
            status: CheckStatus::Pass,
            details: "access token configured".to_string(),
        }
    } else {
        DoctorCheck {
            name: "access_token_readiness",
            status: CheckStatus::Fail,
            details: "no access token: set MAINTFLOW_ACCESS_TOKEN or auth.access_token".to_string(),
        }
    }
}

/// Any HTTP answer proves reachability; 401/403 additionally means the token was refused.
fn check_backend_reachability(config: &AppConfig) -> DoctorCheck {
    let probe = runtime().and_then(|runtime| {
        let backend = http_backend(config)?;
        let request = ApiRequest::get(Resource::Machine.path())
            .with_query("page", "1")
            .with_query("limit", "1");
        Ok(runtime.block_on(backend.send(request)))
    });

    let (status, details) = match probe {
        Err(error) => (CheckStatus::Fail, format!("{error:#}")),
        Ok(Err(error)) => {
            (CheckStatus::Fail, format!("`{}` unreachable: {error}", config.backend.base_url))
        }
        Ok(Ok(response)) if matches!(response.status, 401 | 403) => (
            CheckStatus::Fail,
            format!(
                "`{}` answered HTTP {} (access token refused)",
                config.backend.base_url, response.status
            ),
        ),
        Ok(Ok(response)) => (
            CheckStatus::Pass,
            format!("`{}` answered HTTP {}", config.backend.base_url, response.status),
        ),
    };

    DoctorCheck { name: "backend_reachability", status, details }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

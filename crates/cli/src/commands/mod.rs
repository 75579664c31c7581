pub mod actions;
pub mod config;
pub mod doctor;
pub mod list;
pub mod transition;

use std::sync::Arc;

use anyhow::Context;
use maintflow_client::{Anonymous, AuthContext, Backend, HttpBackend, StaticToken};
use maintflow_core::config::{AppConfig, LoadOptions};
use maintflow_core::Role;
use serde::Serialize;
use serde_json::Value;

pub const EXIT_INVALID_ARGUMENT: u8 = 1;
pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_BACKEND: u8 = 3;
pub const EXIT_REFUSED: u8 = 4;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: impl Into<Option<Value>>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: data.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(command, "config_validation", error.to_string(), EXIT_CONFIG)
    })
}

pub(crate) fn http_backend(config: &AppConfig) -> anyhow::Result<Arc<dyn Backend>> {
    let auth: Arc<dyn AuthContext> = match &config.auth.access_token {
        Some(token) => Arc::new(StaticToken::from(token.clone())),
        None => Arc::new(Anonymous),
    };
    let backend = HttpBackend::from_config(&config.backend, auth)
        .with_context(|| format!("failed to build HTTP client for `{}`", config.backend.base_url))?;
    Ok(Arc::new(backend))
}

pub(crate) fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to initialize async runtime")
}

/// Explicit `--role` wins over the configured role.
pub(crate) fn resolve_role(
    command: &str,
    explicit: Option<&str>,
    config: &AppConfig,
) -> Result<Role, CommandResult> {
    match explicit {
        Some(raw) => raw.parse::<Role>().map_err(|error| {
            CommandResult::failure(command, error.class(), error.to_string(), EXIT_INVALID_ARGUMENT)
        }),
        None => config.auth.role.ok_or_else(|| {
            CommandResult::failure(
                command,
                "invalid_argument",
                "no role given: pass --role or set MAINTFLOW_ROLE",
                EXIT_INVALID_ARGUMENT,
            )
        }),
    }
}

pub(crate) fn internal_failure(command: &str, error: anyhow::Error) -> CommandResult {
    CommandResult::failure(command, "internal", format!("{error:#}"), EXIT_BACKEND)
}

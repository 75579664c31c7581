use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use maintflow_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

struct Field<'a> {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: &'a str,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let timeout_secs = config.backend.timeout_secs.to_string();
    let page_limit = config.backend.default_page_limit.to_string();
    let access_token = redact_token(
        config.auth.access_token.as_ref().map(|token| token.expose_secret()),
    );
    let role = config.auth.role.map(|role| role.to_string()).unwrap_or_else(|| "<unset>".into());
    let log_format = format!("{:?}", config.logging.format);

    let fields = [
        Field {
            key_path: "backend.base_url",
            env_keys: &["MAINTFLOW_BACKEND_BASE_URL", "MAINTFLOW_API_URL"],
            value: &config.backend.base_url,
        },
        Field {
            key_path: "backend.timeout_secs",
            env_keys: &["MAINTFLOW_BACKEND_TIMEOUT_SECS"],
            value: &timeout_secs,
        },
        Field {
            key_path: "backend.default_page_limit",
            env_keys: &["MAINTFLOW_BACKEND_PAGE_LIMIT"],
            value: &page_limit,
        },
        Field {
            key_path: "auth.access_token",
            env_keys: &["MAINTFLOW_ACCESS_TOKEN"],
            value: &access_token,
        },
        Field { key_path: "auth.role", env_keys: &["MAINTFLOW_ROLE"], value: &role },
        Field {
            key_path: "logging.level",
            env_keys: &["MAINTFLOW_LOGGING_LEVEL", "MAINTFLOW_LOG_LEVEL"],
            value: &config.logging.level,
        },
        Field {
            key_path: "logging.format",
            env_keys: &["MAINTFLOW_LOGGING_FORMAT", "MAINTFLOW_LOG_FORMAT"],
            value: &log_format,
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in &fields {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, field.value, source));
    }

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    ["maintflow.toml", "config/maintflow.toml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
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

fn redact_token(token: Option<&str>) -> String {
    match token.map(str::trim) {
        None => "<unset>".to_string(),
        Some("") => "<empty>".to_string(),
        Some(token) => format!("<redacted, {} chars>", token.chars().count()),
    }
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::{contains_path, redact_token};

    #[test]
    fn tokens_never_render_in_clear() {
        assert_eq!(redact_token(None), "<unset>");
        assert_eq!(redact_token(Some("  ")), "<empty>");
        let rendered = redact_token(Some("eyJhbGciOiJIUzI1NiJ9.payload"));
        assert!(!rendered.contains("eyJ"));
        assert_eq!(rendered, "<redacted, 28 chars>");
    }

    #[test]
    fn dotted_paths_resolve_inside_tables() {
        let doc: Value = "[backend]\ntimeout_secs = 20\n".parse().expect("toml");
        assert!(contains_path(&doc, "backend.timeout_secs"));
        assert!(!contains_path(&doc, "backend.base_url"));
        assert!(!contains_path(&doc, "auth.role"));
    }
}

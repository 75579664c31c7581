use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use maintflow_core::config::BackendConfig;
use reqwest::Client;
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use crate::auth::AuthContext;
use crate::backend::{ApiRequest, ApiResponse, Backend, Method, TransportError};

/// reqwest-backed transport with a fixed per-request timeout.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
    auth: Arc<dyn AuthContext>,
}

impl HttpBackend {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        auth: Arc<dyn AuthContext>,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| TransportError::Network(error.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url, timeout, auth })
    }

    pub fn from_config(
        config: &BackendConfig,
        auth: Arc<dyn AuthContext>,
    ) -> Result<Self, TransportError> {
        Self::new(config.base_url.clone(), Duration::from_secs(config.timeout_secs), auth)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn map_error(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Network(error.to_string())
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = self.auth.access_token() {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let started = Instant::now();
        let response = match builder.send().await {
            Ok(response) => response,
            Err(error) => {
                let error = self.map_error(error);
                warn!(
                    event_name = "backend.request.failed",
                    method = request.method.as_str(),
                    path = %request.path,
                    error = %error,
                    "backend request failed before a response was received"
                );
                return Err(error);
            }
        };

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|error| self.map_error(error))?;
        debug!(
            event_name = "backend.request.completed",
            method = request.method.as_str(),
            path = %request.path,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backend request completed"
        );

        Ok(ApiResponse { status, body })
    }
}

//! Shared JSON-over-HTTP plumbing with bearer auth and retry.
//!
//! The capability traits are synchronous and may be called from inside a
//! tokio runtime. Each request runs a blocking client on its own scoped
//! thread, which never nests inside the caller's runtime.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use storesync_core::config::AiConfig;

/// Failure of one request, classified for retry.
#[derive(Debug)]
pub(crate) enum CallError {
    /// Network errors, 429 and 5xx.
    Transient(String),
    /// Anything a retry cannot fix.
    Fatal(String),
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transient(m) | Self::Fatal(m) => f.write_str(m),
        }
    }
}

pub(crate) struct ApiClient {
    base_url: String,
    api_key: String,
    timeout: Duration,
    max_retries: u32,
}

impl ApiClient {
    pub(crate) fn new(config: &AiConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
        }
    }

    /// POST `body` to `{base_url}/{path}` with exponential backoff on
    /// transient failures.
    pub(crate) fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, String>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let body =
            serde_json::to_string(body).map_err(|e| format!("JSON serialization error: {e}"))?;
        let url = format!("{}/{}", self.base_url, path);

        let mut last_err = String::from("no attempt made");
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(200 * 2u64.pow(attempt - 1));
                std::thread::sleep(delay);
                debug!(attempt, %url, "retrying API request");
            }
            match self.send(&url, &body) {
                Ok(text) => {
                    return serde_json::from_str(&text)
                        .map_err(|e| format!("JSON parse error: {e}"));
                }
                Err(CallError::Fatal(reason)) => return Err(reason),
                Err(CallError::Transient(reason)) => {
                    warn!(attempt, %url, error = %reason, "API request failed");
                    last_err = reason;
                }
            }
        }
        Err(last_err)
    }

    fn send(&self, url: &str, body: &str) -> Result<String, CallError> {
        std::thread::scope(|scope| {
            scope
                .spawn(|| self.send_blocking(url, body))
                .join()
                .unwrap_or_else(|_| Err(CallError::Fatal("request thread panicked".to_string())))
        })
    }

    fn send_blocking(&self, url: &str, body: &str) -> Result<String, CallError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| CallError::Fatal(format!("client error: {e}")))?;
        let response = client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .map_err(|e| CallError::Transient(format!("HTTP error: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| CallError::Transient(format!("body read error: {e}")))?;
        if status.is_success() {
            Ok(text)
        } else if status.as_u16() == 429 || status.is_server_error() {
            Err(CallError::Transient(format!("API returned {status}: {text}")))
        } else {
            Err(CallError::Fatal(format!("API returned {status}: {text}")))
        }
    }
}

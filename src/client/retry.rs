use std::time::Duration;

use serde_json::Value;

use super::transport::{HttpRequest, HttpTransport, TransportError};
use crate::config::Config;
use crate::error::{AppError, Result};

/// Bounded exponential backoff for transient transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.retry_max_attempts.max(1),
            initial_backoff: config.retry_initial_backoff,
            max_backoff: config.retry_max_backoff,
        }
    }

    /// Delay before retry number `retry` (1-based): doubles each time, capped.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// GET `request` and parse the body as JSON.
///
/// Timeouts and connection failures are retried per `policy`. Any HTTP status
/// outside 2xx fails immediately with the upstream body attached.
pub async fn get_json(
    transport: &dyn HttpTransport,
    policy: &RetryPolicy,
    request: &HttpRequest,
) -> Result<Value> {
    let mut attempt = 0;
    let response = loop {
        attempt += 1;
        metrics::counter!("upstream_requests_total").increment(1);
        tracing::debug!(url = %request.url, query = ?request.query, attempt, "Upstream request");

        match transport.get(request).await {
            Ok(response) => break response,
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.backoff(attempt);
                metrics::counter!("upstream_retries_total").increment(1);
                tracing::warn!(
                    url = %request.url,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient upstream failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) if err.is_transient() => {
                return Err(AppError::RetryExhausted {
                    attempts: attempt,
                    last_error: err.to_string(),
                });
            }
            Err(TransportError::Other(msg)) => return Err(AppError::Transport(msg)),
            Err(err) => return Err(AppError::Transport(err.to_string())),
        }
    };

    if !response.is_success() {
        let body = serde_json::from_str(&response.body)
            .unwrap_or_else(|_| Value::String(response.body.clone()));
        metrics::counter!("upstream_http_errors_total").increment(1);
        tracing::error!(
            url = %request.url,
            status = response.status,
            body = %body,
            "Upstream HTTP error"
        );
        return Err(AppError::UpstreamHttp {
            status: response.status,
            body,
        });
    }

    serde_json::from_str(&response.body)
        .map_err(|e| AppError::Decode(format!("response from {} is not JSON: {e}", request.url)))
}

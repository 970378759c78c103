use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Input that failed schema normalization or structural checks.
///
/// Raised before any network call is made.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    #[error("at least one operator must be specified")]
    NoOperator,

    #[error("only one operator can be used per filter node, found {}", .0.join(", "))]
    MultipleOperators(Vec<&'static str>),

    #[error("{0} requires at least one sub-expression")]
    EmptyCombinator(&'static str),

    #[error("malformed input: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Upstream returned HTTP {status}: {body}")]
    UpstreamHttp { status: u16, body: Value },

    #[error("Upstream unreachable after {attempts} attempts: {last_error}")]
    RetryExhausted { attempts: u32, last_error: String },

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Unexpected upstream payload: {0}")]
    Decode(String),

    #[error("Indexing failed: {0}")]
    Indexing(String),

    #[error("Vector store error: {0}")]
    Store(String),

    #[error("{0} environment variable is required")]
    MissingCredential(&'static str),

    #[error("Service temporarily unavailable: {0}")]
    Unavailable(String),
}

impl AppError {
    /// Stable snake_case identifier used in error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::UpstreamHttp { .. } => "upstream_http_error",
            AppError::RetryExhausted { .. } => "retry_exhausted",
            AppError::Transport(_) => "transport_error",
            AppError::Decode(_) => "decode_error",
            AppError::Indexing(_) => "indexing_error",
            AppError::Store(_) => "store_error",
            AppError::MissingCredential(_) => "missing_credential",
            AppError::Unavailable(_) => "unavailable",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    kind: &'static str,
    code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream_body: Option<Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(e) => {
                tracing::warn!(error = %e, "Validation error");
                StatusCode::BAD_REQUEST
            }
            AppError::UpstreamHttp { status, .. } => {
                tracing::warn!(upstream_status = status, "Upstream HTTP error");
                StatusCode::BAD_GATEWAY
            }
            AppError::RetryExhausted { attempts, .. } => {
                tracing::error!(attempts, error = %self, "Upstream retries exhausted");
                StatusCode::GATEWAY_TIMEOUT
            }
            AppError::Transport(e) | AppError::Decode(e) => {
                tracing::error!(error = %e, "Upstream failure");
                StatusCode::BAD_GATEWAY
            }
            AppError::Indexing(e) | AppError::Store(e) => {
                tracing::error!(error = %e, "Index failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::MissingCredential(var) => {
                tracing::warn!(variable = var, "Client not configured");
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Unavailable(msg) => {
                tracing::warn!(error = %msg, "Resource error");
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        let (upstream_status, upstream_body) = match &self {
            AppError::UpstreamHttp { status, body } => (Some(*status), Some(body.clone())),
            _ => (None, None),
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            kind: self.kind(),
            code: status.as_u16(),
            upstream_status,
            upstream_body,
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

pub mod companies;
pub mod debates;
pub mod health;
pub mod parliament;
pub mod tools;

pub use companies::{advanced_search_companies_handler, search_companies_handler, search_officers_handler};
pub use debates::{get_debate_handler, search_debates_handler};
pub use health::{health_handler, ready_handler};
pub use parliament::{
    get_categories_handler, get_contribution_summary_handler, get_interests_handler,
    get_lords_interests_handler, get_lords_staff_handler, get_members_handler,
};
pub use tools::{tools_handler, TOOLS};

use std::sync::Arc;

use axum::body::Bytes;
use axum::routing::{get, post};
use axum::Router;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, ValidationError};
use crate::schema::{normalize, Validate};
use crate::state::AppState;

/// Every tool route plus `/health`, `/ready` and `/tools`. `/metrics` is added by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/tools", get(tools_handler))
        .route("/tools/search_companies", post(search_companies_handler))
        .route(
            "/tools/advanced_search_companies",
            post(advanced_search_companies_handler),
        )
        .route("/tools/search_officers", post(search_officers_handler))
        .route("/tools/get_interests", post(get_interests_handler))
        .route("/tools/get_lords_interests", post(get_lords_interests_handler))
        .route("/tools/get_lords_staff", post(get_lords_staff_handler))
        .route("/tools/get_members", post(get_members_handler))
        .route("/tools/get_categories", post(get_categories_handler))
        .route(
            "/tools/get_member_contribution_summary",
            post(get_contribution_summary_handler),
        )
        .route("/tools/get_debate", post(get_debate_handler))
        .route("/tools/search_debates", post(search_debates_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .with_state(state)
}

fn parse_json(body: &Bytes) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|e| ValidationError::Malformed(format!("request body is not JSON: {e}")).into())
}

/// Parameters that must be present.
pub(crate) fn required_params<T: DeserializeOwned + Validate>(body: &Bytes) -> Result<T> {
    match parse_json(body)? {
        Value::Null => Ok(normalize(Value::Object(Default::default()))?),
        raw => Ok(normalize(raw)?),
    }
}

/// Optional parameters: an empty body or `null` means none were given.
pub(crate) fn optional_params<T: DeserializeOwned + Validate>(body: &Bytes) -> Result<Option<T>> {
    match parse_json(body)? {
        Value::Null => Ok(None),
        raw => Ok(Some(normalize(raw)?)),
    }
}

pub(crate) fn record_call(tool: &'static str) {
    metrics::counter!("tool_calls_total", "tool" => tool).increment(1);
}

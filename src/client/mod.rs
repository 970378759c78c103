//! Upstream API clients.
//!
//! One façade per API family, each built on [`retry::get_json`] and the
//! schema layer's [`normalize`](crate::schema::normalize).

pub mod companies;
pub mod parliament;
pub mod retry;
pub mod transport;

pub use companies::CompaniesClient;
pub use parliament::ParliamentClient;
pub use retry::{get_json, RetryPolicy};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::schema::{self, Validate};

/// Shared plumbing for every client.
#[derive(Clone)]
pub(crate) struct Upstream {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl Upstream {
    pub(crate) fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// GET `request` and normalize the body into `T`.
    pub(crate) async fn fetch<T>(&self, request: HttpRequest) -> Result<T>
    where
        T: DeserializeOwned + Validate,
    {
        let raw = get_json(self.transport.as_ref(), &self.policy, &request).await?;
        schema::normalize(raw)
            .map_err(|e| AppError::Decode(format!("{} did not match schema: {e}", request.url)))
    }
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

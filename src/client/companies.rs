//! Companies registry client.

use std::sync::Arc;

use super::{endpoint, HttpRequest, HttpTransport, RetryPolicy, Upstream};
use crate::error::{AppError, Result};
use crate::schema::companies::{
    AdvancedSearchParams, AdvancedSearchResponse, CompanySearchParams, CompanySearchResponse,
    OfficerSearchParams, OfficerSearchResponse,
};
use crate::schema::{to_query, Validate, WireFields};

pub const API_KEY_VAR: &str = "COMPANY_API_KEY";

/// Authenticated client. Every request carries the API key as the Basic auth
/// username with an empty password.
#[derive(Clone)]
pub struct CompaniesClient {
    upstream: Upstream,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for CompaniesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompaniesClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl CompaniesClient {
    /// Fails with [`AppError::MissingCredential`] when no key is configured.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        policy: RetryPolicy,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(AppError::MissingCredential(API_KEY_VAR))?;
        Ok(Self {
            upstream: Upstream::new(transport, policy),
            base_url: base_url.into(),
            api_key,
        })
    }

    fn request<P: WireFields + Validate>(&self, path: &str, params: &P) -> Result<HttpRequest> {
        params.validate()?;
        Ok(HttpRequest::get(endpoint(&self.base_url, path))
            .with_query(to_query(params)?)
            .with_basic_auth(self.api_key.clone()))
    }

    pub async fn search_companies(
        &self,
        params: &CompanySearchParams,
    ) -> Result<CompanySearchResponse> {
        let request = self.request("search/companies", params)?;
        self.upstream.fetch(request).await
    }

    pub async fn advanced_search_companies(
        &self,
        params: Option<&AdvancedSearchParams>,
    ) -> Result<AdvancedSearchResponse> {
        let request = match params {
            Some(params) => self.request("advanced-search/companies", params)?,
            None => HttpRequest::get(endpoint(&self.base_url, "advanced-search/companies"))
                .with_basic_auth(self.api_key.clone()),
        };
        self.upstream.fetch(request).await
    }

    pub async fn search_officers(
        &self,
        params: &OfficerSearchParams,
    ) -> Result<OfficerSearchResponse> {
        let request = self.request("search/officers", params)?;
        self.upstream.fetch(request).await
    }
}

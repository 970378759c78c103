//! Company registry tools.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};

use super::{optional_params, record_call, required_params};
use crate::error::Result;
use crate::schema::companies::{
    AdvancedSearchParams, AdvancedSearchResponse, CompanySearchParams, CompanySearchResponse,
    OfficerSearchParams, OfficerSearchResponse,
};
use crate::state::AppState;

/// POST /tools/search_companies - Simple search by company name or number.
pub async fn search_companies_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CompanySearchResponse>> {
    record_call("search_companies");
    let params: CompanySearchParams = required_params(&body)?;
    let client = state.companies()?;

    let response = client.search_companies(&params).await?;
    tracing::info!(
        q = %params.q,
        items = response.len(),
        total_results = response.total_results,
        "Company search completed"
    );
    Ok(Json(response))
}

/// POST /tools/advanced_search_companies - Filtered search; every filter is optional.
pub async fn advanced_search_companies_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AdvancedSearchResponse>> {
    record_call("advanced_search_companies");
    let params: Option<AdvancedSearchParams> = optional_params(&body)?;
    let client = state.companies()?;

    let response = client.advanced_search_companies(params.as_ref()).await?;
    tracing::info!(
        hits = ?response.hits,
        items = response.items.len(),
        "Advanced company search completed"
    );
    Ok(Json(response))
}

/// POST /tools/search_officers
pub async fn search_officers_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<OfficerSearchResponse>> {
    record_call("search_officers");
    let params: OfficerSearchParams = required_params(&body)?;
    let client = state.companies()?;

    let response = client.search_officers(&params).await?;
    tracing::info!(items = response.len(), "Officer search completed");
    Ok(Json(response))
}

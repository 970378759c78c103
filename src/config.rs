use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::store::DedupPolicy;

pub const DEFAULT_COMPANIES_URL: &str = "https://api.company-information.service.gov.uk";
pub const DEFAULT_INTERESTS_URL: &str = "https://interests-api.parliament.uk/api/v1";
pub const DEFAULT_MEMBERS_URL: &str = "https://members-api.parliament.uk/api";
pub const DEFAULT_HANSARD_URL: &str = "https://hansard-api.parliament.uk";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    /// Companies registry API key. Sent as the Basic auth username.
    pub company_api_key: Option<String>,
    pub companies_base_url: String,
    pub interests_base_url: String,
    pub members_base_url: String,
    pub hansard_base_url: String,
    /// Per-request timeout applied by the HTTP transport.
    pub http_timeout: Duration,
    /// Total attempts, including the first one.
    pub retry_max_attempts: u32,
    pub retry_initial_backoff: Duration,
    pub retry_max_backoff: Duration,
    /// Capacity of the background indexing queue.
    pub index_queue_capacity: usize,
    /// Width of the hashing embedder vectors.
    pub embedding_dim: usize,
    /// Optional snapshot file for indexed debate documents.
    pub store_path: Option<PathBuf>,
    pub dedup_policy: DedupPolicy,
    pub search_default_k: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_secs: 5,
            company_api_key: None,
            companies_base_url: DEFAULT_COMPANIES_URL.to_string(),
            interests_base_url: DEFAULT_INTERESTS_URL.to_string(),
            members_base_url: DEFAULT_MEMBERS_URL.to_string(),
            hansard_base_url: DEFAULT_HANSARD_URL.to_string(),
            http_timeout: Duration::from_secs(30),
            retry_max_attempts: 3,
            retry_initial_backoff: Duration::from_millis(2000),
            retry_max_backoff: Duration::from_millis(8000),
            index_queue_capacity: 64,
            embedding_dim: 256,
            store_path: None,
            dedup_policy: DedupPolicy::UpsertById,
            search_default_k: 5,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// `COMPANY_API_KEY` is read here but only enforced when the companies
    /// client is constructed, so a missing key disables the company tools
    /// without taking down the parliamentary ones.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let dedup_policy = match env::var("DEDUP_POLICY") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.dedup_policy,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            company_api_key: env::var("COMPANY_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            companies_base_url: env::var("COMPANIES_BASE_URL")
                .unwrap_or(defaults.companies_base_url),
            interests_base_url: env::var("INTERESTS_BASE_URL")
                .unwrap_or(defaults.interests_base_url),
            members_base_url: env::var("MEMBERS_BASE_URL").unwrap_or(defaults.members_base_url),
            hansard_base_url: env::var("HANSARD_BASE_URL").unwrap_or(defaults.hansard_base_url),
            http_timeout: Duration::from_secs(
                env::var("HTTP_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
            ),
            retry_max_attempts: env::var("RETRY_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            retry_initial_backoff: Duration::from_millis(
                env::var("RETRY_INITIAL_BACKOFF_MS")
                    .unwrap_or_else(|_| "2000".to_string())
                    .parse()?,
            ),
            retry_max_backoff: Duration::from_millis(
                env::var("RETRY_MAX_BACKOFF_MS")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()?,
            ),
            index_queue_capacity: env::var("INDEX_QUEUE_CAPACITY")
                .unwrap_or_else(|_| "64".to_string())
                .parse()?,
            embedding_dim: env::var("EMBEDDING_DIM")
                .unwrap_or_else(|_| "256".to_string())
                .parse()?,
            store_path: env::var("STORE_PATH").ok().map(PathBuf::from),
            dedup_policy,
            search_default_k: env::var("SEARCH_DEFAULT_K")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
        })
    }
}

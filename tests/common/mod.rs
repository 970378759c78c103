//! Shared fixtures: a scripted upstream and a router wired to it.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use govdata::client::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use govdata::store::{HashingEmbedder, InMemoryVectorStore};
use govdata::{AppState, Config, DedupPolicy};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const COMPANIES_URL: &str = "http://companies.test";
pub const INTERESTS_URL: &str = "http://interests.test";
pub const MEMBERS_URL: &str = "http://members.test";
pub const HANSARD_URL: &str = "http://hansard.test";

type Reply = Result<HttpResponse, TransportError>;

/// Upstream stand-in keyed by exact URL.
///
/// Each URL holds a script of replies. The last reply repeats once the
/// script runs out. Unknown URLs answer 404.
#[derive(Default)]
pub struct StubTransport {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(self, url: impl Into<String>, body: Value) -> Self {
        self.script(url, vec![ok(body)])
    }

    pub fn script(self, url: impl Into<String>, replies: Vec<Reply>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.into(), replies.into_iter().collect());
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn get(&self, request: &HttpRequest) -> Reply {
        self.requests.lock().unwrap().push(request.clone());
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(&request.url) {
            Some(script) if script.len() > 1 => script.pop_front().unwrap(),
            Some(script) => script.front().cloned().unwrap(),
            None => Ok(HttpResponse {
                status: 404,
                body: json!({ "error": "not found" }).to_string(),
            }),
        }
    }
}

pub fn ok(body: Value) -> Reply {
    Ok(HttpResponse {
        status: 200,
        body: body.to_string(),
    })
}

pub fn status(code: u16, body: &str) -> Reply {
    Ok(HttpResponse {
        status: code,
        body: body.to_string(),
    })
}

pub fn timeout() -> Reply {
    Err(TransportError::Timeout("operation timed out".to_string()))
}

pub fn test_config(api_key: Option<&str>) -> Config {
    Config {
        company_api_key: api_key.map(str::to_string),
        companies_base_url: COMPANIES_URL.to_string(),
        interests_base_url: INTERESTS_URL.to_string(),
        members_base_url: MEMBERS_URL.to_string(),
        hansard_base_url: HANSARD_URL.to_string(),
        retry_initial_backoff: Duration::from_millis(1),
        retry_max_backoff: Duration::from_millis(4),
        embedding_dim: 512,
        ..Config::default()
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub transport: Arc<StubTransport>,
    pub store: Arc<InMemoryVectorStore>,
}

/// Build the full tool router over `transport`. Must run inside a Tokio runtime.
pub fn test_app(transport: StubTransport, api_key: Option<&str>) -> TestApp {
    let config = test_config(api_key);
    let transport = Arc::new(transport);
    let store = Arc::new(InMemoryVectorStore::new(
        Arc::new(HashingEmbedder::new(config.embedding_dim)),
        DedupPolicy::UpsertById,
    ));
    let state = Arc::new(AppState::with_parts(
        config,
        transport.clone(),
        store.clone(),
    ));
    TestApp {
        router: govdata::router(state.clone()),
        state,
        transport,
        store,
    }
}

/// Helper to make a JSON request to the router.
pub async fn json_request(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let req = match method {
        "GET" => Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
        "POST" => Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(body) => Body::from(body.to_string()),
                None => Body::empty(),
            })
            .unwrap(),
        _ => panic!("Unsupported method"),
    };

    let response = app.oneshot(req).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));

    (status, body)
}

/// Root debate `42` with one speech and one procedural line, and child
/// debate `43` with one more speech.
pub fn debate_json() -> Value {
    json!({
        "Overview": {
            "Id": 42,
            "ExtId": "ABC-123",
            "Title": "Border Security",
            "HRSTag": "hs_Debate",
            "Date": "2024-03-05",
            "Location": "Commons Chamber",
            "House": "Commons",
            "Source": 1,
            "VolumeNo": 746,
            "ContentLastUpdated": "None"
        },
        "Navigator": [{ "Id": 1, "Title": "Border Security", "ParentId": null }],
        "Items": [
            {
                "ItemType": "Contribution",
                "ItemId": 1,
                "MemberId": 100,
                "AttributedTo": "Jane Smith",
                "Value": "The border checks at Dover need more staff.",
                "OrderInSection": 1,
                "HRSTag": "hs_Para",
                "Timecode": "2024-03-05T14:31:00"
            },
            {
                "ItemType": "Timestamp",
                "ItemId": 2,
                "MemberId": "None",
                "Value": "14:32",
                "OrderInSection": 2
            }
        ],
        "ChildDebates": [{
            "Overview": {
                "Id": 43,
                "ExtId": "ABC-124",
                "Title": "Border Security: Ports",
                "HRSTag": "hs_8Question",
                "Date": "2024-03-05T00:00:00",
                "Location": "Commons Chamber",
                "House": "Commons",
                "Source": 1
            },
            "Navigator": [],
            "Items": [{
                "ItemType": "Contribution",
                "ItemId": 3,
                "MemberId": 200,
                "AttributedTo": "John Doe",
                "Value": "Ports funding was cut last year.",
                "OrderInSection": 1
            }],
            "ChildDebates": []
        }]
    })
}

pub fn debate_url(ext_id: &str) -> String {
    format!("{HANSARD_URL}/Debates/Debate/{ext_id}.json")
}

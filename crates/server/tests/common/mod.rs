//! Shared fakes and helpers for the HTTP and orchestrator tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use healthsync_core::{Claims, Diagnosis, PatientRecord, TokenVerifier, encode_hs256};
use healthsync_server::ai::{
    CompletionProvider, CompletionRequest, LiteratureSearch, Paper, ProviderError,
};
use healthsync_server::config::Config;
use healthsync_server::db::{PatientStore, StoreError};
use healthsync_server::state::AppState;
use http_body_util::BodyExt;
use serde_json::Value as JsonValue;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-jwt-secret";

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// How a fake store misbehaves
#[derive(Debug, Clone, Copy)]
pub enum StoreFault {
    /// Every call fails as if the pool could not connect
    Unreachable,
    /// Every call fails as a query error
    QueryFails,
}

/// In-memory patient store
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<PatientRecord>>,
    fault: Option<StoreFault>,
}

impl InMemoryStore {
    pub fn with(records: Vec<PatientRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            fault: None,
        }
    }

    pub fn faulty(fault: StoreFault) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fault: Some(fault),
        }
    }

    /// A store whose every call fails as unreachable
    pub fn unreachable() -> Self {
        Self::faulty(StoreFault::Unreachable)
    }

    fn check(&self) -> Result<(), StoreError> {
        match self.fault {
            None => Ok(()),
            Some(StoreFault::Unreachable) => {
                Err(StoreError::Unavailable("connection refused".to_string()))
            }
            Some(StoreFault::QueryFails) => Err(StoreError::Query(
                "relation \"patients\" does not exist".to_string(),
            )),
        }
    }
}

#[async_trait]
impl PatientStore for InMemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<PatientRecord>, StoreError> {
        self.check()?;
        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn create(&self, mut record: PatientRecord) -> Result<PatientRecord, StoreError> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        record.id = format!("p{}", records.len() + 1);
        records.push(record.clone());
        Ok(record)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<PatientRecord>, StoreError> {
        self.check()?;
        let records = self.records.lock().unwrap();
        Ok(records.iter().rev().take(limit as usize).cloned().collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }
}

/// What the fake provider answers with
#[derive(Clone)]
pub enum FakeReply {
    Text(String),
    NoChoices,
    Status(u16),
    Timeout,
}

/// Completion provider that records every request it receives
pub struct FakeProvider {
    reply: FakeReply,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeProvider {
    pub fn new(reply: FakeReply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(FakeReply::Text(text.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> CompletionRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("provider was never called")
    }
}

#[async_trait]
impl CompletionProvider for FakeProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<Option<String>, ProviderError> {
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            FakeReply::Text(text) => Ok(Some(text.clone())),
            FakeReply::NoChoices => Ok(None),
            FakeReply::Status(status) => Err(ProviderError::Status { status: *status }),
            FakeReply::Timeout => Err(ProviderError::Timeout),
        }
    }
}

/// Literature search returning canned papers or an upstream failure
pub struct FakeSearch {
    papers: Option<Vec<Paper>>,
    queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn returning(papers: Vec<Paper>) -> Self {
        Self {
            papers: Some(papers),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            papers: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl LiteratureSearch for FakeSearch {
    async fn search(&self, query: &str) -> Result<Vec<Paper>, ProviderError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.papers
            .clone()
            .ok_or(ProviderError::Status { status: 429 })
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn token_for(id: &str) -> String {
    let claims = Claims {
        id: Some(id.to_string()),
        email: None,
        exp: Some(chrono::Utc::now().timestamp() + 3600),
        iat: Some(chrono::Utc::now().timestamp()),
    };
    encode_hs256(&claims, TEST_SECRET).unwrap()
}

pub fn diagnosis(disease: &str, code: &str, notes: &str, created_by: &str) -> Diagnosis {
    Diagnosis {
        disease: Some(disease.to_string()),
        icd11: Some(code.to_string()),
        notes: Some(notes.to_string()),
        created_by: Some(created_by.to_string()),
    }
}

pub fn patient(id: &str, created_by: &str, diagnoses: Vec<Diagnosis>) -> PatientRecord {
    PatientRecord {
        id: id.to_string(),
        name: Some("Maria Garcia".to_string()),
        age: Some(47),
        icd11: Some("CA23".to_string()),
        created_by: Some(created_by.to_string()),
        created_at: None,
        diagnosis: diagnoses,
    }
}

pub fn test_config(rate_limit_rps: u32) -> Config {
    Config {
        database_url: String::new(), // unused, the store is injected
        bind_address: "0.0.0.0:0".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        groq_api_key: None,
        groq_model: "test-model".to_string(),
        serpapi_key: None,
        ai_timeout: std::time::Duration::from_secs(5),
        cors_origins: vec!["*".to_string()],
        rate_limit_rps,
    }
}

pub fn state(
    store: Arc<dyn PatientStore>,
    provider: Option<Arc<dyn CompletionProvider>>,
    search: Option<Arc<dyn LiteratureSearch>>,
) -> AppState {
    AppState::new(TokenVerifier::new(TEST_SECRET), store, provider, search)
}

/// Build the app router with test configuration.
pub fn test_app(
    store: Arc<dyn PatientStore>,
    provider: Option<Arc<dyn CompletionProvider>>,
    search: Option<Arc<dyn LiteratureSearch>>,
) -> Router {
    healthsync_server::build_app(state(store, provider, search), &test_config(1000))
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Send a request to the app and return (status, body as JSON).
pub async fn request(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let response = app.clone().oneshot(req).await.expect("Request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();

    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };

    (status, body)
}

/// Build a POST request with a JSON body and an optional bearer token.
pub fn post(uri: &str, token: Option<&str>, body: JsonValue) -> Request<Body> {
    post_raw(uri, token, serde_json::to_vec(&body).unwrap())
}

/// Build a POST request with raw bytes as a JSON body.
pub fn post_raw(uri: &str, token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

/// Build a GET request with an optional bearer token.
pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

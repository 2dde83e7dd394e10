//! Literature search through SerpApi's Google Scholar engine

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::{ProviderError, truncate};

const API_URL: &str = "https://serpapi.com/search.json";
const RESULTS_PER_QUERY: &str = "100";

/// A paper as returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub publication: String,
    pub cited_by: u64,
    pub authors: Vec<String>,
    pub year: String,
}

#[async_trait]
pub trait LiteratureSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Paper>, ProviderError>;
}

#[derive(Debug, Default, Deserialize)]
struct ScholarResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OrganicResult {
    title: String,
    link: String,
    snippet: String,
    publication_info: PublicationInfo,
    inline_links: InlineLinks,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PublicationInfo {
    summary: String,
    authors: Vec<Author>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Author {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InlineLinks {
    cited_by: CitedBy,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CitedBy {
    total: u64,
}

impl From<OrganicResult> for Paper {
    fn from(result: OrganicResult) -> Self {
        let year = first_year(&result.publication_info.summary).to_string();
        Paper {
            title: result.title,
            link: result.link,
            snippet: result.snippet,
            publication: result.publication_info.summary,
            cited_by: result.inline_links.cited_by.total,
            authors: result
                .publication_info
                .authors
                .into_iter()
                .map(|a| a.name)
                .collect(),
            year,
        }
    }
}

/// First run of four ASCII digits, or "" when there is none
fn first_year(summary: &str) -> &str {
    summary
        .as_bytes()
        .windows(4)
        .position(|w| w.iter().all(u8::is_ascii_digit))
        .map(|i| &summary[i..i + 4])
        .unwrap_or("")
}

/// SerpApi client
#[derive(Clone)]
pub struct SerpApiClient {
    http: reqwest::Client,
    api_key: String,
    url: String,
}

impl SerpApiClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            api_key,
            url: API_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl LiteratureSearch for SerpApiClient {
    async fn search(&self, query: &str) -> Result<Vec<Paper>, ProviderError> {
        let response = self
            .http
            .get(&self.url)
            .query(&[
                ("engine", "google_scholar"),
                ("q", query),
                ("api_key", self.api_key.as_str()),
                ("num", RESULTS_PER_QUERY),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                detail = %truncate(&detail, 512),
                "Literature search returned an error"
            );
            return Err(ProviderError::Status {
                status: status.as_u16(),
            });
        }

        let parsed: ScholarResponse = response.json().await?;
        Ok(parsed.organic_results.into_iter().map(Paper::from).collect())
    }
}

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod config;

pub use config::CrawlConfig;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("http status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("response body over {limit} bytes for {url}")]
    Truncated { limit: u64, url: String },
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed page: {0}")]
    Malformed(String),
    #[error("invalid config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A registry partition (investigations, hearings, ...). Keys appear in listing URLs and record ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub key: String,
    pub label: String,
}

impl Category {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// One listing entry: the detail page to fetch, and the category it was listed under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskDescriptor {
    pub detail_url: String,
    pub category_key: String,
    pub category_label: String,
    /// Date fragment shown on the listing card, when the listing has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listed_date: Option<String>,
}

impl TaskDescriptor {
    /// Stable identifier: `{category_key}_{last path segment}` (query and fragment dropped).
    ///
    /// Returns `None` when the URL has no usable trailing segment.
    pub fn stable_id(&self) -> Option<String> {
        let segment = trailing_segment(&self.detail_url)?;
        Some(format!("{}_{}", self.category_key, segment))
    }
}

fn trailing_segment(raw: &str) -> Option<String> {
    if let Ok(u) = url::Url::parse(raw) {
        return u
            .path_segments()
            .and_then(|mut segs| segs.rfind(|s| !s.is_empty()))
            .map(|s| s.to_string());
    }
    // Relative or otherwise unparseable: fall back to plain string surgery.
    let path = raw.split(['?', '#']).next().unwrap_or("");
    path.split('/')
        .rfind(|s| !s.is_empty())
        .map(|s| s.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineEvent {
    /// Localized date string exactly as shown on the page.
    pub date: String,
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityMention {
    pub org_full: String,
    /// Empty when no abbreviation is known.
    pub org_abbr: String,
    pub action: String,
}

/// The unit of output. Built once per successfully fetched detail page and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseRecord {
    pub id: String,
    pub category_key: String,
    pub category_label: String,
    pub url: String,
    pub title: String,
    pub analysis: Vec<EntityMention>,
    pub events: Vec<TimelineEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listed_date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    /// Timeout for the operation (network + body read).
    pub timeout_ms: Option<u64>,
    /// Hard cap on bytes read from the response body.
    pub max_bytes: Option<u64>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_ms: None,
            max_bytes: None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// URL after redirects; relative links on the page resolve against it.
    pub final_url: String,
    pub status: u16,
    pub bytes: Vec<u8>,
    /// The body hit `max_bytes` and was cut short.
    pub truncated: bool,
}

impl FetchResponse {
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).to_string()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait::async_trait]
pub trait FetchBackend: Send + Sync {
    async fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse>;
}

//! Crawl configuration: the registry location, the category set, and the bounds the pipeline runs
//! under. Passed explicitly into the pipeline entry point; there is no process-wide state.

use crate::{Category, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.cipas.gov.tw";
pub const DEFAULT_MAX_PAGES: u32 = 10;
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_USER_AGENT: &str = "docketcrawl/0.1";

pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("investigations", "調查進度"),
        Category::new("hearings", "聽證程序"),
        Category::new("administrative_actions", "行政處分"),
        Category::new("litigations", "相關訴訟"),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CrawlConfig {
    pub base_url: String,
    pub categories: Vec<Category>,
    /// Upper bound on listing pages requested per category.
    pub max_pages: u32,
    /// Detail fetches in flight at once.
    pub concurrency: usize,
    /// Per-request timeout, applied to listing and detail fetches alike.
    pub timeout_ms: u64,
    pub max_bytes: Option<u64>,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            categories: default_categories(),
            max_pages: DEFAULT_MAX_PAGES,
            concurrency: DEFAULT_CONCURRENCY,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_bytes: Some(8 * 1024 * 1024),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// 1-based listing page URL for a category: `{base}/{key}?&page={n}`.
    pub fn listing_url(&self, category: &Category, page: u32) -> String {
        format!("{}/{}?&page={}", self.base(), category.key, page)
    }

    /// Reject anything that would make the crawl meaningless. Runs before any network request.
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("base_url {:?}: {e}", self.base_url)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base_url must be http(s), got scheme {:?}",
                base.scheme()
            )));
        }
        if self.categories.is_empty() {
            return Err(Error::Config("at least one category is required".to_string()));
        }
        let mut seen = BTreeSet::new();
        for c in &self.categories {
            if c.key.is_empty()
                || !c
                    .key
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
            {
                return Err(Error::Config(format!("invalid category key {:?}", c.key)));
            }
            if c.label.trim().is_empty() {
                return Err(Error::Config(format!("category {:?} has an empty label", c.key)));
            }
            if !seen.insert(c.key.as_str()) {
                return Err(Error::Config(format!("duplicate category key {:?}", c.key)));
            }
        }
        if self.max_pages == 0 {
            return Err(Error::Config("max_pages must be positive".to_string()));
        }
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be positive".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(Error::Config("timeout_ms must be positive".to_string()));
        }
        if self.max_bytes == Some(0) {
            return Err(Error::Config("max_bytes must be positive when set".to_string()));
        }
        Ok(())
    }
}

/// Parse a `key=label` category argument, as given on the command line.
pub fn parse_category(raw: &str) -> Result<Category> {
    let Some((key, label)) = raw.split_once('=') else {
        return Err(Error::Config(format!(
            "category {raw:?} must look like key=label"
        )));
    };
    Ok(Category::new(key.trim(), label.trim()))
}

use docketcrawl_core::{CrawlConfig, Error, FetchBackend, FetchRequest, FetchResponse, Result};
use std::time::Duration;

pub mod assemble;
pub mod canonical;
pub mod dedup;
pub mod detail;
pub mod entities;
pub mod listing;
pub mod pipeline;
pub mod pool;
#[cfg(test)]
pub(crate) mod testing;

pub use pipeline::{crawl, CrawlReport};

#[derive(Debug, Clone)]
pub struct LocalFetcher {
    client: reqwest::Client,
}

impl LocalFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            // Per-request timeouts (FetchRequest.timeout_ms) override the overall one.
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Fetch(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl FetchBackend for LocalFetcher {
    async fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse> {
        let url = url::Url::parse(&req.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let mut rb = self.client.get(url);
        if let Some(to) = req.timeout() {
            rb = rb.timeout(to);
        }
        let resp = rb.send().await.map_err(|e| Error::Fetch(e.to_string()))?;
        let final_url = resp.url().to_string();
        let status = resp.status().as_u16();

        let max_bytes = req.max_bytes.unwrap_or(u64::MAX) as usize;
        let mut truncated = false;
        let mut bytes = Vec::new();
        let mut stream = resp.bytes_stream();
        use futures_util::StreamExt;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Fetch(e.to_string()))?;
            if bytes.len().saturating_add(chunk.len()) > max_bytes {
                let can_take = max_bytes.saturating_sub(bytes.len());
                bytes.extend_from_slice(&chunk[..can_take]);
                truncated = true;
                break;
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(FetchResponse {
            final_url,
            status,
            bytes,
            truncated,
        })
    }
}

/// A successfully fetched HTML page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Where the page ended up after redirects; the base for its relative links.
    pub final_url: String,
    pub html: String,
}

/// GET `url` under the configured timeout and body cap.
///
/// Transport errors, non-2xx statuses, bodies cut off at `max_bytes`, and deadline overruns all
/// come back as `Err`; callers treat them as an absent page. A truncated body is never parsed,
/// since a partial listing could read as an empty one.
pub async fn fetch_html(
    fetcher: &dyn FetchBackend,
    cfg: &CrawlConfig,
    url: &str,
) -> Result<FetchedPage> {
    let req = FetchRequest {
        url: url.to_string(),
        timeout_ms: Some(cfg.timeout_ms),
        max_bytes: cfg.max_bytes,
    };
    // The backend may not honor timeout_ms; enforce the deadline here too.
    let resp = tokio::time::timeout(cfg.timeout(), fetcher.fetch(&req))
        .await
        .map_err(|_| Error::Timeout(cfg.timeout()))??;
    if !resp.is_success() {
        return Err(Error::Status {
            status: resp.status,
            url: url.to_string(),
        });
    }
    if resp.truncated {
        return Err(Error::Truncated {
            limit: cfg.max_bytes.unwrap_or_default(),
            url: url.to_string(),
        });
    }
    Ok(FetchedPage {
        html: resp.text_lossy(),
        final_url: resp.final_url,
    })
}

pub(crate) fn norm_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve `href` against `base`, dropping fragments. Skips script and mail links.
pub(crate) fn resolve_href(href: &str, base: Option<&url::Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let href_lc = href.to_ascii_lowercase();
    if href_lc.starts_with("javascript:") || href_lc.starts_with("mailto:") {
        return None;
    }
    let mut u = match url::Url::parse(href) {
        Ok(u) => u,
        Err(_) => base?.join(href).ok()?,
    };
    u.set_fragment(None);
    Some(u.to_string())
}

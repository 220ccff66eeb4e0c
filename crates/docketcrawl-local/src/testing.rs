//! In-memory fetch backend for pipeline tests.

use docketcrawl_core::{Error, FetchBackend, FetchRequest, FetchResponse, Result};
use std::collections::HashMap;
use std::sync::Mutex;

pub(crate) enum Canned {
    Page(u16, String),
    /// Body cut off at the byte cap.
    Truncated(String),
    Transport,
}

#[derive(Default)]
pub(crate) struct MockBackend {
    routes: HashMap<String, Canned>,
    requested: Mutex<Vec<String>>,
}

impl MockBackend {
    pub(crate) fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.routes
            .insert(url.to_string(), Canned::Page(200, html.into()));
        self
    }

    pub(crate) fn status(mut self, url: &str, status: u16) -> Self {
        self.routes
            .insert(url.to_string(), Canned::Page(status, String::new()));
        self
    }

    pub(crate) fn truncated(mut self, url: &str, partial: impl Into<String>) -> Self {
        self.routes
            .insert(url.to_string(), Canned::Truncated(partial.into()));
        self
    }

    pub(crate) fn broken(mut self, url: &str) -> Self {
        self.routes.insert(url.to_string(), Canned::Transport);
        self
    }

    pub(crate) fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait::async_trait]
impl FetchBackend for MockBackend {
    async fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse> {
        self.requested
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(req.url.clone());
        // Unknown URLs render as an empty page (no items, no header).
        let (status, body, truncated) = match self.routes.get(&req.url) {
            Some(Canned::Page(status, body)) => (*status, body.clone(), false),
            Some(Canned::Truncated(body)) => (200, body.clone(), true),
            Some(Canned::Transport) => {
                return Err(Error::Fetch(format!("connection reset: {}", req.url)))
            }
            None => (200, "<html><body></body></html>".to_string(), false),
        };
        Ok(FetchResponse {
            final_url: req.url.clone(),
            status,
            bytes: body.into_bytes(),
            truncated,
        })
    }
}

pub(crate) fn listing_html(hrefs: &[&str]) -> String {
    let items: String = hrefs
        .iter()
        .map(|h| {
            format!(
                r#"<div class="col-sm-4"><div class="thumbnail"><div class="caption"><a class="doc-title" href="{h}">t</a></div></div></div>"#
            )
        })
        .collect();
    format!(r#"<html><body><div class="doc-gallery-view">{items}</div></body></html>"#)
}

pub(crate) fn detail_html(title: &str) -> String {
    format!(
        r#"<html><body><h1 class="page-header">{title}</h1>
        <div class="pg-row"><div class="date">105年3月1日</div><div class="caption">立案調查</div></div>
        </body></html>"#
    )
}

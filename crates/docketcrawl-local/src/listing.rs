//! Listing pages: parse item links, and walk each category's pages until one comes back empty.

use crate::{fetch_html, norm_ws, resolve_href};
use docketcrawl_core::{Category, CrawlConfig, FetchBackend, TaskDescriptor};
use html_scraper::{ElementRef, Html, Selector};

/// Item links on a listing page: the document gallery, or meetings-style thumbnail cards.
const ITEM_SELECTOR: &str = ".doc-gallery-view a.doc-title, .thumbnail .caption a.doc-title";
const DATE_SELECTOR: &str = ".date";
/// How far up from an item link we look for its card's date.
const DATE_SEARCH_DEPTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    pub url: String,
    pub date: Option<String>,
}

/// Extract items from one listing page, in document order.
///
/// An empty result means end-of-list for the category.
pub fn parse_listing(html: &str, base_url: &str) -> Vec<ListingItem> {
    let base = url::Url::parse(base_url).ok();
    let doc = Html::parse_document(html);
    let (Ok(item_sel), Ok(date_sel)) = (
        Selector::parse(ITEM_SELECTOR),
        Selector::parse(DATE_SELECTOR),
    ) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for link in doc.select(&item_sel) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_href(href, base.as_ref()) else {
            continue;
        };
        out.push(ListingItem {
            url,
            date: card_date(link, &item_sel, &date_sel),
        });
    }
    out
}

/// The `.date` inside the smallest ancestor that holds exactly this one item.
fn card_date(link: ElementRef<'_>, item_sel: &Selector, date_sel: &Selector) -> Option<String> {
    for node in link.ancestors().take(DATE_SEARCH_DEPTH) {
        let Some(card) = ElementRef::wrap(node) else {
            continue;
        };
        if card.select(item_sel).count() > 1 {
            return None;
        }
        if let Some(date) = card.select(date_sel).next() {
            let text = norm_ws(&date.text().collect::<String>());
            return (!text.is_empty()).then_some(text);
        }
    }
    None
}

#[derive(Debug, Clone)]
pub struct PageFailure {
    pub category_key: String,
    pub page: u32,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryScan {
    pub category_key: String,
    pub tasks: Vec<TaskDescriptor>,
    /// Pages requested, including failed ones.
    pub pages_requested: u32,
    /// True when a page came back with zero items (as opposed to hitting `max_pages`).
    pub reached_end: bool,
    pub failures: Vec<PageFailure>,
}

/// Walk `category`'s listing pages 1..=max_pages in order.
///
/// A page that parses to zero items ends the walk. A page that fails to fetch (including one cut
/// off at `max_bytes`) is logged and skipped; it does not end the walk.
pub async fn scan_category(
    fetcher: &dyn FetchBackend,
    cfg: &CrawlConfig,
    category: &Category,
) -> CategoryScan {
    let mut scan = CategoryScan {
        category_key: category.key.clone(),
        ..CategoryScan::default()
    };

    for page in 1..=cfg.max_pages {
        let url = cfg.listing_url(category, page);
        scan.pages_requested += 1;
        let fetched = match fetch_html(fetcher, cfg, &url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(category = %category.key, page, error = %e, "listing page skipped");
                scan.failures.push(PageFailure {
                    category_key: category.key.clone(),
                    page,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let items = parse_listing(&fetched.html, &fetched.final_url);
        if items.is_empty() {
            tracing::debug!(category = %category.key, page, "empty listing page, end of list");
            scan.reached_end = true;
            break;
        }
        tracing::debug!(category = %category.key, page, items = items.len(), "listing page parsed");
        scan.tasks.extend(items.into_iter().map(|it| TaskDescriptor {
            detail_url: it.url,
            category_key: category.key.clone(),
            category_label: category.label.clone(),
            listed_date: it.date,
        }));
    }
    scan
}

/// Scan every configured category concurrently. Results come back in category order.
pub async fn scan_all(fetcher: &dyn FetchBackend, cfg: &CrawlConfig) -> Vec<CategoryScan> {
    futures_util::future::join_all(
        cfg.categories
            .iter()
            .map(|c| scan_category(fetcher, cfg, c)),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{listing_html, MockBackend};

    const BASE: &str = "https://reg.example";

    fn cfg(max_pages: u32) -> CrawlConfig {
        CrawlConfig {
            base_url: BASE.to_string(),
            categories: vec![Category::new("hearings", "聽證程序")],
            max_pages,
            ..CrawlConfig::default()
        }
    }

    fn page_url(n: u32) -> String {
        format!("{BASE}/hearings?&page={n}")
    }

    #[test]
    fn parses_gallery_links_and_card_dates() {
        let html = r#"
        <div class="doc-gallery-view">
          <div class="col-sm-4"><div class="thumbnail"><div class="caption">
            <a class="doc-title" href="/meetings/508">第一次</a>
            <div class="date">2026/02/10 (二)</div>
          </div></div></div>
          <div class="col-sm-4"><div class="thumbnail"><div class="caption">
            <a class="doc-title" href="https://reg.example/meetings/509?x=1#frag">第二次</a>
          </div></div></div>
        </div>
        <aside><a class="doc-title" href="/elsewhere">not an item</a></aside>
        "#;
        let items = parse_listing(html, "https://reg.example/meetings?&page=1");
        assert_eq!(
            items,
            vec![
                ListingItem {
                    url: "https://reg.example/meetings/508".to_string(),
                    date: Some("2026/02/10 (二)".to_string()),
                },
                ListingItem {
                    url: "https://reg.example/meetings/509?x=1".to_string(),
                    date: None,
                },
            ]
        );
    }

    #[test]
    fn page_without_item_blocks_is_empty() {
        assert!(parse_listing("<html><body><p>無資料</p></body></html>", BASE).is_empty());
    }

    #[tokio::test]
    async fn stops_at_first_empty_page() {
        let backend = MockBackend::default()
            .page(&page_url(1), listing_html(&["/hearings/1", "/hearings/2"]))
            .page(&page_url(2), listing_html(&["/hearings/3"]));
        let c = cfg(10);
        let scan = scan_category(&backend, &c, &c.categories[0]).await;

        assert_eq!(scan.tasks.len(), 3);
        assert!(scan.reached_end);
        assert_eq!(scan.pages_requested, 3);
        assert_eq!(
            backend.requested(),
            vec![page_url(1), page_url(2), page_url(3)]
        );
        assert_eq!(scan.tasks[0].category_label, "聽證程序");
        assert_eq!(scan.tasks[2].detail_url, "https://reg.example/hearings/3");
    }

    #[tokio::test]
    async fn fetch_failure_does_not_end_pagination() {
        let backend = MockBackend::default()
            .page(&page_url(1), listing_html(&["/hearings/1"]))
            .broken(&page_url(2))
            .page(&page_url(3), listing_html(&["/hearings/3"]));
        let c = cfg(10);
        let scan = scan_category(&backend, &c, &c.categories[0]).await;

        let urls: Vec<_> = scan.tasks.iter().map(|t| t.detail_url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://reg.example/hearings/1", "https://reg.example/hearings/3"]
        );
        assert_eq!(scan.failures.len(), 1);
        assert_eq!(scan.failures[0].page, 2);
        assert_eq!(backend.requested().len(), 4);
    }

    #[tokio::test]
    async fn error_status_is_skipped_like_a_transport_failure() {
        let backend = MockBackend::default()
            .status(&page_url(1), 503)
            .page(&page_url(2), listing_html(&["/hearings/9"]));
        let c = cfg(10);
        let scan = scan_category(&backend, &c, &c.categories[0]).await;
        assert_eq!(scan.tasks.len(), 1);
        assert_eq!(scan.failures.len(), 1);
        assert!(scan.reached_end);
    }

    #[tokio::test]
    async fn truncated_page_is_skipped_not_end_of_list() {
        let backend = MockBackend::default()
            .truncated(&page_url(1), "<html><body><div class=\"doc-gallery-view\">")
            .page(&page_url(2), listing_html(&["/hearings/2"]));
        let c = cfg(10);
        let scan = scan_category(&backend, &c, &c.categories[0]).await;

        assert_eq!(scan.failures.len(), 1);
        assert_eq!(scan.failures[0].page, 1);
        assert_eq!(scan.tasks.len(), 1);
        assert_eq!(backend.requested().len(), 3);
        assert!(scan.reached_end);
    }

    #[tokio::test]
    async fn respects_max_pages() {
        let mut backend = MockBackend::default();
        for n in 1..=5 {
            backend = backend.page(&page_url(n), listing_html(&["/hearings/1"]));
        }
        let c = cfg(3);
        let scan = scan_category(&backend, &c, &c.categories[0]).await;
        assert_eq!(scan.pages_requested, 3);
        assert!(!scan.reached_end);
        assert_eq!(backend.requested().len(), 3);
    }
}

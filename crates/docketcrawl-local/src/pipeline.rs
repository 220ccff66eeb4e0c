//! The whole crawl: paginate, dedup, fetch details, assemble.

use crate::dedup::dedup_tasks;
use crate::listing::{scan_all, PageFailure};
use crate::pool::{run_pool, TaskFailure};
use docketcrawl_core::{CaseRecord, CrawlConfig, FetchBackend, Result};

#[derive(Debug, Default)]
pub struct CrawlReport {
    pub records: Vec<CaseRecord>,
    /// Listing entries seen across all pages, before dedup.
    pub listed: usize,
    /// Entries left after dedup (the number of detail fetches attempted).
    pub unique: usize,
    pub page_failures: Vec<PageFailure>,
    pub task_failures: Vec<TaskFailure>,
}

/// Crawl every configured category and return the assembled records.
///
/// Only an invalid config is an error; it is reported before any request goes out. Page and
/// task failures are collected in the report.
pub async fn crawl(fetcher: &dyn FetchBackend, cfg: &CrawlConfig) -> Result<CrawlReport> {
    cfg.validate()?;

    tracing::info!(
        base = %cfg.base_url,
        categories = cfg.categories.len(),
        max_pages = cfg.max_pages,
        "scanning listings"
    );
    let scans = scan_all(fetcher, cfg).await;
    let mut page_failures = Vec::new();
    let mut tasks = Vec::new();
    for scan in scans {
        tracing::info!(
            category = %scan.category_key,
            tasks = scan.tasks.len(),
            pages = scan.pages_requested,
            reached_end = scan.reached_end,
            "category scanned"
        );
        tasks.extend(scan.tasks);
        page_failures.extend(scan.failures);
    }

    let listed = tasks.len();
    let tasks = dedup_tasks(tasks);
    let unique = tasks.len();
    tracing::info!(listed, unique, concurrency = cfg.concurrency, "fetching details");

    let pool = run_pool(fetcher, cfg, &tasks).await;
    tracing::info!(
        records = pool.records.len(),
        absent = pool.failures.len(),
        page_failures = page_failures.len(),
        "crawl finished"
    );
    Ok(CrawlReport {
        records: pool.records,
        listed,
        unique,
        page_failures,
        task_failures: pool.failures,
    })
}

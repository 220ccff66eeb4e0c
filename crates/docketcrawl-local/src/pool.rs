//! Bounded detail-fetch pool.
//!
//! Each task is fetched, parsed, and assembled on its own; a failure makes that task absent and
//! nothing else. No retries.

use crate::assemble::assemble;
use crate::detail::parse_detail;
use crate::fetch_html;
use docketcrawl_core::{CaseRecord, CrawlConfig, Error, FetchBackend, TaskDescriptor};
use futures_util::stream::{self, StreamExt};

#[derive(Debug)]
pub struct TaskFailure {
    pub url: String,
    pub category_key: String,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct PoolReport {
    /// Assembled records, in task submission order.
    pub records: Vec<CaseRecord>,
    pub failures: Vec<TaskFailure>,
}

async fn process_task(
    fetcher: &dyn FetchBackend,
    cfg: &CrawlConfig,
    task: &TaskDescriptor,
) -> Result<CaseRecord, TaskFailure> {
    let run = async {
        let page = fetch_html(fetcher, cfg, &task.detail_url).await?;
        let detail = parse_detail(&page.html, &page.final_url)?;
        assemble(task, detail)
    };
    run.await.map_err(|error| TaskFailure {
        url: task.detail_url.clone(),
        category_key: task.category_key.clone(),
        error,
    })
}

/// Run every task with at most `cfg.concurrency` in flight.
pub async fn run_pool(
    fetcher: &dyn FetchBackend,
    cfg: &CrawlConfig,
    tasks: &[TaskDescriptor],
) -> PoolReport {
    let results: Vec<_> = stream::iter(tasks)
        .map(|t| process_task(fetcher, cfg, t))
        .buffered(cfg.concurrency.max(1))
        .collect()
        .await;

    let mut report = PoolReport::default();
    for r in results {
        match r {
            Ok(rec) => {
                tracing::debug!(id = %rec.id, mentions = rec.analysis.len(), "record assembled");
                report.records.push(rec);
            }
            Err(f) => {
                tracing::warn!(url = %f.url, category = %f.category_key, error = %f.error, "detail task absent");
                report.failures.push(f);
            }
        }
    }
    report
}

//! Merge a task, its parsed detail page, and the title's entity mentions into one record.

use crate::detail::DetailPage;
use crate::entities;
use docketcrawl_core::{CaseRecord, Error, Result, TaskDescriptor};

/// All-or-nothing: either a complete record or an error, never a partial record.
pub fn assemble(task: &TaskDescriptor, detail: DetailPage) -> Result<CaseRecord> {
    let id = task
        .stable_id()
        .ok_or_else(|| Error::Malformed(format!("no stable id in {}", task.detail_url)))?;
    let title = detail.title.trim();
    if title.is_empty() {
        return Err(Error::Malformed(format!("empty title at {}", task.detail_url)));
    }
    let analysis = entities::extract_mentions(title, &task.category_label);
    Ok(CaseRecord {
        id,
        category_key: task.category_key.clone(),
        category_label: task.category_label.clone(),
        url: task.detail_url.clone(),
        title: title.to_string(),
        analysis,
        events: detail.events,
        attachments: detail.attachments,
        listed_date: task.listed_date.clone(),
    })
}

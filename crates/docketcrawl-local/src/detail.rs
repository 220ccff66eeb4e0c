//! Detail pages: header title, timeline rows, attachment links.

use crate::{norm_ws, resolve_href};
use docketcrawl_core::{Attachment, Error, Result, TimelineEvent};
use html_scraper::{ElementRef, Html, Selector};

const TITLE_SELECTOR: &str = "h1.page-header";
const ROW_SELECTOR: &str = "div.pg-row";
const ROW_DATE_SELECTOR: &str = ".date";
const ROW_CAPTION_SELECTOR: &str = ".caption";
const ROW_DESC_SELECTOR: &str = ".desc";
const ATTACHMENT_SELECTOR: &str = ".attachfiles li a[href]";
const ATTACHMENT_LABELS: &[&str] = &["檔案名稱：", "檔案名稱:"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPage {
    pub title: String,
    pub events: Vec<TimelineEvent>,
    pub attachments: Vec<Attachment>,
}

fn selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| Error::Malformed(format!("selector {s:?}: {e}")))
}

fn text_of(el: ElementRef<'_>) -> String {
    norm_ws(&el.text().collect::<String>())
}

fn first_text(scope: ElementRef<'_>, sel: &Selector) -> Option<String> {
    scope
        .select(sel)
        .next()
        .map(text_of)
        .filter(|t| !t.is_empty())
}

/// Parse one detail page. Fails with [`Error::Malformed`] when the header title is missing or
/// blank; everything else is optional.
///
/// The title is kept as scraped, only trimmed at the ends.
pub fn parse_detail(html: &str, page_url: &str) -> Result<DetailPage> {
    let doc = Html::parse_document(html);
    let title = doc
        .select(&selector(TITLE_SELECTOR)?)
        .next()
        .map(|h| h.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::Malformed(format!("no page header in {page_url}")))?;

    let row_sel = selector(ROW_SELECTOR)?;
    let date_sel = selector(ROW_DATE_SELECTOR)?;
    let caption_sel = selector(ROW_CAPTION_SELECTOR)?;
    let desc_sel = selector(ROW_DESC_SELECTOR)?;
    let events = doc
        .select(&row_sel)
        .filter_map(|row| {
            let date = first_text(row, &date_sel);
            let caption = first_text(row, &caption_sel);
            if date.is_none() && caption.is_none() {
                return None;
            }
            Some(TimelineEvent {
                date: date.unwrap_or_default(),
                caption: caption.unwrap_or_default(),
                description: first_text(row, &desc_sel),
            })
        })
        .collect();

    let base = url::Url::parse(page_url).ok();
    let attachments = doc
        .select(&selector(ATTACHMENT_SELECTOR)?)
        .filter_map(|a| {
            let url = resolve_href(a.value().attr("href")?, base.as_ref())?;
            let raw = a
                .value()
                .attr("title")
                .map(norm_ws)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| text_of(a));
            let name = ATTACHMENT_LABELS
                .iter()
                .fold(raw.as_str(), |s, label| s.trim_start_matches(label))
                .trim()
                .to_string();
            Some(Attachment { name, url })
        })
        .collect();

    Ok(DetailPage {
        title,
        events,
        attachments,
    })
}

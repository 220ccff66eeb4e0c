//! Title entity extraction.
//!
//! Case titles are one-sentence descriptions ("命中央投資股份有限公司移轉其所有之不動產").
//! We infer the organizations they concern with layered heuristics, in strict priority order,
//! stopping at the first strategy that yields anything:
//!
//! 1. whitelist scan for the few organizations that dominate the registry
//! 2. guided segmentation between an action anchor and a terminal anchor
//! 3. a legal-entity-shaped name at the very start of the title
//! 4. the named party, when nothing else matched
//!
//! All names pass through [`crate::canonical::canonicalize`] before the length filter.

use crate::canonical::{self, WHITELIST};
use docketcrawl_core::EntityMention;
use regex::Regex;
use std::sync::OnceLock;

pub const ACTION_SEPARATOR: &str = "、";
/// Shorter fragments are not plausible organization names.
pub const MIN_ORG_CHARS: usize = 4;
pub const LEADING_WINDOW_CHARS: usize = 20;
pub const PARTY_NAME: &str = "中國國民黨";

const LEGAL_PREFIXES: &[&str] = &["財團法人", "社團法人"];
const CORPORATE_SUFFIX: &str = "股份有限公司";
const ORG_SUFFIXES: &[&str] = &["公司", "基金會", "總會", "協會", "聯合會", "救國團", "黨"];
const PLACEHOLDERS: &[&str] = &["其", "其所有", "本會"];

/// `(label, required markers)`; every marker must occur in the title.
const ACTION_RULES: &[(&str, &[&str])] = &[
    ("認定附隨組織", &["認定", "附隨組織"]),
    ("命其移轉", &["移轉"]),
    ("追徵價額", &["追徵"]),
    ("凍結帳戶", &["凍結"]),
    ("處以罰鍰", &["罰鍰"]),
    ("提存法院", &["提存"]),
    ("停止執行", &["停止執行"]),
    ("舉行聽證", &["聽證"]),
    ("啟動調查", &["調查"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Whitelist,
    Segmentation,
    LeadingPattern,
    PartyFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// The strategy that produced `mentions`; `None` when nothing matched.
    pub strategy: Option<Strategy>,
    pub mentions: Vec<EntityMention>,
}

struct Patterns {
    segment: Regex,
    leading: Regex,
    docket: Regex,
    bracket: Regex,
    noise_prefix: Regex,
    descriptor: Regex,
    dangling_tail: Regex,
    org_tail: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("static pattern");
        Patterns {
            segment: re(
                r"(?:就|針對|關於|命|認定|追徵|凍結|因|處分|為)(.*?)(?:是否|將|為|之|所有|違法|特定|應|案|申請|舉行|$)",
            ),
            leading: re(r"^(?:[財社]團法人.*?基金會|[財社]團法人.*?總會|.*?股份有限公司)"),
            docket: re(
                r"[\(（][^\)）]*?第[^\)）]*?號[\)）]|[\(（]\d+[\)）][^\s、]*?字第[0-9０-９]+號",
            ),
            bracket: re(r"[\(（]([^\)）]*)[\)）]"),
            noise_prefix: re(
                r"^(?:認定|命|追徵|凍結|處分|因|關於|就|針對|移轉|及其所有之|及其|申請再次舉行|舉行)",
            ),
            descriptor: re(
                r"是否|將|為|之|所有|座落|特定|違法|名下|不當|申請|舉行|預備聽證",
            ),
            dangling_tail: re(r"(?:因|及|案)$"),
            org_tail: re(r"^(.*(?:公司|基金會|總會|協會|聯合會|救國團|黨))"),
        }
    })
}

/// Action label for a title: every matched rule label joined by [`ACTION_SEPARATOR`], or the
/// category label when none match.
pub fn infer_action(title: &str, category_label: &str) -> String {
    let labels: Vec<&str> = ACTION_RULES
        .iter()
        .filter(|(_, markers)| markers.iter().all(|m| title.contains(m)))
        .map(|(label, _)| *label)
        .collect();
    if labels.is_empty() {
        category_label.to_string()
    } else {
        labels.join(ACTION_SEPARATOR)
    }
}

/// Run the strategies in priority order over `title`.
pub fn extract(title: &str, category_label: &str) -> Extraction {
    let action = infer_action(title, category_label);
    let attempts: [(Strategy, fn(&str) -> Vec<(String, String)>); 3] = [
        (Strategy::Whitelist, whitelist_scan),
        (Strategy::Segmentation, guided_segmentation),
        (Strategy::LeadingPattern, leading_pattern),
    ];
    for (strategy, run) in attempts {
        let names = run(title);
        if !names.is_empty() {
            return Extraction {
                strategy: Some(strategy),
                mentions: names
                    .into_iter()
                    .map(|(org_full, org_abbr)| EntityMention {
                        org_full,
                        org_abbr,
                        action: action.clone(),
                    })
                    .collect(),
            };
        }
    }
    if title.contains(PARTY_NAME) {
        return Extraction {
            strategy: Some(Strategy::PartyFallback),
            mentions: vec![EntityMention {
                org_full: PARTY_NAME.to_string(),
                org_abbr: String::new(),
                action: category_label.to_string(),
            }],
        };
    }
    Extraction {
        strategy: None,
        mentions: Vec::new(),
    }
}

pub fn extract_mentions(title: &str, category_label: &str) -> Vec<EntityMention> {
    extract(title, category_label).mentions
}

fn whitelist_scan(title: &str) -> Vec<(String, String)> {
    WHITELIST
        .iter()
        .filter(|org| org.matches(title))
        .map(|org| canonical::canonicalize(org.name))
        .filter(|(full, _)| long_enough(full))
        .collect()
}

fn guided_segmentation(title: &str) -> Vec<(String, String)> {
    let Some(caps) = patterns().segment.captures(title) else {
        return Vec::new();
    };
    let span = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let span = strip_quotes(span);

    let mut fragments: Vec<(String, String)> = span
        .split(['、', '及'])
        .filter_map(normalize_fragment)
        .collect();
    repair_elisions(&mut fragments);

    fragments
        .into_iter()
        .filter_map(|(name, abbr)| finish(&name, abbr))
        .collect()
}

fn leading_pattern(title: &str) -> Vec<(String, String)> {
    let window: String = title.chars().take(LEADING_WINDOW_CHARS).collect();
    let Some(m) = patterns().leading.find(&window) else {
        return Vec::new();
    };
    normalize_fragment(m.as_str())
        .and_then(|(name, abbr)| finish(&name, abbr))
        .into_iter()
        .collect()
}

/// Canonicalize, then apply the length filter. A bracketed abbreviation from the title wins over
/// the alias table's.
fn finish(name: &str, abbr: String) -> Option<(String, String)> {
    let (full, canonical_abbr) = canonical::canonicalize(name);
    if !long_enough(&full) {
        return None;
    }
    let abbr = if abbr.is_empty() { canonical_abbr } else { abbr };
    Some((full, abbr))
}

fn long_enough(name: &str) -> bool {
    name.chars().count() >= MIN_ORG_CHARS
}

fn strip_quotes(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '「' | '」' | '『' | '』'))
        .collect()
}

/// Clean one candidate fragment into `(name, bracketed abbreviation)`.
fn normalize_fragment(raw: &str) -> Option<(String, String)> {
    let p = patterns();
    let mut s = strip_quotes(raw)
        .trim_start_matches(|c: char| c == '：' || c == ':' || c.is_whitespace())
        .trim_end()
        .to_string();

    s = p.docket.replace_all(&s, "").into_owned();
    let abbr = p
        .bracket
        .captures(&s)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    s = p.bracket.replace_all(&s, "").into_owned();

    s = p.noise_prefix.replace(&s, "").into_owned();
    let head = p.descriptor.split(&s).next().unwrap_or("").to_string();
    s = head;
    s = p.dangling_tail.replace(s.trim(), "").into_owned();
    let org = p
        .org_tail
        .captures(&s)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());
    if let Some(org) = org {
        s = org;
    }

    let s = s.trim().to_string();
    if s.is_empty() || PLACEHOLDERS.contains(&s.as_str()) {
        return None;
    }
    Some((s, abbr))
}

/// Titles list several entities under one legal form and state it once
/// ("財團法人民族基金會、民權基金會", "欣光華及欣裕台股份有限公司").
/// Re-attach the shared prefix or suffix to fragments that lost it.
fn repair_elisions(fragments: &mut [(String, String)]) {
    if fragments.len() < 2 {
        return;
    }

    if let Some(prefix) = LEGAL_PREFIXES
        .iter()
        .find(|p| fragments[0].0.starts_with(*p))
    {
        for (name, _) in fragments.iter_mut().skip(1) {
            let has_prefix = LEGAL_PREFIXES.iter().any(|p| name.starts_with(p));
            if !has_prefix && !name.ends_with("公司") && canonical::lookup(name).is_none() {
                *name = format!("{prefix}{name}");
            }
        }
    }

    let last = fragments.len() - 1;
    if fragments[last].0.ends_with(CORPORATE_SUFFIX) {
        for (name, _) in fragments[..last].iter_mut() {
            let has_suffix = ORG_SUFFIXES.iter().any(|s| name.ends_with(s));
            let has_prefix = LEGAL_PREFIXES.iter().any(|p| name.starts_with(p));
            if !has_suffix && !has_prefix && canonical::lookup(name).is_none() {
                name.push_str(CORPORATE_SUFFIX);
            }
        }
    }
}

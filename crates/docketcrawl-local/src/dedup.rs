//! Deduplicator: one task per stable id.

use docketcrawl_core::TaskDescriptor;
use std::collections::HashMap;

/// Collapse `tasks` to one descriptor per stable id.
///
/// Output keeps first-seen order; when a key repeats, the later descriptor replaces the earlier
/// one in place. Descriptors whose URL yields no id are dropped.
pub fn dedup_tasks(tasks: Vec<TaskDescriptor>) -> Vec<TaskDescriptor> {
    let mut slot: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<TaskDescriptor> = Vec::with_capacity(tasks.len());
    for task in tasks {
        let Some(id) = task.stable_id() else {
            tracing::warn!(url = %task.detail_url, "listing link has no stable id; dropped");
            continue;
        };
        match slot.get(&id) {
            Some(&i) => out[i] = task,
            None => {
                slot.insert(id, out.len());
                out.push(task);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn task(cat: &str, url: &str) -> TaskDescriptor {
        TaskDescriptor {
            detail_url: url.to_string(),
            category_key: cat.to_string(),
            category_label: "調查進度".to_string(),
            listed_date: None,
        }
    }

    #[test]
    fn repeats_collapse_to_one_per_id() {
        let out = dedup_tasks(vec![
            task("investigations", "https://reg.example/investigations/7"),
            task("investigations", "https://reg.example/investigations/8"),
            task("investigations", "https://reg.example/investigations/7?page=2"),
        ]);
        let ids: Vec<_> = out.iter().filter_map(|t| t.stable_id()).collect();
        assert_eq!(ids, vec!["investigations_7", "investigations_8"]);
        // Later duplicate wins, in the first one's position.
        assert_eq!(out[0].detail_url, "https://reg.example/investigations/7?page=2");
    }

    #[test]
    fn same_segment_in_different_categories_is_kept() {
        let out = dedup_tasks(vec![
            task("hearings", "https://reg.example/hearings/3"),
            task("litigations", "https://reg.example/litigations/3"),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn urls_without_segment_are_dropped() {
        let out = dedup_tasks(vec![task("hearings", "https://reg.example/")]);
        assert!(out.is_empty());
    }

    proptest! {
        #[test]
        fn dedup_is_idempotent(picks in prop::collection::vec((0usize..3, 0u32..6), 0..40)) {
            let cats = ["investigations", "hearings", "litigations"];
            let tasks: Vec<_> = picks
                .iter()
                .map(|(c, n)| task(cats[*c], &format!("https://reg.example/{}/{}", cats[*c], n)))
                .collect();
            let once = dedup_tasks(tasks);
            let twice = dedup_tasks(once.clone());
            prop_assert_eq!(&once, &twice);

            let mut ids: Vec<_> = once.iter().filter_map(|t| t.stable_id()).collect();
            let n = ids.len();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), n);
        }
    }
}

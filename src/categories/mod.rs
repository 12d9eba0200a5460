//! Category tabs over the record list, plus the pure reorder helpers the
//! overview's drag-and-drop uses.

use crate::models::ChecklistRecord;

/// Fixed default tab. Always present, never deletable; records with a
/// missing or blank category land here.
pub(crate) const DEFAULT_CATEGORY: &str = "Main";

pub(crate) fn normalize_category(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Tab list: the default category first, then every other category seen in
/// `records` plus any unsaved `extras`, sorted and deduplicated.
pub(crate) fn derive_categories(records: &[ChecklistRecord], extras: &[String]) -> Vec<String> {
    let mut rest: Vec<String> = Vec::new();

    let mut push = |raw: &str| {
        let c = normalize_category(raw);
        if c != DEFAULT_CATEGORY && !rest.contains(&c) {
            rest.push(c);
        }
    };

    for record in records {
        push(&record.category);
    }
    for extra in extras {
        push(extra);
    }

    rest.sort();

    let mut out = Vec::with_capacity(rest.len() + 1);
    out.push(DEFAULT_CATEGORY.to_string());
    out.extend(rest);
    out
}

pub(crate) fn filter_by_category(
    records: &[ChecklistRecord],
    category: &str,
) -> Vec<ChecklistRecord> {
    records
        .iter()
        .filter(|r| normalize_category(&r.category) == category)
        .cloned()
        .collect()
}

/// Moves the record at `from` so it ends up at position `to`.
pub(crate) fn move_record(records: &mut Vec<ChecklistRecord>, from: usize, to: usize) {
    if from >= records.len() || to >= records.len() || from == to {
        return;
    }
    let record = records.remove(from);
    records.insert(to, record);
}

/// Rewrites `order` to match the slice position, for persisting after a
/// drag-and-drop reorder.
pub(crate) fn with_sequential_order(records: &[ChecklistRecord]) -> Vec<ChecklistRecord> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let mut r = r.clone();
            r.order = i as i64;
            r
        })
        .collect()
}

//! Pure outline operations over the flat item sequence.
//!
//! Everything here is synchronous and free of browser APIs so it can be
//! tested natively. The editor components own signals and DOM focus; they
//! call into this module for every structural edit.

use crate::models::{ChecklistItem, NodeKind};

pub(crate) const MAX_INDENT: u8 = 6;

/// Seed text for a freshly inserted top-level heading.
pub(crate) const SECTION_PLACEHOLDER: &str = "New section";

pub(crate) fn new_item(kind: NodeKind, indent: u8) -> ChecklistItem {
    ChecklistItem {
        id: uuid::Uuid::new_v4().to_string(),
        text: String::new(),
        checked: false,
        kind,
        indent,
        collapsed: false,
    }
}

/// A new document is exactly one empty task at indent 0.
pub(crate) fn new_document() -> Vec<ChecklistItem> {
    vec![new_item(NodeKind::Task, 0)]
}

/// Single left-to-right pass deriving `(visible, has_children)` per item.
///
/// The stack holds the indents of collapsed nodes whose scope we are inside.
/// An item leaves a scope when its indent is no longer strictly greater than
/// the scope's indent; it is visible iff no scope remains. A collapsed node
/// only opens a scope when it is itself visible, so nested collapses inside a
/// hidden region stay inert.
pub(crate) fn compute_visibility(items: &[ChecklistItem]) -> (Vec<bool>, Vec<bool>) {
    let mut visible = Vec::with_capacity(items.len());
    let mut has_children = Vec::with_capacity(items.len());
    let mut collapsed_stack: Vec<u8> = Vec::new();

    for (i, item) in items.iter().enumerate() {
        while collapsed_stack.last().is_some_and(|&top| top >= item.indent) {
            collapsed_stack.pop();
        }

        let is_visible = collapsed_stack.is_empty();
        let kids = items
            .get(i + 1)
            .is_some_and(|next| next.indent > item.indent);

        visible.push(is_visible);
        has_children.push(kids);

        if is_visible && kids && item.collapsed {
            collapsed_stack.push(item.indent);
        }
    }

    (visible, has_children)
}

/// Inserts a fresh node after `after` and returns the index to focus.
///
/// Tasks (and sub-headings) inherit the indent of the node they follow;
/// a heading1 always lands at indent 0 with placeholder text.
pub(crate) fn insert_item(
    items: &mut Vec<ChecklistItem>,
    after: usize,
    kind: NodeKind,
) -> usize {
    let item = if kind == NodeKind::Heading1 {
        let mut it = new_item(NodeKind::Heading1, 0);
        it.text = SECTION_PLACEHOLDER.to_string();
        it
    } else {
        let indent = items.get(after).map(|it| it.indent).unwrap_or(0);
        new_item(kind, indent)
    };

    let at = (after + 1).min(items.len());
    items.insert(at, item);
    at
}

/// Removes the node at `index` and returns the index to focus.
/// The last remaining node is never removed.
pub(crate) fn delete_item(items: &mut Vec<ChecklistItem>, index: usize) -> usize {
    if items.len() <= 1 || index >= items.len() {
        return index.min(items.len().saturating_sub(1));
    }
    items.remove(index);
    index.saturating_sub(1)
}

/// Outcome of applying a text edit to a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TextEdit {
    /// Markdown shortcut: clear the text and switch the node to this kind.
    Retype(NodeKind),
    /// Apply the text verbatim.
    Plain,
}

/// Markdown-shortcut retyping. Only fires when the whole text is exactly the
/// shortcut and the node is not already that heading; a heading1 containing
/// literal `"# "` stays text.
pub(crate) fn apply_text_input(kind: NodeKind, new_text: &str) -> TextEdit {
    let target = match new_text {
        "# " => Some(NodeKind::Heading1),
        "## " => Some(NodeKind::Heading2),
        "### " => Some(NodeKind::Heading3),
        _ => None,
    };

    match target {
        Some(t) if t != kind => TextEdit::Retype(t),
        _ => TextEdit::Plain,
    }
}

/// One indent step in either direction, clamped to `[0, MAX_INDENT]`.
pub(crate) fn indent_step(indent: u8, deeper: bool) -> u8 {
    if deeper {
        (indent + 1).min(MAX_INDENT)
    } else {
        indent.saturating_sub(1)
    }
}

/// Toolbar kind selection: picking the heading the node already is reverts
/// it to a task; picking task always yields task.
pub(crate) fn toolbar_kind(current: NodeKind, selected: NodeKind) -> NodeKind {
    if selected.is_heading() && selected == current {
        NodeKind::Task
    } else {
        selected
    }
}

pub(crate) fn uncheck_all(items: &mut [ChecklistItem]) {
    for item in items.iter_mut() {
        item.checked = false;
    }
}

pub(crate) fn encode_items(items: &[ChecklistItem]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// `None` on malformed content; the caller decides the fallback and logs.
pub(crate) fn decode_items(content: &str) -> Option<Vec<ChecklistItem>> {
    serde_json::from_str(content).ok()
}

/// An open document always has at least one row to type in: stored content
/// that is empty, unreadable, or decodes to an empty sequence opens as a
/// fresh document.
pub(crate) fn seed_if_empty(items: Vec<ChecklistItem>) -> Vec<ChecklistItem> {
    if items.is_empty() {
        new_document()
    } else {
        items
    }
}

/// Editing commands produced by the keyboard router.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EditorCommand {
    InsertBelow,
    DeleteCurrent,
    Indent,
    Outdent,
}

/// Stateless key dispatch. Returning `Some` means the default browser
/// behavior must be suppressed; `None` lets the key pass through.
pub(crate) fn route_key(key: &str, shift: bool, text_is_empty: bool) -> Option<EditorCommand> {
    match key {
        "Enter" => Some(EditorCommand::InsertBelow),
        "Backspace" if text_is_empty => Some(EditorCommand::DeleteCurrent),
        "Tab" if shift => Some(EditorCommand::Outdent),
        "Tab" => Some(EditorCommand::Indent),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(text: &str, indent: u8) -> ChecklistItem {
        let mut it = new_item(NodeKind::Task, indent);
        it.text = text.to_string();
        it
    }

    fn collapsed(mut item: ChecklistItem) -> ChecklistItem {
        item.collapsed = true;
        item
    }

    #[test]
    fn test_new_document_is_single_empty_task() {
        let doc = new_document();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc[0].kind, NodeKind::Task);
        assert_eq!(doc[0].text, "");
        assert_eq!(doc[0].indent, 0);
        assert!(!doc[0].checked);
        assert!(!doc[0].collapsed);
    }

    #[test]
    fn test_visibility_all_expanded() {
        let items = vec![task("a", 0), task("b", 1), task("c", 0)];
        let (visible, has_children) = compute_visibility(&items);
        assert_eq!(visible, vec![true, true, true]);
        assert_eq!(has_children, vec![true, false, false]);
    }

    #[test]
    fn test_visibility_collapse_hides_descendants() {
        // a(0, collapsed) > b(1) > c(2), then d(0) ends the scope.
        let items = vec![
            collapsed(task("a", 0)),
            task("b", 1),
            task("c", 2),
            task("d", 0),
        ];
        let (visible, _) = compute_visibility(&items);
        assert_eq!(visible, vec![true, false, false, true]);
    }

    #[test]
    fn test_visibility_sibling_at_same_indent_ends_scope() {
        let items = vec![collapsed(task("a", 1)), task("b", 2), task("c", 1)];
        let (visible, _) = compute_visibility(&items);
        assert_eq!(visible, vec![true, false, true]);
    }

    #[test]
    fn test_visibility_nested_collapse_inside_hidden_region_is_inert() {
        // b is collapsed but already hidden by a; re-expanding a must keep
        // b's own subtree hidden while b itself becomes visible again.
        let mut items = vec![
            collapsed(task("a", 0)),
            collapsed(task("b", 1)),
            task("c", 2),
            task("d", 0),
        ];
        let (visible, _) = compute_visibility(&items);
        assert_eq!(visible, vec![true, false, false, true]);

        items[0].collapsed = false;
        let (visible, _) = compute_visibility(&items);
        assert_eq!(visible, vec![true, true, false, true]);
    }

    #[test]
    fn test_visibility_collapsed_leaf_opens_no_scope() {
        let items = vec![collapsed(task("a", 0)), task("b", 0)];
        let (visible, has_children) = compute_visibility(&items);
        assert_eq!(visible, vec![true, true]);
        assert_eq!(has_children, vec![false, false]);
    }

    #[test]
    fn test_visibility_idempotent() {
        let items = vec![
            collapsed(task("a", 0)),
            task("b", 1),
            collapsed(task("c", 0)),
            task("d", 3),
            task("e", 0),
        ];
        let first = compute_visibility(&items);
        let second = compute_visibility(&items);
        assert_eq!(first, second);
    }

    #[test]
    fn test_insert_task_inherits_indent_and_focuses_next() {
        let mut items = vec![task("a", 2)];
        let focus = insert_item(&mut items, 0, NodeKind::Task);
        assert_eq!(focus, 1);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].indent, 2);
        assert_eq!(items[1].text, "");
        assert!(!items[1].checked);
    }

    #[test]
    fn test_insert_heading1_forces_indent_zero_with_placeholder() {
        let mut items = vec![task("a", 3)];
        let focus = insert_item(&mut items, 0, NodeKind::Heading1);
        assert_eq!(focus, 1);
        assert_eq!(items[1].kind, NodeKind::Heading1);
        assert_eq!(items[1].indent, 0);
        assert_eq!(items[1].text, SECTION_PLACEHOLDER);
    }

    #[test]
    fn test_insert_out_of_range_appends_at_indent_zero() {
        let mut items: Vec<ChecklistItem> = vec![];
        let focus = insert_item(&mut items, 5, NodeKind::Task);
        assert_eq!(focus, 0);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].indent, 0);
    }

    #[test]
    fn test_insert_then_delete_restores_structure() {
        let original = vec![task("a", 0), task("b", 1)];
        let mut items = original.clone();

        let focus = insert_item(&mut items, 0, NodeKind::Task);
        let back = delete_item(&mut items, focus);

        assert_eq!(back, 0);
        assert_eq!(items, original);
    }

    #[test]
    fn test_delete_focuses_previous() {
        let mut items = vec![task("a", 0), task("b", 0), task("c", 0)];
        let focus = delete_item(&mut items, 2);
        assert_eq!(focus, 1);
        assert_eq!(items.len(), 2);

        let focus = delete_item(&mut items, 0);
        assert_eq!(focus, 0);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "b");
    }

    #[test]
    fn test_delete_last_remaining_node_is_noop() {
        let mut items = vec![task("only", 0)];
        let before = items.clone();
        let focus = delete_item(&mut items, 0);
        assert_eq!(focus, 0);
        assert_eq!(items, before);
    }

    #[test]
    fn test_retype_shortcut_on_task() {
        assert_eq!(
            apply_text_input(NodeKind::Task, "# "),
            TextEdit::Retype(NodeKind::Heading1)
        );
        assert_eq!(
            apply_text_input(NodeKind::Task, "## "),
            TextEdit::Retype(NodeKind::Heading2)
        );
        assert_eq!(
            apply_text_input(NodeKind::Task, "### "),
            TextEdit::Retype(NodeKind::Heading3)
        );
    }

    #[test]
    fn test_retype_requires_exact_text() {
        assert_eq!(apply_text_input(NodeKind::Task, "#"), TextEdit::Plain);
        assert_eq!(apply_text_input(NodeKind::Task, "# x"), TextEdit::Plain);
        assert_eq!(apply_text_input(NodeKind::Task, " # "), TextEdit::Plain);
    }

    #[test]
    fn test_retype_is_literal_on_matching_heading() {
        // "# " inside an existing heading1 stays text.
        assert_eq!(apply_text_input(NodeKind::Heading1, "# "), TextEdit::Plain);
        // But a different shortcut still converts.
        assert_eq!(
            apply_text_input(NodeKind::Heading1, "## "),
            TextEdit::Retype(NodeKind::Heading2)
        );
    }

    #[test]
    fn test_indent_step_clamps() {
        assert_eq!(indent_step(0, true), 1);
        assert_eq!(indent_step(MAX_INDENT, true), MAX_INDENT);
        assert_eq!(indent_step(1, false), 0);
        assert_eq!(indent_step(0, false), 0);
    }

    #[test]
    fn test_toolbar_same_heading_reverts_to_task() {
        assert_eq!(
            toolbar_kind(NodeKind::Heading2, NodeKind::Heading2),
            NodeKind::Task
        );
        assert_eq!(
            toolbar_kind(NodeKind::Task, NodeKind::Heading2),
            NodeKind::Heading2
        );
        assert_eq!(toolbar_kind(NodeKind::Task, NodeKind::Task), NodeKind::Task);
        assert_eq!(
            toolbar_kind(NodeKind::Heading3, NodeKind::Task),
            NodeKind::Task
        );
    }

    #[test]
    fn test_uncheck_all_is_unconditional() {
        let mut items = vec![task("a", 0), task("b", 1)];
        items[0].checked = true;
        uncheck_all(&mut items);
        assert!(items.iter().all(|it| !it.checked));

        // Already-clean documents stay clean.
        uncheck_all(&mut items);
        assert!(items.iter().all(|it| !it.checked));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let items = vec![
            collapsed(task("a", 0)),
            {
                let mut h = new_item(NodeKind::Heading2, 1);
                h.text = "Section".to_string();
                h
            },
        ];
        let encoded = encode_items(&items);
        let decoded = decode_items(&encoded).expect("own encoding should decode");
        assert_eq!(decoded, items);
    }

    #[test]
    fn test_decode_rejects_malformed_content() {
        assert!(decode_items("not json").is_none());
        assert!(decode_items("{\"id\":1}").is_none());
        assert_eq!(decode_items("[]"), Some(vec![]));
    }

    #[test]
    fn test_seed_if_empty_seeds_a_fresh_document() {
        let seeded = seed_if_empty(vec![]);
        assert_eq!(seeded.len(), 1);
        assert_eq!(seeded[0].kind, NodeKind::Task);
        assert_eq!(seeded[0].text, "");
        assert_eq!(seeded[0].indent, 0);
    }

    #[test]
    fn test_seed_if_empty_keeps_nonempty_sequence() {
        let items = vec![task("a", 1)];
        assert_eq!(seed_if_empty(items.clone()), items);
    }

    #[test]
    fn test_opening_empty_array_content_yields_a_row() {
        // "[]" is what a list duplicated from an unreadable source stores.
        let decoded = decode_items("[]").unwrap_or_default();
        let seeded = seed_if_empty(decoded);
        assert_eq!(seeded.len(), 1);
        assert_eq!(seeded[0].kind, NodeKind::Task);
    }

    #[test]
    fn test_route_key_table() {
        use EditorCommand::*;
        assert_eq!(route_key("Enter", false, false), Some(InsertBelow));
        assert_eq!(route_key("Enter", true, true), Some(InsertBelow));
        assert_eq!(route_key("Backspace", false, true), Some(DeleteCurrent));
        assert_eq!(route_key("Backspace", false, false), None);
        assert_eq!(route_key("Tab", false, false), Some(Indent));
        assert_eq!(route_key("Tab", true, false), Some(Outdent));
        assert_eq!(route_key("a", false, true), None);
        assert_eq!(route_key("ArrowDown", false, true), None);
    }

    #[test]
    fn test_end_to_end_new_document_flow() {
        let mut doc = new_document();
        assert_eq!(doc.len(), 1);

        // Enter inserts a structurally identical task below, focused.
        let focus = insert_item(&mut doc, 0, NodeKind::Task);
        assert_eq!(focus, 1);
        assert_eq!(doc[1].kind, NodeKind::Task);
        assert_eq!(doc[1].indent, doc[0].indent);

        // Retype the first node into a section heading.
        assert_eq!(
            apply_text_input(doc[0].kind, "# "),
            TextEdit::Retype(NodeKind::Heading1)
        );
        doc[0].kind = NodeKind::Heading1;
        doc[0].text.clear();

        // Indent the second node under it and collapse.
        doc[1].indent = indent_step(doc[1].indent, true);
        doc[0].collapsed = true;

        let (visible, has_children) = compute_visibility(&doc);
        assert_eq!(visible, vec![true, false]);
        assert_eq!(has_children, vec![true, false]);
    }
}

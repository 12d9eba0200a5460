//! The outline editor: rows over the flat item sequence, keyboard commands,
//! and the floating toolbar for the focused node.
//!
//! `EditorSession` owns the open document's signals and applies every pure
//! outline operation, scheduling a debounced save after each mutation.
//! Rows are keyed by item id so text edits never tear down the focused
//! textarea; structural edits move DOM focus explicitly.

use crate::models::{ChecklistItem, NodeKind};
use crate::outline::{
    apply_text_input, compute_visibility, delete_item, encode_items, indent_step, insert_item,
    route_key, toolbar_kind, uncheck_all, EditorCommand, TextEdit,
};
use crate::state::autosave::AutosaveController;
use icons::{ChevronDown, ChevronLeft, ChevronRight, X};
use leptos::html;
use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

#[derive(Clone)]
pub(crate) struct EditorSession {
    pub title: RwSignal<String>,
    pub items: RwSignal<Vec<ChecklistItem>>,
    pub focused_id: RwSignal<Option<String>>,
    pub autosave: AutosaveController,
}

impl EditorSession {
    pub fn new(title: String, items: Vec<ChecklistItem>, autosave: AutosaveController) -> Self {
        Self {
            title: RwSignal::new(title),
            items: RwSignal::new(items),
            focused_id: RwSignal::new(None),
            autosave,
        }
    }

    pub fn schedule_save(&self) {
        let content = self.items.with_untracked(|items| encode_items(items));
        self.autosave
            .schedule(self.title.get_untracked(), content);
    }

    pub fn set_title(&self, title: String) {
        self.title.set(title);
        self.schedule_save();
    }

    pub fn edit_text(&self, index: usize, new_text: String) {
        let Some(kind) = self
            .items
            .with_untracked(|items| items.get(index).map(|it| it.kind))
        else {
            return;
        };

        match apply_text_input(kind, &new_text) {
            TextEdit::Retype(next_kind) => self.items.update(|items| {
                if let Some(item) = items.get_mut(index) {
                    item.text.clear();
                    item.kind = next_kind;
                }
            }),
            TextEdit::Plain => self.items.update(|items| {
                if let Some(item) = items.get_mut(index) {
                    item.text = new_text;
                }
            }),
        }

        self.schedule_save();
    }

    pub fn insert_after(&self, index: usize, kind: NodeKind) {
        let mut focus_id = None;
        self.items.update(|items| {
            let at = insert_item(items, index, kind);
            focus_id = items.get(at).map(|it| it.id.clone());
        });
        self.schedule_save();

        if let Some(id) = focus_id {
            self.focused_id.set(Some(id.clone()));
            focus_row(&id);
        }
    }

    pub fn delete_at(&self, index: usize) {
        let mut focus_id = None;
        let mut removed = false;
        self.items.update(|items| {
            let len_before = items.len();
            let at = delete_item(items, index);
            removed = items.len() != len_before;
            focus_id = items.get(at).map(|it| it.id.clone());
        });

        if !removed {
            return;
        }
        self.schedule_save();

        if let Some(id) = focus_id {
            self.focused_id.set(Some(id.clone()));
            focus_row(&id);
        }
    }

    pub fn indent_at(&self, index: usize, deeper: bool) {
        self.items.update(|items| {
            if let Some(item) = items.get_mut(index) {
                item.indent = indent_step(item.indent, deeper);
            }
        });
        self.schedule_save();
    }

    pub fn set_kind_at(&self, index: usize, selected: NodeKind) {
        self.items.update(|items| {
            if let Some(item) = items.get_mut(index) {
                item.kind = toolbar_kind(item.kind, selected);
            }
        });
        self.schedule_save();
    }

    pub fn toggle_checked(&self, index: usize) {
        self.items.update(|items| {
            if let Some(item) = items.get_mut(index) {
                item.checked = !item.checked;
            }
        });
        self.schedule_save();
    }

    pub fn toggle_collapsed(&self, index: usize) {
        self.items.update(|items| {
            if let Some(item) = items.get_mut(index) {
                item.collapsed = !item.collapsed;
            }
        });
        self.schedule_save();
    }

    pub fn uncheck_all_items(&self) {
        self.items.update(|items| uncheck_all(items));
        self.schedule_save();
    }

    pub fn append_task(&self) {
        let last = self
            .items
            .with_untracked(|items| items.len().saturating_sub(1));
        self.insert_after(last, NodeKind::Task);
    }

    pub fn append_section(&self) {
        let last = self
            .items
            .with_untracked(|items| items.len().saturating_sub(1));
        self.insert_after(last, NodeKind::Heading1);
    }
}

/// Moves DOM focus to a row's textarea on the next tick, once the node is
/// mounted.
fn focus_row(item_id: &str) {
    let dom_id = row_dom_id(item_id);
    let Some(win) = web_sys::window() else {
        return;
    };

    let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
        wasm_bindgen::closure::Closure::once_into_js(move || {
            if let Some(doc) = web_sys::window().and_then(|w| w.document()) {
                if let Some(el) = doc.get_element_by_id(&dom_id) {
                    if let Ok(el) = el.dyn_into::<web_sys::HtmlElement>() {
                        let _ = el.focus();
                    }
                }
            }
        })
        .as_ref()
        .unchecked_ref(),
        0,
    );
}

fn row_dom_id(item_id: &str) -> String {
    format!("item-{item_id}")
}

fn row_kind_class(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Heading1 => "text-xl font-semibold",
        NodeKind::Heading2 => "text-lg font-semibold",
        NodeKind::Heading3 => "text-base font-medium",
        NodeKind::Task => "text-sm",
    }
}

fn indent_offset_px(indent: u8) -> u32 {
    indent as u32 * 24
}

fn autosize(textarea: &web_sys::HtmlTextAreaElement) {
    let style = web_sys::HtmlElement::style(textarea);
    let _ = style.set_property("height", "auto");
    let _ = style.set_property("height", &format!("{}px", textarea.scroll_height()));
}

#[component]
pub(crate) fn ChecklistOutline(session: EditorSession) -> impl IntoView {
    let session = StoredValue::new(session);
    let items = session.with_value(|s| s.items);

    let visibility = Memo::new(move |_| items.with(|items| compute_visibility(items)));

    view! {
        <div class="flex flex-col gap-0.5 pb-24">
            <For
                each=move || {
                    items.with(|items| items.iter().map(|it| it.id.clone()).collect::<Vec<_>>())
                }
                key=|id| id.clone()
                children=move |id: String| {
                    view! { <ChecklistRow session=session item_id=id visibility=visibility /> }
                }
            />
        </div>
    }
}

#[component]
fn ChecklistRow(
    session: StoredValue<EditorSession>,
    item_id: String,
    visibility: Memo<(Vec<bool>, Vec<bool>)>,
) -> impl IntoView {
    let items = session.with_value(|s| s.items);
    let focused_id = session.with_value(|s| s.focused_id);

    let dom_id = row_dom_id(&item_id);
    let id = StoredValue::new(item_id);
    let textarea_ref: NodeRef<html::Textarea> = NodeRef::new();

    // The row's index shifts as nodes are inserted and deleted above it, so
    // everything is resolved by id at read time.
    let index = Memo::new(move |_| {
        id.with_value(|id| items.with(|items| items.iter().position(|it| it.id == *id)))
    });
    let item = Memo::new(move |_| {
        id.with_value(|id| items.with(|items| items.iter().find(|it| it.id == *id).cloned()))
    });

    let visible = move || {
        index
            .get()
            .is_some_and(|i| visibility.with(|(v, _)| v.get(i).copied().unwrap_or(true)))
    };
    let has_children = move || {
        index
            .get()
            .is_some_and(|i| visibility.with(|(_, h)| h.get(i).copied().unwrap_or(false)))
    };

    let kind = move || item.get().map(|it| it.kind).unwrap_or(NodeKind::Task);
    let indent = move || item.get().map(|it| it.indent).unwrap_or(0);
    let collapsed = move || item.get().map(|it| it.collapsed).unwrap_or(false);
    let checked = move || item.get().map(|it| it.checked).unwrap_or(false);
    let text = move || item.get().map(|it| it.text).unwrap_or_default();

    // Height tracks the text itself, not just typing: rows whose saved text
    // wraps, and rows cleared by a markdown retype, resize on mount and on
    // every programmatic change.
    Effect::new(move |_| {
        let _ = text();
        if !visible() {
            return;
        }
        if let Some(el) = textarea_ref.get() {
            autosize(&el);
        }
    });

    let on_input = move |ev: web_sys::Event| {
        let Some(i) = index.get_untracked() else {
            return;
        };
        if let Some(textarea) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlTextAreaElement>().ok())
        {
            session.with_value(|s| s.edit_text(i, textarea.value()));
            autosize(&textarea);
        }
    };

    let on_keydown = move |ev: web_sys::KeyboardEvent| {
        let Some(i) = index.get_untracked() else {
            return;
        };
        let text_is_empty = items
            .with_untracked(|items| items.get(i).map(|it| it.text.is_empty()).unwrap_or(true));

        let Some(cmd) = route_key(&ev.key(), ev.shift_key(), text_is_empty) else {
            return;
        };
        ev.prevent_default();

        session.with_value(|s| match cmd {
            EditorCommand::InsertBelow => s.insert_after(i, NodeKind::Task),
            EditorCommand::DeleteCurrent => s.delete_at(i),
            EditorCommand::Indent => s.indent_at(i, true),
            EditorCommand::Outdent => s.indent_at(i, false),
        });
    };

    let text_class = move || {
        tw_merge!(
            "w-full resize-none overflow-hidden bg-transparent py-0.5 outline-none placeholder:text-muted-foreground",
            row_kind_class(kind()),
            if checked() && kind() == NodeKind::Task {
                "text-muted-foreground line-through"
            } else {
                ""
            }
        )
    };

    view! {
        <Show when=visible fallback=|| ().into_view()>
            <div
                class="group flex items-start gap-1.5 rounded-md px-1 py-0.5 hover:bg-accent/40"
                style:margin-left=move || format!("{}px", indent_offset_px(indent()))
            >
                <Show
                    when=has_children
                    fallback=|| view! { <span class="size-6 shrink-0"></span> }
                >
                    <button
                        class="mt-0.5 flex size-6 shrink-0 items-center justify-center rounded text-muted-foreground hover:bg-accent hover:text-foreground"
                        on:click=move |_| {
                            if let Some(i) = index.get_untracked() {
                                session.with_value(|s| s.toggle_collapsed(i));
                            }
                        }
                    >
                        <Show when=collapsed fallback=|| view! { <ChevronDown class="size-4" /> }>
                            <ChevronRight class="size-4" />
                        </Show>
                    </button>
                </Show>

                <Show when=move || kind() == NodeKind::Task fallback=|| ().into_view()>
                    <input
                        type="checkbox"
                        class="mt-1.5 size-4 shrink-0 accent-primary"
                        prop:checked=checked
                        on:change=move |_| {
                            if let Some(i) = index.get_untracked() {
                                session.with_value(|s| s.toggle_checked(i));
                            }
                        }
                    />
                </Show>

                <textarea
                    node_ref=textarea_ref
                    id=dom_id.clone()
                    rows=1
                    class=text_class
                    prop:value=text
                    on:input=on_input
                    on:keydown=on_keydown
                    on:focus=move |_| focused_id.set(Some(id.get_value()))
                ></textarea>
            </div>
        </Show>
    }
}

#[component]
pub(crate) fn FloatingToolbar(session: EditorSession) -> impl IntoView {
    let session = StoredValue::new(session);
    let items = session.with_value(|s| s.items);
    let focused_id = session.with_value(|s| s.focused_id);

    let focused_index = Memo::new(move |_| {
        focused_id
            .get()
            .and_then(|id| items.with(|items| items.iter().position(|it| it.id == id)))
    });
    let focused_kind = Memo::new(move |_| {
        focused_index
            .get()
            .and_then(|i| items.with(|items| items.get(i).map(|it| it.kind)))
    });

    let kind_button = move |label: &'static str, target: NodeKind| {
        view! {
            <button
                class=move || {
                    tw_merge!(
                        "rounded px-2 py-1 text-xs font-medium hover:bg-accent",
                        if focused_kind.get() == Some(target) {
                            "bg-accent text-accent-foreground"
                        } else {
                            "text-muted-foreground"
                        }
                    )
                }
                // mousedown instead of click so the row keeps DOM focus.
                on:mousedown=move |ev: web_sys::MouseEvent| {
                    ev.prevent_default();
                    if let Some(i) = focused_index.get_untracked() {
                        session.with_value(|s| s.set_kind_at(i, target));
                    }
                }
            >
                {label}
            </button>
        }
    };

    let icon_button_class = "flex size-7 items-center justify-center rounded text-muted-foreground hover:bg-accent hover:text-foreground";

    view! {
        <Show when=move || focused_index.get().is_some() fallback=|| ().into_view()>
            <div class="fixed bottom-4 left-1/2 z-40 flex -translate-x-1/2 items-center gap-1 rounded-lg border bg-card px-2 py-1.5 shadow-lg">
                <button
                    class=icon_button_class
                    on:mousedown=move |ev: web_sys::MouseEvent| {
                        ev.prevent_default();
                        if let Some(i) = focused_index.get_untracked() {
                            session.with_value(|s| s.indent_at(i, false));
                        }
                    }
                >
                    <ChevronLeft class="size-4" />
                </button>
                <button
                    class=icon_button_class
                    on:mousedown=move |ev: web_sys::MouseEvent| {
                        ev.prevent_default();
                        if let Some(i) = focused_index.get_untracked() {
                            session.with_value(|s| s.indent_at(i, true));
                        }
                    }
                >
                    <ChevronRight class="size-4" />
                </button>

                <span class="mx-1 h-5 w-px bg-border"></span>

                {kind_button("H1", NodeKind::Heading1)}
                {kind_button("H2", NodeKind::Heading2)}
                {kind_button("H3", NodeKind::Heading3)}
                {kind_button("Task", NodeKind::Task)}

                <span class="mx-1 h-5 w-px bg-border"></span>

                <button
                    class=icon_button_class
                    on:mousedown=move |ev: web_sys::MouseEvent| {
                        ev.prevent_default();
                        if let Some(i) = focused_index.get_untracked() {
                            session.with_value(|s| s.delete_at(i));
                        }
                    }
                >
                    <X class="size-4" />
                </button>
            </div>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_kind_class_by_kind() {
        assert_eq!(row_kind_class(NodeKind::Heading1), "text-xl font-semibold");
        assert_eq!(row_kind_class(NodeKind::Task), "text-sm");
        assert_ne!(
            row_kind_class(NodeKind::Heading2),
            row_kind_class(NodeKind::Heading3)
        );
    }

    #[test]
    fn test_indent_offset_is_linear() {
        assert_eq!(indent_offset_px(0), 0);
        assert_eq!(indent_offset_px(1), 24);
        assert_eq!(indent_offset_px(6), 144);
    }

    #[test]
    fn test_row_dom_id() {
        assert_eq!(row_dom_id("abc"), "item-abc");
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_autosize_sets_explicit_pixel_height() {
        let doc = web_sys::window()
            .and_then(|w| w.document())
            .expect("document");
        let el = doc
            .create_element("textarea")
            .expect("create textarea")
            .dyn_into::<web_sys::HtmlTextAreaElement>()
            .expect("textarea element");
        doc.body().expect("body").append_child(&el).expect("append");

        // Multi-line saved text, sized without any input event.
        el.set_value("line one\nline two\nline three");
        autosize(&el);

        let height = el.style().get_property_value("height").unwrap_or_default();
        assert!(height.ends_with("px"), "height should be explicit, got {height:?}");
        assert_ne!(height, "0px");

        el.remove();
    }
}

//! Screens: the category-tabbed overview of all checklists, and the editor
//! page for a single checklist.

use crate::api::{ApiErrorKind, UpdateChecklistRequest};
use crate::categories::{
    derive_categories, filter_by_category, move_record, with_sequential_order, DEFAULT_CATEGORY,
};
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardDescription, CardHeader,
    CardTitle, Input, Label, Spinner,
};
use crate::editor::{ChecklistOutline, EditorSession, FloatingToolbar};
use crate::models::{ChecklistRecord, NodeKind};
use crate::outline::{decode_items, encode_items, new_item, seed_if_empty};
use crate::state::autosave::AutosaveController;
use crate::state::AppContext;
use crate::storage::save_active_category;
use crate::util::{duplicate_title, format_card_date};
use icons::{Check, Copy as CopyIcon, X};
use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;
use leptos_router::hooks::{use_navigate, use_params};
use leptos_router::params::Params;
use wasm_bindgen::JsCast;

const NEW_LIST_TITLE: &str = "New list";

fn alert(message: &str) {
    if let Some(win) = web_sys::window() {
        let _ = win.alert_with_message(message);
    }
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

fn display_title(title: &str) -> String {
    let t = title.trim();
    if t.is_empty() {
        "Untitled".to_string()
    } else {
        t.to_string()
    }
}

#[component]
pub fn HomePage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    let records = app_state.0.records;
    let loading = app_state.0.records_loading;
    let error = app_state.0.records_error;
    let request_id = app_state.0.records_request_id;
    let active_category = app_state.0.active_category;
    let store_sig = app_state.0.store;

    // Tabs created this session that no saved record refers to yet. They
    // are not persisted anywhere, so they disappear on reload.
    let extra_categories: RwSignal<Vec<String>> = RwSignal::new(vec![]);
    let adding_tab: RwSignal<bool> = RwSignal::new(false);
    let new_tab_name: RwSignal<String> = RwSignal::new(String::new());

    let move_target: RwSignal<Option<ChecklistRecord>> = RwSignal::new(None);
    let drag_id: RwSignal<Option<String>> = RwSignal::new(None);

    // Escape closes the move modal.
    let escape_handle = window_event_listener(ev::keydown, move |ev| {
        if ev.key() == "Escape" {
            move_target.set(None);
        }
    });
    on_cleanup(move || escape_handle.remove());

    let load_records = move || {
        let store = store_sig.get_untracked();
        let my_id = request_id.get_untracked() + 1;
        request_id.set(my_id);
        loading.set(true);
        error.set(None);

        spawn_local(async move {
            let result = store.list().await;

            // A newer load superseded this one.
            if request_id.get_untracked() != my_id {
                return;
            }

            match result {
                Ok(list) => records.set(list),
                Err(e) => error.set(Some(e.to_string())),
            }
            loading.set(false);
        });
    };

    Effect::new(move |_| {
        load_records();
    });

    let categories = Memo::new(move |_| {
        records.with(|r| extra_categories.with(|extras| derive_categories(r, extras)))
    });

    let visible_records =
        Memo::new(move |_| records.with(|r| filter_by_category(r, &active_category.get())));

    let select_tab = move |category: String| {
        save_active_category(&category);
        active_category.set(category);
    };

    let confirm_new_tab = move || {
        let name = new_tab_name.get_untracked().trim().to_string();
        adding_tab.set(false);
        new_tab_name.set(String::new());
        if name.is_empty() {
            return;
        }

        if !categories.get_untracked().contains(&name) {
            extra_categories.update(|extras| extras.push(name.clone()));
        }
        select_tab(name);
    };

    let delete_tab = move |category: String| {
        if !confirm(&format!(
            "Delete the \"{category}\" tab? Its lists move to {DEFAULT_CATEGORY}."
        )) {
            return;
        }

        extra_categories.update(|extras| extras.retain(|c| c != &category));

        // Reassign members locally first; the per-record updates follow.
        let members: Vec<String> = records.with_untracked(|r| {
            r.iter()
                .filter(|x| x.category == category)
                .map(|x| x.id.clone())
                .collect()
        });
        records.update(|r| {
            for x in r.iter_mut() {
                if x.category == category {
                    x.category = DEFAULT_CATEGORY.to_string();
                }
            }
        });

        if active_category.get_untracked() == category {
            select_tab(DEFAULT_CATEGORY.to_string());
        }

        if members.is_empty() {
            return;
        }

        let store = store_sig.get_untracked();
        spawn_local(async move {
            let mut failed = false;
            for id in members {
                let req = UpdateChecklistRequest {
                    checklist_id: id,
                    category: Some(DEFAULT_CATEGORY.to_string()),
                    ..Default::default()
                };
                if store.update(req).await.is_err() {
                    failed = true;
                }
            }
            if failed {
                load_records();
            }
        });
    };

    let create_list = move || {
        let store = store_sig.get_untracked();
        let category = active_category.get_untracked();

        // New lists start with a section heading and one empty task.
        let mut heading = new_item(NodeKind::Heading1, 0);
        heading.text = NEW_LIST_TITLE.to_string();
        let content = encode_items(&[heading, new_item(NodeKind::Task, 0)]);

        spawn_local(async move {
            match store.create(NEW_LIST_TITLE, &content, &category).await {
                Ok(record) => {
                    let id = record.id.clone();
                    records.update(|r| r.push(record));
                    navigate.with_value(|nav| nav(&format!("/list/{id}"), Default::default()));
                }
                Err(e) => alert(&format!("Could not create the list: {e}")),
            }
        });
    };

    let duplicate_list = move |record: ChecklistRecord| {
        let store = store_sig.get_untracked();

        // A corrupted source duplicates as an empty list rather than failing.
        let content = match decode_items(&record.content) {
            Some(items) => encode_items(&items),
            None => {
                leptos::logging::warn!(
                    "checklist {} has unreadable content, duplicating empty",
                    record.id
                );
                "[]".to_string()
            }
        };
        let title = duplicate_title(&record.title);
        let category = record.category.clone();

        spawn_local(async move {
            match store.create(&title, &content, &category).await {
                Ok(new_record) => records.update(|r| r.push(new_record)),
                Err(e) => alert(&format!("Could not duplicate the list: {e}")),
            }
        });
    };

    let delete_list = move |record: ChecklistRecord| {
        if !confirm(&format!("Delete \"{}\"?", display_title(&record.title))) {
            return;
        }

        let store = store_sig.get_untracked();
        let id = record.id;
        records.update(|r| r.retain(|x| x.id != id));

        spawn_local(async move {
            if let Err(e) = store.delete(&id).await {
                alert(&format!("Could not delete the list: {e}"));
                load_records();
            }
        });
    };

    let move_list = move |record_id: String, category: String| {
        move_target.set(None);

        records.update(|r| {
            if let Some(x) = r.iter_mut().find(|x| x.id == record_id) {
                x.category = category.clone();
            }
        });

        let store = store_sig.get_untracked();
        spawn_local(async move {
            let req = UpdateChecklistRequest {
                checklist_id: record_id,
                category: Some(category),
                ..Default::default()
            };
            if let Err(e) = store.update(req).await {
                alert(&format!("Could not move the list: {e}"));
                load_records();
            }
        });
    };

    let on_drop = move |target_id: String| {
        let Some(source_id) = drag_id.get_untracked() else {
            return;
        };
        drag_id.set(None);
        if source_id == target_id {
            return;
        }

        let mut snapshot = records.get_untracked();
        let from = snapshot.iter().position(|r| r.id == source_id);
        let to = snapshot.iter().position(|r| r.id == target_id);
        let (Some(from), Some(to)) = (from, to) else {
            return;
        };

        move_record(&mut snapshot, from, to);
        let renumbered = with_sequential_order(&snapshot);
        records.set(renumbered.clone());

        let store = store_sig.get_untracked();
        spawn_local(async move {
            if let Err(e) = store.batch_reorder(&renumbered).await {
                leptos::logging::warn!("persisting the new order failed: {e}");
                load_records();
            }
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto w-full max-w-[1080px] px-4 py-8">
                <div class="mb-6 flex items-center justify-between">
                    <div class="space-y-1">
                        <h1 class="text-xl font-semibold">"WikiCheck"</h1>
                        <p class="text-xs text-muted-foreground">"Checklists, organized."</p>
                    </div>

                    <Button size=ButtonSize::Sm on:click=move |_| create_list()>
                        {NEW_LIST_TITLE}
                    </Button>
                </div>

                <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                    {move || {
                        error
                            .get()
                            .map(|e| {
                                view! {
                                    <Alert class="mb-4 border-destructive/30">
                                        <AlertDescription class="text-destructive">{e}</AlertDescription>
                                    </Alert>
                                }
                            })
                    }}
                </Show>

                // Category tab strip.
                <div class="mb-6 flex flex-wrap items-center gap-1 border-b pb-2">
                    {move || {
                        categories
                            .get()
                            .into_iter()
                            .map(|category| {
                                let is_active = category == active_category.get();
                                let is_default = category == DEFAULT_CATEGORY;
                                let select_name = category.clone();
                                let delete_name = category.clone();
                                view! {
                                    <div class=move || {
                                        if is_active {
                                            "group flex items-center gap-1 rounded-md bg-accent px-3 py-1.5 text-sm font-medium text-accent-foreground"
                                        } else {
                                            "group flex items-center gap-1 rounded-md px-3 py-1.5 text-sm text-muted-foreground hover:bg-accent/50"
                                        }
                                    }>
                                        <button on:click=move |_| select_tab(select_name.clone())>
                                            {category.clone()}
                                        </button>
                                        {(!is_default)
                                            .then(|| {
                                                view! {
                                                    <button
                                                        class="hidden rounded p-0.5 hover:bg-background group-hover:block"
                                                        on:click=move |_| delete_tab(delete_name.clone())
                                                    >
                                                        <X class="size-3" />
                                                    </button>
                                                }
                                            })}
                                    </div>
                                }
                            })
                            .collect_view()
                    }}

                    <Show
                        when=move || adding_tab.get()
                        fallback=move || {
                            view! {
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Sm
                                    on:click=move |_| {
                                        new_tab_name.set(String::new());
                                        adding_tab.set(true);
                                    }
                                >
                                    "+"
                                </Button>
                            }
                        }
                    >
                        <Input
                            class="h-8 w-36 text-sm"
                            placeholder="Tab name"
                            autofocus=true
                            bind_value=new_tab_name
                            on:keydown=move |ev: web_sys::KeyboardEvent| {
                                match ev.key().as_str() {
                                    "Enter" => confirm_new_tab(),
                                    "Escape" => adding_tab.set(false),
                                    _ => {}
                                }
                            }
                            on:blur=move |_| adding_tab.set(false)
                        />
                    </Show>
                </div>

                <Show
                    when=move || !loading.get() || !records.with(|r| r.is_empty())
                    fallback=move || {
                        view! {
                            <div class="flex items-center gap-2 py-12 text-sm text-muted-foreground">
                                <Spinner />
                                "Loading lists..."
                            </div>
                        }
                    }
                >
                    <Show
                        when=move || !visible_records.with(|r| r.is_empty())
                        fallback=|| {
                            view! {
                                <div class="py-12 text-center text-sm text-muted-foreground">
                                    "No lists in this tab yet. Create one to get started."
                                </div>
                            }
                        }
                    >
                        <div class="grid grid-cols-1 gap-4 sm:grid-cols-2 lg:grid-cols-3">
                            {move || {
                                visible_records
                                    .get()
                                    .into_iter()
                                    .map(|record| {
                                        let open_id = record.id.clone();
                                        let drag_start_id = record.id.clone();
                                        let drop_id = record.id.clone();
                                        let dup_record = record.clone();
                                        let del_record = record.clone();
                                        let move_record_target = record.clone();
                                        view! {
                                            <Card
                                                class="cursor-pointer gap-2 py-4 transition-shadow hover:shadow-md"
                                                attr:draggable="true"
                                                on:click=move |_| {
                                                    navigate
                                                        .with_value(|nav| {
                                                            nav(&format!("/list/{open_id}"), Default::default())
                                                        })
                                                }
                                                on:dragstart=move |_| drag_id.set(Some(drag_start_id.clone()))
                                                on:dragover=move |ev: web_sys::DragEvent| ev.prevent_default()
                                                on:drop=move |ev: web_sys::DragEvent| {
                                                    ev.prevent_default();
                                                    on_drop(drop_id.clone());
                                                }
                                            >
                                                <CardHeader>
                                                    <CardTitle class="text-base">
                                                        {display_title(&record.title)}
                                                    </CardTitle>
                                                    <CardDescription>
                                                        {format_card_date(&record.updated_at)}
                                                    </CardDescription>
                                                </CardHeader>
                                                <div class="flex items-center gap-1 px-6">
                                                    <Button
                                                        variant=ButtonVariant::Ghost
                                                        size=ButtonSize::Icon
                                                        class="size-7"
                                                        on:click=move |ev: web_sys::MouseEvent| {
                                                            ev.stop_propagation();
                                                            duplicate_list(dup_record.clone());
                                                        }
                                                    >
                                                        <CopyIcon class="size-4" />
                                                    </Button>
                                                    <Button
                                                        variant=ButtonVariant::Ghost
                                                        size=ButtonSize::Sm
                                                        class="h-7 px-2 text-xs"
                                                        on:click=move |ev: web_sys::MouseEvent| {
                                                            ev.stop_propagation();
                                                            move_target.set(Some(move_record_target.clone()));
                                                        }
                                                    >
                                                        "Move"
                                                    </Button>
                                                    <Button
                                                        variant=ButtonVariant::Ghost
                                                        size=ButtonSize::Icon
                                                        class="size-7 text-destructive"
                                                        on:click=move |ev: web_sys::MouseEvent| {
                                                            ev.stop_propagation();
                                                            delete_list(del_record.clone());
                                                        }
                                                    >
                                                        <X class="size-4" />
                                                    </Button>
                                                </div>
                                            </Card>
                                        }
                                    })
                                    .collect_view()
                            }}
                        </div>
                    </Show>
                </Show>

                // Move-to-category modal.
                <Show when=move || move_target.get().is_some() fallback=|| ().into_view()>
                    <div
                        class="fixed inset-0 z-50 flex items-center justify-center bg-black/40"
                        on:click=move |_| move_target.set(None)
                    >
                        <div
                            class="w-full max-w-xs rounded-xl border bg-card p-4 shadow-lg"
                            on:click=move |ev: web_sys::MouseEvent| ev.stop_propagation()
                        >
                            <div class="mb-3 flex items-center justify-between">
                                <Label>"Move to"</Label>
                                <button
                                    class="rounded p-1 text-muted-foreground hover:bg-accent"
                                    on:click=move |_| move_target.set(None)
                                >
                                    <X class="size-4" />
                                </button>
                            </div>
                            <div class="flex flex-col gap-1">
                                {move || {
                                    let target = move_target.get();
                                    categories
                                        .get()
                                        .into_iter()
                                        .map(|category| {
                                            let current = target
                                                .as_ref()
                                                .map(|r| r.category == category)
                                                .unwrap_or(false);
                                            let record_id = target
                                                .as_ref()
                                                .map(|r| r.id.clone())
                                                .unwrap_or_default();
                                            let pick = category.clone();
                                            view! {
                                                <button
                                                    class="flex items-center justify-between rounded-md px-3 py-2 text-left text-sm hover:bg-accent"
                                                    disabled=current
                                                    on:click=move |_| {
                                                        move_list(record_id.clone(), pick.clone())
                                                    }
                                                >
                                                    {category.clone()}
                                                    {current
                                                        .then(|| {
                                                            view! {
                                                                <Check class="size-4 text-muted-foreground" />
                                                            }
                                                        })}
                                                </button>
                                            }
                                        })
                                        .collect_view()
                                }}
                            </div>
                        </div>
                    </div>
                </Show>
            </div>
        </div>
    }
}

#[derive(Params, PartialEq, Clone, Debug)]
pub struct ListRouteParams {
    pub id: Option<String>,
}

#[component]
pub fn ChecklistPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let params = use_params::<ListRouteParams>();
    let navigate = StoredValue::new(use_navigate());
    let store_sig = app_state.0.store;

    let session: RwSignal<Option<EditorSession>> = RwSignal::new(None);
    let load_error: RwSignal<Option<String>> = RwSignal::new(None);

    let list_id = move || params.get().ok().and_then(|p| p.id).unwrap_or_default();

    Effect::new(move |_| {
        let id = list_id();
        if id.trim().is_empty() {
            navigate.with_value(|nav| nav("/", Default::default()));
            return;
        }

        session.set(None);
        load_error.set(None);

        let store = store_sig.get_untracked();
        spawn_local(async move {
            match store.get(&id).await {
                Ok(record) => {
                    let decoded = if record.content.trim().is_empty() {
                        vec![]
                    } else {
                        match decode_items(&record.content) {
                            Some(items) => items,
                            None => {
                                leptos::logging::error!(
                                    "checklist {} has unreadable content, opening fresh",
                                    record.id
                                );
                                vec![]
                            }
                        }
                    };
                    // A list stored as "[]" still opens with a row to type in.
                    let items = seed_if_empty(decoded);

                    let autosave = AutosaveController::new(store.clone(), record.id.clone());
                    session.set(Some(EditorSession::new(record.title, items, autosave)));
                }
                Err(e) if e.kind == ApiErrorKind::NotFound => {
                    navigate.with_value(|nav| nav("/", Default::default()));
                }
                Err(e) => load_error.set(Some(e.to_string())),
            }
        });
    });

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto w-full max-w-3xl px-4 py-6">
                <Show when=move || load_error.get().is_some() fallback=|| ().into_view()>
                    {move || {
                        load_error
                            .get()
                            .map(|e| {
                                view! {
                                    <Alert class="mb-4 border-destructive/30">
                                        <AlertDescription class="text-destructive">{e}</AlertDescription>
                                    </Alert>
                                }
                            })
                    }}
                </Show>

                <Show
                    when=move || session.get().is_some()
                    fallback=move || {
                        view! {
                            <Show when=move || load_error.get().is_none() fallback=|| ().into_view()>
                                <div class="flex items-center gap-2 py-12 text-sm text-muted-foreground">
                                    <Spinner />
                                    "Loading..."
                                </div>
                            </Show>
                        }
                    }
                >
                    {move || session.get().map(|s| view! { <EditorScreen session=s /> })}
                </Show>
            </div>
        </div>
    }
}

#[component]
fn EditorScreen(session: EditorSession) -> impl IntoView {
    let stored = StoredValue::new(session.clone());
    let title = stored.with_value(|s| s.title);
    let saving = stored.with_value(|s| s.autosave.saving);
    let navigate = StoredValue::new(use_navigate());

    let on_title_input = move |ev: web_sys::Event| {
        if let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        {
            stored.with_value(|s| s.set_title(input.value()));
        }
    };

    view! {
        <div class="mb-2 flex items-center justify-between gap-2">
            <Button
                variant=ButtonVariant::Ghost
                size=ButtonSize::Sm
                on:click=move |_| navigate.with_value(|nav| nav("/", Default::default()))
            >
                "Back"
            </Button>

            <div class="flex items-center gap-2">
                <span class="text-xs text-muted-foreground">
                    {move || if saving.get() { "Saving..." } else { "Saved" }}
                </span>
                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    on:click=move |_| stored.with_value(|s| s.uncheck_all_items())
                >
                    "Uncheck all"
                </Button>
            </div>
        </div>

        <input
            class="mb-4 w-full bg-transparent text-2xl font-bold outline-none placeholder:text-muted-foreground"
            placeholder="Untitled"
            prop:value=move || title.get()
            on:input=on_title_input
        />

        <ChecklistOutline session=session.clone() />

        <div class="mt-2 flex items-center gap-2">
            <Button
                variant=ButtonVariant::Ghost
                size=ButtonSize::Sm
                on:click=move |_| stored.with_value(|s| s.append_task())
            >
                "+ Add row"
            </Button>
            <Button
                variant=ButtonVariant::Ghost
                size=ButtonSize::Sm
                on:click=move |_| stored.with_value(|s| s.append_section())
            >
                "+ Add section"
            </Button>
        </div>

        <FloatingToolbar session=session />
    }
}

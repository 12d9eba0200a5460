pub(crate) mod autosave;

use crate::api::RecordStore;
use crate::categories::DEFAULT_CATEGORY;
use crate::models::ChecklistRecord;
use crate::storage::load_active_category;
use leptos::prelude::*;

#[derive(Clone)]
pub(crate) struct AppState {
    pub store: RwSignal<RecordStore>,

    /// The full record list, loaded by the overview and kept current by
    /// optimistic updates.
    pub records: RwSignal<Vec<ChecklistRecord>>,
    pub records_loading: RwSignal<bool>,
    pub records_error: RwSignal<Option<String>>,

    /// Ignore stale list responses when loads overlap.
    pub records_request_id: RwSignal<u64>,

    /// Active overview tab; persisted across reloads.
    pub active_category: RwSignal<String>,
}

impl AppState {
    pub fn new() -> Self {
        let active_category =
            load_active_category().unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        Self {
            store: RwSignal::new(RecordStore::from_env()),
            records: RwSignal::new(vec![]),
            records_loading: RwSignal::new(false),
            records_error: RwSignal::new(None),
            records_request_id: RwSignal::new(0),
            active_category: RwSignal::new(active_category),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);

//! Debounced persistence for the open checklist.
//!
//! Every edit reschedules a single trailing timer; only the timer is ever
//! cancelled, an in-flight update always runs to completion. `saving` is
//! true from the first pending edit until the request resolves.

use crate::api::{RecordStore, UpdateChecklistRequest};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::sync::{Arc, Mutex};
use wasm_bindgen::JsCast;

const AUTOSAVE_DELAY_MS: i32 = 2000;

#[derive(Clone)]
pub(crate) struct AutosaveController {
    store: RecordStore,
    checklist_id: String,
    pub saving: RwSignal<bool>,
    timer_id: Arc<Mutex<Option<i32>>>,
}

impl AutosaveController {
    pub fn new(store: RecordStore, checklist_id: String) -> Self {
        Self {
            store,
            checklist_id,
            saving: RwSignal::new(false),
            timer_id: Arc::new(Mutex::new(None)),
        }
    }

    /// Schedules a save of the full document snapshot, replacing any
    /// pending one.
    pub fn schedule(&self, title: String, content: String) {
        let Some(win) = web_sys::window() else {
            return;
        };

        self.saving.set(true);

        if let Ok(mut slot) = self.timer_id.lock() {
            if let Some(tid) = slot.take() {
                win.clear_timeout_with_handle(tid);
            }
        }

        let this = self.clone();
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            this.flush(title, content);
        });

        let tid = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                AUTOSAVE_DELAY_MS,
            )
            .unwrap_or(0);

        if let Ok(mut slot) = self.timer_id.lock() {
            *slot = Some(tid);
        }
    }

    fn flush(self, title: String, content: String) {
        if let Ok(mut slot) = self.timer_id.lock() {
            *slot = None;
        }

        let store = self.store.clone();
        let checklist_id = self.checklist_id.clone();
        let saving = self.saving;

        spawn_local(async move {
            let req = UpdateChecklistRequest {
                checklist_id,
                title: Some(title),
                content: Some(content),
                ..Default::default()
            };

            // Local edits stay authoritative; a failed save only surfaces
            // in the console and the flag clears either way.
            if let Err(e) = store.update(req).await {
                leptos::logging::warn!("autosave failed: {e}");
            }
            saving.set(false);
        });
    }
}

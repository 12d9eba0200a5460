use serde::{Deserialize, Serialize};

/// The category tab the user last had open on the overview.
pub(crate) const ACTIVE_CATEGORY_KEY: &str = "wikicheck_active_category";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let storage = local_storage()?;
    let json = storage.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn load_active_category() -> Option<String> {
    load_json_from_storage::<String>(ACTIVE_CATEGORY_KEY)
}

pub(crate) fn save_active_category(category: &str) {
    save_json_to_storage(ACTIVE_CATEGORY_KEY, &category);
}

/// Title for a duplicated checklist.
pub(crate) fn duplicate_title(title: &str) -> String {
    let base = title.trim();
    if base.is_empty() {
        "Untitled (copy)".to_string()
    } else {
        format!("{} (copy)", base)
    }
}

/// Locale date for overview cards. Falls back to the raw string when the
/// timestamp does not parse as a date.
pub(crate) fn format_card_date(timestamp: &str) -> String {
    if timestamp.trim().is_empty() {
        return String::new();
    }

    let date = js_sys::Date::new(&timestamp.into());
    if date.get_time().is_nan() {
        return timestamp.to_string();
    }

    date.to_locale_date_string("default", &wasm_bindgen::JsValue::UNDEFINED)
        .into()
}

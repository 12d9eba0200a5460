use crate::categories::DEFAULT_CATEGORY;
use crate::models::ChecklistRecord;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Network,
    Http,
    Parse,
    NotFound,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn not_found(ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::NotFound,
            message: format!("{ctx}: not found"),
        }
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {body}"),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let default_api_url = "http://localhost:8787".to_string();

        // Deployments inject `window.ENV = { API_URL: ... }` from index.html;
        // the lowercase key is accepted for older deploy scripts.
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    if let Ok(api_url) = js_sys::Reflect::get(&env, &"API_URL".into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self { api_url: url_str };
                        }
                    }

                    if let Ok(api_url) = js_sys::Reflect::get(&env, &"api_url".into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self { api_url: url_str };
                        }
                    }
                }
            }
        }

        Self {
            api_url: default_api_url,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct CreateChecklistRequest {
    pub title: String,
    pub content: String,
    pub category: String,
    pub order: i64,
}

/// Partial update; absent fields are left untouched by the backend.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct UpdateChecklistRequest {
    #[serde(rename = "checklist-id")]
    pub checklist_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// JSON/HTTP client for the checklist record store. All endpoints are POST
/// with JSON bodies; there is no authentication.
#[derive(Clone)]
pub(crate) struct RecordStore {
    pub(crate) base_url: String,
}

impl RecordStore {
    #[allow(dead_code)]
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }

    pub fn from_env() -> Self {
        Self {
            base_url: EnvConfig::new().api_url,
        }
    }

    async fn request_api<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> ApiResult<T> {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.base_url, path);

        let res = client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(ApiError::network)?;

        if res.status().is_success() {
            res.json().await.map_err(ApiError::parse)
        } else if res.status().as_u16() == 404 {
            Err(ApiError::not_found(path))
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, "Request failed"))
        }
    }

    /// All checklists, ordered by `order` ascending.
    pub async fn list(&self) -> ApiResult<Vec<ChecklistRecord>> {
        let data: serde_json::Value = self
            .request_api("/wikicheck/get-checklist-list", &serde_json::json!({}))
            .await?;
        let mut records = Self::parse_record_list_response(data);
        records.sort_by_key(|r| r.order);
        Ok(records)
    }

    pub async fn get(&self, checklist_id: &str) -> ApiResult<ChecklistRecord> {
        let data: serde_json::Value = self
            .request_api(
                "/wikicheck/get-checklist",
                &serde_json::json!({ "checklist-id": checklist_id }),
            )
            .await?;
        Self::parse_record_response(data)
            .ok_or_else(|| ApiError::not_found("get-checklist"))
    }

    /// Creates a record, assigning the next `order` from a fresh listing.
    pub async fn create(
        &self,
        title: &str,
        content: &str,
        category: &str,
    ) -> ApiResult<ChecklistRecord> {
        let existing = self.list().await?;
        let order = next_order(&existing);

        let data: serde_json::Value = self
            .request_api(
                "/wikicheck/new-checklist",
                &CreateChecklistRequest {
                    title: title.to_string(),
                    content: content.to_string(),
                    category: category.to_string(),
                    order,
                },
            )
            .await?;

        Self::parse_record_response(data)
            .ok_or_else(|| ApiError::parse("create response is missing the checklist"))
    }

    pub async fn update(&self, req: UpdateChecklistRequest) -> ApiResult<ChecklistRecord> {
        let data: serde_json::Value = self
            .request_api("/wikicheck/update-checklist", &req)
            .await?;
        Self::parse_record_response(data)
            .ok_or_else(|| ApiError::parse("update response is missing the checklist"))
    }

    pub async fn delete(&self, checklist_id: &str) -> ApiResult<()> {
        let _: serde_json::Value = self
            .request_api(
                "/wikicheck/delete-checklist",
                &serde_json::json!({ "checklist-id": checklist_id }),
            )
            .await?;
        Ok(())
    }

    /// Best-effort persistence of a full reordering: every record is tried
    /// even when an earlier one fails, and the first error is reported.
    pub async fn batch_reorder(&self, records: &[ChecklistRecord]) -> ApiResult<()> {
        let mut first_err: Option<ApiError> = None;

        for record in records {
            let req = UpdateChecklistRequest {
                checklist_id: record.id.clone(),
                order: Some(record.order),
                ..Default::default()
            };
            if let Err(e) = self.update(req).await {
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }

    pub(crate) fn parse_record_list_response(data: serde_json::Value) -> Vec<ChecklistRecord> {
        let list = data
            .get("checklist-list")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        list.into_iter().filter_map(Self::parse_record).collect()
    }

    pub(crate) fn parse_record_response(data: serde_json::Value) -> Option<ChecklistRecord> {
        data.get("checklist").cloned().and_then(Self::parse_record)
    }

    /// Tolerant record decoding: a record without an id is dropped, a
    /// missing category falls back to the default tab, a missing order to 0.
    fn parse_record(item: serde_json::Value) -> Option<ChecklistRecord> {
        let get_s = |k: &str| item.get(k).and_then(|v| v.as_str()).map(|s| s.to_string());

        let id = get_s("id")?;
        if id.trim().is_empty() {
            return None;
        }

        let category = get_s("category")
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        let order = item.get("order").and_then(|v| v.as_i64()).unwrap_or(0);

        Some(ChecklistRecord {
            id,
            title: get_s("title").unwrap_or_default(),
            content: get_s("content").unwrap_or_default(),
            category,
            order,
            created_at: get_s("created-at").unwrap_or_default(),
            updated_at: get_s("updated-at").unwrap_or_default(),
        })
    }
}

/// Client-assigned sort key for a new record.
pub(crate) fn next_order(records: &[ChecklistRecord]) -> i64 {
    records.iter().map(|r| r.order).max().map_or(0, |m| m + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_list_response() {
        let data = serde_json::json!({
            "checklist-list": [
                {
                    "id": "c1",
                    "title": "Groceries",
                    "content": "[]",
                    "category": "Errands",
                    "order": 3,
                    "created-at": "2026-08-01T10:00:00Z",
                    "updated-at": "2026-08-02T10:00:00Z"
                },
                { "id": "c2", "title": "Bare" },
                { "title": "No id, dropped" }
            ]
        });

        let records = RecordStore::parse_record_list_response(data);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].id, "c1");
        assert_eq!(records[0].category, "Errands");
        assert_eq!(records[0].order, 3);
        assert_eq!(records[0].updated_at, "2026-08-02T10:00:00Z");

        // Missing category and order take defaults.
        assert_eq!(records[1].category, DEFAULT_CATEGORY);
        assert_eq!(records[1].order, 0);
        assert_eq!(records[1].content, "");
    }

    #[test]
    fn test_parse_record_list_response_tolerates_missing_list() {
        let records = RecordStore::parse_record_list_response(serde_json::json!({}));
        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_record_response() {
        let data = serde_json::json!({
            "checklist": { "id": "c9", "title": "T", "category": "", "order": 1 }
        });
        let record = RecordStore::parse_record_response(data).expect("record should parse");
        assert_eq!(record.id, "c9");
        // Blank category normalizes to the default tab.
        assert_eq!(record.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn test_parse_record_response_missing_envelope() {
        assert!(RecordStore::parse_record_response(serde_json::json!({})).is_none());
        assert!(
            RecordStore::parse_record_response(serde_json::json!({ "checklist": { "id": "" } }))
                .is_none()
        );
    }

    #[test]
    fn test_update_request_skips_absent_fields() {
        let req = UpdateChecklistRequest {
            checklist_id: "c1".to_string(),
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let v = serde_json::to_value(req).expect("should serialize");
        assert_eq!(v["checklist-id"], "c1");
        assert_eq!(v["title"], "Renamed");
        assert!(v.get("content").is_none());
        assert!(v.get("category").is_none());
        assert!(v.get("order").is_none());
    }

    #[test]
    fn test_next_order() {
        assert_eq!(next_order(&[]), 0);

        let records = vec![
            ChecklistRecord {
                id: "a".to_string(),
                title: String::new(),
                content: String::new(),
                category: DEFAULT_CATEGORY.to_string(),
                order: 4,
                created_at: String::new(),
                updated_at: String::new(),
            },
            ChecklistRecord {
                id: "b".to_string(),
                title: String::new(),
                content: String::new(),
                category: DEFAULT_CATEGORY.to_string(),
                order: 1,
                created_at: String::new(),
                updated_at: String::new(),
            },
        ];
        assert_eq!(next_order(&records), 5);
    }

    #[test]
    fn test_api_error_display_uses_message() {
        let e = ApiError {
            kind: ApiErrorKind::Http,
            message: "Request failed (500): boom".to_string(),
        };
        assert_eq!(e.to_string(), "Request failed (500): boom");
    }
}

use serde::{Deserialize, Serialize};

/// Node flavor inside a checklist outline.
///
/// Wire names are lowercase (`heading1` .. `task`); the stored content of a
/// checklist is a JSON array of `ChecklistItem` and must stay readable by
/// older saves.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum NodeKind {
    Heading1,
    Heading2,
    Heading3,
    Task,
}

impl NodeKind {
    pub fn is_heading(self) -> bool {
        !matches!(self, NodeKind::Task)
    }
}

/// One node of the outline. `indent` implies hierarchy over the flat
/// sequence; there are no parent pointers.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub checked: bool,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    pub indent: u8,

    /// Older saves predate collapse support and omit this field.
    #[serde(default)]
    pub collapsed: bool,
}

/// A stored checklist as the record store returns it. `content` is the
/// serialized item sequence (JSON string), kept opaque at this layer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct ChecklistRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub order: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_wire_names() {
        let item = ChecklistItem {
            id: "a1".to_string(),
            text: "Buy milk".to_string(),
            checked: true,
            kind: NodeKind::Task,
            indent: 2,
            collapsed: false,
        };

        let v = serde_json::to_value(&item).expect("item should serialize");
        assert_eq!(v["id"], "a1");
        assert_eq!(v["text"], "Buy milk");
        assert_eq!(v["checked"], true);
        assert_eq!(v["type"], "task");
        assert_eq!(v["indent"], 2);
        assert_eq!(v["collapsed"], false);
    }

    #[test]
    fn test_kind_wire_names_lowercase() {
        for (kind, name) in [
            (NodeKind::Heading1, "\"heading1\""),
            (NodeKind::Heading2, "\"heading2\""),
            (NodeKind::Heading3, "\"heading3\""),
            (NodeKind::Task, "\"task\""),
        ] {
            assert_eq!(serde_json::to_string(&kind).unwrap(), name);
        }
    }

    #[test]
    fn test_item_missing_collapsed_defaults_false() {
        // Saves written before collapse support have no `collapsed` key.
        let json = r#"{"id":"a1","text":"","checked":false,"type":"heading2","indent":0}"#;
        let item: ChecklistItem = serde_json::from_str(json).expect("old save should parse");
        assert!(!item.collapsed);
        assert_eq!(item.kind, NodeKind::Heading2);
    }

    #[test]
    fn test_item_roundtrip_preserves_fields() {
        let item = ChecklistItem {
            id: "b2".to_string(),
            text: "Section".to_string(),
            checked: false,
            kind: NodeKind::Heading1,
            indent: 0,
            collapsed: true,
        };
        let json = serde_json::to_string(&item).unwrap();
        let back: ChecklistItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_is_heading() {
        assert!(NodeKind::Heading1.is_heading());
        assert!(NodeKind::Heading3.is_heading());
        assert!(!NodeKind::Task.is_heading());
    }
}

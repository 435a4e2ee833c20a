use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A bug pulled from a Notion database. Built fresh on every read; never
/// cached or mutated locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bug {
    pub page_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    pub url: String,
    /// Raw property map as returned by the API, for callers that need
    /// fields beyond the flat projection. Not serialized.
    #[serde(skip, default)]
    pub properties: Map<String, Value>,
}

impl Bug {
    /// One-line rendering used in listings and observation messages.
    pub fn summary_line(&self) -> String {
        let status = self.status.as_deref().unwrap_or("-");
        let priority = self.priority.as_deref().unwrap_or("-");
        format!(
            "[{status}] {title} (priority: {priority}, id: {id})",
            title = self.title,
            id = self.page_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Bug {
        Bug {
            page_id: "page-1".into(),
            title: "Login broken".into(),
            description: Some("SSO fails".into()),
            status: Some("Todo".into()),
            priority: None,
            url: "https://notion.so/page-1".into(),
            properties: json!({"Status": {"type": "status"}})
                .as_object()
                .unwrap()
                .clone(),
        }
    }

    #[test]
    fn serialization_omits_absent_fields_and_properties() {
        let bug = sample();
        let json = serde_json::to_string(&bug).unwrap();
        assert!(json.contains("page-1"));
        assert!(json.contains("description"));
        assert!(!json.contains("priority"));
        assert!(!json.contains("properties"));
    }

    #[test]
    fn deserialization_defaults_properties() {
        let raw = r#"{"page_id":"p","title":"t","url":""}"#;
        let bug: Bug = serde_json::from_str(raw).unwrap();
        assert!(bug.properties.is_empty());
        assert_eq!(bug.status, None);
    }

    #[test]
    fn summary_line_fills_missing_fields() {
        let bug = sample();
        let line = bug.summary_line();
        assert_eq!(line, "[Todo] Login broken (priority: -, id: page-1)");
    }
}

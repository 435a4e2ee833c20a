use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{dispatch, schema, Action, BugTracker, Observation};
use crate::model::bug::Bug;

/// A mock tracker that records calls and serves canned bugs.
struct MockTracker {
    bugs: Vec<Bug>,
    list_calls: Arc<Mutex<Vec<(Option<String>, usize)>>>,
    status_updates: Arc<Mutex<Vec<(String, String)>>>,
    comments: Arc<Mutex<Vec<(String, String)>>>,
    should_fail: bool,
}

impl MockTracker {
    fn new(bugs: Vec<Bug>) -> Self {
        Self {
            bugs,
            list_calls: Arc::new(Mutex::new(Vec::new())),
            status_updates: Arc::new(Mutex::new(Vec::new())),
            comments: Arc::new(Mutex::new(Vec::new())),
            should_fail: false,
        }
    }

    fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

#[async_trait]
impl BugTracker for MockTracker {
    async fn list_bugs(&self, status_filter: Option<&str>, limit: usize) -> Result<Vec<Bug>> {
        if self.should_fail {
            anyhow::bail!("mock list failure");
        }
        self.list_calls
            .lock()
            .unwrap()
            .push((status_filter.map(String::from), limit));
        Ok(self.bugs.iter().take(limit).cloned().collect())
    }

    async fn get_bug(&self, page_id: &str) -> Result<Bug> {
        if self.should_fail {
            anyhow::bail!("mock get failure");
        }
        self.bugs
            .iter()
            .find(|b| b.page_id == page_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such page {page_id}"))
    }

    async fn update_status(&self, page_id: &str, status: &str) -> Result<()> {
        if self.should_fail {
            anyhow::bail!("mock update failure");
        }
        self.status_updates
            .lock()
            .unwrap()
            .push((page_id.to_string(), status.to_string()));
        Ok(())
    }

    async fn add_comment(&self, page_id: &str, comment: &str) -> Result<()> {
        if self.should_fail {
            anyhow::bail!("mock comment failure");
        }
        self.comments
            .lock()
            .unwrap()
            .push((page_id.to_string(), comment.to_string()));
        Ok(())
    }
}

fn make_bug(id: &str, title: &str, status: Option<&str>) -> Bug {
    Bug {
        page_id: id.to_string(),
        title: title.to_string(),
        description: None,
        status: status.map(String::from),
        priority: None,
        url: format!("https://notion.so/{id}"),
        properties: Map::new(),
    }
}

fn args(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

async fn run(tracker: &MockTracker, name: &str, arguments: Map<String, Value>) -> Observation {
    dispatch(tracker, &Action::new(name, arguments)).await
}

#[tokio::test]
async fn list_bugs_uses_default_limit() {
    let tracker = MockTracker::new(vec![]);
    let obs = run(&tracker, schema::LIST_BUGS, Map::new()).await;
    assert!(obs.success);
    assert_eq!(
        tracker.list_calls.lock().unwrap().as_slice(),
        &[(None::<String>, schema::DEFAULT_LIST_LIMIT)]
    );
}

#[tokio::test]
async fn list_bugs_passes_filter_and_limit() {
    let tracker = MockTracker::new(vec![
        make_bug("a", "First", Some("Todo")),
        make_bug("b", "Second", Some("Todo")),
    ]);
    let obs = run(
        &tracker,
        schema::LIST_BUGS,
        args(&[("status_filter", json!("Todo")), ("limit", json!(2))]),
    )
    .await;
    assert!(obs.success);
    assert_eq!(
        tracker.list_calls.lock().unwrap().as_slice(),
        &[(Some("Todo".to_string()), 2)]
    );
    assert!(obs.content.starts_with("Found 2 bug(s):"));
    assert!(obs.content.contains("First"));
    assert!(obs.content.contains("Second"));
}

#[tokio::test]
async fn list_bugs_empty_filter_string_means_no_filter() {
    let tracker = MockTracker::new(vec![]);
    let obs = run(
        &tracker,
        schema::LIST_BUGS,
        args(&[("status_filter", json!(""))]),
    )
    .await;
    assert!(obs.success);
    assert_eq!(tracker.list_calls.lock().unwrap()[0].0, None);
    assert_eq!(obs.content, "No bugs found.");
}

#[tokio::test]
async fn get_bug_renders_detail() {
    let mut bug = make_bug("page-1", "Login broken", Some("Todo"));
    bug.description = Some("SSO fails on refresh".to_string());
    let tracker = MockTracker::new(vec![bug]);
    let obs = run(
        &tracker,
        schema::GET_BUG,
        args(&[("page_id", json!("page-1"))]),
    )
    .await;
    assert!(obs.success);
    assert!(obs.content.contains("Title: Login broken"));
    assert!(obs.content.contains("Status: Todo"));
    assert!(obs.content.contains("Description: SSO fails on refresh"));
}

#[tokio::test]
async fn get_bug_missing_page_id_fails() {
    let tracker = MockTracker::new(vec![]);
    let obs = run(&tracker, schema::GET_BUG, Map::new()).await;
    assert!(!obs.success);
    assert!(obs.content.contains("page_id"));
}

#[tokio::test]
async fn update_status_calls_tracker_with_both_values() {
    let tracker = MockTracker::new(vec![]);
    let obs = run(
        &tracker,
        schema::UPDATE_STATUS,
        args(&[("page_id", json!("page-1")), ("status", json!("Done"))]),
    )
    .await;
    assert!(obs.success);
    assert_eq!(
        tracker.status_updates.lock().unwrap().as_slice(),
        &[("page-1".to_string(), "Done".to_string())]
    );
    assert!(obs.content.contains("page-1"));
    assert!(obs.content.contains("Done"));
}

#[tokio::test]
async fn update_status_missing_status_fails_before_calling_tracker() {
    let tracker = MockTracker::new(vec![]);
    let obs = run(
        &tracker,
        schema::UPDATE_STATUS,
        args(&[("page_id", json!("page-1"))]),
    )
    .await;
    assert!(!obs.success);
    assert!(obs.content.contains("status"));
    assert!(tracker.status_updates.lock().unwrap().is_empty());
}

#[tokio::test]
async fn add_comment_records_text() {
    let tracker = MockTracker::new(vec![]);
    let obs = run(
        &tracker,
        schema::ADD_COMMENT,
        args(&[("page_id", json!("page-1")), ("comment", json!("fixed in abc123"))]),
    )
    .await;
    assert!(obs.success);
    assert_eq!(
        tracker.comments.lock().unwrap().as_slice(),
        &[("page-1".to_string(), "fixed in abc123".to_string())]
    );
}

#[tokio::test]
async fn unknown_tool_yields_failed_observation() {
    let tracker = MockTracker::new(vec![]);
    let obs = run(&tracker, "notion_delete_everything", Map::new()).await;
    assert!(!obs.success);
    assert!(obs.content.contains("unknown Notion tool"));
}

#[tokio::test]
async fn tracker_errors_become_failed_observations() {
    let tracker = MockTracker::new(vec![]).with_failure();
    let obs = run(&tracker, schema::LIST_BUGS, Map::new()).await;
    assert!(!obs.success);
    assert!(obs.content.contains("mock list failure"));
    assert_eq!(obs.tool, schema::LIST_BUGS);
}

#[test]
fn action_deserializes_without_thought() {
    let raw = r#"{"name":"notion_get_bug","arguments":{"page_id":"p"}}"#;
    let action: Action = serde_json::from_str(raw).unwrap();
    assert_eq!(action.name, schema::GET_BUG);
    assert_eq!(action.thought, "");
    assert_eq!(action.arguments["page_id"], "p");
}

#[test]
fn observation_serializes_success_flag() {
    let obs = Observation {
        tool: schema::LIST_BUGS.to_string(),
        arguments: Map::new(),
        success: false,
        content: "boom".to_string(),
    };
    let json = serde_json::to_string(&obs).unwrap();
    assert!(json.contains("\"success\":false"));
    assert_eq!(obs.message(), "boom");
}

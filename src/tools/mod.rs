pub mod schema;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::bug::Bug;
use crate::notion::NotionClient;

#[cfg(test)]
mod tests;

/// A tool invocation produced by the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    /// Optional reasoning the agent attached to the call.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub thought: String,
}

impl Action {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
            thought: String::new(),
        }
    }
}

/// The result of running an [`Action`], rendered for the agent transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub tool: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    pub success: bool,
    pub content: String,
}

impl Observation {
    pub fn message(&self) -> &str {
        &self.content
    }
}

#[async_trait]
pub trait BugTracker: Send + Sync {
    async fn list_bugs(&self, status_filter: Option<&str>, limit: usize) -> Result<Vec<Bug>>;
    async fn get_bug(&self, page_id: &str) -> Result<Bug>;
    async fn update_status(&self, page_id: &str, status: &str) -> Result<()>;
    async fn add_comment(&self, page_id: &str, comment: &str) -> Result<()>;
}

#[async_trait]
impl BugTracker for NotionClient {
    async fn list_bugs(&self, status_filter: Option<&str>, limit: usize) -> Result<Vec<Bug>> {
        Ok(NotionClient::list_bugs(self, None, status_filter, limit).await?)
    }

    async fn get_bug(&self, page_id: &str) -> Result<Bug> {
        Ok(NotionClient::get_bug(self, page_id).await?)
    }

    async fn update_status(&self, page_id: &str, status: &str) -> Result<()> {
        Ok(NotionClient::update_bug_status(self, page_id, status, "Status").await?)
    }

    async fn add_comment(&self, page_id: &str, comment: &str) -> Result<()> {
        Ok(NotionClient::add_comment(self, page_id, comment).await?)
    }
}

fn opt_str<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn require_str<'a>(args: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    opt_str(args, key).with_context(|| format!("missing required argument '{key}'"))
}

fn render_bug_detail(bug: &Bug) -> String {
    let mut out = format!(
        "Title: {}\nStatus: {}\nPriority: {}\nID: {}",
        bug.title,
        bug.status.as_deref().unwrap_or("-"),
        bug.priority.as_deref().unwrap_or("-"),
        bug.page_id,
    );
    if !bug.url.is_empty() {
        out.push_str(&format!("\nURL: {}", bug.url));
    }
    if let Some(desc) = &bug.description {
        out.push_str(&format!("\nDescription: {desc}"));
    }
    out
}

fn render_bug_list(bugs: &[Bug]) -> String {
    if bugs.is_empty() {
        return "No bugs found.".to_string();
    }
    let mut out = format!("Found {} bug(s):", bugs.len());
    for bug in bugs {
        out.push('\n');
        out.push_str(&bug.summary_line());
    }
    out
}

async fn run(tracker: &dyn BugTracker, action: &Action) -> Result<String> {
    let args = &action.arguments;
    match action.name.as_str() {
        schema::LIST_BUGS => {
            let status_filter = opt_str(args, "status_filter");
            let limit = args
                .get("limit")
                .and_then(Value::as_u64)
                .map(|n| n as usize)
                .unwrap_or(schema::DEFAULT_LIST_LIMIT);
            let bugs = tracker.list_bugs(status_filter, limit).await?;
            Ok(render_bug_list(&bugs))
        }
        schema::GET_BUG => {
            let page_id = require_str(args, "page_id")?;
            let bug = tracker.get_bug(page_id).await?;
            Ok(render_bug_detail(&bug))
        }
        schema::UPDATE_STATUS => {
            let page_id = require_str(args, "page_id")?;
            let status = require_str(args, "status")?;
            tracker.update_status(page_id, status).await?;
            Ok(format!("Updated bug {page_id} status to '{status}'."))
        }
        schema::ADD_COMMENT => {
            let page_id = require_str(args, "page_id")?;
            let comment = require_str(args, "comment")?;
            tracker.add_comment(page_id, comment).await?;
            Ok(format!("Added comment to bug {page_id}."))
        }
        other => anyhow::bail!("unknown Notion tool '{other}'"),
    }
}

/// Run an action against a tracker. Failures never escape; they come back
/// as an unsuccessful observation carrying the error text.
pub async fn dispatch(tracker: &dyn BugTracker, action: &Action) -> Observation {
    let (success, content) = match run(tracker, action).await {
        Ok(content) => (true, content),
        Err(err) => {
            tracing::warn!(tool = %action.name, error = %err, "Notion tool call failed");
            (false, format!("{err:#}"))
        }
    };
    Observation {
        tool: action.name.clone(),
        arguments: action.arguments.clone(),
        success,
        content,
    }
}

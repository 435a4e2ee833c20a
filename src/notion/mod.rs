pub mod properties;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::{truncate_body, Error};
use crate::model::bug::Bug;

pub const NOTION_VERSION: &str = "2022-06-28";
const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// The Notion query endpoint caps page_size at 100.
const MAX_PAGE_SIZE: usize = 100;

/// Client for the Notion API, scoped to bug-tracking use: querying a bug
/// database, reading and updating pages, and attaching comments.
pub struct NotionClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    database_id: Option<String>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<Page>,
}

#[derive(Deserialize)]
struct Page {
    id: String,
    url: Option<String>,
    #[serde(default)]
    properties: Map<String, Value>,
}

impl Page {
    fn into_bug(self) -> Bug {
        let properties = self.properties;
        Bug {
            page_id: self.id,
            title: properties::extract_title(&properties),
            description: properties::description(&properties),
            status: properties::status(&properties),
            priority: properties::priority(&properties),
            url: self.url.unwrap_or_default(),
            properties,
        }
    }
}

/// Reject non-success responses, keeping the status and a truncated body.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        message: truncate_body(&body),
    })
}

/// Body for `POST /databases/{id}/query`. The status filter matches across
/// the three property shapes bug databases use (status-typed "Status" or
/// "status", select-typed "State"), since callers cannot know which one the
/// remote schema picked.
fn query_body(status_filter: Option<&str>, limit: usize) -> Value {
    let mut body = Map::new();
    if let Some(status) = status_filter {
        body.insert(
            "filter".into(),
            json!({
                "or": [
                    {"property": "Status", "status": {"equals": status}},
                    {"property": "status", "status": {"equals": status}},
                    {"property": "State", "select": {"equals": status}},
                ]
            }),
        );
    }
    body.insert("page_size".into(), json!(limit.min(MAX_PAGE_SIZE)));
    Value::Object(body)
}

impl NotionClient {
    pub fn new(api_key: impl Into<String>, database_id: Option<String>) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            database_id,
        })
    }

    /// Point the client at a different API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn database_id(&self) -> Option<&str> {
        self.database_id.as_deref()
    }

    /// Query the bug database, newest-API-order preserved. `database_id`
    /// overrides the configured default for this call only.
    pub async fn list_bugs(
        &self,
        database_id: Option<&str>,
        status_filter: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Bug>, Error> {
        let db_id = database_id
            .or(self.database_id.as_deref())
            .ok_or(Error::MissingDatabaseId)?;

        let resp = self
            .client
            .post(format!("{}/databases/{db_id}/query", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&query_body(status_filter, limit))
            .send()
            .await?;
        let data: QueryResponse = check(resp).await?.json().await?;

        Ok(data
            .results
            .into_iter()
            .take(limit)
            .map(Page::into_bug)
            .collect())
    }

    pub async fn get_bug(&self, page_id: &str) -> Result<Bug, Error> {
        let resp = self
            .client
            .get(format!("{}/pages/{page_id}", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let page: Page = check(resp).await?.json().await?;
        Ok(page.into_bug())
    }

    /// Set the status property of a bug page. Tries a status-typed payload
    /// first; if that is rejected, retries once with a select-typed payload
    /// carrying the identical value, since databases model status either
    /// way. Fails only when both attempts fail.
    pub async fn update_bug_status(
        &self,
        page_id: &str,
        status: &str,
        property_name: &str,
    ) -> Result<(), Error> {
        match self
            .patch_property(page_id, property_name, json!({"status": {"name": status}}))
            .await
        {
            Ok(()) => {
                tracing::info!(page_id, status, "updated bug status");
                Ok(())
            }
            // Only a remote rejection means the property might be
            // select-typed; transport errors propagate as-is.
            Err(first @ Error::Api { .. }) => {
                tracing::debug!(error = %first, "status-typed update rejected, retrying as select");
                self.patch_property(page_id, property_name, json!({"select": {"name": status}}))
                    .await?;
                tracing::info!(page_id, status, "updated bug status (select)");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn patch_property(
        &self,
        page_id: &str,
        property_name: &str,
        value: Value,
    ) -> Result<(), Error> {
        let body = json!({"properties": {property_name: value}});
        let resp = self
            .client
            .patch(format!("{}/pages/{page_id}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    pub async fn add_comment(&self, page_id: &str, comment: &str) -> Result<(), Error> {
        let body = json!({
            "parent": {"page_id": page_id},
            "rich_text": [
                {"type": "text", "text": {"content": comment}}
            ]
        });
        let resp = self
            .client
            .post(format!("{}/comments", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        check(resp).await?;
        tracing::info!(page_id, "added comment to bug");
        Ok(())
    }

    /// Lightweight authenticated call to verify the token works. Never
    /// returns an error; failures come back as `(false, Some(description))`
    /// with the description leading with the HTTP status code when there
    /// was one.
    pub async fn test_connection(&self) -> (bool, Option<String>) {
        let result = async {
            let resp = self
                .client
                .get(format!("{}/users/me", self.base_url))
                .bearer_auth(&self.api_key)
                .send()
                .await?;
            check(resp).await?;
            Ok::<_, Error>(())
        }
        .await;

        match result {
            Ok(()) => (true, None),
            Err(Error::Api { status, message }) => {
                let msg = if message.is_empty() {
                    status.to_string()
                } else {
                    format!("{status}: {message}")
                };
                tracing::error!(%msg, "Notion connectivity check failed");
                (false, Some(msg))
            }
            Err(err) => {
                tracing::error!(%err, "Notion connection error");
                (false, Some(err.to_string()))
            }
        }
    }
}

use thiserror::Error;

/// How much of a remote error body we keep when wrapping it.
pub const ERROR_BODY_LIMIT: usize = 200;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no database ID configured; set notion.database_id in config or pass one explicitly")]
    MissingDatabaseId,

    /// Non-success response from the Notion API. `message` holds the
    /// response body, truncated to [`ERROR_BODY_LIMIT`] characters.
    #[error("Notion API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Notion request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Truncate a response body for inclusion in an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    body.chars().take(ERROR_BODY_LIMIT).collect()
}

//! Tool declarations handed to the host agent framework.

use serde::Serialize;
use serde_json::{json, Value};

pub const LIST_BUGS: &str = "notion_list_bugs";
pub const GET_BUG: &str = "notion_get_bug";
pub const UPDATE_STATUS: &str = "notion_update_bug_status";
pub const ADD_COMMENT: &str = "notion_add_comment";

/// Limit applied when a list call doesn't ask for one.
pub const DEFAULT_LIST_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    kind: &'static str,
    function: FunctionSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    name: &'static str,
    description: &'static str,
    parameters: Value,
}

impl ToolSpec {
    fn new(name: &'static str, description: &'static str, parameters: Value) -> Self {
        Self {
            kind: "function",
            function: FunctionSpec {
                name,
                description,
                parameters,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.function.name
    }
}

const LIST_BUGS_DESCRIPTION: &str = "\
List bugs/issues from the configured Notion database.

Use this at the start of a bug-fixing session to see available bugs. Filter
by status='Todo' to get bugs that haven't been started. Each bug includes
title, description, status, priority, and page_id; use the page_id from the
results when updating bug status.";

const GET_BUG_DESCRIPTION: &str = "\
Get detailed information about a specific bug by its Notion page ID. Use
this after listing bugs to see the full details of one of them.";

const UPDATE_STATUS_DESCRIPTION: &str = "\
Update the status of a bug in Notion. Set 'In Progress' before starting
work, 'Done' after the fix is verified (e.g. tests pass), or 'Blocked' if
you cannot proceed.";

const ADD_COMMENT_DESCRIPTION: &str = "\
Add a comment to a bug page in Notion. Useful for documenting findings,
progress, or the solution you implemented.";

pub fn list_bugs_tool() -> ToolSpec {
    ToolSpec::new(
        LIST_BUGS,
        LIST_BUGS_DESCRIPTION,
        json!({
            "type": "object",
            "properties": {
                "status_filter": {
                    "type": "string",
                    "description": "Optional. Filter bugs by status. Common values: 'Todo', 'In Progress', 'Done', 'Blocked'. Leave empty to get all bugs."
                },
                "limit": {
                    "type": "integer",
                    "description": "Optional. Maximum number of bugs to return. Default is 10.",
                    "default": DEFAULT_LIST_LIMIT
                }
            },
            "required": []
        }),
    )
}

pub fn get_bug_tool() -> ToolSpec {
    ToolSpec::new(
        GET_BUG,
        GET_BUG_DESCRIPTION,
        json!({
            "type": "object",
            "properties": {
                "page_id": {
                    "type": "string",
                    "description": "The Notion page ID of the bug to retrieve."
                }
            },
            "required": ["page_id"]
        }),
    )
}

pub fn update_status_tool() -> ToolSpec {
    ToolSpec::new(
        UPDATE_STATUS,
        UPDATE_STATUS_DESCRIPTION,
        json!({
            "type": "object",
            "properties": {
                "page_id": {
                    "type": "string",
                    "description": "The Notion page ID of the bug to update."
                },
                "status": {
                    "type": "string",
                    "description": "The new status. Common values: 'Todo', 'In Progress', 'Done', 'Blocked'."
                }
            },
            "required": ["page_id", "status"]
        }),
    )
}

pub fn add_comment_tool() -> ToolSpec {
    ToolSpec::new(
        ADD_COMMENT,
        ADD_COMMENT_DESCRIPTION,
        json!({
            "type": "object",
            "properties": {
                "page_id": {
                    "type": "string",
                    "description": "The Notion page ID of the bug to comment on."
                },
                "comment": {
                    "type": "string",
                    "description": "The comment text to add."
                }
            },
            "required": ["page_id", "comment"]
        }),
    )
}

pub fn all_tools() -> Vec<ToolSpec> {
    vec![
        list_bugs_tool(),
        get_bug_tool(),
        update_status_tool(),
        add_comment_tool(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_tools_with_expected_names() {
        let names: Vec<&str> = all_tools().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec![LIST_BUGS, GET_BUG, UPDATE_STATUS, ADD_COMMENT]);
    }

    #[test]
    fn tools_serialize_to_function_shape() {
        let value = serde_json::to_value(get_bug_tool()).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], GET_BUG);
        assert_eq!(value["function"]["parameters"]["required"][0], "page_id");
    }

    #[test]
    fn update_status_requires_both_arguments() {
        let value = serde_json::to_value(update_status_tool()).unwrap();
        let required = value["function"]["parameters"]["required"]
            .as_array()
            .unwrap();
        assert_eq!(required.len(), 2);
        assert!(required.contains(&serde_json::json!("page_id")));
        assert!(required.contains(&serde_json::json!("status")));
    }

    #[test]
    fn list_bugs_has_no_required_arguments_and_default_limit() {
        let value = serde_json::to_value(list_bugs_tool()).unwrap();
        let params = &value["function"]["parameters"];
        assert!(params["required"].as_array().unwrap().is_empty());
        assert_eq!(params["properties"]["limit"]["default"], 10);
    }
}

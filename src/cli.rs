use anyhow::{bail, Result};

use crate::config;
use crate::notion::NotionClient;
use crate::tools::schema;

/// Default page cap when listing from the terminal; the tool layer uses
/// its own smaller default.
const CLI_LIST_LIMIT: usize = 100;

#[derive(Debug, PartialEq)]
pub struct ListArgs {
    pub status: Option<String>,
    pub limit: usize,
    pub database: Option<String>,
}

/// Entry point for the binary. `args` excludes the program name.
pub async fn run(args: &[String]) -> Result<()> {
    let Some((command, rest)) = args.split_first() else {
        print_help();
        return Ok(());
    };

    match command.as_str() {
        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        "tools" => {
            println!("{}", serde_json::to_string_pretty(&schema::all_tools())?);
            Ok(())
        }
        "list" => {
            let list_args = parse_list_args(rest)?;
            let client = build_client()?;
            let bugs = client
                .list_bugs(
                    list_args.database.as_deref(),
                    list_args.status.as_deref(),
                    list_args.limit,
                )
                .await?;
            if bugs.is_empty() {
                println!("No bugs found.");
            }
            for bug in &bugs {
                println!("{}", bug.summary_line());
            }
            Ok(())
        }
        "get" => {
            let [page_id] = rest else {
                bail!("Usage: bugtrack get <page_id>");
            };
            let client = build_client()?;
            let bug = client.get_bug(page_id).await?;
            println!("Title:    {}", bug.title);
            println!("Status:   {}", bug.status.as_deref().unwrap_or("-"));
            println!("Priority: {}", bug.priority.as_deref().unwrap_or("-"));
            println!("ID:       {}", bug.page_id);
            if !bug.url.is_empty() {
                println!("URL:      {}", bug.url);
            }
            if let Some(desc) = &bug.description {
                println!("\n{desc}");
            }
            Ok(())
        }
        "status" => {
            let (page_id, status) = match rest {
                [page_id, status] => (page_id, status.as_str()),
                _ => bail!("Usage: bugtrack status <page_id> <status>"),
            };
            let client = build_client()?;
            client.update_bug_status(page_id, status, "Status").await?;
            println!("Updated {page_id} to '{status}'");
            Ok(())
        }
        "done" => {
            let [page_id] = rest else {
                bail!("Usage: bugtrack done <page_id>");
            };
            let client = build_client()?;
            client.update_bug_status(page_id, "Done", "Status").await?;
            println!("Updated {page_id} to 'Done'");
            Ok(())
        }
        "comment" => {
            let Some((page_id, words)) = rest.split_first() else {
                bail!("Usage: bugtrack comment <page_id> <text>");
            };
            let text = words.join(" ");
            if text.is_empty() {
                bail!("Comment text cannot be empty");
            }
            let client = build_client()?;
            client.add_comment(page_id, &text).await?;
            println!("Comment added to {page_id}");
            Ok(())
        }
        "check" => {
            let client = build_client()?;
            let (ok, error) = client.test_connection().await;
            if ok {
                println!("Notion connection OK");
                Ok(())
            } else {
                bail!(
                    "Notion connection failed: {}",
                    error.unwrap_or_else(|| "unknown error".to_string())
                )
            }
        }
        other => bail!("Unknown command '{other}'. Run 'bugtrack help' for usage."),
    }
}

fn build_client() -> Result<NotionClient> {
    let config = config::load_config()?;
    let Some(notion) = config::resolve_notion(&config) else {
        bail!(
            "No Notion credentials. Add a [notion] section to ~/.bugtrack/config.toml \
             or set NOTION_API_KEY (and optionally NOTION_DATABASE_ID)."
        );
    };
    Ok(NotionClient::new(notion.api_key, notion.database_id)?)
}

/// Parse `bugtrack list` flags.
///
/// Supported forms:
///   bugtrack list
///   bugtrack list --status Todo
///   bugtrack list -s "In Progress" -n 5
///   bugtrack list --database <db_id>
pub fn parse_list_args(args: &[String]) -> Result<ListArgs> {
    let mut parsed = ListArgs {
        status: None,
        limit: CLI_LIST_LIMIT,
        database: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-s" | "--status" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    bail!("Missing value for -s/--status flag");
                };
                parsed.status = Some(value.clone());
            }
            "-n" | "--limit" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    bail!("Missing value for -n/--limit flag");
                };
                parsed.limit = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid limit '{value}'"))?;
            }
            "--database" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    bail!("Missing value for --database flag");
                };
                parsed.database = Some(value.clone());
            }
            other => bail!("Unknown flag '{other}' for list"),
        }
        i += 1;
    }

    Ok(parsed)
}

pub fn print_help() {
    println!("bugtrack — Notion bug tracking for coding agents\n");
    println!("USAGE:");
    println!("  bugtrack list [--status <s>] [--limit <n>] [--database <id>]");
    println!("  bugtrack get <page_id>");
    println!("  bugtrack status <page_id> <status>");
    println!("  bugtrack done <page_id>");
    println!("  bugtrack comment <page_id> <text>");
    println!("  bugtrack check");
    println!("  bugtrack tools");
    println!();
    println!("CONFIG:");
    println!("  ~/.bugtrack/config.toml with [notion] api_key / database_id,");
    println!("  or NOTION_API_KEY / NOTION_DATABASE_ID in the environment.");
    println!();
    println!("EXAMPLES:");
    println!("  bugtrack list --status Todo");
    println!("  bugtrack done 1a2b3c4d-...");
    println!("  bugtrack comment 1a2b3c4d-... \"Fixed by tightening the retry loop\"");
}

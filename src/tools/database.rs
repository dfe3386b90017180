//! Database-level tools.
//!
//! Tools: createDatabase, listDatabases, deleteDatabase

use serde_json::{Map, Value as JsonValue};

use crate::args;
use crate::convert::{get_string_arg, to_pretty_text};
use crate::error::{McpError, Result};
use crate::store::DocumentStore;
use crate::tools::{ToolCategory, ToolDef};

/// Get all database tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "createDatabase",
            "Create a new CouchDB database. Succeeds if the database already exists.",
            ToolCategory::Database,
            args!(required: { "dbName": string => "Database name" }),
        ),
        ToolDef::new(
            "listDatabases",
            "List all CouchDB databases",
            ToolCategory::Database,
            args!(),
        ),
        ToolDef::new(
            "deleteDatabase",
            "Delete a CouchDB database",
            ToolCategory::Database,
            args!(required: { "dbName": string => "Database name to delete" }),
        ),
    ]
}

/// Dispatch a database tool call.
pub async fn dispatch(
    store: &dyn DocumentStore,
    name: &str,
    args: &Map<String, JsonValue>,
) -> Result<String> {
    match name {
        "createDatabase" => {
            let db_name = get_string_arg(args, "dbName")?;
            store.ensure_database(&db_name).await.map_err(McpError::into_operational)?;
            Ok(format!("Database {} created successfully", db_name))
        }

        "listDatabases" => {
            let databases = store.list_databases().await.map_err(McpError::into_operational)?;
            to_pretty_text(&databases)
        }

        "deleteDatabase" => {
            let db_name = get_string_arg(args, "dbName")?;
            store.delete_database(&db_name).await.map_err(McpError::into_operational)?;
            Ok(format!("Database {} deleted successfully", db_name))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

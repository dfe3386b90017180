//! Document tools.
//!
//! Tools: createDocument, getDocument

use serde_json::{Map, Value as JsonValue};

use crate::args;
use crate::convert::{get_object_arg, get_string_arg, to_compact_text, to_pretty_text};
use crate::error::{McpError, Result};
use crate::store::DocumentStore;
use crate::tools::{ToolCategory, ToolDef};

/// Get all document tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "createDocument",
            "Create a new document or update an existing document in a database. \
             Updates must carry the current _rev in data. The database is created if missing.",
            ToolCategory::Document,
            args!(required: {
                "dbName": string => "Database name",
                "docId": string => "Document ID",
                "data": object => "Document data"
            }),
        ),
        ToolDef::new(
            "getDocument",
            "Get a document from a database",
            ToolCategory::Document,
            args!(required: {
                "dbName": string => "Database name",
                "docId": string => "Document ID"
            }),
        ),
    ]
}

/// Dispatch a document tool call.
pub async fn dispatch(
    store: &dyn DocumentStore,
    name: &str,
    args: &Map<String, JsonValue>,
) -> Result<String> {
    match name {
        "createDocument" => {
            let db_name = get_string_arg(args, "dbName")?;
            let doc_id = get_string_arg(args, "docId")?;
            let data = get_object_arg(args, "data")?;

            let db = store.ensure_database(&db_name).await.map_err(McpError::into_operational)?;
            let write = store
                .insert_document(&db, &doc_id, &data)
                .await
                .map_err(McpError::into_operational)?;
            to_compact_text(&write)
        }

        "getDocument" => {
            let db_name = get_string_arg(args, "dbName")?;
            let doc_id = get_string_arg(args, "docId")?;

            let db = store.ensure_database(&db_name).await.map_err(McpError::into_operational)?;
            let doc = store.get_document(&db, &doc_id).await.map_err(McpError::into_operational)?;
            to_pretty_text(&doc)
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

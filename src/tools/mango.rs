//! Mango index and query tools. Only offered on CouchDB 3.x and later.
//!
//! Tools: createMangoIndex, deleteMangoIndex, listMangoIndexes, findDocuments, queryDocuments

use serde_json::{Map, Value as JsonValue};

use crate::args;
use crate::convert::{
    get_list_arg, get_object_arg, get_optional_bool, get_optional_list, get_optional_u64,
    get_string_arg, to_pretty_text,
};
use crate::error::{McpError, Result};
use crate::query::{self, QueryRequest};
use crate::store::DocumentStore;
use crate::tools::{ToolCategory, ToolDef};

/// Get all Mango tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "createMangoIndex",
            "Create a new Mango index (CouchDB 3.x+)",
            ToolCategory::Mango,
            args!(required: {
                "dbName": string => "Database name",
                "indexName": string => "Name of the index",
                "fields": array_string => "Fields to index"
            }),
        ),
        ToolDef::new(
            "deleteMangoIndex",
            "Delete a Mango index (CouchDB 3.x+)",
            ToolCategory::Mango,
            args!(required: {
                "dbName": string => "Database name",
                "designDoc": string => "Design document name",
                "indexName": string => "Name of the index"
            }),
        ),
        ToolDef::new(
            "listMangoIndexes",
            "List all Mango indexes in a database (CouchDB 3.x+)",
            ToolCategory::Mango,
            args!(required: { "dbName": string => "Database name" }),
        ),
        ToolDef::new(
            "findDocuments",
            "Query documents using a raw Mango query object (CouchDB 3.x+)",
            ToolCategory::Mango,
            args!(required: {
                "dbName": string => "Database name",
                "query": object => "Mango query object"
            }),
        ),
        ToolDef::new(
            "queryDocuments",
            "Query documents using simplified parameters (CouchDB 3.x+). Filters on the \
             same field replace each other; the last one wins. Sort order must be \"asc\" \
             or \"desc\"; any other value is rejected.",
            ToolCategory::Mango,
            args!(
                required: {
                    "dbName": string => "Database name",
                    "filters": filters => "Array of filter objects with field, value, and optional operator"
                },
                optional: {
                    "limit": count => "Maximum number of documents to return",
                    "skip": count => "Number of documents to skip",
                    "fields": array_string => "Field names to return",
                    "sort": sort => "Sort keys in precedence order",
                    "returnIdsOnly": boolean = false => "Return only document IDs"
                }
            ),
        ),
    ]
}

/// Dispatch a Mango tool call.
pub async fn dispatch(
    store: &dyn DocumentStore,
    name: &str,
    args: &Map<String, JsonValue>,
) -> Result<String> {
    match name {
        "createMangoIndex" => {
            let db_name = get_string_arg(args, "dbName")?;
            let index_name = get_string_arg(args, "indexName")?;
            let fields: Vec<String> = get_list_arg(args, "fields")?;

            let db = store.ensure_database(&db_name).await.map_err(McpError::into_operational)?;
            let result = store
                .create_index(&db, &index_name, &fields)
                .await
                .map_err(McpError::into_operational)?;
            to_pretty_text(&result)
        }

        "deleteMangoIndex" => {
            let db_name = get_string_arg(args, "dbName")?;
            let design_doc = get_string_arg(args, "designDoc")?;
            let index_name = get_string_arg(args, "indexName")?;

            let result = store
                .delete_index(&db_name, &design_doc, &index_name)
                .await
                .map_err(McpError::into_operational)?;
            to_pretty_text(&result)
        }

        "listMangoIndexes" => {
            let db_name = get_string_arg(args, "dbName")?;

            let db = store.ensure_database(&db_name).await.map_err(McpError::into_operational)?;
            let result = store.list_indexes(&db).await.map_err(McpError::into_operational)?;
            to_pretty_text(&result)
        }

        "findDocuments" => {
            let db_name = get_string_arg(args, "dbName")?;
            let mango = JsonValue::Object(get_object_arg(args, "query")?);

            let db = store.ensure_database(&db_name).await.map_err(McpError::into_operational)?;
            let result = store.find(&db, &mango).await.map_err(McpError::into_operational)?;
            to_pretty_text(&result)
        }

        "queryDocuments" => {
            let db_name = get_string_arg(args, "dbName")?;
            let request = QueryRequest {
                filters: get_list_arg(args, "filters")?,
                limit: get_optional_u64(args, "limit"),
                skip: get_optional_u64(args, "skip"),
                fields: get_optional_list(args, "fields")?,
                sort: get_optional_list(args, "sort")?,
                return_ids_only: get_optional_bool(args, "returnIdsOnly").unwrap_or(false),
            };

            let db = store.ensure_database(&db_name).await.map_err(McpError::into_operational)?;
            let result = query::execute(store, &db, &request).await?;
            to_pretty_text(&result)
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

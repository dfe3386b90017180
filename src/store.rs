//! Document store abstraction.
//!
//! The tools only talk to CouchDB through [`DocumentStore`], which lets the
//! registry and the query compiler run against [`crate::CouchClient`] in
//! production and against an in-memory double in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::Result;

/// Server identity as reported by `GET /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Version string, normally `MAJOR.MINOR.PATCH`
    pub version: String,
    /// Vendor block, if the server reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<JsonValue>,
}

/// Handle to a database that is known to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseHandle {
    name: String,
}

impl DatabaseHandle {
    /// Create a handle for the named database.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Database name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Result of a document write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentWrite {
    /// Whether CouchDB acknowledged the write
    #[serde(default)]
    pub ok: bool,
    /// Document ID
    pub id: String,
    /// New revision
    pub rev: String,
}

/// Response from `_find`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindResponse {
    /// Matching documents
    #[serde(default)]
    pub docs: Vec<JsonValue>,
    /// Pagination bookmark
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<String>,
    /// Index warning (e.g. no matching index)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Any other keys (`execution_stats`, ...)
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Operations the tools need from a CouchDB-compatible document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch server identity and version.
    async fn server_info(&self) -> Result<ServerInfo>;

    /// Return a handle to `name`, creating the database if it does not exist.
    async fn ensure_database(&self, name: &str) -> Result<DatabaseHandle>;

    /// List all database names.
    async fn list_databases(&self) -> Result<Vec<String>>;

    /// Delete a database.
    async fn delete_database(&self, name: &str) -> Result<()>;

    /// Create or update a document under `id`.
    async fn insert_document(
        &self,
        db: &DatabaseHandle,
        id: &str,
        data: &Map<String, JsonValue>,
    ) -> Result<DocumentWrite>;

    /// Fetch a document by ID.
    async fn get_document(&self, db: &DatabaseHandle, id: &str) -> Result<JsonValue>;

    /// Create a Mango index over `fields`.
    async fn create_index(
        &self,
        db: &DatabaseHandle,
        name: &str,
        fields: &[String],
    ) -> Result<JsonValue>;

    /// Delete a Mango index from a design document.
    async fn delete_index(&self, db: &str, design_doc: &str, index_name: &str)
        -> Result<JsonValue>;

    /// List Mango indexes.
    async fn list_indexes(&self, db: &DatabaseHandle) -> Result<JsonValue>;

    /// Run a Mango query.
    async fn find(&self, db: &DatabaseHandle, query: &JsonValue) -> Result<FindResponse>;
}

//! CouchDB HTTP client.
//!
//! Implements [`DocumentStore`] on top of CouchDB's REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};
use tracing::debug;

use crate::error::{McpError, Result};
use crate::store::{DatabaseHandle, DocumentStore, DocumentWrite, FindResponse, ServerInfo};

/// Default CouchDB URL.
pub const DEFAULT_URL: &str = "http://localhost:5984";

/// CouchDB client configuration.
#[derive(Debug, Clone)]
pub struct CouchConfig {
    /// Base URL of the CouchDB server
    pub url: String,
    /// Request timeout (default: 30 seconds)
    pub timeout: Duration,
}

impl CouchConfig {
    /// Create a new client configuration.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for CouchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

/// Error body returned by CouchDB.
#[derive(Debug, Deserialize)]
struct CouchErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    reason: String,
}

/// CouchDB client.
#[derive(Debug, Clone)]
pub struct CouchClient {
    base: Url,
    http_client: HttpClient,
}

impl CouchClient {
    /// Create a new CouchDB client.
    pub fn new(config: CouchConfig) -> Result<Self> {
        let base = Url::parse(&config.url)
            .map_err(|e| McpError::invalid_arg("url", format!("{}: {}", config.url, e)))?;
        if base.cannot_be_a_base() {
            return Err(McpError::invalid_arg("url", format!("{} is not a base URL", config.url)));
        }

        let http_client = HttpClient::builder().timeout(config.timeout).build()?;

        Ok(Self { base, http_client })
    }

    /// Build a URL from percent-encoded path segments.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| McpError::Internal(format!("{} is not a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and return the raw response.
    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&JsonValue>,
    ) -> Result<Response> {
        let url = self.url(segments)?;
        debug!(%method, %url, "CouchDB request");

        let mut request = self
            .http_client
            .request(method, url)
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// Send a request and decode a successful JSON response.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&JsonValue>,
    ) -> Result<T> {
        let response = self.send(method, segments, body).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response.json().await?)
    }
}

/// Turn a non-success response into a CouchDB error.
async fn error_from_response(response: Response) -> McpError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let (error, reason) = match serde_json::from_str::<CouchErrorBody>(&text) {
        Ok(body) => (body.error, body.reason),
        Err(_) => (String::new(), text),
    };

    McpError::CouchDb {
        status: status.as_u16(),
        error: if error.is_empty() {
            status.canonical_reason().unwrap_or("error").to_string()
        } else {
            error
        },
        reason: if reason.is_empty() {
            status.to_string()
        } else {
            reason
        },
    }
}

/// Strip an optional `_design/` prefix from a design document name.
fn design_doc_name(design_doc: &str) -> &str {
    design_doc.strip_prefix("_design/").unwrap_or(design_doc)
}

#[async_trait]
impl DocumentStore for CouchClient {
    async fn server_info(&self) -> Result<ServerInfo> {
        self.request(Method::GET, &[], None).await
    }

    async fn ensure_database(&self, name: &str) -> Result<DatabaseHandle> {
        let response = self.send(Method::HEAD, &[name], None).await?;
        match response.status() {
            status if status.is_success() => return Ok(DatabaseHandle::new(name)),
            StatusCode::NOT_FOUND => {}
            _ => return Err(error_from_response(response).await),
        }

        debug!(db = name, "Creating missing database");
        let response = self.send(Method::PUT, &[name], None).await?;
        match response.status() {
            // 412: created concurrently by someone else
            status if status.is_success() || status == StatusCode::PRECONDITION_FAILED => {
                Ok(DatabaseHandle::new(name))
            }
            _ => Err(error_from_response(response).await),
        }
    }

    async fn list_databases(&self) -> Result<Vec<String>> {
        self.request(Method::GET, &["_all_dbs"], None).await
    }

    async fn delete_database(&self, name: &str) -> Result<()> {
        let _: JsonValue = self.request(Method::DELETE, &[name], None).await?;
        Ok(())
    }

    async fn insert_document(
        &self,
        db: &DatabaseHandle,
        id: &str,
        data: &Map<String, JsonValue>,
    ) -> Result<DocumentWrite> {
        let body = JsonValue::Object(data.clone());
        self.request(Method::PUT, &[db.name(), id], Some(&body))
            .await
    }

    async fn get_document(&self, db: &DatabaseHandle, id: &str) -> Result<JsonValue> {
        self.request(Method::GET, &[db.name(), id], None).await
    }

    async fn create_index(
        &self,
        db: &DatabaseHandle,
        name: &str,
        fields: &[String],
    ) -> Result<JsonValue> {
        let body = json!({
            "index": { "fields": fields },
            "name": name
        });
        self.request(Method::POST, &[db.name(), "_index"], Some(&body))
            .await
    }

    async fn delete_index(
        &self,
        db: &str,
        design_doc: &str,
        index_name: &str,
    ) -> Result<JsonValue> {
        let segments = [
            db,
            "_index",
            "_design",
            design_doc_name(design_doc),
            "json",
            index_name,
        ];
        self.request(Method::DELETE, &segments, None).await
    }

    async fn list_indexes(&self, db: &DatabaseHandle) -> Result<JsonValue> {
        self.request(Method::GET, &[db.name(), "_index"], None).await
    }

    async fn find(&self, db: &DatabaseHandle, query: &JsonValue) -> Result<FindResponse> {
        self.request(Method::POST, &[db.name(), "_find"], Some(query))
            .await
    }
}

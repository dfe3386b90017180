//! # couchdb-mcp
//!
//! MCP (Model Context Protocol) server for CouchDB.
//!
//! This crate provides an MCP server that exposes CouchDB database, document and
//! Mango query operations as tools for AI agents. It implements the MCP protocol
//! over stdin/stdout using JSON-RPC 2.0.
//!
//! ## Features
//!
//! - **10 tools**: database lifecycle, document create/get, Mango indexes and queries
//! - **Version gating**: Mango tools are only advertised and served on CouchDB 3.x+
//! - **Simplified queries**: `queryDocuments` compiles field filters and sort keys
//!   into a Mango selector
//!
//! ## Usage
//!
//! The server is typically run as an executable and configured in AI tools like Claude Desktop:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "couchdb": {
//!       "command": "/path/to/couchdb-mcp",
//!       "args": ["--url", "http://localhost:5984"]
//!     }
//!   }
//! }
//! ```
//!
//! ## Library Usage
//!
//! For testing or embedding, you can use the library API:
//!
//! ```no_run
//! use std::sync::Arc;
//! use couchdb_mcp::{CouchClient, CouchConfig, McpServer, McpSession};
//!
//! # async fn run() -> couchdb_mcp::Result<()> {
//! let client = CouchClient::new(CouchConfig::new("http://localhost:5984"))?;
//! let session = McpSession::new(Arc::new(client));
//! let mut server = McpServer::new(session);
//!
//! // Run the server (reads from stdin, writes to stdout)
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod capability;
mod convert;
mod couch;
mod error;
pub mod query;
mod server;
mod session;
mod store;
mod tools;

pub use capability::{CapabilityCache, CapabilityTier, MINIMUM_GATED_MAJOR};
pub use couch::{CouchClient, CouchConfig, DEFAULT_URL};
pub use error::{rpc_codes, McpError, Result};
pub use query::{compile, CompiledQuery, FilterClause, QueryRequest, SortClause, SortOrder};
pub use server::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpServer};
pub use session::McpSession;
pub use store::{DatabaseHandle, DocumentStore, DocumentWrite, FindResponse, ServerInfo};
pub use tools::{ArgKind, ArgSpec, TextContent, ToolCategory, ToolDef, ToolRegistry, ToolResponse};

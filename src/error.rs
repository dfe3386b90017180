//! Error types for the MCP server.
//!
//! Errors fall into two classes. Protocol faults (unknown tool, bad arguments,
//! tool unavailable at the server's capability tier) are raised to the
//! JSON-RPC layer. Operational faults (CouchDB or transport failures) are
//! turned into `isError` tool responses by the dispatcher.

use serde::{Deserialize, Serialize};

/// MCP server errors.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
pub enum McpError {
    /// CouchDB answered with a non-success status.
    #[error("couchdb error ({status}): {reason}")]
    CouchDb {
        /// HTTP status code
        status: u16,
        /// CouchDB error tag, e.g. `not_found`
        error: String,
        /// Human-readable reason from CouchDB
        reason: String,
    },

    /// HTTP transport or response decoding failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Unknown tool requested.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Missing required argument.
    #[error("missing required argument: {0}")]
    MissingArg(String),

    /// Invalid argument value.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArg {
        /// Argument name
        name: String,
        /// Reason why it's invalid
        reason: String,
    },

    /// Tool needs a newer CouchDB than the one connected.
    #[error("tool {tool} requires CouchDB {required_major}.x or higher")]
    UnsupportedAtTier {
        /// Tool name
        tool: String,
        /// Minimum major version
        required_major: u32,
    },

    /// The server version could not be determined while gating a tool.
    #[error("tool {tool} unavailable: could not determine CouchDB version: {reason}")]
    TierUnresolved {
        /// Tool name
        tool: String,
        /// Underlying detection failure
        reason: String,
    },

    /// JSON-RPC protocol error.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for McpError {
    fn from(err: reqwest::Error) -> Self {
        McpError::Http(err.to_string())
    }
}

impl From<std::io::Error> for McpError {
    fn from(err: std::io::Error) -> Self {
        McpError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        McpError::Internal(format!("JSON error: {}", err))
    }
}

/// JSON-RPC error codes.
pub mod rpc_codes {
    /// Parse error - Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request - The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found - The method does not exist / is not available.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params - Invalid method parameter(s).
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error - Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;
}

impl McpError {
    /// Convert to JSON-RPC error code.
    pub fn rpc_code(&self) -> i32 {
        match self {
            McpError::UnknownTool(_)
            | McpError::UnsupportedAtTier { .. }
            | McpError::TierUnresolved { .. } => rpc_codes::METHOD_NOT_FOUND,
            McpError::MissingArg(_) | McpError::InvalidArg { .. } => rpc_codes::INVALID_PARAMS,
            McpError::Protocol(_) => rpc_codes::INVALID_REQUEST,
            _ => rpc_codes::INTERNAL_ERROR,
        }
    }

    /// Whether this error is a caller or tier fault that must reach the
    /// JSON-RPC layer instead of being reported inside a tool response.
    pub fn is_protocol_fault(&self) -> bool {
        matches!(
            self,
            McpError::UnknownTool(_)
                | McpError::MissingArg(_)
                | McpError::InvalidArg { .. }
                | McpError::UnsupportedAtTier { .. }
                | McpError::TierUnresolved { .. }
                | McpError::Protocol(_)
        )
    }

    /// Reclassify an error raised by the document store as operational.
    ///
    /// Store failures never reach the JSON-RPC layer, whatever variant the
    /// store chose.
    pub fn into_operational(self) -> Self {
        if self.is_protocol_fault() {
            McpError::Internal(self.to_string())
        } else {
            self
        }
    }

    pub(crate) fn invalid_arg(name: &str, reason: impl Into<String>) -> Self {
        McpError::InvalidArg {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for MCP operations.
pub type Result<T> = std::result::Result<T, McpError>;

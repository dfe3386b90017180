//! MCP session management.
//!
//! Wraps the document store together with the capability cache for the
//! connected server.

use std::sync::Arc;

use tracing::warn;

use crate::capability::{CapabilityCache, MINIMUM_GATED_MAJOR};
use crate::error::{McpError, Result};
use crate::store::DocumentStore;

/// MCP session state.
///
/// Holds the store every tool talks to and the server's capability tier,
/// detected lazily on first use.
pub struct McpSession {
    /// Backend for all tool calls
    store: Arc<dyn DocumentStore>,
    /// Detected server tier
    capability: CapabilityCache,
}

impl McpSession {
    /// Create a new MCP session over a document store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_capability(store, CapabilityCache::new())
    }

    /// Create a session with a preconfigured capability cache.
    pub fn with_capability(store: Arc<dyn DocumentStore>, capability: CapabilityCache) -> Self {
        Self { store, capability }
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Capability cache.
    pub fn capability(&self) -> &CapabilityCache {
        &self.capability
    }

    /// Mutable capability cache, e.g. to reset it.
    pub fn capability_mut(&mut self) -> &mut CapabilityCache {
        &mut self.capability
    }

    /// Whether gated tools should be advertised.
    ///
    /// Detection failures are logged and answer `false`.
    pub async fn gated_tools_available(&mut self) -> bool {
        match self.capability.meets_minimum(self.store.as_ref()).await {
            Ok(available) => available,
            Err(e) => {
                warn!(error = %e, "Could not detect CouchDB version; offering base tools only");
                false
            }
        }
    }

    /// Fail unless the server is recent enough to run gated `tool`.
    pub async fn require_gated(&mut self, tool: &str) -> Result<()> {
        match self.capability.meets_minimum(self.store.as_ref()).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(McpError::UnsupportedAtTier {
                tool: tool.to_string(),
                required_major: MINIMUM_GATED_MAJOR,
            }),
            Err(e) => Err(McpError::TierUnresolved {
                tool: tool.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

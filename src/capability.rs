//! CouchDB capability tier detection.
//!
//! The tier is derived from the major version reported by the server and is
//! detected at most once per session. Failed detections are not cached.

use std::fmt;

use tracing::{debug, info};

use crate::error::Result;
use crate::store::DocumentStore;

/// Lowest CouchDB major version that serves the Mango tools.
pub const MINIMUM_GATED_MAJOR: u32 = 3;

/// Capability tier of the connected server.
///
/// `Unrecognized` sorts below every `Major`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CapabilityTier {
    /// The version string had no numeric major segment.
    Unrecognized,
    /// Known major version.
    Major(u32),
}

impl CapabilityTier {
    /// Parse a `MAJOR.MINOR.PATCH` version string.
    ///
    /// Only the leading digits of the first segment are read, so `"3.3.3"`,
    /// `"3"` and `"3rc1.0"` all give `Major(3)`.
    pub fn from_version(version: &str) -> Self {
        let major = version.trim().split('.').next().unwrap_or_default();
        let digits: String = major.chars().take_while(|c| c.is_ascii_digit()).collect();
        match digits.parse::<u32>() {
            Ok(n) => CapabilityTier::Major(n),
            Err(_) => CapabilityTier::Unrecognized,
        }
    }

    /// Whether gated tools are available at this tier.
    pub fn meets_minimum(self) -> bool {
        self >= CapabilityTier::Major(MINIMUM_GATED_MAJOR)
    }
}

impl fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityTier::Unrecognized => write!(f, "unrecognized"),
            CapabilityTier::Major(n) => write!(f, "{}.x", n),
        }
    }
}

/// Get-or-detect cache for the server's capability tier.
#[derive(Debug, Default)]
pub struct CapabilityCache {
    tier: Option<CapabilityTier>,
}

impl CapabilityCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache that already holds `tier`.
    pub fn with_tier(tier: CapabilityTier) -> Self {
        Self { tier: Some(tier) }
    }

    /// The cached tier, if detection has succeeded.
    pub fn cached(&self) -> Option<CapabilityTier> {
        self.tier
    }

    /// Return the cached tier or ask the store for it.
    pub async fn tier(&mut self, store: &dyn DocumentStore) -> Result<CapabilityTier> {
        if let Some(tier) = self.tier {
            return Ok(tier);
        }

        debug!("Detecting CouchDB version");
        let info = store.server_info().await?;
        let tier = CapabilityTier::from_version(&info.version);
        info!(version = %info.version, %tier, "Detected CouchDB capability tier");

        self.tier = Some(tier);
        Ok(tier)
    }

    /// Whether the server supports gated tools.
    pub async fn meets_minimum(&mut self, store: &dyn DocumentStore) -> Result<bool> {
        Ok(self.tier(store).await?.meets_minimum())
    }

    /// Forget the cached tier.
    pub fn reset(&mut self) {
        self.tier = None;
    }
}

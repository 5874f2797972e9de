//! Engine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Synchronization engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on a single result fetch; `None` lets a fetch run
    /// unbounded, leaving the entry loading until it resolves
    pub fetch_timeout: Option<Duration>,
    /// Re-fetch the whole tree when a node-created notification names an
    /// unknown parent, instead of dropping the insert
    pub resync_on_unknown_parent: bool,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a fetch timeout
    #[inline]
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// With unknown-parent resync enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_resync_on_unknown_parent(mut self, enabled: bool) -> Self {
        self.resync_on_unknown_parent = enabled;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: None,
            resync_on_unknown_parent: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = EngineConfig::new();
        assert!(config.fetch_timeout.is_none());
        assert!(config.resync_on_unknown_parent);
    }

    #[test]
    fn config_builder() {
        let config = EngineConfig::new()
            .with_fetch_timeout(Duration::from_secs(30))
            .with_resync_on_unknown_parent(false);

        assert_eq!(config.fetch_timeout, Some(Duration::from_secs(30)));
        assert!(!config.resync_on_unknown_parent);
    }
}

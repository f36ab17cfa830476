//! Router configuration.

use crate::{CoreError, CoreResult, NodeName};

/// Name of the canonical origin for responder routes.
pub const DEFAULT_START_NODE: &str = "defaultStartNode";

/// Usernames that mark test or placeholder accounts in the incident feed.
const DEFAULT_DENYLIST: [&str; 5] = ["test", "placeholder", "example", "demo", "admin"];

/// Top-level router configuration.
///
/// Typically built by the application crate (from CLI flags or a JSON file)
/// and handed to the dispatch builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RouterConfig {
    /// Origin of every responder route.  Must exist in the static table.
    pub start_node: NodeName,

    /// How many nearest static waypoints an incident node is linked to.
    pub incident_neighbors: usize,

    /// Upper bound on routes returned per query (shortest + alternatives).
    pub alternative_count: usize,

    /// Exact-match username denylist.  Compared against the trimmed,
    /// lowercased username.
    pub username_denylist: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            start_node:         NodeName::from(DEFAULT_START_NODE),
            incident_neighbors: 3,
            alternative_count:  3,
            username_denylist:  DEFAULT_DENYLIST.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl RouterConfig {
    /// Reject configurations that cannot produce a route.
    pub fn validate(&self) -> CoreResult<()> {
        if self.start_node.as_str().trim().is_empty() {
            return Err(CoreError::Config("start_node must not be empty".into()));
        }
        if self.incident_neighbors == 0 {
            return Err(CoreError::Config(
                "incident_neighbors must be at least 1 or incident nodes are unreachable".into(),
            ));
        }
        if self.alternative_count == 0 {
            return Err(CoreError::Config("alternative_count must be at least 1".into()));
        }
        Ok(())
    }

    /// `true` if `username` is a denylisted placeholder account.
    pub fn is_denylisted(&self, username: &str) -> bool {
        let normalized = username.trim().to_lowercase();
        self.username_denylist
            .iter()
            .any(|entry| entry.trim().to_lowercase() == normalized)
    }
}

//! Correlation identifier for a single diff invocation
//!
//! One `RunId` is minted per CLI invocation and attached to every log event
//! and error it produces, so that the two stream reads, the diff and the
//! render of one run can be grouped together in aggregated logs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one diff run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Generate a new time-ordered RunId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (e.g. a collector-supplied run id)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

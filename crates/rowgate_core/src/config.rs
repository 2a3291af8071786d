//! Partial evaluation settings.

use crate::error::{CoreError, CoreResult};
use crate::path::NAMESPACE_DEPTH;
use serde::{Deserialize, Serialize};

/// Query evaluated when none is configured
pub const DEFAULT_QUERY: &str = "data.example.allow == true";

/// Unknown root used when none is configured
pub const DEFAULT_UNKNOWN: &str = "data.elastic";

/// How the policy engine is asked to partially evaluate a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialEvalConfig {
    /// Top-level query
    pub query: String,
    /// Data roots left unresolved
    pub unknowns: Vec<String>,
}

impl PartialEvalConfig {
    /// Create a config for one query and unknown root
    #[must_use]
    pub fn new(query: impl Into<String>, unknown: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            unknowns: vec![unknown.into()],
        }
    }

    /// Parse and validate a JSON config
    ///
    /// # Errors
    ///
    /// Returns error if the text is not valid JSON or fails validation
    pub fn from_json_str(text: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config can be compiled against.
    ///
    /// # Errors
    ///
    /// Returns error unless there is exactly one unknown root of exactly
    /// two segments, and the query is not blank.
    pub fn validate(&self) -> CoreResult<()> {
        if self.query.trim().is_empty() {
            return Err(CoreError::validation("query", "must not be empty"));
        }

        let [root] = self.unknowns.as_slice() else {
            return Err(CoreError::validation(
                "unknowns",
                format!("expected exactly one root, found {}", self.unknowns.len()),
            ));
        };

        let segments: Vec<&str> = root.split('.').collect();
        if segments.len() != NAMESPACE_DEPTH || segments.iter().any(|s| s.is_empty()) {
            return Err(CoreError::validation(
                "unknowns",
                format!("root {root:?} must have exactly {NAMESPACE_DEPTH} segments"),
            ));
        }

        Ok(())
    }
}

impl Default for PartialEvalConfig {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY, DEFAULT_UNKNOWN)
    }
}

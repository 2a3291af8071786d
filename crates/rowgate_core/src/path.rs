//! Resolution of data references into collection and field paths.

use crate::error::{CompileError, CompileResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of leading reference segments naming the unknown namespace
/// (`data.<root>`). Only one fixed-depth root is handled; deeper roots would
/// shift which segment is read as the collection.
pub const NAMESPACE_DEPTH: usize = 2;

/// Field addressed by a reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPath {
    /// Collection (index, table) the reference points into
    pub collection: String,
    /// Field path inside a document; more than one segment is a nested field
    pub segments: Vec<String>,
}

impl FieldPath {
    /// Create a field path
    #[must_use]
    pub fn new(collection: impl Into<String>, segments: Vec<String>) -> Self {
        Self {
            collection: collection.into(),
            segments,
        }
    }

    /// Check if the field descends into a sub-document
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    /// Segments of the enclosing sub-document, if nested
    #[must_use]
    pub fn parent(&self) -> Option<&[String]> {
        match self.segments.split_last() {
            Some((_, parent)) if !parent.is_empty() => Some(parent),
            _ => None,
        }
    }

    /// Field path joined with `.`
    #[must_use]
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.collection, self.dotted())
    }
}

/// Parses reference strings into [`FieldPath`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver;

impl PathResolver {
    /// Create a new resolver
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolve a reference such as `data.elastic.posts[_].followers[_].info.first`.
    ///
    /// Iteration and index markers (`[...]`) are dropped from every segment,
    /// the namespace prefix is skipped, the next segment is the collection and
    /// the rest is the field path.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::MalformedReference`] if the reference does not
    /// name both a collection and a field after the namespace prefix, or if
    /// any of those segments is empty.
    pub fn resolve(&self, reference: &str) -> CompileResult<FieldPath> {
        let tokens: Vec<&str> = reference.split('.').map(strip_index).collect();

        let named = tokens.get(NAMESPACE_DEPTH..).unwrap_or_default();
        let Some((collection, segments)) = named.split_first() else {
            return Err(CompileError::MalformedReference(reference.to_string()));
        };
        if segments.is_empty() || named.iter().any(|t| t.is_empty()) {
            return Err(CompileError::MalformedReference(reference.to_string()));
        }

        let collection = (*collection).to_string();
        let segments = segments.iter().map(|s| (*s).to_string()).collect();

        Ok(FieldPath {
            collection,
            segments,
        })
    }
}

fn strip_index(segment: &str) -> &str {
    segment.split('[').next().unwrap_or(segment)
}

//! Structural predicate tree.
//!
//! A backend-neutral [`QueryBuilder`] whose output is the predicate algebra
//! itself. Used to inspect compiler output and to test backends against it.

use crate::builder::{EqualsTerm, NestedScope, QueryBuilder, RangeTerm, RegexTerm, SubstringTerm};
use rowgate_core::RangeOp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Compiled predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Field equals value
    Equals {
        /// Field path
        path: Vec<String>,
        /// Expected value
        value: Value,
    },
    /// Negation
    Not(Box<Predicate>),
    /// Range comparison
    Range {
        /// Field path
        path: Vec<String>,
        /// Bound kind
        op: RangeOp,
        /// Bound value
        value: Value,
    },
    /// Substring match
    SubstringMatch {
        /// Field path
        path: Vec<String>,
        /// Text to find
        value: Value,
    },
    /// Regular expression match
    RegexMatch {
        /// Field path
        path: Vec<String>,
        /// Pattern
        pattern: String,
    },
    /// Conjunction
    And(Vec<Predicate>),
    /// Disjunction
    Or(Vec<Predicate>),
    /// Scope to a sub-document
    Nested {
        /// Sub-document path
        path: Vec<String>,
        /// Inner predicate
        inner: Box<Predicate>,
    },
    /// Always true
    MatchAll,
}

impl Predicate {
    /// Count leaf predicates
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Not(inner) => inner.leaf_count(),
            Self::Nested { inner, .. } => inner.leaf_count(),
            Self::And(items) | Self::Or(items) => items.iter().map(Self::leaf_count).sum(),
            _ => 1,
        }
    }
}

/// Builds [`Predicate`] trees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredicateBuilder {
    nesting: bool,
}

impl PredicateBuilder {
    /// Builder for backends with addressable sub-documents
    #[must_use]
    pub fn nested() -> Self {
        Self { nesting: true }
    }

    /// Builder for flat backends, where nested scopes pass through
    #[must_use]
    pub fn flat() -> Self {
        Self { nesting: false }
    }
}

impl Default for PredicateBuilder {
    fn default() -> Self {
        Self::nested()
    }
}

impl QueryBuilder for PredicateBuilder {
    type Predicate = Predicate;

    fn equals(&self, term: EqualsTerm) -> Predicate {
        Predicate::Equals {
            path: term.path,
            value: term.value,
        }
    }

    fn not(&self, inner: Predicate) -> Predicate {
        Predicate::Not(Box::new(inner))
    }

    fn range(&self, term: RangeTerm) -> Predicate {
        Predicate::Range {
            path: term.path,
            op: term.op,
            value: term.value,
        }
    }

    fn substring_match(&self, term: SubstringTerm) -> Predicate {
        Predicate::SubstringMatch {
            path: term.path,
            value: term.value,
        }
    }

    fn regex_match(&self, term: RegexTerm) -> Predicate {
        Predicate::RegexMatch {
            path: term.path,
            pattern: term.pattern,
        }
    }

    fn and(&self, all: Vec<Predicate>) -> Predicate {
        Predicate::And(all)
    }

    fn or(&self, any: Vec<Predicate>) -> Predicate {
        Predicate::Or(any)
    }

    fn nested(&self, scope: NestedScope<Predicate>) -> Predicate {
        if self.nesting {
            Predicate::Nested {
                path: scope.path,
                inner: Box::new(scope.inner),
            }
        } else {
            scope.inner
        }
    }

    fn match_all(&self) -> Predicate {
        Predicate::MatchAll
    }
}

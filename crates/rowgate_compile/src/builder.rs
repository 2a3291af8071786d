//! Backend query builder capability.
//!
//! The compiler never looks inside a predicate. It only asks a
//! [`QueryBuilder`] to construct one, so a single compiler serves every
//! backend. Each constructor takes one parameter struct.

use rowgate_core::RangeOp;
use serde_json::Value;

/// Arguments of an equality predicate
#[derive(Debug, Clone, PartialEq)]
pub struct EqualsTerm {
    /// Field path segments
    pub path: Vec<String>,
    /// Value the field must equal
    pub value: Value,
}

/// Arguments of a range predicate
#[derive(Debug, Clone, PartialEq)]
pub struct RangeTerm {
    /// Field path segments
    pub path: Vec<String>,
    /// Bound kind
    pub op: RangeOp,
    /// Bound value
    pub value: Value,
}

/// Arguments of a substring predicate. The value matches anywhere in the
/// field, not literally.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstringTerm {
    /// Field path segments
    pub path: Vec<String>,
    /// Text to look for
    pub value: Value,
}

/// Arguments of a regular expression predicate
#[derive(Debug, Clone, PartialEq)]
pub struct RegexTerm {
    /// Field path segments
    pub path: Vec<String>,
    /// Pattern, used verbatim
    pub pattern: String,
}

/// Predicate scoped to an embedded sub-document
#[derive(Debug, Clone, PartialEq)]
pub struct NestedScope<P> {
    /// Path of the sub-document
    pub path: Vec<String>,
    /// Predicate evaluated inside it
    pub inner: P,
}

/// Constructs one backend's native predicates.
///
/// Implementations must build a fresh value on every call and keep no
/// mutable state, so one builder can serve concurrent compilations.
pub trait QueryBuilder {
    /// Backend predicate representation
    type Predicate;

    /// Field equals a value
    fn equals(&self, term: EqualsTerm) -> Self::Predicate;

    /// Negation
    fn not(&self, inner: Self::Predicate) -> Self::Predicate;

    /// Field compared against a bound
    fn range(&self, term: RangeTerm) -> Self::Predicate;

    /// Field contains a value as a substring
    fn substring_match(&self, term: SubstringTerm) -> Self::Predicate;

    /// Field matches a regular expression
    fn regex_match(&self, term: RegexTerm) -> Self::Predicate;

    /// Conjunction, arguments in order
    fn and(&self, all: Vec<Self::Predicate>) -> Self::Predicate;

    /// Disjunction, arguments in order
    fn or(&self, any: Vec<Self::Predicate>) -> Self::Predicate;

    /// Nested scope. Backends without addressable sub-documents return
    /// `scope.inner` unchanged.
    fn nested(&self, scope: NestedScope<Self::Predicate>) -> Self::Predicate;

    /// Matches every document
    fn match_all(&self) -> Self::Predicate;
}

impl<B: QueryBuilder + ?Sized> QueryBuilder for &B {
    type Predicate = B::Predicate;

    fn equals(&self, term: EqualsTerm) -> Self::Predicate {
        (**self).equals(term)
    }

    fn not(&self, inner: Self::Predicate) -> Self::Predicate {
        (**self).not(inner)
    }

    fn range(&self, term: RangeTerm) -> Self::Predicate {
        (**self).range(term)
    }

    fn substring_match(&self, term: SubstringTerm) -> Self::Predicate {
        (**self).substring_match(term)
    }

    fn regex_match(&self, term: RegexTerm) -> Self::Predicate {
        (**self).regex_match(term)
    }

    fn and(&self, all: Vec<Self::Predicate>) -> Self::Predicate {
        (**self).and(all)
    }

    fn or(&self, any: Vec<Self::Predicate>) -> Self::Predicate {
        (**self).or(any)
    }

    fn nested(&self, scope: NestedScope<Self::Predicate>) -> Self::Predicate {
        (**self).nested(scope)
    }

    fn match_all(&self) -> Self::Predicate {
        (**self).match_all()
    }
}

//! Document database filter builder.

use rowgate_compile::{EqualsTerm, NestedScope, QueryBuilder, RangeTerm, RegexTerm, SubstringTerm};
use serde_json::{json, Map, Value};

/// Builds MongoDB filter documents.
///
/// Dotted paths already reach into embedded documents, so nested scopes
/// pass their inner filter through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoBuilder;

impl MongoBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn field_filter(path: &[String], op: &str, value: Value) -> Value {
    let mut condition = Map::new();
    condition.insert(op.to_string(), value);
    let mut filter = Map::new();
    filter.insert(path.join("."), Value::Object(condition));
    Value::Object(filter)
}

impl QueryBuilder for MongoBuilder {
    type Predicate = Value;

    fn equals(&self, term: EqualsTerm) -> Value {
        field_filter(&term.path, "$eq", term.value)
    }

    fn not(&self, inner: Value) -> Value {
        json!({ "$nor": [inner] })
    }

    fn range(&self, term: RangeTerm) -> Value {
        field_filter(&term.path, &format!("${}", term.op.as_str()), term.value)
    }

    fn substring_match(&self, term: SubstringTerm) -> Value {
        let needle = match &term.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        field_filter(&term.path, "$regex", Value::String(regex::escape(&needle)))
    }

    fn regex_match(&self, term: RegexTerm) -> Value {
        field_filter(&term.path, "$regex", Value::String(term.pattern))
    }

    fn and(&self, all: Vec<Value>) -> Value {
        json!({ "$and": all })
    }

    fn or(&self, any: Vec<Value>) -> Value {
        json!({ "$or": any })
    }

    fn nested(&self, scope: NestedScope<Value>) -> Value {
        scope.inner
    }

    fn match_all(&self) -> Value {
        json!({})
    }
}

//! Search engine query DSL builder.

use rowgate_compile::{EqualsTerm, NestedScope, QueryBuilder, RangeTerm, RegexTerm, SubstringTerm};
use serde_json::{json, Map, Value};

/// Builds Elasticsearch query DSL.
///
/// Documents may hold nested objects, so equality on a nested field is
/// wrapped in a `nested` query.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElasticBuilder;

impl ElasticBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn field_query(kind: &str, path: &[String], body: Value) -> Value {
    let mut field = Map::new();
    field.insert(path.join("."), body);
    let mut query = Map::new();
    query.insert(kind.to_string(), Value::Object(field));
    Value::Object(query)
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl QueryBuilder for ElasticBuilder {
    type Predicate = Value;

    fn equals(&self, term: EqualsTerm) -> Value {
        field_query("term", &term.path, json!({ "value": term.value }))
    }

    fn not(&self, inner: Value) -> Value {
        json!({ "bool": { "must_not": [inner] } })
    }

    fn range(&self, term: RangeTerm) -> Value {
        let mut bound = Map::new();
        bound.insert(term.op.as_str().to_string(), term.value);
        field_query("range", &term.path, Value::Object(bound))
    }

    fn substring_match(&self, term: SubstringTerm) -> Value {
        json!({
            "query_string": {
                "default_field": term.path.join("."),
                "query": format!("*{}*", text(&term.value)),
            }
        })
    }

    fn regex_match(&self, term: RegexTerm) -> Value {
        field_query("regexp", &term.path, json!({ "value": term.pattern }))
    }

    fn and(&self, all: Vec<Value>) -> Value {
        json!({ "bool": { "filter": all } })
    }

    fn or(&self, any: Vec<Value>) -> Value {
        json!({ "bool": { "should": any } })
    }

    fn nested(&self, scope: NestedScope<Value>) -> Value {
        json!({
            "nested": {
                "path": scope.path.join("."),
                "query": scope.inner,
            }
        })
    }

    fn match_all(&self) -> Value {
        json!({ "match_all": {} })
    }
}

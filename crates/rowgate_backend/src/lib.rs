//! ROWGATE Backends
//!
//! Query builders turning compiled residuals into native filters for a
//! search engine and a document database.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod elastic;
pub mod mongo;

pub use elastic::ElasticBuilder;
pub use mongo::MongoBuilder;

use rowgate_compile::{CompilationResult, PredicateBuilder, ResidualCompiler};
use rowgate_core::{CoreResult, Residual};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Data store a residual is compiled for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Search engine query DSL
    #[default]
    Elastic,
    /// Document database filter
    Mongo,
    /// Backend-neutral predicate tree
    Predicate,
}

impl Backend {
    /// All backends
    pub const ALL: [Backend; 3] = [Self::Elastic, Self::Mongo, Self::Predicate];

    /// Lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Elastic => "elastic",
            Self::Mongo => "mongo",
            Self::Predicate => "predicate",
        }
    }

    /// Compile a residual and render the result as JSON
    ///
    /// # Errors
    ///
    /// Returns error if the residual does not compile
    pub fn compile_to_json(self, residual: &Residual) -> CoreResult<CompilationResult<Value>> {
        tracing::debug!(backend = self.as_str(), "compiling for backend");

        let result = match self {
            Self::Elastic => ResidualCompiler::new(ElasticBuilder::new()).compile(residual)?,
            Self::Mongo => ResidualCompiler::new(MongoBuilder::new()).compile(residual)?,
            Self::Predicate => {
                let result = ResidualCompiler::new(PredicateBuilder::nested()).compile(residual)?;
                let predicate = result.predicate.map(serde_json::to_value).transpose()?;
                CompilationResult {
                    defined: result.defined,
                    predicate,
                }
            }
        };

        Ok(result)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| format!("unknown backend: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowgate_core::{Clause, CoreError, Expression, Operand, OperatorKind};
    use serde_json::json;

    fn residual() -> Residual {
        Residual::new(vec![Clause::new(vec![Expression::binary(
            OperatorKind::Eq,
            Operand::reference("data.elastic.posts[_].author"),
            Operand::constant("bob"),
        )])])
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("mongo".parse::<Backend>(), Ok(Backend::Mongo));
        assert!("sql".parse::<Backend>().is_err());
        for backend in Backend::ALL {
            assert_eq!(backend.to_string().parse::<Backend>(), Ok(backend));
        }
    }

    #[test]
    fn test_compile_each_backend() {
        let r = residual();
        assert_eq!(
            Backend::Elastic.compile_to_json(&r).unwrap().predicate,
            Some(json!({"term": {"author": {"value": "bob"}}}))
        );
        assert_eq!(
            Backend::Mongo.compile_to_json(&r).unwrap().predicate,
            Some(json!({"author": {"$eq": "bob"}}))
        );
        assert_eq!(
            Backend::Predicate.compile_to_json(&r).unwrap().predicate,
            Some(json!({"equals": {"path": ["author"], "value": "bob"}}))
        );
    }

    #[test]
    fn test_deny_and_allow_render() {
        let deny = Backend::Elastic.compile_to_json(&Residual::default()).unwrap();
        assert_eq!(
            serde_json::to_value(&deny).unwrap(),
            json!({"defined": false, "predicate": null})
        );

        let allow = Backend::Mongo
            .compile_to_json(&Residual::new(vec![Clause::default()]))
            .unwrap();
        assert_eq!(
            serde_json::to_value(&allow).unwrap(),
            json!({"defined": true, "predicate": null})
        );
    }

    #[test]
    fn test_compile_error_surfaces() {
        let bad = Residual::new(vec![Clause::new(vec![Expression::binary(
            "add".to_string(),
            Operand::reference("data.elastic.posts[_].a"),
            Operand::constant(1),
        )])]);
        assert!(matches!(
            Backend::Predicate.compile_to_json(&bad),
            Err(CoreError::Compile(_))
        ));
    }
}

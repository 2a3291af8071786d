//! Policy engine compile API: request bodies and partial evaluation results.
//!
//! The engine returns residuals as AST JSON. Each query is a list of
//! expressions whose `terms` are either a single term or a call
//! (`[operator, operand...]`). Terms are `{"type": ..., "value": ...}`.

use crate::config::PartialEvalConfig;
use crate::error::{CoreError, CoreResult};
use crate::residual::{Clause, Expression, Operand, Operator, Residual};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a compile API request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileRequest {
    /// Query to partially evaluate
    pub query: String,
    /// Request input document
    pub input: Value,
    /// Data roots left unresolved
    pub unknowns: Vec<String>,
}

impl CompileRequest {
    /// Build a request for one input document
    ///
    /// # Errors
    ///
    /// Returns error if the config fails validation
    pub fn new(config: &PartialEvalConfig, input: Value) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self {
            query: config.query.clone(),
            input,
            unknowns: config.unknowns.clone(),
        })
    }
}

/// Compile API response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompileResponse {
    /// Partial evaluation result
    #[serde(default)]
    pub result: PartialResult,
}

impl CompileResponse {
    /// Parse a response body and decode its residual
    ///
    /// # Errors
    ///
    /// Returns error if the body is not a compile response or the queries
    /// cannot be expressed as a residual
    pub fn residual_from_json_str(text: &str) -> CoreResult<Residual> {
        let response: Self = serde_json::from_str(text)?;
        response.result.to_residual()
    }
}

/// Queries left after partial evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialResult {
    /// Disjoined queries; absent when the query can never be true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queries: Option<Vec<Vec<AstExpr>>>,
}

impl PartialResult {
    /// Convert the queries into a residual.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ParseError`] for expressions that cannot be
    /// pushed down: negated expressions, bare terms, and constants that
    /// still contain references.
    pub fn to_residual(&self) -> CoreResult<Residual> {
        let Some(queries) = &self.queries else {
            return Ok(Residual::default());
        };

        let clauses = queries
            .iter()
            .map(|query| {
                query
                    .iter()
                    .map(AstExpr::to_expression)
                    .collect::<CoreResult<Vec<_>>>()
                    .map(Clause::new)
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Residual::new(clauses))
    }
}

/// One AST expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstExpr {
    /// Position in its query
    #[serde(default)]
    pub index: usize,
    /// Whether the expression is negated
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negated: bool,
    /// `with` modifiers replacing input or data for this expression
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub with: Vec<Value>,
    /// Call terms or a single term
    pub terms: AstTerms,
}

/// Expression body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AstTerms {
    /// Builtin call: operator followed by operands
    Call(Vec<AstTerm>),
    /// Bare term
    Single(AstTerm),
}

/// One AST term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AstTerm {
    /// `null`
    Null,
    /// Boolean literal
    Boolean(bool),
    /// Number literal
    Number(serde_json::Number),
    /// String literal
    String(String),
    /// Variable
    Var(String),
    /// Reference; the first term is the head
    Ref(Vec<AstTerm>),
    /// Array
    Array(Vec<AstTerm>),
    /// Set
    Set(Vec<AstTerm>),
    /// Object as key/value pairs
    Object(Vec<(AstTerm, AstTerm)>),
    /// Nested call
    Call(Vec<AstTerm>),
}

impl AstExpr {
    fn to_expression(&self) -> CoreResult<Expression> {
        if self.negated {
            return Err(CoreError::parse(format!(
                "expression {} is negated and cannot be pushed down",
                self.index
            )));
        }

        if !self.with.is_empty() {
            return Err(CoreError::parse(format!(
                "expression {} has `with` modifiers and cannot be pushed down",
                self.index
            )));
        }

        let AstTerms::Call(terms) = &self.terms else {
            return Err(CoreError::parse(format!(
                "expression {} is not a builtin call",
                self.index
            )));
        };

        let Some((operator, operands)) = terms.split_first() else {
            return Err(CoreError::parse(format!("expression {} has no terms", self.index)));
        };

        let operands = operands
            .iter()
            .map(AstTerm::to_operand)
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Expression::new(Operator::parse(&operator.operator_name()?), operands))
    }
}

impl AstTerm {
    fn operator_name(&self) -> CoreResult<String> {
        let AstTerm::Ref(parts) = self else {
            return Err(CoreError::parse("call operator must be a reference"));
        };

        let names = parts
            .iter()
            .map(|part| match part {
                AstTerm::Var(name) | AstTerm::String(name) => Ok(name.as_str()),
                other => Err(CoreError::parse(format!(
                    "unexpected term in operator name: {}",
                    other.render()
                ))),
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(names.join("."))
    }

    fn to_operand(&self) -> CoreResult<Operand> {
        match self {
            AstTerm::Ref(_) | AstTerm::Var(_) => Ok(Operand::Reference(self.render())),
            _ => self.to_value().map(Operand::Constant),
        }
    }

    fn to_value(&self) -> CoreResult<Value> {
        match self {
            AstTerm::Null => Ok(Value::Null),
            AstTerm::Boolean(b) => Ok(Value::Bool(*b)),
            AstTerm::Number(n) => Ok(Value::Number(n.clone())),
            AstTerm::String(s) => Ok(Value::String(s.clone())),
            AstTerm::Array(items) | AstTerm::Set(items) => items
                .iter()
                .map(AstTerm::to_value)
                .collect::<CoreResult<Vec<_>>>()
                .map(Value::Array),
            AstTerm::Object(pairs) => {
                let mut map = Map::new();
                for (key, value) in pairs {
                    let AstTerm::String(key) = key else {
                        return Err(CoreError::parse(format!(
                            "object key {} is not a string",
                            key.render()
                        )));
                    };
                    map.insert(key.clone(), value.to_value()?);
                }
                Ok(Value::Object(map))
            }
            AstTerm::Var(_) | AstTerm::Ref(_) | AstTerm::Call(_) => Err(CoreError::parse(
                format!("constant contains unresolved term {}", self.render()),
            )),
        }
    }

    /// Textual form as the policy engine prints it
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            AstTerm::Null => "null".to_string(),
            AstTerm::Boolean(b) => b.to_string(),
            AstTerm::Number(n) => n.to_string(),
            AstTerm::String(s) => Value::String(s.clone()).to_string(),
            AstTerm::Var(name) => name.clone(),
            AstTerm::Ref(parts) => render_ref(parts),
            AstTerm::Array(items) => format!("[{}]", render_list(items)),
            AstTerm::Set(items) => format!("{{{}}}", render_list(items)),
            AstTerm::Object(pairs) => {
                let pairs: Vec<String> = pairs
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.render(), v.render()))
                    .collect();
                format!("{{{}}}", pairs.join(", "))
            }
            AstTerm::Call(terms) => match terms.split_first() {
                Some((op, args)) => format!("{}({})", op.render(), render_list(args)),
                None => String::new(),
            },
        }
    }
}

fn render_list(items: &[AstTerm]) -> String {
    items.iter().map(AstTerm::render).collect::<Vec<_>>().join(", ")
}

fn render_ref(parts: &[AstTerm]) -> String {
    let Some((head, rest)) = parts.split_first() else {
        return String::new();
    };

    let mut out = head.render();
    for part in rest {
        match part {
            AstTerm::String(s) if is_identifier(s) => {
                out.push('.');
                out.push_str(s);
            }
            other => {
                out.push('[');
                out.push_str(&other.render());
                out.push(']');
            }
        }
    }
    out
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

//! Residual data model produced by partial evaluation.
//!
//! A [`Residual`] is a disjunction of [`Clause`]s, each clause a conjunction
//! of [`Expression`]s comparing one unresolved data reference with one known
//! value.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Relational operators the compiler can push down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorKind {
    /// Equality
    Eq,
    /// Inequality
    NotEq,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Substring containment
    Contains,
    /// Regular expression match
    RegexMatch,
}

impl OperatorKind {
    /// All supported operators
    pub const ALL: [OperatorKind; 8] = [
        Self::Eq,
        Self::NotEq,
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::Contains,
        Self::RegexMatch,
    ];

    /// Look up an operator by its policy engine builtin name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "eq" | "equal" => Some(Self::Eq),
            "neq" => Some(Self::NotEq),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "contains" => Some(Self::Contains),
            "re_match" => Some(Self::RegexMatch),
            _ => None,
        }
    }

    /// Canonical builtin name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::NotEq => "neq",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Contains => "contains",
            Self::RegexMatch => "re_match",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bound kind of a range predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeOp {
    /// Strictly below
    Lt,
    /// Below or equal
    Lte,
    /// Strictly above
    Gt,
    /// Above or equal
    Gte,
}

impl RangeOp {
    /// Lowercase name, as used by range query syntaxes
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
        }
    }
}

/// Operator slot of an expression.
///
/// Builtin names are classified once, when the expression is built; names
/// outside [`OperatorKind`] are kept so compilation can report them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    /// Supported operator
    Builtin(OperatorKind),
    /// Anything else the policy engine produced
    Unsupported(String),
}

impl Operator {
    /// Classify a builtin name
    #[must_use]
    pub fn parse(name: &str) -> Self {
        Self::from(name.to_string())
    }

    /// Name as written by the policy engine
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(kind) => kind.name(),
            Self::Unsupported(name) => name,
        }
    }
}

impl From<OperatorKind> for Operator {
    fn from(kind: OperatorKind) -> Self {
        Self::Builtin(kind)
    }
}

impl From<String> for Operator {
    fn from(name: String) -> Self {
        match OperatorKind::from_name(&name) {
            Some(kind) => Self::Builtin(kind),
            None => Self::Unsupported(name),
        }
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        match op {
            Operator::Builtin(kind) => kind.name().to_string(),
            Operator::Unsupported(name) => name,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One side of an expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Operand {
    /// Value known when the policy was evaluated
    #[serde(rename = "const")]
    Constant(Value),
    /// Unresolved data reference, e.g. `data.elastic.posts[_].author`
    #[serde(rename = "ref")]
    Reference(String),
}

impl Operand {
    /// Create a constant operand
    #[must_use]
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::Constant(value.into())
    }

    /// Create a reference operand
    #[must_use]
    pub fn reference(path: impl Into<String>) -> Self {
        Self::Reference(path.into())
    }

    /// Check if this is a reference
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => write!(f, "{}", value),
            Self::Reference(path) => f.write_str(path),
        }
    }
}

/// Relational comparison between a reference and a constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    /// Comparison operator
    pub operator: Operator,
    /// Operands in the order the policy engine emitted them
    pub operands: Vec<Operand>,
}

impl Expression {
    /// Create a new expression
    #[must_use]
    pub fn new(operator: impl Into<Operator>, operands: Vec<Operand>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }

    /// Create a binary expression
    #[must_use]
    pub fn binary(operator: impl Into<Operator>, left: Operand, right: Operand) -> Self {
        Self::new(operator, vec![left, right])
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.operator)?;
        for (i, operand) in self.operands.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", operand)?;
        }
        f.write_str(")")
    }
}

/// Conjunction of expressions. May be empty, which always holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Clause {
    /// Conjoined expressions, in order
    pub expressions: Vec<Expression>,
}

impl Clause {
    /// Create a clause
    #[must_use]
    pub fn new(expressions: Vec<Expression>) -> Self {
        Self { expressions }
    }

    /// Check if the clause has no expressions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// Number of expressions
    #[must_use]
    pub fn len(&self) -> usize {
        self.expressions.len()
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, expr) in self.expressions.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", expr)?;
        }
        Ok(())
    }
}

/// Disjunction of clauses returned by partial evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Residual {
    /// Disjoined clauses, in order
    pub clauses: Vec<Clause>,
}

impl Residual {
    /// Create a residual
    #[must_use]
    pub fn new(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    /// Check if the residual has no clauses
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Number of clauses
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Parse the JSON form of a residual
    ///
    /// # Errors
    ///
    /// Returns error if the text is not a valid residual
    pub fn from_json_str(text: &str) -> crate::CoreResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl fmt::Display for Residual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}

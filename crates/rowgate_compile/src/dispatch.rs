//! Operator dispatch: one relational expression to one predicate leaf.

use crate::builder::{EqualsTerm, NestedScope, QueryBuilder, RangeTerm, RegexTerm, SubstringTerm};
use rowgate_core::{CompileError, CompileResult, FieldPath, Operator, OperatorKind, RangeOp};
use serde_json::Value;

/// Builder invocation for one operator
pub type DispatchFn<B> = fn(&B, &FieldPath, Value) -> <B as QueryBuilder>::Predicate;

/// Maps operators to builder invocations
#[derive(Debug, Clone, Copy, Default)]
pub struct OperatorDispatcher;

impl OperatorDispatcher {
    /// Create a new dispatcher
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Builder invocation for a supported operator
    #[must_use]
    pub fn entry<B: QueryBuilder>(kind: OperatorKind) -> DispatchFn<B> {
        match kind {
            OperatorKind::Eq => equals::<B>,
            OperatorKind::NotEq => not_equals::<B>,
            OperatorKind::Lt => less_than::<B>,
            OperatorKind::Lte => less_or_equal::<B>,
            OperatorKind::Gt => greater_than::<B>,
            OperatorKind::Gte => greater_or_equal::<B>,
            OperatorKind::Contains => contains::<B>,
            OperatorKind::RegexMatch => regex_match::<B>,
        }
    }

    /// Build the predicate leaf for `field <op> value`
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnsupportedOperator`] for operators outside
    /// [`OperatorKind`]
    pub fn dispatch<B: QueryBuilder>(
        &self,
        op: &Operator,
        field: &FieldPath,
        value: Value,
        builder: &B,
    ) -> CompileResult<B::Predicate> {
        match op {
            Operator::Builtin(kind) => Ok(Self::entry::<B>(*kind)(builder, field, value)),
            Operator::Unsupported(name) => Err(CompileError::UnsupportedOperator(name.clone())),
        }
    }
}

fn equals<B: QueryBuilder>(builder: &B, field: &FieldPath, value: Value) -> B::Predicate {
    let leaf = builder.equals(EqualsTerm {
        path: field.segments.clone(),
        value,
    });

    match field.parent() {
        Some(parent) => builder.nested(NestedScope {
            path: parent.to_vec(),
            inner: leaf,
        }),
        None => leaf,
    }
}

// Never nested, even on a sub-document field.
fn not_equals<B: QueryBuilder>(builder: &B, field: &FieldPath, value: Value) -> B::Predicate {
    builder.not(builder.equals(EqualsTerm {
        path: field.segments.clone(),
        value,
    }))
}

fn range<B: QueryBuilder>(
    builder: &B,
    field: &FieldPath,
    op: RangeOp,
    value: Value,
) -> B::Predicate {
    builder.range(RangeTerm {
        path: field.segments.clone(),
        op,
        value,
    })
}

fn less_than<B: QueryBuilder>(builder: &B, field: &FieldPath, value: Value) -> B::Predicate {
    range(builder, field, RangeOp::Lt, value)
}

fn less_or_equal<B: QueryBuilder>(builder: &B, field: &FieldPath, value: Value) -> B::Predicate {
    range(builder, field, RangeOp::Lte, value)
}

fn greater_than<B: QueryBuilder>(builder: &B, field: &FieldPath, value: Value) -> B::Predicate {
    range(builder, field, RangeOp::Gt, value)
}

fn greater_or_equal<B: QueryBuilder>(builder: &B, field: &FieldPath, value: Value) -> B::Predicate {
    range(builder, field, RangeOp::Gte, value)
}

fn contains<B: QueryBuilder>(builder: &B, field: &FieldPath, value: Value) -> B::Predicate {
    builder.substring_match(SubstringTerm {
        path: field.segments.clone(),
        value,
    })
}

fn regex_match<B: QueryBuilder>(builder: &B, field: &FieldPath, value: Value) -> B::Predicate {
    let pattern = match value {
        Value::String(s) => s,
        other => other.to_string(),
    };
    builder.regex_match(RegexTerm {
        path: field.segments.clone(),
        pattern,
    })
}

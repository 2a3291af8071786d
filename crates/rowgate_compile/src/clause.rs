//! Compilation of one clause (a conjunction of expressions).

use crate::builder::QueryBuilder;
use crate::dispatch::OperatorDispatcher;
use rowgate_core::{
    Clause, CompileError, CompileResult, Expression, FieldPath, Operand, PathResolver,
};
use serde_json::Value;

/// Compiles clauses into predicates
#[derive(Debug, Clone, Copy, Default)]
pub struct ClauseCompiler {
    resolver: PathResolver,
    dispatcher: OperatorDispatcher,
}

impl ClauseCompiler {
    /// Create a new clause compiler
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolver: PathResolver::new(),
            dispatcher: OperatorDispatcher::new(),
        }
    }

    /// Compile a clause. A single expression is returned as its own leaf;
    /// anything else becomes an `and` of the leaves in expression order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any expression
    pub fn compile<B: QueryBuilder>(
        &self,
        clause: &Clause,
        builder: &B,
    ) -> CompileResult<B::Predicate> {
        let mut leaves = clause
            .expressions
            .iter()
            .map(|expr| self.compile_expression(expr, builder))
            .collect::<CompileResult<Vec<_>>>()?;

        if leaves.len() == 1 {
            return Ok(leaves.remove(0));
        }

        Ok(builder.and(leaves))
    }

    /// Compile one expression to a predicate leaf
    ///
    /// # Errors
    ///
    /// Returns error if the expression is malformed or its operator is
    /// unsupported
    pub fn compile_expression<B: QueryBuilder>(
        &self,
        expr: &Expression,
        builder: &B,
    ) -> CompileResult<B::Predicate> {
        let (field, value) = self.split_operands(expr)?;
        tracing::trace!(operator = %expr.operator, field = %field, "compiling expression");
        self.dispatcher.dispatch(&expr.operator, &field, value, builder)
    }

    fn split_operands(&self, expr: &Expression) -> CompileResult<(FieldPath, Value)> {
        let [left, right] = expr.operands.as_slice() else {
            return Err(CompileError::TooManyOperands {
                count: expr.operands.len(),
            });
        };

        let (reference, value) = match (left, right) {
            (Operand::Reference(r), Operand::Constant(v))
            | (Operand::Constant(v), Operand::Reference(r)) => (r, v),
            _ => {
                return Err(CompileError::AmbiguousOperands {
                    operator: expr.operator.to_string(),
                });
            }
        };

        Ok((self.resolver.resolve(reference)?, value.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{Predicate, PredicateBuilder};
    use rowgate_core::{OperatorKind, RangeOp};
    use serde_json::json;

    fn author_is_bob() -> Expression {
        Expression::binary(
            OperatorKind::Eq,
            Operand::reference("data.elastic.posts[_].author"),
            Operand::constant("bob"),
        )
    }

    fn clearance_above_nine() -> Expression {
        Expression::binary(
            OperatorKind::Gt,
            Operand::reference("data.elastic.posts[_].clearance"),
            Operand::constant(9),
        )
    }

    fn compile(clause: Clause) -> CompileResult<Predicate> {
        ClauseCompiler::new().compile(&clause, &PredicateBuilder::nested())
    }

    #[test]
    fn test_single_expression_not_wrapped() {
        assert_eq!(
            compile(Clause::new(vec![author_is_bob()])).unwrap(),
            Predicate::Equals {
                path: vec!["author".to_string()],
                value: json!("bob"),
            }
        );
    }

    #[test]
    fn test_two_expressions_and_in_order() {
        assert_eq!(
            compile(Clause::new(vec![author_is_bob(), clearance_above_nine()])).unwrap(),
            Predicate::And(vec![
                Predicate::Equals {
                    path: vec!["author".to_string()],
                    value: json!("bob"),
                },
                Predicate::Range {
                    path: vec!["clearance".to_string()],
                    op: RangeOp::Gt,
                    value: json!(9),
                },
            ])
        );
    }

    #[test]
    fn test_constant_may_come_first() {
        let expr = Expression::binary(
            OperatorKind::RegexMatch,
            Operand::constant("^b"),
            Operand::reference("data.elastic.posts[_].author"),
        );
        assert_eq!(
            compile(Clause::new(vec![expr])).unwrap(),
            Predicate::RegexMatch {
                path: vec!["author".to_string()],
                pattern: "^b".to_string(),
            }
        );
    }

    #[test]
    fn test_sole_not_equal_keeps_not() {
        let expr = Expression::binary(
            OperatorKind::NotEq,
            Operand::reference("data.elastic.posts[_].clearance"),
            Operand::constant(9),
        );
        assert!(matches!(compile(Clause::new(vec![expr])).unwrap(), Predicate::Not(_)));
    }

    #[test]
    fn test_too_many_operands() {
        let expr = Expression::new(
            OperatorKind::Eq,
            vec![
                Operand::reference("data.elastic.posts[_].author"),
                Operand::constant("bob"),
                Operand::constant("alice"),
            ],
        );
        assert_eq!(
            compile(Clause::new(vec![expr])),
            Err(CompileError::TooManyOperands { count: 3 })
        );

        let expr = Expression::new(OperatorKind::Eq, vec![Operand::constant(1)]);
        assert_eq!(
            compile(Clause::new(vec![expr])),
            Err(CompileError::TooManyOperands { count: 1 })
        );
    }

    #[test]
    fn test_ambiguous_operands() {
        let two_constants =
            Expression::binary(OperatorKind::Eq, Operand::constant(1), Operand::constant(1));
        let two_refs = Expression::binary(
            OperatorKind::Eq,
            Operand::reference("data.elastic.posts[_].a"),
            Operand::reference("data.elastic.posts[_].b"),
        );

        for expr in [two_constants, two_refs] {
            assert!(matches!(
                compile(Clause::new(vec![expr])),
                Err(CompileError::AmbiguousOperands { .. })
            ));
        }
    }

    #[test]
    fn test_malformed_reference() {
        let expr = Expression::binary(
            OperatorKind::Eq,
            Operand::reference("data.elastic"),
            Operand::constant("bob"),
        );
        assert_eq!(
            compile(Clause::new(vec![expr])),
            Err(CompileError::MalformedReference("data.elastic".to_string()))
        );
    }

    #[test]
    fn test_unsupported_operator_after_valid_expression() {
        let bad = Expression::binary(
            "add".to_string(),
            Operand::reference("data.elastic.posts[_].a"),
            Operand::constant(1),
        );
        assert_eq!(
            compile(Clause::new(vec![author_is_bob(), bad])),
            Err(CompileError::UnsupportedOperator("add".to_string()))
        );
    }
}

//! Residual compiler: the entry point turning a partial evaluation result
//! into one backend predicate.

use crate::builder::QueryBuilder;
use crate::clause::ClauseCompiler;
use rowgate_core::{CompileResult, Residual};
use serde::{Deserialize, Serialize};

/// Outcome of compiling a residual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationResult<P> {
    /// Whether the policy can hold at all; `false` means always deny
    pub defined: bool,
    /// Filter to apply; `None` on a defined result means no filtering
    pub predicate: Option<P>,
}

impl<P> CompilationResult<P> {
    /// The policy never holds
    #[must_use]
    pub fn deny() -> Self {
        Self {
            defined: false,
            predicate: None,
        }
    }

    /// The policy holds for every document
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            defined: true,
            predicate: None,
        }
    }

    /// The policy holds for documents matching `predicate`
    #[must_use]
    pub fn allow(predicate: P) -> Self {
        Self {
            defined: true,
            predicate: Some(predicate),
        }
    }

    /// Check if the policy holds regardless of the data
    #[must_use]
    pub fn is_unconditional(&self) -> bool {
        self.defined && self.predicate.is_none()
    }

    /// Convert the predicate, keeping the outcome
    #[must_use]
    pub fn map<Q>(self, f: impl FnOnce(P) -> Q) -> CompilationResult<Q> {
        CompilationResult {
            defined: self.defined,
            predicate: self.predicate.map(f),
        }
    }

    /// Restrict a caller's own query by this result.
    ///
    /// Returns `None` when access is denied; `base` alone when nothing needs
    /// filtering; otherwise `and(predicate, base)`.
    #[must_use]
    pub fn restrict<B>(self, base: P, builder: &B) -> Option<P>
    where
        B: QueryBuilder<Predicate = P>,
    {
        if !self.defined {
            return None;
        }

        match self.predicate {
            Some(predicate) => Some(builder.and(vec![predicate, base])),
            None => Some(base),
        }
    }

    /// [`restrict`](Self::restrict) applied to a match-all query
    #[must_use]
    pub fn restrict_all<B>(self, builder: &B) -> Option<P>
    where
        B: QueryBuilder<Predicate = P>,
    {
        let base = builder.match_all();
        self.restrict(base, builder)
    }
}

/// Compiles residuals against one backend.
///
/// Stateless apart from the builder it owns, so a single compiler can
/// serve concurrent requests when the builder is `Sync`.
#[derive(Debug, Clone, Default)]
pub struct ResidualCompiler<B> {
    builder: B,
    clauses: ClauseCompiler,
}

impl<B: QueryBuilder> ResidualCompiler<B> {
    /// Create a compiler emitting predicates through `builder`
    #[must_use]
    pub fn new(builder: B) -> Self {
        Self {
            builder,
            clauses: ClauseCompiler::new(),
        }
    }

    /// Compile a residual.
    ///
    /// No clauses means always deny. Any empty clause means always allow,
    /// and no other clause is compiled. Otherwise a single clause predicate
    /// is returned as is, several are combined with `or` in clause order.
    ///
    /// # Errors
    ///
    /// Returns the first error from any clause; no partial predicate is
    /// produced
    pub fn compile(&self, residual: &Residual) -> CompileResult<CompilationResult<B::Predicate>> {
        tracing::debug!(clauses = residual.len(), residual = %residual, "compiling residual");

        if residual.is_empty() {
            tracing::debug!("residual has no clauses, always deny");
            return Ok(CompilationResult::deny());
        }

        if residual.clauses.iter().any(|clause| clause.is_empty()) {
            tracing::debug!("residual has an empty clause, always allow");
            return Ok(CompilationResult::allow_all());
        }

        let mut predicates = residual
            .clauses
            .iter()
            .map(|clause| self.clauses.compile(clause, &self.builder))
            .collect::<CompileResult<Vec<_>>>()?;

        tracing::debug!(clauses = predicates.len(), "residual compiled to predicate");
        let predicate = if predicates.len() == 1 {
            predicates.remove(0)
        } else {
            self.builder.or(predicates)
        };

        Ok(CompilationResult::allow(predicate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{Predicate, PredicateBuilder};
    use proptest::prelude::*;
    use rowgate_core::{Clause, CompileError, Expression, Operand, OperatorKind, RangeOp};
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

    fn bob() -> Predicate {
        Predicate::Equals {
            path: vec!["author".to_string()],
            value: json!("bob"),
        }
    }

    fn above_nine() -> Predicate {
        Predicate::Range {
            path: vec!["clearance".to_string()],
            op: RangeOp::Gt,
            value: json!(9),
        }
    }

    fn compiler() -> ResidualCompiler<PredicateBuilder> {
        ResidualCompiler::new(PredicateBuilder::nested())
    }

    #[test]
    fn test_no_clauses_denies() {
        let result = compiler().compile(&Residual::default()).unwrap();
        assert_eq!(result, CompilationResult::deny());
        assert!(!result.is_unconditional());
    }

    #[test]
    fn test_empty_clause_allows() {
        let residual = Residual::new(vec![Clause::new(vec![author_is_bob()]), Clause::default()]);
        let result = compiler().compile(&residual).unwrap();
        assert_eq!(result, CompilationResult::allow_all());
        assert!(result.is_unconditional());
    }

    #[test]
    fn test_empty_clause_short_circuits_errors() {
        let broken = Expression::binary(
            "add".to_string(),
            Operand::reference("data.elastic.posts[_].a"),
            Operand::constant(1),
        );
        let residual = Residual::new(vec![Clause::new(vec![broken]), Clause::default()]);
        assert_eq!(compiler().compile(&residual).unwrap(), CompilationResult::allow_all());
    }

    #[test]
    fn test_single_clause_single_expression() {
        let residual = Residual::new(vec![Clause::new(vec![author_is_bob()])]);
        assert_eq!(compiler().compile(&residual).unwrap(), CompilationResult::allow(bob()));
    }

    #[test]
    fn test_single_clause_two_expressions() {
        let residual =
            Residual::new(vec![Clause::new(vec![author_is_bob(), clearance_above_nine()])]);
        assert_eq!(
            compiler().compile(&residual).unwrap(),
            CompilationResult::allow(Predicate::And(vec![bob(), above_nine()]))
        );
    }

    #[test]
    fn test_two_clauses_or() {
        let residual = Residual::new(vec![
            Clause::new(vec![author_is_bob()]),
            Clause::new(vec![clearance_above_nine()]),
        ]);
        assert_eq!(
            compiler().compile(&residual).unwrap(),
            CompilationResult::allow(Predicate::Or(vec![bob(), above_nine()]))
        );
    }

    #[test]
    fn test_error_aborts_whole_residual() {
        let three = Expression::new(
            OperatorKind::Eq,
            vec![Operand::constant(1), Operand::constant(2), Operand::constant(3)],
        );
        let residual = Residual::new(vec![
            Clause::new(vec![author_is_bob()]),
            Clause::new(vec![three]),
        ]);
        assert_eq!(
            compiler().compile(&residual),
            Err(CompileError::TooManyOperands { count: 3 })
        );
    }

    #[test]
    fn test_restrict() {
        let builder = PredicateBuilder::nested();
        let id = Predicate::Equals {
            path: vec!["id".to_string()],
            value: json!("1"),
        };

        assert_eq!(CompilationResult::<Predicate>::deny().restrict(id.clone(), &builder), None);
        assert_eq!(
            CompilationResult::allow_all().restrict(id.clone(), &builder),
            Some(id.clone())
        );
        assert_eq!(
            CompilationResult::allow(bob()).restrict(id.clone(), &builder),
            Some(Predicate::And(vec![bob(), id]))
        );
        assert_eq!(
            CompilationResult::allow_all().restrict_all(&builder),
            Some(Predicate::MatchAll)
        );
    }

    #[test]
    fn test_map() {
        let result = CompilationResult::allow(bob()).map(|p| p.leaf_count());
        assert_eq!(result, CompilationResult::allow(1));
    }

    fn arb_expression() -> impl Strategy<Value = Expression> {
        let fields = prop::sample::select(vec![
            "data.elastic.posts[_].author",
            "data.elastic.posts[_].clearance",
            "data.elastic.posts[_].followers[_].info.first",
        ]);
        let ops = prop::sample::select(OperatorKind::ALL.to_vec());
        let values = prop_oneof![
            any::<i64>().prop_map(|v| json!(v)),
            "[a-z]{0,8}".prop_map(|v| json!(v)),
        ];
        (fields, ops, values, any::<bool>()).prop_map(|(field, op, value, flip)| {
            let reference = Operand::reference(field);
            let constant = Operand::Constant(value);
            if flip {
                Expression::binary(op, constant, reference)
            } else {
                Expression::binary(op, reference, constant)
            }
        })
    }

    fn arb_clause() -> impl Strategy<Value = Clause> {
        prop::collection::vec(arb_expression(), 1..4).prop_map(Clause::new)
    }

    proptest! {
        #[test]
        fn prop_empty_clause_always_allows(
            clauses in prop::collection::vec(arb_clause(), 0..4),
            at in any::<prop::sample::Index>(),
        ) {
            let mut clauses = clauses;
            let position = at.index(clauses.len() + 1);
            clauses.insert(position, Clause::default());

            let result = compiler().compile(&Residual::new(clauses)).unwrap();
            prop_assert_eq!(result, CompilationResult::allow_all());
        }

        #[test]
        fn prop_compile_deterministic(clauses in prop::collection::vec(arb_clause(), 1..4)) {
            let residual = Residual::new(clauses);
            let first = compiler().compile(&residual).unwrap();
            let second = compiler().compile(&residual).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_shape_follows_clause_count(clauses in prop::collection::vec(arb_clause(), 1..5)) {
            let residual = Residual::new(clauses.clone());
            let result = compiler().compile(&residual).unwrap();
            prop_assert!(result.defined);

            let predicate = result.predicate.unwrap();
            let leaves: usize = clauses.iter().map(Clause::len).sum();
            prop_assert_eq!(predicate.leaf_count(), leaves);

            if clauses.len() > 1 {
                prop_assert!(
                    matches!(&predicate, Predicate::Or(items) if items.len() == clauses.len()),
                    "expected or"
                );
            } else {
                prop_assert!(!matches!(predicate, Predicate::Or(_)), "unexpected or");
            }
        }
    }
}

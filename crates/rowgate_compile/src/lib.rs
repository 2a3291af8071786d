//! ROWGATE Compiler
//!
//! Compiles the residual of a partially evaluated authorization policy into
//! a filter the data store executes itself, so row-level authorization is
//! pushed into the query instead of applied to results.
//!
//! ```
//! use rowgate_compile::{PredicateBuilder, ResidualCompiler};
//! use rowgate_core::{Clause, Expression, Operand, OperatorKind, Residual};
//!
//! let residual = Residual::new(vec![Clause::new(vec![Expression::binary(
//!     OperatorKind::Eq,
//!     Operand::reference("data.elastic.posts[_].author"),
//!     Operand::constant("bob"),
//! )])]);
//!
//! let result = ResidualCompiler::new(PredicateBuilder::nested())
//!     .compile(&residual)
//!     .unwrap();
//! assert!(result.defined);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod clause;
pub mod compiler;
pub mod dispatch;
pub mod predicate;

pub use builder::{EqualsTerm, NestedScope, QueryBuilder, RangeTerm, RegexTerm, SubstringTerm};
pub use clause::ClauseCompiler;
pub use compiler::{CompilationResult, ResidualCompiler};
pub use dispatch::{DispatchFn, OperatorDispatcher};
pub use predicate::{Predicate, PredicateBuilder};

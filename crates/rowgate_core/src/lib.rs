//! ROWGATE Core Types
//!
//! Pure types with no I/O: the residual left by partial evaluation of an
//! authorization policy, field path resolution, configuration, and the
//! error taxonomy shared by every compiler stage.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod opa;
pub mod path;
pub mod residual;

// Re-exports
pub use config::PartialEvalConfig;
pub use error::{CompileError, CompileResult, CoreError, CoreResult};
pub use opa::{CompileRequest, CompileResponse, PartialResult};
pub use path::{FieldPath, PathResolver};
pub use residual::{Clause, Expression, Operand, Operator, OperatorKind, RangeOp, Residual};

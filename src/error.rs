use thiserror::Error;

use crate::ast::BinaryOp;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every input to the synthesis engine is produced by the surrounding obfuscation pipeline,
/// never by untrusted external data, so each variant represents a contract violation: an
/// internal defect in the caller or in the engine itself. None of these conditions are
/// transient and none are retried; callers are expected to abort the obfuscation run.
///
/// # Error Categories
///
/// ## Program Construction Errors
/// - [`Error::InvalidAssignmentTarget`] - Assignment to a non-lvalue expression
/// - [`Error::NotAVariable`] - A variable-typed argument was not a variable expression
/// - [`Error::NonInvertibleOperation`] - An operator without an algebraic inverse on the
///   variable-carrying path
///
/// ## Evaluation Errors
/// - [`Error::UnboundVariable`] - A variable had no binding during evaluation
/// - [`Error::UnboundArray`] - An array had no binding during evaluation
/// - [`Error::IndexOutOfBounds`] - An array access outside the bound storage
/// - [`Error::UnnamedArrayBase`] - An array access whose base is not a named variable
/// - [`Error::DivisionByZero`] - Unsigned division with a zero divisor
///
/// # Examples
///
/// ```rust
/// use cipherforge::{ast::{ExecutionState, Expression}, Error};
///
/// let state = ExecutionState::new();
/// match state.evaluate(&Expression::variable("x")) {
///     Err(Error::UnboundVariable(name)) => assert_eq!(name, "x"),
///     other => panic!("expected an unbound variable error, got {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An assignment statement was constructed with a target that cannot hold a value.
    ///
    /// Only variables and array elements are lvalue-capable; literals and operator
    /// expressions are not.
    #[error("assignment target must be a variable or an array element")]
    InvalidAssignmentTarget,

    /// An argument that must be a variable expression was something else.
    ///
    /// The expression-pair generator requires both its free variable and its result
    /// placeholder to be variable expressions; anything else cannot anchor the
    /// inversion walk.
    #[error("expected a variable expression")]
    NotAVariable,

    /// An operator on the variable-carrying path has no algebraic inverse.
    ///
    /// Inversion is defined for addition, subtraction, multiplication by an odd
    /// literal, exclusive-or, bitwise complement, and arithmetic negation. Any other
    /// operator reaching the inversion walk signals a malformed tree.
    #[error("operation `{0}` cannot be inverted")]
    NonInvertibleOperation(BinaryOp),

    /// A variable was read during evaluation without a binding.
    #[error("unbound variable `{0}` during evaluation")]
    UnboundVariable(String),

    /// An array was accessed during evaluation without a binding.
    #[error("unbound array `{0}` during evaluation")]
    UnboundArray(String),

    /// An array element access fell outside the bound storage.
    #[error("array `{array}` index {index} out of bounds")]
    IndexOutOfBounds {
        /// Name of the accessed array.
        array: String,
        /// The offending element index.
        index: u32,
    },

    /// An array access whose base expression is not a named array variable.
    ///
    /// The register-lowering pass only ever produces accesses rooted in a named
    /// array; anything else cannot be resolved against the execution state.
    #[error("array expressions must index a named array variable")]
    UnnamedArrayBase,

    /// Unsigned division with a zero divisor during evaluation.
    #[error("division by zero during evaluation")]
    DivisionByZero,
}

/// Specialized [`Result`](std::result::Result) type for synthesis operations.
pub type Result<T> = std::result::Result<T, Error>;

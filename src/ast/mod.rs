//! Expression and statement model for generated cipher programs.
//!
//! This module defines the abstract syntax the synthesis engine emits: immutable
//! expression trees over a 32-bit register file ([`Expression`], shared through
//! [`ExprRef`]), assignment statements and program blocks ([`Statement`],
//! [`StatementBlock`]), an identity-keyed side-table for attaching metadata to
//! nodes after construction ([`AnnotationMap`]), and a concrete evaluator for
//! verifying program semantics ([`ExecutionState`]).
//!
//! Trees are built bottom-up through constructor functions and never mutated;
//! anything a later stage wants to remember about a node goes into an
//! [`AnnotationMap`] keyed by node identity.

mod annotation;
mod eval;
mod expression;
mod ops;
mod statement;

pub use annotation::AnnotationMap;
pub use eval::ExecutionState;
pub use expression::{ExprRef, Expression, Variable};
pub use ops::{BinaryOp, UnaryOp};
pub use statement::{Statement, StatementBlock};

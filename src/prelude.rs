//! # cipherforge Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and
//! functions of the library. Import this module to get quick access to cipher
//! generation, expression-pair generation, and the evaluator used to verify their
//! output.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cipherforge operations
pub use crate::Error;

/// The result type used throughout cipherforge
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Generates a random invertible cipher over the 16-slot register file
pub use crate::synthesis::generate_cipher_pair;

/// Generates a random expression and its exact symbolic inverse
pub use crate::synthesis::generate_expression_pair;

/// The encryption/decryption program pair
pub use crate::synthesis::CipherPair;

/// The forward/inverse expression pair
pub use crate::synthesis::ExpressionPair;

/// Number of register slots in the cipher state
pub use crate::synthesis::REGISTER_COUNT;

// ================================================================================================
// Program Model
// ================================================================================================

/// Expression trees and storage locations
pub use crate::ast::{Expression, ExprRef, Variable};

/// Operator sets
pub use crate::ast::{BinaryOp, UnaryOp};

/// Statements and program blocks
pub use crate::ast::{Statement, StatementBlock};

/// Identity-keyed metadata side-table
pub use crate::ast::AnnotationMap;

// ================================================================================================
// Evaluation
// ================================================================================================

/// Interpreter environment for generated programs
pub use crate::ast::ExecutionState;

/// Name of the lowered register array
pub use crate::passes::STATE_ARRAY;

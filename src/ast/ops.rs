//! Operator types for expression trees.
//!
//! This module defines [`BinaryOp`] and [`UnaryOp`], the operator sets supported in
//! generated programs. All operators use unsigned 32-bit wraparound semantics; shift
//! amounts are taken modulo 32, matching the CIL arithmetic the emitted programs
//! eventually lower to.
//!
//! Operators are categorized as:
//! - **Arithmetic**: Add, Sub, Mul, Div, Neg
//! - **Bitwise**: And, Or, Xor, Not, Shl, Shr

use std::fmt;

use strum::{EnumCount, EnumIter};

/// A binary operator in an expression tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter)]
pub enum BinaryOp {
    /// Wrapping addition.
    Add,
    /// Wrapping subtraction.
    Sub,
    /// Wrapping multiplication.
    Mul,
    /// Unsigned division.
    Div,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Shift left (amount taken mod 32).
    Shl,
    /// Logical shift right (amount taken mod 32).
    Shr,
}

impl BinaryOp {
    /// Checks if this operator is commutative.
    ///
    /// Commutative operators produce the same result regardless of operand order:
    /// `a op b == b op a`. The normalization pass relies on this to reorder operands
    /// without changing program semantics.
    ///
    /// # Returns
    ///
    /// `true` if the operator is commutative (Add, Mul, And, Or, Xor).
    #[must_use]
    pub const fn is_commutative(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Mul | Self::And | Self::Or | Self::Xor
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "+"),
            Self::Sub => write!(f, "-"),
            Self::Mul => write!(f, "*"),
            Self::Div => write!(f, "/"),
            Self::And => write!(f, "&"),
            Self::Or => write!(f, "|"),
            Self::Xor => write!(f, "^"),
            Self::Shl => write!(f, "<<"),
            Self::Shr => write!(f, ">>"),
        }
    }
}

/// A unary operator in an expression tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter)]
pub enum UnaryOp {
    /// Bitwise complement.
    Not,
    /// Wrapping arithmetic negation.
    Neg,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Not => write!(f, "~"),
            Self::Neg => write!(f, "-"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::{EnumCount as _, IntoEnumIterator};

    #[test]
    fn test_operator_sets_are_closed() {
        assert_eq!(BinaryOp::iter().count(), BinaryOp::COUNT);
        assert_eq!(UnaryOp::COUNT, 2);
        // Exactly the five commutative operators report as such.
        let commutative = BinaryOp::iter().filter(|op| op.is_commutative()).count();
        assert_eq!(commutative, 5);
    }

    #[test]
    fn test_commutativity() {
        assert!(BinaryOp::Add.is_commutative());
        assert!(BinaryOp::Mul.is_commutative());
        assert!(BinaryOp::Xor.is_commutative());
        assert!(BinaryOp::And.is_commutative());
        assert!(BinaryOp::Or.is_commutative());
        assert!(!BinaryOp::Sub.is_commutative());
        assert!(!BinaryOp::Div.is_commutative());
        assert!(!BinaryOp::Shl.is_commutative());
        assert!(!BinaryOp::Shr.is_commutative());
    }

    #[test]
    fn test_display_symbols() {
        assert_eq!(BinaryOp::Shl.to_string(), "<<");
        assert_eq!(BinaryOp::Xor.to_string(), "^");
        assert_eq!(UnaryOp::Not.to_string(), "~");
        assert_eq!(UnaryOp::Neg.to_string(), "-");
    }
}

//! Expression tree representation.
//!
//! This module defines [`Expression`], the immutable-once-built representation of
//! the arithmetic and logical programs this engine generates. Nodes are shared
//! through [`ExprRef`] (a reference-counted pointer), which gives every node a
//! stable identity: the annotation side-table and the memoized variable search in
//! the expression-pair generator both key off that identity instead of mutating
//! nodes after construction.

use std::{fmt, rc::Rc};

use crate::ast::{BinaryOp, UnaryOp};

/// Shared handle to an expression node.
///
/// Cloning an `ExprRef` is cheap and preserves node identity; two clones of the
/// same handle compare equal under [`Rc::ptr_eq`].
pub type ExprRef = Rc<Expression>;

/// A named storage location referenced by expressions.
///
/// Register variables carry the index of their slot in the 16-slot register file;
/// scratch and local variables do not. The register-lowering pass uses the slot to
/// rewrite register variables into array element accesses while leaving scratch
/// storage untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    name: String,
    slot: Option<u8>,
}

impl Variable {
    /// Creates a plain named variable with no register slot.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: None,
        }
    }

    /// Creates the variable bound to a register slot.
    ///
    /// Register variables are named `v{slot}` by convention.
    ///
    /// # Arguments
    ///
    /// * `slot` - The register index, 0-15.
    #[must_use]
    pub fn register(slot: u8) -> Self {
        Self {
            name: format!("v{slot}"),
            slot: Some(slot),
        }
    }

    /// Returns the variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the register slot, or `None` for scratch and local variables.
    #[must_use]
    pub const fn slot(&self) -> Option<u8> {
        self.slot
    }
}

/// An expression over the 32-bit register file.
///
/// Expressions are built bottom-up through the constructor functions and never
/// modified afterwards. All evaluation is unsigned 32-bit wraparound arithmetic;
/// shift amounts are taken mod 32.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// A 32-bit literal constant.
    Literal(u32),

    /// A reference to a named storage location.
    Variable(Variable),

    /// A binary operation.
    Binary {
        /// The operator to apply.
        op: BinaryOp,
        /// The left operand.
        left: ExprRef,
        /// The right operand.
        right: ExprRef,
    },

    /// A unary operation.
    Unary {
        /// The operator to apply.
        op: UnaryOp,
        /// The operand.
        operand: ExprRef,
    },

    /// An array element access with a fixed element index.
    Index {
        /// The array being indexed; always a named array variable in programs
        /// this engine produces.
        array: ExprRef,
        /// The element index.
        index: u32,
    },
}

impl Expression {
    /// Creates a literal constant expression.
    #[must_use]
    pub fn literal(value: u32) -> ExprRef {
        Rc::new(Self::Literal(value))
    }

    /// Creates a plain variable expression with no register slot.
    #[must_use]
    pub fn variable(name: impl Into<String>) -> ExprRef {
        Rc::new(Self::Variable(Variable::named(name)))
    }

    /// Creates the variable expression for a register slot.
    #[must_use]
    pub fn register(slot: u8) -> ExprRef {
        Rc::new(Self::Variable(Variable::register(slot)))
    }

    /// Creates a binary operation expression.
    ///
    /// # Arguments
    ///
    /// * `op` - The binary operator.
    /// * `left` - The left operand.
    /// * `right` - The right operand.
    #[must_use]
    pub fn binary(op: BinaryOp, left: ExprRef, right: ExprRef) -> ExprRef {
        Rc::new(Self::Binary { op, left, right })
    }

    /// Creates a unary operation expression.
    #[must_use]
    pub fn unary(op: UnaryOp, operand: ExprRef) -> ExprRef {
        Rc::new(Self::Unary { op, operand })
    }

    /// Creates an array element access expression.
    #[must_use]
    pub fn index(array: ExprRef, index: u32) -> ExprRef {
        Rc::new(Self::Index { array, index })
    }

    /// Returns the literal value if this is a literal expression.
    #[must_use]
    pub const fn as_literal(&self) -> Option<u32> {
        match self {
            Self::Literal(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the variable if this is a variable expression.
    #[must_use]
    pub const fn as_variable(&self) -> Option<&Variable> {
        match self {
            Self::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    /// Checks if this expression can be the target of an assignment.
    ///
    /// # Returns
    ///
    /// `true` for variables and array element accesses.
    #[must_use]
    pub const fn is_lvalue(&self) -> bool {
        matches!(self, Self::Variable(_) | Self::Index { .. })
    }

    /// Checks if this expression is a leaf (literal or variable).
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Literal(_) | Self::Variable(_))
    }

    /// Returns the depth of the expression tree.
    ///
    /// The depth is the length of the longest path from the root to a leaf.
    /// Literals and variables have depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Literal(_) | Self::Variable(_) => 0,
            Self::Unary { operand, .. } => 1 + operand.depth(),
            Self::Binary { left, right, .. } => 1 + left.depth().max(right.depth()),
            Self::Index { array, .. } => 1 + array.depth(),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value}"),
            Self::Variable(variable) => write!(f, "{}", variable.name()),
            Self::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
            Self::Unary { op, operand } => write!(f, "({op}{operand})"),
            Self::Index { array, index } => write!(f, "{array}[{index}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_variable() {
        let register = Variable::register(7);
        assert_eq!(register.name(), "v7");
        assert_eq!(register.slot(), Some(7));

        let scratch = Variable::named("t0");
        assert_eq!(scratch.slot(), None);
    }

    #[test]
    fn test_lvalue_classification() {
        assert!(Expression::variable("x").is_lvalue());
        assert!(Expression::index(Expression::variable("state"), 3).is_lvalue());
        assert!(!Expression::literal(5).is_lvalue());
        assert!(!Expression::binary(
            BinaryOp::Add,
            Expression::literal(1),
            Expression::literal(2)
        )
        .is_lvalue());
    }

    #[test]
    fn test_depth() {
        let x = Expression::variable("x");
        assert_eq!(x.depth(), 0);

        let sum = Expression::binary(BinaryOp::Add, x.clone(), Expression::literal(3));
        assert_eq!(sum.depth(), 1);

        let negated = Expression::unary(UnaryOp::Neg, sum);
        assert_eq!(negated.depth(), 2);
    }

    #[test]
    fn test_node_identity_through_clones() {
        let x = Expression::variable("x");
        let tree = Expression::binary(BinaryOp::Xor, x.clone(), Expression::literal(1));
        if let Expression::Binary { left, .. } = &*tree {
            assert!(Rc::ptr_eq(left, &x));
        } else {
            panic!("expected a binary node");
        }
    }

    #[test]
    fn test_display() {
        let expr = Expression::binary(
            BinaryOp::Mul,
            Expression::unary(UnaryOp::Not, Expression::variable("x")),
            Expression::literal(3),
        );
        assert_eq!(expr.to_string(), "((~x) * 3)");

        let cell = Expression::index(Expression::variable("state"), 12);
        assert_eq!(cell.to_string(), "state[12]");
    }
}

//! Operand normalization pass.
//!
//! Rewrites commutative binary operators so a lone literal operand always sits
//! on the right:
//!
//! ```text
//! 5 + x  →  x + 5
//! 3 ^ (x * 7)  →  (x * 7) ^ 3
//! ```
//!
//! The code-emission layer keys several instruction selections off the operand
//! shape, so both halves of a cipher pair are brought into the same canonical
//! form before lowering.

use rand::RngCore;

use crate::{
    ast::{Expression, ExprRef, Statement, StatementBlock},
    passes::StatementPass,
    Result,
};

/// Moves literal operands of commutative operators to the right-hand side.
pub struct NormalizePass;

impl StatementPass for NormalizePass {
    fn name(&self) -> &'static str {
        "normalize"
    }

    fn run(&self, block: &mut StatementBlock, _rng: &mut dyn RngCore) -> Result<bool> {
        let mut changed = false;
        let mut rewritten = Vec::with_capacity(block.len());
        for statement in block.statements() {
            let (value, value_changed) = normalize(statement.value());
            if value_changed {
                changed = true;
                rewritten.push(Statement::assign(statement.target().clone(), value)?);
            } else {
                rewritten.push(statement.clone());
            }
        }
        if changed {
            block.replace(rewritten);
        }
        Ok(changed)
    }
}

fn normalize(expression: &ExprRef) -> (ExprRef, bool) {
    match &**expression {
        Expression::Binary { op, left, right } => {
            let (left, left_changed) = normalize(left);
            let (right, right_changed) = normalize(right);

            if op.is_commutative() && left.as_literal().is_some() && right.as_literal().is_none() {
                return (Expression::binary(*op, right, left), true);
            }

            if left_changed || right_changed {
                (Expression::binary(*op, left, right), true)
            } else {
                (expression.clone(), false)
            }
        }
        Expression::Unary { op, operand } => {
            let (operand, operand_changed) = normalize(operand);
            if operand_changed {
                (Expression::unary(*op, operand), true)
            } else {
                (expression.clone(), false)
            }
        }
        _ => (expression.clone(), false),
    }
}

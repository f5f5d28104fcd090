//! Strength reduction pass.
//!
//! Rewrites multiplications by a power-of-two literal into left shifts:
//!
//! ```text
//! x * 8  →  x << 3
//! x * 1  →  x
//! ```
//!
//! Matrix coefficients are the usual source of such multipliers; the keyed
//! multiplies elsewhere in a cipher are odd by construction and pass through
//! untouched.

use rand::RngCore;

use crate::{
    ast::{BinaryOp, Expression, ExprRef, Statement, StatementBlock},
    passes::StatementPass,
    utils::pow2_exponent,
    Result,
};

/// Replaces power-of-two multiplications with shifts.
pub struct StrengthReductionPass;

impl StatementPass for StrengthReductionPass {
    fn name(&self) -> &'static str {
        "strength-reduction"
    }

    fn run(&self, block: &mut StatementBlock, _rng: &mut dyn RngCore) -> Result<bool> {
        let mut changed = false;
        let mut rewritten = Vec::with_capacity(block.len());
        for statement in block.statements() {
            let (value, value_changed) = reduce(statement.value());
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

fn reduce(expression: &ExprRef) -> (ExprRef, bool) {
    match &**expression {
        Expression::Binary { op, left, right } => {
            let (left, left_changed) = reduce(left);
            let (right, right_changed) = reduce(right);

            if *op == BinaryOp::Mul {
                if let Some(reduced) = reduce_multiply(&left, &right) {
                    return (reduced, true);
                }
                if let Some(reduced) = reduce_multiply(&right, &left) {
                    return (reduced, true);
                }
            }

            if left_changed || right_changed {
                (Expression::binary(*op, left, right), true)
            } else {
                (expression.clone(), false)
            }
        }
        Expression::Unary { op, operand } => {
            let (operand, operand_changed) = reduce(operand);
            if operand_changed {
                (Expression::unary(*op, operand), true)
            } else {
                (expression.clone(), false)
            }
        }
        _ => (expression.clone(), false),
    }
}

/// Rewrites `value * literal` when the literal is a power of two.
fn reduce_multiply(value: &ExprRef, literal: &ExprRef) -> Option<ExprRef> {
    let exponent = pow2_exponent(literal.as_literal()?)?;
    if exponent == 0 {
        Some(value.clone())
    } else {
        Some(Expression::binary(
            BinaryOp::Shl,
            value.clone(),
            Expression::literal(exponent),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn run(block: &mut StatementBlock) -> bool {
        let mut rng = StdRng::seed_from_u64(0);
        StrengthReductionPass.run(block, &mut rng).unwrap()
    }

    #[test]
    fn test_power_of_two_becomes_shift() {
        let x = Expression::variable("x");
        let mut block = StatementBlock::new();
        block.push(
            Statement::assign(
                x.clone(),
                Expression::binary(BinaryOp::Mul, x.clone(), Expression::literal(8)),
            )
            .unwrap(),
        );
        assert!(run(&mut block));
        assert_eq!(block.to_string(), "x = (x << 3);\n");
    }

    #[test]
    fn test_literal_on_either_side() {
        let x = Expression::variable("x");
        let mut block = StatementBlock::new();
        block.push(
            Statement::assign(
                x.clone(),
                Expression::binary(BinaryOp::Mul, Expression::literal(4), x.clone()),
            )
            .unwrap(),
        );
        assert!(run(&mut block));
        assert_eq!(block.to_string(), "x = (x << 2);\n");
    }

    #[test]
    fn test_multiply_by_one_collapses() {
        let x = Expression::variable("x");
        let mut block = StatementBlock::new();
        block.push(
            Statement::assign(
                x.clone(),
                Expression::binary(BinaryOp::Mul, x.clone(), Expression::literal(1)),
            )
            .unwrap(),
        );
        assert!(run(&mut block));
        assert_eq!(block.to_string(), "x = x;\n");
    }

    #[test]
    fn test_odd_multiplier_untouched() {
        let x = Expression::variable("x");
        let mut block = StatementBlock::new();
        block.push(
            Statement::assign(
                x.clone(),
                Expression::binary(BinaryOp::Mul, x.clone(), Expression::literal(7)),
            )
            .unwrap(),
        );
        assert!(!run(&mut block));
        assert_eq!(block.to_string(), "x = (x * 7);\n");
    }

    #[test]
    fn test_reduces_nested_operands() {
        let x = Expression::variable("x");
        let y = Expression::variable("y");
        let mut block = StatementBlock::new();
        block.push(
            Statement::assign(
                x.clone(),
                Expression::binary(
                    BinaryOp::Add,
                    Expression::binary(BinaryOp::Mul, x.clone(), Expression::literal(16)),
                    Expression::binary(BinaryOp::Mul, y.clone(), Expression::literal(3)),
                ),
            )
            .unwrap(),
        );
        assert!(run(&mut block));
        assert_eq!(block.to_string(), "x = ((x << 4) + (y * 3));\n");
    }
}

//! Register lowering pass.
//!
//! Rewrites every register variable (`v0`-`v15`) into an element access of the
//! shared `state` array, the concrete storage the code-emission layer wires the
//! cipher's inputs and outputs through:
//!
//! ```text
//! v3 = (v3 ^ v12);  →  state[3] = (state[3] ^ state[12]);
//! ```
//!
//! Scratch (`t{n}`) and expansion (`u{n}`) variables carry no register slot and
//! stay plain locals.

use rand::RngCore;

use crate::{
    ast::{Expression, ExprRef, Statement, StatementBlock},
    passes::StatementPass,
    Result,
};

/// Name of the array holding the 16 register slots after lowering.
pub const STATE_ARRAY: &str = "state";

/// Lowers register variables to `state[i]` array cells.
pub struct LoweringPass;

impl StatementPass for LoweringPass {
    fn name(&self) -> &'static str {
        "lowering"
    }

    fn run(&self, block: &mut StatementBlock, _rng: &mut dyn RngCore) -> Result<bool> {
        let state_array = Expression::variable(STATE_ARRAY);
        let mut changed = false;
        let mut rewritten = Vec::with_capacity(block.len());
        for statement in block.statements() {
            let (target, target_changed) = lower(statement.target(), &state_array);
            let (value, value_changed) = lower(statement.value(), &state_array);
            if target_changed || value_changed {
                changed = true;
                rewritten.push(Statement::assign(target, value)?);
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

fn lower(expression: &ExprRef, state_array: &ExprRef) -> (ExprRef, bool) {
    match &**expression {
        Expression::Variable(variable) => match variable.slot() {
            Some(slot) => (
                Expression::index(state_array.clone(), u32::from(slot)),
                true,
            ),
            None => (expression.clone(), false),
        },
        Expression::Binary { op, left, right } => {
            let (left, left_changed) = lower(left, state_array);
            let (right, right_changed) = lower(right, state_array);
            if left_changed || right_changed {
                (Expression::binary(*op, left, right), true)
            } else {
                (expression.clone(), false)
            }
        }
        Expression::Unary { op, operand } => {
            let (operand, operand_changed) = lower(operand, state_array);
            if operand_changed {
                (Expression::unary(*op, operand), true)
            } else {
                (expression.clone(), false)
            }
        }
        _ => (expression.clone(), false),
    }
}

//! Statement expansion pass.
//!
//! Randomly splits compound assignments into smaller steps through fresh local
//! variables:
//!
//! ```text
//! v0 = (v0 * 3) + (v1 ^ 5);
//!     →
//! u0 = (v0 * 3);
//! u1 = (v1 ^ 5);
//! v0 = u0 + u1;
//! ```
//!
//! Each split is gated by a coin flip and the freshly created assignments are
//! candidates for further splitting, so the statement count of two ciphers with
//! the same element mix still differs. Expansion locals are named `u{n}`,
//! disjoint from register (`v{n}`) and scratch (`t{n}`) variables.

use rand::{Rng, RngCore};

use crate::{
    ast::{Expression, Statement, StatementBlock},
    passes::StatementPass,
    Result,
};

/// Splits compound assignments through fresh local variables.
pub struct ExpansionPass;

impl StatementPass for ExpansionPass {
    fn name(&self) -> &'static str {
        "expansion"
    }

    fn run(&self, block: &mut StatementBlock, rng: &mut dyn RngCore) -> Result<bool> {
        let before = block.len();
        let mut out = Vec::with_capacity(before);
        let mut counter = 0u32;
        for statement in block.statements() {
            expand_into(statement.clone(), &mut out, &mut counter, rng)?;
        }
        let changed = out.len() != before;
        if changed {
            block.replace(out);
        }
        Ok(changed)
    }
}

fn fresh_local(counter: &mut u32) -> crate::ast::ExprRef {
    let local = Expression::variable(format!("u{counter}"));
    *counter += 1;
    local
}

fn expand_into(
    statement: Statement,
    out: &mut Vec<Statement>,
    counter: &mut u32,
    rng: &mut dyn RngCore,
) -> Result<()> {
    match &**statement.value() {
        Expression::Binary { op, left, right } => {
            if !left.is_leaf() && rng.gen_bool(0.5) {
                let local = fresh_local(counter);
                expand_into(Statement::assign(local.clone(), left.clone())?, out, counter, rng)?;
                let rest = Statement::assign(
                    statement.target().clone(),
                    Expression::binary(*op, local, right.clone()),
                )?;
                return expand_into(rest, out, counter, rng);
            }
            if !right.is_leaf() && rng.gen_bool(0.5) {
                let local = fresh_local(counter);
                expand_into(
                    Statement::assign(local.clone(), right.clone())?,
                    out,
                    counter,
                    rng,
                )?;
                let rest = Statement::assign(
                    statement.target().clone(),
                    Expression::binary(*op, left.clone(), local),
                )?;
                return expand_into(rest, out, counter, rng);
            }
        }
        Expression::Unary { op, operand } => {
            if !operand.is_leaf() && rng.gen_bool(0.5) {
                let local = fresh_local(counter);
                expand_into(
                    Statement::assign(local.clone(), operand.clone())?,
                    out,
                    counter,
                    rng,
                )?;
                let rest = Statement::assign(
                    statement.target().clone(),
                    Expression::unary(*op, local),
                )?;
                return expand_into(rest, out, counter, rng);
            }
        }
        _ => {}
    }
    out.push(statement);
    Ok(())
}

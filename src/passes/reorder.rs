//! Statement reordering pass.
//!
//! Shuffles statements without violating data dependencies: a statement may
//! move ahead of another only if neither reads what the other writes and they
//! do not write the same location. The pass computes read/write location sets
//! per statement (variables by name, array cells by array and index), builds
//! the dependence edges, and then emits statements in a random
//! topological order.

use std::collections::HashSet;

use rand::{Rng, RngCore};

use crate::{
    ast::{Expression, Statement, StatementBlock},
    passes::StatementPass,
    Result,
};

/// A storage location read or written by a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Location {
    Variable(String),
    Cell(String, u32),
}

/// Shuffles independent statements while preserving data dependencies.
pub struct ReorderPass;

impl StatementPass for ReorderPass {
    fn name(&self) -> &'static str {
        "reorder"
    }

    fn run(&self, block: &mut StatementBlock, rng: &mut dyn RngCore) -> Result<bool> {
        let statements = block.statements();
        let count = statements.len();
        if count < 2 {
            return Ok(false);
        }

        let reads: Vec<HashSet<Location>> = statements.iter().map(statement_reads).collect();
        let writes: Vec<Location> = statements
            .iter()
            .map(statement_write)
            .collect::<Result<_>>()?;

        // Edge i -> j (i before j) for every RAW, WAR, and WAW conflict.
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut pending: Vec<usize> = vec![0; count];
        for j in 0..count {
            for i in 0..j {
                let raw = reads[j].contains(&writes[i]);
                let war = reads[i].contains(&writes[j]);
                let waw = writes[i] == writes[j];
                if raw || war || waw {
                    successors[i].push(j);
                    pending[j] += 1;
                }
            }
        }

        let mut ready: Vec<usize> = (0..count).filter(|index| pending[*index] == 0).collect();
        let mut order = Vec::with_capacity(count);
        while !ready.is_empty() {
            let pick = rng.gen_range(0..ready.len());
            let index = ready.swap_remove(pick);
            order.push(index);
            for successor in &successors[index] {
                pending[*successor] -= 1;
                if pending[*successor] == 0 {
                    ready.push(*successor);
                }
            }
        }
        debug_assert_eq!(order.len(), count, "dependence graph must be acyclic");

        let changed = order.iter().enumerate().any(|(position, index)| position != *index);
        if changed {
            let reordered = order.iter().map(|index| statements[*index].clone()).collect();
            block.replace(reordered);
        }
        Ok(changed)
    }
}

fn statement_reads(statement: &Statement) -> HashSet<Location> {
    let mut locations = HashSet::new();
    collect_reads(statement.value(), &mut locations);
    // An indexed target reads nothing, but a masked update like `v0 = v0 ^ k`
    // reads through the value expression, which is already collected.
    locations
}

fn collect_reads(expression: &Expression, locations: &mut HashSet<Location>) {
    match expression {
        Expression::Literal(_) => {}
        Expression::Variable(variable) => {
            locations.insert(Location::Variable(variable.name().to_string()));
        }
        Expression::Binary { left, right, .. } => {
            collect_reads(left, locations);
            collect_reads(right, locations);
        }
        Expression::Unary { operand, .. } => collect_reads(operand, locations),
        Expression::Index { array, index } => match array.as_variable() {
            Some(variable) => {
                locations.insert(Location::Cell(variable.name().to_string(), *index));
            }
            None => collect_reads(array, locations),
        },
    }
}

fn statement_write(statement: &Statement) -> Result<Location> {
    match &**statement.target() {
        Expression::Variable(variable) => Ok(Location::Variable(variable.name().to_string())),
        Expression::Index { array, index } => {
            let variable = array
                .as_variable()
                .ok_or(crate::Error::UnnamedArrayBase)?;
            Ok(Location::Cell(variable.name().to_string(), *index))
        }
        _ => Err(crate::Error::InvalidAssignmentTarget),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, ExecutionState};
    use rand::{rngs::StdRng, SeedableRng};

    fn assign(target: &str, value: crate::ast::ExprRef) -> Statement {
        Statement::assign(Expression::variable(target), value).unwrap()
    }

    /// A chain where every statement depends on the previous one must keep its
    /// order under any seed.
    #[test]
    fn test_dependent_chain_keeps_order() {
        let x = Expression::variable("x");
        let mut block = StatementBlock::new();
        block.push(assign(
            "x",
            Expression::binary(BinaryOp::Add, x.clone(), Expression::literal(1)),
        ));
        block.push(assign(
            "x",
            Expression::binary(BinaryOp::Mul, x.clone(), Expression::literal(3)),
        ));
        block.push(assign(
            "x",
            Expression::binary(BinaryOp::Xor, x.clone(), Expression::literal(7)),
        ));
        let original = block.clone();

        for seed in 0..20u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut shuffled = block.clone();
            let changed = ReorderPass.run(&mut shuffled, &mut rng).unwrap();
            assert!(!changed);
            assert_eq!(shuffled, original);
        }
    }

    /// Independent statements can move, and results stay intact.
    #[test]
    fn test_independent_statements_shuffle() {
        let mut block = StatementBlock::new();
        for slot in 0..8u8 {
            let register = Expression::register(slot);
            block.push(
                Statement::assign(
                    register.clone(),
                    Expression::binary(
                        BinaryOp::Add,
                        register.clone(),
                        Expression::literal(u32::from(slot) + 1),
                    ),
                )
                .unwrap(),
            );
        }
        let original = block.clone();

        let mut moved = false;
        for seed in 0..10u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut shuffled = original.clone();
            if ReorderPass.run(&mut shuffled, &mut rng).unwrap() {
                moved = true;
                // Same multiset of statements, different order.
                assert_eq!(shuffled.len(), original.len());
            }

            let mut state = ExecutionState::new();
            for slot in 0..8 {
                state.bind(format!("v{slot}"), 100);
            }
            state.execute_block(&shuffled).unwrap();
            for slot in 0..8u32 {
                assert_eq!(state.get(&format!("v{slot}")), Some(100 + slot + 1));
            }
        }
        assert!(moved, "no seed in 0..10 moved any independent statement");
    }

    /// Array cells with distinct indices are independent; the same cell is not.
    #[test]
    fn test_cell_granularity() {
        let state_array = Expression::variable("state");
        let mut block = StatementBlock::new();
        block.push(
            Statement::assign(
                Expression::index(state_array.clone(), 0),
                Expression::literal(1),
            )
            .unwrap(),
        );
        block.push(
            Statement::assign(
                Expression::index(state_array.clone(), 0),
                Expression::binary(
                    BinaryOp::Add,
                    Expression::index(state_array.clone(), 0),
                    Expression::literal(2),
                ),
            )
            .unwrap(),
        );

        for seed in 0..20u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut shuffled = block.clone();
            assert!(!ReorderPass.run(&mut shuffled, &mut rng).unwrap());

            let mut state = ExecutionState::new();
            state.bind_array("state", vec![0; 1]);
            state.execute_block(&shuffled).unwrap();
            assert_eq!(state.array("state").unwrap()[0], 3);
        }
    }
}

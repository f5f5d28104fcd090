//! Shared functionality which is used in unit-tests across the crate.

use crate::{
    ast::{ExecutionState, StatementBlock},
    synthesis::REGISTER_COUNT,
};

/// Builds an execution state with all 16 register variables bound.
pub(crate) fn state_with_registers(values: &[u32; REGISTER_COUNT]) -> ExecutionState {
    let mut state = ExecutionState::new();
    for (slot, value) in values.iter().enumerate() {
        state.bind(format!("v{slot}"), *value);
    }
    state
}

/// Reads the 16 register variables back out of an execution state.
pub(crate) fn registers_of(state: &ExecutionState) -> [u32; REGISTER_COUNT] {
    std::array::from_fn(|slot| {
        state
            .get(&format!("v{slot}"))
            .expect("register variable must stay bound")
    })
}

/// Executes a block over a register vector in place.
pub(crate) fn run_block(block: &StatementBlock, registers: &mut [u32; REGISTER_COUNT]) {
    let mut state = state_with_registers(registers);
    state
        .execute_block(block)
        .expect("generated block must execute");
    *registers = registers_of(&state);
}

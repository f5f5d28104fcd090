//! Concrete evaluation of expressions and statement blocks.
//!
//! This module provides [`ExecutionState`], an interpreter environment for the
//! programs this engine generates. It exists so that callers (and the test suite)
//! can verify a generated forward/inverse pair by actually running it: bind the
//! register variables or the lowered `state` array, execute the encryption block,
//! execute the decryption block, and compare.
//!
//! Semantics match the target instruction set exactly: all arithmetic is unsigned
//! 32-bit with wraparound, and shift amounts are taken mod 32.

use std::collections::HashMap;

use crate::{
    ast::{BinaryOp, Expression, Statement, StatementBlock, UnaryOp},
    Error, Result,
};

/// Variable and array bindings for evaluating generated programs.
#[derive(Debug, Clone, Default)]
pub struct ExecutionState {
    variables: HashMap<String, u32>,
    arrays: HashMap<String, Vec<u32>>,
}

impl ExecutionState {
    /// Creates an empty execution state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a variable to a value, replacing any previous binding.
    pub fn bind(&mut self, name: impl Into<String>, value: u32) {
        self.variables.insert(name.into(), value);
    }

    /// Returns the value bound to a variable, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u32> {
        self.variables.get(name).copied()
    }

    /// Binds an array to its element storage, replacing any previous binding.
    pub fn bind_array(&mut self, name: impl Into<String>, values: Vec<u32>) {
        self.arrays.insert(name.into(), values);
    }

    /// Returns the element storage bound to an array, if any.
    #[must_use]
    pub fn array(&self, name: &str) -> Option<&[u32]> {
        self.arrays.get(name).map(Vec::as_slice)
    }

    /// Evaluates an expression against the current bindings.
    ///
    /// # Arguments
    ///
    /// * `expression` - The expression to evaluate.
    ///
    /// # Returns
    ///
    /// The 32-bit result, computed with wraparound semantics.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced variable or array is unbound, an array
    /// access is out of bounds or not rooted in a named array, or an unsigned
    /// division divides by zero.
    pub fn evaluate(&self, expression: &Expression) -> Result<u32> {
        match expression {
            Expression::Literal(value) => Ok(*value),
            Expression::Variable(variable) => self
                .get(variable.name())
                .ok_or_else(|| Error::UnboundVariable(variable.name().to_string())),
            Expression::Binary { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                apply_binary(*op, left, right)
            }
            Expression::Unary { op, operand } => {
                let operand = self.evaluate(operand)?;
                Ok(apply_unary(*op, operand))
            }
            Expression::Index { array, index } => {
                let (name, elements) = self.resolve_array(array)?;
                elements
                    .get(*index as usize)
                    .copied()
                    .ok_or_else(|| Error::IndexOutOfBounds {
                        array: name.to_string(),
                        index: *index,
                    })
            }
        }
    }

    /// Executes a single assignment statement, updating the bindings.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation of the value fails or the target refers to
    /// unbound or out-of-bounds storage.
    pub fn execute(&mut self, statement: &Statement) -> Result<()> {
        let value = self.evaluate(statement.value())?;
        match &**statement.target() {
            Expression::Variable(variable) => {
                self.bind(variable.name().to_string(), value);
                Ok(())
            }
            Expression::Index { array, index } => {
                let name = array
                    .as_variable()
                    .ok_or(Error::UnnamedArrayBase)?
                    .name()
                    .to_string();
                let elements = self
                    .arrays
                    .get_mut(&name)
                    .ok_or_else(|| Error::UnboundArray(name.clone()))?;
                let slot = elements
                    .get_mut(*index as usize)
                    .ok_or(Error::IndexOutOfBounds {
                        array: name,
                        index: *index,
                    })?;
                *slot = value;
                Ok(())
            }
            // Statement construction already rejects other targets.
            _ => Err(Error::InvalidAssignmentTarget),
        }
    }

    /// Executes every statement of a block in order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any statement; earlier statements keep
    /// their effects.
    pub fn execute_block(&mut self, block: &StatementBlock) -> Result<()> {
        for statement in block {
            self.execute(statement)?;
        }
        Ok(())
    }

    fn resolve_array<'a, 'b>(
        &'a self,
        array: &'b Expression,
    ) -> Result<(&'b str, &'a [u32])> {
        let variable = array.as_variable().ok_or(Error::UnnamedArrayBase)?;
        let elements = self
            .arrays
            .get(variable.name())
            .ok_or_else(|| Error::UnboundArray(variable.name().to_string()))?;
        Ok((variable.name(), elements))
    }
}

fn apply_binary(op: BinaryOp, left: u32, right: u32) -> Result<u32> {
    match op {
        BinaryOp::Add => Ok(left.wrapping_add(right)),
        BinaryOp::Sub => Ok(left.wrapping_sub(right)),
        BinaryOp::Mul => Ok(left.wrapping_mul(right)),
        BinaryOp::Div => left.checked_div(right).ok_or(Error::DivisionByZero),
        BinaryOp::And => Ok(left & right),
        BinaryOp::Or => Ok(left | right),
        BinaryOp::Xor => Ok(left ^ right),
        // wrapping_shl/shr mask the amount to 0..32
        BinaryOp::Shl => Ok(left.wrapping_shl(right)),
        BinaryOp::Shr => Ok(left.wrapping_shr(right)),
    }
}

fn apply_unary(op: UnaryOp, operand: u32) -> u32 {
    match op {
        UnaryOp::Not => !operand,
        UnaryOp::Neg => operand.wrapping_neg(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraparound_arithmetic() {
        let state = ExecutionState::new();
        let sum = Expression::binary(
            BinaryOp::Add,
            Expression::literal(u32::MAX),
            Expression::literal(2),
        );
        assert_eq!(state.evaluate(&sum).unwrap(), 1);

        let product = Expression::binary(
            BinaryOp::Mul,
            Expression::literal(0x8000_0001),
            Expression::literal(2),
        );
        assert_eq!(state.evaluate(&product).unwrap(), 2);

        let negated = Expression::unary(UnaryOp::Neg, Expression::literal(1));
        assert_eq!(state.evaluate(&negated).unwrap(), u32::MAX);
    }

    #[test]
    fn test_shift_amount_mod_32() {
        let state = ExecutionState::new();
        let shifted = Expression::binary(
            BinaryOp::Shl,
            Expression::literal(1),
            Expression::literal(33),
        );
        assert_eq!(state.evaluate(&shifted).unwrap(), 2);

        let shifted = Expression::binary(
            BinaryOp::Shr,
            Expression::literal(0x8000_0000),
            Expression::literal(63),
        );
        assert_eq!(state.evaluate(&shifted).unwrap(), 1);
    }

    #[test]
    fn test_division() {
        let state = ExecutionState::new();
        let quotient = Expression::binary(
            BinaryOp::Div,
            Expression::literal(10),
            Expression::literal(3),
        );
        assert_eq!(state.evaluate(&quotient).unwrap(), 3);

        let by_zero = Expression::binary(
            BinaryOp::Div,
            Expression::literal(10),
            Expression::literal(0),
        );
        assert!(matches!(
            state.evaluate(&by_zero),
            Err(Error::DivisionByZero)
        ));
    }

    #[test]
    fn test_variable_and_array_bindings() {
        let mut state = ExecutionState::new();
        state.bind("x", 7);
        state.bind_array("state", vec![10, 20, 30]);

        let x = Expression::variable("x");
        assert_eq!(state.evaluate(&x).unwrap(), 7);

        let cell = Expression::index(Expression::variable("state"), 1);
        assert_eq!(state.evaluate(&cell).unwrap(), 20);

        let missing = Expression::index(Expression::variable("state"), 9);
        assert!(matches!(
            state.evaluate(&missing),
            Err(Error::IndexOutOfBounds { index: 9, .. })
        ));

        let unbound = Expression::variable("y");
        assert!(matches!(
            state.evaluate(&unbound),
            Err(Error::UnboundVariable(_))
        ));
    }

    #[test]
    fn test_execute_assignments() {
        let mut state = ExecutionState::new();
        state.bind("x", 1);
        state.bind_array("state", vec![0; 4]);

        let x = Expression::variable("x");
        let double = Statement::assign(
            x.clone(),
            Expression::binary(BinaryOp::Shl, x.clone(), Expression::literal(1)),
        )
        .unwrap();
        let store = Statement::assign(
            Expression::index(Expression::variable("state"), 2),
            x.clone(),
        )
        .unwrap();

        let mut block = StatementBlock::new();
        block.push(double);
        block.push(store);
        state.execute_block(&block).unwrap();

        assert_eq!(state.get("x"), Some(2));
        assert_eq!(state.array("state").unwrap()[2], 2);
    }
}

//! Generation context mediating cipher elements and the statement stream.
//!
//! A [`CipherGenContext`] owns the 16 register variables of the cipher state, a
//! LIFO pool of scoped scratch variables, and the statement block under
//! construction. Every element writes its forward or inverse code through one
//! context; the orchestrator uses a fresh context per program so the two halves
//! of a cipher pair never share mutable state.

use crate::{
    ast::{Expression, ExprRef, Statement, StatementBlock},
    Result,
};

/// Number of register slots in the cipher state.
pub const REGISTER_COUNT: usize = 16;

/// Owns the register file, scratch-variable pool, and statement stream for one
/// generated program.
#[derive(Debug)]
pub struct CipherGenContext {
    registers: Vec<ExprRef>,
    pool: Vec<ExprRef>,
    next_temp: u32,
    live_temps: usize,
    temp_watermark: usize,
    statements: Vec<Statement>,
}

impl Default for CipherGenContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CipherGenContext {
    /// Creates a context with an empty statement stream and all 16 register
    /// variables prebuilt.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // REGISTER_COUNT is 16
    pub fn new() -> Self {
        Self {
            registers: (0..REGISTER_COUNT)
                .map(|slot| Expression::register(slot as u8))
                .collect(),
            pool: Vec::new(),
            next_temp: 0,
            live_temps: 0,
            temp_watermark: 0,
            statements: Vec::new(),
        }
    }

    /// Returns the variable expression bound to a register slot.
    ///
    /// The same handle is returned for every call with the same index, so all
    /// references to one register share node identity.
    ///
    /// # Arguments
    ///
    /// * `index` - The register slot, 0-15.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the register file; passing one is a defect
    /// in the calling element, not a recoverable condition.
    #[must_use]
    pub fn data_expression(&self, index: usize) -> ExprRef {
        assert!(
            index < REGISTER_COUNT,
            "register index {index} outside the {REGISTER_COUNT}-slot register file"
        );
        self.registers[index].clone()
    }

    /// Runs a closure with one scoped scratch variable.
    ///
    /// The variable is taken from the LIFO pool (or freshly created) and returned
    /// to the pool after the closure finishes, on success and error paths alike.
    /// The closure must not stash the handle for use after it returns; a released
    /// variable may be handed to the next caller.
    pub fn with_temp<T>(&mut self, f: impl FnOnce(&mut Self, &ExprRef) -> T) -> T {
        let temp = self.acquire_temp();
        let result = f(self, &temp);
        self.release_temp(temp);
        result
    }

    /// Runs a closure with several simultaneously live scratch variables.
    ///
    /// Acquisition and release follow the same LIFO discipline as
    /// [`with_temp`](Self::with_temp); the variables are released in reverse
    /// acquisition order after the closure finishes.
    pub fn with_temps<T>(
        &mut self,
        count: usize,
        f: impl FnOnce(&mut Self, &[ExprRef]) -> T,
    ) -> T {
        let temps: Vec<ExprRef> = (0..count).map(|_| self.acquire_temp()).collect();
        let result = f(self, &temps);
        for temp in temps.into_iter().rev() {
            self.release_temp(temp);
        }
        result
    }

    /// Appends a statement to the program under construction.
    ///
    /// Returns the context for chaining.
    pub fn emit(&mut self, statement: Statement) -> &mut Self {
        self.statements.push(statement);
        self
    }

    /// Convenience for the pervasive `target = value` emission.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidAssignmentTarget`] if `target` is not
    /// lvalue-capable.
    pub fn emit_assign(&mut self, target: ExprRef, value: ExprRef) -> Result<&mut Self> {
        let statement = Statement::assign(target, value)?;
        Ok(self.emit(statement))
    }

    /// Returns the statements emitted so far, in order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Consumes the context and returns the finished statement block.
    #[must_use]
    pub fn into_block(self) -> StatementBlock {
        StatementBlock::from(self.statements)
    }

    /// High-water mark of simultaneously live scratch variables.
    ///
    /// Also the number of distinct scratch variables ever created: the LIFO pool
    /// reuses a released variable before creating a new one.
    #[must_use]
    pub const fn temp_watermark(&self) -> usize {
        self.temp_watermark
    }

    fn acquire_temp(&mut self) -> ExprRef {
        self.live_temps += 1;
        self.temp_watermark = self.temp_watermark.max(self.live_temps);
        self.pool.pop().unwrap_or_else(|| {
            let temp = Expression::variable(format!("t{}", self.next_temp));
            self.next_temp += 1;
            temp
        })
    }

    fn release_temp(&mut self, temp: ExprRef) {
        self.live_temps -= 1;
        self.pool.push(temp);
    }
}

//! Per-register key addition.

use rand::Rng;

use crate::{
    ast::{BinaryOp, Expression},
    synthesis::CipherGenContext,
    Result,
};

/// Symmetric key addition over a single register slot.
///
/// One of these is instantiated for every register, pinned to its slot at
/// construction, so each of the 16 slots is guaranteed to pass through at least
/// one transform even when the randomized slot assignment leaves it out of every
/// other element.
#[derive(Debug, Clone)]
pub struct AddKeyElement {
    data: [u8; 1],
    key: u32,
}

impl AddKeyElement {
    /// Creates the element pinned to a register slot.
    #[must_use]
    pub(crate) fn new(register: u8) -> Self {
        Self {
            data: [register],
            key: 0,
        }
    }

    /// Builds an element with a fixed slot and key. Used by tests.
    #[must_use]
    pub fn with_key(register: u8, key: u32) -> Self {
        Self {
            data: [register],
            key,
        }
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    /// Draws the key.
    pub fn initialize<R: Rng>(&mut self, rng: &mut R) {
        self.key = rng.gen();
    }

    /// Appends the forward transform (`v = v + k`) to the context.
    ///
    /// # Errors
    ///
    /// Propagates statement-construction failures from the context.
    pub fn emit(&self, ctx: &mut CipherGenContext) -> Result<()> {
        let v = ctx.data_expression(self.data[0] as usize);
        let value = Expression::binary(BinaryOp::Add, v.clone(), Expression::literal(self.key));
        ctx.emit_assign(v, value)?;
        Ok(())
    }

    /// Appends the inverse transform (`v = v - k`) to the context.
    ///
    /// # Errors
    ///
    /// Propagates statement-construction failures from the context.
    pub fn emit_inverse(&self, ctx: &mut CipherGenContext) -> Result<()> {
        let v = ctx.data_expression(self.data[0] as usize);
        let value = Expression::binary(BinaryOp::Sub, v.clone(), Expression::literal(self.key));
        ctx.emit_assign(v, value)?;
        Ok(())
    }
}

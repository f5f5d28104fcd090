//! Single-register keyed arithmetic transform.

use rand::Rng;
use strum::{EnumCount, EnumIter};

use crate::{
    ast::{BinaryOp, Expression, UnaryOp},
    synthesis::CipherGenContext,
    utils::mod_inv32,
    Result,
};

/// Operation variants of a [`NumOpElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter)]
pub enum NumOpKind {
    /// Wrapping key addition; reversed by subtracting the same key.
    Add,
    /// Key XOR; its own reverse.
    Xor,
    /// Multiplication by an odd key; reversed by the key's inverse mod `2^32`.
    Mul,
    /// Complemented XOR: `v = ~(v ^ k)`; reversed by `v = v ^ ~k`.
    Xnor,
}

/// Keyed arithmetic transform over a single register slot.
#[derive(Debug, Clone)]
pub struct NumOpElement {
    data: [u8; 1],
    op: NumOpKind,
    key: u32,
    inverse_key: u32,
}

impl NumOpElement {
    /// Creates an uninitialized element; the orchestrator assigns its slot and
    /// then draws its operation and keys through [`initialize`](Self::initialize).
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            data: [0],
            op: NumOpKind::Add,
            key: 0,
            inverse_key: 0,
        }
    }

    /// Builds an element with a fixed operation and key, deriving the matching
    /// inverse key. Used by tests that need deterministic keys.
    #[must_use]
    pub fn with_key(op: NumOpKind, key: u32) -> Self {
        let mut element = Self::new();
        element.op = op;
        element.set_keys(key);
        element
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn set_data(&mut self, slots: &[u8]) {
        self.data.copy_from_slice(slots);
    }

    /// Draws the operation variant and key material.
    pub fn initialize<R: Rng>(&mut self, rng: &mut R) {
        self.op = match rng.gen_range(0..4) {
            0 => NumOpKind::Add,
            1 => NumOpKind::Xor,
            2 => NumOpKind::Mul,
            _ => NumOpKind::Xnor,
        };
        let key = match self.op {
            NumOpKind::Mul => rng.gen::<u32>() | 1,
            _ => rng.gen::<u32>(),
        };
        self.set_keys(key);
    }

    fn set_keys(&mut self, key: u32) {
        self.key = key;
        self.inverse_key = match self.op {
            NumOpKind::Add | NumOpKind::Xor => key,
            NumOpKind::Mul => mod_inv32(key),
            NumOpKind::Xnor => !key,
        };
    }

    /// Appends the forward transform to the context.
    ///
    /// # Errors
    ///
    /// Propagates statement-construction failures from the context.
    pub fn emit(&self, ctx: &mut CipherGenContext) -> Result<()> {
        let v = ctx.data_expression(self.data[0] as usize);
        let key = Expression::literal(self.key);
        let value = match self.op {
            NumOpKind::Add => Expression::binary(BinaryOp::Add, v.clone(), key),
            NumOpKind::Xor => Expression::binary(BinaryOp::Xor, v.clone(), key),
            NumOpKind::Mul => Expression::binary(BinaryOp::Mul, v.clone(), key),
            NumOpKind::Xnor => Expression::unary(
                UnaryOp::Not,
                Expression::binary(BinaryOp::Xor, v.clone(), key),
            ),
        };
        ctx.emit_assign(v, value)?;
        Ok(())
    }

    /// Appends the inverse transform to the context.
    ///
    /// # Errors
    ///
    /// Propagates statement-construction failures from the context.
    pub fn emit_inverse(&self, ctx: &mut CipherGenContext) -> Result<()> {
        let v = ctx.data_expression(self.data[0] as usize);
        let key = Expression::literal(self.inverse_key);
        let value = match self.op {
            NumOpKind::Add => Expression::binary(BinaryOp::Sub, v.clone(), key),
            // `~(a ^ b) == a ^ ~b`, so the complemented key folds the NOT away.
            NumOpKind::Xor | NumOpKind::Xnor => Expression::binary(BinaryOp::Xor, v.clone(), key),
            NumOpKind::Mul => Expression::binary(BinaryOp::Mul, v.clone(), key),
        };
        ctx.emit_assign(v, value)?;
        Ok(())
    }
}

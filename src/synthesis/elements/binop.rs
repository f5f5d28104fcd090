//! Two-register combining transform.

use rand::Rng;
use strum::{EnumCount, EnumIter};

use crate::{
    ast::{BinaryOp, Expression, UnaryOp},
    synthesis::CipherGenContext,
    Result,
};

/// Operation variants of a [`BinOpElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter)]
pub enum BinOpKind {
    /// `a = a + b`; reversed by `a = a - b`.
    Add,
    /// `a = a ^ b`; its own reverse.
    Xor,
    /// `a = ~(a ^ b)`; reversed by `a = a ^ ~b`.
    Xnor,
}

/// Transform combining two register slots, mutating the first.
///
/// The second slot is read but never written, which is what makes the inverse a
/// pure local undo: at inversion time `b` still holds the value the forward pass
/// combined into `a`.
#[derive(Debug, Clone)]
pub struct BinOpElement {
    data: [u8; 2],
    op: BinOpKind,
}

impl BinOpElement {
    /// Creates an uninitialized element.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            data: [0, 1],
            op: BinOpKind::Add,
        }
    }

    /// Builds an element with a fixed operation. Used by tests.
    #[must_use]
    pub fn with_op(op: BinOpKind) -> Self {
        let mut element = Self::new();
        element.op = op;
        element
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn set_data(&mut self, slots: &[u8]) {
        self.data.copy_from_slice(slots);
    }

    /// Draws the operation variant.
    pub fn initialize<R: Rng>(&mut self, rng: &mut R) {
        self.op = match rng.gen_range(0..3) {
            0 => BinOpKind::Add,
            1 => BinOpKind::Xor,
            _ => BinOpKind::Xnor,
        };
    }

    /// Appends the forward transform to the context.
    ///
    /// # Errors
    ///
    /// Propagates statement-construction failures from the context.
    pub fn emit(&self, ctx: &mut CipherGenContext) -> Result<()> {
        let a = ctx.data_expression(self.data[0] as usize);
        let b = ctx.data_expression(self.data[1] as usize);
        let value = match self.op {
            BinOpKind::Add => Expression::binary(BinaryOp::Add, a.clone(), b),
            BinOpKind::Xor => Expression::binary(BinaryOp::Xor, a.clone(), b),
            BinOpKind::Xnor => Expression::unary(
                UnaryOp::Not,
                Expression::binary(BinaryOp::Xor, a.clone(), b),
            ),
        };
        ctx.emit_assign(a, value)?;
        Ok(())
    }

    /// Appends the inverse transform to the context.
    ///
    /// # Errors
    ///
    /// Propagates statement-construction failures from the context.
    pub fn emit_inverse(&self, ctx: &mut CipherGenContext) -> Result<()> {
        let a = ctx.data_expression(self.data[0] as usize);
        let b = ctx.data_expression(self.data[1] as usize);
        let value = match self.op {
            BinOpKind::Add => Expression::binary(BinaryOp::Sub, a.clone(), b),
            BinOpKind::Xor => Expression::binary(BinaryOp::Xor, a.clone(), b),
            BinOpKind::Xnor => Expression::binary(
                BinaryOp::Xor,
                a.clone(),
                Expression::unary(UnaryOp::Not, b),
            ),
        };
        ctx.emit_assign(a, value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::run_block;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use strum::IntoEnumIterator;

    #[test]
    fn test_fixed_op_roundtrip_per_kind() {
        let initial: [u32; 16] = std::array::from_fn(|slot| 0x9E37_79B9u32.wrapping_mul(slot as u32 + 1));
        for kind in BinOpKind::iter() {
            let mut element = BinOpElement::with_op(kind);
            element.set_data(&[4, 11]);

            let mut forward = CipherGenContext::new();
            element.emit(&mut forward).unwrap();
            let mut inverse = CipherGenContext::new();
            element.emit_inverse(&mut inverse).unwrap();

            let mut registers = initial;
            run_block(&forward.into_block(), &mut registers);
            assert_eq!(registers[11], initial[11], "operand slot must stay intact");
            run_block(&inverse.into_block(), &mut registers);
            assert_eq!(registers, initial, "roundtrip failed for {kind:?}");
        }
    }

    #[test]
    fn test_random_roundtrip() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let mut element = BinOpElement::new();
            let a = rng.gen_range(0..16u8);
            let b = (a + rng.gen_range(1..16u8)) % 16;
            element.set_data(&[a, b]);
            element.initialize(&mut rng);

            let mut forward = CipherGenContext::new();
            element.emit(&mut forward).unwrap();
            let mut inverse = CipherGenContext::new();
            element.emit_inverse(&mut inverse).unwrap();

            let initial: [u32; 16] = std::array::from_fn(|_| rng.gen());
            let mut registers = initial;
            run_block(&forward.into_block(), &mut registers);
            run_block(&inverse.into_block(), &mut registers);
            assert_eq!(registers, initial);
        }
    }
}

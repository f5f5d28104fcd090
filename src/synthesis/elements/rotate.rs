//! Single-register keyed bit rotation.

use rand::Rng;

use crate::{
    ast::{BinaryOp, Expression, ExprRef},
    synthesis::CipherGenContext,
    Result,
};

/// Keyed bit rotation over a single register slot.
///
/// The rotation amount is drawn from `1..=31`; the inverse rotates by the
/// complementary amount, so both directions emit the same shift-and-or shape.
#[derive(Debug, Clone)]
pub struct RotateElement {
    data: [u8; 1],
    key: u32,
}

impl RotateElement {
    /// Creates an uninitialized element.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self { data: [0], key: 1 }
    }

    /// Builds an element with a fixed rotation amount. Used by tests.
    ///
    /// # Panics
    ///
    /// Panics if `key` is outside `1..=31`.
    #[must_use]
    pub fn with_key(key: u32) -> Self {
        assert!((1..32).contains(&key), "rotation amount must be in 1..=31");
        Self { data: [0], key }
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn set_data(&mut self, slots: &[u8]) {
        self.data.copy_from_slice(slots);
    }

    /// Draws the rotation amount.
    pub fn initialize<R: Rng>(&mut self, rng: &mut R) {
        self.key = rng.gen_range(1..32);
    }

    fn emit_rotation(ctx: &mut CipherGenContext, v: &ExprRef, amount: u32) -> Result<()> {
        let rotated = Expression::binary(
            BinaryOp::Or,
            Expression::binary(BinaryOp::Shl, v.clone(), Expression::literal(amount)),
            Expression::binary(BinaryOp::Shr, v.clone(), Expression::literal(32 - amount)),
        );
        ctx.emit_assign(v.clone(), rotated)?;
        Ok(())
    }

    /// Appends the forward rotation to the context.
    ///
    /// # Errors
    ///
    /// Propagates statement-construction failures from the context.
    pub fn emit(&self, ctx: &mut CipherGenContext) -> Result<()> {
        let v = ctx.data_expression(self.data[0] as usize);
        Self::emit_rotation(ctx, &v, self.key)
    }

    /// Appends the complementary rotation to the context.
    ///
    /// # Errors
    ///
    /// Propagates statement-construction failures from the context.
    pub fn emit_inverse(&self, ctx: &mut CipherGenContext) -> Result<()> {
        let v = ctx.data_expression(self.data[0] as usize);
        Self::emit_rotation(ctx, &v, 32 - self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::run_block;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_matches_native_rotation() {
        for key in 1..32u32 {
            let mut element = RotateElement::with_key(key);
            element.set_data(&[5]);
            let mut ctx = CipherGenContext::new();
            element.emit(&mut ctx).unwrap();

            let initial: [u32; 16] = std::array::from_fn(|_| 0xDEAD_BEEF);
            let mut registers = initial;
            run_block(&ctx.into_block(), &mut registers);
            assert_eq!(registers[5], 0xDEAD_BEEFu32.rotate_left(key));
        }
    }

    #[test]
    fn test_random_roundtrip() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let mut element = RotateElement::new();
            element.set_data(&[rng.gen_range(0..16)]);
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

//! Two-register masked exchange.

use rand::Rng;

use crate::{
    ast::{BinaryOp, Expression},
    synthesis::CipherGenContext,
    utils::mod_inv32,
    Result,
};

/// Masked exchange of two register slots, disguised as multiplicative
/// re-encoding.
///
/// With probability 1/3 the mask covers the full word and the element performs a
/// slot swap routed through an odd multiplier and its inverse; otherwise only the
/// masked bits are exchanged, with the exchanged difference pushed through the
/// same multiplier pair. Both shapes are involutions, so the forward and inverse
/// emissions are identical statement sequences.
#[derive(Debug, Clone)]
pub struct SwapElement {
    data: [u8; 2],
    mask: u32,
    key: u32,
    inverse_key: u32,
}

impl SwapElement {
    /// Creates an uninitialized element.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            data: [0, 1],
            mask: u32::MAX,
            key: 1,
            inverse_key: 1,
        }
    }

    /// Builds an element with a fixed mask and odd multiplier key. Used by tests.
    ///
    /// # Panics
    ///
    /// Panics if `key` is even.
    #[must_use]
    pub fn with_key(mask: u32, key: u32) -> Self {
        assert!(key & 1 == 1, "swap multiplier must be odd for invertibility");
        Self {
            data: [0, 1],
            mask,
            key,
            inverse_key: mod_inv32(key),
        }
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn set_data(&mut self, slots: &[u8]) {
        self.data.copy_from_slice(slots);
    }

    /// Draws the bit mask and the multiplier pair.
    pub fn initialize<R: Rng>(&mut self, rng: &mut R) {
        self.mask = if rng.gen_range(0..3) == 0 {
            u32::MAX
        } else {
            rng.gen()
        };
        self.key = rng.gen::<u32>() | 1;
        self.inverse_key = mod_inv32(self.key);
    }

    fn emit_exchange(&self, ctx: &mut CipherGenContext) -> Result<()> {
        let a = ctx.data_expression(self.data[0] as usize);
        let b = ctx.data_expression(self.data[1] as usize);
        let key = Expression::literal(self.key);
        let inverse_key = Expression::literal(self.inverse_key);

        if self.mask == u32::MAX {
            // tmp = a * k; a = b; b = tmp * k^-1
            ctx.with_temp(|ctx, tmp| -> Result<()> {
                ctx.emit_assign(
                    tmp.clone(),
                    Expression::binary(BinaryOp::Mul, a.clone(), key),
                )?;
                ctx.emit_assign(a.clone(), b.clone())?;
                ctx.emit_assign(
                    b.clone(),
                    Expression::binary(BinaryOp::Mul, tmp.clone(), inverse_key),
                )?;
                Ok(())
            })
        } else {
            // tmp = ((a ^ b) & mask) * k; a ^= tmp * k^-1; b ^= tmp * k^-1
            ctx.with_temp(|ctx, tmp| -> Result<()> {
                let difference = Expression::binary(
                    BinaryOp::And,
                    Expression::binary(BinaryOp::Xor, a.clone(), b.clone()),
                    Expression::literal(self.mask),
                );
                ctx.emit_assign(
                    tmp.clone(),
                    Expression::binary(BinaryOp::Mul, difference, key),
                )?;
                let decoded = Expression::binary(BinaryOp::Mul, tmp.clone(), inverse_key);
                ctx.emit_assign(
                    a.clone(),
                    Expression::binary(BinaryOp::Xor, a.clone(), decoded.clone()),
                )?;
                ctx.emit_assign(
                    b.clone(),
                    Expression::binary(BinaryOp::Xor, b.clone(), decoded),
                )?;
                Ok(())
            })
        }
    }

    /// Appends the exchange to the context.
    ///
    /// # Errors
    ///
    /// Propagates statement-construction failures from the context.
    pub fn emit(&self, ctx: &mut CipherGenContext) -> Result<()> {
        self.emit_exchange(ctx)
    }

    /// Appends the exchange to the context; identical to [`emit`](Self::emit)
    /// because the exchange is an involution.
    ///
    /// # Errors
    ///
    /// Propagates statement-construction failures from the context.
    pub fn emit_inverse(&self, ctx: &mut CipherGenContext) -> Result<()> {
        self.emit_exchange(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::run_block;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_full_mask_swaps_slots() {
        let mut element = SwapElement::with_key(u32::MAX, 0x1234_5677);
        element.set_data(&[2, 7]);
        let mut ctx = CipherGenContext::new();
        element.emit(&mut ctx).unwrap();

        let initial: [u32; 16] = std::array::from_fn(|slot| slot as u32 * 1000);
        let mut registers = initial;
        run_block(&ctx.into_block(), &mut registers);
        assert_eq!(registers[2], initial[7]);
        assert_eq!(registers[7], initial[2]);
        for slot in (0..16).filter(|slot| *slot != 2 && *slot != 7) {
            assert_eq!(registers[slot], initial[slot]);
        }
    }

    #[test]
    fn test_partial_mask_exchanges_masked_bits() {
        let mask = 0x0000_FFFF;
        let mut element = SwapElement::with_key(mask, 0xABCD_EF01);
        element.set_data(&[0, 1]);
        let mut ctx = CipherGenContext::new();
        element.emit(&mut ctx).unwrap();

        let mut registers = [0u32; 16];
        registers[0] = 0xAAAA_1111;
        registers[1] = 0xBBBB_2222;
        run_block(&ctx.into_block(), &mut registers);
        assert_eq!(registers[0], 0xAAAA_2222);
        assert_eq!(registers[1], 0xBBBB_1111);
    }

    #[test]
    fn test_emit_and_inverse_are_identical() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..50 {
            let mut element = SwapElement::new();
            element.set_data(&[3, 12]);
            element.initialize(&mut rng);

            let mut forward = CipherGenContext::new();
            element.emit(&mut forward).unwrap();
            let mut inverse = CipherGenContext::new();
            element.emit_inverse(&mut inverse).unwrap();
            assert_eq!(forward.into_block(), inverse.into_block());
        }
    }

    #[test]
    fn test_random_involution() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let mut element = SwapElement::new();
            let a = rng.gen_range(0..16u8);
            let b = (a + rng.gen_range(1..16u8)) % 16;
            element.set_data(&[a, b]);
            element.initialize(&mut rng);

            let mut ctx = CipherGenContext::new();
            element.emit(&mut ctx).unwrap();
            let block = ctx.into_block();

            let initial: [u32; 16] = std::array::from_fn(|_| rng.gen());
            let mut registers = initial;
            run_block(&block, &mut registers);
            run_block(&block, &mut registers);
            assert_eq!(registers, initial, "double exchange must restore state");
        }
    }
}

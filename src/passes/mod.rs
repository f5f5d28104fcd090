//! Post-processing passes for generated programs.
//!
//! After the orchestrator emits a forward/inverse program pair, both blocks run
//! through the same fixed pipeline of semantics-preserving rewrites. The passes
//! obfuscate the emitted code further (splitting statements, shuffling
//! independent ones) and bring it into the shape the code-emission layer
//! expects (strength-reduced multiplies, normalized operand order, register
//! variables lowered to array cells).
//!
//! # Pipeline Order
//!
//! 1. [`StrengthReductionPass`] - power-of-two multiplies become shifts
//! 2. [`NormalizePass`] - commutative operators carry their literal on the right
//! 3. [`ExpansionPass`] - compound assignments randomly split through locals
//! 4. [`ReorderPass`] - independent statements shuffled, dependencies preserved
//! 5. [`LoweringPass`] - register variables become `state[i]` array cells
//!
//! Lowering runs last so the earlier passes see plain variables; reordering
//! runs after expansion so the freshly split statements take part in the
//! shuffle.

mod expand;
mod lower;
mod normalize;
mod reorder;
mod strength;

pub use expand::ExpansionPass;
pub use lower::{LoweringPass, STATE_ARRAY};
pub use normalize::NormalizePass;
pub use reorder::ReorderPass;
pub use strength::StrengthReductionPass;

use rand::{Rng, RngCore};
use tracing::trace;

use crate::{ast::StatementBlock, Result};

/// A semantics-preserving rewrite over a statement block.
///
/// Passes receive the pseudo-random source as a trait object so the pipeline
/// can hold them behind a common interface; deterministic passes ignore it.
pub trait StatementPass {
    /// Unique name for logging and debugging.
    fn name(&self) -> &'static str;

    /// Runs the pass over a block.
    ///
    /// Returns `true` if any statement changed.
    ///
    /// # Errors
    ///
    /// Returns an error if a rewrite produces an invalid statement; this
    /// signals a defect in the pass, not in the input.
    fn run(&self, block: &mut StatementBlock, rng: &mut dyn RngCore) -> Result<bool>;
}

/// Runs the full post-processing pipeline over a block.
///
/// Applied identically to the encryption and decryption halves of a cipher
/// pair, so both end up in the same shape.
///
/// # Errors
///
/// Propagates the first pass failure.
pub fn postprocess<R: Rng>(block: &mut StatementBlock, rng: &mut R) -> Result<()> {
    let passes: [&dyn StatementPass; 5] = [
        &StrengthReductionPass,
        &NormalizePass,
        &ExpansionPass,
        &ReorderPass,
        &LoweringPass,
    ];
    for pass in passes {
        let changed = pass.run(block, rng)?;
        trace!(pass = pass.name(), changed, "post-processing pass finished");
    }
    Ok(())
}

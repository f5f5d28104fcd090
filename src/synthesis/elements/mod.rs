//! Cipher element kinds and their dispatch.
//!
//! A cipher element is a small keyed, invertible transform over one to four
//! register slots. The set of kinds is closed and enumerable, so dispatch is a
//! plain `match` over [`CipherElement`] instead of a trait object: every kind
//! exposes the same `initialize` / `emit` / `emit_inverse` contract, and the
//! orchestrator composes elements without knowing their internals.
//!
//! # Element Contract
//!
//! 1. The orchestrator fills the element's register slots (`assign_slots`)
//!    before initialization.
//! 2. `initialize` draws the operation variant and key material such that the
//!    pair of emissions is self-consistent.
//! 3. `emit` followed immediately by `emit_inverse`, with no other writer
//!    touching the element's slots in between, restores the pre-`emit` slot
//!    values exactly.

mod addkey;
mod binop;
mod matrix;
mod numop;
mod rotate;
mod swap;

pub use addkey::AddKeyElement;
pub use binop::{BinOpElement, BinOpKind};
pub use matrix::{Matrix4, MatrixElement};
pub use numop::{NumOpElement, NumOpKind};
pub use rotate::RotateElement;
pub use swap::SwapElement;

use rand::Rng;

use crate::{synthesis::CipherGenContext, Result};

/// A keyed, invertible transform over a fixed number of register slots.
#[derive(Debug, Clone)]
pub enum CipherElement {
    /// Four-slot unimodular matrix transform.
    Matrix(MatrixElement),
    /// Single-slot keyed arithmetic transform.
    NumOp(NumOpElement),
    /// Two-slot combining transform.
    BinOp(BinOpElement),
    /// Two-slot masked exchange.
    Swap(SwapElement),
    /// Single-slot keyed bit rotation.
    Rotate(RotateElement),
    /// Single-slot key addition, pinned to its register.
    AddKey(AddKeyElement),
}

impl CipherElement {
    /// Creates an uninitialized matrix element.
    #[must_use]
    pub(crate) fn matrix() -> Self {
        Self::Matrix(MatrixElement::new())
    }

    /// Creates an uninitialized numeric-operation element.
    #[must_use]
    pub(crate) fn num_op() -> Self {
        Self::NumOp(NumOpElement::new())
    }

    /// Creates an uninitialized binary-operation element.
    #[must_use]
    pub(crate) fn bin_op() -> Self {
        Self::BinOp(BinOpElement::new())
    }

    /// Creates an uninitialized swap element.
    #[must_use]
    pub(crate) fn swap() -> Self {
        Self::Swap(SwapElement::new())
    }

    /// Creates an uninitialized rotation element.
    #[must_use]
    pub(crate) fn rotate() -> Self {
        Self::Rotate(RotateElement::new())
    }

    /// Creates a key-addition element pinned to a register slot.
    #[must_use]
    pub(crate) fn add_key(register: u8) -> Self {
        Self::AddKey(AddKeyElement::new(register))
    }

    /// Number of register slots this element reads and writes.
    #[must_use]
    pub fn data_count(&self) -> usize {
        self.data_indexes().len()
    }

    /// The register slots assigned to this element.
    #[must_use]
    pub fn data_indexes(&self) -> &[u8] {
        match self {
            Self::Matrix(element) => element.data(),
            Self::NumOp(element) => element.data(),
            Self::BinOp(element) => element.data(),
            Self::Swap(element) => element.data(),
            Self::Rotate(element) => element.data(),
            Self::AddKey(element) => element.data(),
        }
    }

    /// Assigns the element's register slots.
    ///
    /// Key-addition elements are pinned at construction and never reassigned;
    /// the orchestrator skips them.
    ///
    /// # Panics
    ///
    /// Panics if the slice length does not match [`data_count`](Self::data_count)
    /// or any index is outside the register file; either is a defect in the
    /// slot-assignment logic.
    pub fn assign_slots(&mut self, slots: &[u8]) {
        assert_eq!(
            slots.len(),
            self.data_count(),
            "slot assignment must match the element's data count"
        );
        assert!(
            slots.iter().all(|slot| usize::from(*slot) < crate::synthesis::REGISTER_COUNT),
            "slot assignment outside the register file"
        );
        match self {
            Self::Matrix(element) => element.set_data(slots),
            Self::NumOp(element) => element.set_data(slots),
            Self::BinOp(element) => element.set_data(slots),
            Self::Swap(element) => element.set_data(slots),
            Self::Rotate(element) => element.set_data(slots),
            Self::AddKey(_) => unreachable!("key-addition elements are pinned to their register"),
        }
    }

    /// Checks if this element's slots are fixed at construction.
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        matches!(self, Self::AddKey(_))
    }

    /// Draws the element's operation variant and key material.
    pub fn initialize<R: Rng>(&mut self, rng: &mut R) {
        match self {
            Self::Matrix(element) => element.initialize(rng),
            Self::NumOp(element) => element.initialize(rng),
            Self::BinOp(element) => element.initialize(rng),
            Self::Swap(element) => element.initialize(rng),
            Self::Rotate(element) => element.initialize(rng),
            Self::AddKey(element) => element.initialize(rng),
        }
    }

    /// Appends the forward transform to the context.
    ///
    /// # Errors
    ///
    /// Propagates statement-construction failures from the context.
    pub fn emit(&self, ctx: &mut CipherGenContext) -> Result<()> {
        match self {
            Self::Matrix(element) => element.emit(ctx),
            Self::NumOp(element) => element.emit(ctx),
            Self::BinOp(element) => element.emit(ctx),
            Self::Swap(element) => element.emit(ctx),
            Self::Rotate(element) => element.emit(ctx),
            Self::AddKey(element) => element.emit(ctx),
        }
    }

    /// Appends the inverse transform to the context.
    ///
    /// # Errors
    ///
    /// Propagates statement-construction failures from the context.
    pub fn emit_inverse(&self, ctx: &mut CipherGenContext) -> Result<()> {
        match self {
            Self::Matrix(element) => element.emit_inverse(ctx),
            Self::NumOp(element) => element.emit_inverse(ctx),
            Self::BinOp(element) => element.emit_inverse(ctx),
            Self::Swap(element) => element.emit_inverse(ctx),
            Self::Rotate(element) => element.emit_inverse(ctx),
            Self::AddKey(element) => element.emit_inverse(ctx),
        }
    }

    /// Short kind name for logging.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Matrix(_) => "matrix",
            Self::NumOp(_) => "numop",
            Self::BinOp(_) => "binop",
            Self::Swap(_) => "swap",
            Self::Rotate(_) => "rotate",
            Self::AddKey(_) => "addkey",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::run_block;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn sample_elements() -> Vec<CipherElement> {
        vec![
            CipherElement::matrix(),
            CipherElement::num_op(),
            CipherElement::bin_op(),
            CipherElement::swap(),
            CipherElement::rotate(),
            CipherElement::add_key(7),
        ]
    }

    #[test]
    fn test_data_counts() {
        let counts: Vec<usize> = sample_elements()
            .iter()
            .map(CipherElement::data_count)
            .collect();
        assert_eq!(counts, [4, 1, 2, 2, 1, 1]);
    }

    #[test]
    fn test_pinned_add_key() {
        let element = CipherElement::add_key(9);
        assert!(element.is_pinned());
        assert_eq!(element.data_indexes(), &[9]);
        assert!(!CipherElement::swap().is_pinned());
    }

    #[test]
    #[should_panic(expected = "slot assignment must match")]
    fn test_slot_count_mismatch_is_fatal() {
        let mut element = CipherElement::matrix();
        element.assign_slots(&[0, 1]);
    }

    #[test]
    fn test_every_kind_roundtrips_in_isolation() {
        let mut rng = StdRng::seed_from_u64(101);
        for _ in 0..100 {
            for mut element in sample_elements() {
                if !element.is_pinned() {
                    let mut slots: Vec<u8> = (0..16).collect();
                    use rand::seq::SliceRandom;
                    slots.shuffle(&mut rng);
                    slots.truncate(element.data_count());
                    element.assign_slots(&slots);
                }
                element.initialize(&mut rng);

                let mut forward = CipherGenContext::new();
                element.emit(&mut forward).unwrap();
                let mut inverse = CipherGenContext::new();
                element.emit_inverse(&mut inverse).unwrap();

                let initial: [u32; 16] = std::array::from_fn(|_| rng.gen());
                let mut registers = initial;
                run_block(&forward.into_block(), &mut registers);
                run_block(&inverse.into_block(), &mut registers);
                assert_eq!(
                    registers,
                    initial,
                    "isolated roundtrip failed for {}",
                    element.kind_name()
                );
            }
        }
    }
}

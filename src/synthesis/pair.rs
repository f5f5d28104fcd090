//! Cipher-pair orchestration.
//!
//! [`generate_cipher_pair`] composes a random sequence of cipher elements into
//! a full 16-register cipher: it draws a randomized element budget, assigns
//! register slots, initializes key material, emits the forward program, emits
//! the inverse program in reverse element order, and runs both through the same
//! post-processing pipeline.
//!
//! Reversing the element order on the inverse side is what makes the pair
//! correct: undoing a composition of transforms requires reversing the
//! composition, not just inverting each step in place.

use rand::{seq::SliceRandom, Rng};
use tracing::debug;

use crate::{
    ast::StatementBlock,
    passes::postprocess,
    synthesis::{elements::CipherElement, CipherGenContext, REGISTER_COUNT},
    Result,
};

// Base element mix (Matrix : NumOp : Swap : BinOp : Rotate) before the
// per-call scale factor; one key addition per register comes on top.
const MATRIX_SHARE: usize = 4;
const NUMOP_SHARE: usize = 10;
const SWAP_SHARE: usize = 6;
const BINOP_SHARE: usize = 9;
const ROTATE_SHARE: usize = 6;

/// A generated encryption/decryption program pair over the 16-slot register
/// file.
///
/// Both programs are post-processed identically; after lowering they operate on
/// the cells of the [`STATE_ARRAY`](crate::passes::STATE_ARRAY) array. Running
/// `decrypt` on the output of `encrypt` restores the original register vector
/// exactly.
#[derive(Debug, Clone)]
pub struct CipherPair {
    /// The forward (encryption) program.
    pub encrypt: StatementBlock,
    /// The inverse (decryption) program.
    pub decrypt: StatementBlock,
}

/// Generates a random invertible cipher over the 16-slot register file.
///
/// Output is fully determined by the state of `rng`, so a caller seeding the
/// source per obfuscation run gets reproducible programs.
///
/// # Errors
///
/// Returns an error if program emission or post-processing produces an invalid
/// statement; this signals an internal defect, not a condition to retry.
pub fn generate_cipher_pair<R: Rng>(rng: &mut R) -> Result<CipherPair> {
    let mut elements = draw_elements(rng);
    elements.shuffle(rng);
    assign_slots(rng, &mut elements);
    for element in &mut elements {
        element.initialize(rng);
    }
    debug!(elements = elements.len(), "initialized cipher element chain");

    let mut forward = CipherGenContext::new();
    for element in &elements {
        element.emit(&mut forward)?;
    }
    let mut inverse = CipherGenContext::new();
    for element in elements.iter().rev() {
        element.emit_inverse(&mut inverse)?;
    }

    let mut encrypt = forward.into_block();
    let mut decrypt = inverse.into_block();
    postprocess(&mut encrypt, rng)?;
    postprocess(&mut decrypt, rng)?;
    debug!(
        encrypt_statements = encrypt.len(),
        decrypt_statements = decrypt.len(),
        "generated cipher pair"
    );
    Ok(CipherPair { encrypt, decrypt })
}

/// Draws the element budget: the proportional mix scaled by one per-call
/// factor with 20% variance, plus one pinned key addition per register.
fn draw_elements<R: Rng>(rng: &mut R) -> Vec<CipherElement> {
    let factor = 0.8 + rng.gen::<f64>() * 0.4;
    let scaled = |share: usize| {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        #[allow(clippy::cast_sign_loss)] // factor is positive
        let count = (share as f64 * factor).round() as usize;
        count.max(1)
    };

    let mut elements = Vec::new();
    for _ in 0..scaled(MATRIX_SHARE) {
        elements.push(CipherElement::matrix());
    }
    for _ in 0..scaled(NUMOP_SHARE) {
        elements.push(CipherElement::num_op());
    }
    for _ in 0..scaled(SWAP_SHARE) {
        elements.push(CipherElement::swap());
    }
    for _ in 0..scaled(BINOP_SHARE) {
        elements.push(CipherElement::bin_op());
    }
    for _ in 0..scaled(ROTATE_SHARE) {
        elements.push(CipherElement::rotate());
    }
    for register in 0..REGISTER_COUNT {
        #[allow(clippy::cast_possible_truncation)] // REGISTER_COUNT is 16
        elements.push(CipherElement::add_key(register as u8));
    }
    elements
}

/// Assigns register slots to every unpinned element from a working permutation
/// of the register indices.
///
/// Slots are consumed left to right; when an element needs more slots than the
/// permutation window still holds, the permutation is reshuffled and the window
/// restarts. Within one window no slot is handed out twice.
fn assign_slots<R: Rng>(rng: &mut R, elements: &mut [CipherElement]) {
    #[allow(clippy::cast_possible_truncation)] // REGISTER_COUNT is 16
    let mut window: Vec<u8> = (0..REGISTER_COUNT as u8).collect();
    window.shuffle(rng);
    let mut cursor = 0usize;
    for element in elements.iter_mut().filter(|element| !element.is_pinned()) {
        let count = element.data_count();
        if cursor + count > window.len() {
            window.shuffle(rng);
            cursor = 0;
        }
        element.assign_slots(&window[cursor..cursor + count]);
        cursor += count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn test_element_budget_scales_within_variance() {
        let base: usize =
            MATRIX_SHARE + NUMOP_SHARE + SWAP_SHARE + BINOP_SHARE + ROTATE_SHARE;
        let mut rng = StdRng::seed_from_u64(6);
        let mut counts = HashSet::new();
        for _ in 0..200 {
            let elements = draw_elements(&mut rng);
            let unpinned = elements.iter().filter(|e| !e.is_pinned()).count();
            let pinned = elements.len() - unpinned;
            assert_eq!(pinned, REGISTER_COUNT, "one key addition per register");
            // Rounding widens the exact +/-20% band by one per kind.
            assert!(unpinned >= base * 4 / 5 - 5 && unpinned <= base * 6 / 5 + 5);
            counts.insert(elements.len());
        }
        assert!(counts.len() > 1, "element count must not be a fixed fingerprint");
    }

    #[test]
    fn test_add_key_covers_every_register() {
        let mut rng = StdRng::seed_from_u64(8);
        let elements = draw_elements(&mut rng);
        let covered: HashSet<u8> = elements
            .iter()
            .filter(|element| element.is_pinned())
            .map(|element| element.data_indexes()[0])
            .collect();
        assert_eq!(covered.len(), REGISTER_COUNT);
    }

    #[test]
    fn test_assigned_slots_valid_and_window_disjoint() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let mut elements = draw_elements(&mut rng);
            elements.shuffle(&mut rng);
            assign_slots(&mut rng, &mut elements);
            for element in &elements {
                let indexes = element.data_indexes();
                assert_eq!(indexes.len(), element.data_count());
                let unique: HashSet<u8> = indexes.iter().copied().collect();
                assert_eq!(
                    unique.len(),
                    indexes.len(),
                    "an element must not read the same slot twice"
                );
                assert!(indexes.iter().all(|slot| usize::from(*slot) < REGISTER_COUNT));
            }
        }
    }

    #[test]
    fn test_generate_produces_nonempty_pair() {
        let mut rng = StdRng::seed_from_u64(10);
        let pair = generate_cipher_pair(&mut rng).unwrap();
        assert!(!pair.encrypt.is_empty());
        assert!(!pair.decrypt.is_empty());
        // Lowering leaves no register variables behind.
        let rendered = pair.encrypt.to_string();
        assert!(rendered.contains("state["));
    }
}

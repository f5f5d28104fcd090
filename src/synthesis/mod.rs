//! The cipher and expression synthesis engine.
//!
//! This module owns everything between "give me an invertible disguise" and the
//! finished statement blocks:
//!
//! - [`CipherGenContext`] - the 16-slot register file, scoped scratch
//!   variables, and the statement stream one program is emitted into.
//! - [`elements`] - the closed set of keyed, invertible transforms a cipher is
//!   composed from.
//! - [`generate_cipher_pair`] - composes a random element chain into an
//!   encryption/decryption program pair.
//! - [`generate_expression_pair`] - disguises a scalar identity as a random
//!   expression and its exact symbolic inverse.
//!
//! All randomness flows through an explicit [`rand::Rng`] handle supplied by
//! the caller; seeding that source makes every generated program reproducible.

pub mod elements;

mod context;
mod expression_pair;
mod pair;

pub use context::{CipherGenContext, REGISTER_COUNT};
pub use expression_pair::{generate_expression_pair, ExpressionPair};
pub use pair::{generate_cipher_pair, CipherPair};

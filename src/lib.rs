// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # cipherforge
//!
//! Randomized synthesis of invertible cipher programs for .NET bytecode obfuscation.
//!
//! `cipherforge` is the dynamic-cipher engine of an obfuscation pipeline: it disguises
//! simple values and simple control decisions as small, randomly generated
//! arithmetic/logical programs that are opaque to static reading yet behave identically
//! to the original - and it hands back the matching "undo" program, derived through
//! symbolic manipulation rather than by replaying randomness. Every program operates on
//! a fixed 16-slot register file with unsigned 32-bit wraparound semantics and is
//! provably invertible by construction.
//!
//! ## Features
//!
//! - **🎲 Reproducible randomness** - All generation is driven by a caller-supplied
//!   [`rand::Rng`]; the same seed always yields byte-identical programs
//! - **🔁 Exact inverses** - Cipher pairs and expression pairs round-trip every 32-bit
//!   input, verified by construction (odd multiplicative keys, unimodular matrices,
//!   involutive exchanges)
//! - **🧩 Closed element set** - Six enumerable transform kinds composed into ciphers
//!   of randomized length, with no virtual dispatch
//! - **🔬 Built-in evaluator** - Execute generated programs directly to verify a pair
//!   before committing to it
//! - **🛡️ Memory safe** - Pure Rust, no I/O, no global state
//!
//! ## Quick Start
//!
//! ```rust
//! use cipherforge::prelude::*;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(0xC0FFEE);
//! let pair = generate_cipher_pair(&mut rng)?;
//!
//! // Run the pair over a register vector to see it round-trip.
//! let input: Vec<u32> = (0..16).map(|i| i * 0x0101_0101).collect();
//! let mut state = ExecutionState::new();
//! state.bind_array(STATE_ARRAY, input.clone());
//! state.execute_block(&pair.encrypt)?;
//! state.execute_block(&pair.decrypt)?;
//! assert_eq!(state.array(STATE_ARRAY).unwrap(), &input[..]);
//! # Ok::<(), cipherforge::Error>(())
//! ```
//!
//! ### Disguising a scalar identity
//!
//! ```rust
//! use cipherforge::{ast::{ExecutionState, Expression}, synthesis::generate_expression_pair};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let x = Expression::variable("x");
//! let r = Expression::variable("r");
//! let pair = generate_expression_pair(&mut rng, &x, &r, 8)?;
//!
//! let mut state = ExecutionState::new();
//! state.bind("x", 0xDEAD_BEEF);
//! let encoded = state.evaluate(&pair.expression)?;
//!
//! let mut state = ExecutionState::new();
//! state.bind("r", encoded);
//! assert_eq!(state.evaluate(&pair.inverse)?, 0xDEAD_BEEF);
//! # Ok::<(), cipherforge::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `cipherforge` is organized into four modules:
//!
//! - [`ast`] - the immutable expression/statement model, operator sets, the
//!   identity-keyed annotation side-table, and the concrete evaluator
//! - [`synthesis`] - the generation context, the cipher element kinds, and the
//!   two generation entry points
//! - [`passes`] - semantics-preserving post-processing applied to every generated
//!   program (strength reduction, normalization, random expansion, dependency-aware
//!   reordering, register lowering)
//! - [`utils`] - modular-inverse and power-of-two arithmetic helpers
//!
//! The surrounding pipeline lowers the emitted [`ast::StatementBlock`]s into CIL
//! instructions and wires concrete inputs and outputs to the cells of the lowered
//! `state` array; that code-emission layer, and the decisions about *when* to
//! disguise something, live outside this crate.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Because every input comes from
//! the tool itself, errors signal internal defects rather than recoverable
//! conditions: callers abort the obfuscation run instead of retrying. Invariants that
//! only a bug inside this crate can break are enforced with assertions and documented
//! under `# Panics`.

/// Shared functionality which is used in unit-tests across the crate
#[cfg(test)]
pub(crate) mod test;

mod error;

pub use error::{Error, Result};

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use cipherforge::prelude::*;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(1);
/// let pair = generate_cipher_pair(&mut rng)?;
/// assert!(!pair.encrypt.is_empty());
/// # Ok::<(), cipherforge::Error>(())
/// ```
pub mod prelude;

/// Expression and statement model for generated cipher programs.
///
/// Immutable expression trees ([`ast::Expression`]) shared through
/// [`ast::ExprRef`], assignment statements and blocks, operator enums, the
/// [`ast::AnnotationMap`] side-table for attaching metadata by node identity,
/// and the [`ast::ExecutionState`] evaluator for running generated programs.
pub mod ast;

/// Semantics-preserving post-processing passes.
///
/// A fixed pipeline ([`passes::postprocess`]) applied identically to both
/// halves of a cipher pair: strength reduction, operand normalization, random
/// statement expansion, dependency-aware reordering, and register lowering.
pub mod passes;

/// The cipher and expression synthesis engine.
///
/// The generation context and register file, the closed set of cipher element
/// kinds, and the two entry points the rest of the obfuscator calls:
/// [`synthesis::generate_cipher_pair`] and
/// [`synthesis::generate_expression_pair`].
pub mod synthesis;

/// Shared utility functions.
///
/// Modular multiplicative inverses over `2^32` and `2^8`
/// ([`utils::mod_inv32`], [`utils::mod_inv8`]) and the power-of-two test used
/// by strength reduction.
pub mod utils;

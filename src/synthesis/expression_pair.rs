//! Random expression generation with exact symbolic inversion.
//!
//! [`generate_expression_pair`] disguises a scalar identity as two mutually
//! inverse expressions: a random arithmetic/logical expression over one free
//! variable, and the expression that recovers the variable from the result.
//! The inverse is derived by walking the variable-carrying path of the forward
//! tree root-to-leaf and folding the constant sibling of each node into the
//! running result with the algebraic inverse of that node's operator, never by
//! replaying the randomness that built the tree.
//!
//! Every generated tree holds exactly one occurrence of the free variable;
//! multiplications on the variable path always use an odd literal, so every
//! operator on the path stays invertible under 32-bit wraparound arithmetic.

use std::rc::Rc;

use rand::Rng;

use crate::{
    ast::{AnnotationMap, BinaryOp, Expression, ExprRef, UnaryOp},
    utils::mod_inv32,
    Error, Result,
};

/// A forward expression and its exact inverse.
///
/// For every 32-bit `V`, evaluating `inverse` with the placeholder bound to the
/// value of `expression` at `variable = V` yields `V` again.
#[derive(Debug, Clone)]
pub struct ExpressionPair {
    /// The forward expression over the free variable.
    pub expression: ExprRef,
    /// The inverse expression over the result placeholder.
    pub inverse: ExprRef,
}

/// Generates a random expression over one free variable together with its
/// exact symbolic inverse.
///
/// # Arguments
///
/// * `rng` - The pseudo-random source; output is fully determined by its state.
/// * `variable` - The free variable of the forward expression.
/// * `placeholder` - The variable the inverse expression reads the forward
///   result from.
/// * `depth` - Target structural depth of the forward expression; 0 returns the
///   variable and placeholder unchanged.
///
/// # Errors
///
/// Returns [`Error::NotAVariable`] if `variable` or `placeholder` is not a
/// variable expression.
///
/// # Panics
///
/// Panics if the generated tree violates its own invariants (zero or several
/// variable leaves, or an even multiplier on the variable path); both indicate
/// an internal defect, not a recoverable condition.
pub fn generate_expression_pair<R: Rng>(
    rng: &mut R,
    variable: &ExprRef,
    placeholder: &ExprRef,
    depth: u32,
) -> Result<ExpressionPair> {
    if variable.as_variable().is_none() || placeholder.as_variable().is_none() {
        return Err(Error::NotAVariable);
    }

    let grown = generate(rng, variable.clone(), depth, depth);
    let expression = swap_operands(rng, &grown);
    assert_eq!(
        occurrence_count(&expression, variable),
        1,
        "generated expression must hold exactly one occurrence of the free variable"
    );

    let inverse = derive_inverse(&expression, variable, placeholder)?;
    Ok(ExpressionPair {
        expression,
        inverse,
    })
}

/// Grows an expression around `current`, drawing operators until the depth
/// budget runs out or an early stop triggers.
///
/// Only the initial call threads the free variable; the sibling operand of
/// Add/Sub/Xor grows from a fresh literal seed, so the variable ends up in
/// exactly one leaf of the final tree.
fn generate<R: Rng>(rng: &mut R, current: ExprRef, remaining: u32, target: u32) -> ExprRef {
    if remaining == 0 {
        return current;
    }
    let consumed = target - remaining;
    // Past a third of the target depth the tree may stop growing early.
    if consumed * 3 >= target && rng.gen_range(0..100) < 15 {
        return current;
    }

    match rng.gen_range(0..6) {
        0 => {
            let carrier = generate(rng, current, remaining - 1, target);
            let seed = Expression::literal(rng.gen());
            let other = generate(rng, seed, remaining - 1, target);
            Expression::binary(BinaryOp::Add, carrier, other)
        }
        1 => {
            let carrier = generate(rng, current, remaining - 1, target);
            let seed = Expression::literal(rng.gen());
            let other = generate(rng, seed, remaining - 1, target);
            Expression::binary(BinaryOp::Sub, carrier, other)
        }
        2 => {
            let carrier = generate(rng, current, remaining - 1, target);
            let key = Expression::literal(rng.gen::<u32>() | 1);
            Expression::binary(BinaryOp::Mul, carrier, key)
        }
        3 => {
            let carrier = generate(rng, current, remaining - 1, target);
            let seed = Expression::literal(rng.gen());
            let other = generate(rng, seed, remaining - 1, target);
            Expression::binary(BinaryOp::Xor, carrier, other)
        }
        4 => Expression::unary(UnaryOp::Not, generate(rng, current, remaining - 1, target)),
        _ => Expression::unary(UnaryOp::Neg, generate(rng, current, remaining - 1, target)),
    }
}

/// Rebuilds the tree, flipping the children of every binary node with
/// probability 1/2.
///
/// Without this, the variable would always sit in the left operand and the
/// tree shape alone would reveal the carrier path. Swapping is sound for every
/// generated operator: the commutative ones are unaffected, and a flipped
/// subtraction simply changes which inversion rule applies.
fn swap_operands<R: Rng>(rng: &mut R, expression: &ExprRef) -> ExprRef {
    match &**expression {
        Expression::Binary { op, left, right } => {
            let left = swap_operands(rng, left);
            let right = swap_operands(rng, right);
            if rng.gen_bool(0.5) {
                Expression::binary(*op, right, left)
            } else {
                Expression::binary(*op, left, right)
            }
        }
        Expression::Unary { op, operand } => Expression::unary(*op, swap_operands(rng, operand)),
        _ => expression.clone(),
    }
}

/// Counts occurrences of the free variable (by node identity).
fn occurrence_count(expression: &ExprRef, variable: &ExprRef) -> usize {
    if Rc::ptr_eq(expression, variable) {
        return 1;
    }
    match &**expression {
        Expression::Binary { left, right, .. } => {
            occurrence_count(left, variable) + occurrence_count(right, variable)
        }
        Expression::Unary { operand, .. } => occurrence_count(operand, variable),
        Expression::Index { array, .. } => occurrence_count(array, variable),
        Expression::Literal(_) | Expression::Variable(_) => 0,
    }
}

/// Checks whether a subtree contains the free variable, memoized by node
/// identity so shared subtrees are classified once.
fn carries_variable(
    expression: &ExprRef,
    variable: &ExprRef,
    cache: &mut AnnotationMap<bool>,
) -> bool {
    if Rc::ptr_eq(expression, variable) {
        return true;
    }
    if let Some(hit) = cache.get(expression) {
        return *hit;
    }
    let carries = match &**expression {
        Expression::Literal(_) | Expression::Variable(_) => false,
        Expression::Unary { operand, .. } => carries_variable(operand, variable, cache),
        Expression::Binary { left, right, .. } => {
            carries_variable(left, variable, cache) || carries_variable(right, variable, cache)
        }
        Expression::Index { array, .. } => carries_variable(array, variable, cache),
    };
    cache.insert(expression, carries);
    carries
}

/// Walks the variable-carrying path root-to-leaf, folding the constant sibling
/// of each node into the running result with the inverse operator.
fn derive_inverse(
    expression: &ExprRef,
    variable: &ExprRef,
    placeholder: &ExprRef,
) -> Result<ExprRef> {
    let mut cache = AnnotationMap::new();
    let mut result = placeholder.clone();
    let mut node = expression.clone();

    loop {
        if Rc::ptr_eq(&node, variable) {
            return Ok(result);
        }
        let next = match &*node {
            // Complement and negation are their own inverses.
            Expression::Unary { op, operand } => {
                result = Expression::unary(*op, result);
                operand.clone()
            }
            Expression::Binary { op, left, right } => {
                let left_carries = carries_variable(left, variable, &mut cache);
                let right_carries = carries_variable(right, variable, &mut cache);
                assert!(
                    left_carries != right_carries,
                    "exactly one operand of every node on the path must carry the variable"
                );
                let (carrier, other) = if left_carries {
                    (left, right)
                } else {
                    (right, left)
                };
                result = match op {
                    BinaryOp::Add => Expression::binary(BinaryOp::Sub, result, other.clone()),
                    BinaryOp::Sub if left_carries => {
                        Expression::binary(BinaryOp::Add, result, other.clone())
                    }
                    // `const - var = r` solves to `var = const - r`.
                    BinaryOp::Sub => Expression::binary(BinaryOp::Sub, other.clone(), result),
                    BinaryOp::Xor => Expression::binary(BinaryOp::Xor, result, other.clone()),
                    BinaryOp::Mul => {
                        let key = other
                            .as_literal()
                            .expect("multiplier on the variable path must be a literal");
                        assert!(
                            key & 1 == 1,
                            "multiplier on the variable path must be odd"
                        );
                        Expression::binary(
                            BinaryOp::Mul,
                            result,
                            Expression::literal(mod_inv32(key)),
                        )
                    }
                    _ => return Err(Error::NonInvertibleOperation(*op)),
                };
                carrier.clone()
            }
            _ => unreachable!("the carrier path always ends at the free variable"),
        };
        node = next;
    }
}

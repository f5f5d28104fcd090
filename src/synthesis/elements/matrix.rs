//! Four-register unimodular matrix transform.

use rand::Rng;

use crate::{
    ast::{BinaryOp, Expression},
    synthesis::CipherGenContext,
    Result,
};

/// A 4x4 integer matrix with wrapping 32-bit entries.
///
/// The cipher works modulo `2^32`, where a matrix built with determinant 1 over
/// the integers keeps an exact inverse: the adjugate. All arithmetic here is
/// therefore plain wrapping arithmetic with no rational intermediates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matrix4 {
    rows: [[u32; 4]; 4],
}

impl Matrix4 {
    /// The identity matrix.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            rows: [
                [1, 0, 0, 0],
                [0, 1, 0, 0],
                [0, 0, 1, 0],
                [0, 0, 0, 1],
            ],
        }
    }

    /// Builds a matrix from explicit rows.
    #[must_use]
    pub const fn from_rows(rows: [[u32; 4]; 4]) -> Self {
        Self { rows }
    }

    /// Returns one entry.
    #[must_use]
    pub const fn get(&self, row: usize, col: usize) -> u32 {
        self.rows[row][col]
    }

    /// Draws a random unimodular matrix.
    ///
    /// Built as `transpose(L) * U` from two unit-triangular matrices with small
    /// random off-diagonal entries; the determinant is exactly 1, so the
    /// adjugate is the exact inverse.
    #[must_use]
    pub fn random_unimodular<R: Rng>(rng: &mut R) -> Self {
        let l = Self::random_unit_upper(rng);
        let u = Self::random_unit_upper(rng);
        l.transpose().mul(&u)
    }

    fn random_unit_upper<R: Rng>(rng: &mut R) -> Self {
        let mut rows = [[0u32; 4]; 4];
        for (i, row) in rows.iter_mut().enumerate() {
            row[i] = 1;
            for entry in row.iter_mut().skip(i + 1) {
                *entry = rng.gen_range(1..8);
            }
        }
        Self { rows }
    }

    /// Returns the transposed matrix.
    #[must_use]
    pub const fn transpose(&self) -> Self {
        let m = &self.rows;
        Self {
            rows: [
                [m[0][0], m[1][0], m[2][0], m[3][0]],
                [m[0][1], m[1][1], m[2][1], m[3][1]],
                [m[0][2], m[1][2], m[2][2], m[3][2]],
                [m[0][3], m[1][3], m[2][3], m[3][3]],
            ],
        }
    }

    /// Multiplies two matrices with wrapping arithmetic.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        let mut rows = [[0u32; 4]; 4];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                let mut acc = 0u32;
                for k in 0..4 {
                    acc = acc.wrapping_add(self.rows[i][k].wrapping_mul(other.rows[k][j]));
                }
                *entry = acc;
            }
        }
        Self { rows }
    }

    /// Multiplies a column vector with wrapping arithmetic.
    #[must_use]
    pub fn mul_vector(&self, vector: [u32; 4]) -> [u32; 4] {
        std::array::from_fn(|i| {
            let mut acc = 0u32;
            for (j, component) in vector.iter().enumerate() {
                acc = acc.wrapping_add(self.rows[i][j].wrapping_mul(*component));
            }
            acc
        })
    }

    /// Returns the adjugate (transposed cofactor matrix).
    ///
    /// For a determinant-1 matrix this is the exact inverse modulo `2^32`.
    #[must_use]
    pub fn adjugate(&self) -> Self {
        let mut rows = [[0u32; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                let minor = self.minor(i, j);
                let cofactor = if (i + j) % 2 == 0 {
                    det3(&minor)
                } else {
                    det3(&minor).wrapping_neg()
                };
                // Transposed placement.
                rows[j][i] = cofactor;
            }
        }
        Self { rows }
    }

    fn minor(&self, row: usize, col: usize) -> [[u32; 3]; 3] {
        let mut minor = [[0u32; 3]; 3];
        let mut mi = 0;
        for i in (0..4).filter(|i| *i != row) {
            let mut mj = 0;
            for j in (0..4).filter(|j| *j != col) {
                minor[mi][mj] = self.rows[i][j];
                mj += 1;
            }
            mi += 1;
        }
        minor
    }
}

fn det3(m: &[[u32; 3]; 3]) -> u32 {
    let a = m[0][0].wrapping_mul(
        m[1][1]
            .wrapping_mul(m[2][2])
            .wrapping_sub(m[1][2].wrapping_mul(m[2][1])),
    );
    let b = m[0][1].wrapping_mul(
        m[1][0]
            .wrapping_mul(m[2][2])
            .wrapping_sub(m[1][2].wrapping_mul(m[2][0])),
    );
    let c = m[0][2].wrapping_mul(
        m[1][0]
            .wrapping_mul(m[2][1])
            .wrapping_sub(m[1][1].wrapping_mul(m[2][0])),
    );
    a.wrapping_sub(b).wrapping_add(c)
}

/// Linear transform of four register slots by a random unimodular matrix.
///
/// The forward and inverse passes both perform a full 4x4 matrix-vector multiply
/// through four scoped temporaries, so every output is computed from the complete
/// pre-transform vector before any slot is overwritten.
#[derive(Debug, Clone)]
pub struct MatrixElement {
    data: [u8; 4],
    key: Matrix4,
    inverse_key: Matrix4,
}

impl MatrixElement {
    /// Creates an uninitialized element.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            data: [0, 1, 2, 3],
            key: Matrix4::identity(),
            inverse_key: Matrix4::identity(),
        }
    }

    /// Builds an element with a fixed unimodular key matrix, deriving the
    /// inverse. Used by tests.
    #[must_use]
    pub fn with_key(key: Matrix4) -> Self {
        Self {
            data: [0, 1, 2, 3],
            key,
            inverse_key: key.adjugate(),
        }
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn set_data(&mut self, slots: &[u8]) {
        self.data.copy_from_slice(slots);
    }

    /// Returns the key matrix and its inverse.
    #[must_use]
    pub const fn keys(&self) -> (&Matrix4, &Matrix4) {
        (&self.key, &self.inverse_key)
    }

    /// Draws the key matrix and derives its inverse.
    pub fn initialize<R: Rng>(&mut self, rng: &mut R) {
        self.key = Matrix4::random_unimodular(rng);
        self.inverse_key = self.key.adjugate();
    }

    fn emit_multiply(&self, ctx: &mut CipherGenContext, matrix: &Matrix4) -> Result<()> {
        let slots: Vec<_> = self
            .data
            .iter()
            .map(|slot| ctx.data_expression(*slot as usize))
            .collect();
        ctx.with_temps(4, |ctx, temps| -> Result<()> {
            for (i, temp) in temps.iter().enumerate() {
                let mut acc = Expression::binary(
                    BinaryOp::Mul,
                    slots[0].clone(),
                    Expression::literal(matrix.get(i, 0)),
                );
                for (j, slot) in slots.iter().enumerate().skip(1) {
                    acc = Expression::binary(
                        BinaryOp::Add,
                        acc,
                        Expression::binary(
                            BinaryOp::Mul,
                            slot.clone(),
                            Expression::literal(matrix.get(i, j)),
                        ),
                    );
                }
                ctx.emit_assign(temp.clone(), acc)?;
            }
            for (slot, temp) in slots.iter().zip(temps) {
                ctx.emit_assign(slot.clone(), temp.clone())?;
            }
            Ok(())
        })
    }

    /// Appends the forward matrix multiply to the context.
    ///
    /// # Errors
    ///
    /// Propagates statement-construction failures from the context.
    pub fn emit(&self, ctx: &mut CipherGenContext) -> Result<()> {
        self.emit_multiply(ctx, &self.key)
    }

    /// Appends the inverse matrix multiply to the context.
    ///
    /// # Errors
    ///
    /// Propagates statement-construction failures from the context.
    pub fn emit_inverse(&self, ctx: &mut CipherGenContext) -> Result<()> {
        self.emit_multiply(ctx, &self.inverse_key)
    }
}

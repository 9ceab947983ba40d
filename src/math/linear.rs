//! Dense linear solves for the drivetrain.
//!
//! Two explicit entry points are kept: [`solve_square`] for the
//! well-determined car system and [`solve_least_squares`] for the
//! over-determined tank system. Neither reports singularity: a pivot that
//! is too small is replaced by [`MIN_PIVOT`] and the solve carries on.

use nalgebra::{DMatrix, DVector};

/// Smallest pivot magnitude accepted during factorization
pub const MIN_PIVOT: f32 = 1.0e-10;

/// In-place LU factorization with partial pivoting
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    /// Packed L (unit diagonal, below) and U (on and above the diagonal)
    lu: DMatrix<f32>,

    /// Row permutation applied to the right hand side
    permutation: Vec<usize>,
}

impl LuDecomposition {
    /// Factorizes a square matrix
    ///
    /// Only the leading square block is used if the matrix is not square.
    pub fn new(a: DMatrix<f32>) -> Self {
        let n = a.nrows().min(a.ncols());
        let mut a = if a.is_square() { a } else { a.resize(n, n, 0.0) };
        let mut permutation: Vec<usize> = (0..n).collect();

        for k in 0..n {
            // Partial pivoting: largest magnitude entry in column k
            let mut pivot_row = k;
            let mut pivot_mag = a[(k, k)].abs();
            for r in (k + 1)..n {
                let mag = a[(r, k)].abs();
                if mag > pivot_mag {
                    pivot_mag = mag;
                    pivot_row = r;
                }
            }
            if pivot_row != k {
                a.swap_rows(k, pivot_row);
                permutation.swap(k, pivot_row);
            }

            if a[(k, k)].abs() < MIN_PIVOT {
                log::trace!("lu: pivot {} at column {} replaced", a[(k, k)], k);
                a[(k, k)] = MIN_PIVOT;
            }

            let pivot = a[(k, k)];
            for r in (k + 1)..n {
                let factor = a[(r, k)] / pivot;
                a[(r, k)] = factor;
                if factor != 0.0 {
                    for c in (k + 1)..n {
                        let v = a[(k, c)];
                        a[(r, c)] -= factor * v;
                    }
                }
            }
        }

        Self { lu: a, permutation }
    }

    /// Returns the dimension of the factorized system
    pub fn dim(&self) -> usize {
        self.permutation.len()
    }

    /// Solves `A x = b` using the stored factors
    pub fn solve(&self, b: &DVector<f32>) -> DVector<f32> {
        let n = self.dim();
        let mut x = DVector::<f32>::from_fn(n, |i, _| b[self.permutation[i]]);

        // Forward substitution with unit lower triangle
        for i in 0..n {
            let mut sum = x[i];
            for j in 0..i {
                sum -= self.lu[(i, j)] * x[j];
            }
            x[i] = sum;
        }

        // Back substitution with upper triangle
        for i in (0..n).rev() {
            let mut sum = x[i];
            for j in (i + 1)..n {
                sum -= self.lu[(i, j)] * x[j];
            }
            x[i] = sum / self.lu[(i, i)];
        }

        x
    }
}

/// Solves the square system `A x = b`
pub fn solve_square(a: &DMatrix<f32>, b: &DVector<f32>) -> DVector<f32> {
    LuDecomposition::new(a.clone()).solve(b)
}

/// Solves the over-determined system `A x ≈ b` in the least-squares sense
///
/// Forms the normal equations `AᵀA x = Aᵀb` and runs the same LU solve on
/// the reduced square system.
pub fn solve_least_squares(a: &DMatrix<f32>, b: &DVector<f32>) -> DVector<f32> {
    let at = a.transpose();
    let ata = &at * a;
    let atb = &at * b;
    LuDecomposition::new(ata).solve(&atb)
}

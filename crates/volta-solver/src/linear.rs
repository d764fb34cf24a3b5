//! Direct dense solve: Gaussian elimination with partial pivoting.

use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};

/// Pivot magnitudes below this abort the solve as singular.
pub const PIVOT_EPSILON: f64 = 1e-12;

/// Solve `Ax = b` by Gaussian elimination with partial pivoting.
///
/// For each column the row with the largest remaining magnitude is swapped
/// into the pivot position; a pivot below [`PIVOT_EPSILON`] yields
/// [`Error::SingularMatrix`]. The inputs are untouched.
pub fn solve_dense(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>> {
    if a.nrows() != a.ncols() {
        return Err(Error::DimensionMismatch {
            expected: a.nrows(),
            actual: a.ncols(),
        });
    }
    if a.nrows() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.nrows(),
            actual: b.len(),
        });
    }

    let n = a.nrows();
    let mut m = a.clone();
    let mut rhs = b.clone();

    // Forward elimination.
    for i in 0..n {
        let mut max_row = i;
        for k in (i + 1)..n {
            if m[(k, i)].abs() > m[(max_row, i)].abs() {
                max_row = k;
            }
        }
        if max_row != i {
            m.swap_rows(i, max_row);
            rhs.swap_rows(i, max_row);
        }

        let pivot = m[(i, i)];
        if pivot.abs() < PIVOT_EPSILON {
            return Err(Error::SingularMatrix);
        }

        for k in (i + 1)..n {
            let factor = m[(k, i)] / pivot;
            if factor == 0.0 {
                continue;
            }
            rhs[k] -= factor * rhs[i];
            for j in i..n {
                m[(k, j)] -= factor * m[(i, j)];
            }
        }
    }

    // Back substitution.
    let mut x = DVector::zeros(n);
    for i in (0..n).rev() {
        let mut sum = rhs[i];
        for j in (i + 1)..n {
            sum -= m[(i, j)] * x[j];
        }
        x[i] = sum / m[(i, i)];
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{dmatrix, dvector};

    #[test]
    fn test_solve_simple() {
        // 2x + y = 5, x + 3y = 6 -> x = 1.8, y = 1.4
        let a = dmatrix![2.0, 1.0; 1.0, 3.0];
        let b = dvector![5.0, 6.0];

        let x = solve_dense(&a, &b).unwrap();

        assert!((x[0] - 1.8).abs() < 1e-10);
        assert!((x[1] - 1.4).abs() < 1e-10);
    }

    #[test]
    fn test_pivoting_handles_zero_diagonal() {
        // Zero leading diagonal entry; solvable only with row swaps.
        let a = dmatrix![0.0, 1.0; 1.0, 0.0];
        let b = dvector![2.0, 3.0];

        let x = solve_dense(&a, &b).unwrap();

        assert!((x[0] - 3.0).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_singular_matrix() {
        let a = dmatrix![1.0, 2.0; 2.0, 4.0];
        let b = dvector![1.0, 2.0];

        let result = solve_dense(&a, &b);
        assert!(matches!(result, Err(Error::SingularMatrix)));
    }

    #[test]
    fn test_pivot_exactly_at_threshold_passes() {
        // The threshold is strict: |pivot| == 1e-12 still solves.
        let a = dmatrix![1e-12];
        let b = dvector![1e-12];

        let x = solve_dense(&a, &b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = dmatrix![1.0, 2.0; 3.0, 4.0];
        let b = dvector![1.0, 2.0, 3.0];

        let result = solve_dense(&a, &b);
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_empty_system() {
        let a = DMatrix::zeros(0, 0);
        let b = DVector::zeros(0);

        let x = solve_dense(&a, &b).unwrap();
        assert_eq!(x.len(), 0);
    }

    #[test]
    fn test_solution_is_deterministic() {
        let a = dmatrix![3.0, 2.0, -1.0; 2.0, -2.0, 4.0; -1.0, 0.5, -1.0];
        let b = dvector![1.0, -2.0, 0.0];

        let x1 = solve_dense(&a, &b).unwrap();
        let x2 = solve_dense(&a, &b).unwrap();

        // Bit-for-bit identical on identical inputs.
        assert_eq!(x1, x2);
    }
}

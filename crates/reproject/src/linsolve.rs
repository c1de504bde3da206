//! Gaussian elimination with partial pivoting over a dense augmented matrix
//! (spec.md §4.6), plus the specific 6-unknown build-and-solve used to derive a
//! triangle's affine source-to-destination map (spec.md §4.5 steps 3–4).

use crate::coord::Coord;

/// Solves `A x = b` given as an augmented `n x (n+1)` matrix (each row is the
/// coefficients followed by the right-hand side), via Gaussian elimination with
/// partial pivoting. Returns `None` when the system is singular to working precision —
/// callers treat that as "drop this triangle," never a propagated error (spec.md §7).
pub fn gaussian_eliminate(augmented: &mut [Vec<f64>]) -> Option<Vec<f64>> {
    let n = augmented.len();
    debug_assert!(augmented.iter().all(|row| row.len() == n + 1));

    for pivot in 0..n {
        let mut max_row = pivot;
        let mut max_val = augmented[pivot][pivot].abs();
        for row in (pivot + 1)..n {
            let val = augmented[row][pivot].abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }
        if max_val < 1e-12 {
            return None;
        }
        if max_row != pivot {
            augmented.swap(pivot, max_row);
        }

        for row in (pivot + 1)..n {
            let factor = augmented[row][pivot] / augmented[pivot][pivot];
            if factor == 0.0 {
                continue;
            }
            for col in pivot..=n {
                augmented[row][col] -= factor * augmented[pivot][col];
            }
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = augmented[row][n];
        for col in (row + 1)..n {
            sum -= augmented[row][col] * x[col];
        }
        x[row] = sum / augmented[row][row];
    }
    Some(x)
}

/// The six coefficients of an affine map `u = a00*x + a01*y + a02`,
/// `v = a10*x + a11*y + a12`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineCoeffs {
    pub a00: f64,
    pub a01: f64,
    pub a02: f64,
    pub a10: f64,
    pub a11: f64,
    pub a12: f64,
}

/// Builds the block-diagonal 6x6 augmented system spec.md §4.5 step 3 describes — two
/// independent 3-row blocks sharing the same `(x, y, 1)` coefficients but solving for
/// `u` and `v` separately — and solves it. `src` and `dst` are the three point
/// correspondences (source-space, destination-pixel-space) of one triangle.
pub fn solve_affine(src: [Coord; 3], dst: [Coord; 3]) -> Option<AffineCoeffs> {
    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(6);
    for i in 0..3 {
        let (x, y) = (src[i].x, src[i].y);
        rows.push(vec![x, y, 1.0, 0.0, 0.0, 0.0, dst[i].x]);
    }
    for i in 0..3 {
        let (x, y) = (src[i].x, src[i].y);
        rows.push(vec![0.0, 0.0, 0.0, x, y, 1.0, dst[i].y]);
    }

    let solved = gaussian_eliminate(&mut rows)?;
    Some(AffineCoeffs {
        a00: solved[0],
        a01: solved[1],
        a02: solved[2],
        a10: solved[3],
        a11: solved[4],
        a12: solved[5],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_mapping_round_trips() {
        let src = [Coord::new(0.0, 0.0), Coord::new(1.0, 0.0), Coord::new(0.0, 1.0)];
        let dst = src;
        let coeffs = solve_affine(src, dst).unwrap();
        assert_relative_eq!(coeffs.a00, 1.0, epsilon = 1e-9);
        assert_relative_eq!(coeffs.a01, 0.0, epsilon = 1e-9);
        assert_relative_eq!(coeffs.a11, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn scale_and_translate_mapping() {
        let src = [Coord::new(0.0, 0.0), Coord::new(1.0, 0.0), Coord::new(0.0, 1.0)];
        let dst = [Coord::new(5.0, 5.0), Coord::new(7.0, 5.0), Coord::new(5.0, 9.0)];
        let coeffs = solve_affine(src, dst).unwrap();
        assert_relative_eq!(coeffs.a00, 2.0, epsilon = 1e-9);
        assert_relative_eq!(coeffs.a02, 5.0, epsilon = 1e-9);
        assert_relative_eq!(coeffs.a11, 4.0, epsilon = 1e-9);
        assert_relative_eq!(coeffs.a12, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn collinear_source_points_are_singular() {
        let src = [Coord::new(0.0, 0.0), Coord::new(1.0, 0.0), Coord::new(2.0, 0.0)];
        let dst = [Coord::new(0.0, 0.0), Coord::new(1.0, 0.0), Coord::new(2.0, 2.0)];
        assert!(solve_affine(src, dst).is_none());
    }
}

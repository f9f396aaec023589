//! Face enumeration for polyhedral cones given by their generators.
//!
//! Algorithm
//! - Normalize generators (columns of the span), drop null ones.
//! - Rank `r` from the eigenvalues of `S Sᵀ`; eigenvectors of the null
//!   eigenvalues become equality rows `±v·x ≤ 0`.
//! - In the `r`-dimensional span, every facet contains `r − 1` independent
//!   generators: walk all `(r − 1)`-subsets, take the normal of their
//!   hyperplane, keep the orientation that leaves every generator on the
//!   non-positive side.
//! - Dedup normals on a quantized grid and lift them back to the full space.

use std::collections::HashSet;

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use tracing::debug;

use crate::cfg::{DET_EPS, FACE_EPS, FACE_QUANTUM, RANK_EPS};

/// Largest ambient dimension handled (wrench space).
const MAX_DIM: usize = 6;

/// Face matrix `F` of the cone generated by the columns of `span`:
/// `{S λ : λ ≥ 0} = {x : F x ≤ 0}`.
///
/// Rows are unit normals. A cone spanning the whole space has no face and
/// yields a `0 × d` matrix; an all-zero span yields `[I; −I]` (the cone `{0}`).
///
/// # Panics
/// If `span` has more than six rows.
pub fn compute_cone_face_matrix(span: &DMatrix<f64>) -> DMatrix<f64> {
    let dim = span.nrows();
    assert!(dim <= MAX_DIM, "cone dimension {dim} is not supported");
    let gens: Vec<DVector<f64>> = span
        .column_iter()
        .filter_map(|c| {
            let norm = c.norm();
            (norm > DET_EPS).then(|| c / norm)
        })
        .collect();
    if gens.is_empty() {
        let eye = DMatrix::<f64>::identity(dim, dim);
        let mut f = DMatrix::zeros(2 * dim, dim);
        f.view_mut((0, 0), (dim, dim)).copy_from(&eye);
        f.view_mut((dim, 0), (dim, dim)).copy_from(&(-eye));
        return f;
    }

    let mut gram = DMatrix::<f64>::zeros(dim, dim);
    for g in &gens {
        gram += g * g.transpose();
    }
    let eig = SymmetricEigen::new(gram);
    let top = eig.eigenvalues.amax();
    let (mut range, mut null) = (Vec::new(), Vec::new());
    for (k, &lambda) in eig.eigenvalues.iter().enumerate() {
        let v = eig.eigenvectors.column(k).into_owned();
        if lambda > RANK_EPS * top {
            range.push(v);
        } else {
            null.push(v);
        }
    }
    let rank = range.len();
    let basis = DMatrix::from_columns(&range);
    let reduced: Vec<DVector<f64>> = gens.iter().map(|g| basis.tr_mul(g)).collect();

    let mut faces: Vec<DVector<f64>> = Vec::new();
    let mut seen: HashSet<[i64; MAX_DIM]> = HashSet::new();
    let mut push_face = |normal: &DVector<f64>| {
        let lifted = &basis * normal;
        if seen.insert(quantize(&lifted)) {
            faces.push(lifted);
        }
    };
    if rank == 1 {
        for s in [1.0, -1.0] {
            let n = DVector::from_element(1, s);
            if reduced.iter().all(|g| n.dot(g) <= FACE_EPS) {
                push_face(&n);
            }
        }
    } else {
        let mut rows = [[0.0; MAX_DIM]; MAX_DIM];
        for_each_combination(reduced.len(), rank - 1, |subset| {
            for (row, &i) in rows.iter_mut().zip(subset) {
                row[..rank].copy_from_slice(reduced[i].as_slice());
            }
            let Some(n) = hyperplane_normal(&rows, rank) else {
                return;
            };
            match side(&n, &reduced) {
                Side::NonPositive => push_face(&n),
                Side::NonNegative => push_face(&(-n)),
                Side::Both => {}
            }
        });
    }
    for v in null {
        faces.push(v.clone());
        faces.push(-v);
    }
    debug!(
        generators = gens.len(),
        rank,
        faces = faces.len(),
        "cone face enumeration"
    );
    let mut f = DMatrix::zeros(faces.len(), dim);
    for (i, face) in faces.iter().enumerate() {
        f.row_mut(i).copy_from(&face.transpose());
    }
    f
}

enum Side {
    NonPositive,
    NonNegative,
    Both,
}

fn side(n: &DVector<f64>, gens: &[DVector<f64>]) -> Side {
    let (mut pos, mut neg) = (false, false);
    for g in gens {
        let d = n.dot(g);
        pos |= d > FACE_EPS;
        neg |= d < -FACE_EPS;
        if pos && neg {
            return Side::Both;
        }
    }
    if pos {
        Side::NonNegative
    } else {
        Side::NonPositive
    }
}

/// Unit normal to the `k − 1` rows of `rows` in dimension `k` (generalized
/// cross product), `None` if the rows are dependent.
fn hyperplane_normal(rows: &[[f64; MAX_DIM]; MAX_DIM], k: usize) -> Option<DVector<f64>> {
    let mut n = DVector::zeros(k);
    let mut minor = [[0.0; MAX_DIM]; MAX_DIM];
    for j in 0..k {
        for (r, row) in rows.iter().take(k - 1).enumerate() {
            let mut c = 0;
            for (col, &x) in row.iter().take(k).enumerate() {
                if col != j {
                    minor[r][c] = x;
                    c += 1;
                }
            }
        }
        let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
        n[j] = sign * determinant(&mut minor, k - 1);
    }
    let norm = n.norm();
    (norm > 1e-10).then(|| n / norm)
}

/// Determinant of the leading `k × k` block, by Gaussian elimination with
/// partial pivoting. Clobbers `m`.
fn determinant(m: &mut [[f64; MAX_DIM]; MAX_DIM], k: usize) -> f64 {
    let mut det = 1.0;
    for col in 0..k {
        let pivot = (col..k)
            .max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))
            .unwrap_or(col);
        if m[pivot][col] == 0.0 {
            return 0.0;
        }
        if pivot != col {
            m.swap(pivot, col);
            det = -det;
        }
        det *= m[col][col];
        for r in col + 1..k {
            let factor = m[r][col] / m[col][col];
            for c in col..k {
                m[r][c] -= factor * m[col][c];
            }
        }
    }
    det
}

/// Calls `f` on every k-subset of `0..n` in lexicographic order.
fn for_each_combination(n: usize, k: usize, mut f: impl FnMut(&[usize])) {
    if k == 0 || k > n {
        return;
    }
    let mut idxs: Vec<usize> = (0..k).collect();
    loop {
        f(&idxs);
        let Some(i) = (0..k).rev().find(|&i| idxs[i] != i + n - k) else {
            return;
        };
        idxs[i] += 1;
        for j in i + 1..k {
            idxs[j] = idxs[j - 1] + 1;
        }
    }
}

fn quantize(v: &DVector<f64>) -> [i64; MAX_DIM] {
    let s = 1.0 / FACE_QUANTUM;
    let mut key = [0; MAX_DIM];
    for (k, x) in key.iter_mut().zip(v.iter()) {
        *k = (x * s).round() as i64;
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combinations_are_lexicographic() {
        let mut seen = Vec::new();
        for_each_combination(4, 2, |c| seen.push(c.to_vec()));
        assert_eq!(
            seen,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        let mut count = 0;
        for_each_combination(3, 4, |_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn determinant_of_permutation() {
        let mut m = [[0.0; MAX_DIM]; MAX_DIM];
        m[0][1] = 1.0;
        m[1][0] = 1.0;
        m[2][2] = 3.0;
        assert_eq!(determinant(&mut m, 3), -3.0);
    }

    #[test]
    fn normal_is_orthogonal_to_rows() {
        let mut rows = [[0.0; MAX_DIM]; MAX_DIM];
        rows[0][..3].copy_from_slice(&[1.0, 2.0, 0.5]);
        rows[1][..3].copy_from_slice(&[-1.0, 0.3, 2.0]);
        let n = hyperplane_normal(&rows, 3).unwrap();
        for row in rows.iter().take(2) {
            let d: f64 = (0..3).map(|j| row[j] * n[j]).sum();
            assert!(d.abs() < 1e-12);
        }
        assert!((n.norm() - 1.0).abs() < 1e-12);
        rows[1] = rows[0];
        assert!(hyperplane_normal(&rows, 3).is_none());
    }
}

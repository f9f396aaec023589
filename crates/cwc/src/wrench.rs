//! Wrench algebra: transport between reference points and frame changes.

use nalgebra::{Matrix3, Matrix6, Vector3, Vector6};

/// Force and moment `(f, τ)` stacked in a 6-vector.
pub type Wrench = Vector6<f64>;

/// Build a wrench from its force and moment parts.
#[inline]
pub fn wrench(force: Vector3<f64>, moment: Vector3<f64>) -> Wrench {
    Wrench::new(force.x, force.y, force.z, moment.x, moment.y, moment.z)
}

#[inline]
pub fn force(w: &Wrench) -> Vector3<f64> {
    w.fixed_rows::<3>(0).into_owned()
}

#[inline]
pub fn moment(w: &Wrench) -> Vector3<f64> {
    w.fixed_rows::<3>(3).into_owned()
}

/// Cross-product matrix: `crossmat(a) * b == a × b`.
#[inline]
pub fn crossmat(a: &Vector3<f64>) -> Matrix3<f64> {
    a.cross_matrix()
}

/// Matrix moving a wrench taken at `from` to the same wrench taken at `to`:
/// `[[I, 0], [crossmat(from − to), I]]`.
pub fn transport_matrix(from: &Vector3<f64>, to: &Vector3<f64>) -> Matrix6<f64> {
    let mut t = Matrix6::identity();
    t.fixed_view_mut::<3, 3>(3, 0)
        .copy_from(&crossmat(&(from - to)));
    t
}

/// `τ_to = τ_from + (from − to) × f`.
#[inline]
pub fn transport(w: &Wrench, from: &Vector3<f64>, to: &Vector3<f64>) -> Wrench {
    let f = force(w);
    wrench(f, moment(w) + (from - to).cross(&f))
}

/// `blockdiag(r, r)`: rotates force and moment alike.
pub fn block_rotation(r: &Matrix3<f64>) -> Matrix6<f64> {
    let mut out = Matrix6::zeros();
    out.fixed_view_mut::<3, 3>(0, 0).copy_from(r);
    out.fixed_view_mut::<3, 3>(3, 3).copy_from(r);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn transport_matches_matrix_form() {
        let w = Wrench::new(1.0, -2.0, 9.0, 0.1, 0.2, -0.3);
        let a = Vector3::new(0.3, -0.1, 0.0);
        let b = Vector3::new(-1.0, 0.5, 0.9);
        assert_relative_eq!(
            transport(&w, &a, &b),
            transport_matrix(&a, &b) * w,
            epsilon = 1e-12
        );
    }

    #[test]
    fn transport_is_transitive_and_invertible() {
        let w = Wrench::new(0.5, 0.0, 3.0, 0.0, 0.0, 0.0);
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(1.0, 0.0, 0.0);
        let c = Vector3::new(0.0, 2.0, 1.0);
        let direct = transport(&w, &a, &c);
        let via_b = transport(&transport(&w, &a, &b), &b, &c);
        assert_relative_eq!(direct, via_b, epsilon = 1e-12);
        assert_relative_eq!(transport(&direct, &c, &a), w, epsilon = 1e-12);
    }

    #[test]
    fn pure_vertical_force_below_point_has_zero_moment() {
        let w = wrench(Vector3::new(0.0, 0.0, 10.0), Vector3::zeros());
        let moved = transport(&w, &Vector3::zeros(), &Vector3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(moment(&moved), Vector3::zeros(), epsilon = 1e-12);
    }
}

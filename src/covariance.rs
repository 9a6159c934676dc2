//! Propagation of uncertainty through a change of basis.
//!
//! A covariance matrix `Σ` of a quantity expressed in one frame becomes `R Σ Rᵀ` when the quantity
//! is rotated into another frame by the rotation matrix `R`. Since `R` is orthonormal, `Rᵀ = R⁻¹`,
//! which makes this a conjugation: the eigenvalues (ie, the "size" of the uncertainty) are
//! untouched, only the principal axes turn with the frame.

use crate::UnitQuaternion;
use nalgebra::{Matrix3, Matrix6};

/// A 3×3 covariance matrix, stored as 9 values in row-major order.
pub type Covariance3 = [f64; 9];

/// A 6×6 covariance matrix, stored as rows.
pub type Covariance6 = [[f64; 6]; 6];

/// Rotates a 3×3 covariance matrix into the frame reached by `rotation`.
///
/// Computes `R · cov · Rᵀ` where `R` is the rotation matrix equivalent of `rotation`. Because
/// `rotation` is a [`UnitQuaternion`], `R` is orthonormal and `Rᵀ` is its inverse.
///
/// A symmetric input produces an output that is symmetric up to floating point rounding. Nothing
/// forces the output to be exactly symmetric.
///
/// ```
/// use framewise::covariance::rotate_covariance;
/// use nalgebra::{UnitQuaternion, Vector3};
///
/// // uncertainty only along X
/// let cov = [4., 0., 0., 0., 0., 0., 0., 0., 0.];
/// // a quarter turn about Z turns X into Y
/// let r = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
/// let rotated = rotate_covariance(&cov, &r);
/// assert!((rotated[4] - 4.).abs() < 1e-12);
/// assert!(rotated[0].abs() < 1e-12);
/// ```
#[must_use]
pub fn rotate_covariance(covariance: &Covariance3, rotation: &UnitQuaternion) -> Covariance3 {
    let r = rotation.to_rotation_matrix().into_inner();
    let cov = Matrix3::from_row_slice(covariance);
    let rotated = r * cov * r.transpose();

    let mut out = [0.; 9];
    for (row, chunk) in out.chunks_exact_mut(3).enumerate() {
        for (col, value) in chunk.iter_mut().enumerate() {
            *value = rotated[(row, col)];
        }
    }
    out
}

/// Rotates a 6×6 pose covariance into the frame reached by `rotation`.
///
/// The pose covariance consists of four 3×3 blocks (position/position, position/rotation,
/// rotation/position, rotation/rotation), each of which lives in the frame's axes and is
/// conjugated by the same `R` independently. The translation between the frames does not enter
/// into the result.
#[must_use]
pub fn rotate_pose_covariance(covariance: &Covariance6, rotation: &UnitQuaternion) -> Covariance6 {
    let r = rotation.to_rotation_matrix().into_inner();
    let cov = Matrix6::from_fn(|row, col| covariance[row][col]);

    let mut rotated = Matrix6::zeros();
    for block_row in [0, 3] {
        for block_col in [0, 3] {
            let block = cov.fixed_view::<3, 3>(block_row, block_col);
            rotated
                .fixed_view_mut::<3, 3>(block_row, block_col)
                .copy_from(&(r * block * r.transpose()));
        }
    }

    let mut out = [[0.; 6]; 6];
    for (row, values) in out.iter_mut().enumerate() {
        for (col, value) in values.iter_mut().enumerate() {
            *value = rotated[(row, col)];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{rotate_covariance, rotate_pose_covariance, Covariance3, Covariance6};
    use crate::UnitQuaternion;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Vector3};
    use quickcheck::{quickcheck, Arbitrary};
    use rstest::rstest;
    use std::f64::consts::{FRAC_PI_2, PI};

    const DIAGONAL: Covariance3 = [1., 0., 0., 0., 2., 0., 0., 0., 3.];

    fn about(axis: [f64; 3], angle: f64) -> UnitQuaternion {
        UnitQuaternion::from_axis_angle(
            &nalgebra::Unit::new_normalize(Vector3::from(axis)),
            angle,
        )
    }

    fn assert_symmetric(cov: &Covariance3) {
        let m = Matrix3::from_row_slice(cov);
        let scale = m.abs().max().max(1.);
        assert_relative_eq!(m, m.transpose(), epsilon = 1e-9 * scale);
    }

    #[test]
    fn identity_leaves_covariance_alone() {
        let cov = [1., 0.5, 0.25, 0.5, 2., 0.125, 0.25, 0.125, 3.];
        assert_relative_eq!(
            rotate_covariance(&cov, &UnitQuaternion::identity())[..],
            cov[..]
        );
    }

    #[rstest]
    // quarter turn about Z swaps the X and Y variances
    #[case([0., 0., 1.], FRAC_PI_2, [2., 0., 0., 0., 1., 0., 0., 0., 3.])]
    // quarter turn about X swaps the Y and Z variances
    #[case([1., 0., 0.], FRAC_PI_2, [1., 0., 0., 0., 3., 0., 0., 0., 2.])]
    // half turns flip axes, and variance doesn't care about sign
    #[case([0., 1., 0.], PI, DIAGONAL)]
    fn rotates_principal_axes(
        #[case] axis: [f64; 3],
        #[case] angle: f64,
        #[case] expected: Covariance3,
    ) {
        let rotated = rotate_covariance(&DIAGONAL, &about(axis, angle));
        assert_relative_eq!(rotated[..], expected[..], epsilon = 1e-12);
    }

    #[test]
    fn diagonal_eighth_turn_produces_correlation() {
        // variance 1 along X, 0 elsewhere; rotate 45° about Z to get X+Y correlation
        let cov = [1., 0., 0., 0., 0., 0., 0., 0., 0.];
        let rotated = rotate_covariance(&cov, &about([0., 0., 1.], PI / 4.));
        assert_relative_eq!(
            rotated[..],
            [0.5, 0.5, 0., 0.5, 0.5, 0., 0., 0., 0.][..],
            epsilon = 1e-12
        );
    }

    #[test]
    fn trace_is_preserved() {
        let cov = [2., 0.3, -0.1, 0.3, 1., 0.2, -0.1, 0.2, 0.5];
        let rotated = rotate_covariance(&cov, &about([1., 2., 3.], 0.7));
        assert_relative_eq!(
            rotated[0] + rotated[4] + rotated[8],
            cov[0] + cov[4] + cov[8],
            epsilon = 1e-12
        );
    }

    #[test]
    fn pose_covariance_blocks_rotate_independently() {
        let mut cov: Covariance6 = [[0.; 6]; 6];
        // position variance along X, rotation variance along Y, position X / rotation Y cross term
        cov[0][0] = 1.;
        cov[4][4] = 2.;
        cov[0][4] = 0.5;
        cov[4][0] = 0.5;

        let rotated = rotate_pose_covariance(&cov, &about([0., 0., 1.], FRAC_PI_2));

        let mut expected: Covariance6 = [[0.; 6]; 6];
        // X -> Y, Y -> -X
        expected[1][1] = 1.;
        expected[3][3] = 2.;
        expected[1][3] = -0.5;
        expected[3][1] = -0.5;

        for (row, expected_row) in rotated.iter().zip(&expected) {
            assert_relative_eq!(row[..], expected_row[..], epsilon = 1e-12);
        }
    }

    /// A symmetric 3×3 matrix and a rotation, built from whatever quickcheck gives us.
    #[derive(Clone, Debug)]
    struct SymmetricCase {
        covariance: Covariance3,
        rotation: UnitQuaternion,
    }

    impl Arbitrary for SymmetricCase {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            // quickcheck will give us awkward f64 values -- we ignore those
            let mut sane = || loop {
                match f64::arbitrary(g) {
                    0. => break 0.,
                    f if f.is_normal() => break f.rem_euclid(100.) - 50.,
                    _ => {}
                }
            };
            let [a, b, c, d, e, f] = [sane(), sane(), sane(), sane(), sane(), sane()];
            let axis = Vector3::new(sane(), sane(), sane());
            let angle = sane();
            let rotation = nalgebra::Unit::try_new(axis, 1e-6)
                .map(|axis| UnitQuaternion::from_axis_angle(&axis, angle))
                .unwrap_or_else(UnitQuaternion::identity);
            Self {
                covariance: [a, b, c, b, d, e, c, e, f],
                rotation,
            }
        }
    }

    quickcheck! {
        fn rotation_preserves_symmetry(case: SymmetricCase) -> () {
            assert_symmetric(&rotate_covariance(&case.covariance, &case.rotation));
        }

        fn rotating_back_restores_covariance(case: SymmetricCase) -> () {
            let there = rotate_covariance(&case.covariance, &case.rotation);
            let back = rotate_covariance(&there, &case.rotation.inverse());
            assert_relative_eq!(back[..], case.covariance[..], epsilon = 1e-9);
        }
    }
}

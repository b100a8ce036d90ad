//! Small geometry helpers layered on top of nalgebra.
//!
//! Rotations here are all right-handed: a positive angle about an axis turns
//! counter-clockwise when looking down that axis towards the origin.

use nalgebra::{Matrix4, Unit, UnitQuaternion, Vector3};

/// Below this length a vector is treated as zero.
const EPSILON: f32 = 1e-6;

/// One of the three principal axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub(crate) const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub(crate) fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub(crate) fn unit(self) -> Vector3<f32> {
        let mut v = Vector3::zeros();
        v[self.index()] = 1.0;
        v
    }
}

/// Builds a rotation about a principal axis from an explicit sine and cosine.
///
/// Taking `sin`/`cos` instead of an angle lets quarter turns use exact
/// `0.0`/`±1.0` entries, so baking many turns into a transform never drifts.
#[rustfmt::skip]
pub(crate) fn axis_rotation(axis: Axis, sin: f32, cos: f32) -> Matrix4<f32> {
    match axis {
        Axis::X => Matrix4::new(
            1.0, 0.0,  0.0, 0.0,
            0.0, cos, -sin, 0.0,
            0.0, sin,  cos, 0.0,
            0.0, 0.0,  0.0, 1.0,
        ),
        Axis::Y => Matrix4::new(
             cos, 0.0, sin, 0.0,
             0.0, 1.0, 0.0, 0.0,
            -sin, 0.0, cos, 0.0,
             0.0, 0.0, 0.0, 1.0,
        ),
        Axis::Z => Matrix4::new(
            cos, -sin, 0.0, 0.0,
            sin,  cos, 0.0, 0.0,
            0.0,  0.0, 1.0, 0.0,
            0.0,  0.0, 0.0, 1.0,
        ),
    }
}

/// Rotation by `angle` radians about `sign * axis`.
pub(crate) fn rotation_about(axis: Axis, sign: f32, angle: f32) -> Matrix4<f32> {
    axis_rotation(axis, sign * angle.sin(), angle.cos())
}

/// Exact 90° rotation about `sign * axis`.
pub(crate) fn quarter_turn(axis: Axis, sign: f32) -> Matrix4<f32> {
    axis_rotation(axis, sign.signum(), 0.0)
}

/// Index of the component with the largest magnitude. Ties go to the earlier
/// axis.
pub(crate) fn dominant_axis(v: &Vector3<f32>) -> Axis {
    let mut best = Axis::X;
    for axis in Axis::ALL {
        if v[axis.index()].abs() > v[best.index()].abs() {
            best = axis;
        }
    }
    best
}

/// Keeps only the dominant component of `v` and normalises it, snapping an
/// imprecise direction onto one of the six signed axes.
///
/// Returns `None` for a (near) zero vector.
pub(crate) fn snap_to_axis(v: &Vector3<f32>) -> Option<Vector3<f32>> {
    if v.norm() < EPSILON {
        return None;
    }
    let axis = dominant_axis(v);
    Some(axis.unit() * v[axis.index()].signum())
}

/// Rotation carrying the direction of `from` onto the direction of `to`.
///
/// Both points are expected on the arcball sphere. Identical or opposite
/// points have no well-defined axis and yield the identity.
pub(crate) fn arcball_rotation(from: &Vector3<f32>, to: &Vector3<f32>) -> UnitQuaternion<f32> {
    let lengths = from.norm() * to.norm();
    if lengths < EPSILON {
        return UnitQuaternion::identity();
    }
    let Some(axis) = Unit::try_new(from.cross(to), EPSILON) else {
        return UnitQuaternion::identity();
    };
    let theta = (from.dot(to) / lengths).clamp(-1.0, 1.0).acos();
    UnitQuaternion::from_axis_angle(&axis, theta)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use approx::assert_abs_diff_eq;
    use nalgebra::{Rotation3, Vector4};

    use super::*;

    #[test]
    fn quarter_turns_match_nalgebra_rotations() {
        for axis in Axis::ALL {
            for sign in [1.0, -1.0] {
                let expected =
                    Rotation3::from_axis_angle(&Unit::new_normalize(axis.unit() * sign), FRAC_PI_2)
                        .to_homogeneous();
                assert_abs_diff_eq!(quarter_turn(axis, sign), expected, epsilon = 1e-6);
                assert_abs_diff_eq!(
                    rotation_about(axis, sign, FRAC_PI_2),
                    expected,
                    epsilon = 1e-6
                );
            }
        }
    }

    #[test]
    fn quarter_turn_entries_are_exact() {
        let m = quarter_turn(Axis::Y, 1.0);
        // x -> -z and z -> x under a positive turn about y.
        assert_eq!(m * Vector4::new(1.0, 0.0, 0.0, 1.0), Vector4::new(0.0, 0.0, -1.0, 1.0));
        assert_eq!(m * Vector4::new(0.0, 0.0, 1.0, 1.0), Vector4::new(1.0, 0.0, 0.0, 1.0));
        assert!(m.iter().all(|&e| e == 0.0 || e.abs() == 1.0));
    }

    #[test]
    fn snapping_keeps_dominant_component() {
        assert_eq!(
            snap_to_axis(&Vector3::new(0.3, -4.0, 1.0)),
            Some(Vector3::new(0.0, -1.0, 0.0))
        );
        assert_eq!(
            snap_to_axis(&Vector3::new(2.0, 2.0, -1.0)),
            Some(Vector3::new(1.0, 0.0, 0.0))
        );
        assert_eq!(snap_to_axis(&Vector3::zeros()), None);
    }

    #[test]
    fn arcball_rotation_maps_from_onto_to() {
        let from = Vector3::new(0.0, 0.0, 1.0);
        let to = Vector3::new(0.6, 0.0, 0.8);
        let q = arcball_rotation(&from, &to);
        assert_abs_diff_eq!(q * from, to, epsilon = 1e-5);

        assert_eq!(arcball_rotation(&from, &from), UnitQuaternion::identity());
    }
}

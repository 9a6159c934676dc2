//! The common ("message") representation of transformable data.
//!
//! These are plain-old-data mirrors of the shapes that travel between components: three reals for
//! a point, four for a quaternion, and so on, with no invariants attached. Application-side
//! representations (nalgebra types, your own structs) connect to each other _through_ these types
//! rather than directly; see [`convert`](crate::convert) for how that works.
//!
//! Every message type here is also [`Transformable`](crate::Transformable), and can be tagged with
//! a time and frame by wrapping it in a [`Stamped`](crate::Stamped).

use std::fmt::{self, Display, Formatter};

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A position in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A direction with magnitude in 3D space (eg, a velocity or a force).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A rotation as quaternion components.
///
/// Nothing guarantees that a `Quaternion` has unit norm; conversion into a
/// [`UnitQuaternion`](nalgebra::UnitQuaternion) normalizes it.
///
/// Note that the default value is the identity rotation, not the all-zeros quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self {
            x: 0.,
            y: 0.,
            z: 0.,
            w: 1.,
        }
    }
}

/// A position and orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    pub position: Point,
    pub orientation: Quaternion,
}

/// A [`Pose`] with its uncertainty.
///
/// The covariance is over `[x, y, z, rotation about X, rotation about Y, rotation about Z]`, with
/// the rotations expressed as a rotation vector in the tangent space of the orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoseWithCovariance {
    pub pose: Pose,
    pub covariance: [[f64; 6]; 6],
}

/// The translation and rotation between two frames.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transform {
    pub translation: Vector3,
    pub rotation: Quaternion,
}

/// A force and torque acting on a body.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Wrench {
    pub force: Vector3,
    pub torque: Vector3,
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl Display for Vector3 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

impl Display for Quaternion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}i + {}j + {}k", self.w, self.x, self.y, self.z)
    }
}

// all the message types compare component-wise, so we generate the approx impls rather than
// spell out the same field walk a dozen times.
#[cfg(any(test, feature = "approx"))]
macro_rules! componentwise_approx {
    ($name:ty { $($field:ident),+ }) => {
        impl AbsDiffEq<Self> for $name {
            type Epsilon = <f64 as AbsDiffEq>::Epsilon;

            fn default_epsilon() -> Self::Epsilon {
                f64::default_epsilon()
            }

            fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
                $(self.$field.abs_diff_eq(&other.$field, epsilon))&&+
            }
        }

        impl RelativeEq for $name {
            fn default_max_relative() -> Self::Epsilon {
                f64::default_max_relative()
            }

            fn relative_eq(
                &self,
                other: &Self,
                epsilon: Self::Epsilon,
                max_relative: Self::Epsilon,
            ) -> bool {
                $(self.$field.relative_eq(&other.$field, epsilon, max_relative))&&+
            }
        }
    };
}

#[cfg(any(test, feature = "approx"))]
componentwise_approx!(Point { x, y, z });
#[cfg(any(test, feature = "approx"))]
componentwise_approx!(Vector3 { x, y, z });
#[cfg(any(test, feature = "approx"))]
componentwise_approx!(Quaternion { x, y, z, w });
#[cfg(any(test, feature = "approx"))]
componentwise_approx!(Pose {
    position,
    orientation
});
#[cfg(any(test, feature = "approx"))]
componentwise_approx!(Transform {
    translation,
    rotation
});
#[cfg(any(test, feature = "approx"))]
componentwise_approx!(Wrench { force, torque });

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for PoseWithCovariance {
    type Epsilon = <f64 as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.pose.abs_diff_eq(&other.pose, epsilon)
            && self
                .covariance
                .iter()
                .flatten()
                .zip(other.covariance.iter().flatten())
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for PoseWithCovariance {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.pose.relative_eq(&other.pose, epsilon, max_relative)
            && self
                .covariance
                .iter()
                .flatten()
                .zip(other.covariance.iter().flatten())
                .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}

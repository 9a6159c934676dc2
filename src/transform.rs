use crate::convert::{to_msg, FromMsg, ToMsg};
use crate::covariance::rotate_pose_covariance;
use crate::error::Error;
use crate::msg;
use crate::stamped::{FrameStamped, Stamped};
use crate::time::Timestamp;
use crate::{Isometry3, Point3, UnitQuaternion, Vector3};
use nalgebra::{Quaternion, Translation3};
use std::fmt::{self, Display, Formatter};
use tracing::debug;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How far from unit norm a quaternion may be before normalizing it is worth mentioning.
const NORM_TOLERANCE: f64 = 1e-6;

/// Quaternions with a norm at or below this cannot be normalized meaningfully.
const DEGENERATE_NORM: f64 = 1e-9;

/// A rotation followed by a translation that takes values expressed in one coordinate frame (the
/// _source_ frame) to the equivalent values expressed in another (the _target_ frame), as of a
/// particular point in time.
///
/// Where the transform comes from (a frame graph, a calibration file, a localization system) is
/// of no concern here; a `RigidTransform` is simply applied to data with [`transform`](Self::transform)
/// or the [`Transformable`] methods. The data ends up tagged with the target frame and the
/// transform's timestamp.
///
/// The rotation is held as a [`UnitQuaternion`], so every `RigidTransform` is a proper rigid body
/// motion. Use [`RigidTransform::try_from_components`] to construct one from quaternion components
/// that may not be normalized.
///
/// ```
/// use framewise::{msg, RigidTransform, Stamped, Timestamp};
/// use nalgebra::{UnitQuaternion, Vector3};
///
/// let sensor_to_base = RigidTransform::new(
///     "sensor",
///     "base_link",
///     Timestamp::from_nanos(42),
///     Vector3::new(0., 0., 1.),
///     UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2),
/// );
///
/// let p = Stamped::new(msg::Point { x: 1., y: 0., z: 0. }, Timestamp::from_nanos(40), "sensor");
/// let q = sensor_to_base.transform(&p);
/// assert!((q.x - 0.).abs() < 1e-12);
/// assert!((q.y - 1.).abs() < 1e-12);
/// assert!((q.z - 1.).abs() < 1e-12);
/// assert_eq!(q.frame_id(), "base_link");
/// assert_eq!(q.stamp(), Timestamp::from_nanos(42));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidTransform {
    inner: Isometry3,
    stamp: Timestamp,
    source_frame: String,
    target_frame: String,
}

impl RigidTransform {
    /// Constructs a transform that first applies `rotation` and then `translation`.
    ///
    /// Both are expressed in the target frame; `translation` is where the source frame's origin
    /// lies in the target frame.
    #[must_use]
    pub fn new(
        source_frame: impl Into<String>,
        target_frame: impl Into<String>,
        stamp: Timestamp,
        translation: Vector3,
        rotation: UnitQuaternion,
    ) -> Self {
        Self::from_isometry(
            source_frame,
            target_frame,
            stamp,
            Isometry3::from_parts(Translation3::from(translation), rotation),
        )
    }

    #[must_use]
    pub fn from_isometry(
        source_frame: impl Into<String>,
        target_frame: impl Into<String>,
        stamp: Timestamp,
        isometry: Isometry3,
    ) -> Self {
        Self {
            inner: isometry,
            stamp,
            source_frame: source_frame.into(),
            target_frame: target_frame.into(),
        }
    }

    /// A transform that leaves values unchanged, but re-tags them with `target_frame` and `stamp`.
    #[must_use]
    pub fn identity(
        source_frame: impl Into<String>,
        target_frame: impl Into<String>,
        stamp: Timestamp,
    ) -> Self {
        Self::from_isometry(source_frame, target_frame, stamp, Isometry3::identity())
    }

    /// Constructs a transform from a rotation quaternion that is not necessarily of unit length.
    ///
    /// The quaternion is normalized. If its norm is so close to zero that it describes no
    /// rotation at all, [`Error::DegenerateRotation`] is returned instead.
    ///
    /// ```
    /// use framewise::{RigidTransform, Timestamp};
    /// use nalgebra::{Quaternion, UnitQuaternion, Vector3};
    ///
    /// let t = RigidTransform::try_from_components(
    ///     "a",
    ///     "b",
    ///     Timestamp::ZERO,
    ///     Vector3::zeros(),
    ///     Quaternion::new(2., 0., 0., 0.),
    /// )
    /// .unwrap();
    /// assert_eq!(t.rotation(), UnitQuaternion::identity());
    ///
    /// assert!(RigidTransform::try_from_components(
    ///     "a",
    ///     "b",
    ///     Timestamp::ZERO,
    ///     Vector3::zeros(),
    ///     Quaternion::new(0., 0., 0., 0.),
    /// )
    /// .is_err());
    /// ```
    pub fn try_from_components(
        source_frame: impl Into<String>,
        target_frame: impl Into<String>,
        stamp: Timestamp,
        translation: Vector3,
        rotation: Quaternion<f64>,
    ) -> Result<Self, Error> {
        let norm = rotation.norm();
        let Some(unit) = UnitQuaternion::try_new(rotation, DEGENERATE_NORM) else {
            return Err(Error::DegenerateRotation {
                w: rotation.w,
                x: rotation.i,
                y: rotation.j,
                z: rotation.k,
            });
        };
        if (norm - 1.).abs() > NORM_TOLERANCE {
            debug!(norm, "normalized non-unit rotation quaternion");
        }
        Ok(Self::new(
            source_frame,
            target_frame,
            stamp,
            translation,
            unit,
        ))
    }

    /// Constructs a transform from its message representation.
    ///
    /// The message's frame is taken as the target frame; the frame the transform comes _from_ is
    /// not part of the message and so is given separately.
    pub fn from_msg(
        msg: &Stamped<msg::Transform>,
        source_frame: impl Into<String>,
    ) -> Result<Self, Error> {
        Self::try_from_components(
            source_frame,
            msg.frame_id(),
            msg.stamp(),
            Vector3::from_msg(&msg.translation),
            Quaternion::from_msg(&msg.rotation),
        )
    }

    /// Produces the message representation of the transform, stamped with the target frame.
    ///
    /// The source frame is not included; see [`RigidTransform::from_msg`].
    #[must_use]
    pub fn to_msg(&self) -> Stamped<msg::Transform> {
        Stamped::new(self.inner.to_msg(), self.stamp, self.target_frame.as_str())
    }

    #[must_use]
    pub fn stamp(&self) -> Timestamp {
        self.stamp
    }

    /// The frame values are expressed in before the transform is applied.
    #[must_use]
    pub fn source_frame(&self) -> &str {
        &self.source_frame
    }

    /// The frame values are expressed in after the transform is applied.
    #[must_use]
    pub fn target_frame(&self) -> &str {
        &self.target_frame
    }

    /// The position of the source frame's origin, expressed in the target frame.
    #[must_use]
    pub fn translation(&self) -> Vector3 {
        self.inner.translation.vector
    }

    #[must_use]
    pub fn rotation(&self) -> UnitQuaternion {
        self.inner.rotation
    }

    #[must_use]
    pub fn isometry(&self) -> &Isometry3 {
        &self.inner
    }

    /// Transforms a point, ie, applies both rotation and translation.
    #[must_use]
    pub fn transform_point(&self, point: &Point3) -> Point3 {
        self.inner.transform_point(point)
    }

    /// Transforms a free vector (a direction, velocity, force, ...), ie, applies only the rotation.
    ///
    /// ```
    /// use framewise::{RigidTransform, Timestamp};
    /// use nalgebra::{Point3, UnitQuaternion, Vector3};
    ///
    /// let shift = RigidTransform::new(
    ///     "a",
    ///     "b",
    ///     Timestamp::ZERO,
    ///     Vector3::new(1., 0., 0.),
    ///     UnitQuaternion::identity(),
    /// );
    /// assert_eq!(shift.transform_point(&Point3::origin()), Point3::new(1., 0., 0.));
    /// assert_eq!(shift.rotate_vector(&Vector3::zeros()), Vector3::zeros());
    /// ```
    #[must_use]
    pub fn rotate_vector(&self, vector: &Vector3) -> Vector3 {
        self.inner.rotation.transform_vector(vector)
    }

    /// Returns the equal-but-opposite transform to this one.
    ///
    /// That is, a transform _from_ this transform's target frame _into_ its source frame.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            inner: self.inner.inverse(),
            stamp: self.stamp,
            source_frame: self.target_frame.clone(),
            target_frame: self.source_frame.clone(),
        }
    }

    /// Chains two transforms to produce a new transform that goes directly from this transform's
    /// source frame to `next`'s target frame.
    ///
    /// The result carries `next`'s stamp. Whether `next` actually starts where `self` ends is not
    /// checked.
    #[must_use]
    pub fn and_then(&self, next: &Self) -> Self {
        Self {
            inner: next.inner * self.inner,
            stamp: next.stamp,
            source_frame: self.source_frame.clone(),
            target_frame: next.target_frame.clone(),
        }
    }

    /// Applies this transform to `data`, producing a copy of it in the target frame.
    #[must_use]
    pub fn transform<T>(&self, data: &T) -> T
    where
        T: Transformable + Clone,
    {
        data.transformed(self)
    }
}

impl FrameStamped for RigidTransform {
    fn stamp(&self) -> Timestamp {
        self.stamp
    }

    /// The target frame.
    fn frame_id(&self) -> &str {
        &self.target_frame
    }
}

impl Display for RigidTransform {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} @ {}: Translation: {}, Rotation: {}",
            self.source_frame,
            self.target_frame,
            self.stamp,
            to_msg(&self.translation()),
            to_msg(&self.rotation()),
        )
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for RigidTransform {
    type Epsilon = <f64 as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        Isometry3::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.stamp == other.stamp
            && self.source_frame == other.source_frame
            && self.target_frame == other.target_frame
            && self.inner.abs_diff_eq(&other.inner, epsilon)
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for RigidTransform {
    fn default_max_relative() -> Self::Epsilon {
        Isometry3::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.stamp == other.stamp
            && self.source_frame == other.source_frame
            && self.target_frame == other.target_frame
            && self.inner.relative_eq(&other.inner, epsilon, max_relative)
    }
}

/// Data that can be moved between coordinate frames by a [`RigidTransform`].
///
/// How a transform applies depends on what the data _is_: points are rotated and translated,
/// free vectors only rotated, orientations composed with the rotation, covariances conjugated
/// by it. Frame-tagged types (such as [`Stamped`]) additionally take on the transform's target
/// frame and stamp.
///
/// Implementors only need to provide [`transform_into`](Self::transform_into); the other two
/// methods are expressed in terms of it.
///
/// ```
/// use framewise::{msg, RigidTransform, Timestamp, Transformable};
/// use nalgebra::{UnitQuaternion, Vector3};
///
/// let shift = RigidTransform::new(
///     "a",
///     "b",
///     Timestamp::ZERO,
///     Vector3::new(1., 0., 0.),
///     UnitQuaternion::identity(),
/// );
///
/// // points move...
/// let p = msg::Point { x: 0., y: 0., z: 0. }.transformed(&shift);
/// assert_eq!(p, msg::Point { x: 1., y: 0., z: 0. });
///
/// // ...but directions don't
/// let v = msg::Vector3 { x: 0., y: 0., z: 0. }.transformed(&shift);
/// assert_eq!(v, msg::Vector3 { x: 0., y: 0., z: 0. });
/// ```
pub trait Transformable {
    /// Writes the result of applying `transform` to `self` into `out`.
    ///
    /// Whatever `out` held before is overwritten.
    fn transform_into(&self, out: &mut Self, transform: &RigidTransform);

    /// Replaces `self` with the result of applying `transform` to it.
    fn transform_in_place(&mut self, transform: &RigidTransform)
    where
        Self: Clone,
    {
        let input = self.clone();
        input.transform_into(self, transform);
    }

    /// Returns the result of applying `transform` to `self`.
    #[must_use]
    fn transformed(&self, transform: &RigidTransform) -> Self
    where
        Self: Clone,
    {
        let mut out = self.clone();
        self.transform_into(&mut out, transform);
        out
    }
}

impl<T> Transformable for Stamped<T>
where
    T: Transformable,
{
    fn transform_into(&self, out: &mut Self, transform: &RigidTransform) {
        (**self).transform_into(&mut **out, transform);
        out.set_metadata(transform.stamp(), transform.target_frame());
    }
}

impl Transformable for Point3 {
    fn transform_into(&self, out: &mut Self, transform: &RigidTransform) {
        *out = transform.transform_point(self);
    }
}

impl Transformable for Vector3 {
    fn transform_into(&self, out: &mut Self, transform: &RigidTransform) {
        *out = transform.rotate_vector(self);
    }
}

impl Transformable for UnitQuaternion {
    fn transform_into(&self, out: &mut Self, transform: &RigidTransform) {
        *out = transform.rotation() * self;
    }
}

impl Transformable for Isometry3 {
    fn transform_into(&self, out: &mut Self, transform: &RigidTransform) {
        *out = transform.isometry() * self;
    }
}

impl Transformable for msg::Point {
    fn transform_into(&self, out: &mut Self, transform: &RigidTransform) {
        *out = transform.transform_point(&Point3::from_msg(self)).to_msg();
    }
}

impl Transformable for msg::Vector3 {
    fn transform_into(&self, out: &mut Self, transform: &RigidTransform) {
        *out = transform.rotate_vector(&Vector3::from_msg(self)).to_msg();
    }
}

impl Transformable for msg::Quaternion {
    /// Premultiplies by the transform's rotation.
    ///
    /// The message quaternion is used as-is; if it was not of unit length, neither is the result.
    fn transform_into(&self, out: &mut Self, transform: &RigidTransform) {
        *out = (transform.rotation().quaternion() * Quaternion::from_msg(self)).to_msg();
    }
}

impl Transformable for msg::Pose {
    fn transform_into(&self, out: &mut Self, transform: &RigidTransform) {
        self.position.transform_into(&mut out.position, transform);
        self.orientation
            .transform_into(&mut out.orientation, transform);
    }
}

impl Transformable for msg::PoseWithCovariance {
    fn transform_into(&self, out: &mut Self, transform: &RigidTransform) {
        self.pose.transform_into(&mut out.pose, transform);
        out.covariance = rotate_pose_covariance(&self.covariance, &transform.rotation());
    }
}

impl Transformable for msg::Transform {
    fn transform_into(&self, out: &mut Self, transform: &RigidTransform) {
        // the translation of a transform is the position of an origin, so it moves like a point
        let origin = transform.transform_point(&Point3::from(Vector3::from_msg(&self.translation)));
        out.translation = origin.coords.to_msg();
        self.rotation.transform_into(&mut out.rotation, transform);
    }
}

impl Transformable for msg::Wrench {
    fn transform_into(&self, out: &mut Self, transform: &RigidTransform) {
        self.force.transform_into(&mut out.force, transform);
        self.torque.transform_into(&mut out.torque, transform);
    }
}

impl Transformable for RigidTransform {
    /// Re-expresses the transform's target frame in `transform`'s target frame.
    ///
    /// The source frame is left as it was.
    fn transform_into(&self, out: &mut Self, transform: &RigidTransform) {
        out.inner = transform.inner * self.inner;
        out.stamp = transform.stamp;
        out.source_frame.clone_from(&self.source_frame);
        out.target_frame.clone_from(&transform.target_frame);
    }
}

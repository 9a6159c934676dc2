//! Conversions between representations of the same data, routed through the message types.
//!
//! Any given quantity tends to exist in several shapes in a program: a point may be a
//! [`nalgebra::Point3`], a [`msg::Point`] on the way in or out, or an application's own struct.
//! Writing a conversion between every pair of those shapes does not scale, so instead each
//! representation only describes how it converts to and from a _common_ representation (one of the
//! types in [`msg`]) through [`ToMsg`] and [`FromMsg`]. Two representations that share a common
//! representation can then be connected by registering a type map:
//!
//! - [`message_type_map!`](crate::message_type_map) connects a representation directly to its
//!   message type, both ways;
//! - [`bidirectional_type_map!`](crate::bidirectional_type_map) connects two representations
//!   through a shared message type, both ways; and
//! - [`unidirectional_type_map!`](crate::unidirectional_type_map) connects them in one direction
//!   only, for when only one side can produce the message and only the other can consume it.
//!
//! Each registration is an implementation of [`Convert`], so which conversions exist is decided
//! entirely at compile time. Converting along a path that was never registered does not compile:
//!
//! ```compile_fail
//! use framewise::convert::convert;
//! use nalgebra::Point3;
//!
//! // `[f64; 3] -> Point3` is registered, but only in that direction
//! let mut array = [0.; 3];
//! convert(&Point3::new(1., 2., 3.), &mut array);
//! ```
//!
//! Every type also converts into itself by copy.
//!
//! # Registering a new representation
//!
//! ```
//! use framewise::convert::{convert, FromMsg, ToMsg};
//! use framewise::msg;
//! use nalgebra::Vector3;
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Displacement {
//!     dx: f64,
//!     dy: f64,
//!     dz: f64,
//! }
//!
//! impl ToMsg<msg::Vector3> for Displacement {
//!     fn to_msg(&self) -> msg::Vector3 {
//!         msg::Vector3 { x: self.dx, y: self.dy, z: self.dz }
//!     }
//! }
//!
//! impl FromMsg<msg::Vector3> for Displacement {
//!     fn from_msg(m: &msg::Vector3) -> Self {
//!         Self { dx: m.x, dy: m.y, dz: m.z }
//!     }
//! }
//!
//! // one registration, and `Displacement` can now reach nalgebra (and back)
//! framewise::bidirectional_type_map!(Displacement, Vector3<f64> => msg::Vector3);
//!
//! let mut v = Vector3::zeros();
//! convert(&Displacement { dx: 1., dy: 2., dz: 3. }, &mut v);
//! assert_eq!(v, Vector3::new(1., 2., 3.));
//!
//! let mut back = Displacement::default();
//! convert(&v, &mut back);
//! assert_eq!(back, Displacement { dx: 1., dy: 2., dz: 3. });
//! ```

use crate::stamped::Stamped;
use crate::{msg, Isometry3, Point3, UnitQuaternion, Vector3};
use nalgebra::{Quaternion, Translation3};

/// Produces the message representation `M` of a value.
pub trait ToMsg<M> {
    fn to_msg(&self) -> M;
}

/// Constructs a value from its message representation `M`.
pub trait FromMsg<M>: Sized {
    fn from_msg(msg: &M) -> Self;
}

/// Names the message type a representation converts to when no other is asked for.
///
/// This is what [`to_msg`] uses to pick a message type for representations that implement
/// [`ToMsg`] for more than one.
pub trait DefaultMessage: ToMsg<Self::Msg> {
    type Msg;
}

/// Converts `value` into its [default message type](DefaultMessage).
///
/// ```
/// use framewise::{convert::to_msg, msg};
/// use nalgebra::Vector3;
///
/// // `Vector3` can become either a `msg::Vector3` or a `msg::Point`; the default is the former
/// let m = to_msg(&Vector3::new(1., 2., 3.));
/// assert_eq!(m, msg::Vector3 { x: 1., y: 2., z: 3. });
/// ```
pub fn to_msg<A>(value: &A) -> A::Msg
where
    A: DefaultMessage,
{
    value.to_msg()
}

/// A registered conversion from `Self` into `B`.
///
/// Implementations are generated by the type map macros (see the [module docs](self)); every
/// type also converts into itself. `Via` names the common representation the conversion goes
/// through.
pub trait Convert<B> {
    /// The representation the conversion passes through.
    type Via;

    fn convert(&self) -> B;
}

impl<A> Convert<A> for A
where
    A: Clone,
{
    type Via = A;

    fn convert(&self) -> A {
        self.clone()
    }
}

/// Converts `from` into the representation of `to`, overwriting `to`.
///
/// This only compiles if a conversion from `A` to `B` has been registered.
pub fn convert<A, B>(from: &A, to: &mut B)
where
    A: Convert<B>,
{
    *to = from.convert();
}

/// Converts `from` into a new value of representation `B`.
///
/// ```
/// use framewise::convert::convert_into;
/// use nalgebra::{Point3, Vector3};
///
/// let v: Vector3<f64> = convert_into(&Point3::new(1., 2., 3.));
/// assert_eq!(v, Vector3::new(1., 2., 3.));
/// ```
#[must_use]
pub fn convert_into<B, A>(from: &A) -> B
where
    A: Convert<B>,
{
    from.convert()
}

/// Registers a direct conversion between a representation and its message type.
///
/// `message_type_map!(A => M)` lets [`convert`] go from `A` to `M` (using [`ToMsg`]) and from `M`
/// to `A` (using [`FromMsg`]).
#[macro_export]
macro_rules! message_type_map {
    ($datatype:ty => $message:ty) => {
        impl $crate::convert::Convert<$message> for $datatype {
            type Via = $message;

            fn convert(&self) -> $message {
                $crate::convert::ToMsg::<$message>::to_msg(self)
            }
        }

        impl $crate::convert::Convert<$datatype> for $message {
            type Via = $message;

            fn convert(&self) -> $datatype {
                <$datatype as $crate::convert::FromMsg<$message>>::from_msg(self)
            }
        }
    };
}

/// Registers a conversion between two representations through a shared message type, in both
/// directions.
///
/// `bidirectional_type_map!(A, B => M)` requires `A` and `B` to both implement [`ToMsg<M>`] and
/// [`FromMsg<M>`], and lets [`convert`] go `A -> M -> B` as well as `B -> M -> A`.
#[macro_export]
macro_rules! bidirectional_type_map {
    ($a:ty, $b:ty => $message:ty) => {
        $crate::unidirectional_type_map!($a, $b => $message);
        $crate::unidirectional_type_map!($b, $a => $message);
    };
}

/// Registers a conversion between two representations through a shared message type, in one
/// direction only.
///
/// `unidirectional_type_map!(A, B => M)` requires `A: ToMsg<M>` and `B: FromMsg<M>`, and lets
/// [`convert`] go `A -> M -> B`. Converting `B` into `A` remains a compile error unless registered
/// separately.
#[macro_export]
macro_rules! unidirectional_type_map {
    ($a:ty, $b:ty => $message:ty) => {
        impl $crate::convert::Convert<$b> for $a {
            type Via = $message;

            fn convert(&self) -> $b {
                let message: $message = $crate::convert::ToMsg::<$message>::to_msg(self);
                <$b as $crate::convert::FromMsg<$message>>::from_msg(&message)
            }
        }
    };
}

// stamped values convert through the stamped message, carrying stamp and frame along, whenever
// the payloads do.

impl<A, M> ToMsg<Stamped<M>> for Stamped<A>
where
    A: ToMsg<M>,
{
    fn to_msg(&self) -> Stamped<M> {
        Stamped::new((**self).to_msg(), self.stamp(), self.frame_id())
    }
}

impl<A, M> FromMsg<Stamped<M>> for Stamped<A>
where
    A: FromMsg<M>,
{
    fn from_msg(msg: &Stamped<M>) -> Self {
        Stamped::new(A::from_msg(&**msg), msg.stamp(), msg.frame_id())
    }
}

// points

impl ToMsg<msg::Point> for Point3 {
    fn to_msg(&self) -> msg::Point {
        msg::Point {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }
}

impl FromMsg<msg::Point> for Point3 {
    fn from_msg(msg: &msg::Point) -> Self {
        Point3::new(msg.x, msg.y, msg.z)
    }
}

impl DefaultMessage for Point3 {
    type Msg = msg::Point;
}

// vectors may also stand in for a point (ie, a displacement from the origin)

impl ToMsg<msg::Vector3> for Vector3 {
    fn to_msg(&self) -> msg::Vector3 {
        msg::Vector3 {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }
}

impl FromMsg<msg::Vector3> for Vector3 {
    fn from_msg(msg: &msg::Vector3) -> Self {
        Vector3::new(msg.x, msg.y, msg.z)
    }
}

impl ToMsg<msg::Point> for Vector3 {
    fn to_msg(&self) -> msg::Point {
        msg::Point {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }
}

impl FromMsg<msg::Point> for Vector3 {
    fn from_msg(msg: &msg::Point) -> Self {
        Vector3::new(msg.x, msg.y, msg.z)
    }
}

impl DefaultMessage for Vector3 {
    type Msg = msg::Vector3;
}

impl ToMsg<msg::Vector3> for [f64; 3] {
    fn to_msg(&self) -> msg::Vector3 {
        let [x, y, z] = *self;
        msg::Vector3 { x, y, z }
    }
}

impl FromMsg<msg::Vector3> for [f64; 3] {
    fn from_msg(msg: &msg::Vector3) -> Self {
        [msg.x, msg.y, msg.z]
    }
}

impl ToMsg<msg::Point> for [f64; 3] {
    fn to_msg(&self) -> msg::Point {
        let [x, y, z] = *self;
        msg::Point { x, y, z }
    }
}

impl DefaultMessage for [f64; 3] {
    type Msg = msg::Vector3;
}

// rotations

impl ToMsg<msg::Quaternion> for UnitQuaternion {
    fn to_msg(&self) -> msg::Quaternion {
        self.quaternion().to_msg()
    }
}

impl FromMsg<msg::Quaternion> for UnitQuaternion {
    /// Normalizes the message quaternion.
    ///
    /// A zero quaternion produces NaN components; use
    /// [`RigidTransform::try_from_components`](crate::RigidTransform::try_from_components) where
    /// that must be caught.
    fn from_msg(msg: &msg::Quaternion) -> Self {
        UnitQuaternion::from_quaternion(Quaternion::from_msg(msg))
    }
}

impl DefaultMessage for UnitQuaternion {
    type Msg = msg::Quaternion;
}

impl ToMsg<msg::Quaternion> for Quaternion<f64> {
    fn to_msg(&self) -> msg::Quaternion {
        msg::Quaternion {
            x: self.i,
            y: self.j,
            z: self.k,
            w: self.w,
        }
    }
}

impl FromMsg<msg::Quaternion> for Quaternion<f64> {
    fn from_msg(msg: &msg::Quaternion) -> Self {
        // nalgebra takes the scalar part first
        Quaternion::new(msg.w, msg.x, msg.y, msg.z)
    }
}

// isometries (ie, transforms and poses)

impl ToMsg<msg::Transform> for Isometry3 {
    fn to_msg(&self) -> msg::Transform {
        msg::Transform {
            translation: self.translation.vector.to_msg(),
            rotation: self.rotation.to_msg(),
        }
    }
}

impl FromMsg<msg::Transform> for Isometry3 {
    fn from_msg(msg: &msg::Transform) -> Self {
        Isometry3::from_parts(
            Translation3::from(Vector3::from_msg(&msg.translation)),
            UnitQuaternion::from_msg(&msg.rotation),
        )
    }
}

impl ToMsg<msg::Pose> for Isometry3 {
    fn to_msg(&self) -> msg::Pose {
        msg::Pose {
            position: self.translation.vector.to_msg(),
            orientation: self.rotation.to_msg(),
        }
    }
}

impl FromMsg<msg::Pose> for Isometry3 {
    fn from_msg(msg: &msg::Pose) -> Self {
        Isometry3::from_parts(
            Translation3::from(Vector3::from_msg(&msg.position)),
            UnitQuaternion::from_msg(&msg.orientation),
        )
    }
}

impl FromMsg<msg::PoseWithCovariance> for Isometry3 {
    /// Drops the covariance.
    fn from_msg(msg: &msg::PoseWithCovariance) -> Self {
        Isometry3::from_msg(&msg.pose)
    }
}

impl DefaultMessage for Isometry3 {
    type Msg = msg::Transform;
}

// force and torque as a pair of vectors

impl ToMsg<msg::Wrench> for [Vector3; 2] {
    fn to_msg(&self) -> msg::Wrench {
        msg::Wrench {
            force: self[0].to_msg(),
            torque: self[1].to_msg(),
        }
    }
}

impl FromMsg<msg::Wrench> for [Vector3; 2] {
    fn from_msg(msg: &msg::Wrench) -> Self {
        [Vector3::from_msg(&msg.force), Vector3::from_msg(&msg.torque)]
    }
}

impl DefaultMessage for [Vector3; 2] {
    type Msg = msg::Wrench;
}

message_type_map!(Point3 => msg::Point);
message_type_map!(Vector3 => msg::Vector3);
message_type_map!([f64; 3] => msg::Vector3);
message_type_map!(UnitQuaternion => msg::Quaternion);
message_type_map!(Isometry3 => msg::Transform);
message_type_map!(Isometry3 => msg::Pose);
message_type_map!([Vector3; 2] => msg::Wrench);
message_type_map!(Stamped<Point3> => Stamped<msg::Point>);
message_type_map!(Stamped<Vector3> => Stamped<msg::Vector3>);
message_type_map!(Stamped<UnitQuaternion> => Stamped<msg::Quaternion>);
message_type_map!(Stamped<Isometry3> => Stamped<msg::Pose>);

bidirectional_type_map!(Point3, Vector3 => msg::Point);
bidirectional_type_map!([f64; 3], Vector3 => msg::Vector3);
bidirectional_type_map!(Stamped<Point3>, Stamped<Vector3> => Stamped<msg::Point>);

// arrays carry no point/vector distinction, so they may become a point, but a point does not
// silently become a bag of numbers
unidirectional_type_map!([f64; 3], Point3 => msg::Point);

#[cfg(test)]
mod tests {
    use super::{convert, convert_into, to_msg, Convert, FromMsg, ToMsg};
    use crate::stamped::Stamped;
    use crate::time::Timestamp;
    use crate::{msg, Isometry3, Point3, UnitQuaternion, Vector3};
    use approx::assert_relative_eq;
    use nalgebra::Translation3;
    use rstest::rstest;
    use std::any::TypeId;

    fn via<A, B>() -> TypeId
    where
        A: Convert<B>,
        A::Via: 'static,
    {
        TypeId::of::<A::Via>()
    }

    #[test]
    fn identity_is_a_copy() {
        let v = Vector3::new(1., 2., 3.);
        let mut out = Vector3::zeros();
        convert(&v, &mut out);
        assert_eq!(v, out);

        let mut same = v;
        convert(&v, &mut same);
        assert_eq!(same, v);
    }

    #[rstest]
    #[case([1., 2., 3.])]
    #[case([-0.5, 0., 1e9])]
    #[case([0., 0., 0.])]
    fn point_vector_roundtrip(#[case] xyz: [f64; 3]) {
        let original = Point3::from(xyz);
        let mut vector = Vector3::zeros();
        convert(&original, &mut vector);
        assert_eq!(vector, Vector3::from(xyz));

        let mut back = Point3::origin();
        convert(&vector, &mut back);
        assert_eq!(back, original);
    }

    #[test]
    fn array_vector_roundtrip() {
        let mut v = Vector3::zeros();
        convert(&[4_f64, 5., 6.], &mut v);
        let mut back = [0.; 3];
        convert(&v, &mut back);
        assert_eq!(back, [4., 5., 6.]);
    }

    #[test]
    fn convert_into_infers_the_target() {
        let p: Point3 = convert_into(&Vector3::new(7., 8., 9.));
        assert_eq!(p, Point3::new(7., 8., 9.));
        let q = convert_into::<msg::Quaternion, _>(&UnitQuaternion::identity());
        assert_eq!(q, msg::Quaternion::default());
    }

    #[test]
    fn array_to_point_is_one_way() {
        let mut p = Point3::origin();
        convert(&[1_f64, 1., 2.], &mut p);
        assert_eq!(p, Point3::new(1., 1., 2.));
    }

    #[test]
    fn type_maps_record_their_common_representation() {
        assert_eq!(via::<Point3, Vector3>(), TypeId::of::<msg::Point>());
        assert_eq!(via::<Vector3, Point3>(), TypeId::of::<msg::Point>());
        assert_eq!(via::<[f64; 3], Vector3>(), TypeId::of::<msg::Vector3>());
        assert_eq!(via::<Isometry3, msg::Pose>(), TypeId::of::<msg::Pose>());
        assert_eq!(via::<Point3, Point3>(), TypeId::of::<Point3>());
    }

    #[test]
    fn message_maps_go_both_ways() {
        let iso = Isometry3::from_parts(
            Translation3::new(1., 2., 3.),
            UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3),
        );
        let mut pose = msg::Pose::default();
        convert(&iso, &mut pose);
        let mut back = Isometry3::identity();
        convert(&pose, &mut back);
        assert_relative_eq!(back, iso, epsilon = 1e-12);

        let mut transform = msg::Transform::default();
        convert(&iso, &mut transform);
        assert_relative_eq!(transform.translation.z, 3.);
        assert_relative_eq!(pose.orientation, transform.rotation);
    }

    #[test]
    fn quaternion_components_keep_their_names() {
        let q = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
        let m: msg::Quaternion = q.to_msg();
        assert_relative_eq!(m.w, std::f64::consts::FRAC_1_SQRT_2);
        assert_relative_eq!(m.z, std::f64::consts::FRAC_1_SQRT_2);
        assert_relative_eq!(m.x, 0.);
        assert_relative_eq!(m.y, 0.);
    }

    #[test]
    fn quaternion_from_msg_normalizes() {
        let q = UnitQuaternion::from_msg(&msg::Quaternion {
            x: 0.,
            y: 0.,
            z: 0.,
            w: 5.,
        });
        assert_relative_eq!(q, UnitQuaternion::identity());
    }

    #[test]
    fn stamped_conversion_keeps_metadata() {
        let stamped = Stamped::new(Point3::new(1., 2., 3.), Timestamp::from_nanos(11), "map");
        let mut vector = Stamped::new(Vector3::zeros(), Timestamp::ZERO, "");
        convert(&stamped, &mut vector);
        assert_eq!(*vector, Vector3::new(1., 2., 3.));
        assert_eq!(vector.frame_id(), "map");
        assert_eq!(vector.stamp(), Timestamp::from_nanos(11));

        let m: Stamped<msg::Point> = stamped.to_msg();
        assert_eq!(m.frame_id(), "map");
        assert_eq!(Stamped::<Point3>::from_msg(&m), stamped);
    }

    #[test]
    fn default_messages() {
        assert_eq!(
            to_msg(&[1_f64, 2., 3.]),
            msg::Vector3 {
                x: 1.,
                y: 2.,
                z: 3.
            }
        );
        assert_eq!(to_msg(&Isometry3::identity()), msg::Transform::default());
        let wrench = to_msg(&[Vector3::x(), Vector3::y()]);
        assert_eq!(wrench.force.x, 1.);
        assert_eq!(wrench.torque.y, 1.);
    }
}

//! This library applies rigid body transforms (a rotation plus a translation between two named
//! coordinate frames, valid at some point in time) to the many shapes data takes in a robot: single
//! points and vectors, poses with and without uncertainty, forces, other transforms, whole point
//! clouds, and sensor readings from IMUs and magnetometers.
//!
//! Where transforms _come from_ (a frame graph, a calibration, a localization system) is up to you.
//! This crate takes a resolved [`RigidTransform`] and gets the arithmetic right for each kind of
//! data: points are rotated and translated, free vectors are only rotated, orientations are
//! composed with the rotation, and covariances are carried into the new frame along with the
//! values they describe. Frame-tagged data also ends up tagged with the transform's target frame
//! and timestamp.
//!
//! Every transformable type implements [`Transformable`]. Values that carry a frame and timestamp
//! ([`Stamped`], [`PointBuffer`], [`ImuReading`], [`MagneticFieldReading`] and [`RigidTransform`]
//! itself) implement [`FrameStamped`] to expose them.
//!
//! Separately, the [`convert`] module lets different representations of the same data (nalgebra
//! types, the plain [`msg`] types, your own structs) be converted into one another through a
//! shared message type, with the available conversions checked at compile time.
//!
//! # Examples
//!
//! A sensor mounted one meter up and turned a quarter turn to the left sees something straight
//! ahead of it. Where is that in the robot's own frame?
//!
//! ```
//! use framewise::{msg, FrameStamped, RigidTransform, Stamped, Timestamp};
//! use nalgebra::{UnitQuaternion, Vector3};
//!
//! let sensor_to_base = RigidTransform::new(
//!     "sensor",
//!     "base_link",
//!     Timestamp::from_secs_f64(12.5),
//!     Vector3::new(0., 0., 1.),
//!     UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2),
//! );
//!
//! let seen = Stamped::new(
//!     msg::Point { x: 1., y: 0., z: 0. },
//!     Timestamp::from_secs_f64(12.5),
//!     "sensor",
//! );
//! let in_base = sensor_to_base.transform(&seen);
//!
//! // the sensor's "ahead" is the robot's "left", and one meter up
//! assert!(in_base.x.abs() < 1e-12);
//! assert!((in_base.y - 1.).abs() < 1e-12);
//! assert!((in_base.z - 1.).abs() < 1e-12);
//! assert_eq!(in_base.frame_id(), "base_link");
//! ```
//!
//! Sensor readings only care about the rotation part of a transform:
//!
//! ```
//! use framewise::{Header, ImuReading, RigidTransform, Timestamp, Transformable};
//! use nalgebra::{UnitQuaternion, Vector3};
//! use uom::si::acceleration::meter_per_second_squared;
//! use uom::si::f64::Acceleration;
//!
//! let g = |a| Acceleration::new::<meter_per_second_squared>(a);
//! let mut imu = ImuReading::new(Header::new(Timestamp::ZERO, "imu"))
//!     .with_linear_acceleration([g(0.), g(0.), g(9.81)], [0.; 9]);
//!
//! // the IMU is mounted upside down, somewhere off-center
//! let imu_to_base = RigidTransform::new(
//!     "imu",
//!     "base_link",
//!     Timestamp::ZERO,
//!     Vector3::new(0.2, 0., 0.3),
//!     UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI),
//! );
//! imu.transform_in_place(&imu_to_base);
//! assert!((imu.linear_acceleration.z + 9.81).abs() < 1e-9);
//! ```

mod imu;
mod magnetic;
mod stamped;
mod time;
mod transform;

pub mod convert;
pub mod covariance;
pub mod error;
pub mod msg;
pub mod point_buffer;

pub(crate) type Point3 = nalgebra::Point3<f64>;
pub(crate) type Vector3 = nalgebra::Vector3<f64>;
pub(crate) type UnitQuaternion = nalgebra::UnitQuaternion<f64>;
pub(crate) type Isometry3 = nalgebra::Isometry3<f64>;

pub use error::Error;
pub use imu::ImuReading;
pub use magnetic::MagneticFieldReading;
pub use point_buffer::PointBuffer;
pub use stamped::{FrameStamped, Header, Stamped};
pub use time::Timestamp;
pub use transform::{RigidTransform, Transformable};

use crate::covariance::{rotate_covariance, Covariance3};
use crate::stamped::{FrameStamped, Header};
use crate::time::Timestamp;
use crate::transform::{RigidTransform, Transformable};
use crate::{UnitQuaternion, Vector3};
use tracing::trace;
use uom::si::f64::{Acceleration, AngularVelocity};
use uom::si::{acceleration::meter_per_second_squared, angular_velocity::radian_per_second};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single reading from an inertial measurement unit.
///
/// Angular velocity is held in radians per second and linear acceleration in meters per second
/// squared, both along the axes of the frame in the header. The orientation is the unit's
/// estimate of how its frame is rotated, and its covariance is over the rotation vector in the
/// tangent space of that orientation. Each covariance is a row-major 3×3 matrix.
///
/// The typed builders and accessors take and produce [`uom`] quantities, so callers need not care
/// about the stored units:
///
/// ```
/// use framewise::{Header, ImuReading, Timestamp};
/// use uom::si::f64::AngularVelocity;
/// use uom::si::angular_velocity::degree_per_second;
///
/// let yaw_rate = AngularVelocity::new::<degree_per_second>(90.);
/// let zero = AngularVelocity::new::<degree_per_second>(0.);
/// let reading = ImuReading::new(Header::new(Timestamp::ZERO, "imu"))
///     .with_angular_velocity([zero, zero, yaw_rate], [0.; 9]);
/// assert!((reading.angular_velocity.z - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
/// ```
///
/// Transforming a reading (see [`Transformable`]) ignores the translation of the transform
/// entirely. Angular velocity and linear acceleration are rotated as free vectors, the orientation
/// `q` becomes `r q r⁻¹` for the transform's rotation `r`, and all three covariances are rotated
/// by `r`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImuReading {
    pub header: Header,
    pub orientation: UnitQuaternion,
    pub orientation_covariance: Covariance3,
    /// In radians per second.
    pub angular_velocity: Vector3,
    pub angular_velocity_covariance: Covariance3,
    /// In meters per second squared.
    pub linear_acceleration: Vector3,
    pub linear_acceleration_covariance: Covariance3,
}

impl ImuReading {
    /// A reading with identity orientation, zero rates and accelerations, and zero covariances.
    #[must_use]
    pub fn new(header: Header) -> Self {
        Self {
            header,
            orientation: UnitQuaternion::identity(),
            orientation_covariance: [0.; 9],
            angular_velocity: Vector3::zeros(),
            angular_velocity_covariance: [0.; 9],
            linear_acceleration: Vector3::zeros(),
            linear_acceleration_covariance: [0.; 9],
        }
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: UnitQuaternion, covariance: Covariance3) -> Self {
        self.orientation = orientation;
        self.orientation_covariance = covariance;
        self
    }

    /// Sets the angular velocity about the X, Y and Z axes.
    ///
    /// `covariance` is in (rad/s)².
    #[must_use]
    pub fn with_angular_velocity(
        mut self,
        velocity: [AngularVelocity; 3],
        covariance: Covariance3,
    ) -> Self {
        self.angular_velocity = Vector3::from(velocity.map(|w| w.get::<radian_per_second>()));
        self.angular_velocity_covariance = covariance;
        self
    }

    /// Sets the linear acceleration along the X, Y and Z axes.
    ///
    /// `covariance` is in (m/s²)².
    #[must_use]
    pub fn with_linear_acceleration(
        mut self,
        acceleration: [Acceleration; 3],
        covariance: Covariance3,
    ) -> Self {
        self.linear_acceleration =
            Vector3::from(acceleration.map(|a| a.get::<meter_per_second_squared>()));
        self.linear_acceleration_covariance = covariance;
        self
    }

    #[must_use]
    pub fn angular_velocity_quantities(&self) -> [AngularVelocity; 3] {
        let v = self.angular_velocity;
        [v.x, v.y, v.z].map(|w| AngularVelocity::new::<radian_per_second>(w))
    }

    #[must_use]
    pub fn linear_acceleration_quantities(&self) -> [Acceleration; 3] {
        let v = self.linear_acceleration;
        [v.x, v.y, v.z].map(|a| Acceleration::new::<meter_per_second_squared>(a))
    }
}

impl Transformable for ImuReading {
    fn transform_into(&self, out: &mut Self, transform: &RigidTransform) {
        let r = transform.rotation();

        out.angular_velocity = transform.rotate_vector(&self.angular_velocity);
        out.angular_velocity_covariance = rotate_covariance(&self.angular_velocity_covariance, &r);

        out.linear_acceleration = transform.rotate_vector(&self.linear_acceleration);
        out.linear_acceleration_covariance =
            rotate_covariance(&self.linear_acceleration_covariance, &r);

        out.orientation = r * self.orientation * r.inverse();
        out.orientation_covariance = rotate_covariance(&self.orientation_covariance, &r);

        out.header = Header::new(transform.stamp(), transform.target_frame());

        trace!(
            target_frame = transform.target_frame(),
            "transformed inertial reading"
        );
    }
}

impl FrameStamped for ImuReading {
    fn stamp(&self) -> Timestamp {
        self.header.stamp
    }

    fn frame_id(&self) -> &str {
        &self.header.frame_id
    }
}

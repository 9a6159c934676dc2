use crate::covariance::{rotate_covariance, Covariance3};
use crate::stamped::{FrameStamped, Header};
use crate::time::Timestamp;
use crate::transform::{RigidTransform, Transformable};
use crate::Vector3;
use tracing::trace;
use uom::si::f64::MagneticFluxDensity;
use uom::si::magnetic_flux_density::tesla;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A magnetometer reading: the magnetic field vector at the sensor, in tesla.
///
/// Like the other vector quantities of a sensor, the field is a free vector, so transforming a
/// reading rotates the field (and its covariance) but is unaffected by translation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MagneticFieldReading {
    pub header: Header,
    /// In tesla.
    pub magnetic_field: Vector3,
    pub magnetic_field_covariance: Covariance3,
}

impl MagneticFieldReading {
    /// A reading of the field components along X, Y and Z.
    ///
    /// ```
    /// use framewise::{Header, MagneticFieldReading, Timestamp};
    /// use uom::si::f64::MagneticFluxDensity;
    /// use uom::si::magnetic_flux_density::{microtesla, tesla};
    ///
    /// let ut = |b| MagneticFluxDensity::new::<microtesla>(b);
    /// let reading = MagneticFieldReading::new(
    ///     Header::new(Timestamp::ZERO, "magnetometer"),
    ///     [ut(20.), ut(0.), ut(-45.)],
    ///     [0.; 9],
    /// );
    /// assert!((reading.magnetic_field.z + 45e-6).abs() < 1e-15);
    /// let [_, _, z] = reading.field_quantities();
    /// assert!((z.get::<tesla>() + 45e-6).abs() < 1e-15);
    /// ```
    #[must_use]
    pub fn new(
        header: Header,
        field: [MagneticFluxDensity; 3],
        covariance: Covariance3,
    ) -> Self {
        Self {
            header,
            magnetic_field: Vector3::from(field.map(|b| b.get::<tesla>())),
            magnetic_field_covariance: covariance,
        }
    }

    #[must_use]
    pub fn field_quantities(&self) -> [MagneticFluxDensity; 3] {
        let b = self.magnetic_field;
        [b.x, b.y, b.z].map(|b| MagneticFluxDensity::new::<tesla>(b))
    }
}

impl Transformable for MagneticFieldReading {
    fn transform_into(&self, out: &mut Self, transform: &RigidTransform) {
        let r = transform.rotation();
        out.magnetic_field = transform.rotate_vector(&self.magnetic_field);
        out.magnetic_field_covariance = rotate_covariance(&self.magnetic_field_covariance, &r);
        out.header = Header::new(transform.stamp(), transform.target_frame());

        trace!(
            target_frame = transform.target_frame(),
            "transformed magnetic field reading"
        );
    }
}

impl FrameStamped for MagneticFieldReading {
    fn stamp(&self) -> Timestamp {
        self.header.stamp
    }

    fn frame_id(&self) -> &str {
        &self.header.frame_id
    }
}

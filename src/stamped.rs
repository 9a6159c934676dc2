use crate::time::Timestamp;
use std::fmt::{self, Display, Formatter};
use std::ops::{Deref, DerefMut};

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Read access to the time and coordinate frame a value is expressed in.
///
/// This is implemented for every frame-tagged type in the crate ([`Stamped`],
/// [`PointBuffer`](crate::PointBuffer), [`ImuReading`](crate::ImuReading),
/// [`MagneticFieldReading`](crate::MagneticFieldReading), and
/// [`RigidTransform`](crate::RigidTransform)), and deliberately _not_ for untagged values. Asking
/// for the frame of a bare point is a compile error rather than a runtime failure:
///
/// ```compile_fail
/// use framewise::{msg, FrameStamped};
///
/// let p = msg::Point { x: 1., y: 2., z: 3. };
/// let _ = p.frame_id();
/// ```
///
/// Wrap the value in a [`Stamped`] instead:
///
/// ```
/// use framewise::{msg, FrameStamped, Stamped, Timestamp};
///
/// let p = Stamped::new(msg::Point { x: 1., y: 2., z: 3. }, Timestamp::from_nanos(7), "lidar");
/// assert_eq!(FrameStamped::frame_id(&p), "lidar");
/// assert_eq!(FrameStamped::stamp(&p), Timestamp::from_nanos(7));
/// ```
pub trait FrameStamped {
    /// The time at which the value was valid.
    fn stamp(&self) -> Timestamp;

    /// The identifier of the coordinate frame the value is expressed in.
    fn frame_id(&self) -> &str;
}

/// The time and frame metadata shared by all sensor readings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Header {
    pub stamp: Timestamp,
    pub frame_id: String,
}

impl Header {
    #[must_use]
    pub fn new(stamp: Timestamp, frame_id: impl Into<String>) -> Self {
        Self {
            stamp,
            frame_id: frame_id.into(),
        }
    }
}

/// A value of type `T` tagged with the time and coordinate frame it is expressed in.
///
/// The stamp and frame are metadata: they are set when the value is constructed and replaced
/// when a transform is applied (see [`Transformable`](crate::Transformable)), but cannot be edited
/// independently of the payload. The payload itself is reachable (and mutable) through
/// [`Deref`]/[`DerefMut`], so comparing two payloads while ignoring metadata is simply `*a == *b`.
/// `==` on `Stamped` compares the metadata too.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stamped<T> {
    data: T,
    stamp: Timestamp,
    frame_id: String,
}

impl<T> Stamped<T> {
    #[must_use]
    pub fn new(data: T, stamp: Timestamp, frame_id: impl Into<String>) -> Self {
        Self {
            data,
            stamp,
            frame_id: frame_id.into(),
        }
    }

    /// Tags `data` with the metadata from `header`.
    #[must_use]
    pub fn with_header(data: T, header: Header) -> Self {
        Self {
            data,
            stamp: header.stamp,
            frame_id: header.frame_id,
        }
    }

    #[must_use]
    pub fn stamp(&self) -> Timestamp {
        self.stamp
    }

    #[must_use]
    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    /// Returns a copy of the metadata as a [`Header`].
    #[must_use]
    pub fn header(&self) -> Header {
        Header::new(self.stamp, self.frame_id.clone())
    }

    /// Discards the metadata.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Splits the value into payload and metadata.
    #[must_use]
    pub fn into_parts(self) -> (T, Header) {
        (
            self.data,
            Header {
                stamp: self.stamp,
                frame_id: self.frame_id,
            },
        )
    }

    /// Replaces the payload while keeping the stamp and frame.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Stamped<U> {
        Stamped {
            data: f(self.data),
            stamp: self.stamp,
            frame_id: self.frame_id,
        }
    }

    pub(crate) fn set_metadata(&mut self, stamp: Timestamp, frame_id: &str) {
        self.stamp = stamp;
        self.frame_id.clear();
        self.frame_id.push_str(frame_id);
    }
}

impl<T> FrameStamped for Stamped<T> {
    fn stamp(&self) -> Timestamp {
        self.stamp
    }

    fn frame_id(&self) -> &str {
        &self.frame_id
    }
}

impl<T> Deref for Stamped<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> DerefMut for Stamped<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl<T> Display for Stamped<T>
where
    T: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {} @ {}", self.data, self.frame_id, self.stamp)
    }
}

#[cfg(any(test, feature = "approx"))]
impl<T> AbsDiffEq<Self> for Stamped<T>
where
    T: AbsDiffEq,
{
    type Epsilon = T::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        T::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.stamp == other.stamp
            && self.frame_id == other.frame_id
            && self.data.abs_diff_eq(&other.data, epsilon)
    }
}

#[cfg(any(test, feature = "approx"))]
impl<T> RelativeEq for Stamped<T>
where
    T: RelativeEq,
{
    fn default_max_relative() -> Self::Epsilon {
        T::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.stamp == other.stamp
            && self.frame_id == other.frame_id
            && self.data.relative_eq(&other.data, epsilon, max_relative)
    }
}

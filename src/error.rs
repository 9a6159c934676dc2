use crate::point_buffer::FieldDatatype;
use thiserror::Error;

/// Errors from constructing values whose invariants cannot be expressed in their types.
///
/// Applying a transform never fails; these only arise when building a
/// [`PointBuffer`](crate::PointBuffer) or [`PointLayout`](crate::point_buffer::PointLayout) from
/// untrusted parts, or a [`RigidTransform`](crate::RigidTransform) from raw quaternion components.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A field every point must have is missing from the layout.
    #[error("point layout has no `{0}` field")]
    MissingField(String),

    /// A coordinate field does not have the datatype coordinates are stored as.
    #[error("field `{name}` is {actual}, but must be {expected}")]
    FieldDatatype {
        name: String,
        expected: FieldDatatype,
        actual: FieldDatatype,
    },

    /// A field reaches past the end of the point record.
    #[error(
        "field `{name}` spans bytes {offset}..{end} but points are only {point_step} bytes long"
    )]
    FieldOutOfBounds {
        name: String,
        offset: usize,
        end: usize,
        point_step: usize,
    },

    #[error("points must be at least one byte long")]
    ZeroPointStep,

    /// The buffer ends part-way through a point.
    #[error("{len} bytes of point data is not a whole number of {point_step}-byte points")]
    PartialPoint { len: usize, point_step: usize },

    /// More points were asked for than can be held in memory.
    #[error("a buffer of {len} {point_step}-byte points is too large to allocate")]
    BufferTooLarge { len: usize, point_step: usize },

    #[error("point index {index} is out of bounds for a buffer of {len} points")]
    IndexOutOfBounds { index: usize, len: usize },

    /// The quaternion given for a rotation has (near-)zero norm and so describes no rotation.
    #[error("rotation quaternion ({w}, {x}, {y}, {z}) cannot be normalized")]
    DegenerateRotation { w: f64, x: f64, y: f64, z: f64 },
}

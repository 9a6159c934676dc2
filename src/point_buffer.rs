//! Bulk storage of points as fixed-layout binary records.
//!
//! A [`PointBuffer`] holds any number of points back-to-back in a byte buffer, each point a record
//! of [`PointLayout::point_step`] bytes. The layout names the fields inside a record (with offset
//! and datatype) so that, beyond the `x`, `y` and `z` coordinates every buffer must have, points
//! can carry arbitrary extra data (intensities, ring numbers, colours, ...). Transforming a buffer
//! touches the coordinates only; every other byte is carried over unchanged.

use crate::error::Error;
use crate::stamped::{FrameStamped, Header};
use crate::time::Timestamp;
use crate::transform::{RigidTransform, Transformable};
use crate::Point3;
use std::fmt::{self, Display, Formatter};
use tracing::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The names of the coordinate fields every layout must have, in order.
const COORDINATES: [&str; 3] = ["x", "y", "z"];

/// The numeric type a field is stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FieldDatatype {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float32,
    Float64,
}

impl FieldDatatype {
    /// The number of bytes a single value of this type occupies.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }
}

impl Display for FieldDatatype {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        };
        f.write_str(name)
    }
}

/// A named field within a point record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointField {
    pub name: String,
    /// Byte offset of the field from the start of the point record.
    pub offset: usize,
    pub datatype: FieldDatatype,
    /// Number of consecutive values of `datatype` in the field.
    pub count: usize,
}

impl PointField {
    #[must_use]
    pub fn new(name: impl Into<String>, offset: usize, datatype: FieldDatatype) -> Self {
        Self {
            name: name.into(),
            offset,
            datatype,
            count: 1,
        }
    }

    /// One past the last byte of the field within its record.
    ///
    /// Saturates at `usize::MAX`, which no record can reach.
    #[must_use]
    pub fn end(&self) -> usize {
        self.datatype
            .size()
            .saturating_mul(self.count)
            .saturating_add(self.offset)
    }
}

/// The layout of every point record in a [`PointBuffer`].
///
/// A layout always has `x`, `y` and `z` fields of type [`FieldDatatype::Float32`], and every field
/// lies within [`point_step`](Self::point_step) bytes. Fields may otherwise be placed anywhere
/// (including overlapping one another), and bytes not covered by any field are allowed.
///
/// ```
/// use framewise::point_buffer::{FieldDatatype, PointLayout};
///
/// let layout = PointLayout::xyz()
///     .with_field("intensity", FieldDatatype::Float32)
///     .with_padding(4);
/// assert_eq!(layout.point_step(), 20);
/// assert_eq!(layout.field("intensity").unwrap().offset, 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawLayout"))]
pub struct PointLayout {
    fields: Vec<PointField>,
    point_step: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    xyz: [usize; 3],
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawLayout {
    fields: Vec<PointField>,
    point_step: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<RawLayout> for PointLayout {
    type Error = Error;

    fn try_from(raw: RawLayout) -> Result<Self, Self::Error> {
        Self::new(raw.fields, raw.point_step)
    }
}

impl PointLayout {
    /// Validates a layout made of `fields` in records of `point_step` bytes.
    ///
    /// Where more than one field has the same name, the first one is used.
    pub fn new(fields: Vec<PointField>, point_step: usize) -> Result<Self, Error> {
        if point_step == 0 {
            return Err(Error::ZeroPointStep);
        }
        if let Some(field) = fields.iter().find(|field| field.end() > point_step) {
            return Err(Error::FieldOutOfBounds {
                name: field.name.clone(),
                offset: field.offset,
                end: field.end(),
                point_step,
            });
        }

        let mut xyz = [0; 3];
        for (offset, name) in xyz.iter_mut().zip(COORDINATES) {
            let field = fields
                .iter()
                .find(|field| field.name == name)
                .ok_or_else(|| Error::MissingField(name.to_string()))?;
            if field.datatype != FieldDatatype::Float32 {
                return Err(Error::FieldDatatype {
                    name: name.to_string(),
                    expected: FieldDatatype::Float32,
                    actual: field.datatype,
                });
            }
            let end = field.offset.saturating_add(FieldDatatype::Float32.size());
            if field.count == 0 || end > point_step {
                return Err(Error::FieldOutOfBounds {
                    name: name.to_string(),
                    offset: field.offset,
                    end,
                    point_step,
                });
            }
            *offset = field.offset;
        }

        Ok(Self {
            fields,
            point_step,
            xyz,
        })
    }

    /// A layout of only `x`, `y` and `z`, packed into 12 bytes.
    #[must_use]
    pub fn xyz() -> Self {
        Self {
            fields: COORDINATES
                .iter()
                .enumerate()
                .map(|(i, name)| PointField::new(*name, 4 * i, FieldDatatype::Float32))
                .collect(),
            point_step: 12,
            xyz: [0, 4, 8],
        }
    }

    /// Appends a single-valued field at the end of the record.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, datatype: FieldDatatype) -> Self {
        self.fields
            .push(PointField::new(name, self.point_step, datatype));
        self.point_step += datatype.size();
        self
    }

    /// Appends `bytes` of unnamed space at the end of the record.
    #[must_use]
    pub fn with_padding(mut self, bytes: usize) -> Self {
        self.point_step += bytes;
        self
    }

    #[must_use]
    pub fn fields(&self) -> &[PointField] {
        &self.fields
    }

    /// The size of a single point record in bytes.
    #[must_use]
    pub fn point_step(&self) -> usize {
        self.point_step
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&PointField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// The byte order of multi-byte values in a [`PointBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl Endianness {
    fn read_f32(self, bytes: &[u8]) -> f32 {
        let mut value = [0; 4];
        value.copy_from_slice(&bytes[..4]);
        match self {
            Self::Little => f32::from_le_bytes(value),
            Self::Big => f32::from_be_bytes(value),
        }
    }

    fn write_f32(self, bytes: &mut [u8], value: f32) {
        let value = match self {
            Self::Little => value.to_le_bytes(),
            Self::Big => value.to_be_bytes(),
        };
        bytes[..4].copy_from_slice(&value);
    }
}

/// An ordered sequence of points stored as fixed-layout binary records.
///
/// Applying a [`RigidTransform`] to a buffer transforms the `x`, `y` and `z` of every point in
/// point mode (ie, rotation _and_ translation), and replaces the buffer's header with the
/// transform's target frame and time. The number of points, the layout, and every byte outside the
/// coordinate fields stay as they were. Coordinates are stored as `f32`; the transform itself is
/// computed in `f64` and rounded once when written back.
///
/// ```
/// use framewise::{FrameStamped, Header, PointBuffer, RigidTransform, Timestamp, Transformable};
/// use nalgebra::{UnitQuaternion, Vector3};
///
/// let mut cloud = PointBuffer::from_points(
///     Header::new(Timestamp::from_nanos(1), "lidar"),
///     [[1., 0., 0.], [0., 2., 0.]],
/// );
/// let lidar_to_base = RigidTransform::new(
///     "lidar",
///     "base_link",
///     Timestamp::from_nanos(2),
///     Vector3::new(0., 0., 1.),
///     UnitQuaternion::identity(),
/// );
/// cloud.transform_in_place(&lidar_to_base);
/// assert_eq!(cloud.frame_id(), "base_link");
/// assert_eq!(cloud.point(1), Some([0., 2., 1.]));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawPointBuffer"))]
pub struct PointBuffer {
    pub header: Header,
    layout: PointLayout,
    endianness: Endianness,
    data: Vec<u8>,
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawPointBuffer {
    header: Header,
    layout: PointLayout,
    endianness: Endianness,
    data: Vec<u8>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawPointBuffer> for PointBuffer {
    type Error = Error;

    fn try_from(raw: RawPointBuffer) -> Result<Self, Self::Error> {
        Self::new(raw.header, raw.layout, raw.endianness, raw.data)
    }
}

impl PointBuffer {
    /// Wraps `data` as consecutive `layout` records.
    ///
    /// Fails if `data` ends part-way through a record.
    pub fn new(
        header: Header,
        layout: PointLayout,
        endianness: Endianness,
        data: Vec<u8>,
    ) -> Result<Self, Error> {
        if data.len() % layout.point_step != 0 {
            return Err(Error::PartialPoint {
                len: data.len(),
                point_step: layout.point_step,
            });
        }
        Ok(Self {
            header,
            layout,
            endianness,
            data,
        })
    }

    /// Packs `points` into a little-endian buffer with the [`PointLayout::xyz`] layout.
    #[must_use]
    pub fn from_points(header: Header, points: impl IntoIterator<Item = [f32; 3]>) -> Self {
        let endianness = Endianness::Little;
        let mut data = Vec::new();
        for point in points {
            for value in point {
                data.extend_from_slice(&value.to_le_bytes());
            }
        }
        Self {
            header,
            layout: PointLayout::xyz(),
            endianness,
            data,
        }
    }

    /// A buffer of `len` points with every byte zero.
    pub fn zeroed(
        header: Header,
        layout: PointLayout,
        endianness: Endianness,
        len: usize,
    ) -> Result<Self, Error> {
        let point_step = layout.point_step;
        let size = len
            .checked_mul(point_step)
            .filter(|size| *size <= isize::MAX as usize)
            .ok_or(Error::BufferTooLarge { len, point_step })?;
        Ok(Self {
            header,
            layout,
            endianness,
            data: vec![0; size],
        })
    }

    /// The number of points in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / self.layout.point_step
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn layout(&self) -> &PointLayout {
        &self.layout
    }

    #[must_use]
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// The raw point records.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The raw point records, for writing.
    ///
    /// The length of the data cannot be changed this way, so the buffer stays well-formed.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    fn record(&self, index: usize) -> Option<&[u8]> {
        let step = self.layout.point_step;
        let start = index.checked_mul(step)?;
        self.data.get(start..start.checked_add(step)?)
    }

    fn record_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        let step = self.layout.point_step;
        let start = index.checked_mul(step)?;
        self.data.get_mut(start..start.checked_add(step)?)
    }

    /// The coordinates of the point at `index`, if there is one.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<[f32; 3]> {
        let record = self.record(index)?;
        Some(
            self.layout
                .xyz
                .map(|offset| self.endianness.read_f32(&record[offset..])),
        )
    }

    /// Iterates over the coordinates of every point, in order.
    pub fn points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.data
            .chunks_exact(self.layout.point_step)
            .map(|record| {
                self.layout
                    .xyz
                    .map(|offset| self.endianness.read_f32(&record[offset..]))
            })
    }

    /// Overwrites the coordinates of the point at `index`.
    pub fn set_point(&mut self, index: usize, point: [f32; 3]) -> Result<(), Error> {
        let len = self.len();
        let xyz = self.layout.xyz;
        let endianness = self.endianness;
        let record = self
            .record_mut(index)
            .ok_or(Error::IndexOutOfBounds { index, len })?;
        for (offset, value) in xyz.into_iter().zip(point) {
            endianness.write_f32(&mut record[offset..], value);
        }
        Ok(())
    }

    /// The raw bytes of field `name` in the point at `index`.
    #[must_use]
    pub fn field_bytes(&self, index: usize, name: &str) -> Option<&[u8]> {
        let field = self.layout.field(name)?;
        let range = field.offset..field.end();
        self.record(index).map(|record| &record[range])
    }

    /// The raw bytes of field `name` in the point at `index`, for writing.
    pub fn field_bytes_mut(&mut self, index: usize, name: &str) -> Option<&mut [u8]> {
        let field = self.layout.field(name)?;
        let range = field.offset..field.end();
        self.record_mut(index).map(|record| &mut record[range])
    }
}

impl Transformable for PointBuffer {
    fn transform_into(&self, out: &mut Self, transform: &RigidTransform) {
        out.clone_from(self);
        out.transform_in_place(transform);
    }

    /// Transforms every point where it lies.
    ///
    /// Each point is read, transformed, and written back independently of all other points, so
    /// no scratch copy of the buffer is needed.
    fn transform_in_place(&mut self, transform: &RigidTransform) {
        let xyz = self.layout.xyz;
        let endianness = self.endianness;
        for record in self.data.chunks_exact_mut(self.layout.point_step) {
            let [x, y, z] = xyz.map(|offset| f64::from(endianness.read_f32(&record[offset..])));
            let p = transform.transform_point(&Point3::new(x, y, z));
            for (offset, value) in xyz.into_iter().zip([p.x, p.y, p.z]) {
                #[allow(clippy::cast_possible_truncation)]
                endianness.write_f32(&mut record[offset..], value as f32);
            }
        }
        self.header = Header::new(transform.stamp(), transform.target_frame());

        trace!(
            target_frame = transform.target_frame(),
            points = self.len(),
            "transformed point buffer"
        );
    }

    fn transformed(&self, transform: &RigidTransform) -> Self {
        let mut out = self.clone();
        out.transform_in_place(transform);
        out
    }
}

impl FrameStamped for PointBuffer {
    fn stamp(&self) -> Timestamp {
        self.header.stamp
    }

    fn frame_id(&self) -> &str {
        &self.header.frame_id
    }
}

#[cfg(test)]
mod tests {
    use super::{Endianness, FieldDatatype, PointBuffer, PointField, PointLayout};
    use crate::error::Error;
    use crate::stamped::{FrameStamped, Header};
    use crate::time::Timestamp;
    use crate::transform::{RigidTransform, Transformable};
    use crate::{UnitQuaternion, Vector3};
    use approx::assert_relative_eq;
    use quickcheck::quickcheck;
    use rstest::rstest;
    use std::f64::consts::FRAC_PI_2;

    fn header() -> Header {
        Header::new(Timestamp::from_nanos(100), "lidar")
    }

    fn lift_and_turn() -> RigidTransform {
        RigidTransform::new(
            "lidar",
            "base_link",
            Timestamp::from_nanos(200),
            Vector3::new(0., 0., 1.),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        )
    }

    fn assert_points_eq(actual: [f32; 3], expected: [f32; 3]) {
        assert_relative_eq!(actual[..], expected[..], epsilon = 1e-6);
    }

    #[test]
    fn end_to_end() {
        let cloud = PointBuffer::from_points(header(), [[1., 0., 0.]]);
        let out = cloud.transformed(&lift_and_turn());
        assert_eq!(out.len(), 1);
        assert_points_eq(out.point(0).unwrap(), [0., 1., 1.]);
        assert_eq!(out.frame_id(), "base_link");
        assert_eq!(out.stamp(), Timestamp::from_nanos(200));
        // the input is untouched
        assert_eq!(cloud.frame_id(), "lidar");
        assert_eq!(cloud.point(0), Some([1., 0., 0.]));
    }

    #[test]
    fn in_place_matches_separate_output() {
        let cloud = PointBuffer::from_points(header(), [[1., 2., 3.], [-4., 5., 0.5], [0., 0., 0.]]);
        let mut in_place = cloud.clone();
        in_place.transform_in_place(&lift_and_turn());

        let mut separate = PointBuffer::from_points(Header::default(), std::iter::empty());
        cloud.transform_into(&mut separate, &lift_and_turn());

        assert_eq!(in_place, separate);
    }

    #[test]
    fn empty_buffer_only_changes_header() {
        let layout = PointLayout::xyz().with_field("intensity", FieldDatatype::Float32);
        let cloud = PointBuffer::zeroed(header(), layout.clone(), Endianness::Little, 0).unwrap();
        let out = cloud.transformed(&lift_and_turn());
        assert!(out.is_empty());
        assert_eq!(out.len(), 0);
        assert_eq!(out.layout(), &layout);
        assert_eq!(out.frame_id(), "base_link");
    }

    #[test]
    fn extra_fields_pass_through() {
        let layout = PointLayout::xyz()
            .with_field("intensity", FieldDatatype::Float32)
            .with_field("ring", FieldDatatype::UInt16)
            .with_padding(2);
        let mut cloud = PointBuffer::zeroed(header(), layout, Endianness::Little, 2).unwrap();
        cloud.set_point(0, [1., 0., 0.]).unwrap();
        cloud.set_point(1, [0., 1., 0.]).unwrap();
        cloud
            .field_bytes_mut(0, "intensity")
            .unwrap()
            .copy_from_slice(&0.75_f32.to_le_bytes());
        cloud
            .field_bytes_mut(1, "ring")
            .unwrap()
            .copy_from_slice(&7_u16.to_le_bytes());
        // padding is not a field, but must survive as well
        cloud.data_mut()[19] = 0xAB;

        let out = cloud.transformed(&lift_and_turn());

        assert_points_eq(out.point(0).unwrap(), [0., 1., 1.]);
        assert_points_eq(out.point(1).unwrap(), [-1., 0., 1.]);
        assert_eq!(
            out.field_bytes(0, "intensity"),
            Some(&0.75_f32.to_le_bytes()[..])
        );
        assert_eq!(out.field_bytes(1, "ring"), Some(&7_u16.to_le_bytes()[..]));
        assert_eq!(out.data()[19], 0xAB);
    }

    #[test]
    fn big_endian_coordinates() {
        let mut cloud =
            PointBuffer::zeroed(header(), PointLayout::xyz(), Endianness::Big, 1).unwrap();
        cloud.set_point(0, [1., 0., 0.]).unwrap();
        assert_eq!(&cloud.data()[..4], &1_f32.to_be_bytes());

        let out = cloud.transformed(&lift_and_turn());
        assert_points_eq(out.point(0).unwrap(), [0., 1., 1.]);
        assert_eq!(&out.data()[8..], &1_f32.to_be_bytes());
    }

    #[test]
    fn identity_keeps_points() {
        let cloud = PointBuffer::from_points(header(), [[1.5, -2., 3.25], [1e3, 0., -1e-3]]);
        let out = cloud.transformed(&RigidTransform::identity(
            "lidar",
            "lidar",
            Timestamp::from_nanos(100),
        ));
        assert_eq!(out, cloud);
    }

    #[test]
    fn points_iterates_in_order() {
        let cloud = PointBuffer::from_points(header(), [[1., 2., 3.], [4., 5., 6.]]);
        assert_eq!(
            cloud.points().collect::<Vec<_>>(),
            vec![[1., 2., 3.], [4., 5., 6.]]
        );
        assert_eq!(cloud.point(2), None);
    }

    #[test]
    fn set_point_out_of_bounds() {
        let mut cloud = PointBuffer::from_points(header(), [[0., 0., 0.]]);
        assert_eq!(
            cloud.set_point(1, [1., 1., 1.]),
            Err(Error::IndexOutOfBounds { index: 1, len: 1 })
        );
    }

    #[test]
    fn huge_indices_are_out_of_bounds() {
        let mut cloud = PointBuffer::from_points(header(), [[1., 2., 3.]]);
        for index in [usize::MAX / 12, usize::MAX / 12 + 1, usize::MAX] {
            assert_eq!(cloud.point(index), None);
            assert_eq!(cloud.field_bytes(index, "x"), None);
            assert_eq!(cloud.field_bytes_mut(index, "x"), None);
            assert_eq!(
                cloud.set_point(index, [0., 0., 0.]),
                Err(Error::IndexOutOfBounds { index, len: 1 })
            );
        }
    }

    #[test]
    fn zeroed_rejects_oversized_buffers() {
        assert_eq!(
            PointBuffer::zeroed(header(), PointLayout::xyz(), Endianness::Little, usize::MAX / 2),
            Err(Error::BufferTooLarge {
                len: usize::MAX / 2,
                point_step: 12
            })
        );
        let cloud =
            PointBuffer::zeroed(header(), PointLayout::xyz(), Endianness::Little, 3).unwrap();
        assert_eq!(cloud.len(), 3);
        assert!(cloud.points().all(|p| p == [0., 0., 0.]));
    }

    #[test]
    fn partial_point_is_rejected() {
        assert_eq!(
            PointBuffer::new(header(), PointLayout::xyz(), Endianness::Little, vec![0; 13]),
            Err(Error::PartialPoint {
                len: 13,
                point_step: 12
            })
        );
        assert!(PointBuffer::new(header(), PointLayout::xyz(), Endianness::Little, vec![]).is_ok());
    }

    fn f32_field(name: &str, offset: usize) -> PointField {
        PointField::new(name, offset, FieldDatatype::Float32)
    }

    #[rstest]
    #[case::missing_z(
        vec![f32_field("x", 0), f32_field("y", 4)],
        12,
        Error::MissingField("z".to_string())
    )]
    #[case::wrong_datatype(
        vec![f32_field("x", 0), f32_field("y", 4), PointField::new("z", 8, FieldDatatype::Float64)],
        16,
        Error::FieldDatatype {
            name: "z".to_string(),
            expected: FieldDatatype::Float32,
            actual: FieldDatatype::Float64,
        }
    )]
    #[case::out_of_bounds(
        vec![f32_field("x", 0), f32_field("y", 4), f32_field("z", 8)],
        10,
        Error::FieldOutOfBounds {
            name: "z".to_string(),
            offset: 8,
            end: 12,
            point_step: 10,
        }
    )]
    #[case::empty_coordinate(
        vec![
            f32_field("x", 0),
            f32_field("y", 4),
            PointField { count: 0, ..f32_field("z", 8) },
        ],
        12,
        Error::FieldOutOfBounds {
            name: "z".to_string(),
            offset: 8,
            end: 12,
            point_step: 12,
        }
    )]
    #[case::huge_count(
        vec![
            f32_field("x", 0),
            f32_field("y", 4),
            f32_field("z", 8),
            PointField {
                count: usize::MAX / 2,
                ..PointField::new("ring", 12, FieldDatatype::UInt16)
            },
        ],
        14,
        Error::FieldOutOfBounds {
            name: "ring".to_string(),
            offset: 12,
            end: usize::MAX,
            point_step: 14,
        }
    )]
    #[case::zero_step(vec![], 0, Error::ZeroPointStep)]
    fn invalid_layouts(
        #[case] fields: Vec<PointField>,
        #[case] point_step: usize,
        #[case] expected: Error,
    ) {
        assert_eq!(PointLayout::new(fields, point_step), Err(expected));
    }

    #[test]
    fn layout_fields_may_be_reordered() {
        let layout = PointLayout::new(
            vec![
                PointField::new("t", 0, FieldDatatype::Float64),
                f32_field("z", 8),
                f32_field("y", 12),
                f32_field("x", 16),
            ],
            20,
        )
        .unwrap();
        let mut cloud = PointBuffer::zeroed(header(), layout, Endianness::Little, 1).unwrap();
        cloud.set_point(0, [1., 2., 3.]).unwrap();
        assert_eq!(&cloud.data()[16..20], &1_f32.to_le_bytes());
        assert_eq!(&cloud.data()[8..12], &3_f32.to_le_bytes());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_revalidates() {
        let cloud = PointBuffer::from_points(header(), [[1., 2., 3.]]);
        let ser = serde_yaml::to_string(&cloud).unwrap();
        let de = serde_yaml::from_str::<PointBuffer>(&ser).unwrap();
        assert_eq!(cloud, de);

        let truncated = ser.replacen("point_step: 12", "point_step: 11", 1);
        assert!(serde_yaml::from_str::<PointBuffer>(&truncated).is_err());
    }

    quickcheck! {
        fn transform_keeps_length_and_extra_fields(points: Vec<(i16, i16, i16, u16)>) -> () {
            let layout = PointLayout::xyz().with_field("ring", FieldDatatype::UInt16);
            let mut cloud =
                PointBuffer::zeroed(header(), layout, Endianness::Little, points.len()).unwrap();
            for (i, &(x, y, z, ring)) in points.iter().enumerate() {
                cloud
                    .set_point(i, [f32::from(x), f32::from(y), f32::from(z)])
                    .unwrap();
                cloud
                    .field_bytes_mut(i, "ring")
                    .unwrap()
                    .copy_from_slice(&ring.to_le_bytes());
            }

            let out = cloud.transformed(&lift_and_turn());

            assert_eq!(out.len(), points.len());
            assert_eq!(out.layout(), cloud.layout());
            for (i, &(_, _, _, ring)) in points.iter().enumerate() {
                assert_eq!(out.field_bytes(i, "ring"), Some(&ring.to_le_bytes()[..]));
            }
        }
    }
}

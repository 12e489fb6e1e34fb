//! WKB/EWKB encoder, the mirror of [`crate::decode`].
//!
//! The declared `dimensions` of a value are authoritative: every coordinate
//! tuple must have exactly that many ordinates, and every nested element must
//! declare the same dimensionality as the outermost value.

use crate::cursor::ByteCursor;
use crate::error::{CodecError, Result};
use crate::geometry::{Coord, Geometry, Payload};
use crate::header::{
    header_len, write_type_header, ByteOrder, Dialect, Dimensions, GeometryType, Shape,
};

/// Encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub dialect: Dialect,
    /// Order of every written unit. Defaults to native.
    pub byte_order: ByteOrder,
    /// Maximum geometry-list nesting below the top-level value. Same default
    /// as [`ReadOptions`](crate::decode::ReadOptions), so every accepted value
    /// decodes with default read options.
    pub max_depth: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            byte_order: ByteOrder::NATIVE,
            max_depth: 64,
        }
    }
}

impl WriteOptions {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Encode `geometry` into a freshly allocated buffer of exactly
/// [`encoded_len`] bytes.
///
/// # Example
///
/// ```
/// use geowkb_core::encode::{encode, WriteOptions};
/// use geowkb_core::geometry::Geometry;
/// use geowkb_core::header::{ByteOrder, Dialect, Dimensions};
///
/// let point = Geometry::point(Dimensions::Xy, vec![1.0, 2.0]);
/// let opts = WriteOptions::new(Dialect::Ewkb).with_byte_order(ByteOrder::LittleEndian);
/// let blob = encode(&point, &opts).unwrap();
///
/// assert_eq!(blob.len(), 21);
/// assert_eq!(blob[0], 0x01);
/// assert_eq!(&blob[1..5], &1u32.to_le_bytes());
/// assert_eq!(&blob[5..13], &1.0f64.to_le_bytes());
/// assert_eq!(&blob[13..21], &2.0f64.to_le_bytes());
/// ```
pub fn encode(geometry: &Geometry, options: &WriteOptions) -> Result<Vec<u8>> {
    let len = encoded_len(geometry, options.dialect);
    let mut cursor = ByteCursor::new(vec![0u8; len], options.byte_order);
    encode_into(geometry, &mut cursor, options)?;
    Ok(cursor.into_inner())
}

/// Encode `geometry` at the cursor position, advancing past the written unit.
///
/// The cursor's byte order is used for the flag byte and every value;
/// `options.byte_order` is ignored.
pub fn encode_into<B: AsMut<[u8]>>(
    geometry: &Geometry,
    cursor: &mut ByteCursor<B>,
    options: &WriteOptions,
) -> Result<()> {
    Encoder {
        dialect: options.dialect,
        max_depth: options.max_depth,
    }
    .write_geometry(cursor, geometry, geometry.dimensions, None)
}

/// Byte length of the encoding of `geometry`, computed from its declared
/// dimensionality. Only the top-level SRID is counted, and only for EWKB.
pub fn encoded_len(geometry: &Geometry, dialect: Dialect) -> usize {
    let has_srid = geometry.srid.is_some() && dialect == Dialect::Ewkb;
    header_len(dialect, has_srid) + payload_len(geometry, geometry.dimensions, dialect)
}

fn payload_len(geometry: &Geometry, dims: Dimensions, dialect: Dialect) -> usize {
    let coord = 8 * dims.n_dims();
    match &geometry.payload {
        Payload::Point(_) => coord,
        Payload::Sequence(coords) => 4 + coord * coords.len(),
        Payload::Rings(rings) => 4 + rings.iter().map(|r| 4 + coord * r.len()).sum::<usize>(),
        Payload::Geometries(elements) => {
            4 + elements
                .iter()
                .map(|e| header_len(dialect, false) + payload_len(e, dims, dialect))
                .sum::<usize>()
        }
    }
}

/// Enclosing geometry-list of a nested element and its nesting depth.
#[derive(Clone, Copy)]
struct Parent {
    geometry_type: GeometryType,
    depth: usize,
}

struct Encoder {
    dialect: Dialect,
    max_depth: usize,
}

impl Encoder {
    /// Every header carries the value's own type. Elements of a geometry-list
    /// must be admitted by the enclosing type, so this is the fixed member type
    /// for MultiPoint, MultiLineString, MultiPolygon and PolyhedralSurface.
    fn write_geometry<B: AsMut<[u8]>>(
        &self,
        cursor: &mut ByteCursor<B>,
        geometry: &Geometry,
        dims: Dimensions,
        parent: Option<Parent>,
    ) -> Result<()> {
        let geometry_type = geometry.geometry_type;
        if let Some(parent) = parent {
            if !parent.geometry_type.admits(geometry_type) {
                return Err(CodecError::UnexpectedElementType {
                    parent: parent.geometry_type,
                    found: geometry_type,
                });
            }
            if geometry.srid.is_some() {
                return Err(CodecError::NestedSrid);
            }
        }
        if geometry.dimensions != dims {
            return Err(CodecError::dimensions(dims, geometry.dimensions));
        }

        write_type_header(cursor, self.dialect, geometry_type, dims, geometry.srid)?;

        match (&geometry.payload, geometry_type.shape()) {
            (Payload::Point(coord), Shape::Scalar) => write_coord(cursor, coord, dims),
            (Payload::Sequence(coords), Shape::Sequence) => write_sequence(cursor, coords, dims),
            (Payload::Rings(rings), Shape::RingList) => {
                cursor.write_count(rings.len())?;
                rings
                    .iter()
                    .try_for_each(|ring| write_sequence(cursor, ring, dims))
            }
            (Payload::Geometries(elements), Shape::GeometryList) => {
                let depth = parent.map_or(0, |p| p.depth + 1);
                if depth >= self.max_depth {
                    return Err(CodecError::NestingTooDeep {
                        limit: self.max_depth,
                    });
                }
                let parent = Parent {
                    geometry_type,
                    depth,
                };
                cursor.write_count(elements.len())?;
                elements.iter().try_for_each(|element| {
                    self.write_geometry(cursor, element, dims, Some(parent))
                })
            }
            _ => Err(CodecError::PayloadShapeMismatch { geometry_type }),
        }
    }
}

fn write_coord<B: AsMut<[u8]>>(
    cursor: &mut ByteCursor<B>,
    coord: &Coord,
    dims: Dimensions,
) -> Result<()> {
    if coord.len() != dims.n_dims() {
        return Err(CodecError::arity(dims, coord.len()));
    }
    cursor.write_f64s(coord)
}

fn write_sequence<B: AsMut<[u8]>>(
    cursor: &mut ByteCursor<B>,
    coords: &[Coord],
    dims: Dimensions,
) -> Result<()> {
    cursor.write_count(coords.len())?;
    coords
        .iter()
        .try_for_each(|coord| write_coord(cursor, coord, dims))
}

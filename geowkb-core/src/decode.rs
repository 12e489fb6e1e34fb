//! Recursive-descent WKB/EWKB decoder.
//!
//! One pass, no backtracking: each nested unit is self-describing, so a
//! geometry-list simply decodes `count` consecutive units.

use crate::cursor::ByteCursor;
use crate::error::{CodecError, Result};
use crate::geometry::{Coord, Geometry, Payload};
use crate::header::{
    read_type_header, ByteOrder, Dialect, Dimensions, GeometryType, Shape, TypeHeader,
};

/// Smallest possible nested unit: order flag + type word.
const MIN_UNIT_LEN: usize = 5;

/// Decoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    pub dialect: Dialect,
    /// Order every unit's flag byte must declare. Defaults to native.
    pub byte_order: ByteOrder,
    /// Maximum geometry-list nesting below the top-level value.
    pub max_depth: usize,
    /// Reject bytes left over after the top-level value.
    pub strict: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            byte_order: ByteOrder::NATIVE,
            max_depth: 64,
            strict: true,
        }
    }
}

impl ReadOptions {
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

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Decode one complete unit from `bytes`.
///
/// The resolved top-level type is `geometry.geometry_type`.
///
/// # Example
///
/// ```
/// use geowkb_core::decode::{decode, ReadOptions};
/// use geowkb_core::geometry::Payload;
/// use geowkb_core::header::{ByteOrder, Dialect, GeometryType};
///
/// let mut blob = vec![ByteOrder::NATIVE.flag()];
/// blob.extend_from_slice(&1u32.to_ne_bytes());
/// blob.extend_from_slice(&1.0f64.to_ne_bytes());
/// blob.extend_from_slice(&2.0f64.to_ne_bytes());
///
/// let g = decode(&blob, &ReadOptions::new(Dialect::Ewkb)).unwrap();
/// assert_eq!(g.geometry_type, GeometryType::Point);
/// assert_eq!(g.payload, Payload::Point(vec![1.0, 2.0]));
/// ```
pub fn decode(bytes: &[u8], options: &ReadOptions) -> Result<Geometry> {
    let mut cursor = ByteCursor::new(bytes, options.byte_order);
    let geometry = decode_from(&mut cursor, options)?;
    if options.strict && cursor.remaining() > 0 {
        return Err(CodecError::TrailingBytes {
            remaining: cursor.remaining(),
        });
    }
    Ok(geometry)
}

/// Decode one unit starting at the cursor, leaving the cursor just past it.
pub fn decode_from<B: AsRef<[u8]>>(
    cursor: &mut ByteCursor<B>,
    options: &ReadOptions,
) -> Result<Geometry> {
    Decoder {
        dialect: options.dialect,
        max_depth: options.max_depth,
    }
    .read_geometry(cursor, 0, None)
}

/// Decode only the leading header of `bytes`.
///
/// # Example
///
/// ```
/// use geowkb_core::decode::{read_header, ReadOptions};
/// use geowkb_core::header::{ByteOrder, Dialect, Dimensions, GeometryType, EWKB_SRID_FLAG, EWKB_Z_FLAG};
///
/// let mut blob = vec![ByteOrder::NATIVE.flag()];
/// blob.extend_from_slice(&(3 | EWKB_Z_FLAG | EWKB_SRID_FLAG).to_ne_bytes());
/// blob.extend_from_slice(&4326u32.to_ne_bytes());
///
/// let hdr = read_header(&blob, &ReadOptions::new(Dialect::Ewkb)).unwrap();
/// assert_eq!(hdr.geometry_type, GeometryType::Polygon);
/// assert_eq!(hdr.dimensions, Dimensions::Xyz);
/// assert_eq!(hdr.srid, Some(4326));
/// assert_eq!(hdr.data_offset, 9);
/// ```
pub fn read_header(bytes: &[u8], options: &ReadOptions) -> Result<TypeHeader> {
    let mut cursor = ByteCursor::new(bytes, options.byte_order);
    read_type_header(&mut cursor, options.dialect, false)
}

/// Enclosing geometry-list of a nested unit.
#[derive(Clone, Copy)]
struct Parent {
    geometry_type: GeometryType,
    dimensions: Dimensions,
}

struct Decoder {
    dialect: Dialect,
    max_depth: usize,
}

impl Decoder {
    fn read_geometry<B: AsRef<[u8]>>(
        &self,
        cursor: &mut ByteCursor<B>,
        depth: usize,
        parent: Option<Parent>,
    ) -> Result<Geometry> {
        let header = read_type_header(cursor, self.dialect, parent.is_some())?;

        if let Some(parent) = parent {
            if !parent.geometry_type.admits(header.geometry_type) {
                return Err(CodecError::UnexpectedElementType {
                    parent: parent.geometry_type,
                    found: header.geometry_type,
                });
            }
            if header.dimensions != parent.dimensions {
                return Err(CodecError::dimensions(parent.dimensions, header.dimensions));
            }
        }

        let n_dims = header.dimensions.n_dims();
        let payload = match header.geometry_type.shape() {
            Shape::Scalar => Payload::Point(read_coord(cursor, n_dims)?),
            Shape::Sequence => Payload::Sequence(read_sequence(cursor, n_dims)?),
            Shape::RingList => Payload::Rings(read_rings(cursor, n_dims)?),
            Shape::GeometryList => {
                if depth >= self.max_depth {
                    return Err(CodecError::NestingTooDeep {
                        limit: self.max_depth,
                    });
                }
                let parent = Parent {
                    geometry_type: header.geometry_type,
                    dimensions: header.dimensions,
                };
                let count = cursor.read_count(MIN_UNIT_LEN)?;
                let mut elements = Vec::with_capacity(count);
                for _ in 0..count {
                    elements.push(self.read_geometry(cursor, depth + 1, Some(parent))?);
                }
                Payload::Geometries(elements)
            }
        };

        Ok(Geometry {
            geometry_type: header.geometry_type,
            dimensions: header.dimensions,
            srid: header.srid,
            payload,
        })
    }
}

fn read_coord<B: AsRef<[u8]>>(cursor: &mut ByteCursor<B>, n_dims: usize) -> Result<Coord> {
    cursor.read_f64s(n_dims)
}

fn read_sequence<B: AsRef<[u8]>>(cursor: &mut ByteCursor<B>, n_dims: usize) -> Result<Vec<Coord>> {
    let count = cursor.read_count(8 * n_dims)?;
    (0..count).map(|_| read_coord(cursor, n_dims)).collect()
}

fn read_rings<B: AsRef<[u8]>>(
    cursor: &mut ByteCursor<B>,
    n_dims: usize,
) -> Result<Vec<Vec<Coord>>> {
    let count = cursor.read_count(4)?;
    (0..count).map(|_| read_sequence(cursor, n_dims)).collect()
}

//! In-memory geometry values exchanged with the codec.

use crate::error::{CodecError, Result};
use crate::header::{Dimensions, GeometryType, Shape};

/// One coordinate tuple: x, y, then z and/or m per the owning [`Dimensions`].
pub type Coord = Vec<f64>;

/// Payload of a geometry value, one variant per [`Shape`].
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Point(Coord),
    Sequence(Vec<Coord>),
    Rings(Vec<Vec<Coord>>),
    Geometries(Vec<Geometry>),
}

impl Payload {
    pub fn shape(&self) -> Shape {
        match self {
            Payload::Point(_) => Shape::Scalar,
            Payload::Sequence(_) => Shape::Sequence,
            Payload::Rings(_) => Shape::RingList,
            Payload::Geometries(_) => Shape::GeometryList,
        }
    }
}

/// A decoded (or to-be-encoded) geometry.
///
/// `srid` is only meaningful on the outermost value; elements of a
/// geometry-list never carry one on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub geometry_type: GeometryType,
    pub dimensions: Dimensions,
    pub srid: Option<u32>,
    pub payload: Payload,
}

impl Geometry {
    /// Build a value, checking that `payload` has the shape of `geometry_type`.
    pub fn new(
        geometry_type: GeometryType,
        dimensions: Dimensions,
        payload: Payload,
    ) -> Result<Self> {
        if payload.shape() != geometry_type.shape() {
            return Err(CodecError::PayloadShapeMismatch { geometry_type });
        }
        Ok(Self {
            geometry_type,
            dimensions,
            srid: None,
            payload,
        })
    }

    /// Build a value from host-side type and dimension names.
    ///
    /// # Example
    ///
    /// ```
    /// use geowkb_core::geometry::{Geometry, Payload};
    /// use geowkb_core::header::{Dimensions, GeometryType};
    ///
    /// let g = Geometry::from_parts("LINESTRING", "XYZ", Some(4326),
    ///     Payload::Sequence(vec![vec![0.0, 0.0, 1.0], vec![1.0, 1.0, 2.0]])).unwrap();
    /// assert_eq!(g.geometry_type, GeometryType::LineString);
    /// assert_eq!(g.dimensions, Dimensions::Xyz);
    ///
    /// assert!(Geometry::from_parts("BLOB", "XY", None, Payload::Point(vec![0.0, 0.0])).is_err());
    /// ```
    pub fn from_parts(
        type_name: &str,
        dimensions: &str,
        srid: Option<u32>,
        payload: Payload,
    ) -> Result<Self> {
        let geometry_type = type_name.parse()?;
        let dimensions = dimensions.parse()?;
        Ok(Self::new(geometry_type, dimensions, payload)?.with_srid(srid))
    }

    pub fn point(dimensions: Dimensions, coord: Coord) -> Self {
        Self {
            geometry_type: GeometryType::Point,
            dimensions,
            srid: None,
            payload: Payload::Point(coord),
        }
    }

    pub fn line_string(dimensions: Dimensions, coords: Vec<Coord>) -> Self {
        Self {
            geometry_type: GeometryType::LineString,
            dimensions,
            srid: None,
            payload: Payload::Sequence(coords),
        }
    }

    pub fn polygon(dimensions: Dimensions, rings: Vec<Vec<Coord>>) -> Self {
        Self {
            geometry_type: GeometryType::Polygon,
            dimensions,
            srid: None,
            payload: Payload::Rings(rings),
        }
    }

    /// A MultiPoint whose elements are the given coordinates.
    pub fn multi_point(dimensions: Dimensions, coords: Vec<Coord>) -> Self {
        let points = coords
            .into_iter()
            .map(|c| Self::point(dimensions, c))
            .collect();
        Self {
            geometry_type: GeometryType::MultiPoint,
            dimensions,
            srid: None,
            payload: Payload::Geometries(points),
        }
    }

    /// Any geometry-list type over `elements`.
    pub fn collection(
        geometry_type: GeometryType,
        dimensions: Dimensions,
        elements: Vec<Geometry>,
    ) -> Result<Self> {
        Self::new(geometry_type, dimensions, Payload::Geometries(elements))
    }

    pub fn with_srid(mut self, srid: Option<u32>) -> Self {
        self.srid = srid;
        self
    }

    /// Total number of coordinate tuples, including nested elements.
    pub fn coord_count(&self) -> usize {
        match &self.payload {
            Payload::Point(_) => 1,
            Payload::Sequence(coords) => coords.len(),
            Payload::Rings(rings) => rings.iter().map(Vec::len).sum(),
            Payload::Geometries(elements) => elements.iter().map(Geometry::coord_count).sum(),
        }
    }

    /// Number of direct elements of a geometry-list, 1 otherwise.
    pub fn num_geometries(&self) -> usize {
        match &self.payload {
            Payload::Geometries(elements) => elements.len(),
            _ => 1,
        }
    }
}

//! Conversions between codec values and `geo::Geometry<f64>`.
//!
//! geo is XY-only and has no curve or surface types, so Z/M values and the
//! curve family are rejected rather than flattened.

use geo::{
    Coord, Geometry as GeoGeometry, GeometryCollection, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon, Triangle,
};
use geowkb_core::decode::{decode, ReadOptions};
use geowkb_core::encode::{encode, WriteOptions};
use geowkb_core::geometry::{Coord as WkbCoord, Geometry, Payload};
use geowkb_core::header::{Dimensions, GeometryType};
use geowkb_core::CodecError;

use crate::error::{GeoConvertError, Result};

/// Reject Z/M coordinate layouts.
pub fn ensure_xy_only(dims: Dimensions) -> Result<()> {
    if dims != Dimensions::Xy {
        return Err(GeoConvertError::UnsupportedDimensions {
            dimensions: dims.as_str(),
        });
    }
    Ok(())
}

fn geo_coord(c: &WkbCoord) -> Result<Coord<f64>> {
    match c.as_slice() {
        [x, y] => Ok(Coord { x: *x, y: *y }),
        _ => Err(CodecError::DimensionalityMismatch {
            expected: "XY (2 ordinates)".to_string(),
            found: format!("{} ordinates", c.len()),
        }
        .into()),
    }
}

fn geo_line_string(coords: &[WkbCoord]) -> Result<LineString<f64>> {
    Ok(LineString::new(
        coords.iter().map(geo_coord).collect::<Result<_>>()?,
    ))
}

fn geo_polygon(rings: &[Vec<WkbCoord>]) -> Result<Polygon<f64>> {
    let mut rings = rings
        .iter()
        .map(|r| geo_line_string(r))
        .collect::<Result<Vec<_>>>()?
        .into_iter();
    let exterior = rings.next().unwrap_or_else(|| LineString::new(vec![]));
    Ok(Polygon::new(exterior, rings.collect()))
}

fn unsupported(t: GeometryType) -> GeoConvertError {
    GeoConvertError::UnsupportedConversion(t)
}

fn elements(g: &Geometry) -> Result<&[Geometry]> {
    match &g.payload {
        Payload::Geometries(elements) => Ok(elements),
        _ => Err(CodecError::PayloadShapeMismatch {
            geometry_type: g.geometry_type,
        }
        .into()),
    }
}

/// Convert a codec value to `geo`. The SRID is not carried over.
///
/// # Example
///
/// ```
/// use geowkb_core::geometry::Geometry;
/// use geowkb_core::header::Dimensions;
/// use geowkb_geo::to_geo;
///
/// let g = Geometry::point(Dimensions::Xy, vec![1.0, 2.0]);
/// assert_eq!(to_geo(&g).unwrap(), geo::Geometry::Point(geo::Point::new(1.0, 2.0)));
///
/// let z = Geometry::point(Dimensions::Xyz, vec![1.0, 2.0, 3.0]);
/// assert!(to_geo(&z).is_err());
/// ```
pub fn to_geo(g: &Geometry) -> Result<GeoGeometry<f64>> {
    ensure_xy_only(g.dimensions)?;
    let shape_error = || -> GeoConvertError {
        CodecError::PayloadShapeMismatch {
            geometry_type: g.geometry_type,
        }
        .into()
    };

    let out = match (g.geometry_type, &g.payload) {
        (GeometryType::Point, Payload::Point(c)) => GeoGeometry::Point(Point(geo_coord(c)?)),
        (GeometryType::LineString, Payload::Sequence(coords)) => {
            GeoGeometry::LineString(geo_line_string(coords)?)
        }
        (GeometryType::Polygon, Payload::Rings(rings)) => GeoGeometry::Polygon(geo_polygon(rings)?),
        (GeometryType::Triangle, Payload::Rings(rings)) => {
            let ring = rings.first().map(Vec::as_slice).unwrap_or_default();
            if ring.len() < 3 {
                return Err(GeoConvertError::InvalidTriangle(ring.len()));
            }
            GeoGeometry::Triangle(Triangle::new(
                geo_coord(&ring[0])?,
                geo_coord(&ring[1])?,
                geo_coord(&ring[2])?,
            ))
        }
        (GeometryType::MultiPoint, _) => GeoGeometry::MultiPoint(MultiPoint::new(
            elements(g)?
                .iter()
                .map(|e| match to_geo(e)? {
                    GeoGeometry::Point(p) => Ok(p),
                    _ => Err(unsupported(e.geometry_type)),
                })
                .collect::<Result<_>>()?,
        )),
        (GeometryType::MultiLineString, _) => GeoGeometry::MultiLineString(MultiLineString::new(
            elements(g)?
                .iter()
                .map(|e| match to_geo(e)? {
                    GeoGeometry::LineString(ls) => Ok(ls),
                    _ => Err(unsupported(e.geometry_type)),
                })
                .collect::<Result<_>>()?,
        )),
        (GeometryType::MultiPolygon, _) => GeoGeometry::MultiPolygon(MultiPolygon::new(
            elements(g)?
                .iter()
                .map(|e| match to_geo(e)? {
                    GeoGeometry::Polygon(p) => Ok(p),
                    _ => Err(unsupported(e.geometry_type)),
                })
                .collect::<Result<_>>()?,
        )),
        (GeometryType::GeometryCollection, _) => GeoGeometry::GeometryCollection(GeometryCollection(
            elements(g)?.iter().map(to_geo).collect::<Result<_>>()?,
        )),
        (
            GeometryType::Point
            | GeometryType::LineString
            | GeometryType::Polygon
            | GeometryType::Triangle,
            _,
        ) => return Err(shape_error()),
        (other, _) => return Err(unsupported(other)),
    };
    Ok(out)
}

fn wkb_coord(c: Coord<f64>) -> WkbCoord {
    vec![c.x, c.y]
}

fn wkb_path(ls: &LineString<f64>) -> Vec<WkbCoord> {
    ls.0.iter().copied().map(wkb_coord).collect()
}

fn wkb_polygon(p: &Polygon<f64>) -> Geometry {
    let mut rings = Vec::with_capacity(1 + p.interiors().len());
    // An empty exterior still holds the first slot when holes follow it.
    if !p.exterior().0.is_empty() || !p.interiors().is_empty() {
        rings.push(wkb_path(p.exterior()));
    }
    rings.extend(p.interiors().iter().map(wkb_path));
    Geometry::polygon(Dimensions::Xy, rings)
}

fn wkb_list(t: GeometryType, elements: Vec<Geometry>) -> Geometry {
    Geometry {
        geometry_type: t,
        dimensions: Dimensions::Xy,
        srid: None,
        payload: Payload::Geometries(elements),
    }
}

/// Convert a `geo` geometry to a codec value with the given SRID.
///
/// `Line` becomes a two-vertex LineString, `Rect` a Polygon and `Triangle`
/// a Triangle with a closed ring.
pub fn from_geo(g: &GeoGeometry<f64>, srid: Option<u32>) -> Geometry {
    let out = match g {
        GeoGeometry::Point(p) => Geometry::point(Dimensions::Xy, wkb_coord(p.0)),
        GeoGeometry::Line(l) => {
            Geometry::line_string(Dimensions::Xy, vec![wkb_coord(l.start), wkb_coord(l.end)])
        }
        GeoGeometry::LineString(ls) => Geometry::line_string(Dimensions::Xy, wkb_path(ls)),
        GeoGeometry::Polygon(p) => wkb_polygon(p),
        GeoGeometry::Rect(r) => wkb_polygon(&r.to_polygon()),
        GeoGeometry::Triangle(t) => {
            let [a, b, c] = t.to_array();
            Geometry {
                geometry_type: GeometryType::Triangle,
                dimensions: Dimensions::Xy,
                srid: None,
                payload: Payload::Rings(vec![vec![
                    wkb_coord(a),
                    wkb_coord(b),
                    wkb_coord(c),
                    wkb_coord(a),
                ]]),
            }
        }
        GeoGeometry::MultiPoint(mp) => Geometry::multi_point(
            Dimensions::Xy,
            mp.0.iter().map(|p| wkb_coord(p.0)).collect(),
        ),
        GeoGeometry::MultiLineString(mls) => wkb_list(
            GeometryType::MultiLineString,
            mls.0
                .iter()
                .map(|ls| Geometry::line_string(Dimensions::Xy, wkb_path(ls)))
                .collect(),
        ),
        GeoGeometry::MultiPolygon(mp) => wkb_list(
            GeometryType::MultiPolygon,
            mp.0.iter().map(wkb_polygon).collect(),
        ),
        GeoGeometry::GeometryCollection(gc) => wkb_list(
            GeometryType::GeometryCollection,
            gc.0.iter().map(|e| from_geo(e, None)).collect(),
        ),
    };
    out.with_srid(srid)
}

/// Decode a WKB/EWKB blob straight to `geo`.
/// Returns `(geometry, srid)`.
///
/// # Example
///
/// ```
/// use geowkb_core::{encode, Dialect, ReadOptions, WriteOptions};
/// use geowkb_geo::{decode_geo, from_geo};
///
/// let line = geo::Geometry::LineString(geo::LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]));
/// let blob = encode(&from_geo(&line, Some(4326)), &WriteOptions::new(Dialect::Ewkb)).unwrap();
///
/// let (back, srid) = decode_geo(&blob, &ReadOptions::new(Dialect::Ewkb)).unwrap();
/// assert_eq!(back, line);
/// assert_eq!(srid, Some(4326));
/// ```
pub fn decode_geo(bytes: &[u8], options: &ReadOptions) -> Result<(GeoGeometry<f64>, Option<u32>)> {
    let g = decode(bytes, options)?;
    Ok((to_geo(&g)?, g.srid))
}

/// Encode a `geo` geometry, embedding `srid` when the dialect is EWKB.
pub fn encode_geo(
    g: &GeoGeometry<f64>,
    srid: Option<u32>,
    options: &WriteOptions,
) -> Result<Vec<u8>> {
    Ok(encode(&from_geo(g, srid), options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point, polygon, Line, Rect};

    #[test]
    fn point_round_trip() {
        let p = GeoGeometry::Point(point!(x: 3.0, y: -4.0));
        assert_eq!(to_geo(&from_geo(&p, None)).unwrap(), p);
    }

    #[test]
    fn polygon_with_hole_keeps_ring_order() {
        let p = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 0.0)],
            interiors: [[(x: 1.0, y: 1.0), (x: 2.0, y: 1.0), (x: 2.0, y: 2.0), (x: 1.0, y: 1.0)]]
        );
        let g = from_geo(&GeoGeometry::Polygon(p.clone()), Some(4326));
        assert_eq!(g.srid, Some(4326));
        match &g.payload {
            Payload::Rings(rings) => {
                assert_eq!(rings.len(), 2);
                assert_eq!(rings[1][0], vec![1.0, 1.0]);
            }
            other => panic!("expected rings, got {other:?}"),
        }
        assert_eq!(to_geo(&g).unwrap(), GeoGeometry::Polygon(p));
    }

    #[test]
    fn empty_exterior_keeps_its_slot_before_holes() {
        let hole = LineString::from(vec![(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 1.0)]);
        let p = Polygon::new(LineString::new(vec![]), vec![hole]);
        let g = from_geo(&GeoGeometry::Polygon(p.clone()), None);
        match &g.payload {
            Payload::Rings(rings) => {
                assert_eq!(rings.len(), 2);
                assert!(rings[0].is_empty());
                assert_eq!(rings[1].len(), 4);
            }
            other => panic!("expected rings, got {other:?}"),
        }
        assert_eq!(to_geo(&g).unwrap(), GeoGeometry::Polygon(p));

        let bare = Polygon::new(LineString::new(vec![]), vec![]);
        let empty = from_geo(&GeoGeometry::Polygon(bare), None);
        assert_eq!(empty.payload, Payload::Rings(vec![]));
    }

    #[test]
    fn line_and_rect_are_normalised() {
        let line = GeoGeometry::Line(Line::new((0.0, 0.0), (1.0, 2.0)));
        let g = from_geo(&line, None);
        assert_eq!(g.geometry_type, GeometryType::LineString);
        assert_eq!(g.coord_count(), 2);

        let rect = GeoGeometry::Rect(Rect::new((0.0, 0.0), (1.0, 1.0)));
        let g = from_geo(&rect, None);
        assert_eq!(g.geometry_type, GeometryType::Polygon);
        assert_eq!(g.coord_count(), 5);
    }

    #[test]
    fn triangle_ring_is_closed() {
        let t = GeoGeometry::Triangle(Triangle::new(
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 0.0, y: 1.0 },
        ));
        let g = from_geo(&t, None);
        assert_eq!(g.geometry_type, GeometryType::Triangle);
        assert_eq!(g.coord_count(), 4);
        assert_eq!(to_geo(&g).unwrap(), t);
    }

    #[test]
    fn nested_collection_converts_recursively() {
        let gc = GeoGeometry::GeometryCollection(GeometryCollection(vec![
            GeoGeometry::Point(point!(x: 1.0, y: 1.0)),
            GeoGeometry::GeometryCollection(GeometryCollection(vec![GeoGeometry::LineString(
                line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)],
            )])),
        ]));
        let g = from_geo(&gc, Some(3857));
        match &g.payload {
            Payload::Geometries(elements) => assert!(elements.iter().all(|e| e.srid.is_none())),
            other => panic!("expected geometries, got {other:?}"),
        }
        assert_eq!(to_geo(&g).unwrap(), gc);
    }

    #[test]
    fn zm_values_are_rejected() {
        let g = Geometry::point(Dimensions::Xym, vec![1.0, 2.0, 3.0]);
        match to_geo(&g) {
            Err(GeoConvertError::UnsupportedDimensions { dimensions }) => {
                assert_eq!(dimensions, "XYM")
            }
            other => panic!("expected dimension error, got {other:?}"),
        }
    }

    #[test]
    fn curves_have_no_geo_counterpart() {
        let arc = Geometry::new(
            GeometryType::CircularString,
            Dimensions::Xy,
            Payload::Sequence(vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, 0.0]]),
        )
        .unwrap();
        assert!(matches!(
            to_geo(&arc),
            Err(GeoConvertError::UnsupportedConversion(
                GeometryType::CircularString
            ))
        ));

        let gc = Geometry::collection(GeometryType::GeometryCollection, Dimensions::Xy, vec![arc])
            .unwrap();
        assert!(to_geo(&gc).is_err());
    }

    #[test]
    fn short_coordinate_is_an_error_not_a_panic() {
        let g = Geometry::line_string(Dimensions::Xy, vec![vec![0.0, 0.0], vec![1.0]]);
        assert!(matches!(
            to_geo(&g),
            Err(GeoConvertError::Codec(CodecError::DimensionalityMismatch { .. }))
        ));
    }

    #[test]
    fn degenerate_triangle_is_rejected() {
        let g = Geometry::new(
            GeometryType::Triangle,
            Dimensions::Xy,
            Payload::Rings(vec![vec![vec![0.0, 0.0], vec![1.0, 1.0]]]),
        )
        .unwrap();
        assert!(matches!(
            to_geo(&g),
            Err(GeoConvertError::InvalidTriangle(2))
        ));
    }
}

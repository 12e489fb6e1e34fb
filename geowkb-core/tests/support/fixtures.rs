//! Sample geometries covering all 17 types at any dimensionality.

#![allow(dead_code)]

use geowkb_core::{Coord, Dimensions, Geometry, GeometryType, Payload};

pub const ALL_DIMENSIONS: [Dimensions; 4] = [
    Dimensions::Xy,
    Dimensions::Xyz,
    Dimensions::Xym,
    Dimensions::Xyzm,
];

/// Coordinate `(x, y)` padded with z = x + y and m = x - y as needed.
pub fn coord(dims: Dimensions, x: f64, y: f64) -> Coord {
    let mut c = vec![x, y];
    if dims.has_z() {
        c.push(x + y);
    }
    if dims.has_m() {
        c.push(x - y);
    }
    c
}

pub fn path(dims: Dimensions, pts: &[(f64, f64)]) -> Vec<Coord> {
    pts.iter().map(|&(x, y)| coord(dims, x, y)).collect()
}

fn ring(dims: Dimensions, x0: f64) -> Vec<Coord> {
    path(
        dims,
        &[(x0, 0.0), (x0 + 1.0, 0.0), (x0 + 1.0, 1.0), (x0, 0.0)],
    )
}

fn of(t: GeometryType, dims: Dimensions, payload: Payload) -> Geometry {
    Geometry::new(t, dims, payload).expect("fixture payload matches its type")
}

/// One representative value of `t`.
pub fn sample(t: GeometryType, dims: Dimensions) -> Geometry {
    use GeometryType::*;
    let seq = |pts: &[(f64, f64)]| Payload::Sequence(path(dims, pts));
    let line = || of(LineString, dims, seq(&[(0.0, 0.0), (1.0, 2.0), (3.0, -1.5)]));
    let arc = || of(CircularString, dims, seq(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]));
    let polygon = |x0: f64| {
        of(
            Polygon,
            dims,
            Payload::Rings(vec![ring(dims, x0), ring(dims, x0 + 0.25)]),
        )
    };
    let list = |elements: Vec<Geometry>| Payload::Geometries(elements);
    let compound = || of(CompoundCurve, dims, list(vec![arc(), line()]));
    let curve_polygon = || of(CurvePolygon, dims, list(vec![compound(), line()]));

    match t {
        Point => Geometry::point(dims, coord(dims, 1.0, 2.0)),
        LineString => line(),
        CircularString => arc(),
        Curve => of(Curve, dims, seq(&[(5.0, 5.0), (6.0, 7.0)])),
        Polygon => polygon(0.0),
        Surface => of(Surface, dims, Payload::Rings(vec![ring(dims, 9.0)])),
        Triangle => of(Triangle, dims, Payload::Rings(vec![ring(dims, -3.0)])),
        MultiPoint => Geometry::multi_point(dims, path(dims, &[(0.0, 0.0), (1.0, 1.0)])),
        MultiLineString => of(MultiLineString, dims, list(vec![line(), line()])),
        MultiPolygon => of(MultiPolygon, dims, list(vec![polygon(0.0), polygon(5.0)])),
        GeometryCollection => of(
            GeometryCollection,
            dims,
            list(vec![
                Geometry::point(dims, coord(dims, 4.0, 4.0)),
                line(),
                polygon(2.0),
                of(GeometryCollection, dims, list(vec![arc(), curve_polygon()])),
            ]),
        ),
        CompoundCurve => compound(),
        CurvePolygon => curve_polygon(),
        MultiCurve => of(MultiCurve, dims, list(vec![line(), arc(), compound()])),
        MultiSurface => of(MultiSurface, dims, list(vec![polygon(1.0), curve_polygon()])),
        PolyhedralSurface => of(PolyhedralSurface, dims, list(vec![polygon(0.0), polygon(1.0)])),
        Tin => of(Tin, dims, list(vec![polygon(0.0)])),
    }
}

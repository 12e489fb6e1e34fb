//! Geometry type table and the leading type header of a WKB unit.
//!
//! Wire format of the header:
//!
//! ```text
//! [0x01|0x00]   byte order flag (1 = little-endian, 0 = big-endian)
//! [u32]         type word, interpreted per dialect:
//!                 EWKB: bits 0-7 geometry type, bit 31 (0x80000000) Z,
//!                       bit 30 (0x40000000) M, bit 29 (0x20000000) SRID
//!                 ISO:  type + 1000 (Z), + 2000 (M), + 3000 (ZM)
//! [u32]         SRID (EWKB only, when the SRID bit is set)
//! ```

use std::fmt;
use std::str::FromStr;

use crate::cursor::ByteCursor;
use crate::error::{CodecError, Result};

// ── EWKB flag constants ───────────────────────────────────────────────────────
pub const EWKB_Z_FLAG: u32 = 0x80000000;
pub const EWKB_M_FLAG: u32 = 0x40000000;
pub const EWKB_SRID_FLAG: u32 = 0x20000000;
pub const EWKB_TYPE_MASK: u32 = 0x000000FF;

/// Byte order, numbered as the WKB order flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ByteOrder {
    BigEndian = 0,
    LittleEndian = 1,
}

impl ByteOrder {
    /// The byte order of the target platform.
    pub const NATIVE: ByteOrder = if cfg!(target_endian = "little") {
        ByteOrder::LittleEndian
    } else {
        ByteOrder::BigEndian
    };

    pub fn flag(self) -> u8 {
        self as u8
    }

    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(ByteOrder::BigEndian),
            1 => Some(ByteOrder::LittleEndian),
            _ => None,
        }
    }

    pub fn is_native(self) -> bool {
        self == Self::NATIVE
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        Self::NATIVE
    }
}

/// Header convention for the type word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// ISO SQL/MM: dimensionality as a 1000s offset, no inline SRID.
    #[default]
    Iso,
    /// PostGIS EWKB: Z/M/SRID as high bits of the type word.
    Ewkb,
}

/// Coordinate dimensionality of a geometry value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dimensions {
    #[default]
    Xy,
    Xyz,
    Xym,
    Xyzm,
}

impl Dimensions {
    pub fn from_zm(has_z: bool, has_m: bool) -> Self {
        match (has_z, has_m) {
            (false, false) => Dimensions::Xy,
            (true, false) => Dimensions::Xyz,
            (false, true) => Dimensions::Xym,
            (true, true) => Dimensions::Xyzm,
        }
    }

    /// Ordinates per coordinate tuple.
    pub fn n_dims(self) -> usize {
        match self {
            Dimensions::Xy => 2,
            Dimensions::Xyz | Dimensions::Xym => 3,
            Dimensions::Xyzm => 4,
        }
    }

    pub fn has_z(self) -> bool {
        matches!(self, Dimensions::Xyz | Dimensions::Xyzm)
    }

    pub fn has_m(self) -> bool {
        matches!(self, Dimensions::Xym | Dimensions::Xyzm)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dimensions::Xy => "XY",
            Dimensions::Xyz => "XYZ",
            Dimensions::Xym => "XYM",
            Dimensions::Xyzm => "XYZM",
        }
    }

    /// ISO selector: `type_word / 1000`.
    pub fn iso_code(self) -> u32 {
        match self {
            Dimensions::Xy => 0,
            Dimensions::Xyz => 1,
            Dimensions::Xym => 2,
            Dimensions::Xyzm => 3,
        }
    }

    pub fn from_iso_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Dimensions::Xy),
            1 => Ok(Dimensions::Xyz),
            2 => Ok(Dimensions::Xym),
            3 => Ok(Dimensions::Xyzm),
            other => Err(CodecError::UnknownDimensionCode(other)),
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimensions {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        [
            Dimensions::Xy,
            Dimensions::Xyz,
            Dimensions::Xym,
            Dimensions::Xyzm,
        ]
        .into_iter()
        .find(|d| d.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| CodecError::UnknownDimensions(s.to_string()))
    }
}

/// The 17 simple-features geometry types, numbered by their base type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum GeometryType {
    Point = 1,
    LineString = 2,
    Polygon = 3,
    MultiPoint = 4,
    MultiLineString = 5,
    MultiPolygon = 6,
    GeometryCollection = 7,
    CircularString = 8,
    CompoundCurve = 9,
    CurvePolygon = 10,
    MultiCurve = 11,
    MultiSurface = 12,
    Curve = 13,
    Surface = 14,
    PolyhedralSurface = 15,
    Tin = 16,
    Triangle = 17,
}

/// Type code ↔ name table shared by the decoder and the encoder.
const TYPE_TABLE: [(GeometryType, &str); 17] = [
    (GeometryType::Point, "POINT"),
    (GeometryType::LineString, "LINESTRING"),
    (GeometryType::Polygon, "POLYGON"),
    (GeometryType::MultiPoint, "MULTIPOINT"),
    (GeometryType::MultiLineString, "MULTILINESTRING"),
    (GeometryType::MultiPolygon, "MULTIPOLYGON"),
    (GeometryType::GeometryCollection, "GEOMETRYCOLLECTION"),
    (GeometryType::CircularString, "CIRCULARSTRING"),
    (GeometryType::CompoundCurve, "COMPOUNDCURVE"),
    (GeometryType::CurvePolygon, "CURVEPOLYGON"),
    (GeometryType::MultiCurve, "MULTICURVE"),
    (GeometryType::MultiSurface, "MULTISURFACE"),
    (GeometryType::Curve, "CURVE"),
    (GeometryType::Surface, "SURFACE"),
    (GeometryType::PolyhedralSurface, "POLYHEDRALSURFACE"),
    (GeometryType::Tin, "TIN"),
    (GeometryType::Triangle, "TRIANGLE"),
];

const LINEAR_CURVES: &[GeometryType] = &[GeometryType::LineString, GeometryType::CircularString];
const CURVES: &[GeometryType] = &[
    GeometryType::LineString,
    GeometryType::CircularString,
    GeometryType::CompoundCurve,
];
const SURFACES: &[GeometryType] = &[GeometryType::Polygon, GeometryType::CurvePolygon];

/// Payload layout following the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// One coordinate tuple.
    Scalar,
    /// Count-prefixed coordinate tuples.
    Sequence,
    /// Count-prefixed list of sequences.
    RingList,
    /// Count-prefixed list of complete nested units.
    GeometryList,
}

/// Which element types a geometry-list admits. Every element header carries
/// the element's own type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Members {
    /// Every element has this type (a TIN also admits triangles).
    Fixed(GeometryType),
    /// Restricted to the listed types.
    OneOf(&'static [GeometryType]),
    /// Any type allowed.
    Any,
}

impl GeometryType {
    pub const ALL: [GeometryType; 17] = {
        let mut all = [GeometryType::Point; 17];
        let mut i = 0;
        while i < 17 {
            all[i] = TYPE_TABLE[i].0;
            i += 1;
        }
        all
    };

    pub fn code(self) -> u32 {
        self as u32
    }

    /// Resolve a base type code (`sf_type`).
    pub fn from_code(code: u32) -> Result<Self> {
        TYPE_TABLE
            .iter()
            .find(|(t, _)| t.code() == code)
            .map(|(t, _)| *t)
            .ok_or(CodecError::UnsupportedGeometryType(code))
    }

    /// Upper-case type name, e.g. `"MULTIPOLYGON"`.
    pub fn name(self) -> &'static str {
        TYPE_TABLE[self.code() as usize - 1].1
    }

    pub fn shape(self) -> Shape {
        use GeometryType::*;
        match self {
            Point => Shape::Scalar,
            LineString | CircularString | Curve => Shape::Sequence,
            Polygon | Surface | Triangle => Shape::RingList,
            MultiPoint | MultiLineString | MultiPolygon | GeometryCollection | CompoundCurve
            | CurvePolygon | MultiCurve | MultiSurface | PolyhedralSurface | Tin => {
                Shape::GeometryList
            }
        }
    }

    /// Element rule for geometry-list types, `None` for the other shapes.
    pub fn members(self) -> Option<Members> {
        use GeometryType::*;
        match self {
            MultiPoint => Some(Members::Fixed(Point)),
            MultiLineString => Some(Members::Fixed(LineString)),
            MultiPolygon | PolyhedralSurface | Tin => Some(Members::Fixed(Polygon)),
            CompoundCurve => Some(Members::OneOf(LINEAR_CURVES)),
            CurvePolygon | MultiCurve => Some(Members::OneOf(CURVES)),
            MultiSurface => Some(Members::OneOf(SURFACES)),
            GeometryCollection => Some(Members::Any),
            _ => None,
        }
    }

    /// Whether an element of type `element` may appear inside `self`.
    /// Shared by the decoder and the encoder.
    pub fn admits(self, element: GeometryType) -> bool {
        match self.members() {
            None => false,
            Some(Members::Any) => true,
            Some(Members::OneOf(types)) => types.contains(&element),
            Some(Members::Fixed(fixed)) => {
                element == fixed
                    || (self == GeometryType::Tin && element == GeometryType::Triangle)
            }
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeometryType {
    type Err = CodecError;

    /// Look a type up by name; an `sfc_` prefix is ignored.
    fn from_str(s: &str) -> Result<Self> {
        let name = s
            .strip_prefix("sfc_")
            .or_else(|| s.strip_prefix("SFC_"))
            .unwrap_or(s);
        TYPE_TABLE
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(t, _)| *t)
            .ok_or_else(|| CodecError::UnknownGeometryType(s.to_string()))
    }
}

/// Compose the 4-byte type word for `geometry_type`.
///
/// # Example
///
/// ```
/// use geowkb_core::header::{type_word, Dialect, Dimensions, GeometryType};
///
/// assert_eq!(type_word(GeometryType::Polygon, Dimensions::Xyz, Dialect::Iso), 1003);
/// assert_eq!(
///     type_word(GeometryType::Polygon, Dimensions::Xyz, Dialect::Ewkb),
///     0x8000_0003
/// );
/// ```
pub fn type_word(geometry_type: GeometryType, dims: Dimensions, dialect: Dialect) -> u32 {
    let code = geometry_type.code();
    match dialect {
        Dialect::Ewkb => {
            let mut word = code;
            if dims.has_z() {
                word |= EWKB_Z_FLAG;
            }
            if dims.has_m() {
                word |= EWKB_M_FLAG;
            }
            word
        }
        Dialect::Iso => code + 1000 * dims.iso_code(),
    }
}

/// Split a type word into its raw base type code and dimensionality.
///
/// Also reports whether the EWKB SRID bit is set (always false for ISO).
pub fn split_type_word(word: u32, dialect: Dialect) -> Result<(u32, Dimensions, bool)> {
    match dialect {
        Dialect::Ewkb => {
            let dims =
                Dimensions::from_zm(word & EWKB_Z_FLAG != 0, word & EWKB_M_FLAG != 0);
            Ok((word & EWKB_TYPE_MASK, dims, word & EWKB_SRID_FLAG != 0))
        }
        Dialect::Iso => Ok((word % 1000, Dimensions::from_iso_code(word / 1000)?, false)),
    }
}

/// Decoded header metadata of one WKB unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHeader {
    pub geometry_type: GeometryType,
    pub dimensions: Dimensions,
    /// SRID embedded in an EWKB header, if the SRID flag is set.
    pub srid: Option<u32>,
    /// Cursor offset where the payload starts.
    pub data_offset: usize,
}

/// Read the order flag, type word and optional SRID.
///
/// `nested` marks elements of a geometry-list: those never carry an SRID,
/// and an EWKB element with the SRID bit set is rejected.
pub fn read_type_header<B: AsRef<[u8]>>(
    cursor: &mut ByteCursor<B>,
    dialect: Dialect,
    nested: bool,
) -> Result<TypeHeader> {
    cursor.read_order_flag()?;
    let word = cursor.read_u32()?;
    let (code, dimensions, has_srid) = split_type_word(word, dialect)?;
    let geometry_type = GeometryType::from_code(code)?;

    let srid = if has_srid {
        if nested {
            return Err(CodecError::NestedSrid);
        }
        Some(cursor.read_u32()?)
    } else {
        None
    };

    log::trace!(
        "header: sf_type={code} n_dims={} dim={dimensions} srid={srid:?}",
        dimensions.n_dims()
    );

    Ok(TypeHeader {
        geometry_type,
        dimensions,
        srid,
        data_offset: cursor.position(),
    })
}

/// Write the order flag, type word and, for EWKB, the optional SRID.
pub fn write_type_header<B: AsMut<[u8]>>(
    cursor: &mut ByteCursor<B>,
    dialect: Dialect,
    geometry_type: GeometryType,
    dims: Dimensions,
    srid: Option<u32>,
) -> Result<()> {
    let mut word = type_word(geometry_type, dims, dialect);
    let srid = match dialect {
        Dialect::Ewkb => srid,
        Dialect::Iso => None,
    };
    if srid.is_some() {
        word |= EWKB_SRID_FLAG;
    }

    log::trace!("header: sf_type={} word={word:#010x} dim={dims}", geometry_type.code());

    cursor.write_order_flag()?;
    cursor.write_u32(word)?;
    if let Some(srid) = srid {
        cursor.write_u32(srid)?;
    }
    Ok(())
}

/// Header length in bytes.
pub fn header_len(dialect: Dialect, has_srid: bool) -> usize {
    match (dialect, has_srid) {
        (Dialect::Ewkb, true) => 9,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(order: ByteOrder, word: u32, srid: Option<u32>) -> Vec<u8> {
        let put = |v: u32| match order {
            ByteOrder::LittleEndian => v.to_le_bytes(),
            ByteOrder::BigEndian => v.to_be_bytes(),
        };
        let mut out = vec![order.flag()];
        out.extend_from_slice(&put(word));
        if let Some(s) = srid {
            out.extend_from_slice(&put(s));
        }
        out
    }

    #[test]
    fn name_table_round_trips_every_type() {
        for t in GeometryType::ALL {
            assert_eq!(GeometryType::from_code(t.code()).unwrap(), t);
            assert_eq!(t.name().parse::<GeometryType>().unwrap(), t);
        }
        assert_eq!(GeometryType::ALL.len(), 17);
        assert_eq!(GeometryType::Tin.name(), "TIN");
        assert_eq!(GeometryType::Triangle.code(), 17);
    }

    #[test]
    fn name_lookup_strips_sfc_prefix() {
        assert_eq!(
            "sfc_MULTIPOLYGON".parse::<GeometryType>().unwrap(),
            GeometryType::MultiPolygon
        );
        assert_eq!(
            "linestring".parse::<GeometryType>().unwrap(),
            GeometryType::LineString
        );
    }

    #[test]
    fn unknown_name_and_code_are_rejected() {
        match "HEXAGON".parse::<GeometryType>() {
            Err(CodecError::UnknownGeometryType(name)) => assert_eq!(name, "HEXAGON"),
            other => panic!("expected unknown type, got {other:?}"),
        }
        assert!(matches!(
            GeometryType::from_code(0),
            Err(CodecError::UnsupportedGeometryType(0))
        ));
        assert!(matches!(
            GeometryType::from_code(18),
            Err(CodecError::UnsupportedGeometryType(18))
        ));
    }

    #[test]
    fn dimensions_parse_and_display() {
        assert_eq!("xyzm".parse::<Dimensions>().unwrap(), Dimensions::Xyzm);
        assert_eq!(Dimensions::Xym.to_string(), "XYM");
        assert!("XYQ".parse::<Dimensions>().is_err());
        assert_eq!(Dimensions::Xyz.n_dims(), 3);
        assert_eq!(Dimensions::Xym.n_dims(), 3);
    }

    #[test]
    fn ewkb_zm_bits_map_canonically() {
        let cases = [
            (0, Dimensions::Xy),
            (EWKB_Z_FLAG, Dimensions::Xyz),
            (EWKB_M_FLAG, Dimensions::Xym),
            (EWKB_Z_FLAG | EWKB_M_FLAG, Dimensions::Xyzm),
        ];
        for (bits, dims) in cases {
            let (code, got, srid) = split_type_word(3 | bits, Dialect::Ewkb).unwrap();
            assert_eq!((code, got, srid), (3, dims, false));
            assert_eq!(type_word(GeometryType::Polygon, dims, Dialect::Ewkb), 3 | bits);
        }
    }

    #[test]
    fn iso_offsets_map_to_dimensions() {
        for dims in [
            Dimensions::Xy,
            Dimensions::Xyz,
            Dimensions::Xym,
            Dimensions::Xyzm,
        ] {
            let word = type_word(GeometryType::MultiSurface, dims, Dialect::Iso);
            assert_eq!(word, 12 + 1000 * dims.iso_code());
            assert_eq!(
                split_type_word(word, Dialect::Iso).unwrap(),
                (12, dims, false)
            );
        }
    }

    #[test]
    fn iso_dimension_code_out_of_range() {
        assert!(matches!(
            split_type_word(4001, Dialect::Iso),
            Err(CodecError::UnknownDimensionCode(4))
        ));
    }

    #[test]
    fn reads_ewkb_header_with_srid() {
        let word = GeometryType::Polygon.code() | EWKB_Z_FLAG | EWKB_SRID_FLAG;
        let bytes = blob(ByteOrder::LittleEndian, word, Some(4326));
        let mut cur = ByteCursor::new(&bytes[..], ByteOrder::LittleEndian);

        let hdr = read_type_header(&mut cur, Dialect::Ewkb, false).unwrap();
        assert_eq!(hdr.geometry_type, GeometryType::Polygon);
        assert_eq!(hdr.dimensions, Dimensions::Xyz);
        assert_eq!(hdr.srid, Some(4326));
        assert_eq!(hdr.data_offset, 9);
    }

    #[test]
    fn reads_big_endian_header_when_configured() {
        let bytes = blob(ByteOrder::BigEndian, 2002, None);
        let mut cur = ByteCursor::new(&bytes[..], ByteOrder::BigEndian);

        let hdr = read_type_header(&mut cur, Dialect::Iso, false).unwrap();
        assert_eq!(hdr.geometry_type, GeometryType::LineString);
        assert_eq!(hdr.dimensions, Dimensions::Xym);
        assert_eq!(hdr.srid, None);
        assert_eq!(hdr.data_offset, 5);
    }

    #[test]
    fn nested_header_must_not_carry_srid() {
        let word = GeometryType::Point.code() | EWKB_SRID_FLAG;
        let bytes = blob(ByteOrder::LittleEndian, word, Some(4326));
        let mut cur = ByteCursor::new(&bytes[..], ByteOrder::LittleEndian);
        assert!(matches!(
            read_type_header(&mut cur, Dialect::Ewkb, true),
            Err(CodecError::NestedSrid)
        ));
    }

    #[test]
    fn srid_flag_but_truncated() {
        let word = GeometryType::Point.code() | EWKB_SRID_FLAG;
        let bytes = blob(ByteOrder::LittleEndian, word, None);
        let mut cur = ByteCursor::new(&bytes[..], ByteOrder::LittleEndian);
        assert!(matches!(
            read_type_header(&mut cur, Dialect::Ewkb, false),
            Err(CodecError::TruncatedBuffer { offset: 5, .. })
        ));
    }

    #[test]
    fn iso_writer_drops_srid() {
        let mut cur = ByteCursor::new(vec![0u8; 5], ByteOrder::LittleEndian);
        write_type_header(
            &mut cur,
            Dialect::Iso,
            GeometryType::Point,
            Dimensions::Xyzm,
            Some(4326),
        )
        .unwrap();
        assert_eq!(cur.into_inner(), blob(ByteOrder::LittleEndian, 3001, None));
        assert_eq!(header_len(Dialect::Iso, true), 5);
    }

    #[test]
    fn ewkb_writer_sets_srid_bit() {
        let mut cur = ByteCursor::new(vec![0u8; 9], ByteOrder::BigEndian);
        write_type_header(
            &mut cur,
            Dialect::Ewkb,
            GeometryType::Point,
            Dimensions::Xy,
            Some(3857),
        )
        .unwrap();
        let expected = blob(ByteOrder::BigEndian, 1 | EWKB_SRID_FLAG, Some(3857));
        assert_eq!(cur.into_inner(), expected);
    }

    #[test]
    fn member_rules() {
        use GeometryType::*;
        assert_eq!(MultiPolygon.members(), Some(Members::Fixed(Polygon)));
        assert!(!MultiPolygon.admits(GeometryCollection));
        assert!(Tin.admits(Triangle));
        assert!(!PolyhedralSurface.admits(Triangle));
        assert!(MultiCurve.admits(CompoundCurve));
        assert!(!CompoundCurve.admits(CompoundCurve));
        assert!(MultiSurface.admits(CurvePolygon));
        assert!(GeometryCollection.admits(GeometryCollection));
        assert_eq!(Point.members(), None);
        assert!(!Point.admits(Point));
    }
}

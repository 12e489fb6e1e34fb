use thiserror::Error;

use crate::header::{ByteOrder, Dimensions, GeometryType};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("incompatible byte order: expected {expected:?}, found flag byte {found:#04x}")]
    IncompatibleByteOrder { expected: ByteOrder, found: u8 },

    #[error("unknown ISO dimension code {0} in type word")]
    UnknownDimensionCode(u32),

    #[error("unknown geometry type name: {0}")]
    UnknownGeometryType(String),

    #[error("unknown dimensions: {0}")]
    UnknownDimensions(String),

    #[error("unsupported geometry type code {0}")]
    UnsupportedGeometryType(u32),

    #[error("dimensionality mismatch: expected {expected}, found {found}")]
    DimensionalityMismatch { expected: String, found: String },

    #[error("truncated buffer: need {needed} bytes at offset {offset} (len {len})")]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        len: usize,
    },

    #[error("{found} is not a valid element of {parent}")]
    UnexpectedElementType {
        parent: GeometryType,
        found: GeometryType,
    },

    #[error("payload shape does not match geometry type {geometry_type}")]
    PayloadShapeMismatch { geometry_type: GeometryType },

    #[error("element count {0} does not fit in a 4-byte count")]
    CountOverflow(usize),

    #[error("SRID flag set on a nested geometry")]
    NestedSrid,

    #[error("geometry nesting exceeds depth limit {limit}")]
    NestingTooDeep { limit: usize },

    #[error("{remaining} trailing bytes after geometry")]
    TrailingBytes { remaining: usize },

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] ::hex::FromHexError),

    #[error("cancelled")]
    Cancelled,
}

impl CodecError {
    pub(crate) fn dimensions(expected: Dimensions, found: Dimensions) -> Self {
        CodecError::DimensionalityMismatch {
            expected: expected.as_str().to_string(),
            found: found.as_str().to_string(),
        }
    }

    pub(crate) fn arity(expected: Dimensions, found: usize) -> Self {
        CodecError::DimensionalityMismatch {
            expected: format!("{} ({} ordinates)", expected, expected.n_dims()),
            found: format!("{found} ordinates"),
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;

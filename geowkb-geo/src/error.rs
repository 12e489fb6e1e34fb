use geowkb_core::{CodecError, GeometryType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoConvertError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("unsupported coordinate dimensions {dimensions}: only XY geometries convert to geo")]
    UnsupportedDimensions { dimensions: &'static str },

    #[error("{0} has no geo counterpart")]
    UnsupportedConversion(GeometryType),

    #[error("triangle needs 3 vertices, got {0}")]
    InvalidTriangle(usize),
}

pub type Result<T> = std::result::Result<T, GeoConvertError>;

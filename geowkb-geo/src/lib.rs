#![doc = include_str!("../../README.md")]
//! Crate-specific API surface for `geowkb-geo`.

pub mod convert;
pub mod error;

pub use convert::{decode_geo, encode_geo, from_geo, to_geo};
pub use error::{GeoConvertError, Result};

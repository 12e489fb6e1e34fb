#![doc = include_str!("../../README.md")]
//! Crate-specific API surface for `geowkb-core`.

pub mod batch;
pub mod cursor;
pub mod decode;
pub mod encode;
pub mod error;
pub mod geometry;
pub mod header;
pub mod hex;

pub use batch::{decode_batch, encode_batch, BatchFailure, BatchOutput};
pub use decode::{decode, ReadOptions};
pub use encode::{encode, WriteOptions};
pub use error::{CodecError, Result};
pub use geometry::{Coord, Geometry, Payload};
pub use header::{ByteOrder, Dialect, Dimensions, GeometryType};

//! Batch drivers over many independent units.
//!
//! Elements share one configuration but no state, so the `rayon` feature
//! can process them in parallel; output order always follows input order.
//! The first failing element stops the batch: the values decoded or encoded
//! before it are returned together with its index and error.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::decode::{decode, ReadOptions};
use crate::encode::{encode, WriteOptions};
use crate::error::{CodecError, Result};
use crate::geometry::Geometry;
use crate::header::GeometryType;

/// Cancellation hook, polled before each element. Returning `true` aborts.
pub type CancelHook<'a> = &'a (dyn Fn() -> bool + Sync);

/// Set of geometry types, one bit per type code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeSet(u32);

impl TypeSet {
    pub fn insert(&mut self, geometry_type: GeometryType) {
        self.0 |= 1 << geometry_type.code();
    }

    pub fn contains(&self, geometry_type: GeometryType) -> bool {
        self.0 & (1 << geometry_type.code()) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// The element that stopped a batch.
#[derive(Debug)]
pub struct BatchFailure {
    pub index: usize,
    pub error: CodecError,
}

/// Result of a batch run.
#[derive(Debug)]
pub struct BatchOutput<T> {
    /// Outputs of every element before the failure (all of them on success).
    pub values: Vec<T>,
    /// Distinct top-level geometry types among `values`.
    pub types: TypeSet,
    pub failure: Option<BatchFailure>,
}

impl<T> BatchOutput<T> {
    /// Number of distinct top-level types; 1 means no homogeneity pass is needed.
    pub fn n_types(&self) -> usize {
        self.types.len()
    }

    pub fn is_homogeneous(&self) -> bool {
        self.n_types() == 1
    }

    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    pub fn into_result(self) -> std::result::Result<Vec<T>, BatchFailure> {
        match self.failure {
            Some(failure) => Err(failure),
            None => Ok(self.values),
        }
    }
}

fn check_cancel(cancel: Option<CancelHook<'_>>) -> Result<()> {
    match cancel {
        Some(hook) if hook() => Err(CodecError::Cancelled),
        _ => Ok(()),
    }
}

/// Collect per-element results in input order, stopping at the first error.
fn assemble<T>(
    results: impl IntoIterator<Item = Result<(T, GeometryType)>>,
) -> BatchOutput<T> {
    let mut out = BatchOutput {
        values: Vec::new(),
        types: TypeSet::default(),
        failure: None,
    };
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok((value, geometry_type)) => {
                out.types.insert(geometry_type);
                out.values.push(value);
            }
            Err(error) => {
                log::warn!("batch element {index} failed: {error}");
                out.failure = Some(BatchFailure { index, error });
                break;
            }
        }
    }
    log::debug!(
        "batch: {} values, {} distinct types, complete={}",
        out.values.len(),
        out.n_types(),
        out.is_complete()
    );
    out
}

fn decode_one(
    bytes: &[u8],
    options: &ReadOptions,
    cancel: Option<CancelHook<'_>>,
) -> Result<(Geometry, GeometryType)> {
    check_cancel(cancel)?;
    let geometry = decode(bytes, options)?;
    let geometry_type = geometry.geometry_type;
    Ok((geometry, geometry_type))
}

fn encode_one(
    geometry: &Geometry,
    options: &WriteOptions,
    cancel: Option<CancelHook<'_>>,
) -> Result<(Vec<u8>, GeometryType)> {
    check_cancel(cancel)?;
    Ok((encode(geometry, options)?, geometry.geometry_type))
}

/// Decode each buffer in order.
///
/// # Example
///
/// ```
/// use geowkb_core::batch::decode_batch;
/// use geowkb_core::decode::ReadOptions;
/// use geowkb_core::encode::{encode, WriteOptions};
/// use geowkb_core::geometry::Geometry;
/// use geowkb_core::header::{Dialect, Dimensions};
///
/// let opts = WriteOptions::new(Dialect::Ewkb);
/// let blobs = vec![
///     encode(&Geometry::point(Dimensions::Xy, vec![0.0, 0.0]), &opts).unwrap(),
///     encode(&Geometry::point(Dimensions::Xy, vec![1.0, 1.0]), &opts).unwrap(),
/// ];
///
/// let out = decode_batch(&blobs, &ReadOptions::new(Dialect::Ewkb), None);
/// assert!(out.is_complete());
/// assert_eq!(out.values.len(), 2);
/// assert_eq!(out.n_types(), 1);
/// ```
pub fn decode_batch<B: AsRef<[u8]>>(
    buffers: &[B],
    options: &ReadOptions,
    cancel: Option<CancelHook<'_>>,
) -> BatchOutput<Geometry> {
    // Lazy so that nothing after the first failure is decoded.
    assemble(
        buffers
            .iter()
            .map(|bytes| decode_one(bytes.as_ref(), options, cancel)),
    )
}

/// Encode each geometry in order.
pub fn encode_batch(
    geometries: &[Geometry],
    options: &WriteOptions,
    cancel: Option<CancelHook<'_>>,
) -> BatchOutput<Vec<u8>> {
    assemble(
        geometries
            .iter()
            .map(|geometry| encode_one(geometry, options, cancel)),
    )
}

/// Parallel [`decode_batch`]. Every element is processed; the reported
/// failure is the one with the lowest index.
#[cfg(feature = "rayon")]
pub fn par_decode_batch<B: AsRef<[u8]> + Sync>(
    buffers: &[B],
    options: &ReadOptions,
    cancel: Option<CancelHook<'_>>,
) -> BatchOutput<Geometry> {
    let mut results = Vec::with_capacity(buffers.len());
    buffers
        .par_iter()
        .map(|bytes| decode_one(bytes.as_ref(), options, cancel))
        .collect_into_vec(&mut results);
    assemble(results)
}

/// Parallel [`encode_batch`].
#[cfg(feature = "rayon")]
pub fn par_encode_batch(
    geometries: &[Geometry],
    options: &WriteOptions,
    cancel: Option<CancelHook<'_>>,
) -> BatchOutput<Vec<u8>> {
    let mut results = Vec::with_capacity(geometries.len());
    geometries
        .par_iter()
        .map(|geometry| encode_one(geometry, options, cancel))
        .collect_into_vec(&mut results);
    assemble(results)
}

//! Bounds-checked read/write position over a byte buffer.
//!
//! Every multi-byte value goes through the cursor's configured
//! [`ByteOrder`]; every access is checked against the buffer length and
//! fails with [`CodecError::TruncatedBuffer`] instead of running past the end.

use crate::error::{CodecError, Result};
use crate::header::ByteOrder;

/// A monotonically advancing cursor over `B`.
///
/// Reads are available when `B: AsRef<[u8]>`, writes when `B: AsMut<[u8]>`.
/// Writes never grow the buffer: callers size it up front (see
/// [`crate::encode::encoded_len`]).
///
/// # Example
///
/// ```
/// use geowkb_core::cursor::ByteCursor;
/// use geowkb_core::header::ByteOrder;
///
/// let mut w = ByteCursor::new(vec![0u8; 12], ByteOrder::LittleEndian);
/// w.write_u32(7).unwrap();
/// w.write_f64(1.5).unwrap();
///
/// let mut r = ByteCursor::new(w.into_inner(), ByteOrder::LittleEndian);
/// assert_eq!(r.read_u32().unwrap(), 7);
/// assert_eq!(r.read_f64().unwrap(), 1.5);
/// assert!(r.read_u8().is_err());
/// ```
#[derive(Debug)]
pub struct ByteCursor<B> {
    buf: B,
    offset: usize,
    order: ByteOrder,
}

impl<B> ByteCursor<B> {
    pub fn new(buf: B, order: ByteOrder) -> Self {
        Self {
            buf,
            offset: 0,
            order,
        }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    pub fn into_inner(self) -> B {
        self.buf
    }
}

impl<B: AsRef<[u8]>> ByteCursor<B> {
    pub fn len(&self) -> usize {
        self.buf.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes left between the cursor and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.len() - self.offset
    }

    /// Fail unless `needed` more bytes are available.
    pub fn ensure(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(CodecError::TruncatedBuffer {
                offset: self.offset,
                needed,
                len: self.len(),
            });
        }
        Ok(())
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf.as_ref()[self.offset..self.offset + N]);
        self.offset += N;
        Ok(out)
    }

    /// Look at the next byte without advancing.
    pub fn peek_u8(&self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.buf.as_ref()[self.offset])
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.take::<1>()?;
        Ok(b)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take::<4>()?;
        Ok(match self.order {
            ByteOrder::LittleEndian => u32::from_le_bytes(bytes),
            ByteOrder::BigEndian => u32::from_be_bytes(bytes),
        })
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let bytes = self.take::<8>()?;
        Ok(match self.order {
            ByteOrder::LittleEndian => f64::from_le_bytes(bytes),
            ByteOrder::BigEndian => f64::from_be_bytes(bytes),
        })
    }

    /// Read `n` consecutive doubles.
    pub fn read_f64s(&mut self, n: usize) -> Result<Vec<f64>> {
        self.ensure(n.saturating_mul(8))?;
        (0..n).map(|_| self.read_f64()).collect()
    }

    /// Read a 4-byte element count, rejecting counts that cannot fit in the
    /// rest of the buffer when every element takes at least `min_item_len`
    /// bytes. Keeps hostile counts from driving large allocations.
    pub fn read_count(&mut self, min_item_len: usize) -> Result<usize> {
        let count = self.read_u32()? as usize;
        self.ensure(count.saturating_mul(min_item_len))?;
        Ok(count)
    }

    /// Consume the order flag byte, which must match the cursor's order.
    ///
    /// The cursor does not move when the flag is wrong.
    pub fn read_order_flag(&mut self) -> Result<()> {
        let found = self.peek_u8()?;
        if found != self.order.flag() {
            return Err(CodecError::IncompatibleByteOrder {
                expected: self.order,
                found,
            });
        }
        self.offset += 1;
        Ok(())
    }
}

impl<B: AsMut<[u8]>> ByteCursor<B> {
    fn put<const N: usize>(&mut self, bytes: [u8; N]) -> Result<()> {
        let len = self.buf.as_mut().len();
        if N > len - self.offset {
            return Err(CodecError::TruncatedBuffer {
                offset: self.offset,
                needed: N,
                len,
            });
        }
        self.buf.as_mut()[self.offset..self.offset + N].copy_from_slice(&bytes);
        self.offset += N;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.put([value])
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        let bytes = match self.order {
            ByteOrder::LittleEndian => value.to_le_bytes(),
            ByteOrder::BigEndian => value.to_be_bytes(),
        };
        self.put(bytes)
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        let bytes = match self.order {
            ByteOrder::LittleEndian => value.to_le_bytes(),
            ByteOrder::BigEndian => value.to_be_bytes(),
        };
        self.put(bytes)
    }

    pub fn write_f64s(&mut self, values: &[f64]) -> Result<()> {
        values.iter().try_for_each(|v| self.write_f64(*v))
    }

    /// Write a length as a 4-byte count.
    pub fn write_count(&mut self, count: usize) -> Result<()> {
        let count = u32::try_from(count).map_err(|_| CodecError::CountOverflow(count))?;
        self.write_u32(count)
    }

    pub fn write_order_flag(&mut self) -> Result<()> {
        self.write_u8(self.order.flag())
    }
}

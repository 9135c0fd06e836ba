//! Endian-adaptive primitive reads and writes.
//!
//! Byte order is decided once, when a [`Cursor`] or [`Sink`] is built, and
//! every subsequent access swaps per element through `byteorder`. Never
//! reverse a whole slab of bytes: that only works for a single value and
//! silently mis-orders arrays.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use super::Endian;
use crate::error::Error;

/// Reads primitives from a byte slice at a running absolute offset.
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8], endian: Endian) -> Cursor<'a> {
        Cursor {
            data,
            pos: 0,
            endian,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], Error> {
        if self.remaining() < n {
            return Err(Error::CorruptPayload {
                offset: self.pos,
                context,
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn skip(&mut self, n: usize, context: &'static str) -> Result<(), Error> {
        self.take(n, context).map(|_| ())
    }

    pub fn read_u8(&mut self, context: &'static str) -> Result<u8, Error> {
        Ok(self.take(1, context)?[0])
    }

    pub fn read_i32(&mut self, context: &'static str) -> Result<i32, Error> {
        let bytes = self.take(4, context)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_i32(bytes),
            Endian::Little => LittleEndian::read_i32(bytes),
        })
    }

    pub fn read_f32(&mut self, context: &'static str) -> Result<f32, Error> {
        let bytes = self.take(4, context)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_f32(bytes),
            Endian::Little => LittleEndian::read_f32(bytes),
        })
    }

    pub fn read_f64(&mut self, context: &'static str) -> Result<f64, Error> {
        let bytes = self.take(8, context)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_f64(bytes),
            Endian::Little => LittleEndian::read_f64(bytes),
        })
    }

    /// Reads `n` contiguous f64 values, swapped per element.
    pub fn read_f64_vec(&mut self, n: usize, context: &'static str) -> Result<Vec<f64>, Error> {
        let byte_len = n.checked_mul(8).ok_or(Error::CorruptPayload {
            offset: self.pos,
            context,
        })?;
        let bytes = self.take(byte_len, context)?;
        let mut values = vec![0f64; n];
        match self.endian {
            Endian::Big => BigEndian::read_f64_into(bytes, &mut values),
            Endian::Little => LittleEndian::read_f64_into(bytes, &mut values),
        }
        Ok(values)
    }
}

/// Accumulates primitives into an owned buffer with a fixed byte order.
pub struct Sink {
    buf: Vec<u8>,
    endian: Endian,
}

impl Sink {
    pub fn new(endian: Endian) -> Sink {
        Sink {
            buf: Vec::new(),
            endian,
        }
    }

    pub fn with_capacity(capacity: usize, endian: Endian) -> Sink {
        Sink {
            buf: Vec::with_capacity(capacity),
            endian,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        let mut bytes = [0u8; 4];
        match self.endian {
            Endian::Big => BigEndian::write_i32(&mut bytes, value),
            Endian::Little => LittleEndian::write_i32(&mut bytes, value),
        }
        self.buf.extend_from_slice(&bytes);
    }

    pub fn write_f32(&mut self, value: f32) {
        let mut bytes = [0u8; 4];
        match self.endian {
            Endian::Big => BigEndian::write_f32(&mut bytes, value),
            Endian::Little => LittleEndian::write_f32(&mut bytes, value),
        }
        self.buf.extend_from_slice(&bytes);
    }

    pub fn write_f64(&mut self, value: f64) {
        let mut bytes = [0u8; 8];
        match self.endian {
            Endian::Big => BigEndian::write_f64(&mut bytes, value),
            Endian::Little => LittleEndian::write_f64(&mut bytes, value),
        }
        self.buf.extend_from_slice(&bytes);
    }
}

//! Helpers for the length-prefixed little-endian message codecs.

use crate::{Error, Result};
use ark_ec::AffineCurve;
use ark_ff::{PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

/// Length of a serialized point of `A`.
pub(crate) fn point_len<A: AffineCurve>() -> usize {
    A::zero().serialized_size()
}

/// Length of a serialized scalar of `F`.
pub(crate) fn scalar_len<F: PrimeField>() -> usize {
    F::zero().serialized_size()
}

pub(crate) fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Append the canonical encoding of an algebraic value. Writing into a
/// `Vec` cannot fail.
pub(crate) fn put<T: CanonicalSerialize>(buf: &mut Vec<u8>, value: &T) {
    value.serialize(&mut *buf).unwrap();
}

/// Bounds-checked reader over a wire buffer.
pub(crate) struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or(Error::DecodeError)?;
        if end > self.buf.len() {
            return Err(Error::DecodeError);
        }
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        let mut out = [0u8; 4];
        out.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(out))
    }

    pub fn point<A: AffineCurve>(&mut self) -> Result<A> {
        let bytes = self.take(point_len::<A>())?;
        A::deserialize(bytes).map_err(|_| Error::DecodeError)
    }

    pub fn scalar<F: PrimeField>(&mut self) -> Result<F> {
        let bytes = self.take(scalar_len::<F>())?;
        F::deserialize(bytes).map_err(|_| Error::DecodeError)
    }

    /// The whole buffer must have been consumed.
    pub fn finish(self) -> Result<()> {
        if self.pos == self.buf.len() {
            Ok(())
        } else {
            Err(Error::DecodeError)
        }
    }
}

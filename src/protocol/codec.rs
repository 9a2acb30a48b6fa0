//! Fixed-width Kafka wire primitives.
//!
//! All integers are big-endian on the wire. Every reader checks the remaining
//! length before touching the buffer, so a short buffer surfaces as
//! [`DecodeError::Underflow`] instead of a panic inside `bytes`.

use crate::error::DecodeError;
use crate::types::Uuid;
use bytes::{Buf, BufMut};

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// A value with a structured wire decoder.
pub trait Decode: Sized {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self>;
}

/// A value with a structured wire encoder.
pub trait Encode {
    fn encode<B: BufMut>(&self, dst: &mut B);

    /// Encoded length in bytes.
    fn encoded_len(&self) -> usize {
        let mut counter = Vec::new();
        self.encode(&mut counter);
        counter.len()
    }
}

/// Upper bound on elements reserved up front for a counted collection; the
/// count comes off the wire, so larger arrays grow as elements decode.
const MAX_PREALLOCATED_ELEMENTS: usize = 1024;

/// Initial capacity for a collection of `count` elements.
pub(crate) fn initial_capacity<B: Buf>(src: &B, count: usize) -> usize {
    count.min(src.remaining()).min(MAX_PREALLOCATED_ELEMENTS)
}

/// Fail with `Underflow` unless `needed` bytes remain.
pub fn ensure<B: Buf>(src: &B, needed: usize) -> DecodeResult<()> {
    let available = src.remaining();
    if available < needed {
        return Err(DecodeError::Underflow { needed, available });
    }
    Ok(())
}

pub fn read_u8<B: Buf>(src: &mut B) -> DecodeResult<u8> {
    ensure(src, 1)?;
    Ok(src.get_u8())
}

pub fn read_i8<B: Buf>(src: &mut B) -> DecodeResult<i8> {
    ensure(src, 1)?;
    Ok(src.get_i8())
}

pub fn read_bool<B: Buf>(src: &mut B) -> DecodeResult<bool> {
    Ok(read_u8(src)? != 0)
}

pub fn read_i16<B: Buf>(src: &mut B) -> DecodeResult<i16> {
    ensure(src, 2)?;
    Ok(src.get_i16())
}

pub fn read_i32<B: Buf>(src: &mut B) -> DecodeResult<i32> {
    ensure(src, 4)?;
    Ok(src.get_i32())
}

pub fn read_u32<B: Buf>(src: &mut B) -> DecodeResult<u32> {
    ensure(src, 4)?;
    Ok(src.get_u32())
}

pub fn read_i64<B: Buf>(src: &mut B) -> DecodeResult<i64> {
    ensure(src, 8)?;
    Ok(src.get_i64())
}

/// Read exactly `len` raw bytes.
pub fn read_raw<B: Buf>(src: &mut B, len: usize) -> DecodeResult<Vec<u8>> {
    ensure(src, len)?;
    let mut out = vec![0u8; len];
    src.copy_to_slice(&mut out);
    Ok(out)
}

/// int32-prefixed byte string; a negative length reads as empty.
pub fn read_bytes<B: Buf>(src: &mut B) -> DecodeResult<Vec<u8>> {
    let len = read_i32(src)?;
    if len < 0 {
        return Ok(Vec::new());
    }
    read_raw(src, len as usize)
}

pub fn read_uuid<B: Buf>(src: &mut B) -> DecodeResult<Uuid> {
    ensure(src, Uuid::SIZE)?;
    let mut id = [0u8; Uuid::SIZE];
    src.copy_to_slice(&mut id);
    Ok(Uuid(id))
}

/// Nullable string: int16 length, -1 (or any negative) = null, read as empty.
pub fn read_nullable_string<B: Buf>(src: &mut B) -> DecodeResult<String> {
    let len = read_i16(src)?;
    if len < 0 {
        return Ok(String::new());
    }
    let raw = read_raw(src, len as usize)?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// int32-counted array of structured elements; a negative count reads as empty.
pub fn read_array<T: Decode, B: Buf>(src: &mut B) -> DecodeResult<Vec<T>> {
    read_array_with(src, T::decode)
}

/// int32-counted array using an explicit element decoder.
pub fn read_array_with<T, B, F>(src: &mut B, mut read_elem: F) -> DecodeResult<Vec<T>>
where
    B: Buf,
    F: FnMut(&mut B) -> DecodeResult<T>,
{
    let count = read_i32(src)?;
    if count <= 0 {
        return Ok(Vec::new());
    }
    let count = count as usize;
    let mut items = Vec::with_capacity(initial_capacity(src, count));
    for _ in 0..count {
        items.push(read_elem(src)?);
    }
    Ok(items)
}

pub fn write_u8<B: BufMut>(dst: &mut B, v: u8) {
    dst.put_u8(v);
}

pub fn write_i8<B: BufMut>(dst: &mut B, v: i8) {
    dst.put_i8(v);
}

pub fn write_bool<B: BufMut>(dst: &mut B, v: bool) {
    dst.put_u8(u8::from(v));
}

pub fn write_i16<B: BufMut>(dst: &mut B, v: i16) {
    dst.put_i16(v);
}

pub fn write_i32<B: BufMut>(dst: &mut B, v: i32) {
    dst.put_i32(v);
}

pub fn write_u32<B: BufMut>(dst: &mut B, v: u32) {
    dst.put_u32(v);
}

pub fn write_i64<B: BufMut>(dst: &mut B, v: i64) {
    dst.put_i64(v);
}

pub fn write_bytes<B: BufMut>(dst: &mut B, bytes: &[u8]) {
    dst.put_i32(bytes.len() as i32);
    dst.put_slice(bytes);
}

pub fn write_uuid<B: BufMut>(dst: &mut B, id: &Uuid) {
    dst.put_slice(id.as_bytes());
}

pub fn write_nullable_string<B: BufMut>(dst: &mut B, s: &str) {
    let b = s.as_bytes();
    dst.put_i16(b.len() as i16);
    dst.put_slice(b);
}

pub fn write_array<T: Encode, B: BufMut>(dst: &mut B, items: &[T]) {
    write_array_with(dst, items, |dst, item| item.encode(dst));
}

pub fn write_array_with<T, B, F>(dst: &mut B, items: &[T], mut write_elem: F)
where
    B: BufMut,
    F: FnMut(&mut B, &T),
{
    dst.put_i32(items.len() as i32);
    for item in items {
        write_elem(dst, item);
    }
}

impl Decode for Uuid {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        read_uuid(src)
    }
}

impl Encode for Uuid {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_uuid(dst, self);
    }

    fn encoded_len(&self) -> usize {
        Uuid::SIZE
    }
}

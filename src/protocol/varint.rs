//! Variable-length encodings: ULEB128 unsigned varints, zigzag varint/varlong,
//! compact strings and arrays, and the tagged-field marker.

use super::codec::{initial_capacity, read_raw, read_u8, Decode, DecodeResult, Encode};
use crate::error::DecodeError;
use bytes::{Buf, BufMut};

/// Max ULEB128 groups for a 32-bit value.
pub const MAX_VARINT_BYTES: usize = 5;
/// Max ULEB128 groups for a 64-bit value.
pub const MAX_VARLONG_BYTES: usize = 10;

fn read_uleb128<B: Buf>(src: &mut B, max_groups: usize) -> DecodeResult<u64> {
    let mut value: u64 = 0;
    for group in 0..max_groups {
        let b = read_u8(src)?;
        let bits = u64::from(b & 0x7f);
        let shift = 7 * group as u32;
        // The last group of a varlong may only carry bit 63.
        if shift > 57 && bits >> (64 - shift) != 0 {
            return Err(DecodeError::VarintTooLong);
        }
        value |= bits << shift;
        if b & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(DecodeError::VarintTooLong)
}

fn write_uleb128<B: BufMut>(dst: &mut B, mut u: u64) {
    while u > 0x7f {
        dst.put_u8((u as u8 & 0x7f) | 0x80);
        u >>= 7;
    }
    dst.put_u8(u as u8);
}

/// Values that do not fit 32 bits fail instead of wrapping.
pub fn read_unsigned_varint<B: Buf>(src: &mut B) -> DecodeResult<u32> {
    u32::try_from(read_uleb128(src, MAX_VARINT_BYTES)?).map_err(|_| DecodeError::VarintTooLong)
}

pub fn read_unsigned_varlong<B: Buf>(src: &mut B) -> DecodeResult<u64> {
    read_uleb128(src, MAX_VARLONG_BYTES)
}

/// Zigzag-decoded signed 32-bit varint.
pub fn read_varint<B: Buf>(src: &mut B) -> DecodeResult<i32> {
    let u = read_unsigned_varint(src)?;
    Ok(((u >> 1) as i32) ^ -((u & 1) as i32))
}

/// Zigzag-decoded signed 64-bit varlong.
pub fn read_varlong<B: Buf>(src: &mut B) -> DecodeResult<i64> {
    let u = read_unsigned_varlong(src)?;
    Ok(((u >> 1) as i64) ^ -((u & 1) as i64))
}

pub fn write_unsigned_varint<B: BufMut>(dst: &mut B, u: u32) {
    write_uleb128(dst, u64::from(u));
}

pub fn write_unsigned_varlong<B: BufMut>(dst: &mut B, u: u64) {
    write_uleb128(dst, u);
}

pub fn write_varint<B: BufMut>(dst: &mut B, v: i32) {
    write_unsigned_varint(dst, ((v << 1) ^ (v >> 31)) as u32);
}

pub fn write_varlong<B: BufMut>(dst: &mut B, v: i64) {
    write_unsigned_varlong(dst, ((v << 1) ^ (v >> 63)) as u64);
}

/// Compact string: unsigned varint `len + 1`, then bytes. `0` reads as empty.
pub fn read_compact_string<B: Buf>(src: &mut B) -> DecodeResult<String> {
    let n = read_unsigned_varint(src)?;
    if n == 0 {
        return Ok(String::new());
    }
    let raw = read_raw(src, (n - 1) as usize)?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

pub fn write_compact_string<B: BufMut>(dst: &mut B, s: &str) {
    let b = s.as_bytes();
    write_unsigned_varint(dst, (b.len() + 1) as u32);
    dst.put_slice(b);
}

/// Compact array of structured elements: unsigned varint `count + 1`.
pub fn read_compact_array<T: Decode, B: Buf>(src: &mut B) -> DecodeResult<Vec<T>> {
    read_compact_array_with(src, T::decode)
}

/// Compact array with an explicit element decoder, for primitive element types.
pub fn read_compact_array_with<T, B, F>(src: &mut B, mut read_elem: F) -> DecodeResult<Vec<T>>
where
    B: Buf,
    F: FnMut(&mut B) -> DecodeResult<T>,
{
    let n = read_unsigned_varint(src)?;
    if n == 0 {
        return Ok(Vec::new());
    }
    let count = (n - 1) as usize;
    let mut items = Vec::with_capacity(initial_capacity(src, count));
    for _ in 0..count {
        items.push(read_elem(src)?);
    }
    Ok(items)
}

pub fn write_compact_array<T: Encode, B: BufMut>(dst: &mut B, items: &[T]) {
    write_compact_array_with(dst, items, |dst, item| item.encode(dst));
}

pub fn write_compact_array_with<T, B, F>(dst: &mut B, items: &[T], mut write_elem: F)
where
    B: BufMut,
    F: FnMut(&mut B, &T),
{
    write_unsigned_varint(dst, (items.len() + 1) as u32);
    for item in items {
        write_elem(dst, item);
    }
}

/// Only the empty tagged-field section is accepted.
pub fn read_tagged_fields<B: Buf>(src: &mut B) -> DecodeResult<()> {
    match read_u8(src)? {
        0 => Ok(()),
        other => Err(DecodeError::UnexpectedTaggedFields(other)),
    }
}

pub fn write_tagged_fields<B: BufMut>(dst: &mut B) {
    dst.put_u8(0);
}

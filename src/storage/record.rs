//! On-disk record batch format (magic 2) as found in KRaft log segments.
//!
//! Only records with a null key and no headers are understood: the key length
//! must be the zigzag varint for -1 (`0x01`) and the header count must be
//! zero (`0x00`). The batch CRC is read and carried through but never checked.

use crate::error::DecodeError;
use crate::protocol::codec::{
    read_array, read_i16, read_i32, read_i64, read_i8, read_raw, read_u32, read_u8, write_array,
    write_i16, write_i32, write_i64, write_i8, write_u32, Decode, DecodeResult, Encode,
};
use crate::protocol::varint::{read_varint, read_varlong, write_varint, write_varlong};
use bytes::{Buf, BufMut};

pub const RECORD_BATCH_MAGIC: i8 = 2;

const NULL_KEY_MARKER: u8 = 0x01;
const NO_HEADERS_MARKER: u8 = 0x00;

/// Bytes of batch header that follow the `batch_length` field, up to and
/// including the record count.
const BATCH_HEADER_AFTER_LENGTH: usize = 4 + 1 + 4 + 2 + 4 + 8 + 8 + 8 + 2 + 4 + 4;

/// One log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub length: i32,
    pub attributes: i8,
    pub timestamp_delta: i64,
    pub offset_delta: i32,
    /// `None` for a null value (length -1 on the wire).
    pub value: Option<Vec<u8>>,
}

impl Record {
    /// Build a record whose `length` matches its encoded body.
    pub fn new(offset_delta: i32, value: Vec<u8>) -> Self {
        let mut record = Self {
            length: 0,
            attributes: 0,
            timestamp_delta: 0,
            offset_delta,
            value: Some(value),
        };
        let mut body = Vec::new();
        record.encode_body(&mut body);
        record.length = body.len() as i32;
        record
    }

    fn encode_body<B: BufMut>(&self, dst: &mut B) {
        write_i8(dst, self.attributes);
        write_varlong(dst, self.timestamp_delta);
        write_varint(dst, self.offset_delta);
        dst.put_u8(NULL_KEY_MARKER);
        match &self.value {
            Some(value) => {
                write_varint(dst, value.len() as i32);
                dst.put_slice(value);
            }
            None => write_varint(dst, -1),
        }
        dst.put_u8(NO_HEADERS_MARKER);
    }
}

impl Decode for Record {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let length = read_varint(src)?;
        let attributes = read_i8(src)?;
        let timestamp_delta = read_varlong(src)?;
        let offset_delta = read_varint(src)?;
        let key_marker = read_u8(src)?;
        if key_marker != NULL_KEY_MARKER {
            return Err(DecodeError::UnexpectedKeyMarker(key_marker));
        }
        let value_len = read_varint(src)?;
        let value = if value_len < 0 {
            None
        } else {
            Some(read_raw(src, value_len as usize)?)
        };
        let headers_marker = read_u8(src)?;
        if headers_marker != NO_HEADERS_MARKER {
            return Err(DecodeError::UnexpectedHeaderMarker(headers_marker));
        }
        Ok(Self {
            length,
            attributes,
            timestamp_delta,
            offset_delta,
            value,
        })
    }
}

impl Encode for Record {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_varint(dst, self.length);
        self.encode_body(dst);
    }
}

/// A length-framed group of records sharing one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordBatch {
    pub base_offset: i64,
    pub batch_length: i32,
    pub partition_leader_epoch: i32,
    pub magic: i8,
    /// CRC-32C as stored; not verified.
    pub crc: u32,
    pub attributes: i16,
    pub last_offset_delta: i32,
    pub base_timestamp: i64,
    pub max_timestamp: i64,
    pub producer_id: i64,
    pub producer_epoch: i16,
    pub base_sequence: i32,
    pub records: Vec<Record>,
}

impl RecordBatch {
    /// Build a batch with consistent `batch_length` and `last_offset_delta`.
    pub fn new(base_offset: i64, records: Vec<Record>) -> Self {
        let records_len: usize = records.iter().map(Encode::encoded_len).sum();
        let last_offset_delta = records.last().map(|r| r.offset_delta).unwrap_or(0);
        Self {
            base_offset,
            batch_length: (BATCH_HEADER_AFTER_LENGTH + records_len) as i32,
            partition_leader_epoch: 0,
            magic: RECORD_BATCH_MAGIC,
            crc: 0,
            attributes: 0,
            last_offset_delta,
            base_timestamp: 0,
            max_timestamp: 0,
            producer_id: -1,
            producer_epoch: -1,
            base_sequence: -1,
            records,
        }
    }
}

impl Decode for RecordBatch {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        Ok(Self {
            base_offset: read_i64(src)?,
            batch_length: read_i32(src)?,
            partition_leader_epoch: read_i32(src)?,
            magic: read_i8(src)?,
            crc: read_u32(src)?,
            attributes: read_i16(src)?,
            last_offset_delta: read_i32(src)?,
            base_timestamp: read_i64(src)?,
            max_timestamp: read_i64(src)?,
            producer_id: read_i64(src)?,
            producer_epoch: read_i16(src)?,
            base_sequence: read_i32(src)?,
            records: read_array(src)?,
        })
    }
}

impl Encode for RecordBatch {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_i64(dst, self.base_offset);
        write_i32(dst, self.batch_length);
        write_i32(dst, self.partition_leader_epoch);
        write_i8(dst, self.magic);
        write_u32(dst, self.crc);
        write_i16(dst, self.attributes);
        write_i32(dst, self.last_offset_delta);
        write_i64(dst, self.base_timestamp);
        write_i64(dst, self.max_timestamp);
        write_i64(dst, self.producer_id);
        write_i16(dst, self.producer_epoch);
        write_i32(dst, self.base_sequence);
        write_array(dst, &self.records);
    }
}

/// Decode batches until the first failure and return what was decoded.
///
/// End of input and a corrupt batch look the same here: both stop the scan.
pub fn read_record_batches<B: Buf>(src: &mut B) -> Vec<RecordBatch> {
    let mut batches = Vec::new();
    while src.has_remaining() {
        match RecordBatch::decode(src) {
            Ok(batch) => batches.push(batch),
            Err(e) => {
                tracing::debug!(
                    decoded = batches.len(),
                    error = %e,
                    "stopped reading record batches"
                );
                break;
            }
        }
    }
    batches
}

//! Fetch (key 1), v16 layout: topics addressed by id, compact collections.

use super::codec::{
    read_i16, read_i32, read_i64, read_i8, read_uuid, write_i16, write_i32, write_i64, write_i8,
    write_uuid, Decode, DecodeResult, Encode,
};
use super::varint::{
    read_compact_array, read_compact_array_with, read_compact_string, read_tagged_fields,
    write_compact_array, write_compact_array_with, write_compact_string, write_tagged_fields,
};
use crate::storage::RecordBatch;
use crate::types::{ErrorCode, Uuid};
use bytes::{Buf, BufMut};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPartition {
    pub partition: i32,
    pub current_leader_epoch: i32,
    pub fetch_offset: i64,
    pub last_fetched_epoch: i32,
    pub log_start_offset: i64,
    pub partition_max_bytes: i32,
}

impl FetchPartition {
    pub fn new(partition: i32) -> Self {
        Self {
            partition,
            current_leader_epoch: -1,
            fetch_offset: 0,
            last_fetched_epoch: -1,
            log_start_offset: -1,
            partition_max_bytes: 1024 * 1024,
        }
    }
}

impl Decode for FetchPartition {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let partition = FetchPartition {
            partition: read_i32(src)?,
            current_leader_epoch: read_i32(src)?,
            fetch_offset: read_i64(src)?,
            last_fetched_epoch: read_i32(src)?,
            log_start_offset: read_i64(src)?,
            partition_max_bytes: read_i32(src)?,
        };
        read_tagged_fields(src)?;
        Ok(partition)
    }
}

impl Encode for FetchPartition {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_i32(dst, self.partition);
        write_i32(dst, self.current_leader_epoch);
        write_i64(dst, self.fetch_offset);
        write_i32(dst, self.last_fetched_epoch);
        write_i64(dst, self.log_start_offset);
        write_i32(dst, self.partition_max_bytes);
        write_tagged_fields(dst);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTopic {
    pub topic_id: Uuid,
    pub partitions: Vec<FetchPartition>,
}

impl Decode for FetchTopic {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let topic_id = read_uuid(src)?;
        let partitions = read_compact_array(src)?;
        read_tagged_fields(src)?;
        Ok(Self {
            topic_id,
            partitions,
        })
    }
}

impl Encode for FetchTopic {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_uuid(dst, &self.topic_id);
        write_compact_array(dst, &self.partitions);
        write_tagged_fields(dst);
    }
}

/// Partitions the client asks the fetch session to drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgottenTopic {
    pub topic_id: Uuid,
    pub partitions: Vec<i32>,
}

impl Decode for ForgottenTopic {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let topic_id = read_uuid(src)?;
        let partitions = read_compact_array_with(src, read_i32)?;
        read_tagged_fields(src)?;
        Ok(Self {
            topic_id,
            partitions,
        })
    }
}

impl Encode for ForgottenTopic {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_uuid(dst, &self.topic_id);
        write_compact_array_with(dst, &self.partitions, |dst, p| write_i32(dst, *p));
        write_tagged_fields(dst);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub max_wait_ms: i32,
    pub min_bytes: i32,
    pub max_bytes: i32,
    pub isolation_level: i8,
    pub session_id: i32,
    pub session_epoch: i32,
    pub topics: Vec<FetchTopic>,
    pub forgotten_topics_data: Vec<ForgottenTopic>,
    pub rack_id: String,
}

impl FetchRequest {
    /// A sessionless fetch of `topics` with client-typical limits.
    pub fn new(topics: Vec<FetchTopic>) -> Self {
        Self {
            max_wait_ms: 500,
            min_bytes: 1,
            max_bytes: 50 * 1024 * 1024,
            isolation_level: 0,
            session_id: 0,
            session_epoch: -1,
            topics,
            forgotten_topics_data: Vec::new(),
            rack_id: String::new(),
        }
    }
}

impl Decode for FetchRequest {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let request = FetchRequest {
            max_wait_ms: read_i32(src)?,
            min_bytes: read_i32(src)?,
            max_bytes: read_i32(src)?,
            isolation_level: read_i8(src)?,
            session_id: read_i32(src)?,
            session_epoch: read_i32(src)?,
            topics: read_compact_array(src)?,
            forgotten_topics_data: read_compact_array(src)?,
            rack_id: read_compact_string(src)?,
        };
        read_tagged_fields(src)?;
        Ok(request)
    }
}

impl Encode for FetchRequest {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_i32(dst, self.max_wait_ms);
        write_i32(dst, self.min_bytes);
        write_i32(dst, self.max_bytes);
        write_i8(dst, self.isolation_level);
        write_i32(dst, self.session_id);
        write_i32(dst, self.session_epoch);
        write_compact_array(dst, &self.topics);
        write_compact_array(dst, &self.forgotten_topics_data);
        write_compact_string(dst, &self.rack_id);
        write_tagged_fields(dst);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortedTransaction {
    pub producer_id: i64,
    pub first_offset: i64,
}

impl Decode for AbortedTransaction {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let producer_id = read_i64(src)?;
        let first_offset = read_i64(src)?;
        read_tagged_fields(src)?;
        Ok(Self {
            producer_id,
            first_offset,
        })
    }
}

impl Encode for AbortedTransaction {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_i64(dst, self.producer_id);
        write_i64(dst, self.first_offset);
        write_tagged_fields(dst);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionData {
    pub partition_index: i32,
    pub error_code: i16,
    pub high_watermark: i64,
    pub last_stable_offset: i64,
    pub log_start_offset: i64,
    pub aborted_transactions: Vec<AbortedTransaction>,
    pub preferred_read_replica: i32,
    /// Batches exactly as read from the partition log.
    pub records: Vec<RecordBatch>,
}

impl PartitionData {
    pub fn error(partition_index: i32, error: ErrorCode) -> Self {
        Self {
            partition_index,
            error_code: error.code(),
            high_watermark: 0,
            last_stable_offset: 0,
            log_start_offset: 0,
            aborted_transactions: Vec::new(),
            preferred_read_replica: -1,
            records: Vec::new(),
        }
    }

    /// Partition data carrying `batches`, with offsets derived from them.
    pub fn with_batches(partition_index: i32, batches: Vec<RecordBatch>) -> Self {
        let log_start_offset = batches.first().map(|b| b.base_offset).unwrap_or(0);
        let high_watermark = batches
            .last()
            .map(|b| b.base_offset + i64::from(b.last_offset_delta) + 1)
            .unwrap_or(0);
        Self {
            high_watermark,
            last_stable_offset: high_watermark,
            log_start_offset,
            records: batches,
            ..Self::error(partition_index, ErrorCode::None)
        }
    }
}

impl Decode for PartitionData {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let data = PartitionData {
            partition_index: read_i32(src)?,
            error_code: read_i16(src)?,
            high_watermark: read_i64(src)?,
            last_stable_offset: read_i64(src)?,
            log_start_offset: read_i64(src)?,
            aborted_transactions: read_compact_array(src)?,
            preferred_read_replica: read_i32(src)?,
            records: read_compact_array(src)?,
        };
        read_tagged_fields(src)?;
        Ok(data)
    }
}

impl Encode for PartitionData {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_i32(dst, self.partition_index);
        write_i16(dst, self.error_code);
        write_i64(dst, self.high_watermark);
        write_i64(dst, self.last_stable_offset);
        write_i64(dst, self.log_start_offset);
        write_compact_array(dst, &self.aborted_transactions);
        write_i32(dst, self.preferred_read_replica);
        write_compact_array(dst, &self.records);
        write_tagged_fields(dst);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchableTopicResponse {
    pub topic_id: Uuid,
    pub partitions: Vec<PartitionData>,
}

impl Decode for FetchableTopicResponse {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let topic_id = read_uuid(src)?;
        let partitions = read_compact_array(src)?;
        read_tagged_fields(src)?;
        Ok(Self {
            topic_id,
            partitions,
        })
    }
}

impl Encode for FetchableTopicResponse {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_uuid(dst, &self.topic_id);
        write_compact_array(dst, &self.partitions);
        write_tagged_fields(dst);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub throttle_time_ms: i32,
    pub error_code: i16,
    pub session_id: i32,
    pub responses: Vec<FetchableTopicResponse>,
}

impl Decode for FetchResponse {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let response = FetchResponse {
            throttle_time_ms: read_i32(src)?,
            error_code: read_i16(src)?,
            session_id: read_i32(src)?,
            responses: read_compact_array(src)?,
        };
        read_tagged_fields(src)?;
        Ok(response)
    }
}

impl Encode for FetchResponse {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_i32(dst, self.throttle_time_ms);
        write_i16(dst, self.error_code);
        write_i32(dst, self.session_id);
        write_compact_array(dst, &self.responses);
        write_tagged_fields(dst);
    }
}

//! DescribeTopicPartitions (key 75), v0.

use super::codec::{
    read_bool, read_i16, read_i32, read_u8, read_uuid, write_bool, write_i16, write_i32,
    write_uuid, Decode, DecodeResult, Encode,
};
use super::varint::{
    read_compact_array, read_compact_array_with, read_compact_string, read_tagged_fields,
    write_compact_array, write_compact_array_with, write_compact_string, write_tagged_fields,
};
use crate::error::DecodeError;
use crate::types::{ErrorCode, Uuid};
use bytes::{Buf, BufMut};

/// Null pagination cursor. Requests must carry it and responses always end with it.
pub const NULL_CURSOR: u8 = 0xff;

/// Authorized operations were not requested.
const AUTHORIZED_OPERATIONS_OMITTED: i32 = i32::MIN;

fn read_null_cursor<B: Buf>(src: &mut B) -> DecodeResult<()> {
    match read_u8(src)? {
        NULL_CURSOR => Ok(()),
        other => Err(DecodeError::UnexpectedCursor(other)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRequest {
    pub name: String,
}

impl Decode for TopicRequest {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let name = read_compact_string(src)?;
        read_tagged_fields(src)?;
        Ok(Self { name })
    }
}

impl Encode for TopicRequest {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_compact_string(dst, &self.name);
        write_tagged_fields(dst);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeTopicPartitionsRequest {
    pub topics: Vec<TopicRequest>,
    pub response_partition_limit: i32,
}

impl DescribeTopicPartitionsRequest {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            topics: names
                .into_iter()
                .map(|name| TopicRequest { name: name.into() })
                .collect(),
            response_partition_limit: 2000,
        }
    }
}

impl Decode for DescribeTopicPartitionsRequest {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let topics = read_compact_array(src)?;
        let response_partition_limit = read_i32(src)?;
        read_null_cursor(src)?;
        read_tagged_fields(src)?;
        Ok(Self {
            topics,
            response_partition_limit,
        })
    }
}

impl Encode for DescribeTopicPartitionsRequest {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_compact_array(dst, &self.topics);
        write_i32(dst, self.response_partition_limit);
        dst.put_u8(NULL_CURSOR);
        write_tagged_fields(dst);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePartition {
    pub error_code: i16,
    pub partition_index: i32,
    pub leader_id: i32,
    pub leader_epoch: i32,
    pub replica_nodes: Vec<i32>,
    pub isr_nodes: Vec<i32>,
    pub eligible_leader_replicas: Vec<i32>,
    pub last_known_elr: Vec<i32>,
    pub offline_replicas: Vec<i32>,
}

impl ResponsePartition {
    pub fn new(partition_index: i32) -> Self {
        Self {
            error_code: ErrorCode::None.code(),
            partition_index,
            leader_id: 0,
            leader_epoch: 0,
            replica_nodes: Vec::new(),
            isr_nodes: Vec::new(),
            eligible_leader_replicas: Vec::new(),
            last_known_elr: Vec::new(),
            offline_replicas: Vec::new(),
        }
    }
}

impl Decode for ResponsePartition {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let partition = ResponsePartition {
            error_code: read_i16(src)?,
            partition_index: read_i32(src)?,
            leader_id: read_i32(src)?,
            leader_epoch: read_i32(src)?,
            replica_nodes: read_compact_array_with(src, read_i32)?,
            isr_nodes: read_compact_array_with(src, read_i32)?,
            eligible_leader_replicas: read_compact_array_with(src, read_i32)?,
            last_known_elr: read_compact_array_with(src, read_i32)?,
            offline_replicas: read_compact_array_with(src, read_i32)?,
        };
        read_tagged_fields(src)?;
        Ok(partition)
    }
}

impl Encode for ResponsePartition {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        let put_i32 = |dst: &mut B, v: &i32| write_i32(dst, *v);
        write_i16(dst, self.error_code);
        write_i32(dst, self.partition_index);
        write_i32(dst, self.leader_id);
        write_i32(dst, self.leader_epoch);
        write_compact_array_with(dst, &self.replica_nodes, put_i32);
        write_compact_array_with(dst, &self.isr_nodes, put_i32);
        write_compact_array_with(dst, &self.eligible_leader_replicas, put_i32);
        write_compact_array_with(dst, &self.last_known_elr, put_i32);
        write_compact_array_with(dst, &self.offline_replicas, put_i32);
        write_tagged_fields(dst);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTopic {
    pub error_code: i16,
    pub name: String,
    pub topic_id: Uuid,
    pub is_internal: bool,
    pub partitions: Vec<ResponsePartition>,
    pub topic_authorized_operations: i32,
}

impl ResponseTopic {
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            error_code: ErrorCode::UnknownTopicOrPartition.code(),
            name: name.into(),
            topic_id: Uuid::nil(),
            is_internal: false,
            partitions: Vec::new(),
            topic_authorized_operations: AUTHORIZED_OPERATIONS_OMITTED,
        }
    }

    pub fn found(name: impl Into<String>, topic_id: Uuid, partition_ids: &[i32]) -> Self {
        Self {
            error_code: ErrorCode::None.code(),
            topic_id,
            partitions: partition_ids
                .iter()
                .map(|&p| ResponsePartition::new(p))
                .collect(),
            ..Self::unknown(name)
        }
    }
}

impl Decode for ResponseTopic {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let topic = ResponseTopic {
            error_code: read_i16(src)?,
            name: read_compact_string(src)?,
            topic_id: read_uuid(src)?,
            is_internal: read_bool(src)?,
            partitions: read_compact_array(src)?,
            topic_authorized_operations: read_i32(src)?,
        };
        read_tagged_fields(src)?;
        Ok(topic)
    }
}

impl Encode for ResponseTopic {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_i16(dst, self.error_code);
        write_compact_string(dst, &self.name);
        write_uuid(dst, &self.topic_id);
        write_bool(dst, self.is_internal);
        write_compact_array(dst, &self.partitions);
        write_i32(dst, self.topic_authorized_operations);
        write_tagged_fields(dst);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeTopicPartitionsResponse {
    pub throttle_time_ms: i32,
    pub topics: Vec<ResponseTopic>,
}

impl Decode for DescribeTopicPartitionsResponse {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let throttle_time_ms = read_i32(src)?;
        let topics = read_compact_array(src)?;
        read_null_cursor(src)?;
        read_tagged_fields(src)?;
        Ok(Self {
            throttle_time_ms,
            topics,
        })
    }
}

impl Encode for DescribeTopicPartitionsResponse {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_i32(dst, self.throttle_time_ms);
        write_compact_array(dst, &self.topics);
        dst.put_u8(NULL_CURSOR);
        write_tagged_fields(dst);
    }
}

//! Topic/partition index replayed from the `__cluster_metadata` log.
//!
//! Each record value in that log is a small versioned frame:
//! `frame_version: i8 | record_type: i8 | schema_version: i8 | payload`.
//! Only topic records (type 2) and partition records (type 3) are folded into
//! the index, and only the fields needed to join them are decoded.

use crate::error::{KraftletError, Result};
use crate::protocol::codec::{read_i32, read_i8, read_uuid, write_i32, write_i8, write_uuid};
use crate::protocol::codec::{DecodeResult, Encode};
use crate::protocol::varint::{read_compact_string, write_compact_string};
use crate::storage::{LogDirectory, RecordBatch};
use crate::types::Uuid;
use bytes::{Buf, BufMut};
use std::collections::HashMap;

pub const METADATA_TOPIC: &str = "__cluster_metadata";
pub const METADATA_PARTITION: i32 = 0;

const TOPIC_RECORD: i8 = 2;
const PARTITION_RECORD: i8 = 3;

/// Decoded value of one metadata log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataRecord {
    Topic { name: String, topic_id: Uuid },
    Partition { partition_id: i32, topic_id: Uuid },
    /// Any other record type; its payload is left unparsed.
    Other(i8),
}

impl MetadataRecord {
    pub fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let _frame_version = read_i8(src)?;
        let record_type = read_i8(src)?;
        let _schema_version = read_i8(src)?;
        match record_type {
            TOPIC_RECORD => {
                let name = read_compact_string(src)?;
                let topic_id = read_uuid(src)?;
                Ok(MetadataRecord::Topic { name, topic_id })
            }
            PARTITION_RECORD => {
                let partition_id = read_i32(src)?;
                let topic_id = read_uuid(src)?;
                Ok(MetadataRecord::Partition {
                    partition_id,
                    topic_id,
                })
            }
            other => Ok(MetadataRecord::Other(other)),
        }
    }
}

impl Encode for MetadataRecord {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_i8(dst, 1);
        match self {
            MetadataRecord::Topic { name, topic_id } => {
                write_i8(dst, TOPIC_RECORD);
                write_i8(dst, 0);
                write_compact_string(dst, name);
                write_uuid(dst, topic_id);
            }
            MetadataRecord::Partition {
                partition_id,
                topic_id,
            } => {
                write_i8(dst, PARTITION_RECORD);
                write_i8(dst, 1);
                write_i32(dst, *partition_id);
                write_uuid(dst, topic_id);
            }
            MetadataRecord::Other(record_type) => {
                write_i8(dst, *record_type);
                write_i8(dst, 0);
            }
        }
    }
}

/// Read-only lookup tables over topics and partitions.
///
/// Built once before serving and never mutated afterwards, so it can be
/// shared by reference across connection tasks without locking.
#[derive(Debug, Default, Clone)]
pub struct MetadataIndex {
    topic_ids: HashMap<String, Uuid>,
    topic_names: HashMap<Uuid, String>,
    /// Insertion order, duplicates kept.
    partition_ids: HashMap<Uuid, Vec<i32>>,
}

impl MetadataIndex {
    /// Replay the metadata log under `logs`.
    ///
    /// An unreadable log yields an empty index; the broker still answers with
    /// unknown-topic errors instead of refusing to start.
    pub fn load(logs: &LogDirectory) -> Self {
        match logs.read_batches(METADATA_TOPIC, METADATA_PARTITION) {
            Ok(batches) => {
                let index = Self::from_batches(&batches);
                tracing::info!(
                    batches = batches.len(),
                    topics = index.topic_ids.len(),
                    "loaded cluster metadata"
                );
                index
            }
            Err(e) => {
                tracing::warn!(
                    path = %logs.segment_path(METADATA_TOPIC, METADATA_PARTITION).display(),
                    error = %e,
                    "cluster metadata log unreadable; starting with empty metadata"
                );
                Self::default()
            }
        }
    }

    /// Fold every record value of `batches`, in order.
    pub fn from_batches(batches: &[RecordBatch]) -> Self {
        let mut index = Self::default();
        for record in batches.iter().flat_map(|b| b.records.iter()) {
            let Some(value) = record.value.as_deref() else {
                tracing::debug!(
                    offset_delta = record.offset_delta,
                    "skipping null metadata record"
                );
                continue;
            };
            match MetadataRecord::decode(&mut &value[..]) {
                Ok(value) => index.apply(value),
                Err(e) => {
                    tracing::debug!(
                        offset_delta = record.offset_delta,
                        error = %e,
                        "skipping metadata record"
                    );
                }
            }
        }
        index
    }

    fn apply(&mut self, record: MetadataRecord) {
        match record {
            MetadataRecord::Topic { name, topic_id } => {
                self.topic_ids.insert(name.clone(), topic_id);
                self.topic_names.insert(topic_id, name);
            }
            MetadataRecord::Partition {
                partition_id,
                topic_id,
            } => {
                self.partition_ids
                    .entry(topic_id)
                    .or_default()
                    .push(partition_id);
            }
            MetadataRecord::Other(_) => {}
        }
    }

    pub fn topic_id_by_name(&self, name: &str) -> Result<Uuid> {
        self.topic_ids
            .get(name)
            .copied()
            .ok_or_else(|| KraftletError::NotFound(format!("topic name {}", name)))
    }

    pub fn topic_name_by_id(&self, topic_id: &Uuid) -> Result<&str> {
        self.topic_names
            .get(topic_id)
            .map(String::as_str)
            .ok_or_else(|| KraftletError::NotFound(format!("topic id {}", topic_id)))
    }

    pub fn partition_ids_by_topic(&self, topic_id: &Uuid) -> Result<&[i32]> {
        self.partition_ids
            .get(topic_id)
            .map(Vec::as_slice)
            .ok_or_else(|| KraftletError::NotFound(format!("partitions of topic {}", topic_id)))
    }

    pub fn topic_count(&self) -> usize {
        self.topic_ids.len()
    }
}

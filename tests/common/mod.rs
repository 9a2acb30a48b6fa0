//! Fixtures: metadata logs and partition logs written into a temp dir.

#![allow(dead_code)]

use kraftlet::protocol::Encode;
use kraftlet::{Broker, BrokerConfig, LogDirectory, MetadataRecord, Record, RecordBatch, Uuid};
use std::sync::Arc;
use tempfile::TempDir;

pub fn uuid(last: u8) -> Uuid {
    let mut bytes = [0u8; 16];
    bytes[0] = 0xab;
    bytes[15] = last;
    Uuid(bytes)
}

pub fn topic_value(name: &str, topic_id: Uuid) -> Vec<u8> {
    let mut v = Vec::new();
    MetadataRecord::Topic {
        name: name.to_string(),
        topic_id,
    }
    .encode(&mut v);
    v
}

pub fn partition_value(partition_id: i32, topic_id: Uuid) -> Vec<u8> {
    let mut v = Vec::new();
    MetadataRecord::Partition {
        partition_id,
        topic_id,
    }
    .encode(&mut v);
    v
}

/// A feature-level style record the index must skip.
pub fn other_value(record_type: i8) -> Vec<u8> {
    vec![1, record_type as u8, 0, 0xde, 0xad, 0xbe, 0xef]
}

pub fn batch_of(base_offset: i64, values: Vec<Vec<u8>>) -> RecordBatch {
    let records = values
        .into_iter()
        .enumerate()
        .map(|(i, v)| Record::new(i as i32, v))
        .collect();
    RecordBatch::new(base_offset, records)
}

pub fn encode_batches(batches: &[RecordBatch]) -> Vec<u8> {
    let mut out = Vec::new();
    for b in batches {
        b.encode(&mut out);
    }
    out
}

pub fn write_log(logs: &LogDirectory, topic: &str, partition: i32, bytes: &[u8]) {
    let path = logs.segment_path(topic, partition);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

pub fn write_batches(logs: &LogDirectory, topic: &str, partition: i32, batches: &[RecordBatch]) {
    write_log(logs, topic, partition, &encode_batches(batches));
}

/// Broker over a temp dir whose metadata log holds `batches`.
pub fn broker_with_metadata(batches: &[RecordBatch]) -> (Arc<Broker>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let logs = LogDirectory::new(dir.path());
    write_batches(&logs, "__cluster_metadata", 0, batches);
    let broker = Arc::new(Broker::new(BrokerConfig {
        log_dir: dir.path().to_path_buf(),
        ..Default::default()
    }));
    (broker, dir)
}

/// Metadata with topic "foo" (two partitions) and topic "bar" (one partition).
pub fn sample_metadata() -> Vec<RecordBatch> {
    vec![
        batch_of(0, vec![other_value(12)]),
        batch_of(
            1,
            vec![
                topic_value("foo", uuid(1)),
                partition_value(0, uuid(1)),
                partition_value(1, uuid(1)),
            ],
        ),
        batch_of(4, vec![topic_value("bar", uuid(2)), partition_value(0, uuid(2))]),
    ]
}

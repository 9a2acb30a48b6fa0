use bytes::BytesMut;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kraftlet::protocol::varint::{read_varlong, write_varlong};
use kraftlet::protocol::{Encode, RequestHeader};
use kraftlet::storage::read_record_batches;
use kraftlet::{
    ApiKey, Broker, BrokerConfig, MetadataIndex, MetadataRecord, Record, RecordBatch, Request,
    RequestMessage, Uuid,
};
use std::sync::Arc;
use tempfile::TempDir;

fn batches(count: usize, records_per_batch: usize, value_len: usize) -> Vec<RecordBatch> {
    (0..count)
        .map(|b| {
            let records = (0..records_per_batch)
                .map(|r| Record::new(r as i32, vec![7u8; value_len]))
                .collect();
            RecordBatch::new((b * records_per_batch) as i64, records)
        })
        .collect()
}

fn encode_all(batches: &[RecordBatch]) -> Vec<u8> {
    let mut out = Vec::new();
    for b in batches {
        b.encode(&mut out);
    }
    out
}

fn metadata_batches(topics: usize) -> Vec<RecordBatch> {
    (0..topics)
        .map(|t| {
            let mut id = [0u8; 16];
            id[..8].copy_from_slice(&(t as u64).to_be_bytes());
            let topic_id = Uuid(id);
            let values = [
                MetadataRecord::Topic {
                    name: format!("topic-{}", t),
                    topic_id,
                },
                MetadataRecord::Partition {
                    partition_id: 0,
                    topic_id,
                },
            ];
            let records = values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let mut buf = Vec::new();
                    v.encode(&mut buf);
                    Record::new(i as i32, buf)
                })
                .collect();
            RecordBatch::new((t * 2) as i64, records)
        })
        .collect()
}

fn bench_varlong(c: &mut Criterion) {
    let values: Vec<i64> = (0..1024).map(|i| (i as i64 - 512) << (i % 50)).collect();
    let mut encoded = Vec::new();
    for v in &values {
        write_varlong(&mut encoded, *v);
    }

    let mut group = c.benchmark_group("varlong");
    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("encode", |b| {
        let mut buf = Vec::with_capacity(encoded.len());
        b.iter(|| {
            buf.clear();
            for v in &values {
                write_varlong(&mut buf, *v);
            }
        });
    });
    group.bench_function("decode", |b| {
        b.iter(|| {
            let mut src = encoded.as_slice();
            for _ in 0..values.len() {
                let _ = read_varlong(&mut src).unwrap();
            }
        });
    });
    group.finish();
}

fn bench_record_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_batch_decode");
    for value_len in [16usize, 256usize, 4096usize] {
        let encoded = encode_all(&batches(32, 16, value_len));
        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(value_len), &encoded, |b, encoded| {
            b.iter(|| {
                let out = read_record_batches(&mut encoded.as_slice());
                assert_eq!(out.len(), 32);
            });
        });
    }
    group.finish();
}

fn bench_metadata_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("metadata_index");
    for topics in [100usize, 1000usize] {
        let input = metadata_batches(topics);
        group.throughput(Throughput::Elements(topics as u64));
        group.bench_with_input(BenchmarkId::from_parameter(topics), &input, |b, input| {
            b.iter(|| MetadataIndex::from_batches(input));
        });
    }
    group.finish();
}

fn bench_fetch(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let config = BrokerConfig {
        log_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let broker = Arc::new(Broker::with_metadata(
        config,
        MetadataIndex::from_batches(&metadata_batches(1)),
    ));
    let path = broker.logs().segment_path("topic-0", 0);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, encode_all(&batches(64, 8, 512))).unwrap();
    let topic_id = broker.metadata().topic_id_by_name("topic-0").unwrap();

    let request = RequestMessage::new(
        RequestHeader::new(ApiKey::Fetch, 16, 1),
        Request::Fetch(kraftlet::protocol::FetchRequest::new(vec![
            kraftlet::protocol::FetchTopic {
                topic_id,
                partitions: vec![kraftlet::protocol::FetchPartition::new(0)],
            },
        ])),
    );

    c.bench_function("fetch_round_trip", |b| {
        let mut out = BytesMut::new();
        b.iter(|| {
            out.clear();
            broker.handle(request.clone()).encode_frame(&mut out);
        });
    });
}

criterion_group!(
    benches,
    bench_varlong,
    bench_record_batches,
    bench_metadata_index,
    bench_fetch
);
criterion_main!(benches);

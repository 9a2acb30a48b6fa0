//! Request dispatch: every request goes through its wire encoding, the
//! broker, and back through the response's wire encoding.

mod common;

use bytes::BytesMut;
use common::{batch_of, broker_with_metadata, sample_metadata, uuid, write_batches};
use kraftlet::protocol::{
    split_frame, ApiVersion, ApiVersionsRequest, DescribeTopicPartitionsRequest, FetchPartition,
    FetchRequest, FetchTopic, RequestHeader,
};
use kraftlet::{
    ApiKey, Broker, BrokerConfig, ErrorCode, MetadataIndex, Request, RequestMessage, Response,
    ResponseMessage, Uuid,
};

const MAX_FRAME: usize = 1024 * 1024;

fn exchange(
    broker: &Broker,
    version: i16,
    correlation_id: i32,
    request: Request,
) -> ResponseMessage {
    let api_key = request.api_key();
    let header = RequestHeader::new(api_key, version, correlation_id).with_client_id("test-client");
    let mut wire = BytesMut::new();
    RequestMessage::new(header, request).encode_frame(&mut wire);

    let frame = split_frame(&mut wire, MAX_FRAME).unwrap().unwrap();
    assert!(wire.is_empty());
    let message = RequestMessage::decode_body(&mut frame.freeze()).unwrap();

    let mut out = BytesMut::new();
    broker.handle(message).encode_frame(&mut out);
    let body = split_frame(&mut out, MAX_FRAME).unwrap().unwrap();
    ResponseMessage::decode_body(api_key, &mut body.freeze()).unwrap()
}

fn describe(
    broker: &Broker,
    names: &[&str],
) -> kraftlet::protocol::DescribeTopicPartitionsResponse {
    let request = Request::DescribeTopicPartitions(DescribeTopicPartitionsRequest::new(
        names.iter().copied(),
    ));
    match exchange(broker, 0, 11, request).response {
        Response::DescribeTopicPartitions(r) => r,
        other => panic!("unexpected response {:?}", other),
    }
}

fn fetch(broker: &Broker, topic_id: Uuid, partitions: &[i32]) -> kraftlet::protocol::FetchResponse {
    let request = Request::Fetch(FetchRequest::new(vec![FetchTopic {
        topic_id,
        partitions: partitions.iter().map(|&p| FetchPartition::new(p)).collect(),
    }]));
    match exchange(broker, 16, 12, request).response {
        Response::Fetch(r) => r,
        other => panic!("unexpected response {:?}", other),
    }
}

// ---- ApiVersions ----

#[test]
fn api_versions_v4_lists_supported_apis() {
    let (broker, _dir) = broker_with_metadata(&[]);
    let response = exchange(&broker, 4, 7, Request::ApiVersions(ApiVersionsRequest::default()));

    assert_eq!(response.header.correlation_id, 7);
    let Response::ApiVersions(body) = response.response else {
        panic!("expected ApiVersions");
    };
    assert_eq!(body.error_code, 0);
    assert_eq!(body.throttle_time_ms, 0);
    assert_eq!(
        body.api_keys,
        vec![
            ApiVersion::new(ApiKey::Fetch, 0, 16),
            ApiVersion::new(ApiKey::ApiVersions, 0, 4),
            ApiVersion::new(ApiKey::DescribeTopicPartitions, 0, 0),
        ]
    );
}

// Unsupported versions get the error code and an empty api list, not the full one.
#[test]
fn api_versions_other_version_is_unsupported() {
    let (broker, _dir) = broker_with_metadata(&[]);
    for version in [0, 3, 5] {
        let response = exchange(
            &broker,
            version,
            99,
            Request::ApiVersions(ApiVersionsRequest::default()),
        );
        assert_eq!(response.header.correlation_id, 99);
        let Response::ApiVersions(body) = response.response else {
            panic!("expected ApiVersions");
        };
        assert_eq!(body.error_code, ErrorCode::UnsupportedVersion.code());
        assert!(body.api_keys.is_empty());
    }
}

#[test]
fn api_versions_response_has_no_header_tag_byte() {
    let (broker, _dir) = broker_with_metadata(&[]);
    let request = RequestMessage::new(
        RequestHeader::new(ApiKey::ApiVersions, 4, 0x0102_0304),
        Request::ApiVersions(ApiVersionsRequest::default()),
    );
    let mut out = BytesMut::new();
    broker.handle(request).encode_frame(&mut out);

    // length, correlation id, then the body's error code with no tag byte between.
    assert_eq!(&out[4..8], &[0x01, 0x02, 0x03, 0x04]);
    assert_eq!(&out[8..10], &[0x00, 0x00]);
    assert_eq!(out[10], 4);
    let len = i32::from_be_bytes([out[0], out[1], out[2], out[3]]) as usize;
    assert_eq!(len, out.len() - 4);
}

// ---- DescribeTopicPartitions ----

#[test]
fn describe_unknown_topic() {
    let (broker, _dir) = broker_with_metadata(&sample_metadata());
    let response = describe(&broker, &["missing"]);

    assert_eq!(response.topics.len(), 1);
    let topic = &response.topics[0];
    assert_eq!(topic.error_code, ErrorCode::UnknownTopicOrPartition.code());
    assert_eq!(topic.name, "missing");
    assert!(topic.topic_id.is_nil());
    assert!(topic.partitions.is_empty());
}

#[test]
fn describe_known_topic_lists_partitions() {
    let (broker, _dir) = broker_with_metadata(&sample_metadata());
    let response = describe(&broker, &["foo"]);

    let topic = &response.topics[0];
    assert_eq!(topic.error_code, 0);
    assert_eq!(topic.name, "foo");
    assert_eq!(topic.topic_id, uuid(1));
    assert!(!topic.is_internal);
    assert_eq!(topic.topic_authorized_operations, i32::MIN);
    let indexes: Vec<i32> = topic.partitions.iter().map(|p| p.partition_index).collect();
    assert_eq!(indexes, [0, 1]);
    for p in &topic.partitions {
        assert_eq!(p.error_code, 0);
        assert_eq!(p.leader_id, 0);
        assert_eq!(p.leader_epoch, 0);
        assert!(p.replica_nodes.is_empty());
        assert!(p.isr_nodes.is_empty());
    }
}

#[test]
fn describe_answers_topics_in_request_order() {
    let (broker, _dir) = broker_with_metadata(&sample_metadata());
    let response = describe(&broker, &["bar", "missing", "foo"]);

    let names: Vec<&str> = response.topics.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["bar", "missing", "foo"]);
    assert_eq!(response.topics[0].partitions.len(), 1);
    assert_eq!(response.topics[1].error_code, 3);
    assert_eq!(response.topics[2].partitions.len(), 2);
}

#[test]
fn describe_topic_without_partition_records() {
    let (broker, _dir) = broker_with_metadata(&[batch_of(
        0,
        vec![common::topic_value("bare", uuid(4))],
    )]);
    let response = describe(&broker, &["bare"]);
    assert_eq!(response.topics[0].error_code, 0);
    assert!(response.topics[0].partitions.is_empty());
}

// ---- Fetch ----

#[test]
fn fetch_unknown_topic_id() {
    let (broker, _dir) = broker_with_metadata(&sample_metadata());
    let response = fetch(&broker, uuid(200), &[0, 1]);

    assert_eq!(response.error_code, 0);
    assert_eq!(response.responses.len(), 1);
    let topic = &response.responses[0];
    assert_eq!(topic.topic_id, uuid(200));
    assert_eq!(topic.partitions.len(), 1);
    assert_eq!(topic.partitions[0].partition_index, 0);
    assert_eq!(topic.partitions[0].error_code, ErrorCode::UnknownTopicId.code());
    assert!(topic.partitions[0].records.is_empty());
}

#[test]
fn fetch_returns_partition_log_batches() {
    let (broker, _dir) = broker_with_metadata(&sample_metadata());
    let batches = vec![
        batch_of(0, vec![b"hello".to_vec()]),
        batch_of(1, vec![b"world".to_vec(), b"again".to_vec()]),
    ];
    write_batches(broker.logs(), "foo", 0, &batches);

    let response = fetch(&broker, uuid(1), &[0]);
    let partition = &response.responses[0].partitions[0];
    assert_eq!(partition.partition_index, 0);
    assert_eq!(partition.error_code, 0);
    assert_eq!(partition.records, batches);
    assert_eq!(partition.log_start_offset, 0);
    assert_eq!(partition.high_watermark, 3);
    assert_eq!(partition.last_stable_offset, 3);
    assert_eq!(partition.preferred_read_replica, -1);
}

#[test]
fn fetch_answers_each_requested_partition() {
    let (broker, _dir) = broker_with_metadata(&sample_metadata());
    write_batches(broker.logs(), "foo", 1, &[batch_of(5, vec![b"p1".to_vec()])]);

    let response = fetch(&broker, uuid(1), &[0, 1]);
    let partitions = &response.responses[0].partitions;
    assert_eq!(partitions.len(), 2);
    // No log for partition 0: empty, not an error.
    assert_eq!(partitions[0].partition_index, 0);
    assert_eq!(partitions[0].error_code, 0);
    assert!(partitions[0].records.is_empty());
    assert_eq!(partitions[1].partition_index, 1);
    assert_eq!(partitions[1].records.len(), 1);
    assert_eq!(partitions[1].records[0].records[0].value.as_deref(), Some(&b"p1"[..]));
    assert_eq!(partitions[1].log_start_offset, 5);
}

#[test]
fn fetch_reads_log_on_every_request() {
    let (broker, _dir) = broker_with_metadata(&sample_metadata());
    write_batches(broker.logs(), "bar", 0, &[batch_of(0, vec![b"one".to_vec()])]);
    assert_eq!(fetch(&broker, uuid(2), &[0]).responses[0].partitions[0].records.len(), 1);

    write_batches(
        broker.logs(),
        "bar",
        0,
        &[batch_of(0, vec![b"one".to_vec()]), batch_of(1, vec![b"two".to_vec()])],
    );
    assert_eq!(fetch(&broker, uuid(2), &[0]).responses[0].partitions[0].records.len(), 2);
}

#[test]
fn fetch_with_no_topics_is_empty() {
    let (broker, _dir) = broker_with_metadata(&sample_metadata());
    let response = exchange(&broker, 16, 1, Request::Fetch(FetchRequest::new(Vec::new())));
    let Response::Fetch(body) = response.response else {
        panic!("expected Fetch");
    };
    assert!(body.responses.is_empty());
}

// ---- Broker construction ----

#[test]
fn broker_without_metadata_log_answers_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let broker = Broker::new(BrokerConfig {
        log_dir: dir.path().to_path_buf(),
        ..Default::default()
    });
    assert_eq!(broker.metadata().topic_count(), 0);
    assert_eq!(describe(&broker, &["foo"]).topics[0].error_code, 3);
}

#[test]
fn broker_with_prebuilt_index() {
    let dir = tempfile::tempdir().unwrap();
    let index = MetadataIndex::from_batches(&sample_metadata());
    let broker = Broker::with_metadata(
        BrokerConfig {
            log_dir: dir.path().to_path_buf(),
            ..Default::default()
        },
        index,
    );
    assert_eq!(describe(&broker, &["bar"]).topics[0].topic_id, uuid(2));
}

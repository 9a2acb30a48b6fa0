//! Kafka binary wire protocol, restricted to ApiVersions v4, Fetch v16 and
//! DescribeTopicPartitions v0.
//!
//! `codec` and `varint` hold the primitive encodings; `header` and `frame`
//! the envelopes; one module per api holds its request and response bodies.

pub mod api_versions;
pub mod codec;
pub mod describe_topic_partitions;
pub mod fetch;
mod frame;
mod header;
pub mod varint;

pub use api_versions::{ApiVersion, ApiVersionsRequest, ApiVersionsResponse};
pub use codec::{Decode, DecodeResult, Encode};
pub use describe_topic_partitions::{
    DescribeTopicPartitionsRequest, DescribeTopicPartitionsResponse, ResponsePartition,
    ResponseTopic,
};
pub use fetch::{FetchPartition, FetchRequest, FetchResponse, FetchTopic, PartitionData};
pub use frame::{split_frame, Request, RequestMessage, Response, ResponseMessage};
pub use header::{RequestHeader, ResponseHeader};

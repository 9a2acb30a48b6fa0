//! Kraftlet: a minimal Kafka-protocol broker that answers ApiVersions,
//! DescribeTopicPartitions and Fetch from a KRaft metadata log on disk.

pub mod broker;
pub mod error;
pub mod metadata;
pub mod observability;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod types;

pub use broker::{Broker, BrokerConfig};
pub use error::{DecodeError, KraftletError, Result};
pub use metadata::{MetadataIndex, MetadataRecord};
pub use protocol::{Request, RequestMessage, Response, ResponseMessage};
pub use storage::{LogDirectory, Record, RecordBatch};
pub use types::{ApiKey, ErrorCode, Uuid};

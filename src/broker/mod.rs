//! Broker: owns the metadata index and routes decoded requests to handlers.

mod handlers;

use crate::metadata::MetadataIndex;
use crate::protocol::{Request, RequestMessage, Response, ResponseMessage};
use crate::storage::LogDirectory;
use std::path::PathBuf;

/// Broker-wide configuration.
#[derive(Clone, Debug)]
pub struct BrokerConfig {
    /// Directory holding `<topic>-<partition>/` log directories.
    pub log_dir: PathBuf,
    /// Max concurrently served connections (`None` = unbounded).
    pub max_connections: Option<usize>,
    /// Largest request frame accepted, in bytes.
    pub max_frame_len: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("/tmp/kraft-combined-logs"),
            max_connections: None,
            max_frame_len: 100 * 1024 * 1024, // 100MB
        }
    }
}

/// Serves ApiVersions, Fetch and DescribeTopicPartitions.
///
/// Immutable once built; share it across connections with `Arc<Broker>`.
pub struct Broker {
    config: BrokerConfig,
    logs: LogDirectory,
    metadata: MetadataIndex,
}

impl Broker {
    /// Build the broker, replaying the cluster metadata log under `config.log_dir`.
    pub fn new(config: BrokerConfig) -> Self {
        let logs = LogDirectory::new(config.log_dir.clone());
        let metadata = MetadataIndex::load(&logs);
        Self::with_metadata(config, metadata)
    }

    /// Build the broker around an index constructed elsewhere.
    pub fn with_metadata(config: BrokerConfig, metadata: MetadataIndex) -> Self {
        let logs = LogDirectory::new(config.log_dir.clone());
        Self {
            config,
            logs,
            metadata,
        }
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    pub fn metadata(&self) -> &MetadataIndex {
        &self.metadata
    }

    pub fn logs(&self) -> &LogDirectory {
        &self.logs
    }

    /// Answer one request. Lookup misses become error codes in the response.
    pub fn handle(&self, message: RequestMessage) -> ResponseMessage {
        let RequestMessage { header, request } = message;
        let response = match request {
            Request::ApiVersions(req) => {
                Response::ApiVersions(self.api_versions(header.api_version, &req))
            }
            Request::Fetch(req) => Response::Fetch(self.fetch(&req)),
            Request::DescribeTopicPartitions(req) => {
                Response::DescribeTopicPartitions(self.describe_topic_partitions(&req))
            }
        };
        ResponseMessage::new(header.correlation_id, response)
    }
}

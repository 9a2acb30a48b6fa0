use super::Broker;
use crate::observability::observability;
use crate::protocol::api_versions::{supported_api_versions, SUPPORTED_API_VERSIONS_VERSION};
use crate::protocol::fetch::FetchableTopicResponse;
use crate::protocol::{
    ApiVersionsRequest, ApiVersionsResponse, DescribeTopicPartitionsRequest,
    DescribeTopicPartitionsResponse, FetchRequest, FetchResponse, FetchTopic, PartitionData,
    ResponseTopic,
};
use crate::types::ErrorCode;
use tracing::{debug, warn};

impl Broker {
    /// An unsupported version gets the error code and an empty api list.
    pub(super) fn api_versions(
        &self,
        api_version: i16,
        _request: &ApiVersionsRequest,
    ) -> ApiVersionsResponse {
        if api_version != SUPPORTED_API_VERSIONS_VERSION {
            debug!(api_version, "unsupported ApiVersions version");
            return ApiVersionsResponse::error(ErrorCode::UnsupportedVersion);
        }
        ApiVersionsResponse {
            error_code: ErrorCode::None.code(),
            api_keys: supported_api_versions(),
            throttle_time_ms: 0,
        }
    }

    pub(super) fn describe_topic_partitions(
        &self,
        request: &DescribeTopicPartitionsRequest,
    ) -> DescribeTopicPartitionsResponse {
        let topics = request
            .topics
            .iter()
            .map(|topic| self.describe_topic(&topic.name))
            .collect();
        DescribeTopicPartitionsResponse {
            throttle_time_ms: 0,
            topics,
        }
    }

    fn describe_topic(&self, name: &str) -> ResponseTopic {
        let topic_id = match self.metadata.topic_id_by_name(name) {
            Ok(id) => id,
            Err(e) => {
                debug!(topic = name, error = %e, "describe of unknown topic");
                return ResponseTopic::unknown(name);
            }
        };
        // A topic record with no partition records yet describes as zero partitions.
        let partitions = self
            .metadata
            .partition_ids_by_topic(&topic_id)
            .unwrap_or_default();
        ResponseTopic::found(name, topic_id, partitions)
    }

    pub(super) fn fetch(&self, request: &FetchRequest) -> FetchResponse {
        let responses = request
            .topics
            .iter()
            .map(|topic| self.fetch_topic(topic))
            .collect();
        FetchResponse {
            throttle_time_ms: 0,
            error_code: ErrorCode::None.code(),
            session_id: 0,
            responses,
        }
    }

    fn fetch_topic(&self, topic: &FetchTopic) -> FetchableTopicResponse {
        let partitions = match self.metadata.topic_name_by_id(&topic.topic_id) {
            Ok(name) => topic
                .partitions
                .iter()
                .map(|p| self.fetch_partition(name, p.partition))
                .collect(),
            Err(e) => {
                debug!(topic_id = %topic.topic_id, error = %e, "fetch of unknown topic id");
                vec![PartitionData::error(0, ErrorCode::UnknownTopicId)]
            }
        };
        FetchableTopicResponse {
            topic_id: topic.topic_id,
            partitions,
        }
    }

    /// Read the partition's batches from disk on every call.
    fn fetch_partition(&self, topic: &str, partition: i32) -> PartitionData {
        let batches = match self.logs.read_batches(topic, partition) {
            Ok(batches) => batches,
            Err(e) => {
                warn!(
                    topic,
                    partition,
                    error = %e,
                    "partition log unreadable; returning no records"
                );
                Vec::new()
            }
        };
        observability().record_fetch_batches(batches.len());
        PartitionData::with_batches(partition, batches)
    }
}

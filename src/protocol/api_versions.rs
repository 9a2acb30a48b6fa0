//! ApiVersions (key 18), v4 only.

use super::codec::{read_i16, read_i32, write_i16, write_i32, Decode, DecodeResult, Encode};
use super::varint::{
    read_compact_array, read_compact_string, read_tagged_fields, write_compact_array,
    write_compact_string, write_tagged_fields,
};
use crate::types::{ApiKey, ErrorCode};
use bytes::{Buf, BufMut};

/// The only ApiVersions version this broker answers without error.
pub const SUPPORTED_API_VERSIONS_VERSION: i16 = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiVersionsRequest {
    pub client_software_name: String,
    pub client_software_version: String,
}

impl Decode for ApiVersionsRequest {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let client_software_name = read_compact_string(src)?;
        let client_software_version = read_compact_string(src)?;
        read_tagged_fields(src)?;
        Ok(Self {
            client_software_name,
            client_software_version,
        })
    }
}

impl Encode for ApiVersionsRequest {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_compact_string(dst, &self.client_software_name);
        write_compact_string(dst, &self.client_software_version);
        write_tagged_fields(dst);
    }
}

/// Version range supported for one api key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersion {
    pub api_key: i16,
    pub min_version: i16,
    pub max_version: i16,
}

impl ApiVersion {
    pub fn new(api_key: ApiKey, min_version: i16, max_version: i16) -> Self {
        Self {
            api_key: api_key.code(),
            min_version,
            max_version,
        }
    }
}

impl Decode for ApiVersion {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let api_key = read_i16(src)?;
        let min_version = read_i16(src)?;
        let max_version = read_i16(src)?;
        read_tagged_fields(src)?;
        Ok(Self {
            api_key,
            min_version,
            max_version,
        })
    }
}

impl Encode for ApiVersion {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_i16(dst, self.api_key);
        write_i16(dst, self.min_version);
        write_i16(dst, self.max_version);
        write_tagged_fields(dst);
    }
}

/// Every api this broker serves, with its version range.
pub fn supported_api_versions() -> Vec<ApiVersion> {
    vec![
        ApiVersion::new(ApiKey::Fetch, 0, 16),
        ApiVersion::new(ApiKey::ApiVersions, 0, SUPPORTED_API_VERSIONS_VERSION),
        ApiVersion::new(ApiKey::DescribeTopicPartitions, 0, 0),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersionsResponse {
    pub error_code: i16,
    pub api_keys: Vec<ApiVersion>,
    pub throttle_time_ms: i32,
}

impl ApiVersionsResponse {
    pub fn error(error: ErrorCode) -> Self {
        Self {
            error_code: error.code(),
            api_keys: Vec::new(),
            throttle_time_ms: 0,
        }
    }
}

impl Decode for ApiVersionsResponse {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let error_code = read_i16(src)?;
        let api_keys = read_compact_array(src)?;
        let throttle_time_ms = read_i32(src)?;
        read_tagged_fields(src)?;
        Ok(Self {
            error_code,
            api_keys,
            throttle_time_ms,
        })
    }
}

impl Encode for ApiVersionsResponse {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_i16(dst, self.error_code);
        write_compact_array(dst, &self.api_keys);
        write_i32(dst, self.throttle_time_ms);
        write_tagged_fields(dst);
    }
}

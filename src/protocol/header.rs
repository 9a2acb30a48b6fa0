//! Request and response headers.

use super::codec::{read_i16, read_i32, read_nullable_string, write_i16, write_i32};
use super::codec::{write_nullable_string, Decode, DecodeResult, Encode};
use super::varint::{read_tagged_fields, write_tagged_fields};
use crate::types::ApiKey;
use bytes::{Buf, BufMut};

/// Request header v2: api key, version, correlation id, client id, tagged fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeader {
    pub api_key: i16,
    pub api_version: i16,
    /// Opaque value echoed back verbatim.
    pub correlation_id: i32,
    /// Null and empty client ids both read as "".
    pub client_id: String,
}

impl RequestHeader {
    pub fn new(api_key: ApiKey, api_version: i16, correlation_id: i32) -> Self {
        Self {
            api_key: api_key.code(),
            api_version,
            correlation_id,
            client_id: String::new(),
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }
}

impl Decode for RequestHeader {
    fn decode<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let api_key = read_i16(src)?;
        let api_version = read_i16(src)?;
        let correlation_id = read_i32(src)?;
        let client_id = read_nullable_string(src)?;
        read_tagged_fields(src)?;
        Ok(Self {
            api_key,
            api_version,
            correlation_id,
            client_id,
        })
    }
}

impl Encode for RequestHeader {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        write_i16(dst, self.api_key);
        write_i16(dst, self.api_version);
        write_i32(dst, self.correlation_id);
        write_nullable_string(dst, &self.client_id);
        write_tagged_fields(dst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub correlation_id: i32,
}

impl ResponseHeader {
    pub fn new(correlation_id: i32) -> Self {
        Self { correlation_id }
    }

    /// ApiVersions answers with header v0 so clients that do not yet know the
    /// broker's versions can parse it; every other response uses v1.
    pub fn encode_for<B: BufMut>(&self, api_key: ApiKey, dst: &mut B) {
        write_i32(dst, self.correlation_id);
        if api_key != ApiKey::ApiVersions {
            write_tagged_fields(dst);
        }
    }

    /// Inverse of [`ResponseHeader::encode_for`], used by clients and tests.
    pub fn decode_for<B: Buf>(api_key: ApiKey, src: &mut B) -> DecodeResult<Self> {
        let correlation_id = read_i32(src)?;
        if api_key != ApiKey::ApiVersions {
            read_tagged_fields(src)?;
        }
        Ok(Self { correlation_id })
    }
}

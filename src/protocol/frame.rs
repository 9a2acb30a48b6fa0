//! Length-prefixed request/response envelopes.
//!
//! Frame: int32 (BE) length + body, the length excluding itself.
//! Request body: [`RequestHeader`] + one request, chosen by the header's api key.
//! Response body: [`ResponseHeader`] + one response.

use super::api_versions::{ApiVersionsRequest, ApiVersionsResponse};
use super::codec::{ensure, read_u32, Decode, DecodeResult, Encode};
use super::describe_topic_partitions::{
    DescribeTopicPartitionsRequest, DescribeTopicPartitionsResponse,
};
use super::fetch::{FetchRequest, FetchResponse};
use super::header::{RequestHeader, ResponseHeader};
use crate::error::{DecodeError, KraftletError, Result};
use crate::types::ApiKey;
use bytes::{Buf, BufMut, BytesMut};

const LENGTH_PREFIX_BYTES: usize = 4;
/// Most buffer space reserved at once for a frame still arriving.
const MAX_FRAME_RESERVE: usize = 64 * 1024;

/// Any request this broker can decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ApiVersions(ApiVersionsRequest),
    Fetch(FetchRequest),
    DescribeTopicPartitions(DescribeTopicPartitionsRequest),
}

impl Request {
    pub fn api_key(&self) -> ApiKey {
        match self {
            Request::ApiVersions(_) => ApiKey::ApiVersions,
            Request::Fetch(_) => ApiKey::Fetch,
            Request::DescribeTopicPartitions(_) => ApiKey::DescribeTopicPartitions,
        }
    }

    pub fn decode_for<B: Buf>(api_key: ApiKey, src: &mut B) -> DecodeResult<Self> {
        Ok(match api_key {
            ApiKey::ApiVersions => Request::ApiVersions(ApiVersionsRequest::decode(src)?),
            ApiKey::Fetch => Request::Fetch(FetchRequest::decode(src)?),
            ApiKey::DescribeTopicPartitions => {
                Request::DescribeTopicPartitions(DescribeTopicPartitionsRequest::decode(src)?)
            }
        })
    }
}

impl Encode for Request {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        match self {
            Request::ApiVersions(r) => r.encode(dst),
            Request::Fetch(r) => r.encode(dst),
            Request::DescribeTopicPartitions(r) => r.encode(dst),
        }
    }
}

/// Any response this broker can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    ApiVersions(ApiVersionsResponse),
    Fetch(FetchResponse),
    DescribeTopicPartitions(DescribeTopicPartitionsResponse),
}

impl Response {
    pub fn api_key(&self) -> ApiKey {
        match self {
            Response::ApiVersions(_) => ApiKey::ApiVersions,
            Response::Fetch(_) => ApiKey::Fetch,
            Response::DescribeTopicPartitions(_) => ApiKey::DescribeTopicPartitions,
        }
    }

    pub fn decode_for<B: Buf>(api_key: ApiKey, src: &mut B) -> DecodeResult<Self> {
        Ok(match api_key {
            ApiKey::ApiVersions => Response::ApiVersions(ApiVersionsResponse::decode(src)?),
            ApiKey::Fetch => Response::Fetch(FetchResponse::decode(src)?),
            ApiKey::DescribeTopicPartitions => {
                Response::DescribeTopicPartitions(DescribeTopicPartitionsResponse::decode(src)?)
            }
        })
    }
}

impl Encode for Response {
    fn encode<B: BufMut>(&self, dst: &mut B) {
        match self {
            Response::ApiVersions(r) => r.encode(dst),
            Response::Fetch(r) => r.encode(dst),
            Response::DescribeTopicPartitions(r) => r.encode(dst),
        }
    }
}

/// A decoded request with its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMessage {
    pub header: RequestHeader,
    pub request: Request,
}

impl RequestMessage {
    pub fn new(header: RequestHeader, request: Request) -> Self {
        Self { header, request }
    }

    /// Decode header and request from one frame body (length prefix already removed).
    pub fn decode_body<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let header = RequestHeader::decode(src)?;
        let api_key = ApiKey::from_code(header.api_key)
            .ok_or(DecodeError::UnsupportedRequestType(header.api_key))?;
        let request = Request::decode_for(api_key, src)?;
        Ok(Self { header, request })
    }

    /// Decode one complete frame, length prefix included.
    ///
    /// The body is decoded from a slice bounded by the declared length, so a
    /// request can never read into the next frame.
    pub fn decode_frame<B: Buf>(src: &mut B) -> DecodeResult<Self> {
        let len = read_u32(src)? as usize;
        ensure(src, len)?;
        let mut body = src.copy_to_bytes(len);
        Self::decode_body(&mut body)
    }

    pub fn encode_frame(&self, dst: &mut BytesMut) {
        let mut body = BytesMut::new();
        self.header.encode(&mut body);
        self.request.encode(&mut body);
        put_frame(dst, &body);
    }
}

/// A response with its header, ready to be framed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMessage {
    pub header: ResponseHeader,
    pub response: Response,
}

impl ResponseMessage {
    pub fn new(correlation_id: i32, response: Response) -> Self {
        Self {
            header: ResponseHeader::new(correlation_id),
            response,
        }
    }

    /// Serialize header and body into a scratch buffer, then append the framed result.
    pub fn encode_frame(&self, dst: &mut BytesMut) {
        let mut body = BytesMut::new();
        self.header.encode_for(self.response.api_key(), &mut body);
        self.response.encode(&mut body);
        put_frame(dst, &body);
    }

    /// Decode a frame body; the caller knows which api it asked for.
    pub fn decode_body<B: Buf>(api_key: ApiKey, src: &mut B) -> DecodeResult<Self> {
        let header = ResponseHeader::decode_for(api_key, src)?;
        let response = Response::decode_for(api_key, src)?;
        Ok(Self { header, response })
    }
}

fn put_frame(dst: &mut BytesMut, body: &[u8]) {
    dst.reserve(LENGTH_PREFIX_BYTES + body.len());
    dst.put_i32(body.len() as i32);
    dst.extend_from_slice(body);
}

/// Split one frame body off the front of `src`.
///
/// Returns `None` until the whole frame has arrived. Lengths that are
/// negative or larger than `max_frame_len` fail without consuming anything.
pub fn split_frame(src: &mut BytesMut, max_frame_len: usize) -> Result<Option<BytesMut>> {
    if src.len() < LENGTH_PREFIX_BYTES {
        return Ok(None);
    }
    let len = i32::from_be_bytes([src[0], src[1], src[2], src[3]]);
    if len < 0 || len as usize > max_frame_len {
        return Err(KraftletError::FrameTooLarge {
            len: i64::from(len),
            max: max_frame_len,
        });
    }
    let len = len as usize;
    if src.len() < LENGTH_PREFIX_BYTES + len {
        src.reserve((LENGTH_PREFIX_BYTES + len - src.len()).min(MAX_FRAME_RESERVE));
        return Ok(None);
    }
    src.advance(LENGTH_PREFIX_BYTES);
    Ok(Some(src.split_to(len)))
}

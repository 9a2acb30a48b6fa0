//! Core types shared across the broker.

use std::fmt;

/// Topic identifier: 16 raw bytes compared byte-for-byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uuid(pub [u8; 16]);

impl Uuid {
    pub const SIZE: usize = 16;

    /// The all-zero id written for topics that could not be resolved.
    pub const fn nil() -> Self {
        Self([0u8; 16])
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn is_nil(&self) -> bool {
        self.0 == [0u8; 16]
    }
}

impl From<[u8; 16]> for Uuid {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                f.write_str("-")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Request types this broker understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum ApiKey {
    Fetch = 1,
    ApiVersions = 18,
    DescribeTopicPartitions = 75,
}

impl ApiKey {
    pub fn code(self) -> i16 {
        self as i16
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(ApiKey::Fetch),
            18 => Some(ApiKey::ApiVersions),
            75 => Some(ApiKey::DescribeTopicPartitions),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ApiKey::Fetch => "Fetch",
            ApiKey::ApiVersions => "ApiVersions",
            ApiKey::DescribeTopicPartitions => "DescribeTopicPartitions",
        }
    }
}

/// Protocol-level error codes carried in response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum ErrorCode {
    None = 0,
    /// This server does not host this topic-partition.
    UnknownTopicOrPartition = 3,
    UnsupportedVersion = 35,
    /// This server does not host this topic id.
    UnknownTopicId = 100,
}

impl ErrorCode {
    pub fn code(self) -> i16 {
        self as i16
    }
}

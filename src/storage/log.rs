//! Partition log files on disk.

use super::record::{read_record_batches, RecordBatch};
use crate::error::Result;
use bytes::Bytes;
use std::path::{Path, PathBuf};

/// Only the first segment of each partition is ever read.
pub const FIRST_SEGMENT_FILE: &str = "00000000000000000000.log";

/// Root of the `<topic>-<partition>/` log directories.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogDirectory {
    root: PathBuf,
}

impl Default for LogDirectory {
    fn default() -> Self {
        Self::new("/tmp/kraft-combined-logs")
    }
}

impl LogDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<topic>-<partition>/00000000000000000000.log`
    pub fn segment_path(&self, topic: &str, partition: i32) -> PathBuf {
        self.root
            .join(format!("{}-{}", topic, partition))
            .join(FIRST_SEGMENT_FILE)
    }

    /// Read the whole segment and decode every batch it holds.
    ///
    /// Fails only if the file cannot be read; a truncated or corrupt tail just
    /// ends the batch list early.
    pub fn read_batches(&self, topic: &str, partition: i32) -> Result<Vec<RecordBatch>> {
        let path = self.segment_path(topic, partition);
        let mut data = Bytes::from(std::fs::read(&path)?);
        let batches = read_record_batches(&mut data);
        tracing::debug!(
            path = %path.display(),
            batches = batches.len(),
            "read partition log"
        );
        Ok(batches)
    }
}

//! Read-only access to on-disk partition logs.

mod log;
pub mod record;

pub use log::{LogDirectory, FIRST_SEGMENT_FILE};
pub use record::{read_record_batches, Record, RecordBatch};

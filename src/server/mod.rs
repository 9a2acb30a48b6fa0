//! TCP server for the Kafka wire protocol.

mod kafka_handler;

pub use kafka_handler::{run_kafka_server, run_kafka_server_on_listener};

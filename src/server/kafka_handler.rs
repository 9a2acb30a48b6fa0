//! TCP server that speaks the Kafka wire protocol.
//!
//! One task per connection. Each task reads one frame, answers it, writes the
//! response, and only then looks at the next frame.

use crate::broker::Broker;
use crate::error::{KraftletError, Result};
use crate::observability::observability;
use crate::protocol::{split_frame, RequestMessage};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn, Instrument};

/// Run the Kafka-protocol server on an existing listener (e.g. from bind("127.0.0.1:0")).
pub async fn run_kafka_server_on_listener(
    broker: Arc<Broker>,
    listener: TcpListener,
) -> Result<()> {
    let addr = listener.local_addr()?;
    info!(
        %addr,
        topics = broker.metadata().topic_count(),
        "kraftlet listening"
    );
    let limit = broker
        .config()
        .max_connections
        .map(|n| Arc::new(Semaphore::new(n.max(1))));
    loop {
        // With a connection bound, stop accepting until a slot frees up.
        let permit = match &limit {
            Some(sem) => match Arc::clone(sem).acquire_owned().await {
                Ok(p) => Some(p),
                Err(_) => return Ok(()),
            },
            None => None,
        };
        let (stream, peer) = match listener.accept().await {
            Ok(x) => x,
            Err(e) => {
                error!("accept error: {}", e);
                continue;
            }
        };
        let broker = Arc::clone(&broker);
        let span = tracing::info_span!("connection", %peer);
        tokio::spawn(
            async move {
                let _permit = permit;
                serve_connection(broker, stream, peer).await;
            }
            .instrument(span),
        );
    }
}

/// Run the Kafka-protocol server loop (binds to addr).
pub async fn run_kafka_server(broker: Arc<Broker>, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    run_kafka_server_on_listener(broker, listener).await
}

async fn serve_connection(broker: Arc<Broker>, stream: TcpStream, peer: SocketAddr) {
    observability().connection_opened();
    debug!("connection accepted");
    match handle_kafka_connection(&broker, stream).await {
        Ok(()) => debug!("connection closed by peer"),
        Err(e @ (KraftletError::Decode(_) | KraftletError::FrameTooLarge { .. })) => {
            observability().record_decode_error();
            warn!("dropping connection {}: {}", peer, e);
        }
        Err(e) => error!("kafka connection {} error: {}", peer, e),
    }
    observability().connection_closed();
}

async fn handle_kafka_connection(broker: &Broker, mut stream: TcpStream) -> Result<()> {
    let max_frame_len = broker.config().max_frame_len;
    let mut read_buf = BytesMut::with_capacity(4096);
    let mut write_buf = BytesMut::with_capacity(4096);
    loop {
        read_buf.reserve(4096);
        let n = stream.read_buf(&mut read_buf).await?;
        if n == 0 {
            if !read_buf.is_empty() {
                debug!(pending = read_buf.len(), "peer closed mid-frame");
            }
            return Ok(());
        }
        while let Some(frame) = split_frame(&mut read_buf, max_frame_len)? {
            let message = RequestMessage::decode_body(&mut frame.freeze())?;
            let api_key = message.request.api_key();
            debug!(
                api = api_key.name(),
                api_version = message.header.api_version,
                correlation_id = message.header.correlation_id,
                client_id = %message.header.client_id,
                "kafka request"
            );
            let started = Instant::now();
            let response = broker.handle(message);
            observability().record_request(api_key, started.elapsed());

            write_buf.clear();
            response.encode_frame(&mut write_buf);
            debug!(api = api_key.name(), len = write_buf.len(), "kafka response");
            stream.write_all(&write_buf).await?;
            stream.flush().await?;
        }
    }
}

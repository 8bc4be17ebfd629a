//! TCP transport speaking newline-delimited JSON envelopes.
//!
//! One envelope per line. Lines that fail to parse as an envelope are a
//! framing-level protocol violation: they are logged and skipped so one
//! bad frame never takes the session down.
//!
//! Reading goes through a `FramedRead` line codec rather than `read_line`:
//! the session polls `recv` inside a `tokio::select!`, so a partially
//! received frame must survive the future being dropped. The codec keeps
//! the partial bytes in its own buffer, making `recv` cancel-safe.

use std::io;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

use crate::domain::models::{Envelope, OutboundEvent};
use crate::domain::ports::{CoordinationTransport, TransportError};

/// JSON-lines-over-TCP connection to the coordination server.
pub struct TcpJsonTransport {
    addr: String,
    reader: Option<FramedRead<OwnedReadHalf, LinesCodec>>,
    writer: Option<OwnedWriteHalf>,
}

impl TcpJsonTransport {
    /// Create a transport for `addr` (`host:port`); does not connect yet.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            reader: None,
            writer: None,
        }
    }
}

#[async_trait]
impl CoordinationTransport for TcpJsonTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        let stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|err| TransportError::Connect(format!("{}: {err}", self.addr)))?;
        stream.set_nodelay(true)?;

        let (read_half, write_half) = stream.into_split();
        self.reader = Some(FramedRead::new(read_half, LinesCodec::new()));
        self.writer = Some(write_half);
        info!(addr = %self.addr, "connected to coordination server");
        Ok(())
    }

    async fn send(&mut self, event: &OutboundEvent) -> Result<(), TransportError> {
        let writer = self.writer.as_mut().ok_or(TransportError::NotConnected)?;

        let mut line = serde_json::to_string(event)
            .map_err(|err| TransportError::Encode(err.to_string()))?;
        line.push('\n');

        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Envelope>, TransportError> {
        let reader = self.reader.as_mut().ok_or(TransportError::NotConnected)?;

        loop {
            let line = match reader.next().await {
                None => return Ok(None),
                Some(Err(LinesCodecError::Io(err))) => return Err(TransportError::Io(err)),
                Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                    return Err(TransportError::Io(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "line length limit exceeded",
                    )))
                }
                Some(Ok(line)) => line,
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Envelope>(trimmed) {
                Ok(envelope) => {
                    debug!(event = %envelope.event, "received event");
                    return Ok(Some(envelope));
                }
                Err(err) => {
                    warn!(error = %err, "skipping unparseable frame");
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.reader = None;
        if let Some(mut writer) = self.writer.take() {
            writer.shutdown().await?;
        }
        Ok(())
    }
}

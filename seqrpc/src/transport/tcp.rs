//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! TCP transport.
//!
//! Messages are framed with [`PacketCodec`] over a split [`TcpStream`]. The
//! read half and the write half sit behind separate locks so a router can
//! receive and send at the same time.

use crate::codec::EncodeError;
use crate::message::{Message, Packet, PacketCodec, HEADER_SIZE};
use crate::observability::TransportMetrics;
use crate::transport::{Transport, TcpTransportConfig, TransportError, TransportMetadata};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// A [`Transport`] over a TCP connection.
///
/// Client side transports remember their [`TcpTransportConfig`] and can
/// [`recover`](Transport::recover) by reconnecting. Transports created from an
/// accepted connection cannot, since there is nothing to dial.
///
/// # Examples
///
/// ```rust,no_run
/// use seqrpc::transport::TcpTransport;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let listener = TcpTransport::bind("127.0.0.1:7400").await?;
/// let client = TcpTransport::connect("127.0.0.1:7400").await?;
/// let (server, peer) = TcpTransport::accept(&listener).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TcpTransport {
    metadata: TransportMetadata,
    config: Option<TcpTransportConfig>,
    codec: PacketCodec,
    reader: Mutex<Option<FramedRead<OwnedReadHalf, PacketCodec>>>,
    writer: Mutex<Option<FramedWrite<OwnedWriteHalf, PacketCodec>>>,
    closed: parking_lot::Mutex<CancellationToken>,
    metrics: TransportMetrics,
}

impl TcpTransport {
    /// Connects to `address` using the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ConnectionFailed`] once the default
    /// reconnection strategy gives up.
    pub async fn connect(address: impl Into<String>) -> Result<Self, TransportError> {
        Self::connect_with(TcpTransportConfig::new(address)).await
    }

    /// Connects according to `config`, retrying as its strategy allows.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ConnectionFailed`] once the strategy gives up.
    #[instrument(skip(config), fields(address = %config.address()))]
    pub async fn connect_with(config: TcpTransportConfig) -> Result<Self, TransportError> {
        let metrics = TransportMetrics::new();
        let stream = establish(&config, &metrics).await?;
        Self::assemble(stream, Some(config), metrics)
    }

    /// Wraps an already connected stream, such as one from
    /// [`TcpListener::accept`].
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] if the socket addresses cannot be read.
    pub fn from_stream(stream: TcpStream) -> Result<Self, TransportError> {
        Self::assemble(stream, None, TransportMetrics::new())
    }

    /// Binds a listener for incoming connections.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::BindFailed`] if the address cannot be bound.
    pub async fn bind(address: impl Into<String>) -> Result<TcpListener, TransportError> {
        let address = address.into();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| TransportError::BindFailed {
                address: address.clone(),
                source,
            })?;
        info!(%address, "TCP listener bound");
        Ok(listener)
    }

    /// Accepts one connection from `listener`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] if accepting fails.
    pub async fn accept(listener: &TcpListener) -> Result<(Self, SocketAddr), TransportError> {
        let (stream, peer_addr) = listener.accept().await?;
        info!(%peer_addr, "accepted TCP connection");
        Ok((Self::from_stream(stream)?, peer_addr))
    }

    fn assemble(
        stream: TcpStream,
        config: Option<TcpTransportConfig>,
        metrics: TransportMetrics,
    ) -> Result<Self, TransportError> {
        let codec = config
            .as_ref()
            .map_or_else(PacketCodec::new, |config| {
                PacketCodec::with_max_payload(config.max_payload())
            });
        let metadata = TransportMetadata::new("tcp")
            .with_local_addr(stream.local_addr()?)
            .with_peer_addr(stream.peer_addr()?);
        let (read, write) = stream.into_split();
        metrics.record_connection_opened();
        debug!(transport_id = %metadata.id, peer = ?metadata.peer_addr, "TCP transport ready");

        Ok(Self {
            metadata,
            config,
            codec,
            reader: Mutex::new(Some(FramedRead::new(read, codec))),
            writer: Mutex::new(Some(FramedWrite::new(write, codec))),
            closed: parking_lot::Mutex::new(CancellationToken::new()),
            metrics,
        })
    }

    /// Local address of the first connection.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.metadata.local_addr
    }

    /// Peer address of the first connection.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.metadata.peer_addr
    }

    /// Connection and traffic counters.
    pub fn metrics(&self) -> &TransportMetrics {
        &self.metrics
    }

    fn closed_token(&self) -> CancellationToken {
        self.closed.lock().clone()
    }
}

/// Dials `config.address()` until it answers or the strategy gives up.
async fn establish(
    config: &TcpTransportConfig,
    metrics: &TransportMetrics,
) -> Result<TcpStream, TransportError> {
    let strategy = config.reconnection_strategy();
    let mut failures = 0u32;
    loop {
        match TcpStream::connect(config.address()).await {
            Ok(stream) => {
                stream.set_nodelay(config.nodelay())?;
                strategy.on_connected();
                info!(address = config.address(), attempts = failures + 1, "TCP connected");
                return Ok(stream);
            }
            Err(source) => {
                let error = TransportError::ConnectionFailed {
                    address: config.address().to_string(),
                    source,
                };
                failures += 1;
                metrics.record_connection_error();
                strategy.on_disconnected(&error);
                if !strategy.should_reconnect(failures, &error).await {
                    warn!(
                        %error,
                        attempts = failures,
                        strategy = strategy.name(),
                        "giving up on TCP connect"
                    );
                    return Err(error);
                }
                let delay = strategy.next_delay(failures).await;
                debug!(%error, attempt = failures, ?delay, "TCP connect failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    fn metadata(&self) -> &TransportMetadata {
        &self.metadata
    }

    async fn send(&self, message: &Message) -> Result<(), TransportError> {
        let packet = message.to_packet()?;
        if packet.payload.len() > self.codec.max_payload() {
            return Err(EncodeError::TooLarge {
                what: "message body",
                len: packet.payload.len(),
            }
            .into());
        }
        let size = (HEADER_SIZE + packet.payload.len()) as u64;

        let closed = self.closed_token();
        let mut writer = tokio::select! {
            _ = closed.cancelled() => return Err(TransportError::Closed),
            guard = self.writer.lock() => guard,
        };
        let framed = writer.as_mut().ok_or(TransportError::NotConnected)?;
        let result = tokio::select! {
            _ = closed.cancelled() => return Err(TransportError::Closed),
            result = framed.send(packet) => result,
        };
        result.map_err(|source| {
            self.metrics.record_write_error();
            TransportError::WriteFailed { source }
        })?;
        self.metrics.record_bytes_sent(size);
        Ok(())
    }

    async fn recv(&self) -> Result<Message, TransportError> {
        let closed = self.closed_token();
        let mut reader = tokio::select! {
            _ = closed.cancelled() => return Err(TransportError::Closed),
            guard = self.reader.lock() => guard,
        };
        let framed = reader.as_mut().ok_or(TransportError::NotConnected)?;
        let next = tokio::select! {
            biased;
            _ = closed.cancelled() => return Err(TransportError::Closed),
            next = framed.next() => next,
        };
        match next {
            Some(Ok(packet)) => {
                self.metrics
                    .record_bytes_received((HEADER_SIZE + packet.payload.len()) as u64);
                Ok(Message::from_packet(&packet)?)
            }
            Some(Err(source)) => {
                self.metrics.record_read_error();
                Err(TransportError::ReadFailed { source })
            }
            None => Err(TransportError::connection_lost("peer closed the connection")),
        }
    }

    async fn shutdown(&self) {
        self.closed_token().cancel();
        let writer = self.writer.lock().await.take();
        let reader = self.reader.lock().await.take();
        if let Some(mut writer) = writer {
            if let Err(error) = SinkExt::<Packet>::close(&mut writer).await {
                debug!(transport_id = %self.metadata.id, %error, "error closing TCP write half");
            }
            self.metrics.record_connection_closed();
            info!(transport_id = %self.metadata.id, "TCP transport shut down");
        }
        drop(reader);
    }

    async fn recover(&self) -> bool {
        let Some(config) = &self.config else {
            warn!(
                transport_id = %self.metadata.id,
                "accepted TCP connection cannot be re-established"
            );
            return false;
        };
        self.shutdown().await;

        match establish(config, &self.metrics).await {
            Ok(stream) => {
                let (read, write) = stream.into_split();
                *self.reader.lock().await = Some(FramedRead::new(read, self.codec));
                *self.writer.lock().await = Some(FramedWrite::new(write, self.codec));
                *self.closed.lock() = CancellationToken::new();
                self.metrics.record_connection_opened();
                info!(transport_id = %self.metadata.id, "TCP transport recovered");
                true
            }
            Err(error) => {
                error!(transport_id = %self.metadata.id, %error, "TCP transport recovery failed");
                false
            }
        }
    }
}

/// UDP transport: encode, compress, chunk and send on one connected socket.
///
/// ```text
/// Message ──> JSON ──> gzip / zlib / none ──> 1 datagram  (len <= chunk_size)
///                                        └──> N chunks    (12-byte header each)
/// ```
///
/// One lock covers the whole send, so the chunks of concurrently written
/// messages never interleave on the wire and settings cannot change mid-send.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Arc;

use bytes::Bytes;
use gelf_types::Message;
use parking_lot::Mutex;

use crate::chunker;
use crate::compression::{CompressionOptions, Compressor};
use crate::error::{GelfError, Result};
use crate::logging::{DeliveryEvent, DeliveryLog, DeliveryLogger, TracingLogger};
use crate::protocol::{CHUNK_SIZE, ChunkHeader};

/// Per-transport settings, snapshotted at the start of every send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpSettings {
    pub compression: CompressionOptions,
    /// Maximum datagram size, header included.
    pub chunk_size: usize,
}

impl Default for UdpSettings {
    fn default() -> Self {
        Self {
            compression: CompressionOptions::default(),
            chunk_size: CHUNK_SIZE,
        }
    }
}

pub struct UdpTransport {
    socket: UdpSocket,
    settings: Mutex<UdpSettings>,
    logger: Arc<dyn DeliveryLogger>,
}

impl UdpTransport {
    /// Resolve `addr` (`host:port`) and connect a fresh socket to it. The
    /// socket is kept for the transport's lifetime and never reconnected.
    pub fn connect(addr: &str, settings: UdpSettings) -> Result<Self> {
        let target = resolve(addr)?;
        let socket = create_udp_socket(target).map_err(|source| GelfError::Connect {
            addr: addr.to_string(),
            source,
        })?;
        tracing::debug!(%target, "GELF UDP socket connected");

        Ok(Self {
            socket,
            settings: Mutex::new(settings),
            logger: Arc::new(TracingLogger),
        })
    }

    pub fn with_logger(mut self, logger: Arc<dyn DeliveryLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.socket.peer_addr()
    }

    pub fn settings(&self) -> UdpSettings {
        *self.settings.lock()
    }

    /// Takes effect for the next message; a send in progress keeps the
    /// settings it started with.
    pub fn set_compression(&self, compression: CompressionOptions) {
        self.settings.lock().compression = compression;
    }

    pub fn write_message(&self, message: &Message) -> Result<()> {
        // The logger runs after the lock is released so it may call back
        // into this transport.
        let sent = {
            let settings = self.settings.lock();
            self.send(message, *settings)
        };
        let (event, result) = match sent {
            Ok(event) => (event, Ok(())),
            Err(e) => (
                DeliveryEvent::Failed {
                    message: e.to_string(),
                },
                Err(e),
            ),
        };
        self.logger.log(DeliveryLog {
            transport: "udp",
            event,
        });
        result
    }

    /// Caller holds the settings lock.
    fn send(&self, message: &Message, settings: UdpSettings) -> Result<DeliveryEvent> {
        let compressor = Compressor::select(settings.compression)?;
        let json = message.to_json()?;
        let payload = Bytes::from(compressor.apply(&json)?);
        let bytes = payload.len();

        let datagrams = chunker::split(payload, settings.chunk_size)?;
        let total = datagrams.len();
        for (chunk, datagram) in datagrams.iter().enumerate() {
            let written = self
                .socket
                .send(datagram)
                .map_err(|source| GelfError::Transmission { chunk, total, source })?;
            check_written(written, datagram.len())?;
        }

        let event = match ChunkHeader::parse(&datagrams[0]) {
            Some(header) if total > 1 => DeliveryEvent::ChunksSent {
                message_id: header.message_id,
                chunks: total,
                bytes,
                compression: compressor.kind(),
            },
            _ => DeliveryEvent::DatagramSent {
                bytes,
                compression: compressor.kind(),
            },
        };
        Ok(event)
    }
}

/// A datagram is all or nothing; a partial write loses the message.
fn check_written(written: usize, expected: usize) -> Result<()> {
    if written != expected {
        return Err(GelfError::ShortWrite { written, expected });
    }
    Ok(())
}

fn resolve(addr: &str) -> Result<SocketAddr> {
    addr.to_socket_addrs()
        .map_err(|source| GelfError::Connect {
            addr: addr.to_string(),
            source,
        })?
        .next()
        .ok_or_else(|| GelfError::Configuration(format!("address {addr:?} did not resolve")))
}

/// Create a blocking UDP socket bound to an ephemeral port and connected to `target`.
fn create_udp_socket(target: SocketAddr) -> io::Result<UdpSocket> {
    use socket2::{Domain, Protocol, Socket, Type};

    let socket = Socket::new(Domain::for_address(target), Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_nonblocking(false)?;
    let local: SocketAddr = if target.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    socket.bind(&local.into())?;
    socket.connect(&target.into())?;

    Ok(socket.into())
}

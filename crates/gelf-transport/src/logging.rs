/// Delivery logging hooks.
///
/// Transports report what they put on the wire through a [`DeliveryLogger`].
/// The default forwards to `tracing`; tests and embedders can plug their own.

use std::fmt;

use crate::compression::CompressionType;

/// Structured log entry for one send.
#[derive(Debug, Clone)]
pub struct DeliveryLog {
    pub transport: &'static str,
    pub event: DeliveryEvent,
}

/// Delivery events that can be logged.
#[derive(Debug, Clone)]
pub enum DeliveryEvent {
    /// UDP: whole message in one datagram
    DatagramSent {
        bytes: usize,
        compression: CompressionType,
    },
    /// UDP: message split into framed chunks
    ChunksSent {
        message_id: [u8; 8],
        chunks: usize,
        bytes: usize,
        compression: CompressionType,
    },
    /// HTTP: body posted and response consumed
    Posted {
        status: u16,
        bytes: usize,
    },
    /// Send failed
    Failed {
        message: String,
    },
}

impl fmt::Display for DeliveryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DatagramSent { bytes, compression } => {
                write!(f, "datagram_sent bytes={} compression={}", bytes, compression)
            }
            Self::ChunksSent { message_id, chunks, bytes, compression } => {
                write!(
                    f,
                    "chunks_sent id={} chunks={} bytes={} compression={}",
                    hex::encode(message_id),
                    chunks,
                    bytes,
                    compression
                )
            }
            Self::Posted { status, bytes } => {
                write!(f, "posted status={} bytes={}", status, bytes)
            }
            Self::Failed { message } => {
                write!(f, "send_failed: {}", message)
            }
        }
    }
}

pub trait DeliveryLogger: Send + Sync {
    fn log(&self, entry: DeliveryLog);
}

/// Logger that uses the `tracing` crate.
pub struct TracingLogger;

impl DeliveryLogger for TracingLogger {
    fn log(&self, entry: DeliveryLog) {
        match &entry.event {
            DeliveryEvent::Failed { .. } => {
                tracing::warn!(transport = entry.transport, "{}", entry.event);
            }
            _ => {
                tracing::debug!(transport = entry.transport, "{}", entry.event);
            }
        }
    }
}

/// No-op logger that discards all log entries.
pub struct NullLogger;

impl DeliveryLogger for NullLogger {
    fn log(&self, _entry: DeliveryLog) {}
}

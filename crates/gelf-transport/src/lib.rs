/// GELF transports: ship log messages to Graylog-compatible collectors.
///
/// Provides:
/// - UDP delivery with gzip / zlib / no compression
/// - GELF chunking for payloads larger than one datagram (max 255 chunks)
/// - HTTP delivery of uncompressed JSON
/// - A `Writer` front end that picks the transport from the address and turns
///   plain text into messages
///
/// Everything is synchronous and best effort: no acknowledgments, no retries.

pub mod chunker;
pub mod compression;
pub mod config;
pub mod error;
pub mod hostname;
pub mod http;
pub mod logging;
pub mod protocol;
pub mod transport;
pub mod udp;
pub mod writer;

// Re-export key types for convenience.
pub use compression::{CompressionOptions, CompressionType, Compressor};
pub use config::WriterConfig;
pub use error::{GelfError, Result};
pub use gelf_types::{CodecError, Level, Message};
pub use http::HttpTransport;
pub use logging::{DeliveryEvent, DeliveryLog, DeliveryLogger, NullLogger, TracingLogger};
pub use protocol::{CHUNK_HEADER, CHUNK_SIZE, ChunkHeader, MAX_CHUNKS};
pub use transport::{Destination, Transport};
pub use udp::{UdpSettings, UdpTransport};
pub use writer::{SourceLocation, StreamWriter, Writer};

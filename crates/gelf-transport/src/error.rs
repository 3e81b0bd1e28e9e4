use std::io;

use gelf_types::CodecError;
use thiserror::Error;

use crate::protocol::MAX_CHUNKS;

/// Everything that can go wrong between a [`gelf_types::Message`] and the wire.
///
/// Nothing is retried: every variant is returned to the caller of the send
/// that produced it.
#[derive(Debug, Error)]
pub enum GelfError {
    /// Invalid writer settings (unknown compression type, bad level, chunk
    /// size too small, missing address). Raised before anything is sent.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("compression failed: {0}")]
    Compression(#[source] io::Error),

    #[error("message too large, would need {chunks} chunks (max {})", MAX_CHUNKS)]
    Oversize { chunks: usize },

    #[error("random source unavailable: {0}")]
    RandomSource(String),

    #[error("cannot connect UDP socket to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("write failed (chunk {chunk}/{total}): {source}")]
    Transmission {
        chunk: usize,
        total: usize,
        #[source]
        source: io::Error,
    },

    /// The socket accepted fewer bytes than the datagram holds. UDP cannot
    /// resume a datagram, so the message is lost.
    #[error("bad write ({written}/{expected})")]
    ShortWrite { written: usize, expected: usize },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The HTTP endpoint answered with a non-2xx status.
    #[error("GELF endpoint rejected message with status {status}")]
    Rejected { status: u16 },
}

impl GelfError {
    /// Socket-level failures: the transport should be rebuilt before retrying.
    pub fn is_transmission(&self) -> bool {
        matches!(self, Self::Transmission { .. } | Self::ShortWrite { .. })
    }
}

pub type Result<T> = std::result::Result<T, GelfError>;

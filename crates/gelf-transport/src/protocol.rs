/// GELF UDP chunk format.
///
/// ```text
/// [0..2]    Magic 0x1e 0x0f
/// [2..10]   Message ID (8 random bytes, shared by every chunk of a message)
/// [10]      Sequence index (0-based)
/// [11]      Total chunk count
/// [12..]    Compressed payload slice (up to chunk_size - 12 bytes)
/// ```
///
/// A message that fits in one datagram is sent without any header; receivers
/// tell the encoding apart by its leading bytes.

/// Default maximum datagram size. Stays below a 1500-byte path MTU once IP and
/// UDP headers are added.
pub const CHUNK_SIZE: usize = 1420;

/// Header size in bytes.
pub const CHUNK_HEADER: usize = 12;

/// Payload bytes per chunk at the default datagram size.
pub const CHUNK_DATA: usize = CHUNK_SIZE - CHUNK_HEADER;

/// The sequence and count fields are single bytes.
pub const MAX_CHUNKS: usize = 255;

pub const MAGIC_CHUNKED: [u8; 2] = [0x1e, 0x0f];
pub const MAGIC_GZIP: [u8; 2] = [0x1f, 0x8b];
pub const MAGIC_ZLIB: u8 = 0x78;

/// Parsed chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub message_id: [u8; 8],
    pub sequence: u8,
    pub total: u8,
}

impl ChunkHeader {
    /// Serialize into the first 12 bytes of `buf`.
    pub fn write_to(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= CHUNK_HEADER);
        buf[0..2].copy_from_slice(&MAGIC_CHUNKED);
        buf[2..10].copy_from_slice(&self.message_id);
        buf[10] = self.sequence;
        buf[11] = self.total;
    }

    /// Parse a header. Returns None if the buffer is too short or the magic
    /// doesn't match.
    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < CHUNK_HEADER || buf[0..2] != MAGIC_CHUNKED {
            return None;
        }
        let mut message_id = [0u8; 8];
        message_id.copy_from_slice(&buf[2..10]);
        Some(ChunkHeader {
            message_id,
            sequence: buf[10],
            total: buf[11],
        })
    }
}

/// Payload carried by a datagram that starts with a chunk header.
pub fn chunk_payload(datagram: &[u8]) -> &[u8] {
    &datagram[CHUNK_HEADER.min(datagram.len())..]
}

/// Payload encoding as announced by the first bytes of an unchunked datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Chunked,
    Gzip,
    Zlib,
    Plain,
}

pub fn detect_payload(datagram: &[u8]) -> PayloadKind {
    if datagram.starts_with(&MAGIC_CHUNKED) {
        PayloadKind::Chunked
    } else if datagram.starts_with(&MAGIC_GZIP) {
        PayloadKind::Gzip
    } else if datagram.first() == Some(&MAGIC_ZLIB) {
        PayloadKind::Zlib
    } else {
        PayloadKind::Plain
    }
}

/// Payload compression applied before a message is put on a UDP socket.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use flate2::Compression;
use flate2::write::{GzEncoder, ZlibEncoder};

use crate::error::{GelfError, Result};

/// Best speed, matching what GELF libraries usually default to.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 1;

/// Highest level accepted by deflate.
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompressionType {
    #[default]
    Gzip,
    Zlib,
    None,
}

impl CompressionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Zlib => "zlib",
            Self::None => "none",
        }
    }
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionType {
    type Err = GelfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gzip" => Ok(Self::Gzip),
            "zlib" => Ok(Self::Zlib),
            "none" => Ok(Self::None),
            other => Err(GelfError::Configuration(format!(
                "unknown compression type {other:?}"
            ))),
        }
    }
}

/// Numeric codes used by older GELF writers: 0 = gzip, 1 = zlib, 2 = none.
impl TryFrom<i32> for CompressionType {
    type Error = GelfError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::Gzip),
            1 => Ok(Self::Zlib),
            2 => Ok(Self::None),
            other => Err(GelfError::Configuration(format!(
                "unknown compression type {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionOptions {
    pub kind: CompressionType,
    /// Deflate level 0..=9. Ignored for [`CompressionType::None`].
    pub level: u32,
}

impl CompressionOptions {
    pub fn new(kind: CompressionType, level: u32) -> Self {
        Self { kind, level }
    }

    pub fn none() -> Self {
        Self::new(CompressionType::None, 0)
    }
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self::new(CompressionType::default(), DEFAULT_COMPRESSION_LEVEL)
    }
}

/// A configured encoder. Built per send from a settings snapshot.
#[derive(Debug, Clone, Copy)]
pub enum Compressor {
    Gzip(Compression),
    Zlib(Compression),
    None,
}

impl Compressor {
    pub fn select(options: CompressionOptions) -> Result<Self> {
        if options.kind == CompressionType::None {
            return Ok(Self::None);
        }
        if options.level > MAX_COMPRESSION_LEVEL {
            return Err(GelfError::Configuration(format!(
                "compression level {} out of range 0..={MAX_COMPRESSION_LEVEL}",
                options.level
            )));
        }
        let level = Compression::new(options.level);
        Ok(match options.kind {
            CompressionType::Gzip => Self::Gzip(level),
            CompressionType::Zlib => Self::Zlib(level),
            CompressionType::None => Self::None,
        })
    }

    pub fn kind(&self) -> CompressionType {
        match self {
            Self::Gzip(_) => CompressionType::Gzip,
            Self::Zlib(_) => CompressionType::Zlib,
            Self::None => CompressionType::None,
        }
    }

    /// Compress `data`. The encoder is finished before its buffer is handed
    /// back, so the output always carries the complete trailer.
    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Gzip(level) => {
                let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), *level);
                encoder.write_all(data).map_err(GelfError::Compression)?;
                encoder.finish().map_err(GelfError::Compression)
            }
            Self::Zlib(level) => {
                let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), *level);
                encoder.write_all(data).map_err(GelfError::Compression)?;
                encoder.finish().map_err(GelfError::Compression)
            }
            Self::None => Ok(data.to_vec()),
        }
    }
}

/// Front end used by applications: picks a transport from the destination
/// address and turns plain text into GELF messages.

use std::io;
use std::panic::Location;
use std::sync::Arc;

use gelf_types::{GELF_VERSION, Level, Message, now_timestamp};

use crate::compression::CompressionOptions;
use crate::config::WriterConfig;
use crate::error::{GelfError, Result};
use crate::http::HttpTransport;
use crate::logging::DeliveryLogger;
use crate::transport::{Destination, Transport};
use crate::udp::UdpTransport;

/// Source position attached to a text record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: i64,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: i64) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Location of the code calling this function.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), i64::from(location.line()))
    }
}

pub struct Writer {
    transport: Box<dyn Transport>,
    hostname: String,
    facility: String,
}

impl Writer {
    /// Writer with default settings for `addr`.
    pub fn new(addr: &str) -> Result<Self> {
        Self::from_config(WriterConfig::new(addr))
    }

    pub fn from_config(config: WriterConfig) -> Result<Self> {
        Self::build(config, None)
    }

    /// Like [`Writer::from_config`], reporting deliveries to `logger`.
    pub fn from_config_with_logger(
        config: WriterConfig,
        logger: Arc<dyn DeliveryLogger>,
    ) -> Result<Self> {
        Self::build(config, Some(logger))
    }

    fn build(config: WriterConfig, logger: Option<Arc<dyn DeliveryLogger>>) -> Result<Self> {
        config.validate()?;

        let transport: Box<dyn Transport> = match Destination::parse(&config.address) {
            Destination::Http(url) => {
                let mut http = HttpTransport::new(url, config.http_timeout)?;
                if let Some(logger) = logger {
                    http = http.with_logger(logger);
                }
                Box::new(http)
            }
            Destination::Udp(addr) => {
                let mut udp = UdpTransport::connect(&addr, config.udp_settings())?;
                if let Some(logger) = logger {
                    udp = udp.with_logger(logger);
                }
                Box::new(udp)
            }
        };

        Ok(Self::with_transport(transport, config.hostname, config.facility))
    }

    pub fn with_transport(
        transport: Box<dyn Transport>,
        hostname: impl Into<String>,
        facility: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            hostname: hostname.into(),
            facility: facility.into(),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn facility(&self) -> &str {
        &self.facility
    }

    /// Change compression for subsequent UDP sends. HTTP ignores it.
    pub fn set_compression(&self, options: CompressionOptions) {
        self.transport.set_compression(options);
    }

    /// Send a fully populated message as is.
    pub fn write_message(&self, message: &Message) -> Result<()> {
        self.transport.write_message(message)
    }

    /// Send `text` as an informational record. Returns the number of bytes
    /// kept after trimming surrounding whitespace.
    pub fn write_text(&self, text: &[u8], location: SourceLocation) -> Result<usize> {
        self.log(Level::Informational, text, location)
    }

    pub fn log(&self, level: Level, text: &[u8], location: SourceLocation) -> Result<usize> {
        let text = text.trim_ascii();
        let (short_message, full_message) = split_text(text);
        let message = Message {
            version: GELF_VERSION.to_string(),
            host: self.hostname.clone(),
            short_message,
            full_message,
            timestamp: now_timestamp(),
            level: level.into(),
            facility: self.facility.clone(),
            file: location.file,
            line: location.line,
            extra: Default::default(),
        };
        self.write_message(&message)?;
        Ok(text.len())
    }

    /// `io::Write` adapter that sends every `write` call as one record
    /// attributed to `location`.
    pub fn stream(&self, location: SourceLocation) -> StreamWriter<'_> {
        StreamWriter {
            writer: self,
            location,
        }
    }
}

/// Short message is the first line; the full message is the whole text, or
/// empty when there is only one line.
pub fn split_text(text: &[u8]) -> (String, String) {
    match text.iter().position(|&b| b == b'\n') {
        Some(i) if i > 0 => (
            String::from_utf8_lossy(&text[..i]).into_owned(),
            String::from_utf8_lossy(text).into_owned(),
        ),
        _ => (String::from_utf8_lossy(text).into_owned(), String::new()),
    }
}

pub struct StreamWriter<'w> {
    writer: &'w Writer,
    location: SourceLocation,
}

impl io::Write for StreamWriter<'_> {
    /// Reports the full input length as written even though surrounding
    /// whitespace is not sent.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer
            .write_text(buf, self.location.clone())
            .map_err(into_io_error)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn into_io_error(err: GelfError) -> io::Error {
    match err {
        GelfError::Transmission { source, .. } => source,
        other => io::Error::other(other),
    }
}

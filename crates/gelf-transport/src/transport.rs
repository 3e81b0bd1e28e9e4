use gelf_types::Message;

use crate::compression::CompressionOptions;
use crate::error::Result;
use crate::http::HttpTransport;
use crate::udp::UdpTransport;

/// Sends one message to a GELF endpoint.
pub trait Transport: Send + Sync {
    fn write_message(&self, message: &Message) -> Result<()>;

    /// Only meaningful for transports that compress; the default ignores it.
    fn set_compression(&self, _options: CompressionOptions) {}
}

impl Transport for UdpTransport {
    fn write_message(&self, message: &Message) -> Result<()> {
        UdpTransport::write_message(self, message)
    }

    fn set_compression(&self, options: CompressionOptions) {
        UdpTransport::set_compression(self, options);
    }
}

impl Transport for HttpTransport {
    fn write_message(&self, message: &Message) -> Result<()> {
        HttpTransport::write_message(self, message)
    }
}

/// Where a writer sends its messages, derived from the address string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Full URL, scheme included.
    Http(String),
    /// `host:port` with any scheme prefix removed.
    Udp(String),
}

impl Destination {
    /// `http://` and `https://` select HTTP. Anything else is UDP: a
    /// `udp://` (or other) prefix is stripped and the rest used as `host:port`.
    pub fn parse(addr: &str) -> Self {
        match addr.split_once("://") {
            Some(("http" | "https", _)) => Self::Http(addr.to_string()),
            Some(_) => {
                let host_port = addr.rsplit("://").next().unwrap_or(addr);
                Self::Udp(host_port.to_string())
            }
            None => Self::Udp(addr.to_string()),
        }
    }
}

/// Writer configuration: defaults, environment loading and validation.
///
/// | Variable                  | Default                    |
/// |---------------------------|----------------------------|
/// | `GELF_ADDRESS`            | required                   |
/// | `GELF_FACILITY`           | executable base name       |
/// | `GELF_HOSTNAME`           | `HOSTNAME` / system name   |
/// | `GELF_COMPRESSION`        | `gzip`                     |
/// | `GELF_COMPRESSION_LEVEL`  | `1`                        |
/// | `GELF_CHUNK_SIZE`         | `1420`                     |
/// | `GELF_HTTP_TIMEOUT_SECS`  | none                       |

use std::str::FromStr;
use std::time::Duration;

use crate::compression::{CompressionOptions, CompressionType, MAX_COMPRESSION_LEVEL};
use crate::error::{GelfError, Result};
use crate::hostname::{default_facility, get_hostname};
use crate::protocol::{CHUNK_HEADER, CHUNK_SIZE};
use crate::udp::UdpSettings;

#[derive(Debug, Clone, PartialEq)]
pub struct WriterConfig {
    /// `host:port` for UDP, or an `http(s)://` URL.
    pub address: String,
    pub hostname: String,
    pub facility: String,
    pub compression: CompressionOptions,
    pub chunk_size: usize,
    pub http_timeout: Option<Duration>,
}

impl WriterConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            hostname: get_hostname(),
            facility: default_facility(),
            compression: CompressionOptions::default(),
            chunk_size: CHUNK_SIZE,
            http_timeout: None,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value source, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let address = get("GELF_ADDRESS")
            .ok_or_else(|| GelfError::Configuration("GELF_ADDRESS is not set".into()))?;
        let mut config = Self::new(address);

        if let Some(hostname) = get("GELF_HOSTNAME") {
            config.hostname = hostname;
        }
        if let Some(facility) = get("GELF_FACILITY") {
            config.facility = facility;
        }
        if let Some(kind) = get("GELF_COMPRESSION") {
            config.compression.kind = kind.parse::<CompressionType>()?;
        }
        if let Some(level) = get("GELF_COMPRESSION_LEVEL") {
            config.compression.level = parse_number("GELF_COMPRESSION_LEVEL", &level)?;
        }
        if let Some(size) = get("GELF_CHUNK_SIZE") {
            config.chunk_size = parse_number("GELF_CHUNK_SIZE", &size)?;
        }
        if let Some(secs) = get("GELF_HTTP_TIMEOUT_SECS") {
            config.http_timeout = Some(Duration::from_secs(parse_number(
                "GELF_HTTP_TIMEOUT_SECS",
                &secs,
            )?));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(GelfError::Configuration("address is empty".into()));
        }
        if self.chunk_size <= CHUNK_HEADER {
            return Err(GelfError::Configuration(format!(
                "chunk size must be larger than {CHUNK_HEADER}, got {}",
                self.chunk_size
            )));
        }
        if self.compression.kind != CompressionType::None
            && self.compression.level > MAX_COMPRESSION_LEVEL
        {
            return Err(GelfError::Configuration(format!(
                "compression level must be 0..={MAX_COMPRESSION_LEVEL}, got {}",
                self.compression.level
            )));
        }
        Ok(())
    }

    pub fn udp_settings(&self) -> UdpSettings {
        UdpSettings {
            compression: self.compression,
            chunk_size: self.chunk_size,
        }
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| GelfError::Configuration(format!("{key} is not a valid number: {value:?}")))
}

/// GELF message entity and its JSON codec.
///
/// Encoding writes one flat object: the fixed fields in schema order followed
/// by the extension fields in insertion order. Decoding type-checks the fixed
/// fields and routes every other key into the extension map.

use chrono::Utc;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::error::CodecError;
use crate::level::Level;

/// Protocol version written into every message.
pub const GELF_VERSION: &str = "1.0";

/// Top-level keys owned by the fixed schema. Extension keys may not reuse them.
pub const RESERVED_FIELDS: [&str; 9] = [
    "version",
    "host",
    "short_message",
    "full_message",
    "timestamp",
    "level",
    "facility",
    "file",
    "line",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub version: String,
    pub host: String,
    pub short_message: String,
    pub full_message: String,
    /// Seconds since the unix epoch with a millisecond fraction.
    pub timestamp: f64,
    /// Syslog severity, 0..=7. Checked by both [`Message::to_json`] and
    /// [`Message::from_json`].
    pub level: i32,
    pub facility: String,
    pub file: String,
    pub line: i64,
    /// Additional top-level fields, by convention prefixed with `_`.
    pub extra: Map<String, Value>,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            version: GELF_VERSION.to_string(),
            host: String::new(),
            short_message: String::new(),
            full_message: String::new(),
            timestamp: 0.0,
            level: Level::default().into(),
            facility: String::new(),
            file: String::new(),
            line: 0,
            extra: Map::new(),
        }
    }
}

impl Message {
    /// New informational message stamped with the current time.
    pub fn new(host: impl Into<String>, short_message: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            short_message: short_message.into(),
            timestamp: now_timestamp(),
            ..Self::default()
        }
    }

    pub fn with_full_message(mut self, full_message: impl Into<String>) -> Self {
        self.full_message = full_message.into();
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_facility(mut self, facility: impl Into<String>) -> Self {
        self.facility = facility.into();
        self
    }

    pub fn with_location(mut self, file: impl Into<String>, line: i64) -> Self {
        self.file = file.into();
        self.line = line;
        self
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Add an extension field. Fails if `value` has no JSON representation
    /// (for example a map keyed by something other than strings).
    pub fn insert_extra<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) -> Result<(), CodecError> {
        let value = serde_json::to_value(value).map_err(CodecError::Encoding)?;
        self.extra.insert(key.into(), value);
        Ok(())
    }

    /// Encode as a single flat JSON object.
    pub fn to_json(&self) -> Result<Vec<u8>, CodecError> {
        if let Some(key) = self
            .extra
            .keys()
            .find(|key| RESERVED_FIELDS.contains(&key.as_str()))
        {
            return Err(CodecError::ReservedKey(key.clone()));
        }
        Level::try_from(self.level).map_err(CodecError::InvalidLevel)?;
        serde_json::to_vec(self).map_err(CodecError::Encoding)
    }

    /// Decode a JSON object. Keys outside the fixed schema land in `extra`
    /// whatever their prefix; absent fixed fields keep their defaults.
    pub fn from_json(data: &[u8]) -> Result<Self, CodecError> {
        let value: Value = serde_json::from_slice(data).map_err(CodecError::Decoding)?;
        let Value::Object(object) = value else {
            return Err(CodecError::NotAnObject);
        };

        let mut message = Self::default();
        for (key, value) in object {
            match key.as_str() {
                "version" => message.version = string_field("version", value)?,
                "host" => message.host = string_field("host", value)?,
                "short_message" => message.short_message = string_field("short_message", value)?,
                "full_message" => message.full_message = string_field("full_message", value)?,
                "facility" => message.facility = string_field("facility", value)?,
                "file" => message.file = string_field("file", value)?,
                "timestamp" => {
                    message.timestamp = value.as_f64().ok_or(CodecError::FieldType {
                        field: "timestamp",
                        expected: "a number",
                    })?;
                }
                "level" => {
                    let level = i32::try_from(integer_field("level", &value)?)
                        .ok()
                        .and_then(|raw| Level::try_from(raw).ok())
                        .ok_or(CodecError::FieldType {
                            field: "level",
                            expected: "a syslog level 0..=7",
                        })?;
                    message.level = level.into();
                }
                "line" => message.line = integer_field("line", &value)?,
                _ => {
                    message.extra.insert(key, value);
                }
            }
        }
        Ok(message)
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(RESERVED_FIELDS.len() + self.extra.len()))?;
        map.serialize_entry("version", &self.version)?;
        map.serialize_entry("host", &self.host)?;
        map.serialize_entry("short_message", &self.short_message)?;
        map.serialize_entry("full_message", &self.full_message)?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.serialize_entry("level", &self.level)?;
        map.serialize_entry("facility", &self.facility)?;
        map.serialize_entry("file", &self.file)?;
        map.serialize_entry("line", &self.line)?;
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Current time as GELF seconds, truncated to millisecond resolution.
pub fn now_timestamp() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

fn string_field(field: &'static str, value: Value) -> Result<String, CodecError> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(CodecError::FieldType {
            field,
            expected: "a string",
        }),
    }
}

fn integer_field(field: &'static str, value: &Value) -> Result<i64, CodecError> {
    value.as_i64().ok_or(CodecError::FieldType {
        field,
        expected: "an integer",
    })
}

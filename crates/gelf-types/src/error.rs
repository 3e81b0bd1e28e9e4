use thiserror::Error;

/// Failures while converting a [`crate::Message`] to or from JSON.
#[derive(Debug, Error)]
pub enum CodecError {
    /// An extension key shadows one of the fixed GELF fields.
    #[error("extension field {0:?} collides with a reserved GELF field")]
    ReservedKey(String),

    /// The severity is outside the syslog range 0..=7.
    #[error("level {0} is outside the syslog range 0..=7")]
    InvalidLevel(i32),

    /// A value could not be represented as JSON.
    #[error("failed to encode message: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The input was not valid JSON.
    #[error("failed to decode message: {0}")]
    Decoding(#[source] serde_json::Error),

    /// A fixed field was present with the wrong JSON type.
    #[error("field {field:?} must be {expected}")]
    FieldType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("GELF message must be a JSON object")]
    NotAnObject,
}

impl CodecError {
    /// True for errors raised while producing JSON.
    pub fn is_encoding(&self) -> bool {
        matches!(
            self,
            Self::ReservedKey(_) | Self::InvalidLevel(_) | Self::Encoding(_)
        )
    }

    /// True for errors raised while reading JSON.
    pub fn is_decoding(&self) -> bool {
        !self.is_encoding()
    }
}

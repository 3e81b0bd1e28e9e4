/// GELF message types shared by the transports and the `gelf-send` binary.
///
/// The message entity carries the fixed GELF 1.0 fields plus an ordered map of
/// extension fields, and knows how to encode itself to a single flat JSON
/// object and decode one back.

pub mod error;
pub mod level;
pub mod message;

pub use error::CodecError;
pub use level::Level;
pub use message::{GELF_VERSION, Message, RESERVED_FIELDS, now_timestamp};

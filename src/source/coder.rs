//! Output coders for records produced by sources.

use crate::error::{Result, SourceError};

/// Encodes and decodes records of type `T` to bytes
pub trait Coder<T>: Send + Sync {
    fn encode(&self, value: &T, out: &mut Vec<u8>) -> Result<()>;

    fn decode(&self, bytes: &[u8]) -> Result<T>;

    /// Human-readable name of this coder (for logging/debugging)
    fn name(&self) -> &'static str;
}

/// UTF-8 bytes of a string, without framing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringUtf8Coder;

impl Coder<String> for StringUtf8Coder {
    fn encode(&self, value: &String, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(value.as_bytes());
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            SourceError::file_error(
                "Record is not valid UTF-8",
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }

    fn name(&self) -> &'static str {
        "string-utf8"
    }
}

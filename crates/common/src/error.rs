//! Decode errors for JNVM program images.

use thiserror::Error;

/// Errors that occur while decoding a binary program image.
///
/// Individual instructions never fail to decode; only the surrounding
/// image structure can be malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The image does not start with the `JNVM` magic bytes.
    #[error("bad magic: expected \"JNVM\"")]
    BadMagic,

    /// The image ended before a declared section was complete.
    #[error("truncated image: needed {needed} more byte(s) at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    /// A string-table entry is not valid UTF-8.
    #[error("string {index} is not valid UTF-8")]
    InvalidUtf8 { index: usize },

    /// Bytes remain after the string table.
    #[error("{count} trailing byte(s) after string table")]
    TrailingBytes { count: usize },

    /// Raw instruction byte stream length is not a multiple of 8.
    #[error("invalid instruction stream length: {0} (must be multiple of 8)")]
    InvalidLength(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_bad_magic() {
        assert_eq!(
            DecodeError::BadMagic.to_string(),
            "bad magic: expected \"JNVM\""
        );
    }

    #[test]
    fn display_truncated() {
        assert_eq!(
            DecodeError::Truncated {
                offset: 12,
                needed: 4
            }
            .to_string(),
            "truncated image: needed 4 more byte(s) at offset 12"
        );
    }

    #[test]
    fn display_invalid_length() {
        assert_eq!(
            DecodeError::InvalidLength(7).to_string(),
            "invalid instruction stream length: 7 (must be multiple of 8)"
        );
    }
}

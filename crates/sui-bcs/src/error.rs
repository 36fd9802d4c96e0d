//! Error type shared by every codec in the crate.

use std::fmt;

/// Errors raised while validating, encoding or decoding BCS data.
///
/// Every variant carries enough context (schema name, offending value,
/// buffer position) to produce a message that points at the failing piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BcsError {
    /// A value was rejected by a schema validator before anything was written.
    Validation {
        /// Name of the schema that rejected the value
        type_name: String,
        /// Debug rendering of the rejected value
        value: String,
        /// Why the value was rejected
        reason: String,
    },

    /// The reader ran past the end of its buffer.
    UnexpectedEof {
        /// Bytes requested by the read
        needed: usize,
        /// Bytes left in the buffer
        remaining: usize,
    },

    /// An enum discriminant that does not name a declared variant.
    UnknownVariant {
        /// Name of the enum schema
        type_name: String,
        /// The discriminant that was read
        index: u64,
    },

    /// A boolean byte other than 0 or 1.
    InvalidBool(u8),

    /// A ULEB128 value that does not fit in 64 bits.
    UlebOverflow,

    /// The writer would grow past its configured maximum size.
    SizeLimitExceeded {
        /// Configured maximum buffer size
        max_size: usize,
        /// Size the write would have required
        requested: usize,
    },

    /// A length-prefixed string that is not valid UTF-8.
    InvalidUtf8 {
        /// Name of the string schema
        type_name: String,
    },

    /// Map entries whose encoded keys are not strictly increasing.
    UnorderedMapKeys {
        /// Name of the map schema
        type_name: String,
        /// Position of the offending entry
        entry: u64,
    },

    /// Textual input (hex, base64, base58) could not be decoded.
    Encoding {
        /// Which encoding failed
        encoding: &'static str,
        /// Decoder message
        message: String,
    },

    /// A value-level mapping (transform or dynamic value conversion) failed.
    Mapping {
        /// Name of the schema performing the mapping
        type_name: String,
        /// What went wrong
        message: String,
    },
}

impl BcsError {
    /// Build a validation error for `value` rejected by `type_name`.
    pub fn validation(
        type_name: impl Into<String>,
        value: impl fmt::Debug,
        reason: impl Into<String>,
    ) -> Self {
        BcsError::Validation {
            type_name: type_name.into(),
            value: format!("{:?}", value),
            reason: reason.into(),
        }
    }

    /// Build a mapping error raised by `type_name`.
    pub fn mapping(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        BcsError::Mapping {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for BcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BcsError::Validation {
                type_name,
                value,
                reason,
            } => write!(
                f,
                "Invalid {} value: {} ({})",
                type_name, value, reason
            ),
            BcsError::UnexpectedEof { needed, remaining } => write!(
                f,
                "Reached end of buffer: needed {} bytes, {} remaining",
                needed, remaining
            ),
            BcsError::UnknownVariant { type_name, index } => {
                write!(f, "Unknown value {} for enum {}", index, type_name)
            }
            BcsError::InvalidBool(byte) => write!(f, "Invalid bool byte: {}", byte),
            BcsError::UlebOverflow => write!(f, "ULEB128 value overflows u64"),
            BcsError::SizeLimitExceeded {
                max_size,
                requested,
            } => write!(
                f,
                "Attempting to serialize to BCS, but buffer does not have enough size. \
                 Allocated size: {}, requested: {}",
                max_size, requested
            ),
            BcsError::InvalidUtf8 { type_name } => {
                write!(f, "Invalid UTF-8 bytes for {}", type_name)
            }
            BcsError::UnorderedMapKeys { type_name, entry } => write!(
                f,
                "Key {} of {} is not greater than the key before it",
                entry, type_name
            ),
            BcsError::Encoding { encoding, message } => {
                write!(f, "Failed to decode {}: {}", encoding, message)
            }
            BcsError::Mapping { type_name, message } => {
                write!(f, "Failed to map {} value: {}", type_name, message)
            }
        }
    }
}

impl std::error::Error for BcsError {}

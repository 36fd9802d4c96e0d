//! Textual encodings for serialized bytes: hex, base64 and base58.

use base64::Engine;

use crate::error::BcsError;

/// Encode bytes as lowercase hex without a prefix.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode hex, with or without a `0x` prefix.
pub fn from_hex(hex_str: &str) -> Result<Vec<u8>, BcsError> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    // Odd-length input is padded on the left, as short addresses often are.
    let padded;
    let hex_str = if hex_str.len() % 2 == 1 {
        padded = format!("0{}", hex_str);
        padded.as_str()
    } else {
        hex_str
    };
    hex::decode(hex_str).map_err(|e| BcsError::Encoding {
        encoding: "hex",
        message: e.to_string(),
    })
}

/// Encode bytes with the standard base64 alphabet.
pub fn to_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decode standard base64, accepting input with or without padding.
pub fn from_base64(b64: &str) -> Result<Vec<u8>, BcsError> {
    base64::engine::general_purpose::STANDARD
        .decode(b64)
        .or_else(|_| base64::engine::general_purpose::STANDARD_NO_PAD.decode(b64))
        .map_err(|e| BcsError::Encoding {
            encoding: "base64",
            message: e.to_string(),
        })
}

/// Encode bytes as base58 (Bitcoin alphabet).
pub fn to_base58(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

/// Decode base58 (Bitcoin alphabet).
pub fn from_base58(b58: &str) -> Result<Vec<u8>, BcsError> {
    bs58::decode(b58).into_vec().map_err(|e| BcsError::Encoding {
        encoding: "base58",
        message: e.to_string(),
    })
}

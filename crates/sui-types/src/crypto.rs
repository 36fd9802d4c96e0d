//! Signature scheme flags and public-key address derivation.

use std::fmt;

use crate::address::SuiAddress;
use crate::hash::blake2b256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    Ed25519,
    Secp256k1,
    Secp256r1,
    MultiSig,
    ZkLogin,
    Passkey,
}

impl SignatureScheme {
    pub fn flag(self) -> u8 {
        match self {
            SignatureScheme::Ed25519 => 0x00,
            SignatureScheme::Secp256k1 => 0x01,
            SignatureScheme::Secp256r1 => 0x02,
            SignatureScheme::MultiSig => 0x03,
            SignatureScheme::ZkLogin => 0x05,
            SignatureScheme::Passkey => 0x06,
        }
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A public key tagged with its scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    pub scheme: SignatureScheme,
    pub bytes: Vec<u8>,
}

impl PublicKey {
    pub fn new(scheme: SignatureScheme, bytes: Vec<u8>) -> Self {
        Self { scheme, bytes }
    }

    /// `flag || key` as used in serialized signatures.
    pub fn to_sui_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.bytes.len());
        out.push(self.scheme.flag());
        out.extend_from_slice(&self.bytes);
        out
    }

    /// `BLAKE2b-256(flag || key)`.
    pub fn to_sui_address(&self) -> SuiAddress {
        SuiAddress::new(blake2b256([self.to_sui_bytes()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_derivation_includes_flag() {
        let key = vec![1u8; 32];
        let ed = PublicKey::new(SignatureScheme::Ed25519, key.clone());
        let k1 = PublicKey::new(SignatureScheme::Secp256k1, key.clone());
        assert_ne!(ed.to_sui_address(), k1.to_sui_address());

        let mut preimage = vec![0u8];
        preimage.extend_from_slice(&key);
        assert_eq!(ed.to_sui_address().as_bytes(), &blake2b256([preimage]));
    }
}

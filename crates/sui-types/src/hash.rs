//! BLAKE2b-256 hashing and the digests derived from it.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest as _};

use crate::digest::{Digest, TransactionDigest};
use crate::intent::{Intent, IntentMessage};

type Blake2b256 = Blake2b<U32>;

/// Type tag prepended to transaction bytes before hashing.
pub const TRANSACTION_DATA_TAG: &str = "TransactionData::";

/// BLAKE2b-256 over the concatenation of `parts`.
pub fn blake2b256<I, B>(parts: I) -> [u8; 32]
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part.as_ref());
    }
    hasher.finalize().into()
}

/// Content address of a serialized `TransactionData`.
pub fn transaction_digest(tx_bytes: &[u8]) -> TransactionDigest {
    Digest::new(blake2b256([TRANSACTION_DATA_TAG.as_bytes(), tx_bytes]))
}

/// Digest a signer signs: the intent prefix followed by the message bytes.
pub fn signing_digest(intent: Intent, message: &[u8]) -> [u8; 32] {
    blake2b256([IntentMessage::new(intent, message).to_bytes()])
}

//! Signing transaction bytes.

use async_trait::async_trait;
use ed25519_dalek::Signer as _;
use ed25519_dalek::SigningKey;
use sui_types::intent::Intent;
use sui_types::{signing_digest, transaction_digest, PublicKey, SignatureScheme, SuiAddress};

use crate::error::{Result, TransactionError};

/// Transaction bytes together with the signature that authorizes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// BCS `TransactionData`.
    pub bytes: Vec<u8>,
    /// Base64 of `flag || signature || public key`.
    pub signature: String,
    /// Base58 transaction digest.
    pub digest: String,
}

/// Something that can sign for an address.
#[async_trait]
pub trait Signer: Send + Sync {
    fn public_key(&self) -> PublicKey;

    /// Raw signature over a 32-byte intent digest.
    async fn sign_digest(&self, digest: &[u8; 32]) -> anyhow::Result<Vec<u8>>;

    fn to_sui_address(&self) -> SuiAddress {
        self.public_key().to_sui_address()
    }

    /// Sign `tx_bytes` under the transaction-data intent.
    async fn sign_transaction(&self, tx_bytes: &[u8]) -> Result<SignedTransaction> {
        let digest = signing_digest(Intent::sui_transaction(), tx_bytes);
        let signature = self
            .sign_digest(&digest)
            .await
            .map_err(|e| TransactionError::Signing(e.to_string()))?;
        let public_key = self.public_key();

        let mut serialized = Vec::with_capacity(1 + signature.len() + public_key.bytes.len());
        serialized.push(public_key.scheme.flag());
        serialized.extend_from_slice(&signature);
        serialized.extend_from_slice(&public_key.bytes);

        Ok(SignedTransaction {
            bytes: tx_bytes.to_vec(),
            signature: sui_bcs::to_base64(&serialized),
            digest: transaction_digest(tx_bytes).to_base58(),
        })
    }
}

/// An in-memory Ed25519 key.
pub struct Ed25519Keypair {
    key: SigningKey,
}

impl Ed25519Keypair {
    pub fn from_secret_key(secret: &[u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(secret),
        }
    }

    pub fn from_secret_slice(secret: &[u8]) -> Result<Self> {
        let secret: [u8; 32] = secret.try_into().map_err(|_| {
            TransactionError::Signing(format!(
                "Ed25519 secret key must be 32 bytes, got {}",
                secret.len()
            ))
        })?;
        Ok(Self::from_secret_key(&secret))
    }

    pub fn verifying_key(&self) -> ed25519_dalek::VerifyingKey {
        self.key.verifying_key()
    }
}

impl std::fmt::Debug for Ed25519Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Keypair")
            .field("address", &self.to_sui_address())
            .finish()
    }
}

#[async_trait]
impl Signer for Ed25519Keypair {
    fn public_key(&self) -> PublicKey {
        PublicKey::new(
            SignatureScheme::Ed25519,
            self.key.verifying_key().to_bytes().to_vec(),
        )
    }

    async fn sign_digest(&self, digest: &[u8; 32]) -> anyhow::Result<Vec<u8>> {
        Ok(self.key.sign(digest).to_bytes().to_vec())
    }
}

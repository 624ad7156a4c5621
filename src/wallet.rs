//! Wallet signing

use crate::{
    error::{Result, SigningError},
    transaction::{TransactionBlock, TransactionData},
    types::SuiAddress,
};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

/// Signature scheme flag for Ed25519
pub const ED25519_FLAG: u8 = 0x00;

/// Intent prefix for transaction data: scope, version, app id
pub const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

const SIGNATURE_LENGTH: usize = 1 + ed25519_dalek::SIGNATURE_LENGTH + ed25519_dalek::PUBLIC_KEY_LENGTH;

/// A transaction ready for submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    /// base64 of the encoded [`TransactionData`]
    pub transaction_block_bytes: String,
    /// base64 of `flag || signature || public key`
    pub signature: String,
}

/// Something that can sign transactions on behalf of an account
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Address of the signing account
    fn address(&self) -> SuiAddress;

    /// Sign `tx`, using this account as sender when the transaction has none
    async fn sign_transaction_block(&self, tx: &TransactionBlock) -> Result<SignedTransaction>;
}

/// Derive the account address of an Ed25519 public key
pub fn address_from_public_key(public_key: &VerifyingKey) -> SuiAddress {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&[ED25519_FLAG]);
    hasher.update(public_key.as_bytes());
    SuiAddress::from_bytes(*hasher.finalize().as_bytes())
}

fn intent_digest(tx_bytes: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&TRANSACTION_INTENT);
    hasher.update(tx_bytes);
    *hasher.finalize().as_bytes()
}

/// Check a serialized signature against transaction bytes. Returns the
/// address of the signer.
pub fn verify_signature(tx_bytes: &[u8], signature: &str) -> Result<SuiAddress> {
    let raw = general_purpose::STANDARD.decode(signature)?;
    if raw.len() != SIGNATURE_LENGTH || raw[0] != ED25519_FLAG {
        return Err(SigningError::MalformedSignature {
            reason: format!("expected {} bytes with Ed25519 flag", SIGNATURE_LENGTH),
        }
        .into());
    }

    let (sig_bytes, key_bytes) = raw[1..].split_at(ed25519_dalek::SIGNATURE_LENGTH);
    let sig = ed25519_dalek::Signature::from_slice(sig_bytes).map_err(|e| {
        SigningError::MalformedSignature {
            reason: e.to_string(),
        }
    })?;
    let key_bytes: [u8; ed25519_dalek::PUBLIC_KEY_LENGTH] =
        key_bytes.try_into().map_err(|_| SigningError::MalformedSignature {
            reason: "bad public key length".to_string(),
        })?;
    let public_key = VerifyingKey::from_bytes(&key_bytes).map_err(|e| {
        SigningError::MalformedSignature {
            reason: e.to_string(),
        }
    })?;

    public_key
        .verify(&intent_digest(tx_bytes), &sig)
        .map_err(|e| SigningError::MalformedSignature {
            reason: e.to_string(),
        })?;

    Ok(address_from_public_key(&public_key))
}

/// Local Ed25519 keypair wallet
#[derive(Debug, Clone)]
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    /// Generate a fresh random keypair
    pub fn generate() -> Self {
        let mut rng = rand::rngs::OsRng;
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    pub fn from_bytes(secret: &[u8; ed25519_dalek::SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(secret),
        }
    }

    /// Load from a hex-encoded 32-byte secret
    pub fn from_hex(secret_hex: &str) -> Result<Self> {
        let bytes = hex::decode(secret_hex.trim().trim_start_matches("0x")).map_err(|e| {
            SigningError::InvalidPrivateKey {
                reason: e.to_string(),
            }
        })?;
        let secret: [u8; ed25519_dalek::SECRET_KEY_LENGTH] =
            bytes.try_into().map_err(|_| SigningError::InvalidPrivateKey {
                reason: "expected 32 bytes".to_string(),
            })?;
        Ok(Self::from_bytes(&secret))
    }

    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Sign already-encoded transaction data
    pub fn sign_data(&self, data: &TransactionData) -> Result<SignedTransaction> {
        let tx_bytes = data.to_bytes()?;
        let sig = self.signing_key.sign(&intent_digest(&tx_bytes));

        let mut serialized = Vec::with_capacity(SIGNATURE_LENGTH);
        serialized.push(ED25519_FLAG);
        serialized.extend_from_slice(&sig.to_bytes());
        serialized.extend_from_slice(self.public_key().as_bytes());

        Ok(SignedTransaction {
            transaction_block_bytes: general_purpose::STANDARD.encode(&tx_bytes),
            signature: general_purpose::STANDARD.encode(&serialized),
        })
    }
}

#[async_trait]
impl WalletSigner for Ed25519Signer {
    fn address(&self) -> SuiAddress {
        address_from_public_key(&self.public_key())
    }

    async fn sign_transaction_block(&self, tx: &TransactionBlock) -> Result<SignedTransaction> {
        let mut tx = tx.clone();
        tx.set_sender_if_not_set(self.address());
        self.sign_data(&tx.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::kiosk::create_kiosk_and_share;

    #[test]
    fn test_signature_round_trip_recovers_address() -> Result<()> {
        let signer = Ed25519Signer::generate();
        let mut tx = TransactionBlock::new();
        tx.set_sender(signer.address());
        create_kiosk_and_share(&mut tx)?;

        let data = tx.build()?;
        let signed = signer.sign_data(&data)?;
        let bytes = general_purpose::STANDARD.decode(&signed.transaction_block_bytes)?;

        assert_eq!(verify_signature(&bytes, &signed.signature)?, signer.address());
        Ok(())
    }

    #[test]
    fn test_tampered_bytes_are_rejected() -> Result<()> {
        let signer = Ed25519Signer::generate();
        let mut tx = TransactionBlock::new();
        tx.set_sender(signer.address());
        let signed = signer.sign_data(&tx.build()?)?;

        let mut bytes = general_purpose::STANDARD.decode(&signed.transaction_block_bytes)?;
        bytes.push(0);
        assert!(verify_signature(&bytes, &signed.signature).is_err());
        Ok(())
    }

    #[test]
    fn test_hex_secret_round_trip() -> Result<()> {
        let signer = Ed25519Signer::generate();
        let restored = Ed25519Signer::from_hex(&signer.secret_hex())?;
        assert_eq!(restored.address(), signer.address());
        assert!(Ed25519Signer::from_hex("abcd").is_err());
        Ok(())
    }
}

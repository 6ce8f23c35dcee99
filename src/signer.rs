//! Transaction signing seam.
//!
//! The executor takes any [`Signer`]; callers that manage their own keys (a
//! keystore, a hardware signer behind a daemon) implement the trait. The
//! bundled [`Ed25519Signer`] covers the common case of a raw ed25519 key.

use anyhow::{anyhow, Result};
use base64::Engine;
use ed25519_dalek::{Signer as _, SigningKey};

/// Signature scheme flag for ed25519 on the wire.
const ED25519_FLAG: u8 = 0x00;

/// Produces wire signatures over canonical payload bytes.
pub trait Signer: Send + Sync {
    /// The account address the signature authenticates.
    fn address(&self) -> &str;

    /// Sign payload bytes, returning the base64 wire signature.
    fn sign(&self, tx_bytes: &[u8]) -> Result<String>;
}

/// Ed25519 signer producing the `flag ‖ signature ‖ public_key` wire layout.
pub struct Ed25519Signer {
    key: SigningKey,
    address: String,
}

impl Ed25519Signer {
    /// Build from a raw 32-byte secret key and the account address it
    /// controls. Address derivation is the keystore's concern, so it is
    /// passed in rather than recomputed here.
    pub fn new(secret_key: &[u8; 32], address: impl Into<String>) -> Self {
        Self {
            key: SigningKey::from_bytes(secret_key),
            address: address.into(),
        }
    }

    /// Build from a base64 key: either a raw 32-byte secret or the
    /// 33-byte flag-prefixed keystore form.
    pub fn from_base64(encoded: &str, address: impl Into<String>) -> Result<Self> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| anyhow!("invalid base64 key: {e}"))?;

        let key_slice = match bytes.len() {
            32 => &bytes[..],
            33 if bytes[0] == ED25519_FLAG => &bytes[1..],
            33 => return Err(anyhow!("unsupported key scheme flag {:#04x}", bytes[0])),
            n => return Err(anyhow!("expected a 32-byte key or 33-byte flagged key, got {n} bytes")),
        };
        let secret: [u8; 32] = key_slice
            .try_into()
            .map_err(|_| anyhow!("key is not 32 bytes"))?;

        Ok(Self::new(&secret, address))
    }

    /// The ed25519 public key for this signer.
    pub fn public_key(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }
}

impl Signer for Ed25519Signer {
    fn address(&self) -> &str {
        &self.address
    }

    fn sign(&self, tx_bytes: &[u8]) -> Result<String> {
        let signature = self.key.sign(tx_bytes);

        let mut wire = Vec::with_capacity(1 + 64 + 32);
        wire.push(ED25519_FLAG);
        wire.extend_from_slice(&signature.to_bytes());
        wire.extend_from_slice(&self.public_key());

        Ok(base64::engine::general_purpose::STANDARD.encode(wire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    fn signer() -> Ed25519Signer {
        Ed25519Signer::new(&[7u8; 32], "0x9")
    }

    #[test]
    fn test_sign_produces_flagged_wire_layout() {
        let signer = signer();
        let encoded = signer.sign(b"payload bytes").unwrap();

        let wire = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        assert_eq!(wire.len(), 1 + 64 + 32);
        assert_eq!(wire[0], ED25519_FLAG);
        assert_eq!(&wire[65..], signer.public_key());
    }

    #[test]
    fn test_signature_verifies() {
        let signer = signer();
        let message = b"payload bytes";
        let encoded = signer.sign(message).unwrap();
        let wire = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();

        let key = VerifyingKey::from_bytes(&signer.public_key()).unwrap();
        let signature = Signature::from_bytes(wire[1..65].try_into().unwrap());
        assert!(key.verify(message, &signature).is_ok());
    }

    #[test]
    fn test_signing_is_deterministic() {
        let signer = signer();
        assert_eq!(
            signer.sign(b"same bytes").unwrap(),
            signer.sign(b"same bytes").unwrap()
        );
        assert_ne!(
            signer.sign(b"one payload").unwrap(),
            signer.sign(b"another payload").unwrap()
        );
    }

    #[test]
    fn test_from_base64_accepts_raw_and_flagged_keys() {
        let raw = base64::engine::general_purpose::STANDARD.encode([7u8; 32]);
        let from_raw = Ed25519Signer::from_base64(&raw, "0x9").unwrap();

        let mut flagged = vec![ED25519_FLAG];
        flagged.extend_from_slice(&[7u8; 32]);
        let flagged = base64::engine::general_purpose::STANDARD.encode(flagged);
        let from_flagged = Ed25519Signer::from_base64(&flagged, "0x9").unwrap();

        assert_eq!(from_raw.public_key(), from_flagged.public_key());
    }

    #[test]
    fn test_from_base64_rejects_bad_input() {
        assert!(Ed25519Signer::from_base64("not-base64!", "0x9").is_err());

        let short = base64::engine::general_purpose::STANDARD.encode([1u8; 16]);
        assert!(Ed25519Signer::from_base64(&short, "0x9").is_err());

        let mut wrong_flag = vec![0x01u8];
        wrong_flag.extend_from_slice(&[1u8; 32]);
        let wrong_flag = base64::engine::general_purpose::STANDARD.encode(wrong_flag);
        assert!(Ed25519Signer::from_base64(&wrong_flag, "0x9").is_err());
    }
}

//! Cryptographic key and signature types for validator identity and signing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::EotsError;

/// A 32-byte x-only secp256k1 public key (BIP-340 encoding).
///
/// This is the internal identity of a validator. The 33-byte compressed
/// form appears only at the key-creation boundary and on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bip340PublicKey(pub [u8; 32]);

/// A 32-byte secp256k1 private key (secret scalar, big-endian).
///
/// This type intentionally does not implement `Debug`, `Serialize`, or
/// `Clone` to prevent accidental exposure. Key bytes are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(pub [u8; 32]);

/// A 64-byte BIP-340 Schnorr signature (`R_x ‖ s`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchnorrSignature(pub [u8; 64]);

/// A 32-byte EOTS signature: the revealed scalar `s = k + e·x mod n`,
/// big-endian.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EotsSignature(pub [u8; 32]);

/// An authenticated read of a stored key: the human name it was created
/// under plus the decrypted secret. Transient; never persisted in this form.
pub struct KeyRecord {
    pub name: String,
    pub secret: SecretKey,
}

impl Bip340PublicKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse from a 32-byte slice, rejecting any other length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EotsError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            EotsError::InvalidArgument(format!(
                "public key must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

impl std::fmt::Display for Bip340PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl SecretKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl EotsSignature {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, EotsError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            EotsError::InvalidArgument(format!(
                "EOTS signature must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

impl SchnorrSignature {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, EotsError> {
        let arr: [u8; 64] = bytes.try_into().map_err(|_| {
            EotsError::InvalidArgument(format!(
                "Schnorr signature must be 64 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

impl Serialize for SchnorrSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for SchnorrSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SigVisitor;

        impl<'de> serde::de::Visitor<'de> for SigVisitor {
            type Value = SchnorrSignature;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "64 bytes")
            }

            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                let arr: [u8; 64] = v
                    .try_into()
                    .map_err(|_| E::invalid_length(v.len(), &self))?;
                Ok(SchnorrSignature(arr))
            }

            fn visit_seq<A: serde::de::SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> Result<Self::Value, A::Error> {
                let mut arr = [0u8; 64];
                for (i, byte) in arr.iter_mut().enumerate() {
                    *byte = seq
                        .next_element()?
                        .ok_or_else(|| serde::de::Error::invalid_length(i, &self))?;
                }
                Ok(SchnorrSignature(arr))
            }
        }

        deserializer.deserialize_bytes(SigVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_key_from_slice_rejects_bad_length() {
        assert!(Bip340PublicKey::from_slice(&[0u8; 31]).is_err());
        assert!(Bip340PublicKey::from_slice(&[0u8; 33]).is_err());
        assert!(Bip340PublicKey::from_slice(&[7u8; 32]).is_ok());
    }

    #[test]
    fn public_key_display_is_hex() {
        let pk = Bip340PublicKey::new([0xAB; 32]);
        assert_eq!(pk.to_string(), "ab".repeat(32));
    }

    #[test]
    fn schnorr_signature_bincode_roundtrip() {
        let sig = SchnorrSignature([0x5A; 64]);
        let bytes = bincode::serialize(&sig).unwrap();
        let decoded: SchnorrSignature = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, sig);
    }

    #[test]
    fn eots_signature_bincode_roundtrip() {
        let sig = EotsSignature([0x11; 32]);
        let bytes = bincode::serialize(&sig).unwrap();
        let decoded: EotsSignature = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, sig);
    }

    #[test]
    fn schnorr_signature_rejects_truncated() {
        let sig = SchnorrSignature([0x5A; 64]);
        let bytes = bincode::serialize(&sig).unwrap();
        let result = bincode::deserialize::<SchnorrSignature>(&bytes[..bytes.len() - 8]);
        assert!(result.is_err());
    }
}

//! BIP-340 Schnorr signing and verification.

use k256::schnorr::{Signature, SigningKey, VerifyingKey};
use rand::{CryptoRng, RngCore};

use eots_types::{Bip340PublicKey, EotsError, SchnorrSignature, SecretKey};

/// Sign `msg` with a standard BIP-340 Schnorr signature.
///
/// The nonce is derived per BIP-340 from the key, the message, and 32
/// bytes of fresh auxiliary randomness.
pub fn schnorr_sign<R: RngCore + CryptoRng>(
    sk: &SecretKey,
    msg: &[u8],
    rng: &mut R,
) -> Result<SchnorrSignature, EotsError> {
    let mut aux = [0u8; 32];
    rng.fill_bytes(&mut aux);
    sign_with_aux(sk, msg, &aux)
}

fn sign_with_aux(sk: &SecretKey, msg: &[u8], aux: &[u8; 32]) -> Result<SchnorrSignature, EotsError> {
    let signing_key = SigningKey::from_bytes(sk.as_bytes())
        .map_err(|_| EotsError::InvalidArgument("secret key is zero or out of range".into()))?;
    let sig = signing_key
        .sign_raw(msg, aux)
        .map_err(|e| EotsError::InvalidArgument(format!("schnorr signing failed: {e}")))?;
    let mut out = [0u8; 64];
    out.copy_from_slice(sig.to_bytes().as_ref());
    Ok(SchnorrSignature(out))
}

/// Verify a BIP-340 signature. Returns `false` for malformed keys or
/// signatures rather than erroring.
pub fn schnorr_verify(pk: &Bip340PublicKey, msg: &[u8], sig: &SchnorrSignature) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(pk.as_bytes()) else {
        return false;
    };
    let Ok(parsed) = Signature::try_from(&sig.0[..]) else {
        return false;
    };
    verifying_key.verify_raw(msg, &parsed).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bip340::xonly_public_key;
    use rand::rngs::OsRng;

    #[test]
    fn sign_and_verify() {
        let mut sk_bytes = [0u8; 32];
        sk_bytes[31] = 42;
        let sk = SecretKey(sk_bytes);
        let pk = xonly_public_key(sk.as_bytes()).unwrap();

        let sig = schnorr_sign(&sk, b"finality provider heartbeat", &mut OsRng).unwrap();
        assert!(schnorr_verify(&pk, b"finality provider heartbeat", &sig));
        assert!(!schnorr_verify(&pk, b"tampered message", &sig));
    }

    #[test]
    fn wrong_key_fails() {
        let sk1 = SecretKey([1u8; 32]);
        let mut sk2_bytes = [1u8; 32];
        sk2_bytes[0] = 2;
        let pk2 = xonly_public_key(&sk2_bytes).unwrap();

        let sig = schnorr_sign(&sk1, b"msg", &mut OsRng).unwrap();
        assert!(!schnorr_verify(&pk2, b"msg", &sig));
    }

    #[test]
    fn zero_key_rejected() {
        assert!(schnorr_sign(&SecretKey([0u8; 32]), b"msg", &mut OsRng).is_err());
    }

    #[test]
    fn malformed_signature_rejected() {
        let sk = SecretKey([3u8; 32]);
        let pk = xonly_public_key(sk.as_bytes()).unwrap();
        assert!(!schnorr_verify(&pk, b"msg", &SchnorrSignature([0xFF; 64])));
    }

    #[test]
    fn bip340_reference_vector_0() {
        // Test vector 0 from the BIP-340 reference suite: sk = 3, zeroed
        // aux randomness, all-zero 32-byte message.
        let mut sk_bytes = [0u8; 32];
        sk_bytes[31] = 3;
        let sk = SecretKey(sk_bytes);

        let pk = xonly_public_key(sk.as_bytes()).unwrap();
        assert_eq!(
            hex::encode(pk.as_bytes()).to_uppercase(),
            "F9308A019258C31049344F85F89D5229B531C845836F99B08601F113BCE036F9"
        );

        let msg = [0u8; 32];
        let sig = sign_with_aux(&sk, &msg, &[0u8; 32]).unwrap();
        assert_eq!(
            hex::encode(sig.as_bytes()).to_uppercase(),
            "E907831F80848D1069A5371B402410364BDF1C5F8307B0084C55F1CE2DDA8215\
             25F66A4A85EA8B71E482A74F382D2CE5EBEEE8FDB2172F477DF4900D310536C0"
        );
        assert!(schnorr_verify(&pk, &msg, &sig));
    }
}

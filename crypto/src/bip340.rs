//! BIP-340 encodings and helpers over secp256k1.
//!
//! Everything here deals in the canonical 32-byte big-endian forms: scalars
//! mod the group order `n`, and x-only field elements whose implied point is
//! the even-y lift.

use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::point::AffineCoordinates;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::{AffinePoint, ProjectivePoint, Scalar, U256};
use sha2::{Digest, Sha256};

use eots_types::{Bip340PublicKey, EotsError};

/// Tag for the BIP-340 challenge hash.
pub(crate) const CHALLENGE_TAG: &[u8] = b"BIP0340/challenge";

/// Compute `SHA256(SHA256(tag) ‖ SHA256(tag) ‖ parts...)` per BIP-340.
pub fn tagged_hash(tag: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let tag_hash = Sha256::digest(tag);
    let mut hasher = Sha256::new();
    hasher.update(tag_hash);
    hasher.update(tag_hash);
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// The BIP-340 challenge scalar `e = H_tag(R_x ‖ P_x ‖ msg) mod n`.
pub(crate) fn challenge(r_x: &[u8; 32], p_x: &[u8; 32], msg: &[u8]) -> Scalar {
    let digest = tagged_hash(CHALLENGE_TAG, &[r_x, p_x, msg]);
    Scalar::reduce(U256::from_be_slice(&digest))
}

/// Parse a canonical nonzero scalar from 32 big-endian bytes.
pub(crate) fn nonzero_scalar(bytes: &[u8; 32], what: &str) -> Result<Scalar, EotsError> {
    let scalar = Option::<Scalar>::from(Scalar::from_repr((*bytes).into()))
        .ok_or_else(|| EotsError::InvalidArgument(format!("{what} is not a canonical scalar")))?;
    if scalar == Scalar::ZERO {
        return Err(EotsError::InvalidArgument(format!("{what} is zero")));
    }
    Ok(scalar)
}

/// The x coordinate of an affine point as 32 big-endian bytes.
pub(crate) fn point_x(point: &AffinePoint) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(point.x().as_slice());
    out
}

pub(crate) fn has_odd_y(point: &AffinePoint) -> bool {
    point.y_is_odd().into()
}

/// Decode an x-only key into its even-y point.
pub(crate) fn lift_x(x: &[u8; 32]) -> Result<ProjectivePoint, EotsError> {
    let mut sec1 = [0u8; 33];
    sec1[0] = 0x02;
    sec1[1..].copy_from_slice(x);
    let pk = k256::PublicKey::from_sec1_bytes(&sec1)
        .map_err(|_| EotsError::InvalidArgument("not a valid x-only public key".into()))?;
    Ok(pk.to_projective())
}

/// The 33-byte compressed SEC1 public key for a secret scalar.
pub fn compressed_public_key(sk_bytes: &[u8; 32]) -> Result<[u8; 33], EotsError> {
    let sk = nonzero_scalar(sk_bytes, "secret key")?;
    let point = (ProjectivePoint::GENERATOR * sk).to_affine();
    let encoded = point.to_encoded_point(true);
    let mut out = [0u8; 33];
    out.copy_from_slice(encoded.as_bytes());
    Ok(out)
}

/// The 32-byte x-only public key for a secret scalar.
pub fn xonly_public_key(sk_bytes: &[u8; 32]) -> Result<Bip340PublicKey, EotsError> {
    let sk = nonzero_scalar(sk_bytes, "secret key")?;
    let point = (ProjectivePoint::GENERATOR * sk).to_affine();
    Ok(Bip340PublicKey::new(point_x(&point)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_hash_is_deterministic_and_tag_sensitive() {
        let h1 = tagged_hash(b"BIP0340/challenge", &[b"data"]);
        let h2 = tagged_hash(b"BIP0340/challenge", &[b"data"]);
        let h3 = tagged_hash(b"BIP0340/aux", &[b"data"]);
        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
    }

    #[test]
    fn tagged_hash_parts_equivalent_to_concatenation() {
        let joined = tagged_hash(b"t", &[b"helloworld"]);
        let split = tagged_hash(b"t", &[b"hello", b"world"]);
        assert_eq!(joined, split);
    }

    #[test]
    fn zero_scalar_rejected() {
        let err = nonzero_scalar(&[0u8; 32], "secret key").unwrap_err();
        assert!(matches!(err, EotsError::InvalidArgument(_)));
    }

    #[test]
    fn non_canonical_scalar_rejected() {
        // The group order n itself is not a canonical scalar encoding.
        let n: [u8; 32] = [
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
            0xFF, 0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C,
            0xD0, 0x36, 0x41, 0x41,
        ];
        assert!(nonzero_scalar(&n, "scalar").is_err());
    }

    #[test]
    fn xonly_key_matches_compressed_x_coordinate() {
        let mut sk = [0u8; 32];
        sk[31] = 7;
        let compressed = compressed_public_key(&sk).unwrap();
        let xonly = xonly_public_key(&sk).unwrap();
        assert!(compressed[0] == 0x02 || compressed[0] == 0x03);
        assert_eq!(&compressed[1..], xonly.as_bytes());
    }

    #[test]
    fn lift_x_roundtrips_generator() {
        let g = ProjectivePoint::GENERATOR.to_affine();
        let x = point_x(&g);
        let lifted = lift_x(&x).unwrap().to_affine();
        assert_eq!(point_x(&lifted), x);
        assert!(!has_odd_y(&lifted));
    }

    #[test]
    fn lift_x_rejects_out_of_range_x() {
        // The field prime p is not a canonical x coordinate.
        let p: [u8; 32] = [
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
            0xFF, 0xFF, 0xFC, 0x2F,
        ];
        assert!(lift_x(&p).is_err());
    }
}

//! Extractable one-time signatures over pre-committed nonces.
//!
//! An EOTS signature is `s = k + e·d mod n` where `k` is a secret nonce
//! whose public commitment `R_x` was published ahead of time and
//! `e = H_tag(R_x ‖ P_x ‖ msg)` is the BIP-340 challenge. Signing two
//! distinct messages with the same nonce yields two linear equations in
//! `(k, d)`, so any observer can solve for the secret key. That slashing
//! property is what [`extract_secret_key`] implements.

use k256::elliptic_curve::{Field, Group, PrimeField};
use k256::{NonZeroScalar, ProjectivePoint, Scalar};
use rand::{CryptoRng, RngCore};

use eots_types::{
    Bip340PublicKey, EotsError, EotsSignature, PublicRandomness, RandomnessPair, SecretKey,
    SecretRandomness,
};

use crate::bip340::{challenge, has_odd_y, lift_x, nonzero_scalar, point_x};

/// Draw a fresh randomness pair from a cryptographically secure source.
///
/// Samples `k` uniformly in `[1, n-1]`, computes `R = k·G`, and negates `k`
/// when `R` has an odd y coordinate so the stored secret always matches the
/// even-y lift of the published x-only commitment. The tie-break must agree
/// with BIP-340 exactly or the resulting signatures will not verify.
pub fn rand_gen<R: RngCore + CryptoRng>(rng: &mut R) -> RandomnessPair {
    let mut k = *NonZeroScalar::random(rng);
    let point = (ProjectivePoint::GENERATOR * k).to_affine();
    if has_odd_y(&point) {
        k = -k;
    }
    let mut secret = [0u8; 32];
    secret.copy_from_slice(&k.to_bytes());
    RandomnessPair::new(secret, point_x(&point))
}

/// Produce the EOTS scalar `s = k + e·d mod n` for `msg`.
///
/// Both the key and the nonce are conditioned to their even-y forms before
/// use. Fails on a zero or non-canonical key or nonce; never draws a
/// substitute nonce.
pub fn eots_sign(
    sk: &SecretKey,
    secret_rand: &SecretRandomness,
    msg: &[u8],
) -> Result<EotsSignature, EotsError> {
    let mut d = nonzero_scalar(sk.as_bytes(), "secret key")?;
    let mut k = nonzero_scalar(secret_rand.as_bytes(), "secret nonce")?;

    let pub_point = (ProjectivePoint::GENERATOR * d).to_affine();
    if has_odd_y(&pub_point) {
        d = -d;
    }
    let nonce_point = (ProjectivePoint::GENERATOR * k).to_affine();
    if has_odd_y(&nonce_point) {
        k = -k;
    }

    let e = challenge(&point_x(&nonce_point), &point_x(&pub_point), msg);
    let s = k + e * d;

    let mut out = [0u8; 32];
    out.copy_from_slice(&s.to_bytes());
    Ok(EotsSignature(out))
}

/// Verify an EOTS scalar against a public key and its committed nonce.
///
/// Checks that `s·G − e·P` equals the even-y lift of the committed `R_x`.
pub fn eots_verify(
    pk: &Bip340PublicKey,
    pub_rand: &PublicRandomness,
    msg: &[u8],
    sig: &EotsSignature,
) -> Result<bool, EotsError> {
    let pub_point = lift_x(pk.as_bytes())?;
    let s = Option::<Scalar>::from(Scalar::from_repr((*sig.as_bytes()).into())).ok_or_else(
        || EotsError::InvalidArgument("signature is not a canonical scalar".into()),
    )?;

    let e = challenge(pub_rand.as_bytes(), pk.as_bytes(), msg);
    let recovered = ProjectivePoint::GENERATOR * s - pub_point * e;
    if bool::from(recovered.is_identity()) {
        return Ok(false);
    }
    let affine = recovered.to_affine();
    Ok(!has_odd_y(&affine) && point_x(&affine) == *pub_rand.as_bytes())
}

/// Recover the secret key from two EOTS signatures that reused one nonce.
///
/// Given `s1 = k + e1·d` and `s2 = k + e2·d`, returns
/// `d = (s1 − s2)·(e1 − e2)^{-1} mod n`, the even-y conditioned secret key.
/// Fails when the two messages produce the same challenge or when the
/// recovered key does not match `pk`.
pub fn extract_secret_key(
    pk: &Bip340PublicKey,
    pub_rand: &PublicRandomness,
    msg1: &[u8],
    sig1: &EotsSignature,
    msg2: &[u8],
    sig2: &EotsSignature,
) -> Result<SecretKey, EotsError> {
    let s1 = nonzero_scalar(sig1.as_bytes(), "first signature")?;
    let s2 = nonzero_scalar(sig2.as_bytes(), "second signature")?;

    let e1 = challenge(pub_rand.as_bytes(), pk.as_bytes(), msg1);
    let e2 = challenge(pub_rand.as_bytes(), pk.as_bytes(), msg2);
    let denom = e1 - e2;
    if denom == Scalar::ZERO {
        return Err(EotsError::InvalidArgument(
            "messages produce identical challenges".into(),
        ));
    }
    let inv = Option::<Scalar>::from(denom.invert())
        .ok_or_else(|| EotsError::InvalidArgument("challenge difference not invertible".into()))?;
    let d = (s1 - s2) * inv;

    let point = (ProjectivePoint::GENERATOR * d).to_affine();
    if point_x(&point) != *pk.as_bytes() {
        return Err(EotsError::InvalidArgument(
            "signatures do not belong to the given key".into(),
        ));
    }

    let mut out = [0u8; 32];
    out.copy_from_slice(&d.to_bytes());
    Ok(SecretKey(out))
}

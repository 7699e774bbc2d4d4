// RustCrypto's pure-Rust secp256k1.
use k256::{
    ecdsa::{
        signature::hazmat::{PrehashSigner, PrehashVerifier},
        RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey,
    },
    elliptic_curve::{
        group::Group,
        sec1::{FromEncodedPoint, ToEncodedPoint},
        Field, PrimeField,
    },
    AffinePoint, EncodedPoint, ProjectivePoint, Scalar,
};

use crate::{curve::model::CurveBackend, CryptoFormatError};

static BACKEND: RustSecpBackend = RustSecpBackend;

/// The software fallback backend: the pure-Rust k256 implementation.
pub struct RustSecpBackend;

impl RustSecpBackend {
    /// The process-wide instance.
    pub fn static_ref() -> &'static Self {
        &BACKEND
    }
}

fn scalar(bytes: &[u8; 32]) -> Result<Scalar, CryptoFormatError> {
    Option::<Scalar>::from(Scalar::from_repr((*bytes).into()))
        .ok_or(CryptoFormatError::InvalidScalar)
}

fn nonzero_scalar(bytes: &[u8; 32]) -> Result<Scalar, CryptoFormatError> {
    let s = scalar(bytes)?;
    if bool::from(s.is_zero()) {
        return Err(CryptoFormatError::InvalidScalar);
    }
    Ok(s)
}

fn point(bytes: &[u8]) -> Result<AffinePoint, CryptoFormatError> {
    let encoded = EncodedPoint::from_bytes(bytes).map_err(|_| CryptoFormatError::InvalidPoint)?;
    if encoded.is_identity() {
        return Err(CryptoFormatError::InvalidPoint);
    }
    Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
        .ok_or(CryptoFormatError::InvalidPoint)
}

fn serialize_point(point: &ProjectivePoint) -> Result<[u8; 33], CryptoFormatError> {
    if bool::from(point.is_identity()) {
        return Err(CryptoFormatError::InvalidPoint);
    }
    let mut buf = [0u8; 33];
    buf.copy_from_slice(point.to_affine().to_encoded_point(true).as_bytes());
    Ok(buf)
}

/// Re-encode any valid SEC1 point in compressed form.
pub(crate) fn compress_point(bytes: &[u8]) -> Result<[u8; 33], CryptoFormatError> {
    let mut buf = [0u8; 33];
    buf.copy_from_slice(point(bytes)?.to_encoded_point(true).as_bytes());
    Ok(buf)
}

/// Expand a compressed SEC1 point to its uncompressed form.
pub(crate) fn uncompress_point(bytes: &[u8; 33]) -> Result<[u8; 65], CryptoFormatError> {
    let mut buf = [0u8; 65];
    buf.copy_from_slice(point(bytes)?.to_encoded_point(false).as_bytes());
    Ok(buf)
}

impl std::fmt::Debug for RustSecpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CurveBackend: pure-Rust k256")
    }
}

impl CurveBackend for RustSecpBackend {
    fn derive_pubkey(&self, scalar_bytes: &[u8; 32]) -> Result<[u8; 33], CryptoFormatError> {
        let s = nonzero_scalar(scalar_bytes)?;
        serialize_point(&(ProjectivePoint::GENERATOR * s))
    }

    fn tweak_privkey(
        &self,
        scalar_bytes: &[u8; 32],
        tweak: &[u8; 32],
    ) -> Result<[u8; 32], CryptoFormatError> {
        let sum = nonzero_scalar(scalar_bytes)? + scalar(tweak)?;
        if bool::from(sum.is_zero()) {
            return Err(CryptoFormatError::InvalidScalar);
        }
        Ok(sum.to_bytes().into())
    }

    fn tweak_pubkey(
        &self,
        point_bytes: &[u8; 33],
        tweak: &[u8; 32],
    ) -> Result<[u8; 33], CryptoFormatError> {
        let p = ProjectivePoint::from(point(point_bytes)?);
        let tweaked = p + ProjectivePoint::GENERATOR * scalar(tweak)?;
        serialize_point(&tweaked)
    }

    fn negate_scalar(&self, scalar_bytes: &[u8; 32]) -> Result<[u8; 32], CryptoFormatError> {
        Ok((-nonzero_scalar(scalar_bytes)?).to_bytes().into())
    }

    fn sign_digest(
        &self,
        scalar_bytes: &[u8; 32],
        digest: &[u8; 32],
    ) -> Result<[u8; 64], CryptoFormatError> {
        let key = SigningKey::from_bytes(&(*scalar_bytes).into())
            .map_err(|_| CryptoFormatError::InvalidScalar)?;
        let sig: EcdsaSignature = key
            .sign_prehash(digest)
            .map_err(|_| CryptoFormatError::InvalidSignature)?;
        Ok(sig.to_bytes().into())
    }

    fn sign_digest_recoverable(
        &self,
        scalar_bytes: &[u8; 32],
        digest: &[u8; 32],
    ) -> Result<([u8; 64], u8), CryptoFormatError> {
        let key = SigningKey::from_bytes(&(*scalar_bytes).into())
            .map_err(|_| CryptoFormatError::InvalidScalar)?;
        let (sig, recovery_id) = key
            .sign_prehash_recoverable(digest)
            .map_err(|_| CryptoFormatError::InvalidSignature)?;
        Ok((sig.to_bytes().into(), recovery_id.to_byte()))
    }

    fn verify_digest(&self, point_bytes: &[u8; 33], digest: &[u8; 32], sig: &[u8; 64]) -> bool {
        let key = match VerifyingKey::from_sec1_bytes(point_bytes) {
            Ok(k) => k,
            Err(_) => return false,
        };
        let sig = match EcdsaSignature::from_slice(sig) {
            Ok(s) => s,
            Err(_) => return false,
        };
        key.verify_prehash(digest, &sig).is_ok()
    }

    fn recover_pubkey(
        &self,
        digest: &[u8; 32],
        sig: &[u8; 64],
        recovery_id: u8,
    ) -> Result<[u8; 33], CryptoFormatError> {
        let id = RecoveryId::from_byte(recovery_id).ok_or(CryptoFormatError::InvalidSignature)?;
        let sig =
            EcdsaSignature::from_slice(sig).map_err(|_| CryptoFormatError::InvalidSignature)?;
        let key = VerifyingKey::recover_from_prehash(digest, &sig, id)
            .map_err(|_| CryptoFormatError::InvalidSignature)?;
        let mut buf = [0u8; 33];
        buf.copy_from_slice(key.to_encoded_point(true).as_bytes());
        Ok(buf)
    }

    fn is_valid_scalar(&self, scalar_bytes: &[u8; 32]) -> bool {
        nonzero_scalar(scalar_bytes).is_ok()
    }

    fn is_on_curve(&self, point_bytes: &[u8]) -> bool {
        point(point_bytes).is_ok()
    }
}

// Wuille's secp, via the C bindings.
use once_cell::sync::Lazy;
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    All, Message, PublicKey, Scalar, Secp256k1, SecretKey,
};

use crate::{curve::model::CurveBackend, CryptoFormatError};

// The context is created exactly once, is read-only afterwards, and is
// shared by all callers without locking.
static CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

static BACKEND: Lazy<LibsecpBackend> = Lazy::new(|| LibsecpBackend(&CONTEXT));

/// The native backend: bindings to the libsecp256k1 C library.
pub struct LibsecpBackend(&'static Secp256k1<All>);

impl LibsecpBackend {
    /// The process-wide instance. The first call pays for context
    /// initialization; successive calls are cheap.
    pub fn static_ref() -> &'static Self {
        &BACKEND
    }

    fn secret_key(scalar: &[u8; 32]) -> Result<SecretKey, CryptoFormatError> {
        SecretKey::from_slice(scalar).map_err(|_| CryptoFormatError::InvalidScalar)
    }

    fn public_key(point: &[u8; 33]) -> Result<PublicKey, CryptoFormatError> {
        PublicKey::from_slice(point).map_err(|_| CryptoFormatError::InvalidPoint)
    }

    fn tweak_scalar(tweak: &[u8; 32]) -> Result<Scalar, CryptoFormatError> {
        Scalar::from_be_bytes(*tweak).map_err(|_| CryptoFormatError::InvalidScalar)
    }
}

impl std::fmt::Debug for LibsecpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CurveBackend: libsecp bindings")
    }
}

impl CurveBackend for LibsecpBackend {
    fn derive_pubkey(&self, scalar: &[u8; 32]) -> Result<[u8; 33], CryptoFormatError> {
        let key = Self::secret_key(scalar)?;
        Ok(PublicKey::from_secret_key(self.0, &key).serialize())
    }

    fn tweak_privkey(
        &self,
        scalar: &[u8; 32],
        tweak: &[u8; 32],
    ) -> Result<[u8; 32], CryptoFormatError> {
        let key = Self::secret_key(scalar)?;
        let tweaked = key
            .add_tweak(&Self::tweak_scalar(tweak)?)
            .map_err(|_| CryptoFormatError::InvalidScalar)?;
        Ok(tweaked.secret_bytes())
    }

    fn tweak_pubkey(
        &self,
        point: &[u8; 33],
        tweak: &[u8; 32],
    ) -> Result<[u8; 33], CryptoFormatError> {
        let key = Self::public_key(point)?;
        let tweaked = key
            .add_exp_tweak(self.0, &Self::tweak_scalar(tweak)?)
            .map_err(|_| CryptoFormatError::InvalidPoint)?;
        Ok(tweaked.serialize())
    }

    fn negate_scalar(&self, scalar: &[u8; 32]) -> Result<[u8; 32], CryptoFormatError> {
        Ok(Self::secret_key(scalar)?.negate().secret_bytes())
    }

    fn sign_digest(
        &self,
        scalar: &[u8; 32],
        digest: &[u8; 32],
    ) -> Result<[u8; 64], CryptoFormatError> {
        let key = Self::secret_key(scalar)?;
        let sig = self.0.sign_ecdsa(&Message::from_digest(*digest), &key);
        Ok(sig.serialize_compact())
    }

    fn sign_digest_recoverable(
        &self,
        scalar: &[u8; 32],
        digest: &[u8; 32],
    ) -> Result<([u8; 64], u8), CryptoFormatError> {
        let key = Self::secret_key(scalar)?;
        let sig = self
            .0
            .sign_ecdsa_recoverable(&Message::from_digest(*digest), &key);
        let (recovery_id, compact) = sig.serialize_compact();
        Ok((compact, recovery_id.to_i32() as u8))
    }

    fn verify_digest(&self, point: &[u8; 33], digest: &[u8; 32], sig: &[u8; 64]) -> bool {
        let key = match Self::public_key(point) {
            Ok(k) => k,
            Err(_) => return false,
        };
        let sig = match secp256k1::ecdsa::Signature::from_compact(sig) {
            Ok(s) => s,
            Err(_) => return false,
        };
        self.0
            .verify_ecdsa(&Message::from_digest(*digest), &sig, &key)
            .is_ok()
    }

    fn recover_pubkey(
        &self,
        digest: &[u8; 32],
        sig: &[u8; 64],
        recovery_id: u8,
    ) -> Result<[u8; 33], CryptoFormatError> {
        let id = RecoveryId::from_i32(recovery_id as i32)
            .map_err(|_| CryptoFormatError::InvalidSignature)?;
        let sig = RecoverableSignature::from_compact(sig, id)
            .map_err(|_| CryptoFormatError::InvalidSignature)?;
        self.0
            .recover_ecdsa(&Message::from_digest(*digest), &sig)
            .map(|k| k.serialize())
            .map_err(|_| CryptoFormatError::InvalidSignature)
    }

    fn is_valid_scalar(&self, scalar: &[u8; 32]) -> bool {
        SecretKey::from_slice(scalar).is_ok()
    }

    fn is_on_curve(&self, point: &[u8]) -> bool {
        PublicKey::from_slice(point).is_ok()
    }
}

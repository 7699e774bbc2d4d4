use crate::CryptoFormatError;

/// A minimal curve-math capability interface over secp256k1.
///
/// Implementations operate on fixed-size byte encodings (32-byte
/// big-endian scalars, 33-byte compressed SEC1 points, 64-byte compact
/// `r || s` signatures) so key objects stay independent of any one
/// backend's internal types and every operation can be dispatched at
/// runtime.
pub trait CurveBackend: Sync {
    /// Derive the compressed public key for a private scalar.
    fn derive_pubkey(&self, scalar: &[u8; 32]) -> Result<[u8; 33], CryptoFormatError>;

    /// Add a scalar tweak to a private scalar, mod the curve order.
    /// Fails if either input or the sum is outside `[1, n-1]`.
    fn tweak_privkey(
        &self,
        scalar: &[u8; 32],
        tweak: &[u8; 32],
    ) -> Result<[u8; 32], CryptoFormatError>;

    /// Add `tweak * G` to a public key. Fails if the tweak is out of range
    /// or the sum is the point at infinity.
    fn tweak_pubkey(
        &self,
        point: &[u8; 33],
        tweak: &[u8; 32],
    ) -> Result<[u8; 33], CryptoFormatError>;

    /// Negate a scalar mod the curve order.
    fn negate_scalar(&self, scalar: &[u8; 32]) -> Result<[u8; 32], CryptoFormatError>;

    /// Produce a compact RFC6979 deterministic signature over a 32-byte
    /// digest. Output is always low-S canonical.
    fn sign_digest(
        &self,
        scalar: &[u8; 32],
        digest: &[u8; 32],
    ) -> Result<[u8; 64], CryptoFormatError>;

    /// As [`CurveBackend::sign_digest`], also returning the recovery id.
    fn sign_digest_recoverable(
        &self,
        scalar: &[u8; 32],
        digest: &[u8; 32],
    ) -> Result<([u8; 64], u8), CryptoFormatError>;

    /// Verify a compact low-S signature over a digest. Returns `false` on
    /// any malformed input; never errors.
    fn verify_digest(&self, point: &[u8; 33], digest: &[u8; 32], sig: &[u8; 64]) -> bool;

    /// Recover the compressed public key from a digest and a recoverable
    /// signature.
    fn recover_pubkey(
        &self,
        digest: &[u8; 32],
        sig: &[u8; 64],
        recovery_id: u8,
    ) -> Result<[u8; 33], CryptoFormatError>;

    /// Whether the bytes encode a scalar in `[1, n-1]`.
    fn is_valid_scalar(&self, scalar: &[u8; 32]) -> bool;

    /// Whether the bytes encode a point on the curve (compressed or
    /// uncompressed SEC1).
    fn is_on_curve(&self, point: &[u8]) -> bool;
}

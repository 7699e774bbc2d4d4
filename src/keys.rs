use zeroize::Zeroizing;

use crate::{
    curve::{rust_secp, BackendConfig, CurveBackend, RustSecpBackend},
    enc::{Address, AddressType},
    hashes::{hash160, hash256},
    sig::{RecoverableSignature, Signature},
    CryptoFormatError,
};

/// A validated scalar in `[1, n-1]`, used to offset keys.
///
/// Construction fails on zero or anything not below the curve order, so a
/// `Scalar` is never observable in a partially-validated state.
#[derive(Clone)]
pub struct Scalar(Zeroizing<[u8; 32]>);

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        *self.0 == *other.0
    }
}

impl Eq for Scalar {}

impl Scalar {
    /// Validate and wrap a big-endian scalar.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoFormatError> {
        if !RustSecpBackend::static_ref().is_valid_scalar(&bytes) {
            return Err(CryptoFormatError::InvalidScalar);
        }
        Ok(Self(Zeroizing::new(bytes)))
    }

    /// The big-endian scalar bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        *self.0
    }

    /// The additive inverse mod the curve order, so that offsetting by
    /// `s` then by `s.negate()` is the identity.
    pub fn negate(&self) -> Self {
        let negated = RustSecpBackend::static_ref()
            .negate_scalar(&self.0)
            .expect("scalar is in range by construction");
        Self(Zeroizing::new(negated))
    }
}

impl std::fmt::Debug for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Scalar(...)")
    }
}

/// An immutable secp256k1 private key.
///
/// Owns a validated scalar and a compression flag. The scalar is zeroed
/// when the key is dropped, and is never printed by the `Debug` impl;
/// clear-text export goes through WIF serialization only.
///
/// Equality and hashing consider the scalar alone. The compression flag
/// is a serialization preference carried along for encoding, not part of
/// the key's identity.
#[derive(Clone)]
pub struct PrivateKey {
    scalar: Zeroizing<[u8; 32]>,
    compressed: bool,
    config: BackendConfig,
}

impl PrivateKey {
    /// Generate a fresh key from the thread-local CSPRNG.
    pub fn generate(compressed: bool, config: BackendConfig) -> Self {
        let scalar = k256::NonZeroScalar::random(&mut rand::thread_rng());
        Self {
            scalar: Zeroizing::new(scalar.to_bytes().into()),
            compressed,
            config,
        }
    }

    /// Validate and wrap a big-endian private scalar.
    pub fn from_bytes(
        bytes: &[u8; 32],
        compressed: bool,
        config: BackendConfig,
    ) -> Result<Self, CryptoFormatError> {
        if !RustSecpBackend::static_ref().is_valid_scalar(bytes) {
            return Err(CryptoFormatError::InvalidScalar);
        }
        Ok(Self {
            scalar: Zeroizing::new(*bytes),
            compressed,
            config,
        })
    }

    /// The raw private scalar. Handle with care.
    pub fn secret_bytes(&self) -> [u8; 32] {
        *self.scalar
    }

    /// Whether the corresponding public key serializes compressed.
    pub fn compressed(&self) -> bool {
        self.compressed
    }

    /// The backend selection this key was constructed with.
    pub fn config(&self) -> BackendConfig {
        self.config
    }

    /// Derive the corresponding public key.
    pub fn pubkey(&self) -> Result<PublicKey, CryptoFormatError> {
        let point = self
            .config
            .pubkey_derivation()
            .derive_pubkey(&self.scalar)?;
        Ok(PublicKey {
            point,
            compressed: self.compressed,
            config: self.config,
        })
    }

    /// Produce a canonical signature on `sha256(sha256(message))`.
    pub fn sign(&self, message: &[u8]) -> Result<Signature, CryptoFormatError> {
        self.sign_digest(hash256(message))
    }

    /// Produce a canonical RFC6979 signature on a 32-byte digest.
    pub fn sign_digest(&self, digest: [u8; 32]) -> Result<Signature, CryptoFormatError> {
        let compact = self.config.signing().sign_digest(&self.scalar, &digest)?;
        Signature::from_compact(&compact)
    }

    /// Sign a digest, also producing the recovery id.
    pub fn sign_digest_recoverable(
        &self,
        digest: [u8; 32],
    ) -> Result<RecoverableSignature, CryptoFormatError> {
        let (compact, recovery_id) = self
            .config
            .signing()
            .sign_digest_recoverable(&self.scalar, &digest)?;
        Ok(RecoverableSignature {
            sig: Signature::from_compact(&compact)?,
            recovery_id,
        })
    }

    /// Return a new key with scalar `(self + offset) mod n`.
    ///
    /// The offset relation commutes with public-key derivation:
    /// `key.offset(o).pubkey() == key.pubkey().offset(o)` for every valid
    /// offset, whichever backend either operation runs on.
    pub fn offset(&self, offset: &Scalar) -> Result<PrivateKey, CryptoFormatError> {
        let tweaked = self
            .config
            .key_offsetting()
            .tweak_privkey(&self.scalar, &offset.to_bytes())?;
        Ok(Self {
            scalar: Zeroizing::new(tweaked),
            compressed: self.compressed,
            config: self.config,
        })
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        *self.scalar == *other.scalar
    }
}

impl Eq for PrivateKey {}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("scalar", &"<redacted>")
            .field("compressed", &self.compressed)
            .finish()
    }
}

/// An immutable secp256k1 public key.
///
/// Owns a validated curve point (stored compressed) and a compression
/// flag controlling serialization. Equality and hashing consider the
/// point alone.
#[derive(Clone)]
pub struct PublicKey {
    point: [u8; 33],
    compressed: bool,
    config: BackendConfig,
}

impl PublicKey {
    /// Parse a SEC1-encoded point, compressed (33 bytes) or uncompressed
    /// (65 bytes). The compression flag is inferred from the encoding.
    pub fn from_bytes(bytes: &[u8], config: BackendConfig) -> Result<Self, CryptoFormatError> {
        let compressed = match bytes.len() {
            33 => true,
            65 => false,
            got => {
                return Err(CryptoFormatError::WrongKeyLength { expected: 33, got });
            }
        };
        Ok(Self {
            point: rust_secp::compress_point(bytes)?,
            compressed,
            config,
        })
    }

    /// Recover the signing public key from a digest and a recoverable
    /// signature.
    pub fn recover_from_digest(
        digest: [u8; 32],
        sig: &RecoverableSignature,
        config: BackendConfig,
    ) -> Result<Self, CryptoFormatError> {
        let point =
            config
                .signing()
                .recover_pubkey(&digest, &sig.sig.to_compact(), sig.recovery_id)?;
        Ok(Self {
            point,
            compressed: true,
            config,
        })
    }

    /// Serialize per the compression flag: 33 or 65 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.compressed {
            self.point.to_vec()
        } else {
            self.serialize_uncompressed().to_vec()
        }
    }

    /// The compressed SEC1 encoding, regardless of the flag.
    pub fn serialize_compressed(&self) -> [u8; 33] {
        self.point
    }

    /// The uncompressed SEC1 encoding, regardless of the flag.
    pub fn serialize_uncompressed(&self) -> [u8; 65] {
        rust_secp::uncompress_point(&self.point).expect("point is on curve by construction")
    }

    /// Whether this key serializes compressed.
    pub fn compressed(&self) -> bool {
        self.compressed
    }

    /// The backend selection this key was constructed with.
    pub fn config(&self) -> BackendConfig {
        self.config
    }

    /// Verify a DER signature on `sha256(sha256(message))`, requiring the
    /// canonical low-S form. Malformed signature bytes simply fail
    /// verification; this never errors on untrusted input.
    pub fn verify(&self, message: &[u8], der_sig: &[u8]) -> bool {
        match Signature::from_der(der_sig) {
            Ok(sig) => self.verify_digest(hash256(message), &sig),
            Err(_) => false,
        }
    }

    /// Verify a DER signature on `sha256(sha256(message))`, accepting
    /// non-canonical `s` from third-party signers.
    pub fn verify_lax(&self, message: &[u8], der_sig: &[u8]) -> bool {
        match Signature::from_der(der_sig) {
            Ok(sig) => self.verify_digest_lax(hash256(message), &sig),
            Err(_) => false,
        }
    }

    /// Verify a signature on a digest, requiring canonical low-S form.
    pub fn verify_digest(&self, digest: [u8; 32], sig: &Signature) -> bool {
        if !sig.is_canonical() {
            return false;
        }
        self.config
            .signing()
            .verify_digest(&self.point, &digest, &sig.to_compact())
    }

    /// Verify a signature on a digest by the raw mathematical definition,
    /// normalizing `s` first.
    pub fn verify_digest_lax(&self, digest: [u8; 32], sig: &Signature) -> bool {
        self.config
            .signing()
            .verify_digest(&self.point, &digest, &sig.normalized().to_compact())
    }

    /// Return a new key with point `self + offset * G`, the public half
    /// of [`PrivateKey::offset`].
    pub fn offset(&self, offset: &Scalar) -> Result<PublicKey, CryptoFormatError> {
        let point = self
            .config
            .key_offsetting()
            .tweak_pubkey(&self.point, &offset.to_bytes())?;
        Ok(Self {
            point,
            compressed: self.compressed,
            config: self.config,
        })
    }

    /// The address for this key: `hash160` of the serialized point,
    /// tagged with the requested address type.
    pub fn address(&self, kind: AddressType) -> Address {
        Address::new(kind, hash160(&self.to_bytes()))
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point
    }
}

impl Eq for PublicKey {}

impl std::hash::Hash for PublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.point.hash(state);
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey")
            .field("point", &hex_string(&self.point))
            .field("compressed", &self.compressed)
            .finish()
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    const CONFIGS: [BackendConfig; 3] = [
        BackendConfig::all_native(),
        BackendConfig::all_software(),
        BackendConfig {
            native_pubkey_derivation: true,
            native_signing: false,
            native_key_offsetting: false,
            native_xpub_derivation: true,
        },
    ];

    fn fixed_key(config: BackendConfig) -> PrivateKey {
        let mut scalar = [0u8; 32];
        scalar.copy_from_slice(
            &hex::decode("0c28fca386c7a227600b2fe50b7cae11ec86d3bf1fbe471be89827e19d72aa1d")
                .unwrap(),
        );
        PrivateKey::from_bytes(&scalar, true, config).unwrap()
    }

    fn fixed_offset() -> Scalar {
        let mut bytes = [0u8; 32];
        bytes[31] = 0x42;
        bytes[7] = 0x13;
        Scalar::from_bytes(bytes).unwrap()
    }

    #[test]
    fn it_rejects_invalid_scalars() {
        for config in CONFIGS {
            assert!(PrivateKey::from_bytes(&[0u8; 32], true, config).is_err());
            assert!(PrivateKey::from_bytes(&[0xff; 32], true, config).is_err());
        }
        assert!(Scalar::from_bytes([0u8; 32]).is_err());
        assert!(Scalar::from_bytes([0xff; 32]).is_err());
    }

    #[test]
    fn offsetting_commutes_with_pubkey_derivation() {
        for config in CONFIGS {
            let key = fixed_key(config);
            let offset = fixed_offset();

            let offset_then_derive = key.offset(&offset).unwrap().pubkey().unwrap();
            let derive_then_offset = key.pubkey().unwrap().offset(&offset).unwrap();
            assert_eq!(offset_then_derive, derive_then_offset);
        }
    }

    #[test]
    fn offsetting_is_invertible() {
        for config in CONFIGS {
            let key = fixed_key(config);
            let offset = fixed_offset();

            let round_trip = key.offset(&offset).unwrap().offset(&offset.negate()).unwrap();
            assert_eq!(round_trip, key);

            let pubkey = key.pubkey().unwrap();
            let pub_round_trip = pubkey.offset(&offset).unwrap().offset(&offset.negate()).unwrap();
            assert_eq!(pub_round_trip, pubkey);
        }
    }

    #[test]
    fn signatures_verify_and_are_canonical() {
        for config in CONFIGS {
            let key = fixed_key(config);
            let pubkey = key.pubkey().unwrap();
            let message = b"the times 03/jan/2009";

            let sig = key.sign(message).unwrap();
            assert!(sig.is_canonical());
            assert!(pubkey.verify(message, &sig.to_der()));
            assert!(pubkey.verify_lax(message, &sig.to_der()));
            assert!(!pubkey.verify(b"a different message", &sig.to_der()));
        }
    }

    #[test]
    fn it_matches_the_rfc6979_reference_vectors() {
        // (scalar, message, expected r || s), digest = sha256(message).
        let cases = [
            (
                "0000000000000000000000000000000000000000000000000000000000000001",
                &b"Satoshi Nakamoto"[..],
                "934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d8\
                 2442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5",
            ),
            (
                "0000000000000000000000000000000000000000000000000000000000000001",
                &b"All those moments will be lost in time, like tears in rain. Time to die..."[..],
                "8600dbd41e348fe5c9465ab92d23e3db8b98b873beecd930736488696438cb6b\
                 547fe64427496db33bf66019dacbf0039c04199abb0122918601db38a72cfc21",
            ),
            (
                "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140",
                &b"Satoshi Nakamoto"[..],
                "fd567d121db66e382991534ada77a6bd3106f0a1098c231e47993447cd6af2d0\
                 6b39cd0eb1bc8603e159ef5c20a5c8ad685a45b06ce9bebed3f153d10d93bed5",
            ),
        ];

        for config in CONFIGS {
            for (scalar_hex, message, expected) in cases {
                let mut scalar = [0u8; 32];
                scalar.copy_from_slice(&hex::decode(scalar_hex).unwrap());
                let key = PrivateKey::from_bytes(&scalar, true, config).unwrap();

                let sig = key.sign_digest(crate::hashes::sha256(message)).unwrap();
                assert_eq!(hex::encode(sig.to_compact()), expected);
            }
        }
    }

    #[test]
    fn corrupted_signatures_fail_closed() {
        let key = fixed_key(BackendConfig::default());
        let pubkey = key.pubkey().unwrap();
        let message = b"payload";
        let der = key.sign(message).unwrap().to_der();

        // Flipping the low bit of any byte must not verify. Some flips
        // break the DER framing, some break the math; both return false.
        for i in 0..der.len() {
            let mut mangled = der.clone();
            mangled[i] ^= 0x01;
            assert!(!pubkey.verify(message, &mangled), "byte {} verified", i);
        }
        assert!(!pubkey.verify(message, &[]));
        assert!(!pubkey.verify(message, &[0u8; 72]));
    }

    #[test]
    fn equality_ignores_compression_flag() {
        let config = BackendConfig::default();
        let scalar = fixed_key(config).secret_bytes();
        let compressed = PrivateKey::from_bytes(&scalar, true, config).unwrap();
        let uncompressed = PrivateKey::from_bytes(&scalar, false, config).unwrap();
        assert_eq!(compressed, uncompressed);

        let pub_c = compressed.pubkey().unwrap();
        let pub_u = uncompressed.pubkey().unwrap();
        assert_eq!(pub_c, pub_u);
        // but the serializations differ
        assert_eq!(pub_c.to_bytes().len(), 33);
        assert_eq!(pub_u.to_bytes().len(), 65);
        // and so do the derived addresses
        assert_ne!(
            pub_c.address(AddressType::Common),
            pub_u.address(AddressType::Common)
        );
    }

    #[test]
    fn pubkey_parsing_round_trips() {
        let config = BackendConfig::default();
        let pubkey = fixed_key(config).pubkey().unwrap();

        let compressed = PublicKey::from_bytes(&pubkey.serialize_compressed(), config).unwrap();
        assert!(compressed.compressed());
        let uncompressed =
            PublicKey::from_bytes(&pubkey.serialize_uncompressed(), config).unwrap();
        assert!(!uncompressed.compressed());
        assert_eq!(compressed, uncompressed);

        assert!(PublicKey::from_bytes(&[0u8; 33], config).is_err());
        assert!(PublicKey::from_bytes(&[2u8; 12], config).is_err());
    }

    #[test]
    fn recovery_returns_the_signing_key() {
        for config in CONFIGS {
            let key = fixed_key(config);
            let digest = hash256(b"recoverable");
            let sig = key.sign_digest_recoverable(digest).unwrap();

            let recovered = PublicKey::recover_from_digest(digest, &sig, config).unwrap();
            assert_eq!(recovered, key.pubkey().unwrap());
            assert!(recovered.verify_digest(digest, &sig.without_recovery()));
        }
    }

    #[test]
    fn debug_never_prints_the_scalar() {
        let key = fixed_key(BackendConfig::default());
        let rendered = format!("{:?}", key);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("0c28fca3"));
    }

    #[test]
    fn generated_keys_are_distinct_and_valid() {
        let config = BackendConfig::default();
        let a = PrivateKey::generate(true, config);
        let b = PrivateKey::generate(true, config);
        assert_ne!(a, b);
        assert!(a.pubkey().is_ok());
    }
}

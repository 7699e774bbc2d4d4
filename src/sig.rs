use k256::ecdsa;

use crate::CryptoFormatError;

/// An ECDSA signature: a validated `(r, s)` pair, each nonzero and below
/// the curve order.
///
/// The signer in this crate only ever produces the canonical low-S form
/// (`s <= n/2`), which makes a signature unique for a given message and
/// key and removes the trivial `(r, n-s)` malleability. Third-party
/// signatures may arrive in high-S form; [`Signature::normalized`] maps
/// them to the canonical equivalent for lax verification.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Signature(ecdsa::Signature);

impl Signature {
    /// Parse a DER-encoded signature. Rejects out-of-range or zero
    /// components.
    pub fn from_der(bytes: &[u8]) -> Result<Self, CryptoFormatError> {
        ecdsa::Signature::from_der(bytes)
            .map(Self)
            .map_err(|_| CryptoFormatError::InvalidSignature)
    }

    /// Serialize to DER.
    pub fn to_der(&self) -> Vec<u8> {
        self.0.to_der().as_bytes().to_vec()
    }

    /// Parse a compact `r || s` signature.
    pub fn from_compact(bytes: &[u8; 64]) -> Result<Self, CryptoFormatError> {
        ecdsa::Signature::from_slice(bytes)
            .map(Self)
            .map_err(|_| CryptoFormatError::InvalidSignature)
    }

    /// Serialize to the compact `r || s` form.
    pub fn to_compact(&self) -> [u8; 64] {
        self.0.to_bytes().into()
    }

    /// Whether `s` is in the lower half of the scalar range.
    pub fn is_canonical(&self) -> bool {
        self.0.normalize_s().is_none()
    }

    /// The canonical low-S equivalent of this signature.
    pub fn normalized(&self) -> Self {
        match self.0.normalize_s() {
            Some(normalized) => Self(normalized),
            None => self.clone(),
        }
    }
}

/// A signature plus the recovery id needed to recover the signing public
/// key from the digest.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RecoverableSignature {
    /// The non-recoverable `(r, s)` signature.
    pub sig: Signature,
    /// The recovery id. Always in `0..=3`.
    pub recovery_id: u8,
}

impl RecoverableSignature {
    /// Drop the recovery id.
    pub fn without_recovery(&self) -> Signature {
        self.sig.clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_round_trips_der() {
        let compact: [u8; 64] = {
            let mut buf = [0u8; 64];
            buf[..32].copy_from_slice(
                &hex::decode("934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d8")
                    .unwrap(),
            );
            buf[32..].copy_from_slice(
                &hex::decode("2442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5")
                    .unwrap(),
            );
            buf
        };
        let sig = Signature::from_compact(&compact).unwrap();
        assert!(sig.is_canonical());

        let der = sig.to_der();
        let reparsed = Signature::from_der(&der).unwrap();
        assert_eq!(sig, reparsed);
        assert_eq!(reparsed.to_compact(), compact);
    }

    #[test]
    fn it_rejects_garbage_der() {
        assert!(Signature::from_der(&[]).is_err());
        assert!(Signature::from_der(&[0x30, 0x00]).is_err());
        assert!(Signature::from_der(&[0xff; 70]).is_err());
        // all-zero r and s
        assert!(Signature::from_compact(&[0u8; 64]).is_err());
    }

    #[test]
    fn normalization_is_idempotent_on_canonical_sigs() {
        let mut compact = [0u8; 64];
        compact[31] = 1; // r = 1
        compact[63] = 1; // s = 1
        let sig = Signature::from_compact(&compact).unwrap();
        assert!(sig.is_canonical());
        assert_eq!(sig.normalized(), sig);
    }
}

use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::{
    curve::{BackendConfig, CurveBackend},
    hashes::hash160,
    keys::{PrivateKey, PublicKey},
    path::DerivationPath,
    DerivationError, KeyError, BIP32_HARDEN,
};

type HmacSha512 = Hmac<Sha512>;

const SEED: &[u8; 12] = b"Bitcoin seed";

const PBKDF2_ROUNDS: u32 = 2048;

/// Perform `HmacSha512` and split the output into left and right segments.
pub fn hmac_and_split(seed: &[u8], data: &[u8]) -> ([u8; 32], ChainCode) {
    let mut mac = HmacSha512::new_from_slice(seed).expect("HMAC accepts any key length");
    mac.update(data);
    let result = mac.finalize().into_bytes();

    let mut left = [0u8; 32];
    left.copy_from_slice(&result[..32]);

    let mut right = [0u8; 32];
    right.copy_from_slice(&result[32..]);

    (left, ChainCode(right))
}

/// A 4-byte key fingerprint: the first four bytes of `hash160` of the
/// compressed public key.
#[derive(Eq, PartialEq, Clone, Copy)]
pub struct KeyFingerprint(pub [u8; 4]);

impl From<[u8; 4]> for KeyFingerprint {
    fn from(v: [u8; 4]) -> Self {
        Self(v)
    }
}

impl KeyFingerprint {
    /// Determines if the slice represents the same key fingerprint.
    pub fn eq_slice(self, other: &[u8]) -> bool {
        self.0 == other
    }
}

impl std::fmt::Debug for KeyFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("KeyFingerprint {:x?}", self.0))
    }
}

/// A 32-byte chain code, mixed into child derivation to decorrelate child
/// keys from the raw parent scalar or point.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ChainCode(pub [u8; 32]);

impl From<[u8; 32]> for ChainCode {
    fn from(v: [u8; 32]) -> Self {
        Self(v)
    }
}

/// The tree position shared by extended private and public keys.
///
/// The depth increments by exactly one per derivation step; the root has
/// depth 0, a zero parent fingerprint, and index 0. Indices with the top
/// bit set mark hardened children.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct XKeyInfo {
    /// The key's depth in the HD tree.
    pub depth: u8,
    /// The fingerprint of the parent key.
    pub parent: KeyFingerprint,
    /// The derivation index of this key.
    pub index: u32,
    /// The chain code used to generate child keys.
    pub chain_code: ChainCode,
}

/// Extended-key common features.
pub trait XKey: Sized + Clone {
    /// Calculate and return the key fingerprint.
    fn fingerprint(&self) -> Result<KeyFingerprint, KeyError>;

    /// The key's tree position.
    fn info(&self) -> &XKeyInfo;

    /// Derive a child key. Private keys derive private children, public
    /// keys derive public children.
    fn derive_child(&self, index: u32) -> Result<Self, KeyError>;

    /// Derive a series of child indices, traversing several levels of the
    /// tree at once. Accepts a parsed path or a string like "m/44'/0/1".
    fn derive_path<E, P>(&self, path: &P) -> Result<Self, KeyError>
    where
        E: Into<KeyError>,
        P: TryInto<DerivationPath, Error = E> + Clone,
    {
        let path: DerivationPath = path.clone().try_into().map_err(Into::into)?;

        let mut current = self.to_owned();
        for index in path.iter() {
            current = current.derive_child(*index)?;
        }
        Ok(current)
    }
}

/// A BIP32-style extended private key: a signing key plus its chain code
/// and tree position.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct XPriv {
    pub(crate) info: XKeyInfo,
    pub(crate) key: PrivateKey,
}

impl XPriv {
    /// Instantiate from parts. Used by deserialization; derivation from a
    /// seed is the usual entry point.
    pub fn new(info: XKeyInfo, key: PrivateKey) -> Self {
        Self { info, key }
    }

    /// Generate a master node from freshly drawn entropy.
    pub fn master_generate(config: BackendConfig) -> Result<Self, KeyError> {
        use rand::RngCore;
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        Self::master_from_seed(&seed, config)
    }

    /// Generate a master node from a seed of AT LEAST 128 bits.
    pub fn master_from_seed(data: &[u8], config: BackendConfig) -> Result<Self, KeyError> {
        if data.len() < 16 {
            return Err(KeyError::SeedTooShort);
        }
        let (key, chain_code) = hmac_and_split(SEED, data);
        let privkey = PrivateKey::from_bytes(&key, true, config)?;
        Ok(Self {
            info: XKeyInfo {
                depth: 0,
                parent: KeyFingerprint([0u8; 4]),
                index: 0,
                chain_code,
            },
            key: privkey,
        })
    }

    /// Generate a master node from a passphrase-protected seed. The
    /// passphrase is stretched against the seed bytes with
    /// PBKDF2-HMAC-SHA512 before the usual master-node derivation, so the
    /// tree is recoverable only with both inputs.
    pub fn master_from_encrypted_seed(
        passphrase: &str,
        data: &[u8],
        config: BackendConfig,
    ) -> Result<Self, KeyError> {
        if data.len() < 16 {
            return Err(KeyError::SeedTooShort);
        }
        let mut stretched = [0u8; 64];
        pbkdf2::pbkdf2_hmac::<Sha512>(passphrase.as_bytes(), data, PBKDF2_ROUNDS, &mut stretched);
        Self::master_from_seed(&stretched, config)
    }

    /// The leaf signing key at this node.
    pub fn private_key(&self) -> &PrivateKey {
        &self.key
    }

    /// Derive the matching watch-only extended public key.
    pub fn to_xpub(&self) -> Result<XPub, KeyError> {
        Ok(XPub {
            info: self.info,
            key: self.key.pubkey()?,
        })
    }

    /// Derive the hardened child at `index + 2^31`. Fails with
    /// `IndexOutOfRange` if the index already has the hardened bit set.
    pub fn derive_hardened_child(&self, index: u32) -> Result<Self, KeyError> {
        if index >= BIP32_HARDEN {
            return Err(DerivationError::IndexOutOfRange(index).into());
        }
        self.derive_child(index + BIP32_HARDEN)
    }
}

impl XKey for XPriv {
    fn fingerprint(&self) -> Result<KeyFingerprint, KeyError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&hash160(&self.key.pubkey()?.serialize_compressed())[..4]);
        Ok(KeyFingerprint(buf))
    }

    fn info(&self) -> &XKeyInfo {
        &self.info
    }

    fn derive_child(&self, index: u32) -> Result<Self, KeyError> {
        if self.info.depth == u8::MAX {
            return Err(DerivationError::DepthOverflow.into());
        }
        let hardened = index >= BIP32_HARDEN;

        let mut data: Vec<u8> = Vec::with_capacity(37);
        if hardened {
            data.push(0);
            data.extend(self.key.secret_bytes());
        } else {
            data.extend(self.key.pubkey()?.serialize_compressed());
        }
        data.extend(index.to_be_bytes());

        let (tweak, chain_code) = hmac_and_split(&self.info.chain_code.0, &data);
        let child_scalar = self
            .key
            .config()
            .privkey_derivation()
            .tweak_privkey(&self.key.secret_bytes(), &tweak)
            .map_err(|_| DerivationError::InvalidChildKey(index))?;
        let privkey = PrivateKey::from_bytes(&child_scalar, true, self.key.config())
            .map_err(|_| DerivationError::InvalidChildKey(index))?;

        Ok(Self {
            info: XKeyInfo {
                depth: self.info.depth + 1,
                parent: self.fingerprint()?,
                index,
                chain_code,
            },
            key: privkey,
        })
    }
}

/// A BIP32-style extended public key: a verifying key plus its chain code
/// and tree position. Supports non-hardened derivation only.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct XPub {
    pub(crate) info: XKeyInfo,
    pub(crate) key: PublicKey,
}

impl XPub {
    /// Instantiate from parts.
    pub fn new(info: XKeyInfo, key: PublicKey) -> Self {
        Self { info, key }
    }

    /// The verifying key at this node.
    pub fn public_key(&self) -> &PublicKey {
        &self.key
    }
}

impl XKey for XPub {
    fn fingerprint(&self) -> Result<KeyFingerprint, KeyError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&hash160(&self.key.serialize_compressed())[..4]);
        Ok(KeyFingerprint(buf))
    }

    fn info(&self) -> &XKeyInfo {
        &self.info
    }

    fn derive_child(&self, index: u32) -> Result<Self, KeyError> {
        if index >= BIP32_HARDEN {
            return Err(DerivationError::HardenedChildFromPublic.into());
        }
        if self.info.depth == u8::MAX {
            return Err(DerivationError::DepthOverflow.into());
        }

        let mut data: Vec<u8> = self.key.serialize_compressed().to_vec();
        data.extend(index.to_be_bytes());

        let (tweak, chain_code) = hmac_and_split(&self.info.chain_code.0, &data);
        let child_point = self
            .key
            .config()
            .xpub_derivation()
            .tweak_pubkey(&self.key.serialize_compressed(), &tweak)
            .map_err(|_| DerivationError::InvalidChildKey(index))?;
        let pubkey = PublicKey::from_bytes(&child_point, self.key.config())
            .map_err(|_| DerivationError::InvalidChildKey(index))?;

        Ok(Self {
            info: XKeyInfo {
                depth: self.info.depth + 1,
                parent: self.fingerprint()?,
                index,
                chain_code,
            },
            key: pubkey,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn config() -> BackendConfig {
        BackendConfig::default()
    }

    #[test]
    fn private_and_public_derivation_commute() {
        let xpriv = XPriv::master_from_seed(&[0xa5; 32], config()).unwrap();
        let xpub = xpriv.to_xpub().unwrap();

        for index in [0u32, 1, 2, 1000, BIP32_HARDEN - 1] {
            let from_priv = xpriv.derive_child(index).unwrap().to_xpub().unwrap();
            let from_pub = xpub.derive_child(index).unwrap();
            assert_eq!(from_priv, from_pub);
        }
    }

    #[test]
    fn hardened_derivation_requires_the_private_key() {
        let xpriv = XPriv::master_from_seed(&[0xa5; 32], config()).unwrap();
        let xpub = xpriv.to_xpub().unwrap();

        assert!(xpriv.derive_child(BIP32_HARDEN).is_ok());
        assert!(matches!(
            xpub.derive_child(BIP32_HARDEN),
            Err(KeyError::Derivation(
                DerivationError::HardenedChildFromPublic
            ))
        ));

        // hardened and non-hardened children at the same offset differ
        let hardened = xpriv.derive_hardened_child(7).unwrap();
        let normal = xpriv.derive_child(7).unwrap();
        assert_ne!(hardened.private_key(), normal.private_key());
        assert_eq!(hardened.info().index, 7 + BIP32_HARDEN);
    }

    #[test]
    fn depth_and_parent_track_the_tree() {
        let root = XPriv::master_from_seed(&[1u8; 16], config()).unwrap();
        assert_eq!(root.info().depth, 0);
        assert!(root.info().parent.eq_slice(&[0u8; 4]));

        let child = root.derive_child(5).unwrap();
        assert_eq!(child.info().depth, 1);
        assert_eq!(child.info().index, 5);
        assert_eq!(child.info().parent, root.fingerprint().unwrap());

        let grandchild = child.derive_hardened_child(0).unwrap();
        assert_eq!(grandchild.info().depth, 2);
        assert_eq!(grandchild.info().parent, child.fingerprint().unwrap());
    }

    #[test]
    fn hardened_index_range_is_checked() {
        let root = XPriv::master_from_seed(&[1u8; 16], config()).unwrap();
        assert!(matches!(
            root.derive_hardened_child(BIP32_HARDEN),
            Err(KeyError::Derivation(DerivationError::IndexOutOfRange(_)))
        ));
    }

    #[test]
    fn short_seeds_are_rejected() {
        assert!(matches!(
            XPriv::master_from_seed(&[0u8; 15], config()),
            Err(KeyError::SeedTooShort)
        ));
        assert!(XPriv::master_from_seed(&[0u8; 16], config()).is_ok());
    }

    #[test]
    fn encrypted_seed_requires_the_passphrase() {
        let seed = [0x17u8; 32];
        let a = XPriv::master_from_encrypted_seed("hunter2", &seed, config()).unwrap();
        let b = XPriv::master_from_encrypted_seed("hunter2", &seed, config()).unwrap();
        let c = XPriv::master_from_encrypted_seed("*******", &seed, config()).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, XPriv::master_from_seed(&seed, config()).unwrap());
    }

    #[test]
    fn path_traversal_matches_stepwise_derivation() {
        let root = XPriv::master_from_seed(&[9u8; 32], config()).unwrap();
        let stepwise = root
            .derive_hardened_child(44)
            .unwrap()
            .derive_child(0)
            .unwrap()
            .derive_child(1)
            .unwrap();
        let pathwise = root.derive_path(&"m/44'/0/1").unwrap();
        assert_eq!(stepwise, pathwise);
    }
}

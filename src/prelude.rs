pub use crate::{
    curve::BackendConfig,
    enc::{
        decode_b58_check, encode_b58_check, Address, AddressType, BitcoinEncoder, MainnetEncoder,
        NetworkEncoder, NetworkParams, TestnetEncoder,
    },
    hashes::{hash160, hash256, sha256},
    keys::{PrivateKey, PublicKey, Scalar},
    path::DerivationPath,
    sig::{RecoverableSignature, Signature},
    xkeys::{ChainCode, KeyFingerprint, XKey, XKeyInfo, XPriv, XPub},
    CryptoFormatError, DerivationError, KeyError, BIP32_HARDEN,
};

//! HD key management and deterministic ECDSA signing for Bitcoin-style
//! ledgers.
//!
//! This crate covers the key/signature core of a ledger client:
//!
//! - [`PrivateKey`]/[`PublicKey`] value objects over secp256k1, with
//!   homomorphic scalar offsetting.
//! - RFC6979 deterministic signing producing DER-encoded, low-S canonical
//!   signatures, and strict/lax verification.
//! - BIP32-style extended keys ([`XPriv`]/[`XPub`]) with hardened and
//!   non-hardened child derivation.
//! - Base58Check, WIF, extended-key, and address text encodings,
//!   parameterized by network.
//!
//! Curve math runs on one of two interchangeable backends: bindings to the
//! C libsecp256k1 library, or a pure-Rust implementation. A
//! [`BackendConfig`] injected at key construction selects the backend
//! independently for each operation class, so an operator can fall back to
//! the software path for a single class without disabling the rest.
//!
//! All key and signature types are immutable after construction and safe to
//! share across threads; no operation blocks or performs I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// The curve-math backends and per-operation-class selection.
pub mod curve;

/// Sha256, double-sha256, and hash160.
pub mod hashes;

/// Single keys and scalar offsets.
pub mod keys;

/// Signature containers and canonicality rules.
pub mod sig;

/// Extended keys and child derivation.
pub mod xkeys;

/// Derivation paths ("m/44'/0/1" syntax).
pub mod path;

/// Network-differentiated encoders for keys and addresses.
pub mod enc;

/// The default encoder, selected by feature flag, and serde impls.
#[cfg(any(feature = "mainnet", feature = "testnet"))]
pub mod defaults;

/// Convenience re-exports.
pub mod prelude;

use thiserror::Error;

pub use curve::BackendConfig;
pub use enc::{Address, AddressType};
pub use keys::{PrivateKey, PublicKey, Scalar};
pub use sig::{RecoverableSignature, Signature};
pub use xkeys::{XPriv, XPub};

/// Child indices at or above this value derive hardened children.
pub const BIP32_HARDEN: u32 = 0x8000_0000;

/// Malformed key or signature material. Never retried; surfaced to the
/// caller immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CryptoFormatError {
    /// A scalar that is zero or not below the curve order.
    #[error("invalid scalar: zero or not below the curve order")]
    InvalidScalar,

    /// A point encoding that does not name a point on the curve.
    #[error("invalid point: bad encoding or not on the secp256k1 curve")]
    InvalidPoint,

    /// A signature whose encoding or components are out of range.
    #[error("malformed signature: bad encoding or out-of-range components")]
    InvalidSignature,

    /// Key material of the wrong length.
    #[error("wrong key length: expected {expected} bytes, got {got}")]
    WrongKeyLength {
        /// The length the format requires.
        expected: usize,
        /// The length actually supplied.
        got: usize,
    },
}

/// An illegal derivation request. Fatal to that call only; other keys are
/// unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DerivationError {
    /// Hardened derivation is undefined for public-only keys.
    #[error("attempted to derive a hardened child of a public-only key")]
    HardenedChildFromPublic,

    /// The index does not fit the requested derivation range.
    #[error("child index {0} out of range")]
    IndexOutOfRange(u32),

    /// The HMAC tweak or the resulting child key fell outside the scalar
    /// range. Probability ~2^-127; never silently retried.
    #[error("derived child key invalid at index {0}")]
    InvalidChildKey(u32),

    /// Deriving a child would push the depth past 255.
    #[error("key depth would exceed 255")]
    DepthOverflow,
}

/// Errors for this crate.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Malformed key/signature bytes, invalid scalar, point not on curve.
    #[error(transparent)]
    CryptoFormat(#[from] CryptoFormatError),

    /// An illegal derivation request.
    #[error(transparent)]
    Derivation(#[from] DerivationError),

    /// Base58Check checksum failure on decode. Never silently corrected.
    #[error("checksum mismatch on base58check decode")]
    ChecksumMismatch,

    /// Bubbled up error from the bs58 library.
    #[error(transparent)]
    B58Error(#[from] bs58::decode::Error),

    /// Master key seed generation received fewer than 16 bytes.
    #[error("master key seed must be at least 16 bytes")]
    SeedTooShort,

    /// Unrecognized version when deserializing an xpriv.
    #[error("version bytes 0x{0:02x?} don't match this network's xpriv version")]
    BadXPrivVersionBytes([u8; 4]),

    /// Unrecognized version when deserializing an xpub.
    #[error("version bytes 0x{0:02x?} don't match this network's xpub version")]
    BadXPubVersionBytes([u8; 4]),

    /// Unrecognized WIF version byte.
    #[error("WIF version byte 0x{0:02x} doesn't match this network")]
    BadWifVersionByte(u8),

    /// Unrecognized address version byte.
    #[error("address version byte 0x{0:02x} doesn't match this network")]
    BadAddressVersionByte(u8),

    /// A derivation-path component that is not an index.
    #[error("malformatted derivation index: {0}")]
    MalformattedIndex(String),

    /// Bad padding byte on a serialized xpriv.
    #[error("expected 0 padding byte, got {0}")]
    BadPadding(u8),

    /// A base58check payload of the wrong length for its format.
    #[error("wrong payload length for {0}")]
    BadPayloadLength(&'static str),

    /// Error bubbled up from std::io.
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

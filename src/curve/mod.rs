/// The capability interface implemented by both backends.
pub mod model;

/// The native backend, wrapping the libsecp256k1 C bindings.
pub mod libsecp;

/// The software fallback backend, wrapping k256.
pub mod rust_secp;

pub use libsecp::LibsecpBackend;
pub use model::CurveBackend;
pub use rust_secp::RustSecpBackend;

fn select(native: bool) -> &'static dyn CurveBackend {
    if native {
        LibsecpBackend::static_ref()
    } else {
        RustSecpBackend::static_ref()
    }
}

/// Per-operation-class backend selection, injected at key construction.
///
/// Each flag independently picks the native libsecp path (`true`) or the
/// pure-Rust fallback (`false`) for one class of operation, so a
/// misbehaving native path can be turned off for a single class without
/// disabling the rest. The config is a plain `Copy` value carried by the
/// keys it was used to construct; there is no ambient global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendConfig {
    /// Native path for private-key to public-key derivation.
    pub native_pubkey_derivation: bool,
    /// Native path for signing and public-key recovery.
    pub native_signing: bool,
    /// Native path for homomorphic key offsetting.
    pub native_key_offsetting: bool,
    /// Native path for public-only (xpub) child derivation.
    pub native_xpub_derivation: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::all_native()
    }
}

impl BackendConfig {
    /// Run every operation class on the native backend.
    pub const fn all_native() -> Self {
        Self {
            native_pubkey_derivation: true,
            native_signing: true,
            native_key_offsetting: true,
            native_xpub_derivation: true,
        }
    }

    /// Run every operation class on the software fallback.
    pub const fn all_software() -> Self {
        Self {
            native_pubkey_derivation: false,
            native_signing: false,
            native_key_offsetting: false,
            native_xpub_derivation: false,
        }
    }

    pub(crate) fn pubkey_derivation(&self) -> &'static dyn CurveBackend {
        select(self.native_pubkey_derivation)
    }

    pub(crate) fn signing(&self) -> &'static dyn CurveBackend {
        select(self.native_signing)
    }

    pub(crate) fn key_offsetting(&self) -> &'static dyn CurveBackend {
        select(self.native_key_offsetting)
    }

    pub(crate) fn xpub_derivation(&self) -> &'static dyn CurveBackend {
        select(self.native_xpub_derivation)
    }

    /// Scalar addition during private child derivation is plain modular
    /// arithmetic with no native/software split; it always runs on the
    /// software path.
    pub(crate) fn privkey_derivation(&self) -> &'static dyn CurveBackend {
        RustSecpBackend::static_ref()
    }
}

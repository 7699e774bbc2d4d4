use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    curve::BackendConfig,
    enc::NetworkEncoder,
    xkeys::{XPriv, XPub},
};

/// The network encoder selected by the crate's feature flags. The
/// `testnet` feature overrides `mainnet` when both are enabled.
#[cfg(all(feature = "mainnet", not(feature = "testnet")))]
pub type Encoder = crate::enc::MainnetEncoder;

/// The network encoder selected by the crate's feature flags.
#[cfg(feature = "testnet")]
pub type Encoder = crate::enc::TestnetEncoder;

impl Serialize for XPriv {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let encoded =
            Encoder::xpriv_to_base58(self).map_err(|e| serde::ser::Error::custom(e.to_string()))?;
        serializer.serialize_str(&encoded)
    }
}

impl<'de> Deserialize<'de> for XPriv {
    fn deserialize<D>(deserializer: D) -> Result<XPriv, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: &str = Deserialize::deserialize(deserializer)?;
        Encoder::xpriv_from_base58(s, BackendConfig::default())
            .map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

impl Serialize for XPub {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let encoded =
            Encoder::xpub_to_base58(self).map_err(|e| serde::ser::Error::custom(e.to_string()))?;
        serializer.serialize_str(&encoded)
    }
}

impl<'de> Deserialize<'de> for XPub {
    fn deserialize<D>(deserializer: D) -> Result<XPub, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: &str = Deserialize::deserialize(deserializer)?;
        Encoder::xpub_from_base58(s, BackendConfig::default())
            .map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn extended_keys_serde_as_base58_strings() {
        let xpriv = XPriv::master_from_seed(&[0x42; 32], BackendConfig::default()).unwrap();
        let xpub = xpriv.to_xpub().unwrap();

        let ser = serde_json::to_string(&xpriv).unwrap();
        assert_eq!(ser, format!("\"{}\"", Encoder::xpriv_to_base58(&xpriv).unwrap()));
        let deser: XPriv = serde_json::from_str(&ser).unwrap();
        assert_eq!(deser, xpriv);

        let ser = serde_json::to_string(&xpub).unwrap();
        let deser: XPub = serde_json::from_str(&ser).unwrap();
        assert_eq!(deser, xpub);
    }

    #[test]
    fn garbage_strings_fail_deserialization() {
        assert!(serde_json::from_str::<XPriv>("\"not an xpriv\"").is_err());
        assert!(serde_json::from_str::<XPub>("\"xpub but wrong\"").is_err());
    }
}

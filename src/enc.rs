use std::marker::PhantomData;

use crate::{
    curve::BackendConfig,
    hashes::hash256,
    keys::{PrivateKey, PublicKey},
    xkeys::{ChainCode, KeyFingerprint, XKeyInfo, XPriv, XPub},
    KeyError,
};

/// Decode a bytevector from a base58check string.
pub fn decode_b58_check(s: &str) -> Result<Vec<u8>, KeyError> {
    let data: Vec<u8> = bs58::decode(s).into_vec()?;
    let idx = data
        .len()
        .checked_sub(4)
        .ok_or(KeyError::ChecksumMismatch)?;
    let payload = &data[..idx];
    let checksum = &data[idx..];

    let mut expected = [0u8; 4];
    expected.copy_from_slice(&hash256(payload)[..4]);
    if expected != checksum {
        Err(KeyError::ChecksumMismatch)
    } else {
        Ok(payload.to_vec())
    }
}

/// Encode a vec into a base58check String.
pub fn encode_b58_check(v: &[u8]) -> String {
    let mut checksum = [0u8; 4];
    checksum.copy_from_slice(&hash256(v)[..4]);

    let mut data = v.to_vec();
    data.extend(&checksum);

    bs58::encode(data).into_string()
}

/// The two address interpretations this system distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressType {
    /// A standard hash160-of-pubkey address.
    Common,
    /// The raw pay-to-key hash interpretation of historical addresses.
    PayToKey,
}

/// A tagged key hash. Two addresses with the same hash but different
/// types are NOT equal; the type is part of the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    kind: AddressType,
    hash: [u8; 20],
}

impl Address {
    /// Tag a 20-byte key hash with an address type.
    pub fn new(kind: AddressType, hash: [u8; 20]) -> Self {
        Self { kind, hash }
    }

    /// The address type.
    pub fn kind(&self) -> AddressType {
        self.kind
    }

    /// The raw 20-byte hash.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.hash
    }

    /// Tag a raw hash slice. Fails unless it is exactly 20 bytes.
    pub fn from_bytes(kind: AddressType, bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != 20 {
            return Err(KeyError::BadPayloadLength("address"));
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(bytes);
        Ok(Self { kind, hash })
    }
}

/// Contains network-specific serialization information.
pub trait NetworkParams {
    /// The xpriv version bytes.
    const PRIV_VERSION: u32;
    /// The xpub version bytes.
    const PUB_VERSION: u32;
    /// The WIF private-key version byte.
    const WIF_VERSION: u8;
    /// The base58check version byte for common addresses.
    const COMMON_ADDR_VERSION: u8;
    /// The base58check version byte for legacy pay-to-key addresses.
    const P2KEY_ADDR_VERSION: u8;
}

/// Network-differentiated encoder for keys and addresses. The
/// production/test choice is the encoder type itself; it is never stored
/// in the key objects.
pub trait NetworkEncoder<P: NetworkParams> {
    #[doc(hidden)]
    fn write_key_details<W>(writer: &mut W, info: &XKeyInfo) -> Result<usize, KeyError>
    where
        W: std::io::Write,
    {
        let mut written = writer.write(&[info.depth])?;
        written += writer.write(&info.parent.0)?;
        written += writer.write(&info.index.to_be_bytes())?;
        written += writer.write(&info.chain_code.0)?;
        Ok(written)
    }

    /// Serialize an xpub to `std::io::Write`.
    fn write_xpub<W>(writer: &mut W, key: &XPub) -> Result<usize, KeyError>
    where
        W: std::io::Write,
    {
        let mut written = writer.write(&P::PUB_VERSION.to_be_bytes())?;
        written += Self::write_key_details(writer, &key.info)?;
        written += writer.write(&key.key.serialize_compressed())?;
        Ok(written)
    }

    /// Serialize an xpriv to `std::io::Write`.
    fn write_xpriv<W>(writer: &mut W, key: &XPriv) -> Result<usize, KeyError>
    where
        W: std::io::Write,
    {
        let mut written = writer.write(&P::PRIV_VERSION.to_be_bytes())?;
        written += Self::write_key_details(writer, &key.info)?;
        written += writer.write(&[0])?;
        written += writer.write(&key.key.secret_bytes())?;
        Ok(written)
    }

    #[doc(hidden)]
    fn read_key_details<R>(reader: &mut R) -> Result<(u8, KeyFingerprint, u32, ChainCode), KeyError>
    where
        R: std::io::Read,
    {
        let mut depth = [0u8; 1];
        reader.read_exact(&mut depth)?;

        let mut parent = [0u8; 4];
        reader.read_exact(&mut parent)?;

        let mut index = [0u8; 4];
        reader.read_exact(&mut index)?;

        let mut chain_code = [0u8; 32];
        reader.read_exact(&mut chain_code)?;

        Ok((
            depth[0],
            parent.into(),
            u32::from_be_bytes(index),
            chain_code.into(),
        ))
    }

    /// Attempt to instantiate an `XPriv` from a `std::io::Read`.
    fn read_xpriv<R>(reader: &mut R, config: BackendConfig) -> Result<XPriv, KeyError>
    where
        R: std::io::Read,
    {
        let mut version = [0u8; 4];
        reader.read_exact(&mut version)?;
        if u32::from_be_bytes(version) != P::PRIV_VERSION {
            return Err(KeyError::BadXPrivVersionBytes(version));
        }

        let (depth, parent, index, chain_code) = Self::read_key_details(reader)?;

        let mut padding = [0u8];
        reader.read_exact(&mut padding)?;
        if padding != [0] {
            return Err(KeyError::BadPadding(padding[0]));
        }

        let mut scalar = [0u8; 32];
        reader.read_exact(&mut scalar)?;
        let key = PrivateKey::from_bytes(&scalar, true, config)?;

        Ok(XPriv::new(
            XKeyInfo {
                depth,
                parent,
                index,
                chain_code,
            },
            key,
        ))
    }

    /// Attempt to instantiate an `XPub` from a `std::io::Read`.
    fn read_xpub<R>(reader: &mut R, config: BackendConfig) -> Result<XPub, KeyError>
    where
        R: std::io::Read,
    {
        let mut version = [0u8; 4];
        reader.read_exact(&mut version)?;
        if u32::from_be_bytes(version) != P::PUB_VERSION {
            return Err(KeyError::BadXPubVersionBytes(version));
        }

        let (depth, parent, index, chain_code) = Self::read_key_details(reader)?;

        let mut point = [0u8; 33];
        reader.read_exact(&mut point)?;
        let key = PublicKey::from_bytes(&point, config)?;

        Ok(XPub::new(
            XKeyInfo {
                depth,
                parent,
                index,
                chain_code,
            },
            key,
        ))
    }

    /// Serialize an XPriv to base58check.
    fn xpriv_to_base58(key: &XPriv) -> Result<String, KeyError> {
        let mut v: Vec<u8> = vec![];
        Self::write_xpriv(&mut v, key)?;
        Ok(encode_b58_check(&v))
    }

    /// Serialize an XPub to base58check.
    fn xpub_to_base58(key: &XPub) -> Result<String, KeyError> {
        let mut v: Vec<u8> = vec![];
        Self::write_xpub(&mut v, key)?;
        Ok(encode_b58_check(&v))
    }

    /// Attempt to read an XPriv from a base58check string.
    fn xpriv_from_base58(s: &str, config: BackendConfig) -> Result<XPriv, KeyError> {
        let data = decode_b58_check(s)?;
        if data.len() != 78 {
            return Err(KeyError::BadPayloadLength("xpriv"));
        }
        Self::read_xpriv(&mut &data[..], config)
    }

    /// Attempt to read an XPub from a base58check string.
    fn xpub_from_base58(s: &str, config: BackendConfig) -> Result<XPub, KeyError> {
        let data = decode_b58_check(s)?;
        if data.len() != 78 {
            return Err(KeyError::BadPayloadLength("xpub"));
        }
        Self::read_xpub(&mut &data[..], config)
    }

    /// Serialize a private key to WIF. A trailing 0x01 marks a key whose
    /// public key serializes compressed.
    fn privkey_to_wif(key: &PrivateKey) -> String {
        let mut v: Vec<u8> = vec![P::WIF_VERSION];
        v.extend(key.secret_bytes());
        if key.compressed() {
            v.push(1);
        }
        encode_b58_check(&v)
    }

    /// Attempt to read a private key from a WIF string, recovering both
    /// the scalar and the compression flag.
    fn privkey_from_wif(s: &str, config: BackendConfig) -> Result<PrivateKey, KeyError> {
        let data = decode_b58_check(s)?;
        if data.is_empty() {
            return Err(KeyError::BadPayloadLength("WIF"));
        }
        if data[0] != P::WIF_VERSION {
            return Err(KeyError::BadWifVersionByte(data[0]));
        }

        let compressed = match data.len() {
            33 => false,
            34 if data[33] == 1 => true,
            _ => return Err(KeyError::BadPayloadLength("WIF")),
        };

        let mut scalar = [0u8; 32];
        scalar.copy_from_slice(&data[1..33]);
        Ok(PrivateKey::from_bytes(&scalar, compressed, config)?)
    }

    /// Serialize an address to its base58check string form.
    fn address_to_base58(addr: &Address) -> String {
        let version = match addr.kind() {
            AddressType::Common => P::COMMON_ADDR_VERSION,
            AddressType::PayToKey => P::P2KEY_ADDR_VERSION,
        };
        let mut v: Vec<u8> = vec![version];
        v.extend(addr.as_bytes());
        encode_b58_check(&v)
    }

    /// Attempt to read an address from a base58check string, recovering
    /// the address type from the version byte.
    fn address_from_base58(s: &str) -> Result<Address, KeyError> {
        let data = decode_b58_check(s)?;
        if data.len() != 21 {
            return Err(KeyError::BadPayloadLength("address"));
        }
        let kind = if data[0] == P::COMMON_ADDR_VERSION {
            AddressType::Common
        } else if data[0] == P::P2KEY_ADDR_VERSION {
            AddressType::PayToKey
        } else {
            return Err(KeyError::BadAddressVersionByte(data[0]));
        };
        Address::from_bytes(kind, &data[1..])
    }
}

macro_rules! params {
    (
        $(#[$outer:meta])*
        $name:ident{
            xpriv: $xpriv:expr,
            xpub: $xpub:expr,
            wif: $wif:expr,
            addr: $addr:expr,
            p2key_addr: $p2key:expr
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone)]
        pub struct $name;

        impl NetworkParams for $name {
            const PRIV_VERSION: u32 = $xpriv;
            const PUB_VERSION: u32 = $xpub;
            const WIF_VERSION: u8 = $wif;
            const COMMON_ADDR_VERSION: u8 = $addr;
            const P2KEY_ADDR_VERSION: u8 = $p2key;
        }
    };
}

params!(
    /// Production (mainnet) encoding parameters.
    Main {
        xpriv: 0x0488_ADE4,
        xpub: 0x0488_B21E,
        wif: 0x80,
        addr: 0x00,
        p2key_addr: 0x05
    }
);

params!(
    /// Test-network encoding parameters.
    Test {
        xpriv: 0x0435_8394,
        xpub: 0x0435_87CF,
        wif: 0xEF,
        addr: 0x6F,
        p2key_addr: 0xC4
    }
);

/// Parameterizable encoder for Bitcoin-style networks.
#[derive(Debug, Clone)]
pub struct BitcoinEncoder<P: NetworkParams>(PhantomData<*const P>);

impl<P: NetworkParams> NetworkEncoder<P> for BitcoinEncoder<P> {}

/// Encoder for production keys and addresses (`xprv`/`xpub`).
pub type MainnetEncoder = BitcoinEncoder<Main>;
/// Encoder for test-network keys and addresses (`tprv`/`tpub`).
pub type TestnetEncoder = BitcoinEncoder<Test>;

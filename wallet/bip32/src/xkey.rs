//! Codec for serialized extended keys (i.e. `xprv` and `xpub`)

use crate::{ChildNumber, Error, ExtendedKeyAttrs, Prefix, Result, Version, KEY_SIZE};
use core::{
    fmt::{self, Display},
    str::{self, FromStr},
};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

/// Serialized extended key (e.g. `xprv` and `xpub`).
///
/// Binary layout (82 bytes):
///
/// | offset | size | field                                   |
/// |--------|------|-----------------------------------------|
/// | 0      | 4    | version                                 |
/// | 4      | 1    | depth                                   |
/// | 5      | 4    | parent fingerprint                      |
/// | 9      | 4    | child number (big-endian)               |
/// | 13     | 32   | chain code                              |
/// | 45     | 33   | `0x00 ‖ private key` or public key      |
/// | 78     | 4    | first 4 bytes of `SHA256(SHA256(0..78))`|
#[derive(Clone)]
pub struct ExtendedKey {
    /// Version of the key, chosen by the caller (e.g. [`Prefix::XPRV`]).
    pub version: Version,

    /// Extended key attributes.
    pub attrs: ExtendedKeyAttrs,

    /// Key material (may be public or private).
    ///
    /// Includes an extra byte for a public key's SEC1 tag.
    pub key_bytes: [u8; KEY_SIZE + 1],
}

impl ExtendedKey {
    /// Size of the checksummed part of the serialized key.
    pub const PAYLOAD_SIZE: usize = 78;

    /// Size of the embedded checksum.
    pub const CHECKSUM_SIZE: usize = 4;

    /// Size of a serialized extended key including its checksum.
    pub const BYTE_SIZE: usize = Self::PAYLOAD_SIZE + Self::CHECKSUM_SIZE;

    /// Maximum size of a Base58-encoded extended key in bytes.
    pub const MAX_BASE58_SIZE: usize = 112;

    /// Known [`Prefix`] for this key's version, if any.
    pub fn prefix(&self) -> Option<Prefix> {
        Prefix::from_version(self.version)
    }

    /// Does this key carry a private payload?
    ///
    /// Decided by the version when it is a known one; otherwise by the
    /// `0x00` pad that precedes a private key in the key field.
    pub fn is_private(&self) -> bool {
        match self.prefix() {
            Some(prefix) => prefix.is_private(),
            None => self.key_bytes[0] == 0,
        }
    }

    /// Serialize into the 82-byte binary layout.
    pub fn to_bytes(&self) -> Zeroizing<[u8; Self::BYTE_SIZE]> {
        let mut bytes = Zeroizing::new([0u8; Self::BYTE_SIZE]);
        bytes[..4].copy_from_slice(&self.version.to_be_bytes());
        bytes[4] = self.attrs.depth;
        bytes[5..9].copy_from_slice(&self.attrs.parent_fingerprint);
        bytes[9..13].copy_from_slice(&self.attrs.child_number.to_bytes());
        bytes[13..45].copy_from_slice(&self.attrs.chain_code);
        bytes[45..78].copy_from_slice(&self.key_bytes);

        let checksum = checksum(&bytes[..Self::PAYLOAD_SIZE]);
        bytes[Self::PAYLOAD_SIZE..].copy_from_slice(&checksum);
        bytes
    }

    /// Parse the 82-byte binary layout, verifying the embedded checksum.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::BYTE_SIZE {
            return Err(Error::InvalidLength(bytes.len(), Self::BYTE_SIZE));
        }

        let (payload, expected) = bytes.split_at(Self::PAYLOAD_SIZE);
        if checksum(payload) != expected {
            return Err(Error::ChecksumMismatch);
        }

        let mut version = [0u8; 4];
        let mut parent_fingerprint = [0u8; 4];
        let mut child_number = [0u8; 4];
        let mut chain_code = [0u8; KEY_SIZE];
        let mut key_bytes = [0u8; KEY_SIZE + 1];

        version.copy_from_slice(&payload[..4]);
        parent_fingerprint.copy_from_slice(&payload[5..9]);
        child_number.copy_from_slice(&payload[9..13]);
        chain_code.copy_from_slice(&payload[13..45]);
        key_bytes.copy_from_slice(&payload[45..78]);

        let attrs = ExtendedKeyAttrs {
            depth: payload[4],
            parent_fingerprint,
            child_number: ChildNumber::from_bytes(child_number),
            chain_code,
        };

        Ok(ExtendedKey { version: Version::from_be_bytes(version), attrs, key_bytes })
    }

    /// Write a Base58-encoded key to the provided buffer, returning a `&str`
    /// containing the serialized data.
    ///
    /// Note that this type also impls [`Display`] and therefore you can
    /// obtain an owned string by calling `to_string()`.
    pub fn write_base58<'a>(&self, buffer: &'a mut [u8; Self::MAX_BASE58_SIZE]) -> Result<&'a str> {
        let bytes = self.to_bytes();
        let base58_len = bs58::encode(&bytes[..]).onto(buffer.as_mut())?;
        Ok(str::from_utf8(&buffer[..base58_len])?)
    }
}

/// First four bytes of `SHA256(SHA256(payload))`.
fn checksum(payload: &[u8]) -> [u8; ExtendedKey::CHECKSUM_SIZE] {
    let digest = Sha256::digest(Sha256::digest(payload));
    let mut checksum = [0u8; ExtendedKey::CHECKSUM_SIZE];
    checksum.copy_from_slice(&digest[..ExtendedKey::CHECKSUM_SIZE]);
    checksum
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("version", &format_args!("{:#010x}", self.version))
            .field("attrs", &self.attrs)
            .field("private", &self.is_private())
            .finish_non_exhaustive()
    }
}

impl Display for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0u8; Self::MAX_BASE58_SIZE];
        let result = self.write_base58(&mut buf).map_err(|_| fmt::Error).and_then(|base58| f.write_str(base58));
        buf.zeroize();
        result
    }
}

impl FromStr for ExtendedKey {
    type Err = Error;

    fn from_str(base58: &str) -> Result<Self> {
        let bytes = Zeroizing::new(bs58::decode(base58).into_vec()?);
        ExtendedKey::from_bytes(&bytes)
    }
}

impl TryFrom<&[u8]> for ExtendedKey {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        ExtendedKey::from_bytes(bytes)
    }
}

impl Drop for ExtendedKey {
    fn drop(&mut self) {
        self.key_bytes.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::ExtendedKey;
    use crate::{ChildNumber, Error, Prefix};
    use faster_hex::hex_decode_fallback;

    macro_rules! hex {
        ($str: literal) => {{
            let len = $str.as_bytes().len() / 2;
            let mut dst = vec![0; len];
            hex_decode_fallback($str.as_bytes(), &mut dst);
            dst
        }
        [..]};
    }

    const XPRV_M: &str =
        "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi";
    const XPUB_M: &str =
        "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8";

    #[test]
    fn bip32_test_vector_1_xprv() {
        let xprv = XPRV_M.parse::<ExtendedKey>();
        assert!(xprv.is_ok(), "Could not parse key");
        let xprv = xprv.unwrap();
        assert_eq!(xprv.prefix(), Some(Prefix::XPRV));
        assert!(xprv.is_private());
        assert_eq!(xprv.attrs.depth, 0);
        assert_eq!(xprv.attrs.parent_fingerprint, [0u8; 4]);
        assert_eq!(xprv.attrs.child_number.0, 0);
        assert_eq!(xprv.attrs.chain_code, hex!("873DFF81C02F525623FD1FE5167EAC3A55A049DE3D314BB42EE227FFED37D508"));
        assert_eq!(xprv.key_bytes, hex!("00E8F32E723DECF4051AEFAC8E2C93C9C5B214313817CDB01A1494B917C8436B35"));
        assert_eq!(&xprv.to_string(), XPRV_M);
    }

    #[test]
    fn bip32_test_vector_1_xpub() {
        let xpub = XPUB_M.parse::<ExtendedKey>();
        assert!(xpub.is_ok(), "Could not parse key");
        let xpub = xpub.unwrap();
        assert_eq!(xpub.prefix(), Some(Prefix::XPUB));
        assert!(!xpub.is_private());
        assert_eq!(xpub.attrs.depth, 0);
        assert_eq!(xpub.attrs.parent_fingerprint, [0u8; 4]);
        assert_eq!(xpub.attrs.child_number.0, 0);
        assert_eq!(xpub.attrs.chain_code, hex!("873DFF81C02F525623FD1FE5167EAC3A55A049DE3D314BB42EE227FFED37D508"));
        assert_eq!(xpub.key_bytes, hex!("0339A36013301597DAEF41FBE593A02CC513D0B55527EC2DF1050E2E8FF49C85C2"));
        assert_eq!(&xpub.to_string(), XPUB_M);
    }

    #[test]
    fn binary_layout() {
        let key = XPUB_M.parse::<ExtendedKey>().unwrap();
        let bytes = key.to_bytes();

        assert_eq!(bytes.len(), ExtendedKey::BYTE_SIZE);
        assert_eq!(&bytes[..4], &Prefix::XPUB.to_bytes());
        assert_eq!(&bytes[45..78], &key.key_bytes);
        assert_eq!(ExtendedKey::from_bytes(bytes.as_ref()).unwrap().to_bytes(), bytes);
    }

    #[test]
    fn invalid_length() {
        let bytes = XPUB_M.parse::<ExtendedKey>().unwrap().to_bytes();
        assert_eq!(ExtendedKey::from_bytes(&bytes[..81]).unwrap_err(), Error::InvalidLength(81, 82));
        assert_eq!(ExtendedKey::from_bytes(&[]).unwrap_err(), Error::InvalidLength(0, 82));

        let mut longer = bytes.to_vec();
        longer.push(0);
        assert_eq!(ExtendedKey::from_bytes(&longer).unwrap_err(), Error::InvalidLength(83, 82));
    }

    #[test]
    fn checksum_tamper() {
        let bytes = XPRV_M.parse::<ExtendedKey>().unwrap().to_bytes();

        for bit in 0..32 {
            let mut tampered = *bytes;
            tampered[ExtendedKey::PAYLOAD_SIZE + bit / 8] ^= 1 << (bit % 8);
            assert_eq!(ExtendedKey::from_bytes(&tampered).unwrap_err(), Error::ChecksumMismatch);
        }

        let mut tampered = *bytes;
        tampered[4] ^= 1;
        assert_eq!(ExtendedKey::from_bytes(&tampered).unwrap_err(), Error::ChecksumMismatch);
    }

    #[test]
    fn base58_checksum_tamper() {
        // last character of a valid key swapped
        let tampered = format!("{}9", &XPUB_M[..XPUB_M.len() - 1]);
        assert!(tampered.parse::<ExtendedKey>().is_err());
        assert!(matches!("0OIl".parse::<ExtendedKey>(), Err(Error::Base58(_))));
    }

    #[test]
    fn hardened_child_number_is_big_endian() {
        let mut key = XPUB_M.parse::<ExtendedKey>().unwrap();
        key.attrs.child_number = ChildNumber::new(0, true);
        assert_eq!(&key.to_bytes()[9..13], &[0x80, 0, 0, 0]);
    }

    #[test]
    fn unknown_version_falls_back_to_key_field() {
        let mut key = XPRV_M.parse::<ExtendedKey>().unwrap();
        key.version = 0x038f_2ef4;
        assert_eq!(key.prefix(), None);
        assert!(key.is_private());

        let decoded = ExtendedKey::from_bytes(key.to_bytes().as_ref()).unwrap();
        assert_eq!(decoded.version, 0x038f_2ef4);
        assert!(decoded.is_private());
    }
}

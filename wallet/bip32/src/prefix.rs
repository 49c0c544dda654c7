//! Extended key prefixes (a.k.a. "versions").

use crate::{Error, Result, Version};
use core::{
    fmt::{self, Debug, Display},
    str,
};

/// Extended key prefix: the 4-byte version placed at the front of a
/// serialized key together with the four Base58 characters it produces.
///
/// The version is always chosen by the caller; it is never computed from
/// the key material.
#[derive(Copy, Clone, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Prefix {
    /// Base58 prefix characters.
    chars: &'static str,

    /// Version bytes as a big-endian integer.
    version: Version,
}

impl Prefix {
    /// Length of a prefix in Base58 characters.
    pub const LENGTH: usize = 4;

    /// `tprv` prefix (testnet private key).
    pub const TPRV: Self = Self::from_parts_unchecked("tprv", 0x0435_8394);

    /// `tpub` prefix (testnet public key).
    pub const TPUB: Self = Self::from_parts_unchecked("tpub", 0x0435_87CF);

    /// `xprv` prefix (mainnet private key).
    pub const XPRV: Self = Self::from_parts_unchecked("xprv", 0x0488_ADE4);

    /// `xpub` prefix (mainnet public key).
    pub const XPUB: Self = Self::from_parts_unchecked("xpub", 0x0488_B21E);

    /// `yprv` prefix (SLIP-132 nested segwit private key).
    pub const YPRV: Self = Self::from_parts_unchecked("yprv", 0x049D_7878);

    /// `ypub` prefix (SLIP-132 nested segwit public key).
    pub const YPUB: Self = Self::from_parts_unchecked("ypub", 0x049D_7CB2);

    /// `zprv` prefix (SLIP-132 native segwit private key).
    pub const ZPRV: Self = Self::from_parts_unchecked("zprv", 0x04B2_430C);

    /// `zpub` prefix (SLIP-132 native segwit public key).
    pub const ZPUB: Self = Self::from_parts_unchecked("zpub", 0x04B2_4746);

    /// Every prefix this crate knows by name.
    pub const KNOWN: [Self; 8] =
        [Self::XPRV, Self::XPUB, Self::TPRV, Self::TPUB, Self::YPRV, Self::YPUB, Self::ZPRV, Self::ZPUB];

    /// Create a prefix from its Base58 characters and version number.
    ///
    /// Nothing checks that `version` actually encodes to `s`; this is for
    /// custom networks whose constants are known ahead of time.
    ///
    /// # Panics
    ///
    /// Panics if `s` is not exactly four bytes long.
    pub const fn from_parts_unchecked(s: &'static str, version: Version) -> Self {
        assert!(s.len() == Self::LENGTH, "prefix must be 4 characters");
        Self { chars: s, version }
    }

    /// Look up a known prefix by its version number.
    pub fn from_version(version: Version) -> Option<Self> {
        Self::KNOWN.into_iter().find(|prefix| prefix.version == version)
    }

    /// Prefix characters.
    pub fn as_str(&self) -> &'static str {
        self.chars
    }

    /// Is this a public key prefix?
    pub fn is_public(self) -> bool {
        self.chars.ends_with("pub")
    }

    /// Is this a private key prefix?
    pub fn is_private(self) -> bool {
        self.chars.ends_with("prv")
    }

    /// Public prefix of the same network and script family, e.g. `xpub`
    /// for `xprv`. Public prefixes map to themselves.
    pub fn public_counterpart(self) -> Option<Self> {
        match self {
            Self::XPRV | Self::XPUB => Some(Self::XPUB),
            Self::TPRV | Self::TPUB => Some(Self::TPUB),
            Self::YPRV | Self::YPUB => Some(Self::YPUB),
            Self::ZPRV | Self::ZPUB => Some(Self::ZPUB),
            _ => None,
        }
    }

    /// Version number.
    pub fn version(self) -> Version {
        self.version
    }

    /// Version as big-endian bytes.
    pub fn to_bytes(self) -> [u8; 4] {
        self.version.to_be_bytes()
    }
}

impl AsRef<str> for Prefix {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Debug for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prefix").field("chars", &self.chars).field("version", &format_args!("{:#010x}", self.version)).finish()
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Prefix> for Version {
    fn from(prefix: Prefix) -> Version {
        prefix.version
    }
}

impl TryFrom<&str> for Prefix {
    type Error = Error;

    fn try_from(prefix: &str) -> Result<Self> {
        Self::KNOWN.into_iter().find(|known| known.as_str() == prefix).ok_or_else(|| Error::UnknownPrefix(prefix.to_string()))
    }
}

impl str::FromStr for Prefix {
    type Err = Error;

    fn from_str(prefix: &str) -> Result<Self> {
        Self::try_from(prefix)
    }
}

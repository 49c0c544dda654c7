use crate::{ChainCode, ChildNumber, Depth, Error, KeyFingerprint, Result};
use borsh::{BorshDeserialize, BorshSerialize};

/// Extended key attributes: fields common to extended keys including depth,
/// fingerprints, child numbers, and chain codes.
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, BorshSerialize, BorshDeserialize)]
pub struct ExtendedKeyAttrs {
    /// Depth in the key derivation hierarchy.
    pub depth: Depth,

    /// Parent fingerprint.
    pub parent_fingerprint: KeyFingerprint,

    /// Child number.
    pub child_number: ChildNumber,

    /// Chain code.
    pub chain_code: ChainCode,
}

impl ExtendedKeyAttrs {
    /// Attributes of a master key: depth 0, no parent, child number 0.
    pub fn root(chain_code: ChainCode) -> Self {
        Self { depth: 0, parent_fingerprint: KeyFingerprint::default(), child_number: ChildNumber::default(), chain_code }
    }

    /// Depth a child of this key would have.
    pub(crate) fn child_depth(&self) -> Result<Depth> {
        self.depth.checked_add(1).ok_or(Error::DepthOverflow)
    }
}

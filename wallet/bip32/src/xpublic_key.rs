//! Extended public keys
//!
use crate::derivation::{derive_with_retry, hmac_for, split_hmac};
use crate::{
    ChainCode, ChildNumber, DerivationPath, Error, ExtendedKey, ExtendedKeyAttrs, ExtendedPrivateKey, KeyFingerprint, Prefix,
    PrivateKey, PublicKey, PublicKeyBytes, Result,
};
use core::ops::Range;
use core::str::FromStr;
use hmac::Mac;
use log::trace;
use rayon::prelude::*;

/// Extended public keys derived using BIP32.
///
/// Generic around a [`PublicKey`] type. Only non-hardened children can be
/// derived from an extended public key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExtendedPublicKey<K: PublicKey> {
    /// Derived public key
    pub public_key: K,

    /// Extended key attributes.
    pub attrs: ExtendedKeyAttrs,
}

impl<K> ExtendedPublicKey<K>
where
    K: PublicKey,
{
    /// Obtain the non-extended public key value `K`.
    pub fn public_key(&self) -> &K {
        &self.public_key
    }

    /// Get attributes for this key such as depth, parent fingerprint,
    /// child number, and chain code.
    pub fn attrs(&self) -> &ExtendedKeyAttrs {
        &self.attrs
    }

    /// Compute a 4-byte key fingerprint for this extended public key.
    pub fn fingerprint(&self) -> KeyFingerprint {
        self.public_key().fingerprint()
    }

    /// Derive a child key for a particular [`ChildNumber`].
    ///
    /// Hardened child numbers fail with [`Error::HardenedPublicDerivation`].
    pub fn derive_child(&self, child_number: ChildNumber) -> Result<Self> {
        if child_number.is_hardened() {
            // Cannot derive child public keys for hardened `ChildNumber`s
            return Err(Error::HardenedPublicDerivation);
        }

        let depth = self.attrs.child_depth()?;

        let ((public_key, chain_code), child_number) =
            derive_with_retry(child_number, |candidate| self.derive_candidate(candidate))?;

        trace!("derived public child {child_number} at depth {depth}");

        let attrs = ExtendedKeyAttrs { parent_fingerprint: self.public_key.fingerprint(), child_number, chain_code, depth };

        Ok(ExtendedPublicKey { public_key, attrs })
    }

    fn derive_candidate(&self, child_number: ChildNumber) -> Result<Option<(K, ChainCode)>> {
        let mut hmac = hmac_for(&self.attrs.chain_code)?;

        hmac.update(&self.public_key.to_bytes());
        hmac.update(&child_number.to_bytes());

        let (child_key, chain_code) = split_hmac(hmac);
        Ok(self.public_key.derive_child(*child_key).map(|public_key| (public_key, chain_code)))
    }

    /// Derive every step of `path` starting from this key.
    pub fn derive_path(self, path: &DerivationPath) -> Result<Self> {
        path.iter().try_fold(self, |key, child_num| key.derive_child(child_num))
    }

    /// Serialize the raw public key as a byte array (e.g. SEC1-encoded).
    pub fn to_bytes(&self) -> PublicKeyBytes {
        self.public_key.to_bytes()
    }

    /// Serialize this key as an [`ExtendedKey`].
    pub fn to_extended_key(&self, prefix: Prefix) -> ExtendedKey {
        ExtendedKey { version: prefix.version(), attrs: self.attrs.clone(), key_bytes: self.to_bytes() }
    }

    pub fn to_string(&self, prefix: Option<Prefix>) -> String {
        let prefix = prefix.unwrap_or(Prefix::XPUB);
        self.to_extended_key(prefix).to_string()
    }

    pub fn from_public_key(public_key: K, attrs: &ExtendedKeyAttrs) -> Self {
        ExtendedPublicKey { public_key, attrs: attrs.clone() }
    }
}

impl<K> ExtendedPublicKey<K>
where
    K: PublicKey + Send + Sync,
{
    /// Derive the non-hardened children with indices in `indexes`, spread
    /// across the rayon thread pool.
    ///
    /// Fails as a whole if any single child fails.
    pub fn derive_children(&self, indexes: Range<u32>) -> Result<Vec<Self>> {
        indexes.into_par_iter().map(|index| self.derive_child(ChildNumber::new(index, false))).collect()
    }
}

impl<K> From<&ExtendedPrivateKey<K>> for ExtendedPublicKey<K::PublicKey>
where
    K: PrivateKey,
{
    fn from(xprv: &ExtendedPrivateKey<K>) -> ExtendedPublicKey<K::PublicKey> {
        ExtendedPublicKey { public_key: xprv.private_key().public_key(), attrs: xprv.attrs().clone() }
    }
}

impl<K> FromStr for ExtendedPublicKey<K>
where
    K: PublicKey,
{
    type Err = Error;

    fn from_str(xpub: &str) -> Result<Self> {
        ExtendedKey::from_str(xpub)?.try_into()
    }
}

impl<K> TryFrom<ExtendedKey> for ExtendedPublicKey<K>
where
    K: PublicKey,
{
    type Error = Error;

    fn try_from(extended_key: ExtendedKey) -> Result<ExtendedPublicKey<K>> {
        if extended_key.is_private() {
            return Err(Error::InvalidPublicKey);
        }

        Ok(ExtendedPublicKey { public_key: PublicKey::from_bytes(extended_key.key_bytes)?, attrs: extended_key.attrs.clone() })
    }
}

#[cfg(test)]
mod tests {
    use crate::{ChildNumber, Error, Prefix, XPrv, XPub};

    const XPUB_M_0H: &str =
        "xpub68Gmy5EdvgibQVfPdqkBBCHxA5htiqg55crXYuXoQRKfDBFA1WEjWgP6LHhwBZeNK1VTsfTFUHCdrfp1bgwQ9xv5ski8PX9rL2dZXvgGDnw";

    #[test]
    fn public_derivation_matches_test_vector() {
        // m/0'/1 from BIP32 test vector 1, derived without any private key
        let xpub = XPUB_M_0H.parse::<XPub>().unwrap();
        let child = xpub.derive_child(ChildNumber::new(1, false)).unwrap();
        assert_eq!(
            child.to_string(Some(Prefix::XPUB)),
            "xpub6ASuArnXKPbfEwhqN6e3mwBcDTgzisQN1wXN9BJcM47sSikHjJf3UFHKkNAWbWMiGj7Wf5uMash7SyYq527Hqck2AxYysAA7xmALppuCkwQ"
        );
    }

    #[test]
    fn hardened_children_are_impossible() {
        let xpub = XPUB_M_0H.parse::<XPub>().unwrap();
        assert_eq!(xpub.derive_child(ChildNumber::new(0, true)), Err(Error::HardenedPublicDerivation));
        assert_eq!(xpub.derive_child(ChildNumber(u32::MAX)), Err(Error::HardenedPublicDerivation));
    }

    #[test]
    fn neutered_children_match_private_children() {
        let xprv = XPrv::new([0x42u8; 32]).unwrap();
        let xpub = xprv.public_key();

        for index in [0, 1, 7, 1_000_000] {
            let child_number = ChildNumber::new(index, false);
            let private_child = xprv.derive_child(child_number).unwrap();
            let public_child = xpub.derive_child(child_number).unwrap();
            assert_eq!(private_child.public_key(), public_child);
        }
    }

    #[test]
    fn parallel_range_matches_sequential() {
        let xpub = XPrv::new([0x24u8; 32]).unwrap().public_key();
        let children = xpub.derive_children(0..16).unwrap();

        assert_eq!(children.len(), 16);
        for (index, child) in children.iter().enumerate() {
            assert_eq!(child, &xpub.derive_child(ChildNumber(index as u32)).unwrap());
        }
    }

    #[test]
    fn private_payload_is_not_a_public_key() {
        let xprv = "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi";
        assert_eq!(xprv.parse::<XPub>(), Err(Error::InvalidPublicKey));
    }
}

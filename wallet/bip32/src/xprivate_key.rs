//! Extended private keys

use crate::derivation::{derive_with_retry, hmac_for, split_hmac};
use crate::public_key::check_compressed;
use crate::{
    ChainCode, ChildNumber, DerivationPath, Depth, Error, ExtendedKey, ExtendedKeyAttrs, ExtendedPublicKey, HmacSha512,
    KeyFingerprint, Prefix, PrivateKey, PrivateKeyBytes, PublicKey, Result, KEY_SIZE,
};
use core::fmt::{self, Debug};
use core::str::FromStr;
use hmac::Mac;
use log::trace;
use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, Zeroizing};

/// Derivation domain separator for BIP32 master keys ("Bitcoin seed").
const MASTER_KEY_DOMAIN_SEPARATOR: [u8; 12] = *b"Bitcoin seed";

/// Extended private keys derived using BIP32.
///
/// Generic around a [`PrivateKey`] type. The private key material is erased
/// when the value is dropped.
#[derive(Clone)]
pub struct ExtendedPrivateKey<K: PrivateKey> {
    /// Derived private key
    private_key: K,

    /// Extended key attributes.
    attrs: ExtendedKeyAttrs,
}

impl<K> ExtendedPrivateKey<K>
where
    K: PrivateKey,
{
    /// Maximum derivation depth.
    pub const MAX_DEPTH: Depth = u8::MAX;

    /// Shortest seed accepted by [`ExtendedPrivateKey::new`].
    pub const MIN_SEED_SIZE: usize = 16;

    /// Create the root extended key for the given seed value.
    pub fn new<S>(seed: S) -> Result<Self>
    where
        S: AsRef<[u8]>,
    {
        let seed = seed.as_ref();
        if seed.len() < Self::MIN_SEED_SIZE {
            return Err(Error::InvalidSeed);
        }

        let mut hmac = HmacSha512::new_from_slice(&MASTER_KEY_DOMAIN_SEPARATOR)?;
        hmac.update(seed);

        let (secret_key, chain_code) = split_hmac(hmac);
        let private_key = K::from_bytes(&secret_key).map_err(|_| Error::InvalidSeed)?;
        check_compressed(&private_key.public_key().to_bytes()).map_err(|_| Error::InvalidSeed)?;

        Ok(ExtendedPrivateKey { private_key, attrs: ExtendedKeyAttrs::root(chain_code) })
    }

    /// Assemble an extended key from a private key and its attributes.
    pub fn from_parts(private_key: K, attrs: ExtendedKeyAttrs) -> Self {
        ExtendedPrivateKey { private_key, attrs }
    }

    /// Derive a child key for a particular [`ChildNumber`].
    ///
    /// If the candidate for `child_number` is invalid (probability below
    /// 2^-127) the next child number is used instead; the returned key's
    /// [`ExtendedKeyAttrs::child_number`] reflects the one that was used.
    pub fn derive_child(&self, child_number: ChildNumber) -> Result<Self> {
        let depth = self.attrs.child_depth()?;
        let public_key = self.private_key.public_key();

        let ((private_key, chain_code), child_number) =
            derive_with_retry(child_number, |candidate| self.derive_candidate(&public_key, candidate))?;
        check_compressed(&private_key.public_key().to_bytes())?;

        trace!("derived private child {child_number} at depth {depth}");

        let attrs = ExtendedKeyAttrs { parent_fingerprint: public_key.fingerprint(), child_number, chain_code, depth };

        Ok(ExtendedPrivateKey { private_key, attrs })
    }

    fn derive_candidate(&self, public_key: &K::PublicKey, child_number: ChildNumber) -> Result<Option<(K, ChainCode)>> {
        let mut hmac = hmac_for(&self.attrs.chain_code)?;

        if child_number.is_hardened() {
            let private_key_bytes = Zeroizing::new(self.private_key.to_bytes());
            hmac.update(&[0]);
            hmac.update(private_key_bytes.as_ref());
        } else {
            hmac.update(&public_key.to_bytes());
        }

        hmac.update(&child_number.to_bytes());

        let (child_key, chain_code) = split_hmac(hmac);
        Ok(self.private_key.derive_child(*child_key).map(|private_key| (private_key, chain_code)))
    }

    /// Derive every step of `path` starting from this key.
    pub fn derive_path(self, path: &DerivationPath) -> Result<Self> {
        path.iter().try_fold(self, |key, child_num| key.derive_child(child_num))
    }

    /// Borrow the derived private key value.
    pub fn private_key(&self) -> &K {
        &self.private_key
    }

    /// Serialize the derived public key as bytes.
    pub fn public_key(&self) -> ExtendedPublicKey<K::PublicKey> {
        self.into()
    }

    /// Get attributes for this key such as depth, parent fingerprint,
    /// child number, and chain code.
    pub fn attrs(&self) -> &ExtendedKeyAttrs {
        &self.attrs
    }

    /// Compute a 4-byte key fingerprint for this extended private key.
    pub fn fingerprint(&self) -> KeyFingerprint {
        self.private_key.public_key().fingerprint()
    }

    /// Serialize the raw private key as a byte array.
    pub fn to_bytes(&self) -> PrivateKeyBytes {
        self.private_key.to_bytes()
    }

    /// Serialize this key as an [`ExtendedKey`].
    pub fn to_extended_key(&self, prefix: Prefix) -> ExtendedKey {
        // Add leading `0` byte
        let mut key_bytes = [0u8; KEY_SIZE + 1];
        let mut private_key_bytes = self.to_bytes();
        key_bytes[1..].copy_from_slice(&private_key_bytes);
        private_key_bytes.zeroize();

        ExtendedKey { version: prefix.version(), attrs: self.attrs.clone(), key_bytes }
    }

    pub fn to_string(&self, prefix: Prefix) -> Zeroizing<String> {
        Zeroizing::new(self.to_extended_key(prefix).to_string())
    }
}

impl<K> Drop for ExtendedPrivateKey<K>
where
    K: PrivateKey,
{
    fn drop(&mut self) {
        self.private_key.erase();
    }
}

impl<K> ConstantTimeEq for ExtendedPrivateKey<K>
where
    K: PrivateKey,
{
    fn ct_eq(&self, other: &Self) -> Choice {
        let mut key_a = self.to_bytes();
        let mut key_b = other.to_bytes();

        let result = key_a.ct_eq(&key_b)
            & self.attrs.depth.ct_eq(&other.attrs.depth)
            & self.attrs.parent_fingerprint.ct_eq(&other.attrs.parent_fingerprint)
            & self.attrs.child_number.0.ct_eq(&other.attrs.child_number.0)
            & self.attrs.chain_code.ct_eq(&other.attrs.chain_code);

        key_a.zeroize();
        key_b.zeroize();

        result
    }
}

impl<K> Debug for ExtendedPrivateKey<K>
where
    K: PrivateKey,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedPrivateKey").field("private_key", &"...").field("attrs", &self.attrs).finish_non_exhaustive()
    }
}

/// NOTE: uses [`ConstantTimeEq`] internally
impl<K> Eq for ExtendedPrivateKey<K> where K: PrivateKey {}

/// NOTE: uses [`ConstantTimeEq`] internally
impl<K> PartialEq for ExtendedPrivateKey<K>
where
    K: PrivateKey,
{
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl<K> FromStr for ExtendedPrivateKey<K>
where
    K: PrivateKey,
{
    type Err = Error;

    fn from_str(xprv: &str) -> Result<Self> {
        ExtendedKey::from_str(xprv)?.try_into()
    }
}

impl<K> TryFrom<ExtendedKey> for ExtendedPrivateKey<K>
where
    K: PrivateKey,
{
    type Error = Error;

    fn try_from(extended_key: ExtendedKey) -> Result<ExtendedPrivateKey<K>> {
        if !extended_key.is_private() || extended_key.key_bytes[0] != 0 {
            return Err(Error::InvalidPrivateKey);
        }

        let mut private_key_bytes = Zeroizing::new([0u8; KEY_SIZE]);
        private_key_bytes.copy_from_slice(&extended_key.key_bytes[1..]);
        let private_key = K::from_bytes(&private_key_bytes)?;
        check_compressed(&private_key.public_key().to_bytes())?;

        Ok(ExtendedPrivateKey { private_key, attrs: extended_key.attrs.clone() })
    }
}

//! Trait for deriving child keys on a given type.

use crate::{Error, KeyFingerprint, PrivateKeyBytes, PublicKeyBytes, Result};
use ripemd::Ripemd160;
use secp256k1::{scalar::Scalar, SECP256K1};
use sha2::{Digest, Sha256};

/// SEC1 tags of a compressed point.
const COMPRESSED_TAGS: [u8; 2] = [0x02, 0x03];

/// Trait for key types which can be derived using BIP32.
pub trait PublicKey: Sized {
    /// Initialize this key from SEC1-compressed bytes.
    fn from_bytes(bytes: PublicKeyBytes) -> Result<Self>;

    /// Serialize this key as SEC1-compressed bytes.
    fn to_bytes(&self) -> PublicKeyBytes;

    /// Derive a child key from a parent key and the left half of the
    /// HMAC-SHA512 output (`IL`): `point(IL) + self`.
    ///
    /// Returns `None` when the candidate is unusable, i.e. `IL` is not below
    /// the curve order or the sum is the point at infinity.
    fn derive_child(&self, other: PrivateKeyBytes) -> Option<Self>;

    /// Compute a 4-byte key fingerprint for this public key.
    ///
    /// Default implementation uses `RIPEMD160(SHA256(public_key))`.
    fn fingerprint(&self) -> KeyFingerprint {
        let digest = Ripemd160::digest(Sha256::digest(self.to_bytes()));
        let mut fingerprint = KeyFingerprint::default();
        fingerprint.copy_from_slice(&digest[..4]);
        fingerprint
    }
}

/// Reject anything but a compressed SEC1 encoding before touching the curve.
pub(crate) fn check_compressed(bytes: &PublicKeyBytes) -> Result<()> {
    if COMPRESSED_TAGS.contains(&bytes[0]) { Ok(()) } else { Err(Error::InvalidPublicKey) }
}

impl PublicKey for secp256k1::PublicKey {
    fn from_bytes(bytes: PublicKeyBytes) -> Result<Self> {
        check_compressed(&bytes)?;
        secp256k1::PublicKey::from_slice(&bytes).map_err(|_| Error::InvalidPublicKey)
    }

    fn to_bytes(&self) -> PublicKeyBytes {
        self.serialize()
    }

    fn derive_child(&self, other: PrivateKeyBytes) -> Option<Self> {
        let tweak = Scalar::from_be_bytes(other).ok()?;
        self.add_exp_tweak(SECP256K1, &tweak).ok()
    }
}

//! Trait for deriving child keys on a given type.

use crate::{Error, PrivateKeyBytes, PublicKey, Result};
use secp256k1::{scalar::Scalar, SecretKey};

/// Trait for key types which can be derived using BIP32.
pub trait PrivateKey: Sized {
    /// Public key type which corresponds to this private key.
    type PublicKey: PublicKey;

    /// Initialize this key from bytes.
    ///
    /// Fails with [`Error::InvalidPrivateKey`] for a zero scalar or one not
    /// strictly below the curve order.
    fn from_bytes(bytes: &PrivateKeyBytes) -> Result<Self>;

    /// Serialize this key as bytes.
    fn to_bytes(&self) -> PrivateKeyBytes;

    /// Derive a child key from a parent key and the left half of the
    /// HMAC-SHA512 output (`IL`): `(IL + self) mod n`.
    ///
    /// Returns `None` when the candidate is unusable, i.e. `IL` is not below
    /// the curve order or the sum is zero.
    fn derive_child(&self, other: PrivateKeyBytes) -> Option<Self>;

    /// Get the [`Self::PublicKey`] that corresponds to this private key.
    fn public_key(&self) -> Self::PublicKey;

    /// Overwrite the key material in place.
    fn erase(&mut self);
}

impl PrivateKey for SecretKey {
    type PublicKey = secp256k1::PublicKey;

    fn from_bytes(bytes: &PrivateKeyBytes) -> Result<Self> {
        SecretKey::from_slice(bytes).map_err(|_| Error::InvalidPrivateKey)
    }

    fn to_bytes(&self) -> PrivateKeyBytes {
        self.secret_bytes()
    }

    fn derive_child(&self, other: PrivateKeyBytes) -> Option<Self> {
        let tweak = Scalar::from_be_bytes(other).ok()?;
        self.add_tweak(&tweak).ok()
    }

    fn public_key(&self) -> Self::PublicKey {
        secp256k1::PublicKey::from_secret_key_global(self)
    }

    fn erase(&mut self) {
        self.non_secure_erase();
    }
}

//!
//! BIP32 hierarchical deterministic key trees over secp256k1.
//!
//! A root [`ExtendedPrivateKey`] is built once from a seed; children are
//! derived from it as new immutable values. [`ExtendedKeyNode`] wraps both
//! the full and the public-only ("neutered") variants behind a single type
//! and tracks the human-readable derivation path. [`ExtendedKey`] is the
//! fixed 82-byte interchange layout and its Base58 text form.
//!

mod attrs;
mod child_number;
mod derivation;
mod derivation_path;
mod error;
mod node;
mod prefix;
mod private_key;
mod public_key;
mod result;
pub mod types;
mod xkey;
mod xprivate_key;
mod xpublic_key;

pub use attrs::ExtendedKeyAttrs;
pub use child_number::ChildNumber;
pub use derivation_path::DerivationPath;
pub use error::Error;
pub use node::{ExtendedKeyNode, NodeKey};
pub use prefix::Prefix;
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use result::Result;
pub use secp256k1;
pub use secp256k1::SecretKey;
pub use types::*;
pub use xkey::ExtendedKey;
pub use xprivate_key::ExtendedPrivateKey;
pub use xpublic_key::ExtendedPublicKey;

/// Extended private secp256k1 key.
pub type XPrv = ExtendedPrivateKey<SecretKey>;

/// Extended public secp256k1 key.
pub type XPub = ExtendedPublicKey<secp256k1::PublicKey>;

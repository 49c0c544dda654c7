use hmac::Hmac;
use sha2::Sha512;

/// Size of a chain code, a private key and a public key's x-coordinate.
pub const KEY_SIZE: usize = 32;

/// Chain code: extension for both private and public keys which provides an
/// additional 256-bits of entropy.
pub type ChainCode = [u8; KEY_SIZE];

/// Derivation depth.
pub type Depth = u8;

/// BIP32 key fingerprints.
pub type KeyFingerprint = [u8; 4];

/// Bytes which represent a private key.
pub type PrivateKeyBytes = [u8; KEY_SIZE];

/// Bytes which represent a SEC1-compressed public key.
pub type PublicKeyBytes = [u8; KEY_SIZE + 1];

/// BIP32 "versions": integer representation of the key prefix.
pub type Version = u32;

/// HMAC with SHA-512
pub type HmacSha512 = Hmac<Sha512>;

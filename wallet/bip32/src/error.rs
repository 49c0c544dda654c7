//!
//! Error types emitted by key derivation and the extended key codec.
//!

use thiserror::Error;

/// [`Error`](enum@Error) variants emitted by this crate.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
    #[error("Invalid seed (must be at least 16 bytes and produce a valid master key)")]
    InvalidSeed,

    #[error("Invalid private key (zero or not below the curve order)")]
    InvalidPrivateKey,

    #[error("Invalid public key (must be a SEC1-compressed secp256k1 point)")]
    InvalidPublicKey,

    #[error("Maximum derivation depth exceeded")]
    DepthOverflow,

    #[error("Child index space exhausted while skipping invalid keys")]
    DerivationExhausted,

    #[error("Hardened derivation requires a private key")]
    HardenedPublicDerivation,

    #[error("Private key is not available for a public-only key")]
    PrivateKeyUnavailable,

    #[error("Invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("Invalid extended key length: {0} (expected {1})")]
    InvalidLength(usize, usize),

    #[error("Extended key checksum mismatch")]
    ChecksumMismatch,

    #[error("Unknown extended key prefix: {0}")]
    UnknownPrefix(String),

    #[error("Base58 -> {0}")]
    Base58(String),

    #[error("Invalid UTF-8 sequence")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Hmac -> {0}")]
    Hmac(hmac::digest::InvalidLength),
}

impl Error {
    pub fn invalid_path<T: Into<String>>(msg: T) -> Self {
        Error::InvalidPath(msg.into())
    }
}

impl From<hmac::digest::InvalidLength> for Error {
    fn from(err: hmac::digest::InvalidLength) -> Self {
        Self::Hmac(err)
    }
}

impl From<bs58::decode::Error> for Error {
    fn from(err: bs58::decode::Error) -> Self {
        Self::Base58(err.to_string())
    }
}

impl From<bs58::encode::Error> for Error {
    fn from(err: bs58::encode::Error) -> Self {
        Self::Base58(err.to_string())
    }
}

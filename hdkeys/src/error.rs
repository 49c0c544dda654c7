use hdkeys_core::log::LogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Custom(String),

    #[error(transparent)]
    Bip32(#[from] hdkeys_bip32::Error),

    #[error(transparent)]
    Log(#[from] LogError),
}

impl Error {
    pub fn custom<T: Into<String>>(msg: T) -> Self {
        Error::Custom(msg.into())
    }
}

//! Child numbers

use crate::{Error, Result};
use borsh::{BorshDeserialize, BorshSerialize};
use core::{
    fmt::{self, Display},
    str::FromStr,
};

/// Suffixes accepted after an index to request hardened derivation.
const HARDENED_SUFFIXES: [char; 3] = ['\'', 'h', 'H'];

/// Index of a particular child key for a given (extended) private key.
///
/// The raw value is the one stored in the serialized form: hardened children
/// carry [`ChildNumber::HARDENED_FLAG`].
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord, BorshSerialize, BorshDeserialize)]
pub struct ChildNumber(pub u32);

impl ChildNumber {
    /// Hardened child keys use indices 2^31 through 2^32-1.
    pub const HARDENED_FLAG: u32 = 1 << 31;

    /// Create a child number from an index and a hardened flag.
    ///
    /// An index that already carries the hardened bit stays hardened
    /// regardless of `hardened`.
    pub const fn new(index: u32, hardened: bool) -> Self {
        if hardened { Self(index | Self::HARDENED_FLAG) } else { Self(index) }
    }

    /// Index without the hardened bit.
    pub const fn index(&self) -> u32 {
        self.0 & !Self::HARDENED_FLAG
    }

    /// Is this child number within the hardened range?
    pub const fn is_hardened(&self) -> bool {
        self.0 & Self::HARDENED_FLAG != 0
    }

    /// Next child number to try after an invalid key candidate.
    ///
    /// Returns `None` once the candidate would leave the hardened or
    /// non-hardened range this child number belongs to.
    pub fn next_candidate(self) -> Option<Self> {
        let next = Self(self.0.checked_add(1)?);
        (next.is_hardened() == self.is_hardened()).then_some(next)
    }

    /// Serialize as big-endian bytes.
    pub fn to_bytes(&self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Parse from big-endian bytes.
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }
}

impl From<u32> for ChildNumber {
    fn from(n: u32) -> ChildNumber {
        ChildNumber(n)
    }
}

impl From<ChildNumber> for u32 {
    fn from(n: ChildNumber) -> u32 {
        n.0
    }
}

impl Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())?;

        if self.is_hardened() {
            f.write_str("'")?;
        }

        Ok(())
    }
}

impl FromStr for ChildNumber {
    type Err = Error;

    fn from_str(child: &str) -> Result<ChildNumber> {
        let (digits, hardened) = match child.strip_suffix(HARDENED_SUFFIXES) {
            Some(digits) => (digits, true),
            None => (child, false),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_path(format!("`{child}` is not a child index")));
        }

        let index = digits.parse::<u32>().map_err(|_| Error::invalid_path(format!("`{child}` is out of range")))?;
        if index >= Self::HARDENED_FLAG {
            return Err(Error::invalid_path(format!("`{child}` exceeds the 31-bit index range")));
        }

        Ok(ChildNumber::new(index, hardened))
    }
}

//! Child key derivation (CKD) plumbing shared by private and public keys.

use crate::{ChainCode, ChildNumber, Error, HmacSha512, PrivateKeyBytes, Result, KEY_SIZE};
use hmac::Mac;
use log::warn;
use zeroize::{Zeroize, Zeroizing};

/// Key the HMAC with a parent's chain code.
pub(crate) fn hmac_for(chain_code: &ChainCode) -> Result<HmacSha512> {
    Ok(HmacSha512::new_from_slice(chain_code)?)
}

/// Finish the HMAC and split its output into `IL` (key material) and `IR`
/// (the child's chain code).
pub(crate) fn split_hmac(hmac: HmacSha512) -> (Zeroizing<PrivateKeyBytes>, ChainCode) {
    let mut result = hmac.finalize().into_bytes();
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    let mut chain_code = ChainCode::default();
    key.copy_from_slice(&result[..KEY_SIZE]);
    chain_code.copy_from_slice(&result[KEY_SIZE..]);
    result.as_mut_slice().zeroize();
    (key, chain_code)
}

/// Run `attempt` for `start` and, while it reports an invalid candidate
/// (`Ok(None)`), for each following child number.
///
/// Per BIP32 an invalid candidate (`IL >= n`, a zero private key or the
/// point at infinity) moves on to the next index. The walk is bounded by
/// the range `start` belongs to; leaving it yields
/// [`Error::DerivationExhausted`].
pub(crate) fn derive_with_retry<T, F>(start: ChildNumber, mut attempt: F) -> Result<(T, ChildNumber)>
where
    F: FnMut(ChildNumber) -> Result<Option<T>>,
{
    let mut child_number = start;
    loop {
        if let Some(derived) = attempt(child_number)? {
            return Ok((derived, child_number));
        }

        warn!("invalid child key candidate at index {child_number}, skipping to the next index");
        child_number = child_number.next_candidate().ok_or(Error::DerivationExhausted)?;
    }
}

//! HMAC-SHA256 signing of cookie values.
//!
//! Signed format: `value.base64url(hmac(key, value))`. The tag is split off at the last
//! `.`, so `value` itself may contain dots.

use crate::error::CsrfError;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const DELIMITER: char = '.';

fn mac(key: &str, value: &str) -> Result<HmacSha256, CsrfError> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|_| CsrfError::internal(anyhow::anyhow!("signing key rejected by HMAC")))?;
    mac.update(value.as_bytes());
    Ok(mac)
}

/// Appends a tag to `value` which [`unsign`] can check with the same `key`.
pub fn sign(value: &str, key: &str) -> Result<String, CsrfError> {
    let tag = mac(key, value)?.finalize().into_bytes();
    Ok(format!(
        "{value}{DELIMITER}{}",
        base64::encode_config(tag, base64::URL_SAFE_NO_PAD)
    ))
}

/// Returns the original value if the tag matches `key` exactly, `None` otherwise.
pub fn unsign(signed: &str, key: &str) -> Option<String> {
    let (value, tag) = signed.rsplit_once(DELIMITER)?;
    let tag = base64::decode_config(tag, base64::URL_SAFE_NO_PAD).ok()?;
    mac(key, value).ok()?.verify_slice(&tag).ok()?;
    Some(value.to_owned())
}

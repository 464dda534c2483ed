use std::sync::OnceLock;

use rand::RngCore;
use rocket::Request;

/// Stores `value` in the request's local cache, so other guards can access it.
/// The first value stored for a type wins.
pub(crate) fn set_in_cache<T: Send + Sync + 'static>(request: &Request<'_>, value: T) {
    let _ = request.local_cache(OnceLock::<T>::new).set(value);
}

/// Reads a value previously stored with [`set_in_cache`].
pub(crate) fn get_from_cache<'r, T: Send + Sync + 'static>(
    request: &'r Request<'_>,
) -> Option<&'r T> {
    request.local_cache(OnceLock::<T>::new).get()
}

/// Generates a random ID from `len` bytes of CSPRNG output.
pub(crate) fn random_id(len: usize) -> Result<String, rand::Error> {
    let mut buf = vec![0; len];
    rand::thread_rng().try_fill_bytes(&mut buf)?;
    Ok(base64::encode_config(buf, base64::URL_SAFE_NO_PAD))
}

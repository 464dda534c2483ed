use crate::{error::CsrfError, util::random_id};

use rand::{distributions::Alphanumeric, Rng};
use sha3::{Digest, Sha3_256};
use subtle::ConstantTimeEq;

/// Number of random bytes in a secret (144 bits).
pub const SECRET_BYTES: usize = 18;

/// Length of the alphanumeric salt mixed into every token.
pub const SALT_LENGTH: usize = 8;

// Generates secrets and tokens, and checks that a token belongs to a secret.
// Lets the middleware be generic over the token construction.
// Implementations must not panic on malformed input: an unparseable token or secret
// simply fails verification.
pub trait TokenAuthority: Send + Sync {
    /// A new high entropy secret for a client.
    fn generate_secret(&self) -> Result<String, CsrfError>;

    /// A fresh token for `secret`. Repeated calls return different tokens.
    fn derive_token(&self, secret: &str) -> String;

    /// Whether `token` was derived from `secret`.
    fn verify(&self, secret: &str, token: &str) -> bool;
}

/// The default [`TokenAuthority`].
///
/// Tokens have the shape `salt-digest`, where `salt` is a fresh alphanumeric string and
/// `digest` is the base64url encoded SHA3-256 of `salt-secret`. The digest is one-way, so
/// a token reveals nothing about the secret, and the salt makes every token distinct.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tokens;

impl Tokens {
    fn digest(salt: &str, secret: &str) -> String {
        let mut hasher = Sha3_256::new();
        hasher.update(salt.as_bytes());
        hasher.update(b"-");
        hasher.update(secret.as_bytes());
        base64::encode_config(hasher.finalize(), base64::URL_SAFE_NO_PAD)
    }

    fn salt() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SALT_LENGTH)
            .map(char::from)
            .collect()
    }
}

impl TokenAuthority for Tokens {
    fn generate_secret(&self) -> Result<String, CsrfError> {
        Ok(random_id(SECRET_BYTES)?)
    }

    fn derive_token(&self, secret: &str) -> String {
        let salt = Self::salt();
        let digest = Self::digest(&salt, secret);
        format!("{salt}-{digest}")
    }

    fn verify(&self, secret: &str, token: &str) -> bool {
        // The salt is alphanumeric, so the first '-' is always the delimiter.
        let Some((salt, digest)) = token.split_once('-') else {
            return false;
        };
        if secret.is_empty() || salt.len() != SALT_LENGTH || digest.is_empty() {
            return false;
        }
        let expected = Self::digest(salt, secret);
        expected.as_bytes().ct_eq(digest.as_bytes()).into()
    }
}

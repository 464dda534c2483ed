use crate::{
    authority::{TokenAuthority, Tokens},
    config::{CsrfConfig, DEFAULT_ERROR_MESSAGE},
    error::{CsrfError, Rejection},
    signing,
    util::set_in_cache,
};

use std::{fmt, sync::Arc};

use rocket::{figment::Figment, request, Request};

/// One configured instance of CSRF protection.
///
/// Produces both the setup and the validation wrappers, so handlers wrapped by the
/// same instance agree on cookie names, signing key and token construction. Cloning is
/// cheap; the configuration and authority are shared read-only.
#[derive(Clone)]
pub struct CsrfProtection {
    config: Arc<CsrfConfig>,
    authority: Arc<dyn TokenAuthority>,
}

impl CsrfProtection {
    pub fn new(config: CsrfConfig) -> Self {
        Self {
            config: Arc::new(config),
            authority: Arc::new(Tokens),
        }
    }

    /// Builds protection from the `csrf` table of a Rocket figment.
    pub fn from_figment(figment: &Figment) -> Result<Self, rocket::figment::Error> {
        CsrfConfig::from_figment(figment).map(Self::new)
    }

    /// Replaces the default [`Tokens`] construction.
    #[must_use]
    pub fn with_authority(mut self, authority: impl TokenAuthority + 'static) -> Self {
        self.authority = Arc::new(authority);
        self
    }

    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    pub fn authority(&self) -> &dyn TokenAuthority {
        self.authority.as_ref()
    }

    /// The instance managed by [`crate::CsrfFairing`], for request guards.
    pub(crate) fn managed<'r>(request: &'r Request<'_>) -> Result<&'r Self, CsrfError> {
        request.rocket().state::<Self>().ok_or_else(|| {
            CsrfError::internal(anyhow::anyhow!(
                "CSRF protection is not managed, attach CsrfFairing"
            ))
        })
    }

    /// A fresh token for `secret` in the form it travels in the cookie: signed when a
    /// signing key is configured.
    pub(crate) fn wire_token(&self, secret: &str) -> Result<String, CsrfError> {
        let token = self.authority.derive_token(secret);
        match &self.config.secret {
            Some(key) => signing::sign(&token, key.expose()),
            None => Ok(token),
        }
    }

    pub(crate) fn rejection(&self, error: &CsrfError) -> Rejection {
        Rejection::from_error(error, &self.config.error_message)
    }
}

impl Default for CsrfProtection {
    fn default() -> Self {
        Self::new(CsrfConfig::default())
    }
}

impl fmt::Debug for CsrfProtection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfProtection")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Fails a request guard, leaving the rejection in the request cache for
/// [`crate::catchers`] to render.
pub(crate) fn fail_guard<S>(
    request: &Request<'_>,
    rejection: Rejection,
) -> request::Outcome<S, Rejection> {
    tracing::debug!(status = %rejection.status, "CSRF request guard failed");
    set_in_cache(request, rejection.clone());
    request::Outcome::Error((rejection.status, rejection))
}

/// Looks up the managed protection for a request guard.
pub(crate) fn managed_or_reject<'r>(
    request: &'r Request<'_>,
) -> Result<&'r CsrfProtection, Rejection> {
    CsrfProtection::managed(request).map_err(|error| {
        tracing::error!(%error, "CSRF request guard used without managed protection");
        Rejection::from_error(&error, DEFAULT_ERROR_MESSAGE)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSecret;

    impl TokenAuthority for FixedSecret {
        fn generate_secret(&self) -> Result<String, CsrfError> {
            Ok("fixed".to_owned())
        }

        fn derive_token(&self, secret: &str) -> String {
            format!("token-for-{secret}")
        }

        fn verify(&self, secret: &str, token: &str) -> bool {
            token == format!("token-for-{secret}")
        }
    }

    #[test]
    fn test_wire_token_is_unsigned_without_key() {
        let protection = CsrfProtection::default().with_authority(FixedSecret);
        assert_eq!(protection.wire_token("s").unwrap(), "token-for-s");
    }

    #[test]
    fn test_wire_token_is_signed_with_key() {
        let protection =
            CsrfProtection::new(CsrfConfig::default().with_secret("k")).with_authority(FixedSecret);
        let wire = protection.wire_token("s").unwrap();
        assert_ne!(wire, "token-for-s");
        assert_eq!(signing::unsign(&wire, "k").as_deref(), Some("token-for-s"));
    }

    #[test]
    fn test_debug_hides_signing_key() {
        let protection = CsrfProtection::new(CsrfConfig::default().with_secret("hunter2"));
        let debug = format!("{protection:?}");
        assert!(debug.contains("CsrfProtection"));
        assert!(!debug.contains("hunter2"));
    }
}

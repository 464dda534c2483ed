use crate::{
    config::SECRET_COOKIE_NAME,
    error::{CsrfError, Rejection},
    parts::RequestParts,
    protection::CsrfProtection,
    signing,
};

/// The decision for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The method is exempt. Run the handler untouched and set no cookie.
    Exempt,
    /// The token matched its secret. `token` is the rotated token cookie value to send.
    Accepted { token: String },
    /// Do not run the handler; respond with the rejection instead.
    Rejected(Rejection),
}

impl CsrfProtection {
    /// Decides whether a request may reach its handler.
    ///
    /// Pure apart from randomness: no cookie is written and no response produced, so the
    /// decision can be tested without a running server. Every failure, including internal
    /// ones, becomes [`Verdict::Rejected`].
    pub fn evaluate(&self, parts: &RequestParts<'_>) -> Verdict {
        match self.check(parts) {
            Ok(None) => Verdict::Exempt,
            Ok(Some(token)) => Verdict::Accepted { token },
            Err(error) => {
                if error.is_validation_failure() {
                    tracing::debug!(%error, "rejecting request that failed CSRF checks");
                } else {
                    tracing::warn!(%error, "CSRF checks failed unexpectedly");
                }
                Verdict::Rejected(self.rejection(&error))
            }
        }
    }

    // Returns the rotated token, or `None` when the method is exempt.
    fn check(&self, parts: &RequestParts<'_>) -> Result<Option<String>, CsrfError> {
        let config = self.config();

        match parts.method() {
            Ok(method) if config.is_ignored(method) => return Ok(None),
            Ok(_) => {}
            // An unreadable method can't be exempt, so it gets the full check.
            Err(error) => tracing::debug!(%error, "checking request anyway"),
        }

        if !parts.has_cookies() {
            return Err(CsrfError::CookieHeaderMissing);
        }

        let token = parts
            .cookie(&config.token_key)
            .ok_or(CsrfError::TokenCookieMissing)?;
        let secret = parts
            .cookie(SECRET_COOKIE_NAME)
            .ok_or(CsrfError::SecretCookieMissing)?;

        let token = match &config.secret {
            Some(key) => {
                signing::unsign(&token, key.expose()).ok_or(CsrfError::SignatureInvalid)?
            }
            None => token,
        };

        if !self.authority().verify(&secret, &token) {
            return Err(CsrfError::TokenSecretMismatch);
        }

        self.wire_token(&secret).map(Some)
    }
}

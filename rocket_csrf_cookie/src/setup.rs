use crate::{
    config::{CsrfConfig, SECRET_COOKIE_NAME},
    cookie,
    error::{CsrfError, Rejection},
    parts::RequestParts,
    protection::{fail_guard, managed_or_reject, CsrfProtection},
    util::{get_from_cache, set_in_cache},
};

use std::fmt;

use rocket::{
    request::{self, FromRequest, Request},
    route::{Handler, Outcome},
    Data,
};
use serde::{Serialize, Serializer};

/// A secret and the token derived from it, as set on the client.
#[derive(Clone)]
pub struct IssuedToken {
    secret: String,
    token: String,
    new_secret: bool,
}

impl IssuedToken {
    /// The value of the `csrfSecret` cookie.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// The value of the token cookie, signed when a signing key is configured.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether the secret was generated for this request rather than read from it.
    pub const fn is_new_secret(&self) -> bool {
        self.new_secret
    }
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &self.token)
            .field("new_secret", &self.new_secret)
            .finish_non_exhaustive()
    }
}

/// Serializes as the token, so it can be embedded in a template or form.
impl Serialize for IssuedToken {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.token)
    }
}

impl CsrfProtection {
    /// Picks the secret for a request and derives a fresh token from it.
    ///
    /// An existing non-empty `csrfSecret` cookie is kept, so tokens issued earlier for
    /// the same client stay valid. Otherwise a new secret is generated.
    pub fn issue(&self, parts: &RequestParts<'_>) -> Result<IssuedToken, CsrfError> {
        let (secret, new_secret) = match parts.cookie(SECRET_COOKIE_NAME) {
            Some(secret) => (secret, false),
            None => (self.authority().generate_secret()?, true),
        };
        let token = self.wire_token(&secret)?;
        Ok(IssuedToken {
            secret,
            token,
            new_secret,
        })
    }

    /// Issues a token for `request` and sets both cookies on its response.
    pub(crate) fn set_up(&self, request: &Request<'_>) -> Result<IssuedToken, CsrfError> {
        let issued = self.issue(&RequestParts::from_request(request))?;
        let config = self.config();
        cookie::set_pair(
            request.cookies(),
            &config.cookie,
            &config.token_key,
            &issued.secret,
            &issued.token,
        );
        if issued.new_secret {
            tracing::debug!("issued a new CSRF secret");
        }
        set_in_cache(request, issued.clone());
        Ok(issued)
    }

    /// Wraps `handler` so every response it produces carries the CSRF cookies.
    pub fn setup<H: Handler + Clone>(&self, handler: H) -> Setup<H> {
        Setup {
            protection: self.clone(),
            handler,
        }
    }
}

/// Wraps `handler` with the setup stage, using its own [`CsrfProtection`].
///
/// Prefer [`CsrfProtection::setup`] when the same configuration also guards other
/// routes with [`crate::csrf`].
pub fn setup<H: Handler + Clone>(handler: H, config: CsrfConfig) -> Setup<H> {
    CsrfProtection::new(config).setup(handler)
}

/// A handler which sets the `csrfSecret` and token cookies, then runs the inner handler.
///
/// Mount it like any other handler:
///
/// ```rust,no_run
/// # use rocket::{http::Method, route::Outcome, Data, Request, Route};
/// # use rocket_csrf_cookie::CsrfProtection;
/// fn form<'r>(request: &'r Request<'_>, _: Data<'r>) -> rocket::route::BoxFuture<'r> {
///     Box::pin(async move { Outcome::from(request, "<form method=post>...</form>") })
/// }
///
/// let protection = CsrfProtection::default();
/// let route = Route::new(Method::Get, "/form", protection.setup(form));
/// ```
#[derive(Clone, Debug)]
pub struct Setup<H> {
    protection: CsrfProtection,
    handler: H,
}

#[async_trait::async_trait]
impl<H: Handler + Clone> Handler for Setup<H> {
    async fn handle<'r>(&self, request: &'r Request<'_>, data: Data<'r>) -> Outcome<'r> {
        if let Err(error) = self.protection.set_up(request) {
            tracing::error!(%error, "could not issue CSRF token");
            return Outcome::from(request, self.protection.rejection(&error));
        }
        self.handler.handle(request, data).await
    }
}

/// Request guard which sets the CSRF cookies on the response, for routes declared with
/// Rocket's attribute macros. Needs [`crate::CsrfFairing`].
///
/// Serializes as the token so it can be handed straight to a template.
#[derive(Clone, Debug, Serialize)]
#[serde(transparent)]
pub struct IssuedCsrfToken(IssuedToken);

impl IssuedCsrfToken {
    pub fn token(&self) -> &str {
        self.0.token()
    }

    pub fn into_inner(self) -> IssuedToken {
        self.0
    }
}

/// Reuses the token when the request already went through setup.
#[async_trait::async_trait]
impl<'r> FromRequest<'r> for IssuedCsrfToken {
    type Error = Rejection;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        if let Some(issued) = get_from_cache::<IssuedToken>(request) {
            return request::Outcome::Success(Self(issued.clone()));
        }
        let protection = match managed_or_reject(request) {
            Ok(protection) => protection,
            Err(rejection) => return fail_guard(request, rejection),
        };
        match protection.set_up(request) {
            Ok(issued) => request::Outcome::Success(Self(issued)),
            Err(error) => fail_guard(request, protection.rejection(&error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_generates_secret_when_absent() {
        let protection = CsrfProtection::default();
        for header in [None, Some(""), Some("csrfSecret="), Some("other=1")] {
            let parts = RequestParts::from_cookie_header(Some("GET"), header);
            let issued = protection.issue(&parts).unwrap();
            assert!(issued.is_new_secret());
            assert!(!issued.secret().is_empty());
            assert!(protection.authority().verify(issued.secret(), issued.token()));
        }
    }

    #[test]
    fn test_issue_keeps_existing_secret() {
        let protection = CsrfProtection::default();
        let first = protection
            .issue(&RequestParts::from_cookie_header(Some("GET"), None))
            .unwrap();
        let header = format!("csrfSecret={}; XSRF-TOKEN={}", first.secret(), first.token());
        let second = protection
            .issue(&RequestParts::from_cookie_header(Some("GET"), Some(header.as_str())))
            .unwrap();

        assert!(!second.is_new_secret());
        assert_eq!(second.secret(), first.secret());
        assert_ne!(second.token(), first.token());
        assert!(protection.authority().verify(first.secret(), first.token()));
    }

    #[test]
    fn test_debug_and_serialize_expose_only_the_token() {
        let issued = CsrfProtection::default()
            .issue(&RequestParts::from_cookie_header(Some("GET"), None))
            .unwrap();
        let debug = format!("{issued:?}");
        assert!(debug.contains(issued.token()));
        assert!(!debug.contains(issued.secret()));

        let json = rocket::serde::json::to_string(&IssuedCsrfToken(issued.clone())).unwrap();
        assert_eq!(json, format!("\"{}\"", issued.token()));
    }
}

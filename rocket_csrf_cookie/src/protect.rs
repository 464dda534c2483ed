use crate::{
    config::CsrfConfig,
    cookie,
    error::Rejection,
    parts::RequestParts,
    proof::CsrfCheckProof,
    protection::{fail_guard, managed_or_reject, CsrfProtection},
    util::set_in_cache,
    validation::Verdict,
};

use rocket::{
    request::{self, FromRequest, Request},
    route::{Handler, Outcome},
    Data,
};

impl CsrfProtection {
    /// Runs the checks for `request` and applies the result: rotates the token cookie
    /// and records a [`CsrfCheckProof`] when the token is accepted.
    pub(crate) fn enforce(&self, request: &Request<'_>) -> Result<(), Rejection> {
        match self.evaluate(&RequestParts::from_request(request)) {
            Verdict::Exempt => Ok(()),
            Verdict::Accepted { token } => {
                let config = self.config();
                cookie::set_token(request.cookies(), &config.cookie, &config.token_key, &token);
                set_in_cache(request, CsrfCheckProof::PassedCsrfChecks);
                Ok(())
            }
            Verdict::Rejected(rejection) => Err(rejection),
        }
    }

    /// Wraps `handler` so it only runs for requests which pass the CSRF checks.
    pub fn csrf<H: Handler + Clone>(&self, handler: H) -> Csrf<H> {
        Csrf {
            protection: self.clone(),
            handler,
        }
    }
}

/// Wraps `handler` with the validation stage, using its own [`CsrfProtection`].
///
/// The configuration must match the one used for [`crate::setup`], or the cookies it
/// issued won't be recognised. Prefer [`CsrfProtection::csrf`].
pub fn csrf<H: Handler + Clone>(handler: H, config: CsrfConfig) -> Csrf<H> {
    CsrfProtection::new(config).csrf(handler)
}

/// A handler which runs the inner handler only when the CSRF token checks out.
///
/// Rejected requests get a JSON `{"message": ...}` response straight away; the inner
/// handler never sees them. Accepted requests get a rotated token cookie. Whatever the
/// inner handler returns, including failures and forwards, is passed through as is.
#[derive(Clone, Debug)]
pub struct Csrf<H> {
    protection: CsrfProtection,
    handler: H,
}

#[async_trait::async_trait]
impl<H: Handler + Clone> Handler for Csrf<H> {
    async fn handle<'r>(&self, request: &'r Request<'_>, data: Data<'r>) -> Outcome<'r> {
        match self.protection.enforce(request) {
            Ok(()) => self.handler.handle(request, data).await,
            Err(rejection) => Outcome::from(request, rejection),
        }
    }
}

/// Request guard which fails unless the request passes the CSRF checks. Needs
/// [`crate::CsrfFairing`].
///
/// Register [`crate::catchers`] to get the same JSON rejection body as [`Csrf`].
#[derive(Debug)]
pub struct CsrfProtected(());

#[async_trait::async_trait]
impl<'r> FromRequest<'r> for CsrfProtected {
    type Error = Rejection;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let protection = match managed_or_reject(request) {
            Ok(protection) => protection,
            Err(rejection) => return fail_guard(request, rejection),
        };
        match protection.enforce(request) {
            Ok(()) => request::Outcome::Success(Self(())),
            Err(rejection) => fail_guard(request, rejection),
        }
    }
}

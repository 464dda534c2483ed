use crate::util::get_from_cache;

use rocket::request::{FromRequest, Outcome, Request};

/// A proof that a request has passed CSRF checks.
///
/// Recorded by [`crate::Csrf`] and [`crate::CsrfProtected`] when a token is accepted.
/// Requests with an exempt method never get one. Require it in code which must not run
/// for forged requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CsrfCheckProof {
    /// The request has passed CSRF checks.
    /// This is the only valid value for this type.
    PassedCsrfChecks,
}

impl Default for CsrfCheckProof {
    fn default() -> Self {
        Self::PassedCsrfChecks
    }
}

/// By default, consider this an unchecked request.
/// The CSRF check has to run *before* this guard, and populate the cache.
#[async_trait::async_trait]
impl<'r> FromRequest<'r> for CsrfCheckProof {
    type Error = std::convert::Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        get_from_cache::<Self>(request)
            .cloned()
            .map(Outcome::Success)
            .unwrap_or_else(|| Outcome::Forward(rocket::http::Status::InternalServerError))
    }
}

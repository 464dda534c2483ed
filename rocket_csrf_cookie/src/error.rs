use rocket::{
    http::Status,
    request::Request,
    response::{self, Responder},
    serde::json::Json,
};
use serde::{Deserialize, Serialize};

/// Message used when an internal error carries no message of its own.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong";

/// Everything that can stop a request at the CSRF layer.
///
/// Every kind except [`CsrfError::Internal`] is a validation failure and is reported to
/// the client as `403 Forbidden` with the configured error message, so clients cannot
/// tell which check failed.
#[derive(thiserror::Error, Debug)]
pub enum CsrfError {
    /// The request method could not be read as a string. Protection still applies.
    #[error("request method could not be read")]
    MethodUnreadable,
    /// The request carried no cookies at all.
    #[error("request carried no cookies")]
    CookieHeaderMissing,
    /// The token cookie was absent or empty.
    #[error("CSRF token cookie is missing")]
    TokenCookieMissing,
    /// The `csrfSecret` cookie was absent or empty.
    #[error("CSRF secret cookie is missing")]
    SecretCookieMissing,
    /// The token cookie's signature did not check out against the signing key.
    #[error("CSRF token signature is invalid")]
    SignatureInvalid,
    // NOTE: The error message intentionally does not include the token or secret
    // to avoid bugs where they get returned to users.
    #[error("CSRF token did not match!")]
    TokenSecretMismatch,
    /// A cryptographic primitive failed. Reported with `status`, or 500 when absent.
    #[error("{error}")]
    Internal {
        status: Option<Status>,
        error: anyhow::Error,
    },
}

impl CsrfError {
    /// Wraps an unexpected failure with no particular status attached.
    pub fn internal(error: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            status: None,
            error: error.into(),
        }
    }

    /// The HTTP status this error should be reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Internal { status, .. } => status.unwrap_or(Status::InternalServerError),
            _ => Status::Forbidden,
        }
    }

    /// Whether this is one of the validation failures rather than an internal error.
    pub const fn is_validation_failure(&self) -> bool {
        !matches!(self, Self::Internal { .. })
    }
}

impl From<rand::Error> for CsrfError {
    fn from(error: rand::Error) -> Self {
        Self::internal(error)
    }
}

/// JSON body written for rejected requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// A definite rejection: the status and message the client sees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    pub status: Status,
    pub message: String,
}

impl Rejection {
    /// Maps an error to what the client sees. Validation failures all collapse to
    /// `error_message`, internal errors surface their own message.
    pub fn from_error(error: &CsrfError, error_message: &str) -> Self {
        let message = match error {
            CsrfError::Internal { error, .. } => {
                let message = error.to_string();
                if message.is_empty() {
                    GENERIC_ERROR_MESSAGE.to_owned()
                } else {
                    message
                }
            }
            _ => error_message.to_owned(),
        };
        Self {
            status: error.status(),
            message,
        }
    }
}

/// Responds with the status and `{"message": ...}`.
impl<'r> Responder<'r, 'static> for Rejection {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        (
            self.status,
            Json(ErrorBody {
                message: self.message,
            }),
        )
            .respond_to(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failures_are_forbidden() {
        let errors = [
            CsrfError::MethodUnreadable,
            CsrfError::CookieHeaderMissing,
            CsrfError::TokenCookieMissing,
            CsrfError::SecretCookieMissing,
            CsrfError::SignatureInvalid,
            CsrfError::TokenSecretMismatch,
        ];
        for error in errors {
            assert!(error.is_validation_failure());
            let rejection = Rejection::from_error(&error, "Invalid CSRF token");
            assert_eq!(rejection.status, Status::Forbidden);
            assert_eq!(rejection.message, "Invalid CSRF token");
        }
    }

    #[test]
    fn test_internal_error_defaults_to_500_with_own_message() {
        let error = CsrfError::internal(anyhow::anyhow!("rng unavailable"));
        let rejection = Rejection::from_error(&error, "Invalid CSRF token");
        assert_eq!(rejection.status, Status::InternalServerError);
        assert_eq!(rejection.message, "rng unavailable");
    }

    #[test]
    fn test_internal_error_keeps_attached_status() {
        let error = CsrfError::Internal {
            status: Some(Status::ServiceUnavailable),
            error: anyhow::anyhow!("try later"),
        };
        assert!(!error.is_validation_failure());
        assert_eq!(error.status(), Status::ServiceUnavailable);
    }

    #[test]
    fn test_internal_error_without_message_uses_generic_one() {
        let error = CsrfError::internal(anyhow::anyhow!(""));
        let rejection = Rejection::from_error(&error, "Invalid CSRF token");
        assert_eq!(rejection.message, GENERIC_ERROR_MESSAGE);
    }
}

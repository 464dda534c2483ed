//! Stateless CSRF protection for Rocket using the double submit cookie pattern.
//!
//! A setup stage ([`Setup`] or the [`IssuedCsrfToken`] guard) hands the client a
//! `csrfSecret` cookie and a token cookie derived from it. A validation stage ([`Csrf`]
//! or the [`CsrfProtected`] guard) checks that the two still belong together on every
//! request with a non-exempt method, and reissues the token when they do.

mod authority;
mod catcher;
mod config;
mod cookie;
mod error;
mod fairing;
mod parts;
mod proof;
mod protect;
mod protection;
mod setup;
mod signing;
mod util;
mod validation;


pub use authority::{TokenAuthority, Tokens, SALT_LENGTH, SECRET_BYTES};
pub use catcher::catchers;
pub use config::{
    CookieOptions, CsrfConfig, SameSitePolicy, SigningKey, CONFIG_KEY, DEFAULT_ERROR_MESSAGE,
    DEFAULT_IGNORED_METHODS, DEFAULT_TOKEN_COOKIE_NAME, SECRET_COOKIE_NAME,
};
pub use error::{CsrfError, ErrorBody, Rejection, GENERIC_ERROR_MESSAGE};
pub use fairing::CsrfFairing;
pub use parts::RequestParts;
pub use proof::CsrfCheckProof;
pub use protect::{csrf, Csrf, CsrfProtected};
pub use protection::CsrfProtection;
pub use setup::{setup, IssuedCsrfToken, IssuedToken, Setup};
pub use signing::{sign, unsign};
pub use validation::Verdict;

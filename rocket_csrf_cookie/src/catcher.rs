use crate::{error::Rejection, util::get_from_cache};

use rocket::{catch, catchers, http::Status, Catcher, Request};

// Renders the rejection a CSRF request guard left behind, or a plain one for errors
// raised elsewhere.
fn cached_or_plain(status: Status, request: &Request<'_>) -> Rejection {
    get_from_cache::<Rejection>(request)
        .cloned()
        .unwrap_or_else(|| Rejection {
            status,
            message: status.reason_lossy().to_owned(),
        })
}

#[catch(403)]
fn forbidden(request: &Request<'_>) -> Rejection {
    cached_or_plain(Status::Forbidden, request)
}

#[catch(500)]
fn internal_error(request: &Request<'_>) -> Rejection {
    cached_or_plain(Status::InternalServerError, request)
}

/// JSON catchers for failed [`crate::CsrfProtected`] and [`crate::IssuedCsrfToken`]
/// guards. Register them with `rocket.register("/", catchers())`.
pub fn catchers() -> Vec<Catcher> {
    catchers![forbidden, internal_error]
}

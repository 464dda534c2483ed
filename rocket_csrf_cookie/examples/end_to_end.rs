#![deny(missing_docs)]

//! This example demonstrates how to use this library in an end to end scenario.
//!
//! Handlers are protected in one of two ways. Hand written handlers can be wrapped:
//! [`show_form`] is mounted behind a setup stage which hands the browser a
//! `csrfSecret` cookie and an `XSRF-TOKEN` cookie, and [`save_note`] is mounted behind
//! a validation stage which only lets the request through when the two still match.
//! Both come from the same [`CsrfProtection`] so they agree on names and keys.
//!
//! Routes declared with Rocket's attribute macros use request guards instead:
//! [`IssuedCsrfToken`] sets the cookies and [`CsrfProtected`] checks them, as in
//! [`show_settings`] and [`save_settings`]. The guards use the [`CsrfProtection`] in
//! managed state. Here that is the same instance the wrapped routes use, so a token
//! issued by either family is accepted by the other. Without one, [`CsrfFairing`]
//! builds it from the `csrf` table of `Rocket.toml` at ignition. The
//! registered [`catchers`] turn guard failures into the same JSON body the wrapped
//! handlers send.
//!
//! Run it with `cargo run --example end_to_end` and try `curl -X POST localhost:8000/notes`
//! to see a request without cookies get turned away.

use rocket::{
    get,
    http::Method,
    launch, post,
    route::{BoxFuture, Outcome},
    routes, Build, Data, Request, Rocket, Route,
};

use rocket_csrf_cookie::{
    catchers, CsrfCheckProof, CsrfConfig, CsrfFairing, CsrfProtected, CsrfProtection,
    IssuedCsrfToken,
};

/// Shows a form. The cookies are set by the surrounding setup stage.
fn show_form<'r>(request: &'r Request<'_>, _: Data<'r>) -> BoxFuture<'r> {
    Box::pin(async move {
        Outcome::from(
            request,
            "<form method=\"post\" action=\"/notes\"><button>Save</button></form>",
        )
    })
}

/// Saves a note. Only reached once the CSRF token checked out.
fn save_note<'r>(request: &'r Request<'_>, _: Data<'r>) -> BoxFuture<'r> {
    Box::pin(async move {
        let checked = request.guard::<CsrfCheckProof>().await.succeeded().is_some();
        Outcome::from(request, format!("note saved, checked: {checked}"))
    })
}

/// Shows the settings page, embedding the token for clients that want to read it.
#[get("/settings")]
fn show_settings(token: IssuedCsrfToken) -> String {
    format!("settings, token: {}", token.token())
}

/// Saves settings. The proof is only available once [`CsrfProtected`] has passed.
#[post("/settings")]
fn save_settings(_csrf: CsrfProtected, _proof: CsrfCheckProof) -> &'static str {
    "settings saved"
}

fn wrapped_routes(protection: &CsrfProtection) -> Vec<Route> {
    vec![
        Route::new(Method::Get, "/notes", protection.setup(show_form)),
        Route::new(Method::Post, "/notes", protection.csrf(save_note)),
    ]
}

#[launch]
fn rocket() -> Rocket<Build> {
    let protection = CsrfProtection::new(CsrfConfig::default().with_secret("change me"));
    // Managed before the fairing, so the guards share the wrapped routes' key.
    rocket::build()
        .manage(protection.clone())
        .attach(CsrfFairing)
        .mount("/", wrapped_routes(&protection))
        .mount("/", routes![show_settings, save_settings])
        .register("/", catchers())
}

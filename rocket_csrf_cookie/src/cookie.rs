use crate::config::{CookieOptions, SECRET_COOKIE_NAME};

use rocket::http::{Cookie, CookieJar};

/// Builds a cookie carrying `value` with the configured attributes.
pub(crate) fn build_cookie(
    name: &str,
    value: String,
    options: &CookieOptions,
) -> Cookie<'static> {
    let mut cookie = Cookie::build((name.to_owned(), value))
        .path(options.path.clone())
        .http_only(options.http_only)
        .same_site(options.same_site.into())
        .secure(options.secure);
    if let Some(domain) = &options.domain {
        cookie = cookie.domain(domain.clone());
    }
    if let Some(max_age) = options.max_age {
        cookie = cookie.max_age(rocket::time::Duration::seconds(max_age));
    }
    cookie.build()
}

/// Sets both the secret and the token cookie.
pub(crate) fn set_pair(
    cookies: &CookieJar<'_>,
    options: &CookieOptions,
    token_key: &str,
    secret: &str,
    token: &str,
) {
    cookies.add(build_cookie(SECRET_COOKIE_NAME, secret.to_owned(), options));
    set_token(cookies, options, token_key, token);
}

/// Sets only the token cookie, leaving the secret untouched.
pub(crate) fn set_token(
    cookies: &CookieJar<'_>,
    options: &CookieOptions,
    token_key: &str,
    token: &str,
) {
    cookies.add(build_cookie(token_key, token.to_owned(), options));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SameSitePolicy;

    use rocket::http::SameSite;

    #[test]
    fn test_cookie_uses_configured_attributes() {
        let options = CookieOptions {
            http_only: false,
            path: "/app".to_owned(),
            same_site: SameSitePolicy::Strict,
            secure: true,
            domain: Some("example.com".to_owned()),
            max_age: Some(60),
        };
        let cookie = build_cookie("XSRF-TOKEN", "value".to_owned(), &options);
        assert_eq!(cookie.name(), "XSRF-TOKEN");
        assert_eq!(cookie.value(), "value");
        assert_eq!(cookie.path(), Some("/app"));
        assert_eq!(cookie.http_only(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.domain(), Some("example.com"));
        assert_eq!(cookie.max_age(), Some(rocket::time::Duration::seconds(60)));
    }

    #[test]
    fn test_default_cookie_is_lax_http_only_at_root() {
        let cookie = build_cookie("csrfSecret", "s".to_owned(), &CookieOptions::default());
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.domain(), None);
        assert_eq!(cookie.max_age(), None);
    }
}

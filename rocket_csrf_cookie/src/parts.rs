use crate::error::CsrfError;

use rocket::{
    http::{Cookie, CookieJar},
    Request,
};

#[derive(Clone, Copy)]
enum Cookies<'a> {
    Jar(&'a CookieJar<'a>),
    Header(&'a str),
}

/// The parts of a request the CSRF checks look at.
///
/// Wrapped handlers and request guards see a request differently; both are normalised
/// into this record before any check runs. Requests from outside Rocket can be described
/// with [`RequestParts::from_cookie_header`].
#[derive(Clone, Copy)]
pub struct RequestParts<'a> {
    method: Option<&'a str>,
    cookies: Option<Cookies<'a>>,
}

impl<'a> RequestParts<'a> {
    pub fn from_request(request: &'a Request<'_>) -> Self {
        let jar = request.cookies();
        let has_cookies = jar.iter().next().is_some();
        Self {
            method: Some(request.method().as_str()),
            cookies: has_cookies.then_some(Cookies::Jar(jar)),
        }
    }

    /// `header` is the raw `Cookie` header value, `None` when the header is absent.
    pub const fn from_cookie_header(method: Option<&'a str>, header: Option<&'a str>) -> Self {
        Self {
            method,
            cookies: match header {
                Some(header) => Some(Cookies::Header(header)),
                None => None,
            },
        }
    }

    pub fn method(&self) -> Result<&'a str, CsrfError> {
        self.method.ok_or(CsrfError::MethodUnreadable)
    }

    /// Whether the request carried any cookies at all.
    pub const fn has_cookies(&self) -> bool {
        self.cookies.is_some()
    }

    /// The value of the cookie called `name`, if present and non-empty.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let value = match self.cookies? {
            Cookies::Jar(jar) => jar.get(name).map(|cookie| cookie.value().to_owned()),
            Cookies::Header(header) => Cookie::split_parse(header)
                .filter_map(Result::ok)
                .find(|cookie| cookie.name() == name)
                .map(|cookie| cookie.value().to_owned()),
        };
        value.filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_cookies_from_header() {
        let parts = RequestParts::from_cookie_header(
            Some("POST"),
            Some("csrfSecret=abc; XSRF-TOKEN=def; other=1"),
        );
        assert_eq!(parts.method().unwrap(), "POST");
        assert!(parts.has_cookies());
        assert_eq!(parts.cookie("csrfSecret").as_deref(), Some("abc"));
        assert_eq!(parts.cookie("XSRF-TOKEN").as_deref(), Some("def"));
        assert_eq!(parts.cookie("missing"), None);
    }

    #[test]
    fn test_empty_cookie_values_count_as_missing() {
        let parts =
            RequestParts::from_cookie_header(Some("POST"), Some("csrfSecret=; XSRF-TOKEN=x"));
        assert_eq!(parts.cookie("csrfSecret"), None);
        assert_eq!(parts.cookie("XSRF-TOKEN").as_deref(), Some("x"));
    }

    #[test]
    fn test_missing_header_and_method() {
        let parts = RequestParts::from_cookie_header(None, None);
        assert!(!parts.has_cookies());
        assert_eq!(parts.cookie("csrfSecret"), None);
        assert!(matches!(parts.method(), Err(CsrfError::MethodUnreadable)));
    }
}

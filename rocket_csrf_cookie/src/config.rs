use std::fmt;

use rocket::{figment::Figment, http::SameSite, Config};
use serde::Deserialize;

/// Name of the cookie holding the per-client secret.
pub const SECRET_COOKIE_NAME: &str = "csrfSecret";

/// Default name of the cookie holding the token.
pub const DEFAULT_TOKEN_COOKIE_NAME: &str = "XSRF-TOKEN";

/// Default message returned to rejected clients.
pub const DEFAULT_ERROR_MESSAGE: &str = "Invalid CSRF token";

/// Methods which are not checked unless configured otherwise.
pub const DEFAULT_IGNORED_METHODS: [&str; 3] = ["GET", "HEAD", "OPTIONS"];

/// Table in the Rocket configuration the settings are read from.
pub const CONFIG_KEY: &str = "csrf";

/// Server-held key used to sign token cookies.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct SigningKey(String);

impl SigningKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }

    // Anyone can compute an HMAC under an empty key.
    fn is_usable(&self) -> bool {
        !self.0.is_empty()
    }
}

// Keep the key out of logs.
impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

/// Deserializable mirror of [`SameSite`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    Strict,
    #[default]
    Lax,
    None,
}

impl From<SameSitePolicy> for SameSite {
    fn from(policy: SameSitePolicy) -> Self {
        match policy {
            SameSitePolicy::Strict => Self::Strict,
            SameSitePolicy::Lax => Self::Lax,
            SameSitePolicy::None => Self::None,
        }
    }
}

/// Attributes applied to both cookies.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CookieOptions {
    pub http_only: bool,
    pub path: String,
    pub same_site: SameSitePolicy,
    /// Defaults to `true` in release builds, or when the Rocket profile is `release`
    /// for configurations read through [`CsrfConfig::from_figment`].
    pub secure: bool,
    pub domain: Option<String>,
    /// Lifetime in seconds. Session cookies when unset.
    pub max_age: Option<i64>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            http_only: true,
            path: "/".to_owned(),
            same_site: SameSitePolicy::Lax,
            secure: cfg!(not(debug_assertions)),
            domain: None,
            max_age: None,
        }
    }
}

/// Settings for one CSRF protection instance.
///
/// Fixed once the protection is built and shared read-only by every request it handles.
/// Every field has a default, so an empty `[default.csrf]` table (or none at all) works:
///
/// ```toml
/// [default.csrf]
/// secret = "a long random signing key"
/// token_key = "XSRF-TOKEN"
/// error_message = "Invalid CSRF token"
/// ignored_methods = ["GET", "HEAD", "OPTIONS"]
///
/// [default.csrf.cookie]
/// http_only = true
/// path = "/"
/// same_site = "lax"
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CsrfConfig {
    /// Signing key for the token cookie. Tokens travel unsigned when absent or empty.
    pub secret: Option<SigningKey>,
    /// Name of the token cookie.
    pub token_key: String,
    /// Message sent with every validation failure.
    pub error_message: String,
    /// Methods that skip validation entirely.
    pub ignored_methods: Vec<String>,
    pub cookie: CookieOptions,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            secret: None,
            token_key: DEFAULT_TOKEN_COOKIE_NAME.to_owned(),
            error_message: DEFAULT_ERROR_MESSAGE.to_owned(),
            ignored_methods: DEFAULT_IGNORED_METHODS.map(str::to_owned).to_vec(),
            cookie: CookieOptions::default(),
        }
    }
}

impl CsrfConfig {
    /// Reads the [`CONFIG_KEY`] table from a Rocket figment.
    ///
    /// Unless `cookie.secure` is set explicitly it follows the selected profile: `true`
    /// for `release`, `false` otherwise.
    pub fn from_figment(figment: &Figment) -> Result<Self, rocket::figment::Error> {
        let mut config: Self = figment.focus(CONFIG_KEY).extract()?;
        if figment
            .find_value(&format!("{CONFIG_KEY}.cookie.secure"))
            .is_err()
        {
            config.cookie.secure = *figment.profile() == Config::RELEASE_PROFILE;
        }
        if config.secret.as_ref().is_some_and(|key| !key.is_usable()) {
            tracing::warn!("ignoring empty CSRF signing key, tokens will be unsigned");
            config.secret = None;
        }
        Ok(config)
    }

    /// Signs token cookies with `key`. An empty key leaves tokens unsigned.
    #[must_use]
    pub fn with_secret(mut self, key: impl Into<String>) -> Self {
        self.secret = Some(SigningKey::new(key)).filter(SigningKey::is_usable);
        self
    }

    #[must_use]
    pub fn with_token_key(mut self, name: impl Into<String>) -> Self {
        self.token_key = name.into();
        self
    }

    #[must_use]
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    #[must_use]
    pub fn with_ignored_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_cookie_options(mut self, cookie: CookieOptions) -> Self {
        self.cookie = cookie;
        self
    }

    /// Whether requests with `method` skip validation. Method names are compared
    /// case-insensitively.
    pub fn is_ignored(&self, method: &str) -> bool {
        self.ignored_methods
            .iter()
            .any(|ignored| ignored.eq_ignore_ascii_case(method))
    }
}

use crate::protection::CsrfProtection;

use rocket::{
    fairing::{self, Fairing, Info, Kind},
    Build, Rocket,
};

/// Reads the `csrf` configuration table and manages the resulting [`CsrfProtection`],
/// which the request guards use.
///
/// A [`CsrfProtection`] managed before ignition, for instance one with a custom token
/// authority, is left in place. Invalid configuration aborts launch.
#[derive(Clone, Copy, Debug, Default)]
pub struct CsrfFairing;

#[async_trait::async_trait]
impl Fairing for CsrfFairing {
    fn info(&self) -> Info {
        Info {
            name: "CSRF Protection",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> fairing::Result {
        if rocket.state::<CsrfProtection>().is_some() {
            tracing::debug!("using already managed CSRF protection");
            return Ok(rocket);
        }
        let configured = CsrfProtection::from_figment(rocket.figment());
        match configured {
            Ok(protection) => {
                tracing::debug!(
                    token_key = %protection.config().token_key,
                    signed = protection.config().secret.is_some(),
                    "CSRF protection configured"
                );
                Ok(rocket.manage(protection))
            }
            Err(error) => {
                tracing::error!(%error, "invalid CSRF configuration");
                Err(rocket)
            }
        }
    }
}

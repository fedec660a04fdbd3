use rocket::Config;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use time::Duration;

use crate::error::AuthError;

/// Settings for the session cookie and post-login navigation.
#[derive(Debug, Clone)]
pub struct Environment {
    uses_https: bool,
    login_time: Duration,
    cookie_name: String,
    login_redirect: String,
}

impl Environment {
    pub fn new(config: &Config) -> Result<Environment, AuthError> {
        let login_days: i64 = Environment::get_var_or("LOGIN_DAYS", 14)?;
        Ok(Environment {
            uses_https: config.profile != Config::DEBUG_PROFILE,
            login_time: Duration::days(login_days),
            cookie_name: env::var("COOKIE_NAME").unwrap_or_else(|_| "auth_token".to_string()),
            login_redirect: env::var("LOGIN_REDIRECT_URL").unwrap_or_else(|_| "/feed".to_string()),
        })
    }

    fn get_var_or<T>(name: &'static str, default: T) -> Result<T, AuthError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match env::var(name) {
            Ok(value) => value.parse().map_err(|err: T::Err| {
                tracing::warn!("invalid {}: {}", name, err);
                AuthError::InvalidVar { name, value }
            }),
            Err(_) => Ok(default),
        }
    }

    pub fn uses_https(&self) -> bool { self.uses_https }
    pub fn login_time(&self) -> Duration { self.login_time }
    pub fn cookie_name(&self) -> &str { &self.cookie_name }
    pub fn login_redirect(&self) -> &str { &self.login_redirect }
}

/// Reads a variable that has no sensible default.
pub fn required_var(name: &'static str) -> Result<String, AuthError> {
    env::var(name).map_err(|_| AuthError::MissingVar(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_profile_uses_plain_cookies() {
        let env = Environment::new(&Config::debug_default()).unwrap();
        assert!(!env.uses_https());
        assert_eq!(env.cookie_name(), "auth_token");
        assert_eq!(env.login_time(), Duration::days(14));
        assert_eq!(env.login_redirect(), "/feed");
    }

    #[test]
    fn missing_required_var_is_reported() {
        let err = required_var("AUTHRS_SURELY_UNSET_VARIABLE").unwrap_err();
        assert_eq!(err.to_string(), "AUTHRS_SURELY_UNSET_VARIABLE must be set");
    }
}

//! Sanity checks applied to a fully built [`Config`].

use crate::core::config::Config;
use crate::core::error::{AppError, Result};

pub(crate) fn validate(config: &Config) -> Result<()> {
    if config.email.is_some() != config.password.is_some() {
        return Err(AppError::Config(
            "email and password must be configured together".to_string(),
        ));
    }

    // Absent authentication is not rejected here: driver-service commands
    // run without it, and the credential resolver reports the miss when an
    // authenticated operation actually starts.
    if config.captcha_api_key.is_some() && config.captcha_solver_url.is_none() {
        return Err(AppError::Config(
            "captcha api_key set without a solver_url".to_string(),
        ));
    }

    let (min, max) = config.sleep_between_requests;
    if min < 0.0 || max < 0.0 || min > max {
        return Err(AppError::Config(format!(
            "invalid sleep_between_requests range: ({min}, {max})"
        )));
    }

    if config.base_url.cannot_be_a_base() {
        return Err(AppError::Config(format!(
            "base_url '{}' cannot be used as a base URL",
            config.base_url
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_email_without_password() {
        let config = Config {
            email: Some("a@b.c".into()),
            ..Config::default()
        };
        assert!(matches!(validate(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn rejects_api_key_without_solver_url() {
        let config = Config {
            captcha_api_key: Some("key".into()),
            ..Config::default()
        };
        assert!(matches!(validate(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn accepts_cookie_only_configuration() {
        let config = Config {
            cookie_string: Some("session=abc".into()),
            ..Config::default()
        };
        assert!(validate(&config).is_ok());
    }
}

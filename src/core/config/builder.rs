//! Builder applying file and environment overrides over the default config.

use std::time::Duration;
use url::Url;

use crate::core::config::{validation, Config, ConfigFile};
use crate::core::error::{AppError, Result};

/// Accumulates overrides and produces a validated [`Config`].
#[derive(Debug, Default, Clone)]
pub struct ConfigBuilder {
    file: Option<ConfigFile>,
    loaded_config_path: Option<String>,

    base_url: Option<String>,
    user_agent: Option<String>,
    cookie_string: Option<String>,
    email: Option<String>,
    password: Option<String>,
    default_account: Option<String>,
    captcha_solver_url: Option<String>,
    captcha_api_key: Option<String>,
    captcha_remote_browser: Option<bool>,
    webdriver_url: Option<String>,
    browser_path: Option<String>,
    chromedriver_path: Option<String>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a parsed configuration file. File values have the lowest
    /// precedence; explicit builder setters win.
    pub fn with_file(mut self, file: ConfigFile, path: Option<String>) -> Self {
        self.file = Some(file);
        self.loaded_config_path = path;
        self
    }

    pub fn base_url(mut self, value: impl Into<String>) -> Self {
        self.base_url = Some(value.into());
        self
    }

    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.user_agent = Some(value.into());
        self
    }

    pub fn cookie_string(mut self, value: impl Into<String>) -> Self {
        self.cookie_string = Some(value.into());
        self
    }

    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    pub fn password(mut self, value: impl Into<String>) -> Self {
        self.password = Some(value.into());
        self
    }

    pub fn default_account(mut self, value: impl Into<String>) -> Self {
        self.default_account = Some(value.into());
        self
    }

    pub fn captcha_solver_url(mut self, value: impl Into<String>) -> Self {
        self.captcha_solver_url = Some(value.into());
        self
    }

    pub fn captcha_api_key(mut self, value: impl Into<String>) -> Self {
        self.captcha_api_key = Some(value.into());
        self
    }

    pub fn captcha_remote_browser(mut self, value: bool) -> Self {
        self.captcha_remote_browser = Some(value);
        self
    }

    pub fn webdriver_url(mut self, value: impl Into<String>) -> Self {
        self.webdriver_url = Some(value.into());
        self
    }

    pub fn browser_path(mut self, value: impl Into<String>) -> Self {
        self.browser_path = Some(value.into());
        self
    }

    pub fn chromedriver_path(mut self, value: impl Into<String>) -> Self {
        self.chromedriver_path = Some(value.into());
        self
    }

    pub fn build(self) -> Result<Config> {
        let mut config = Config::default();
        let file = self.file.unwrap_or_default();
        config.loaded_config_path = self.loaded_config_path;

        if let Some(secs) = file.network.request_timeout {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let (Some(min), Some(max)) = (file.network.min_sleep, file.network.max_sleep) {
            config.sleep_between_requests = (min, max);
        }
        if let Some(ua) = self.user_agent.or(file.network.user_agent) {
            config.user_agent = ua;
        }

        if let Some(raw) = self.base_url.or(file.panel.base_url) {
            config.base_url = Url::parse(&raw)
                .map_err(|e| AppError::Config(format!("Invalid base_url '{raw}': {e}")))?;
        }
        config.default_account = self.default_account.or(file.panel.default_account);

        config.cookie_string = self.cookie_string.or(file.auth.cookie_string);
        config.email = self.email.or(file.auth.email);
        config.password = self.password.or(file.auth.password);

        config.captcha_solver_url = self.captcha_solver_url.or(file.captcha.solver_url);
        config.captcha_api_key = self.captcha_api_key.or(file.captcha.api_key);
        if let Some(flag) = self.captcha_remote_browser.or(file.captcha.remote_browser) {
            config.captcha_remote_browser = flag;
        }
        if let Some(secs) = file.captcha.solve_timeout {
            config.captcha_timeout = Duration::from_secs(secs);
        }

        if let Some(url) = self.webdriver_url.or(file.browser.webdriver_url) {
            config.webdriver_url = url;
        }
        config.browser_path = self.browser_path.or(file.browser.browser_path);
        config.chromedriver_path = self.chromedriver_path.or(file.browser.chromedriver_path);
        if let Some(secs) = file.browser.navigation_timeout {
            config.navigation_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.browser.element_timeout {
            config.element_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.browser.settle_delay {
            config.settle_delay = Duration::from_secs(secs);
        }
        if let Some(secs) = file.browser.submit_settle_delay {
            config.submit_settle_delay = Duration::from_secs(secs);
        }

        validation::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_setters_override_file_values() {
        let file: ConfigFile = toml::from_str(
            r#"
            [auth]
            email = "file@example.com"
            password = "file-pass"

            [panel]
            default_account = "if0_11111111"
            "#,
        )
        .unwrap();

        let config = ConfigBuilder::new()
            .with_file(file, Some("dash-pilot.toml".into()))
            .email("env@example.com")
            .build()
            .unwrap();

        assert_eq!(config.email.as_deref(), Some("env@example.com"));
        assert_eq!(config.password.as_deref(), Some("file-pass"));
        assert_eq!(config.default_account.as_deref(), Some("if0_11111111"));
        assert_eq!(config.loaded_config_path.as_deref(), Some("dash-pilot.toml"));
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let err = ConfigBuilder::new()
            .cookie_string("a=1")
            .base_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}

//! Defines the structure mirroring the TOML configuration file format.

use serde::Deserialize;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub(crate) network: NetworkConfig,
    #[serde(default)]
    pub(crate) panel: PanelConfig,
    #[serde(default)]
    pub(crate) auth: AuthConfig,
    #[serde(default)]
    pub(crate) captcha: CaptchaConfig,
    #[serde(default)]
    pub(crate) browser: BrowserConfig,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct NetworkConfig {
    pub(crate) request_timeout: Option<u64>,
    pub(crate) min_sleep: Option<f32>,
    pub(crate) max_sleep: Option<f32>,
    pub(crate) user_agent: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct PanelConfig {
    pub(crate) base_url: Option<String>,
    pub(crate) default_account: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct AuthConfig {
    pub(crate) email: Option<String>,
    pub(crate) password: Option<String>,
    pub(crate) cookie_string: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct CaptchaConfig {
    pub(crate) solver_url: Option<String>,
    pub(crate) api_key: Option<String>,
    pub(crate) remote_browser: Option<bool>,
    pub(crate) solve_timeout: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct BrowserConfig {
    pub(crate) webdriver_url: Option<String>,
    pub(crate) browser_path: Option<String>,
    pub(crate) chromedriver_path: Option<String>,
    pub(crate) navigation_timeout: Option<u64>,
    pub(crate) element_timeout: Option<u64>,
    pub(crate) settle_delay: Option<u64>,
    pub(crate) submit_settle_delay: Option<u64>,
}

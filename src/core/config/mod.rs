//! Defines the core runtime `Config` struct, its defaults, and related utilities.
//! Submodules handle loading, building, and validation.

pub(crate) mod builder;
pub(crate) mod file;
pub(crate) mod loading;
pub(crate) mod validation;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;
pub use loading::load_config;

use std::time::Duration;
use url::Url;

/// Default desktop user agent presented to the panel. Scraped login flows are
/// served a CAPTCHA wall more aggressively for obviously non-browser agents.
pub(crate) const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Runtime configuration settings used by the dash-pilot core logic.
#[derive(Clone)]
pub struct Config {
    /// Origin of the hosting panel dashboard.
    pub base_url: Url,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub sleep_between_requests: (f32, f32),

    /// Pre-captured cookie string; when set it takes precedence over
    /// credential login.
    pub cookie_string: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Account id used when a caller omits one.
    pub default_account: Option<String>,

    /// CAPTCHA bypass service endpoint; enables the bypass login strategy.
    pub captcha_solver_url: Option<String>,
    pub captcha_api_key: Option<String>,
    /// Solve the login CAPTCHA inside the WebDriver browser instead of a
    /// bypass service.
    pub captcha_remote_browser: bool,
    pub captcha_timeout: Duration,

    /// WebDriver endpoint used for dynamic-form flows and remote CAPTCHA
    /// solving.
    pub webdriver_url: String,
    /// Explicit browser binary; auto-discovered across common install
    /// locations when unset.
    pub browser_path: Option<String>,
    pub chromedriver_path: Option<String>,
    pub navigation_timeout: Duration,
    pub element_timeout: Duration,
    pub settle_delay: Duration,
    pub submit_settle_delay: Duration,

    pub loaded_config_path: Option<String>,
}

impl Config {
    fn build_default() -> Self {
        let base_url = Url::parse("https://dash.infinityfree.com")
            .expect("Default base URL failed to parse. This is a bug.");

        Config {
            base_url,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
            sleep_between_requests: (0.1, 0.5),
            cookie_string: None,
            email: None,
            password: None,
            default_account: None,
            captcha_solver_url: None,
            captcha_api_key: None,
            captcha_remote_browser: false,
            captcha_timeout: Duration::from_secs(90),
            webdriver_url: "http://localhost:4444".to_string(),
            browser_path: None,
            chromedriver_path: None,
            navigation_timeout: Duration::from_secs(30),
            element_timeout: Duration::from_secs(10),
            settle_delay: Duration::from_secs(2),
            submit_settle_delay: Duration::from_secs(3),
            loaded_config_path: None,
        }
    }

    /// Login page URL on the configured panel.
    pub fn login_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/login");
        url
    }

    /// Accounts listing URL, used as the authenticated-only probe target.
    pub fn accounts_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/accounts");
        url
    }

    /// Account-detail URL; also the account's domains listing.
    pub fn account_url(&self, account_id: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("/accounts/{account_id}"));
        url
    }

    /// Domain-creation page for an account (a dynamic, script-rendered form).
    pub fn domain_create_url(&self, account_id: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("/accounts/{account_id}/domains/create"));
        url
    }

    /// Domain-detail page for a registered domain.
    pub fn domain_url(&self, account_id: &str, domain: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("/accounts/{account_id}/domains/{domain}"));
        url
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::build_default()
    }
}

// Credentials and cookies stay out of debug output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent)
            .field("request_timeout", &self.request_timeout)
            .field("sleep_between_requests", &self.sleep_between_requests)
            .field("cookie_string", &self.cookie_string.as_ref().map(|_| "<set>"))
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<set>"))
            .field("default_account", &self.default_account)
            .field("captcha_solver_url", &self.captcha_solver_url)
            .field(
                "captcha_api_key",
                &self.captcha_api_key.as_ref().map(|_| "<set>"),
            )
            .field("captcha_remote_browser", &self.captcha_remote_browser)
            .field("captcha_timeout", &self.captcha_timeout)
            .field("webdriver_url", &self.webdriver_url)
            .field("browser_path", &self.browser_path)
            .field("chromedriver_path", &self.chromedriver_path)
            .field("navigation_timeout", &self.navigation_timeout)
            .field("element_timeout", &self.element_timeout)
            .field("settle_delay", &self.settle_delay)
            .field("submit_settle_delay", &self.submit_settle_delay)
            .field("loaded_config_path", &self.loaded_config_path)
            .finish()
    }
}

/// Utility function to get a random sleep duration based on [`Config`].
///
/// Uses the `sleep_between_requests` setting from the provided configuration.
pub fn get_random_sleep_duration(config: &Config) -> Duration {
    use rand::Rng;
    let (min, max) = config.sleep_between_requests;
    if min >= max {
        return Duration::from_secs_f32(min.max(0.0));
    }
    let duration_secs = rand::thread_rng().gen_range(min..max);
    Duration::from_secs_f32(duration_secs)
}

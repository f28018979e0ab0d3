//! Remote-browser CAPTCHA solving.
//!
//! Opens the login page in the WebDriver browser and waits for the embedded
//! Turnstile widget to solve itself, then captures everything the solver
//! observed: the challenge token, the page source (for the CSRF token), the
//! browser's cookies and its user agent. The HTTP login submission then
//! happens under the same fingerprint the challenge was solved with.

use std::time::Duration;

use fantoccini::Client;
use tokio::time::{sleep, Instant};

use crate::automation::utils::{browser, selectors::LoginSelectors};
use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::session::SessionCookie;

const TOKEN_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Everything captured from the remote browser after a solved challenge.
pub struct SolvedLogin {
    pub token: String,
    pub page_html: String,
    pub cookies: Vec<SessionCookie>,
    pub user_agent: Option<String>,
}

/// Drives the WebDriver browser through the login-page challenge. The
/// browser is a one-shot resource: released on every path.
pub async fn solve_login_challenge(config: &Config) -> Result<SolvedLogin> {
    let label = "[Remote solve]";
    tracing::info!(target: "auth", "{label} Solving login challenge via {}", config.webdriver_url);

    let client = browser::connect(config).await?;
    let result = observe_login_challenge(&client, config, label).await;

    if let Err(e) = client.close().await {
        tracing::warn!(target: "auth", "{label} Failed to close WebDriver client cleanly: {e}");
    }
    result
}

async fn observe_login_challenge(
    client: &Client,
    config: &Config,
    label: &str,
) -> Result<SolvedLogin> {
    let login_url = config.login_url();
    client.goto(login_url.as_str()).await?;
    sleep(config.settle_delay).await;

    let deadline = Instant::now() + config.captcha_timeout;
    let token = loop {
        if let Ok(input) = client.find(LoginSelectors::turnstile_response()).await {
            if let Some(value) = input.prop("value").await? {
                if !value.is_empty() {
                    break value;
                }
            }
        }
        if Instant::now() >= deadline {
            return Err(AppError::Timeout(format!(
                "Turnstile not solved within {:?}",
                config.captcha_timeout
            )));
        }
        sleep(TOKEN_POLL_INTERVAL).await;
    };
    tracing::info!(target: "auth", "{label} Turnstile solved");

    let cookies = client
        .get_all_cookies()
        .await?
        .into_iter()
        .map(|cookie| SessionCookie {
            name: cookie.name().to_string(),
            value: cookie.value().to_string(),
        })
        .collect();

    let user_agent = match client.execute("return navigator.userAgent;", vec![]).await {
        Ok(value) => value.as_str().map(String::from),
        Err(e) => {
            tracing::warn!(target: "auth", "{label} Could not read browser user agent: {e}");
            None
        }
    };

    let page_html = client.source().await?;

    Ok(SolvedLogin {
        token,
        page_html,
        cookies,
        user_agent,
    })
}

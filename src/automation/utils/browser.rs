//! Browser interaction utilities for dynamic-form workflows.

use crate::automation::utils::chromium;
use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::session::Session;
use fantoccini::cookies::Cookie;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use futures::future::select_ok;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing;

/// Connects a WebDriver client with Chrome capabilities.
///
/// The configured browser binary (or the first one discovered among common
/// install locations) is passed through as the Chrome `binary` capability;
/// when neither exists the WebDriver's own default is used.
pub async fn connect(config: &Config) -> Result<Client> {
    let mut caps = serde_json::map::Map::new();
    let mut chrome_opts = serde_json::map::Map::new();

    let args = vec![
        "--headless=new",
        "--no-sandbox",
        "--disable-gpu",
        "--disable-dev-shm-usage",
        "--window-size=1280,800",
        "--disable-extensions",
        "--disable-background-networking",
        "--disable-sync",
        "--disable-translate",
        "--mute-audio",
        "--safebrowsing-disable-auto-update",
        "--ignore-certificate-errors",
        "--log-level=1",
    ];
    chrome_opts.insert("args".to_string(), serde_json::json!(args));

    let binary = config
        .browser_path
        .clone()
        .or_else(|| chromium::discover().map(|path| path.display().to_string()));
    if let Some(binary) = binary {
        chrome_opts.insert("binary".to_string(), serde_json::json!(binary));
    }

    caps.insert("browserName".to_string(), serde_json::json!("chrome"));
    caps.insert(
        "goog:chromeOptions".to_string(),
        serde_json::json!(chrome_opts),
    );

    tracing::debug!(target: "automation", "Connecting to WebDriver at {}...", config.webdriver_url);
    let mut builder = ClientBuilder::native();
    let builder = builder.capabilities(caps);
    match builder.connect(&config.webdriver_url).await {
        Ok(client) => {
            tracing::info!(target: "automation", "WebDriver client connected successfully.");
            Ok(client)
        }
        Err(e) => {
            tracing::error!(target: "automation", "Failed to connect to WebDriver at {}: {}", config.webdriver_url, e);
            Err(e.into())
        }
    }
}

/// Replays every session cookie into the browser context so the page loads
/// already authenticated. WebDriver only accepts cookies for the current
/// document's domain, so the site origin is visited first.
pub async fn replay_session_cookies(client: &Client, session: &Session, label: &str) -> Result<()> {
    client.goto(session.base_url().as_str()).await?;

    let domain = session.cookie_domain();
    let snapshot = session.cookies_snapshot();
    let count = snapshot.len();
    for session_cookie in snapshot {
        let mut cookie = Cookie::new(session_cookie.name, session_cookie.value);
        cookie.set_domain(domain.clone());
        cookie.set_path("/");
        client.add_cookie(cookie).await?;
    }

    tracing::debug!(target: "automation", "{} Replayed {} session cookies into browser", label, count);
    Ok(())
}

/// Navigates to a URL and waits for page to load.
///
/// # Arguments
/// * `client` - The WebDriver client
/// * `url` - The URL to navigate to
/// * `ready_locator` - Locator for element indicating page is ready
/// * `timeout` - Maximum time to wait for page to load
/// * `label` - Task label for logging
pub async fn navigate_to(
    client: &Client,
    url: &str,
    ready_locator: Locator<'_>,
    timeout: Duration,
    label: &str,
) -> Result<()> {
    tracing::debug!(target: "automation", "{} Navigating to: {}", label, url);

    client.goto(url).await.map_err(|e| {
        tracing::error!("{} Failed to navigate: {}", label, e);
        AppError::from(e)
    })?;

    tracing::debug!(target: "automation", "{} Waiting for page to load...", label);
    client
        .wait()
        .at_most(timeout)
        .for_element(ready_locator)
        .await?;

    sleep(Duration::from_millis(300)).await;
    Ok(())
}

/// Waits for an input element, then enters text.
pub async fn wait_and_type(
    client: &Client,
    locator: Locator<'_>,
    text: &str,
    timeout: Duration,
    label: &str,
) -> Result<()> {
    tracing::debug!(target: "automation", "{} Waiting for input element: {:?}", label, locator);

    let input = client.wait().at_most(timeout).for_element(locator).await?;
    input.send_keys(text).await?;

    // Brief pause to allow input to complete
    sleep(Duration::from_millis(300)).await;
    Ok(())
}

/// Waits until any of the given elements appears, whichever comes first.
pub async fn wait_for_any(
    client: &Client,
    locators: Vec<Locator<'static>>,
    timeout: Duration,
    label: &str,
) -> Result<()> {
    tracing::debug!(target: "automation", "{} Waiting for any of {} elements...", label, locators.len());

    let mut element_futures: Vec<Pin<Box<dyn futures::Future<Output = Result<()>> + Send>>> =
        Vec::new();

    for locator in locators {
        let client = client.clone();
        let future = Box::pin(async move {
            client
                .wait()
                .at_most(timeout)
                .for_element(locator)
                .await
                .map(|_| ())
                .map_err(AppError::from)
        });
        element_futures.push(future);
    }

    match select_ok(element_futures).await {
        Ok(((), _)) => Ok(()),
        Err(e) => Err(AppError::Timeout(format!(
            "{label} none of the expected form elements appeared: {e}"
        ))),
    }
}

/// Best-effort dismissal of the first-run privacy/consent overlay. Absence
/// of the overlay is not an error.
pub async fn dismiss_consent_overlay(client: &Client, config: &Config, label: &str) -> bool {
    let Ok(buttons) = client.find_all(Locator::Css("button")).await else {
        return false;
    };

    for button in buttons {
        let text = button.text().await.unwrap_or_default();
        if text.to_uppercase().contains("CONFIRM") {
            tracing::debug!(target: "automation", "{} Dismissing privacy overlay", label);
            if button.click().await.is_ok() {
                sleep(config.settle_delay).await;
                return true;
            }
            return false;
        }
    }

    tracing::debug!(target: "automation", "{} No privacy overlay found", label);
    false
}

/// Locates the action control whose visible text or Livewire `wire:click`
/// attribute matches one of the given keywords (case-insensitive).
///
/// This is the most fragile step of every dynamic flow, so it is isolated
/// here: a control rename on the remote site produces one diagnosable
/// `ControlNotFound`, never a silent wrong action.
pub async fn find_action_control(
    client: &Client,
    scope: Locator<'static>,
    keywords: &[&str],
    label: &str,
) -> Result<Element> {
    let controls = client.find_all(scope).await?;

    for control in controls {
        let text = control.text().await.unwrap_or_default().to_lowercase();
        let action = control
            .attr("wire:click")
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
            .to_lowercase();

        if keywords
            .iter()
            .any(|keyword| text.contains(keyword) || action.contains(keyword))
        {
            tracing::debug!(target: "automation", "{} Matched action control: text='{}'", label, text);
            return Ok(control);
        }
    }

    Err(AppError::ControlNotFound(format!(
        "no control matching any of [{}]",
        keywords.join(", ")
    )))
}

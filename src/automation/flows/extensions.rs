//! Extension-catalog fetch: which free-subdomain suffixes are on offer.
//!
//! The catalog only exists inside the dynamic creation form, so reading it
//! costs a full browser pass. Callers cache the result for the life of the
//! process (see [`Automation`](crate::automation::Automation)).

use fantoccini::Client;
use tokio::time::{sleep, Instant};

use crate::automation::flows::FREE_SUBDOMAIN_KEYWORDS;
use crate::automation::utils::{browser, selectors::DomainFormSelectors};
use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::core::models::Extension;
use crate::session::Session;

/// Fetches the available free-subdomain extensions as (value, label) pairs.
pub async fn fetch_extensions(
    config: &Config,
    session: &Session,
    account_id: &str,
) -> Result<Vec<Extension>> {
    let label = "[Extensions]";
    tracing::info!(target: "automation", "{label} Fetching available subdomain extensions");
    let start_time = Instant::now();

    let client = browser::connect(config).await?;
    let result = collect_extensions(&client, config, session, account_id, label).await;

    if let Err(e) = client.close().await {
        tracing::warn!(target: "automation", "{label} Failed to close WebDriver client cleanly: {e}");
    }

    match &result {
        Ok(extensions) => {
            tracing::info!(
                target: "automation",
                "{label} Found {} extensions in {:.2?}",
                extensions.len(),
                start_time.elapsed()
            );
        }
        Err(e) => {
            tracing::error!(target: "automation", "{label} Failed in {:.2?}: {e}", start_time.elapsed());
        }
    }
    result
}

async fn collect_extensions(
    client: &Client,
    config: &Config,
    session: &Session,
    account_id: &str,
    label: &str,
) -> Result<Vec<Extension>> {
    browser::replay_session_cookies(client, session, label).await?;

    let create_url = config.domain_create_url(account_id);
    browser::navigate_to(
        client,
        create_url.as_str(),
        DomainFormSelectors::mode_button(),
        config.navigation_timeout,
        label,
    )
    .await?;
    sleep(config.settle_delay).await;

    browser::dismiss_consent_overlay(client, config, label).await;

    let mode_control = browser::find_action_control(
        client,
        DomainFormSelectors::action_controls(),
        FREE_SUBDOMAIN_KEYWORDS,
        label,
    )
    .await?;
    mode_control.click().await?;

    client
        .wait()
        .at_most(config.element_timeout)
        .for_element(DomainFormSelectors::extension_select())
        .await?;
    sleep(config.settle_delay).await;

    let mut extensions = Vec::new();
    for option in client
        .find_all(DomainFormSelectors::extension_options())
        .await?
    {
        let Some(value) = option.attr("value").await? else {
            continue;
        };
        if value.trim().is_empty() {
            continue;
        }
        let text = option.text().await.unwrap_or_default().trim().to_string();
        extensions.push(Extension {
            label: if text.is_empty() { value.clone() } else { text },
            value,
        });
    }

    if extensions.is_empty() {
        // An empty catalog would be cached forever; treat it as a structure
        // change instead.
        return Err(AppError::UnexpectedResponse(
            "extension selector appeared but offered no options".to_string(),
        ));
    }

    Ok(extensions)
}

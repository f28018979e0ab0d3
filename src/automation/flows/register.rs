//! Domain registration through the dynamic creation form.
//!
//! Covers both modes of the form: a free subdomain (name + extension select)
//! and a custom subdomain under an already-owned parent domain (single
//! hostname input).

use std::time::Duration;

use fantoccini::Client;
use tokio::time::{sleep, Instant};

use crate::automation::flows::{
    CUSTOM_DOMAIN_KEYWORDS, FREE_SUBDOMAIN_KEYWORDS, SUBMIT_KEYWORDS,
};
use crate::automation::utils::{browser, selectors::DomainFormSelectors};
use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::core::models::RegistrationOutcome;
use crate::scrape::markers;
use crate::session::Session;

const OUTCOME_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Which branch of the creation form to drive.
pub enum RegistrationMode {
    FreeSubdomain {
        subdomain: String,
        extension: String,
    },
    CustomSubdomain {
        parent_domain: String,
        subdomain: String,
    },
}

impl RegistrationMode {
    /// The fully qualified hostname being registered.
    pub fn full_domain(&self) -> String {
        match self {
            RegistrationMode::FreeSubdomain {
                subdomain,
                extension,
            } => format!("{subdomain}.{extension}"),
            RegistrationMode::CustomSubdomain {
                parent_domain,
                subdomain,
            } => format!("{subdomain}.{parent_domain}"),
        }
    }

    fn mode_keywords(&self) -> &'static [&'static str] {
        match self {
            RegistrationMode::FreeSubdomain { .. } => FREE_SUBDOMAIN_KEYWORDS,
            RegistrationMode::CustomSubdomain { .. } => CUSTOM_DOMAIN_KEYWORDS,
        }
    }
}

/// Runs a registration flow end to end. The browser is a one-shot resource:
/// released on every path, success or failure.
pub async fn register(
    config: &Config,
    session: &Session,
    account_id: &str,
    mode: RegistrationMode,
) -> Result<RegistrationOutcome> {
    let domain = mode.full_domain();
    let label = format!("[Register: {domain}]");
    tracing::info!(target: "automation", "{label} Starting registration flow");
    let start_time = Instant::now();

    let client = browser::connect(config).await?;
    let result = perform_registration(&client, config, session, account_id, &mode, &label).await;

    if let Err(e) = client.close().await {
        tracing::warn!(target: "automation", "{label} Failed to close WebDriver client cleanly: {e}");
    }

    let duration = start_time.elapsed();
    match &result {
        Ok(outcome) => {
            tracing::info!(target: "automation", "{label} Finished in {duration:.2?}: {}", outcome.message);
        }
        Err(e) => {
            tracing::error!(target: "automation", "{label} Failed in {duration:.2?}: {e}");
        }
    }
    result
}

async fn perform_registration(
    client: &Client,
    config: &Config,
    session: &Session,
    account_id: &str,
    mode: &RegistrationMode,
    label: &str,
) -> Result<RegistrationOutcome> {
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

    tracing::debug!(target: "automation", "{label} Selecting registration mode");
    let mode_control = browser::find_action_control(
        client,
        DomainFormSelectors::action_controls(),
        mode.mode_keywords(),
        label,
    )
    .await?;
    mode_control.click().await?;

    match mode {
        RegistrationMode::FreeSubdomain {
            subdomain,
            extension,
        } => {
            browser::wait_for_any(
                client,
                vec![
                    DomainFormSelectors::subdomain_name_input(),
                    DomainFormSelectors::extension_select(),
                ],
                config.element_timeout,
                label,
            )
            .await?;

            browser::wait_and_type(
                client,
                DomainFormSelectors::subdomain_name_input(),
                subdomain,
                config.element_timeout,
                label,
            )
            .await?;

            tracing::debug!(target: "automation", "{label} Selecting extension {extension}");
            let select = client
                .wait()
                .at_most(config.element_timeout)
                .for_element(DomainFormSelectors::extension_select())
                .await?;
            select.select_by_value(extension).await?;
        }
        RegistrationMode::CustomSubdomain { .. } => {
            browser::wait_and_type(
                client,
                DomainFormSelectors::custom_domain_input(),
                &mode.full_domain(),
                config.element_timeout,
                label,
            )
            .await?;
        }
    }

    tracing::debug!(target: "automation", "{label} Submitting form");
    let submit = browser::find_action_control(
        client,
        DomainFormSelectors::action_controls(),
        SUBMIT_KEYWORDS,
        label,
    )
    .await?;
    submit.click().await?;

    sleep(config.submit_settle_delay).await;
    let signal = await_submission_signal(client, config).await?;

    let domain = mode.full_domain();
    match signal {
        PageSignal::DetailPage => Ok(RegistrationOutcome {
            message: format!("Domain {domain} registered successfully"),
            domain,
        }),
        PageSignal::SuccessBanner(message) => Ok(RegistrationOutcome { message, domain }),
        PageSignal::ErrorBanner(message) => Err(AppError::RemoteRejected(message)),
        PageSignal::Inconclusive => {
            // Weakest success signal: the framework dismissed the form
            // without navigating or rendering a banner.
            let form_dismissed = browser::find_action_control(
                client,
                DomainFormSelectors::action_controls(),
                SUBMIT_KEYWORDS,
                label,
            )
            .await
            .is_err();

            if form_dismissed {
                Ok(RegistrationOutcome {
                    message: format!("Domain {domain} registered (form accepted)"),
                    domain,
                })
            } else {
                Err(AppError::UnexpectedResponse(
                    "no registration outcome signal after submission".to_string(),
                ))
            }
        }
    }
}

/// Polls for the first post-submission signal within the navigation timeout.
async fn await_submission_signal(client: &Client, config: &Config) -> Result<PageSignal> {
    let deadline = Instant::now() + config.navigation_timeout;
    loop {
        let url = client.current_url().await?;
        let html = client.source().await?;
        let signal = classify_registration_page(url.as_str(), &html);
        if signal != PageSignal::Inconclusive {
            return Ok(signal);
        }
        if Instant::now() >= deadline {
            return Ok(PageSignal::Inconclusive);
        }
        sleep(OUTCOME_POLL_INTERVAL).await;
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum PageSignal {
    DetailPage,
    SuccessBanner(String),
    ErrorBanner(String),
    Inconclusive,
}

/// Ordered classification of the page state after form submission: a
/// domain-detail URL is the strongest signal, then an explicit banner.
pub(crate) fn classify_registration_page(url: &str, html: &str) -> PageSignal {
    if url.contains("/domains/") && !url.contains("/create") {
        return PageSignal::DetailPage;
    }
    if let Some(banner) = markers::success_banner(html) {
        return PageSignal::SuccessBanner(banner);
    }
    if let Some(banner) = markers::error_banner(html) {
        return PageSignal::ErrorBanner(banner);
    }
    PageSignal::Inconclusive
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREATE_URL: &str = "https://dash.infinityfree.com/accounts/if0_1/domains/create";

    #[test]
    fn full_domain_joins_subdomain_and_extension() {
        let free = RegistrationMode::FreeSubdomain {
            subdomain: "myapp".into(),
            extension: "rf.gd".into(),
        };
        assert_eq!(free.full_domain(), "myapp.rf.gd");

        let custom = RegistrationMode::CustomSubdomain {
            parent_domain: "scrapes.xo.je".into(),
            subdomain: "api".into(),
        };
        assert_eq!(custom.full_domain(), "api.scrapes.xo.je");
    }

    #[test]
    fn detail_page_url_wins_over_banners() {
        let url = "https://dash.infinityfree.com/accounts/if0_1/domains/myapp.rf.gd";
        let html = r#"<div class="alert-danger">stale banner</div>"#;
        assert_eq!(classify_registration_page(url, html), PageSignal::DetailPage);
    }

    #[test]
    fn create_url_is_not_a_detail_page() {
        assert_eq!(
            classify_registration_page(CREATE_URL, "<body></body>"),
            PageSignal::Inconclusive
        );
    }

    #[test]
    fn success_banner_is_read_before_error_banner() {
        let html = r#"<div class="alert-success">Domain created</div>"#;
        assert_eq!(
            classify_registration_page(CREATE_URL, html),
            PageSignal::SuccessBanner("Domain created".to_string())
        );
    }

    #[test]
    fn error_banner_is_reported_verbatim() {
        let html = r#"<div class="alert-danger">This subdomain is already taken</div>"#;
        assert_eq!(
            classify_registration_page(CREATE_URL, html),
            PageSignal::ErrorBanner("This subdomain is already taken".to_string())
        );
    }
}

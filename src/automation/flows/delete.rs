//! Domain deletion through the domain-detail page.
//!
//! The delete control moves around between panel releases, so the search is
//! deliberately broad: any button or link whose text or action suggests
//! deletion, followed by a best-effort confirmation click. Success evidence
//! is three-tiered, mirroring the lenient DNS-record deletion path.

use fantoccini::Client;
use tokio::time::{sleep, Instant};

use crate::automation::utils::{browser, selectors::DomainFormSelectors};
use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::core::models::ActionOutcome;
use crate::scrape::markers;
use crate::session::Session;

const DELETE_KEYWORDS: &[&str] = &["delete", "remove"];
const CONFIRM_KEYWORDS: &[&str] = &["confirm", "yes", "delete"];

/// Deletes a domain from an account.
pub async fn delete_domain(
    config: &Config,
    session: &Session,
    account_id: &str,
    domain: &str,
) -> Result<ActionOutcome> {
    let label = format!("[Delete domain: {domain}]");
    tracing::info!(target: "automation", "{label} Starting deletion flow");
    let start_time = Instant::now();

    let client = browser::connect(config).await?;
    let result = perform_deletion(&client, config, session, account_id, domain, &label).await;

    if let Err(e) = client.close().await {
        tracing::warn!(target: "automation", "{label} Failed to close WebDriver client cleanly: {e}");
    }

    match &result {
        Ok(outcome) => {
            tracing::info!(target: "automation", "{label} Finished in {:.2?}: {}", start_time.elapsed(), outcome.message);
        }
        Err(e) => {
            tracing::error!(target: "automation", "{label} Failed in {:.2?}: {e}", start_time.elapsed());
        }
    }
    result
}

async fn perform_deletion(
    client: &Client,
    config: &Config,
    session: &Session,
    account_id: &str,
    domain: &str,
    label: &str,
) -> Result<ActionOutcome> {
    browser::replay_session_cookies(client, session, label).await?;

    let domain_url = config.domain_url(account_id, domain);
    browser::navigate_to(
        client,
        domain_url.as_str(),
        fantoccini::Locator::Css("body"),
        config.navigation_timeout,
        label,
    )
    .await?;
    sleep(config.settle_delay).await;

    browser::dismiss_consent_overlay(client, config, label).await;

    let delete_control = browser::find_action_control(
        client,
        DomainFormSelectors::action_controls(),
        DELETE_KEYWORDS,
        label,
    )
    .await?;
    delete_control.click().await?;
    sleep(config.settle_delay).await;

    // A confirmation dialog may or may not appear; clicking it is
    // best-effort.
    match browser::find_action_control(
        client,
        DomainFormSelectors::action_controls(),
        CONFIRM_KEYWORDS,
        label,
    )
    .await
    {
        Ok(confirm) => {
            tracing::debug!(target: "automation", "{label} Clicking confirmation control");
            confirm.click().await?;
        }
        Err(AppError::ControlNotFound(_)) => {
            tracing::debug!(target: "automation", "{label} No confirmation dialog appeared");
        }
        Err(e) => return Err(e),
    }

    sleep(config.submit_settle_delay).await;
    let html = client.source().await?;
    classify_deletion_page(&html, domain)
}

/// Three-tier deletion evidence: an explicit banner, the domain vanishing
/// from the page, or the lenient "request sent" fallback.
pub(crate) fn classify_deletion_page(html: &str, domain: &str) -> Result<ActionOutcome> {
    if let Some(banner) = markers::error_banner(html) {
        return Err(AppError::RemoteRejected(banner));
    }
    if let Some(banner) = markers::success_banner(html) {
        return Ok(ActionOutcome::confirmed(banner));
    }
    if !html.contains(domain) {
        return Ok(ActionOutcome::confirmed(format!(
            "Domain {domain} is no longer listed"
        )));
    }
    Ok(ActionOutcome::best_effort(format!(
        "Deletion request for {domain} sent"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_banner_rejects_the_deletion() {
        let html = r#"<div class="alert-danger">Domain cannot be removed yet</div>
                      <p>myapp.rf.gd</p>"#;
        let err = classify_deletion_page(html, "myapp.rf.gd").unwrap_err();
        assert!(matches!(err, AppError::RemoteRejected(m) if m == "Domain cannot be removed yet"));
    }

    #[test]
    fn success_banner_confirms_the_deletion() {
        let html = r#"<div class="alert-success">Domain deleted</div>"#;
        let outcome = classify_deletion_page(html, "myapp.rf.gd").unwrap();
        assert!(outcome.confirmed);
        assert_eq!(outcome.message, "Domain deleted");
    }

    #[test]
    fn vanished_domain_counts_as_confirmation() {
        let html = "<body><h1>Domains</h1><p>other.rf.gd</p></body>";
        let outcome = classify_deletion_page(html, "myapp.rf.gd").unwrap();
        assert!(outcome.confirmed);
    }

    #[test]
    fn ambiguous_page_yields_best_effort_outcome() {
        let html = "<body><p>myapp.rf.gd</p></body>";
        let outcome = classify_deletion_page(html, "myapp.rf.gd").unwrap();
        assert!(!outcome.confirmed);
        assert!(outcome.message.contains("request"));
    }
}

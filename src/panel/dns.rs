//! DNS record CRUD: listing, fetch-token-then-submit creation, and the
//! lenient deletion path.

use reqwest::header::LOCATION;
use url::Url;

use crate::core::error::{AppError, Result};
use crate::core::models::{ActionOutcome, DeleteHandle, DnsRecord};
use crate::panel::PanelClient;
use crate::scrape::{listing, markers};
use crate::session::authenticator::header_string;

/// Path segment of a domain's records listing; a redirect containing it is
/// the strongest write-success signal.
const DNS_LISTING_SEGMENT: &str = "dnsRecords";

fn dns_records_url(base: &Url, account_id: &str, domain: &str) -> Url {
    let mut url = base.clone();
    url.set_path(&format!(
        "/accounts/{account_id}/domains/{domain}/{DNS_LISTING_SEGMENT}"
    ));
    url
}

fn record_create_url(base: &Url, account_id: &str, domain: &str, kind: &str) -> Url {
    let mut url = base.clone();
    url.set_path(&format!(
        "/accounts/{account_id}/domains/{domain}/{kind}Records/create"
    ));
    url
}

fn record_submit_url(base: &Url, account_id: &str, domain: &str, kind: &str) -> Url {
    let mut url = base.clone();
    url.set_path(&format!(
        "/accounts/{account_id}/domains/{domain}/{kind}Records"
    ));
    url
}

impl PanelClient {
    /// DNS records of a domain, scraped from the records table.
    pub async fn list_dns_records(
        &self,
        account_id: &str,
        domain: &str,
    ) -> Result<Vec<DnsRecord>> {
        tracing::debug!(target: "panel", "Listing DNS records for {domain}");
        let url = dns_records_url(&self.config().base_url, account_id, domain);
        let body = self.fetch_page(&url).await?;
        Ok(listing::parse_dns_records(&body))
    }

    /// Creates a CNAME record pointing `host` at `target`.
    pub async fn create_cname(
        &self,
        account_id: &str,
        domain: &str,
        host: &str,
        target: &str,
    ) -> Result<ActionOutcome> {
        self.create_record(
            account_id,
            domain,
            "cname",
            vec![
                ("name".to_string(), host.to_string()),
                ("target".to_string(), target.to_string()),
            ],
            &format!("CNAME record {host}"),
        )
        .await
    }

    /// Creates an MX record with the given priority.
    pub async fn create_mx(
        &self,
        account_id: &str,
        domain: &str,
        priority: u16,
        target: &str,
    ) -> Result<ActionOutcome> {
        self.create_record(
            account_id,
            domain,
            "mx",
            vec![
                ("priority".to_string(), priority.to_string()),
                ("target".to_string(), target.to_string()),
            ],
            &format!("MX record (priority {priority})"),
        )
        .await
    }

    /// Creates a TXT record carrying `content`.
    pub async fn create_txt(
        &self,
        account_id: &str,
        domain: &str,
        host: &str,
        content: &str,
    ) -> Result<ActionOutcome> {
        self.create_record(
            account_id,
            domain,
            "txt",
            vec![
                ("name".to_string(), host.to_string()),
                ("content".to_string(), content.to_string()),
            ],
            &format!("TXT record {host}"),
        )
        .await
    }

    /// Fetch-token-then-submit protocol shared by all record types. A
    /// missing token on the creation page fails the call before any POST is
    /// issued.
    async fn create_record(
        &self,
        account_id: &str,
        domain: &str,
        kind: &str,
        mut form: Vec<(String, String)>,
        subject: &str,
    ) -> Result<ActionOutcome> {
        tracing::info!(target: "panel", "Creating {subject} on {domain}");

        let create_url = record_create_url(&self.config().base_url, account_id, domain, kind);
        let page = self.fetch_page(&create_url).await?;
        let token = markers::csrf_token(&page)
            .ok_or_else(|| AppError::TokenNotFound(format!("{kind} record creation page")))?;
        form.push(("_token".to_string(), token));

        let submit_url = record_submit_url(&self.config().base_url, account_id, domain, kind);
        let response = self
            .session()
            .post_form(submit_url, &create_url, &form)
            .send()
            .await?;
        self.session().record_set_cookies(response.headers());

        let status = response.status().as_u16();
        let location = header_string(response.headers(), LOCATION);
        let body = response.text().await?;

        classify_submission(status, location.as_deref(), &body, subject)
    }

    /// Deletes a DNS record via its scraped handle: harvests a fresh token
    /// from the handle URL when one is served, then POSTs a method-override
    /// deletion to it.
    pub async fn delete_dns_record(
        &self,
        _account_id: &str,
        handle: &DeleteHandle,
    ) -> Result<ActionOutcome> {
        tracing::info!(target: "panel", "Deleting DNS record via {}", handle.as_str());

        let delete_url = if handle.as_str().starts_with("http") {
            Url::parse(handle.as_str())?
        } else {
            self.config().base_url.join(handle.as_str())?
        };

        let token = match self.fetch_page(&delete_url).await {
            Ok(page) => markers::csrf_token(&page),
            // Some panel releases serve no confirmation page at all; the
            // deletion POST still goes out, just without a fresh token.
            Err(AppError::UnexpectedResponse(detail)) => {
                tracing::debug!(target: "panel", "No delete confirmation page ({detail})");
                None
            }
            Err(e) => return Err(e),
        };

        let mut form = vec![("_method".to_string(), "DELETE".to_string())];
        if let Some(token) = token {
            form.push(("_token".to_string(), token));
        }

        let response = self
            .session()
            .post_form(delete_url.clone(), &delete_url, &form)
            .send()
            .await?;
        self.session().record_set_cookies(response.headers());

        let status = response.status().as_u16();
        let location = header_string(response.headers(), LOCATION);
        let body = response.text().await?;

        classify_deletion(status, location.as_deref(), &body)
    }
}

/// Ordered classification of a record-creation POST response.
pub(crate) fn classify_submission(
    status: u16,
    location: Option<&str>,
    body: &str,
    subject: &str,
) -> Result<ActionOutcome> {
    if matches!(status, 301 | 302 | 303)
        && location.is_some_and(|target| target.contains(DNS_LISTING_SEGMENT))
    {
        return Ok(ActionOutcome::confirmed(format!(
            "{subject} created successfully"
        )));
    }

    if status == 200 {
        if let Some(banner) = markers::success_banner(body) {
            return Ok(ActionOutcome::confirmed(banner));
        }
        if let Some(banner) = markers::error_banner(body) {
            return Err(AppError::RemoteRejected(banner));
        }
    }

    Err(AppError::UnexpectedResponse(format!(
        "{subject}: HTTP {status} with no recognizable outcome"
    )))
}

/// Lenient classification of a deletion response: with no explicit error and
/// no explicit success, the call is reported as a lower-confidence "request
/// sent" rather than a failure, since already-redirected error pages produce
/// ambiguous content. A documented precision/recall tradeoff.
pub(crate) fn classify_deletion(
    status: u16,
    location: Option<&str>,
    body: &str,
) -> Result<ActionOutcome> {
    if matches!(status, 301 | 302 | 303)
        && location.is_some_and(|target| target.contains(DNS_LISTING_SEGMENT))
    {
        return Ok(ActionOutcome::confirmed("DNS record deleted successfully"));
    }

    if let Some(banner) = markers::error_banner(body) {
        return Err(AppError::RemoteRejected(banner));
    }
    if let Some(banner) = markers::success_banner(body) {
        return Ok(ActionOutcome::confirmed(banner));
    }

    Ok(ActionOutcome::best_effort("Delete request sent"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_to_listing_is_a_confirmed_creation() {
        let outcome = classify_submission(
            302,
            Some("https://dash.infinityfree.com/accounts/if0_1/domains/x/dnsRecords"),
            "",
            "CNAME record www",
        )
        .unwrap();
        assert!(outcome.confirmed);
        assert!(outcome.message.contains("www"));
    }

    #[test]
    fn redirect_elsewhere_is_unexpected() {
        let err = classify_submission(302, Some("/login"), "", "CNAME record www").unwrap_err();
        assert!(matches!(err, AppError::UnexpectedResponse(_)));
    }

    #[test]
    fn success_banner_carries_its_text() {
        let body = r#"<div class="alert-success">Record added to the zone</div>"#;
        let outcome = classify_submission(200, None, body, "TXT record @").unwrap();
        assert!(outcome.confirmed);
        assert_eq!(outcome.message, "Record added to the zone");
    }

    #[test]
    fn error_banner_is_rejected_with_exact_text() {
        let body = r#"<div class="alert-danger">Host already exists</div>"#;
        let err = classify_submission(200, None, body, "CNAME record www").unwrap_err();
        assert!(matches!(err, AppError::RemoteRejected(m) if m == "Host already exists"));
    }

    #[test]
    fn bare_200_is_unexpected_for_creation() {
        let err = classify_submission(200, None, "<body>nothing</body>", "MX record").unwrap_err();
        assert!(matches!(err, AppError::UnexpectedResponse(_)));
    }

    #[test]
    fn deletion_redirect_to_listing_is_confirmed() {
        let outcome = classify_deletion(302, Some("/accounts/if0_1/domains/x/dnsRecords"), "")
            .unwrap();
        assert!(outcome.confirmed);
    }

    #[test]
    fn deletion_error_banner_is_rejected() {
        let body = r#"<div class="alert-danger">Record not found</div>"#;
        let err = classify_deletion(200, None, body).unwrap_err();
        assert!(matches!(err, AppError::RemoteRejected(m) if m == "Record not found"));
    }

    #[test]
    fn ambiguous_deletion_response_is_best_effort_success() {
        let outcome = classify_deletion(200, None, "<body>unrelated page</body>").unwrap();
        assert!(!outcome.confirmed);
        assert_eq!(outcome.message, "Delete request sent");
    }
}

//! Client for an external CAPTCHA bypass service.
//!
//! Speaks the common submit-then-poll protocol: the challenge is posted to
//! the service, which answers with a task id, and the solved token is
//! collected by polling until ready or until the configured deadline.

use std::time::Duration;

use serde::Deserialize;
use tokio::time::{sleep, Instant};

use crate::core::error::{AppError, Result};

const POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    status: i32,
    request: String,
}

/// HTTP client for the configured solver endpoint.
#[derive(Clone)]
pub struct CaptchaSolver {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl CaptchaSolver {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Submits a Turnstile challenge and polls for the solved token.
    pub async fn solve_turnstile(
        &self,
        site_key: &str,
        page_url: &str,
        deadline: Duration,
    ) -> Result<String> {
        tracing::info!(target: "auth", "Submitting Turnstile challenge to bypass service");

        let submit: SubmitResponse = self
            .client
            .post(format!("{}/in.php", self.endpoint))
            .form(&[
                ("key", self.api_key.as_str()),
                ("method", "turnstile"),
                ("sitekey", site_key),
                ("pageurl", page_url),
                ("json", "1"),
            ])
            .send()
            .await?
            .json()
            .await?;

        if submit.status != 1 {
            return Err(AppError::Authentication(format!(
                "CAPTCHA submission failed: {}",
                submit.request
            )));
        }
        let task_id = submit.request;

        let expires_at = Instant::now() + deadline;
        loop {
            sleep(POLL_INTERVAL).await;
            if Instant::now() >= expires_at {
                return Err(AppError::Timeout(format!(
                    "CAPTCHA not solved within {deadline:?}"
                )));
            }

            let text = self
                .client
                .get(format!(
                    "{}/res.php?key={}&action=get&id={}",
                    self.endpoint, self.api_key, task_id
                ))
                .send()
                .await?
                .text()
                .await?;

            if let Some(token) = text.strip_prefix("OK|") {
                tracing::info!(target: "auth", "CAPTCHA solved by bypass service");
                return Ok(token.trim().to_string());
            }
            if text.starts_with("CAPCHA_NOT_READY") {
                tracing::debug!(target: "auth", "CAPTCHA not ready, polling again");
                continue;
            }
            return Err(AppError::Authentication(format!(
                "CAPTCHA solver error: {text}"
            )));
        }
    }
}

//! Authenticated HTTP operations against the panel: accounts, domains, and
//! DNS record CRUD over plain fetch/parse/submit round trips.

pub mod accounts;
pub mod dns;

use std::sync::Arc;

use reqwest::header::LOCATION;
use tokio::time::sleep;
use url::Url;

use crate::core::config::{get_random_sleep_duration, Config};
use crate::core::error::{AppError, Result};
use crate::core::models::SessionStatus;
use crate::scrape::markers;
use crate::session::authenticator::{self, header_string, Authenticator};
use crate::session::Session;

/// Client for the panel's static (non-Livewire) pages.
///
/// Every operation ensures the session is authenticated first; an operation
/// that loses authentication mid-flight flips the session flag and is
/// retried exactly once after re-authentication.
pub struct PanelClient {
    config: Arc<Config>,
    session: Arc<Session>,
    authenticator: Authenticator,
}

impl PanelClient {
    pub fn new(config: Arc<Config>, session: Arc<Session>) -> Result<Self> {
        let authenticator = Authenticator::from_config(config.clone())?;
        Ok(Self {
            config,
            session,
            authenticator,
        })
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    /// Establishes the session via the configured strategy; no-op when
    /// already authenticated.
    pub async fn ensure_authenticated(&self) -> Result<()> {
        self.authenticator.ensure_authenticated(&self.session).await
    }

    /// Probes an authenticated-only page and reports the session status.
    pub async fn verify(&self) -> Result<SessionStatus> {
        self.ensure_authenticated().await?;
        authenticator::verify(&self.config, &self.session).await
    }

    /// Fetches an authenticated page, re-authenticating once if the session
    /// turns out to have expired.
    pub(crate) async fn fetch_page(&self, url: &Url) -> Result<String> {
        self.ensure_authenticated().await?;
        match self.try_fetch_page(url).await {
            Err(AppError::SessionExpired(reason)) => {
                tracing::info!(target: "panel", "Session expired ({reason}); re-authenticating once");
                self.ensure_authenticated().await?;
                self.try_fetch_page(url).await
            }
            other => other,
        }
    }

    async fn try_fetch_page(&self, url: &Url) -> Result<String> {
        sleep(get_random_sleep_duration(&self.config)).await;
        tracing::debug!(target: "panel", "GET {url}");

        let response = self.session.get(url.clone()).send().await?;
        self.session.record_set_cookies(response.headers());
        let status = response.status();

        if status.is_redirection() {
            let location = header_string(response.headers(), LOCATION).unwrap_or_default();
            if location.contains("/login") {
                self.session.invalidate("request redirected to login");
                return Err(AppError::SessionExpired("redirected to login".to_string()));
            }
            // One manual hop for benign redirects (canonical slashes etc.);
            // anything deeper is treated as unknown page structure.
            let next = url.join(&location)?;
            tracing::debug!(target: "panel", "Following redirect to {next}");
            let response = self.session.get(next).send().await?;
            if !response.status().is_success() {
                return Err(AppError::UnexpectedResponse(format!(
                    "redirect chain from {url} ended with HTTP {}",
                    response.status()
                )));
            }
            return Ok(response.text().await?);
        }

        if !status.is_success() {
            return Err(AppError::UnexpectedResponse(format!(
                "HTTP {status} fetching {url}"
            )));
        }

        let body = response.text().await?;
        if markers::has_login_form(&body) && !markers::has_authenticated_markers(&body) {
            self.session
                .invalidate("login page served for an authenticated URL");
            return Err(AppError::SessionExpired("got login page".to_string()));
        }
        Ok(body)
    }
}

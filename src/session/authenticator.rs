//! Credential resolution and session establishment.
//!
//! The login strategy is selected exactly once from configuration; nothing
//! re-branches on it mid-flow. Precedence when several are configured:
//! a pre-captured cookie bundle, then credentials with a bypass solver,
//! then credentials with a remote-browser CAPTCHA solve, then plain
//! credential login.

use std::sync::Arc;

use reqwest::header::LOCATION;

use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::core::models::SessionStatus;
use crate::scrape::markers;
use crate::session::captcha::CaptchaSolver;
use crate::session::{remote_solve, Session};

const LOGIN_PATH: &str = "/login";

#[derive(Clone)]
enum Strategy {
    CookieBundle {
        cookie_string: String,
    },
    CredentialLogin {
        email: String,
        password: String,
    },
    CredentialLoginWithCaptchaBypass {
        email: String,
        password: String,
        solver: CaptchaSolver,
    },
    CredentialLoginWithRemoteSolve {
        email: String,
        password: String,
    },
}

impl Strategy {
    fn label(&self) -> &'static str {
        match self {
            Strategy::CookieBundle { .. } => "cookie bundle",
            Strategy::CredentialLogin { .. } => "credential login",
            Strategy::CredentialLoginWithCaptchaBypass { .. } => "credential login + bypass solver",
            Strategy::CredentialLoginWithRemoteSolve { .. } => "credential login + remote solve",
        }
    }
}

/// Establishes an authenticated [`Session`] using the configured strategy.
#[derive(Clone)]
pub struct Authenticator {
    config: Arc<Config>,
    strategy: Strategy,
}

impl Authenticator {
    pub fn from_config(config: Arc<Config>) -> Result<Self> {
        let strategy = if let Some(cookie_string) = config.cookie_string.clone() {
            Strategy::CookieBundle { cookie_string }
        } else if let (Some(email), Some(password)) = (config.email.clone(), config.password.clone())
        {
            if let Some(solver_url) = config.captcha_solver_url.clone() {
                Strategy::CredentialLoginWithCaptchaBypass {
                    email,
                    password,
                    solver: CaptchaSolver::new(
                        solver_url,
                        config.captcha_api_key.clone().unwrap_or_default(),
                        config.request_timeout,
                    )?,
                }
            } else if config.captcha_remote_browser {
                Strategy::CredentialLoginWithRemoteSolve { email, password }
            } else {
                Strategy::CredentialLogin { email, password }
            }
        } else {
            return Err(AppError::Config(
                "no authentication configured: set a cookie string or credentials".to_string(),
            ));
        };

        tracing::debug!(target: "auth", "Selected authentication strategy: {}", strategy.label());
        Ok(Self { config, strategy })
    }

    /// Idempotent session establishment: a no-op when the session is already
    /// authenticated, otherwise runs the configured strategy to completion
    /// or a typed failure.
    pub async fn ensure_authenticated(&self, session: &Session) -> Result<()> {
        if session.is_authenticated() {
            return Ok(());
        }

        tracing::info!(target: "auth", "Authenticating via {}", self.strategy.label());
        match &self.strategy {
            Strategy::CookieBundle { cookie_string } => {
                self.adopt_cookie_bundle(session, cookie_string)
            }
            Strategy::CredentialLogin { email, password } => {
                let page = self.fetch_login_page(session).await?;
                self.submit_login(session, &page, email, password, None)
                    .await
            }
            Strategy::CredentialLoginWithCaptchaBypass {
                email,
                password,
                solver,
            } => {
                let page = self.fetch_login_page(session).await?;
                let token = match markers::turnstile_site_key(&page) {
                    Some(site_key) => Some(
                        solver
                            .solve_turnstile(
                                &site_key,
                                self.config.login_url().as_str(),
                                self.config.captcha_timeout,
                            )
                            .await?,
                    ),
                    None => {
                        tracing::debug!(target: "auth", "Login page shows no CAPTCHA widget, submitting without a token");
                        None
                    }
                };
                self.submit_login(session, &page, email, password, token)
                    .await
            }
            Strategy::CredentialLoginWithRemoteSolve { email, password } => {
                let solved = remote_solve::solve_login_challenge(&self.config).await?;
                for cookie in solved.cookies {
                    session.install_cookie(cookie);
                }
                if let Some(user_agent) = solved.user_agent {
                    session.set_user_agent(user_agent);
                }
                self.submit_login(session, &solved.page_html, email, password, Some(solved.token))
                    .await
            }
        }
    }

    fn adopt_cookie_bundle(&self, session: &Session, cookie_string: &str) -> Result<()> {
        let count = session.install_cookie_string(cookie_string);
        if count == 0 {
            return Err(AppError::Authentication(
                "cookie string contained no usable name=value pairs".to_string(),
            ));
        }
        tracing::info!(target: "auth", "Installed {count} cookies from configured bundle");
        session.mark_authenticated();
        Ok(())
    }

    async fn fetch_login_page(&self, session: &Session) -> Result<String> {
        let login_url = self.config.login_url();
        tracing::debug!(target: "auth", "Fetching login page {login_url}");

        let response = session.get(login_url).send().await?;
        session.record_set_cookies(response.headers());

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Authentication(format!(
                "login page fetch returned HTTP {status}"
            )));
        }
        Ok(response.text().await?)
    }

    async fn submit_login(
        &self,
        session: &Session,
        login_page: &str,
        email: &str,
        password: &str,
        captcha_token: Option<String>,
    ) -> Result<()> {
        let token = markers::csrf_token(login_page)
            .ok_or_else(|| AppError::TokenNotFound("login page".to_string()))?;

        let mut form = vec![
            ("_token".to_string(), token),
            ("email".to_string(), email.to_string()),
            ("password".to_string(), password.to_string()),
        ];
        if let Some(solved) = captcha_token {
            form.push(("cf-turnstile-response".to_string(), solved));
        }

        let login_url = self.config.login_url();
        tracing::debug!(target: "auth", "Submitting login form for {email}");
        let response = session
            .post_form(login_url.clone(), &login_url, &form)
            .send()
            .await?;
        session.record_set_cookies(response.headers());

        let status = response.status().as_u16();
        let location = header_string(response.headers(), LOCATION);
        let body = response.text().await?;

        match classify_login_response(status, location.as_deref(), &body) {
            LoginSignal::Accepted => {
                tracing::info!(target: "auth", "Login successful");
                session.mark_authenticated();
                Ok(())
            }
            LoginSignal::Rejected(message) => {
                Err(AppError::Authentication(format!("Login failed: {message}")))
            }
            LoginSignal::Unexpected(detail) => Err(AppError::Authentication(format!(
                "Login failed - unexpected response: {detail}"
            ))),
        }
    }
}

/// Issues an authenticated-only probe and classifies the result.
///
/// The panel answers HTTP 200 for both the login page and the dashboard, so
/// the classification goes beyond the status code: a login redirect or a
/// login-form body without authenticated markers means the session is gone.
pub async fn verify(config: &Config, session: &Session) -> Result<SessionStatus> {
    tracing::debug!(target: "auth", "Verifying authentication status");
    let response = session.get(config.accounts_url()).send().await?;

    let status = response.status().as_u16();
    let location = header_string(response.headers(), LOCATION);
    let body = response.text().await?;

    match classify_probe_response(status, location.as_deref(), &body) {
        ProbeSignal::Authenticated => {
            session.mark_authenticated();
            Ok(SessionStatus {
                authenticated: true,
                detail: "Authenticated".to_string(),
            })
        }
        ProbeSignal::LoginRedirect => {
            session.invalidate("probe redirected to login");
            Err(AppError::SessionExpired(
                "cookies expired or invalid - redirected to login".to_string(),
            ))
        }
        ProbeSignal::LoginPage => {
            session.invalidate("probe served the login page");
            Err(AppError::SessionExpired(
                "cookies expired or invalid - got login page".to_string(),
            ))
        }
        ProbeSignal::Inconclusive(detail) => Err(AppError::VerificationInconclusive(detail)),
    }
}

pub(crate) fn header_string(
    headers: &reqwest::header::HeaderMap,
    name: reqwest::header::HeaderName,
) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LoginSignal {
    Accepted,
    Rejected(String),
    Unexpected(String),
}

/// Ordered classification of a login POST response.
pub(crate) fn classify_login_response(
    status: u16,
    location: Option<&str>,
    body: &str,
) -> LoginSignal {
    if matches!(status, 301 | 302 | 303) {
        return match location {
            Some(target) if !target.contains(LOGIN_PATH) => LoginSignal::Accepted,
            other => LoginSignal::Unexpected(format!(
                "redirected back to login ({})",
                other.unwrap_or("no Location header")
            )),
        };
    }

    if status == 200 {
        if let Some(banner) = markers::error_banner(body) {
            return LoginSignal::Rejected(banner);
        }
        if markers::has_authenticated_markers(body) {
            return LoginSignal::Accepted;
        }
        return LoginSignal::Unexpected("HTTP 200 without a recognizable outcome".to_string());
    }

    LoginSignal::Unexpected(format!("HTTP {status}"))
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ProbeSignal {
    Authenticated,
    LoginRedirect,
    LoginPage,
    Inconclusive(String),
}

/// Ordered classification of an authenticated-only probe response.
pub(crate) fn classify_probe_response(
    status: u16,
    location: Option<&str>,
    body: &str,
) -> ProbeSignal {
    if (300..400).contains(&status) {
        if location.is_some_and(|target| target.contains(LOGIN_PATH)) {
            return ProbeSignal::LoginRedirect;
        }
        return ProbeSignal::Inconclusive(format!(
            "redirected to {}",
            location.unwrap_or("unknown target")
        ));
    }

    if status == 200 {
        let login_form = markers::has_login_form(body);
        let authenticated = markers::has_authenticated_markers(body);
        if login_form && !authenticated {
            return ProbeSignal::LoginPage;
        }
        if authenticated {
            return ProbeSignal::Authenticated;
        }
        return ProbeSignal::Inconclusive(
            "HTTP 200 without login form or authenticated markers".to_string(),
        );
    }

    ProbeSignal::Inconclusive(format!("HTTP {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_PAGE: &str = r#"
        <html><head><title>Client Area Login</title></head><body>
          <form action="/login" method="POST">
            <input type="hidden" name="_token" value="tok">
            <input id="email" type="email">
          </form>
        </body></html>
    "#;

    const DASHBOARD: &str = r#"
        <html><head><title>Hosting Accounts</title></head>
        <body><div class="account-list">dashboard</div></body></html>
    "#;

    #[test]
    fn probe_redirect_to_login_means_expired() {
        assert_eq!(
            classify_probe_response(302, Some("https://dash.infinityfree.com/login"), ""),
            ProbeSignal::LoginRedirect
        );
    }

    #[test]
    fn probe_login_page_with_status_200_means_expired() {
        assert_eq!(
            classify_probe_response(200, None, LOGIN_PAGE),
            ProbeSignal::LoginPage
        );
    }

    #[test]
    fn probe_dashboard_markers_mean_authenticated() {
        assert_eq!(
            classify_probe_response(200, None, DASHBOARD),
            ProbeSignal::Authenticated
        );
    }

    #[test]
    fn probe_anything_else_is_inconclusive() {
        assert!(matches!(
            classify_probe_response(500, None, ""),
            ProbeSignal::Inconclusive(_)
        ));
        assert!(matches!(
            classify_probe_response(302, Some("/maintenance"), ""),
            ProbeSignal::Inconclusive(_)
        ));
        assert!(matches!(
            classify_probe_response(200, None, "<p>empty</p>"),
            ProbeSignal::Inconclusive(_)
        ));
    }

    #[test]
    fn login_redirect_away_from_login_is_accepted() {
        assert_eq!(
            classify_login_response(302, Some("https://dash.infinityfree.com/accounts"), ""),
            LoginSignal::Accepted
        );
    }

    #[test]
    fn login_redirect_back_to_login_is_unexpected() {
        assert!(matches!(
            classify_login_response(302, Some("/login"), ""),
            LoginSignal::Unexpected(_)
        ));
    }

    #[test]
    fn login_error_banner_is_rejected_with_text() {
        let body = r#"<div class="alert-danger">These credentials do not match our records.</div>"#;
        assert_eq!(
            classify_login_response(200, None, body),
            LoginSignal::Rejected("These credentials do not match our records.".to_string())
        );
    }

    #[test]
    fn login_dashboard_body_without_redirect_is_accepted() {
        assert_eq!(classify_login_response(200, None, DASHBOARD), LoginSignal::Accepted);
    }
}

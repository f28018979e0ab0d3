//! Per-caller authenticated session state against the hosting panel.
//!
//! A [`Session`] owns the cookie jar, the HTTP client wired to it, and the
//! `authenticated` flag every workflow operation gates on. One `Session`
//! serves one logical caller; operations against a shared `Session` must be
//! serialized by the caller, while independent sessions are fully parallel.

pub mod authenticator;
pub mod captcha;
pub(crate) mod cookies;
pub mod remote_solve;

pub use cookies::{parse_cookie_string, SessionCookie};

use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, ORIGIN, REFERER, SET_COOKIE, USER_AGENT};
use reqwest::redirect::Policy;
use url::Url;

use crate::core::config::Config;
use crate::core::error::Result;

struct SessionState {
    authenticated: bool,
    cookies: Vec<SessionCookie>,
    user_agent: String,
}

/// The process's authenticated-cookie state against the panel.
///
/// Redirect following is disabled on the underlying client: every workflow
/// classifies redirects explicitly, because redirect targets are the panel's
/// primary success/failure signal.
pub struct Session {
    client: reqwest::Client,
    jar: Arc<Jar>,
    base_url: Url,
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .redirect(Policy::none())
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            jar,
            base_url: config.base_url.clone(),
            state: Mutex::new(SessionState {
                authenticated: false,
                cookies: Vec::new(),
                user_agent: config.user_agent.clone(),
            }),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.lock().authenticated
    }

    pub fn mark_authenticated(&self) {
        self.state.lock().authenticated = true;
    }

    /// Flips the session back to unauthenticated so the next operation
    /// re-runs the credential resolver.
    pub fn invalidate(&self, reason: &str) {
        tracing::warn!(target: "auth", "Session invalidated: {reason}");
        self.state.lock().authenticated = false;
    }

    pub fn user_agent(&self) -> String {
        self.state.lock().user_agent.clone()
    }

    /// Adopts the user agent a remote CAPTCHA solver observed, so subsequent
    /// requests match the fingerprint the challenge was solved under.
    pub fn set_user_agent(&self, user_agent: impl Into<String>) {
        self.state.lock().user_agent = user_agent.into();
    }

    /// The `Domain=` attribute installed cookies are scoped to: the parent
    /// domain of the dashboard host (`dash.example.com` -> `.example.com`).
    pub fn cookie_domain(&self) -> String {
        let host = self.base_url.host_str().unwrap_or_default();
        let labels: Vec<&str> = host.split('.').collect();
        if labels.len() > 2 {
            format!(".{}", labels[1..].join("."))
        } else {
            host.to_string()
        }
    }

    /// Parses a browser-exported cookie string and installs every well-formed
    /// pair into the session. Returns the number of cookies installed.
    pub fn install_cookie_string(&self, cookie_string: &str) -> usize {
        let parsed = cookies::parse_cookie_string(cookie_string);
        let count = parsed.len();
        for cookie in parsed {
            self.install_cookie(cookie);
        }
        count
    }

    /// Installs one cookie into both the HTTP jar and the session's ordered
    /// snapshot (used for browser replay). A same-named cookie is updated in
    /// place, preserving first-seen order.
    pub fn install_cookie(&self, cookie: SessionCookie) {
        let header = format!(
            "{}={}; Domain={}; Path=/",
            cookie.name,
            cookie.value,
            self.cookie_domain()
        );
        self.jar.add_cookie_str(&header, &self.base_url);

        let mut state = self.state.lock();
        match state.cookies.iter_mut().find(|c| c.name == cookie.name) {
            Some(existing) => existing.value = cookie.value,
            None => state.cookies.push(cookie),
        }
    }

    /// Records cookies a response set, keeping the replay snapshot in sync
    /// with the jar (which reqwest updates on its own).
    pub fn record_set_cookies(&self, headers: &HeaderMap) {
        let mut state = self.state.lock();
        for value in headers.get_all(SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            let Some(pair) = raw.split(';').next() else {
                continue;
            };
            let Some(equal_index) = pair.find('=') else {
                continue;
            };
            let name = pair[..equal_index].trim().to_string();
            let cookie_value = pair[equal_index + 1..].to_string();
            if name.is_empty() {
                continue;
            }
            match state.cookies.iter_mut().find(|c| c.name == name) {
                Some(existing) => existing.value = cookie_value,
                None => state.cookies.push(SessionCookie {
                    name,
                    value: cookie_value,
                }),
            }
        }
    }

    /// Current cookies in first-seen order, for replay into a browser.
    pub fn cookies_snapshot(&self) -> Vec<SessionCookie> {
        self.state.lock().cookies.clone()
    }

    /// GET request carrying the session's cookies and user agent.
    pub fn get(&self, url: Url) -> reqwest::RequestBuilder {
        self.client.get(url).header(USER_AGENT, self.user_agent())
    }

    /// Form POST mirroring a browser submission: session cookies, user
    /// agent, and Referer/Origin headers pointing back at the panel.
    pub fn post_form(
        &self,
        url: Url,
        referer: &Url,
        form: &[(String, String)],
    ) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header(USER_AGENT, self.user_agent())
            .header(REFERER, referer.as_str())
            .header(ORIGIN, self.base_url.origin().ascii_serialization())
            .form(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_session() -> Session {
        Session::new(&Config::default()).unwrap()
    }

    #[test]
    fn installs_only_well_formed_cookie_pairs() {
        let session = test_session();
        assert_eq!(session.install_cookie_string("a=1; b=2; ;c"), 2);

        let snapshot = session.cookies_snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].name, "a");
        assert_eq!(snapshot[0].value, "1");
        assert_eq!(snapshot[1].name, "b");
        assert_eq!(snapshot[1].value, "2");
    }

    #[test]
    fn reinstalling_a_cookie_updates_in_place() {
        let session = test_session();
        session.install_cookie_string("a=1; b=2");
        session.install_cookie_string("a=3");

        let snapshot = session.cookies_snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].name, "a");
        assert_eq!(snapshot[0].value, "3");
    }

    #[test]
    fn cookie_domain_is_the_parent_of_the_dashboard_host() {
        let session = test_session();
        assert_eq!(session.cookie_domain(), ".infinityfree.com");
    }

    #[test]
    fn records_response_set_cookies_into_snapshot() {
        let session = test_session();
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            "if_session=xyz; Path=/; HttpOnly".parse().unwrap(),
        );
        headers.append(SET_COOKIE, "XSRF-TOKEN=tok; Path=/".parse().unwrap());
        session.record_set_cookies(&headers);

        let snapshot = session.cookies_snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].name, "if_session");
        assert_eq!(snapshot[0].value, "xyz");
        assert_eq!(snapshot[1].name, "XSRF-TOKEN");
    }

    #[test]
    fn session_starts_unauthenticated() {
        let session = test_session();
        assert!(!session.is_authenticated());
        session.mark_authenticated();
        assert!(session.is_authenticated());
        session.invalidate("test");
        assert!(!session.is_authenticated());
    }
}

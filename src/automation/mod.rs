//! Browser-automation driver for the panel's dynamic, script-rendered forms.

pub mod flows;
pub mod utils;

use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::models::{ActionOutcome, Extension, RegistrationOutcome};
use crate::session::authenticator::Authenticator;
use crate::session::Session;

use flows::register::RegistrationMode;

/// Entry point for the dynamic-form operations: extension catalog,
/// registrations, and domain deletion.
///
/// Each operation acquires its own one-shot browser and tears it down before
/// returning. The extension catalog is the only cross-call state: fetched at
/// most once per process and served from cache afterwards, since each fetch
/// costs a full browser pass and the catalog rarely changes.
pub struct Automation {
    config: Arc<Config>,
    session: Arc<Session>,
    authenticator: Authenticator,
    extensions: OnceCell<Vec<Extension>>,
}

impl Automation {
    pub fn new(config: Arc<Config>, session: Arc<Session>) -> Result<Self> {
        let authenticator = Authenticator::from_config(config.clone())?;
        Ok(Self {
            config,
            session,
            authenticator,
            extensions: OnceCell::new(),
        })
    }

    /// Available free-subdomain extensions, cached for the process lifetime
    /// after the first successful fetch.
    pub async fn list_available_extensions(&self, account_id: &str) -> Result<Vec<Extension>> {
        self.authenticator
            .ensure_authenticated(&self.session)
            .await?;
        self.cached_extensions(|| {
            flows::extensions::fetch_extensions(&self.config, &self.session, account_id)
        })
        .await
    }

    async fn cached_extensions<F, Fut>(&self, fetch: F) -> Result<Vec<Extension>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Extension>>>,
    {
        match self.extensions.get() {
            Some(cached) => {
                tracing::debug!(target: "automation", "Serving extension catalog from cache");
                Ok(cached.clone())
            }
            None => self.extensions.get_or_try_init(fetch).await.cloned(),
        }
    }

    /// Registers `subdomain.extension` as a new free domain.
    pub async fn register_free_domain(
        &self,
        account_id: &str,
        subdomain: &str,
        extension: &str,
    ) -> Result<RegistrationOutcome> {
        self.authenticator
            .ensure_authenticated(&self.session)
            .await?;
        flows::register::register(
            &self.config,
            &self.session,
            account_id,
            RegistrationMode::FreeSubdomain {
                subdomain: subdomain.to_string(),
                extension: extension.to_string(),
            },
        )
        .await
    }

    /// Registers `subdomain.parent_domain` under an already-owned parent.
    pub async fn register_custom_subdomain(
        &self,
        account_id: &str,
        parent_domain: &str,
        subdomain: &str,
    ) -> Result<RegistrationOutcome> {
        self.authenticator
            .ensure_authenticated(&self.session)
            .await?;
        flows::register::register(
            &self.config,
            &self.session,
            account_id,
            RegistrationMode::CustomSubdomain {
                parent_domain: parent_domain.to_string(),
                subdomain: subdomain.to_string(),
            },
        )
        .await
    }

    /// Deletes a domain from an account.
    pub async fn delete_domain(&self, account_id: &str, domain: &str) -> Result<ActionOutcome> {
        self.authenticator
            .ensure_authenticated(&self.session)
            .await?;
        flows::delete::delete_domain(&self.config, &self.session, account_id, domain).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_automation() -> Automation {
        let config = Arc::new(Config {
            cookie_string: Some("a=1".to_string()),
            ..Config::default()
        });
        let session = Arc::new(Session::new(&config).unwrap());
        Automation::new(config, session).unwrap()
    }

    #[tokio::test]
    async fn extension_catalog_is_fetched_at_most_once() {
        let automation = test_automation();
        let calls = AtomicUsize::new(0);

        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Extension {
                value: "rf.gd".to_string(),
                label: "rf.gd (free)".to_string(),
            }])
        };

        let first = automation.cached_extensions(fetch).await.unwrap();
        let second = automation
            .cached_extensions(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Vec::new())
            })
            .await
            .unwrap();

        // The second fetch closure never ran: same data, one invocation.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let automation = test_automation();

        let failed = automation
            .cached_extensions(|| async {
                Err(crate::core::error::AppError::UnexpectedResponse(
                    "boom".to_string(),
                ))
            })
            .await;
        assert!(failed.is_err());

        let recovered = automation
            .cached_extensions(|| async {
                Ok(vec![Extension {
                    value: "rf.gd".to_string(),
                    label: "rf.gd".to_string(),
                }])
            })
            .await
            .unwrap();
        assert_eq!(recovered.len(), 1);
    }
}

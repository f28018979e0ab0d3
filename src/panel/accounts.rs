//! Account and domain listings.

use crate::core::error::Result;
use crate::core::models::Account;
use crate::panel::PanelClient;
use crate::scrape::listing;

impl PanelClient {
    /// Hosting accounts visible on the dashboard, deduplicated by id in
    /// first-occurrence order.
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        tracing::debug!(target: "panel", "Listing accounts");
        let body = self.fetch_page(&self.config().accounts_url()).await?;
        Ok(listing::parse_accounts(&body))
    }

    /// Domains registered under an account, in document order.
    pub async fn list_domains(&self, account_id: &str) -> Result<Vec<String>> {
        tracing::debug!(target: "panel", "Listing domains for account {account_id}");
        let body = self.fetch_page(&self.config().account_url(account_id)).await?;
        Ok(listing::parse_domains(&body))
    }
}

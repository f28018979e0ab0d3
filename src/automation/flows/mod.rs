//! Dynamic-form workflows driven through the WebDriver browser.
//!
//! The registration pages are rendered by a client-side reactive framework:
//! the sub-form fields do not exist until a mode is selected, so these flows
//! click, wait and type instead of fetching and parsing static HTML.

pub mod delete;
pub mod extensions;
pub mod register;

/// Keyword sets matched against control text / `wire:click` actions.
/// All lowercase; matching is case-insensitive.
pub(crate) const FREE_SUBDOMAIN_KEYWORDS: &[&str] =
    &["selectdomaintype('subdomain')", "free subdomain"];
pub(crate) const CUSTOM_DOMAIN_KEYWORDS: &[&str] =
    &["selectdomaintype('customdomain')", "custom domain"];
pub(crate) const SUBMIT_KEYWORDS: &[&str] = &["create domain"];

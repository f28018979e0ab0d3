//! dash-pilot core library.
//!
//! Automates a hosting control panel that has no public API. Authentication
//! works through scraped login forms and pre-captured cookies, reads through
//! fetch-and-parse of listing pages, writes through fetch-token-then-submit
//! form protocols, and the script-rendered registration forms through a
//! one-shot WebDriver browser.
//!
//! The [`Session`] owns the authenticated cookie state; [`PanelClient`]
//! exposes the static-page operations and [`Automation`] the dynamic-form
//! ones, both borrowing the same session. Callers serialize operations on a
//! shared session; independent sessions run fully in parallel.

pub mod automation;
pub mod core;
pub mod panel;
pub mod scrape;
pub mod session;

pub use crate::automation::Automation;
pub use crate::core::config::{load_config, Config, ConfigBuilder, ConfigFile};
pub use crate::core::error::{AppError, Result};
pub use crate::core::models::{
    Account, ActionOutcome, DeleteHandle, DnsRecord, Extension, RegistrationOutcome, SessionStatus,
};
pub use crate::panel::PanelClient;
pub use crate::session::{Session, SessionCookie};

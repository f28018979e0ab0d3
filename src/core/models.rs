//! Core data structures scraped from or sent to the hosting panel.

use serde::Serialize;

/// A hosting account as listed on the panel dashboard.
///
/// The id is the opaque site-assigned identifier (`if0_<digits>`) scraped
/// from account-detail links; the name is the link's visible text, falling
/// back to the id when the link carries no text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: String,
    pub name: String,
}

/// Opaque deletion handle for a DNS record: the action URL of the record
/// row's inline delete form. A fresh anti-forgery token is harvested from
/// that URL at deletion time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DeleteHandle(pub String);

impl DeleteHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A DNS record row scraped from a domain's records listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsRecord {
    /// The record's host/name column.
    pub host: String,
    /// The record type column (CNAME, MX, TXT, ...), as displayed.
    pub kind: String,
    /// The record's target/content column.
    pub target: String,
    /// Deletion handle, when the row exposes an inline delete form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_handle: Option<DeleteHandle>,
}

/// A free-subdomain extension offered by the registration form, as a
/// (submission value, display label) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extension {
    pub value: String,
    pub label: String,
}

/// Result of a session verification probe.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub detail: String,
}

/// Outcome of a write operation against the panel.
///
/// `confirmed` distinguishes a positively confirmed result (redirect to the
/// listing, explicit success banner) from the lenient "request sent" path
/// taken when a deletion response carries neither a success nor an error
/// signal.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub message: String,
    pub confirmed: bool,
}

impl ActionOutcome {
    /// Creates a positively confirmed outcome.
    pub fn confirmed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            confirmed: true,
        }
    }

    /// Creates a lower-confidence outcome: the request was sent and nothing
    /// indicated failure, but no positive confirmation was observed.
    pub fn best_effort(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            confirmed: false,
        }
    }
}

/// Outcome of a domain registration flow.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationOutcome {
    pub message: String,
    /// The fully qualified hostname that was registered.
    pub domain: String,
}

//! Defines the custom error types for the dash-pilot application.

use fantoccini::error::{CmdError, NewSessionError};
use std::io;
use thiserror::Error;
use url::ParseError as UrlParseError;

/// The primary error type for panel automation.
#[derive(Error, Debug)]
pub enum AppError {
    /// Error occurring during configuration loading or validation, including
    /// required credentials that are absent from the environment.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Error initializing necessary components (e.g., clients, drivers).
    #[error("Initialization Error: {0}")]
    Initialization(String),

    /// The login attempt itself failed: rejected credentials, an unsolved
    /// CAPTCHA, or a login response that cannot be read as a success.
    #[error("Authentication Error: {0}")]
    Authentication(String),

    /// The session's cookies are no longer accepted by the panel. The calling
    /// operation re-authenticates once and retries; a second failure surfaces.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// A verification probe produced neither a login page nor an
    /// authenticated-area page.
    #[error("Verification inconclusive: {0}")]
    VerificationInconclusive(String),

    /// Could not locate a required anti-forgery token on a fetched page.
    /// Likely indicates the remote page structure changed.
    #[error("CSRF token not found: {0}")]
    TokenNotFound(String),

    /// Browser automation could not locate an expected interactive element.
    /// Likely indicates the remote page structure changed.
    #[error("Control not found: {0}")]
    ControlNotFound(String),

    /// The remote system explicitly reported an error banner; the banner text
    /// is carried verbatim.
    #[error("Rejected by remote: {0}")]
    RemoteRejected(String),

    /// None of the known success/failure signals matched.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// A bounded wait elapsed. The caller may retry the whole operation.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Error related to file input/output operations.
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    /// Error during JSON serialization or deserialization.
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error parsing a URL.
    #[error("URL Parsing Error: {0}")]
    UrlParse(#[from] UrlParseError),

    /// Error making HTTP requests via reqwest.
    #[error("HTTP Request Error: {0}")]
    Request(#[from] reqwest::Error),

    /// Error connecting to the WebDriver instance.
    #[error("WebDriver Connection Error: {0}")]
    WebDriverConnection(String),

    /// Error executing a command via WebDriver (Fantoccini).
    #[error("WebDriver Command Error: {0}")]
    FantocciniCmd(String),

    /// An underlying error that doesn't fit other categories, using anyhow.
    #[error("Generic Error: {0}")]
    Generic(#[from] anyhow::Error),
}

// From implementations for Fantoccini errors
impl From<CmdError> for AppError {
    fn from(err: CmdError) -> Self {
        let msg = err.to_string();
        let lowered = msg.to_lowercase();
        if lowered.contains("timed out") || lowered.contains("timeout") {
            AppError::Timeout(msg)
        } else {
            AppError::FantocciniCmd(msg)
        }
    }
}

impl From<NewSessionError> for AppError {
    fn from(err: NewSessionError) -> Self {
        AppError::WebDriverConnection(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

//! Error taxonomy for the wallet session.
//!
//! [`WalletError`] is what callers of the session manager see.
//! [`ConnectorError`] is what the connector boundary reports; the manager
//! classifies it into a [`WalletError`].

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Code attached to connector errors that mean "the user said no".
pub const USER_REJECTED_CODE: &str = "USER_REJECTED";

/// Code attached to connector errors for capabilities the SDK lacks.
pub const UNSUPPORTED_CODE: &str = "UNSUPPORTED";

/// Phrasing wallets use when the user dismisses or declines the prompt.
static REJECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)user rejected|user closed|cancel").unwrap());

/// A classified wallet session failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// The SDK module could not be loaded or lacks a required export.
    #[error("Wallet module unavailable: {0}")]
    ModuleUnavailable(String),

    #[error("Failed to construct connector: {0}")]
    ConstructionFailed(String),

    #[error("Failed to initialize connector: {0}")]
    InitFailed(String),

    /// The prompt closed without an account. Benign; the manager stays usable.
    #[error("User rejected the connection request")]
    UserRejected,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

impl WalletError {
    /// Stable tag for presentation layers.
    pub fn code(&self) -> &'static str {
        match self {
            WalletError::ModuleUnavailable(_) => "MODULE_UNAVAILABLE",
            WalletError::ConstructionFailed(_) => "CONSTRUCTION_FAILED",
            WalletError::InitFailed(_) => "INIT_FAILED",
            WalletError::UserRejected => USER_REJECTED_CODE,
            WalletError::ConnectionFailed(_) => "CONNECTION_FAILED",
        }
    }

    /// True when the failure means "try again" rather than "broken".
    pub fn is_user_rejected(&self) -> bool {
        matches!(self, WalletError::UserRejected)
    }
}

/// Error reported by the connector SDK boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ConnectorError {
    pub message: String,
    pub code: Option<String>,
}

impl ConnectorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// The SDK does not offer `capability`.
    pub fn unsupported(capability: &str) -> Self {
        Self::new(format!("{capability} is not supported by this connector"))
            .with_code(UNSUPPORTED_CODE)
    }

    pub fn is_unsupported(&self) -> bool {
        self.code.as_deref() == Some(UNSUPPORTED_CODE)
    }

    /// Whether this error means the user dismissed or declined the prompt.
    pub fn is_rejection(&self) -> bool {
        self.code.as_deref() == Some(USER_REJECTED_CODE) || REJECTION_RE.is_match(&self.message)
    }
}

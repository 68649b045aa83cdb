//! Error types for wallet transaction operations.
//!
//! Every failure the transaction client can raise is folded into
//! [`WalletError`]. The store keeps the latest one around for the
//! presentation layer to poll and dismiss.

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for wallet client and store operations.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Transport-level failure from the HTTP client.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Request to {url} failed with status {status}")]
    Status {
        /// HTTP status code returned by the server.
        status: u16,
        /// The URL that was requested.
        url: String,
    },

    /// JSON parsing or data structure errors.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of what failed to parse.
        message: String,
    },

    /// No wallet API endpoint has been configured.
    #[error("Wallet client is not registered")]
    ClientNotRegistered,

    /// Invalid user input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl WalletError {
    /// Create a new parse error with the given message.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new status error for a failed request.
    #[must_use]
    pub fn status(status: u16, url: impl Into<String>) -> Self {
        Self::Status {
            status,
            url: url.into(),
        }
    }

    /// Create a new invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Convert to a `color_eyre::Report` for the binary's error path.
    #[must_use = "this converts the error into a Report for display"]
    pub fn into_report(self) -> color_eyre::Report {
        color_eyre::eyre::eyre!("{}", self)
    }
}

// ============================================================================
// Tests
// ============================================================================

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use thiserror::Error;

/// Error code constants for type-safe error handling
pub mod code {
    pub const INVALID: &str = "INVALID";
    pub const WALLET_UNAVAILABLE: &str = "WALLET_UNAVAILABLE";
    pub const REJECTED: &str = "REJECTED";
    pub const NOT_CONNECTED: &str = "NOT_CONNECTED";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOTFOUND: &str = "NOTFOUND";
    pub const BUSY: &str = "BUSY";
    pub const NETWORK: &str = "NETWORK";
    pub const CONFIG: &str = "CONFIG";
    pub const INTERNAL: &str = "INTERNAL";
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{0}")]
    Validation(String),

    #[error("No wallet provider available")]
    WalletUnavailable,

    #[error("Request rejected by user: {0}")]
    UserRejected(String),

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Caller is not the registry administrator")]
    Unauthorized,

    #[error("Student not found")]
    NotFound,

    #[error("{0} already in progress")]
    Busy(String),

    #[error("{0}")]
    NetworkFault(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl RegistryError {
    /// Returns the protocol error code for this error
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => code::INVALID,
            Self::WalletUnavailable => code::WALLET_UNAVAILABLE,
            Self::UserRejected(_) => code::REJECTED,
            Self::NotConnected => code::NOT_CONNECTED,
            Self::Unauthorized => code::UNAUTHORIZED,
            Self::NotFound => code::NOTFOUND,
            Self::Busy(_) => code::BUSY,
            Self::NetworkFault(_) | Self::IoError(_) => code::NETWORK,
            Self::ConfigError(_) => code::CONFIG,
            Self::InvariantViolation(_) | Self::SerializationError(_) => code::INTERNAL,
        }
    }

    /// Returns the exit code for this error
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::ConfigError(_) => 3,
            Self::WalletUnavailable => 4,
            Self::UserRejected(_) | Self::NotConnected => 5,
            Self::Unauthorized => 6,
            Self::NotFound => 7,
            Self::Busy(_) => 8,
            Self::NetworkFault(_) | Self::IoError(_) => 9,
            Self::InvariantViolation(_) | Self::SerializationError(_) => 10,
        }
    }

    /// Faults a user can act on by retrying the same operation.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UserRejected(_) | Self::NotConnected | Self::Busy(_) | Self::NetworkFault(_)
        )
    }
}

/// Protocol error codes as documented in the CLI
pub const ERROR_CODES: &[(&str, &str, &str)] = &[
    (
        code::INVALID,
        "Invalid user input",
        "Correct the input and retry",
    ),
    (
        code::WALLET_UNAVAILABLE,
        "No wallet provider configured",
        "Set --rpc-url or REGISTRY_RPC_URL to a wallet endpoint",
    ),
    (
        code::REJECTED,
        "Request declined in the wallet",
        "Approve the request in the wallet and retry",
    ),
    (
        code::NOT_CONNECTED,
        "No account connected",
        "Run 'registry connect' first",
    ),
    (
        code::UNAUTHORIZED,
        "Caller is not the registry administrator",
        "Connect with the admin account",
    ),
    (
        code::NOTFOUND,
        "Student was not found",
        "Verify the student identifier",
    ),
    (
        code::BUSY,
        "Operation already in flight",
        "Wait for the pending transaction to settle",
    ),
    (
        code::NETWORK,
        "Provider or contract call failed",
        "Inspect logs and retry",
    ),
    (
        code::CONFIG,
        "Invalid configuration",
        "Check .registry/config.toml and environment",
    ),
    (
        code::INTERNAL,
        "Unexpected internal failure",
        "Inspect logs and retry command",
    ),
];

/// Get error code details (description and fix) for a given error code
#[must_use]
pub fn get_error_info(error_code: &str) -> Option<(&'static str, &'static str)> {
    ERROR_CODES
        .iter()
        .find(|(code, _, _)| *code == error_code)
        .map(|(_, desc, fix)| (*desc, *fix))
}

pub type Result<T> = std::result::Result<T, RegistryError>;

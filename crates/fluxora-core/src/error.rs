//! Error types for Fluxora
//!
//! Wallet failures are classified into [`WalletError`] at the session
//! boundary and never propagate past it. Quest input failures stay inside
//! the form and store as [`ValidationError`].

use std::time::Duration;

use thiserror::Error;

/// Longest provider message carried into a user-visible error.
const MAX_PROVIDER_MESSAGE_CHARS: usize = 100;

/// Errors produced while connecting to or talking with a wallet provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("No Ethereum wallet found")]
    NoProviderFound,

    #[error("User rejected the connection request")]
    UserRejected,

    #[error("Wallet request pending. Please check your wallet.")]
    RequestPending,

    #[error("Wallet internal error: {0}")]
    ProviderInternal(String),

    #[error("Wallet is locked")]
    ProviderLocked,

    #[error("Connection timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("No accounts found. Please unlock your wallet and try again.")]
    NoAccounts,

    #[error("Connection limit reached after {0} attempts")]
    AttemptLimitReached(u32),

    #[error("Connection already in progress")]
    AlreadyConnecting,

    #[error("Connection attempt was superseded")]
    Superseded,

    #[error("Invalid chain id: {0}")]
    InvalidChainId(String),

    #[error("Provider error {code}: {message}")]
    Provider { code: i64, message: String },
}

/// Discriminant of a [`WalletError`], carried by `ConnectionState::Error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletErrorKind {
    NoProviderFound,
    UserRejected,
    RequestPending,
    ProviderInternal,
    ProviderLocked,
    Timeout,
    NoAccounts,
    AttemptLimitReached,
    AlreadyConnecting,
    Superseded,
    InvalidChainId,
    Provider,
}

impl WalletError {
    /// Create a provider error with its message clipped for display
    pub fn provider(code: i64, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Provider {
            code,
            message: message.chars().take(MAX_PROVIDER_MESSAGE_CHARS).collect(),
        }
    }

    /// Create a new InvalidChainId error
    pub fn invalid_chain_id(value: impl Into<String>) -> Self {
        Self::InvalidChainId(value.into())
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> WalletErrorKind {
        match self {
            WalletError::NoProviderFound => WalletErrorKind::NoProviderFound,
            WalletError::UserRejected => WalletErrorKind::UserRejected,
            WalletError::RequestPending => WalletErrorKind::RequestPending,
            WalletError::ProviderInternal(_) => WalletErrorKind::ProviderInternal,
            WalletError::ProviderLocked => WalletErrorKind::ProviderLocked,
            WalletError::Timeout(_) => WalletErrorKind::Timeout,
            WalletError::NoAccounts => WalletErrorKind::NoAccounts,
            WalletError::AttemptLimitReached(_) => WalletErrorKind::AttemptLimitReached,
            WalletError::AlreadyConnecting => WalletErrorKind::AlreadyConnecting,
            WalletError::Superseded => WalletErrorKind::Superseded,
            WalletError::InvalidChainId(_) => WalletErrorKind::InvalidChainId,
            WalletError::Provider { .. } => WalletErrorKind::Provider,
        }
    }

    /// Whether a failed attempt with this error counts against the attempt limit.
    ///
    /// Rejections and a missing provider leave the counter alone so the next
    /// manual attempt starts fresh.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WalletError::RequestPending
                | WalletError::ProviderInternal(_)
                | WalletError::ProviderLocked
                | WalletError::Timeout(_)
                | WalletError::NoAccounts
                | WalletError::Provider { .. }
        )
    }

    /// Whether the session should schedule an automatic retry after this error.
    pub fn should_auto_retry(&self) -> bool {
        matches!(
            self,
            WalletError::ProviderInternal(_) | WalletError::ProviderLocked | WalletError::Timeout(_)
        )
    }
}

/// Quest input rejected by the form or the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a quest title")]
    EmptyTitle,

    #[error("Please enter a reward amount")]
    MissingReward,

    #[error("Please enter a valid reward amount")]
    InvalidReward,

    #[error("Reward amount cannot exceed {max} ETH")]
    RewardTooLarge { max: u32 },
}

/// Errors from the quest persistence slot
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl StorageError {
    /// Create a new Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Create a new Deserialization error
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_message_is_clipped() {
        let err = WalletError::provider(-1, "x".repeat(250));
        match err {
            WalletError::Provider { code, message } => {
                assert_eq!(code, -1);
                assert_eq!(message.chars().count(), 100);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejection_is_not_recoverable() {
        assert!(!WalletError::UserRejected.is_recoverable());
        assert!(!WalletError::UserRejected.should_auto_retry());
        assert!(!WalletError::NoProviderFound.is_recoverable());
    }

    #[test]
    fn test_auto_retry_classes() {
        assert!(WalletError::ProviderLocked.should_auto_retry());
        assert!(WalletError::ProviderInternal("boom".into()).should_auto_retry());
        assert!(WalletError::Timeout(Duration::from_secs(15)).should_auto_retry());
        assert!(!WalletError::RequestPending.should_auto_retry());
        assert!(WalletError::RequestPending.is_recoverable());
        assert!(!WalletError::NoAccounts.should_auto_retry());
    }

    #[test]
    fn test_timeout_display() {
        let err = WalletError::Timeout(Duration::from_millis(1500));
        assert!(err.to_string().contains("1500ms"));
        assert_eq!(err.kind(), WalletErrorKind::Timeout);
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::RewardTooLarge { max: 10 }.to_string(),
            "Reward amount cannot exceed 10 ETH"
        );
        assert_eq!(
            ValidationError::EmptyTitle.to_string(),
            "Please enter a quest title"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let storage_err: StorageError = io_err.into();
        assert!(matches!(storage_err, StorageError::Io(_)));
    }
}

//! Wallet provider capability
//!
//! The provider is an external collaborator, typically a browser-injected
//! EIP-1193 object. The session only depends on this trait, so the same
//! connection logic runs against a real wallet, the demo wallet, or a
//! scripted provider in tests.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::address::Account;
use crate::error::WalletError;

/// Error surface of a wallet provider: a numeric code plus a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    /// The user declined the request.
    pub const USER_REJECTED: i64 = 4001;
    /// A previous request is still waiting on the user.
    pub const REQUEST_PENDING: i64 = -32002;
    /// Wallet-side internal failure.
    pub const INTERNAL_ERROR: i64 = -32603;
    /// Malformed request parameters.
    pub const INVALID_PARAMS: i64 = -32602;
    /// Wallet is locked.
    pub const LOCKED: i64 = -32000;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn user_rejected() -> Self {
        Self::new(Self::USER_REJECTED, "User rejected the request.")
    }

    pub fn request_pending() -> Self {
        Self::new(Self::REQUEST_PENDING, "Request already pending.")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL_ERROR, message)
    }

    pub fn locked() -> Self {
        Self::new(Self::LOCKED, "Wallet is locked.")
    }

    /// Whether the failure indicates the provider itself is gone or broken.
    pub fn is_provider_failure(&self) -> bool {
        matches!(self.code, Self::INVALID_PARAMS | Self::INTERNAL_ERROR)
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for ProviderError {}

impl From<ProviderError> for WalletError {
    fn from(err: ProviderError) -> Self {
        match err.code {
            ProviderError::USER_REJECTED => WalletError::UserRejected,
            ProviderError::REQUEST_PENDING => WalletError::RequestPending,
            ProviderError::INTERNAL_ERROR => WalletError::ProviderInternal(err.message),
            ProviderError::LOCKED => WalletError::ProviderLocked,
            _ => {
                let lowered = err.message.to_lowercase();
                if lowered.contains("user denied") || lowered.contains("rejected") {
                    WalletError::UserRejected
                } else {
                    WalletError::provider(err.code, err.message)
                }
            }
        }
    }
}

/// Provider notification kinds the session subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderEventKind {
    AccountsChanged,
    ChainChanged,
    Disconnect,
}

/// A notification pushed by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<Account>),
    /// Hex chain id, e.g. `"0x1"`.
    ChainChanged(String),
    Disconnect,
}

impl ProviderEvent {
    /// Returns the kind of this event.
    pub fn kind(&self) -> ProviderEventKind {
        match self {
            ProviderEvent::AccountsChanged(_) => ProviderEventKind::AccountsChanged,
            ProviderEvent::ChainChanged(_) => ProviderEventKind::ChainChanged,
            ProviderEvent::Disconnect => ProviderEventKind::Disconnect,
        }
    }
}

/// Handle identifying one registered event handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Event handler registered with a provider.
pub type EventHandler = Arc<dyn Fn(ProviderEvent) + Send + Sync>;

/// The wallet capability consumed by [`WalletSession`](crate::WalletSession).
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Asks the user to authorize accounts (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<Account>, ProviderError>;

    /// Returns already-authorized accounts without prompting (`eth_accounts`).
    async fn get_accounts(&self) -> Result<Vec<Account>, ProviderError>;

    /// Returns the current chain id as a hex string (`eth_chainId`).
    async fn chain_id(&self) -> Result<String, ProviderError>;

    /// Registers a handler for one event kind.
    fn subscribe(&self, kind: ProviderEventKind, handler: EventHandler) -> SubscriptionId;

    /// Removes a handler previously returned by [`subscribe`](Self::subscribe).
    ///
    /// Returns `false` if the id was unknown.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_codes() {
        assert_eq!(
            WalletError::from(ProviderError::user_rejected()),
            WalletError::UserRejected
        );
        assert_eq!(
            WalletError::from(ProviderError::request_pending()),
            WalletError::RequestPending
        );
        assert_eq!(
            WalletError::from(ProviderError::locked()),
            WalletError::ProviderLocked
        );
        assert!(matches!(
            WalletError::from(ProviderError::internal("disk full")),
            WalletError::ProviderInternal(msg) if msg == "disk full"
        ));
    }

    #[test]
    fn test_classify_denied_message() {
        let err = ProviderError::new(-1, "User denied account authorization");
        assert_eq!(WalletError::from(err), WalletError::UserRejected);
    }

    #[test]
    fn test_classify_unknown_code() {
        let err = ProviderError::new(-32601, "Method not found");
        assert!(matches!(
            WalletError::from(err),
            WalletError::Provider { code: -32601, .. }
        ));
    }

    #[test]
    fn test_provider_failure_codes() {
        assert!(ProviderError::internal("x").is_provider_failure());
        assert!(ProviderError::new(ProviderError::INVALID_PARAMS, "x").is_provider_failure());
        assert!(!ProviderError::locked().is_provider_failure());
    }
}

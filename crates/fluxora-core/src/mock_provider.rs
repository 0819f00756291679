//! Scriptable in-memory wallet provider
//!
//! Stands in for a browser-injected wallet in tests and in the desktop
//! demo. Responses to `request_accounts` are scripted per call; events are
//! pushed with [`MockProvider::emit`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fluxora_core::{Account, MockProvider, MockResponse, ProviderError};
//!
//! let provider = MockProvider::new()
//!     .with_chain_id("0x89")
//!     .with_response(MockResponse::Error(ProviderError::locked()))
//!     .with_response(MockResponse::Accounts(vec![Account::new("0xabc0000000").unwrap()]));
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::address::Account;
use crate::provider::{
    EventHandler, ProviderError, ProviderEvent, ProviderEventKind, SubscriptionId, WalletProvider,
};

/// Account handed out by a default [`MockProvider`].
pub const MOCK_ACCOUNT: &str = "0x71C7656EC7ab88b098defB751B7401B5f6d8976F";

/// Scripted outcome of one `request_accounts` call.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Accounts(Vec<Account>),
    Error(ProviderError),
    /// Never resolves; exercises request timeouts.
    Hang,
}

/// Call counters for assertions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockCalls {
    pub request_accounts: usize,
    pub get_accounts: usize,
    pub chain_id: usize,
}

struct MockState {
    script: VecDeque<MockResponse>,
    fallback: MockResponse,
    authorized: Vec<Account>,
    get_accounts_error: Option<ProviderError>,
    chain_id: Result<String, ProviderError>,
    latency: Option<Duration>,
    handlers: BTreeMap<SubscriptionId, (ProviderEventKind, EventHandler)>,
    next_subscription: u64,
    calls: MockCalls,
}

/// In-memory [`WalletProvider`].
pub struct MockProvider {
    state: Mutex<MockState>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Creates a provider that approves every request with [`MOCK_ACCOUNT`] on mainnet.
    pub fn new() -> Self {
        let account = Account::new(MOCK_ACCOUNT).into_iter().collect();
        Self {
            state: Mutex::new(MockState {
                script: VecDeque::new(),
                fallback: MockResponse::Accounts(account),
                authorized: Vec::new(),
                get_accounts_error: None,
                chain_id: Ok("0x1".to_string()),
                latency: None,
                handlers: BTreeMap::new(),
                next_subscription: 1,
                calls: MockCalls::default(),
            }),
        }
    }

    /// Queue a response for the next unanswered `request_accounts` call.
    pub fn with_response(self, response: MockResponse) -> Self {
        self.push_response(response);
        self
    }

    /// Set the response used once the script is exhausted.
    pub fn with_fallback(self, response: MockResponse) -> Self {
        self.state.lock().fallback = response;
        self
    }

    /// Set the chain id reported by `chain_id`.
    pub fn with_chain_id(self, chain_id: impl Into<String>) -> Self {
        self.state.lock().chain_id = Ok(chain_id.into());
        self
    }

    /// Delay every `request_accounts` answer, as a user deliberating would.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.state.lock().latency = Some(latency);
        self
    }

    /// Queue a response for the next unanswered `request_accounts` call.
    pub fn push_response(&self, response: MockResponse) {
        self.state.lock().script.push_back(response);
    }

    /// Replace the already-authorized account list returned by `get_accounts`.
    pub fn set_authorized(&self, accounts: Vec<Account>) {
        self.state.lock().authorized = accounts;
    }

    /// Make `get_accounts` fail until cleared with `None`.
    pub fn set_get_accounts_error(&self, error: Option<ProviderError>) {
        self.state.lock().get_accounts_error = error;
    }

    /// Make `chain_id` fail.
    pub fn set_chain_id_error(&self, error: ProviderError) {
        self.state.lock().chain_id = Err(error);
    }

    /// Set the chain id reported by `chain_id`.
    pub fn set_chain_id(&self, chain_id: impl Into<String>) {
        self.state.lock().chain_id = Ok(chain_id.into());
    }

    /// Deliver an event to every handler subscribed to its kind.
    ///
    /// Handlers run after the internal lock is released, so they may call
    /// back into the provider.
    pub fn emit(&self, event: ProviderEvent) {
        let kind = event.kind();
        let handlers: Vec<EventHandler> = self
            .state
            .lock()
            .handlers
            .values()
            .filter(|(k, _)| *k == kind)
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in handlers {
            handler(event.clone());
        }
    }

    /// Returns the call counters.
    pub fn calls(&self) -> MockCalls {
        self.state.lock().calls
    }

    /// Returns the number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.state.lock().handlers.len()
    }

    /// Returns the number of live subscriptions for one event kind.
    pub fn subscriptions_for(&self, kind: ProviderEventKind) -> usize {
        self.state
            .lock()
            .handlers
            .values()
            .filter(|(k, _)| *k == kind)
            .count()
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn request_accounts(&self) -> Result<Vec<Account>, ProviderError> {
        let (response, latency) = {
            let mut state = self.state.lock();
            state.calls.request_accounts += 1;
            let response = state
                .script
                .pop_front()
                .unwrap_or_else(|| state.fallback.clone());
            (response, state.latency)
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        match response {
            MockResponse::Accounts(accounts) => {
                if !accounts.is_empty() {
                    self.state.lock().authorized = accounts.clone();
                }
                Ok(accounts)
            }
            MockResponse::Error(err) => Err(err),
            MockResponse::Hang => std::future::pending().await,
        }
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, ProviderError> {
        let mut state = self.state.lock();
        state.calls.get_accounts += 1;
        match &state.get_accounts_error {
            Some(err) => Err(err.clone()),
            None => Ok(state.authorized.clone()),
        }
    }

    async fn chain_id(&self) -> Result<String, ProviderError> {
        let mut state = self.state.lock();
        state.calls.chain_id += 1;
        state.chain_id.clone()
    }

    fn subscribe(&self, kind: ProviderEventKind, handler: EventHandler) -> SubscriptionId {
        let mut state = self.state.lock();
        let id = SubscriptionId(state.next_subscription);
        state.next_subscription += 1;
        state.handlers.insert(id, (kind, handler));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state.lock().handlers.remove(&id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn account(addr: &str) -> Account {
        Account::new(addr).unwrap()
    }

    #[tokio::test]
    async fn test_script_then_fallback() {
        let provider = MockProvider::new()
            .with_response(MockResponse::Error(ProviderError::locked()))
            .with_fallback(MockResponse::Accounts(vec![account("0xaaaaaaaaaaaa")]));

        assert_eq!(
            provider.request_accounts().await.unwrap_err().code,
            ProviderError::LOCKED
        );
        assert_eq!(
            provider.request_accounts().await.unwrap(),
            vec![account("0xaaaaaaaaaaaa")]
        );
        assert_eq!(provider.calls().request_accounts, 2);
    }

    #[tokio::test]
    async fn test_approval_authorizes_accounts() {
        let provider = MockProvider::new();
        assert!(provider.get_accounts().await.unwrap().is_empty());
        provider.request_accounts().await.unwrap();
        assert_eq!(
            provider.get_accounts().await.unwrap(),
            vec![account(MOCK_ACCOUNT)]
        );
    }

    #[test]
    fn test_emit_reaches_matching_handlers_only() {
        let provider = MockProvider::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let id = provider.subscribe(
            ProviderEventKind::ChainChanged,
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        provider.emit(ProviderEvent::ChainChanged("0x89".into()));
        provider.emit(ProviderEvent::Disconnect);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(provider.unsubscribe(id));
        assert!(!provider.unsubscribe(id));
        provider.emit(ProviderEvent::ChainChanged("0x1".into()));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(provider.subscription_count(), 0);
    }
}

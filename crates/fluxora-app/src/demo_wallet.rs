//! Scripted wallets for running the desktop app without a browser.
//!
//! Each [`WalletScenario`] configures a [`MockProvider`] to behave like a
//! wallet in a particular mood. [`DemoWallet`] keeps a handle to it so the
//! demo controls can push account and network changes.

use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use fluxora_core::{
    Account, MOCK_ACCOUNT, MockProvider, MockResponse, ProviderError, ProviderEvent,
    WalletProvider,
};

/// Second account the demo wallet can switch to.
pub const DEMO_ALT_ACCOUNT: &str = "0x9aF3b1C0d2E4f5A6b7C8d9E0f1A2b3C4d5E6f7A8";

/// Chain ids the demo controls cycle through.
const DEMO_CHAINS: [&str; 4] = ["0x1", "0x89", "0x2105", "0xaa36a7"];

/// How the demo wallet answers connection requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum WalletScenario {
    /// Approves right away
    #[default]
    Approve,
    /// Takes a few seconds to approve
    Slow,
    /// Rejects the first request
    Reject,
    /// Is locked for the first request, then approves on retry
    Locked,
    /// Reports a pending request that is never resolved in time
    Pending,
    /// Keeps failing with an internal error
    Broken,
    /// Never answers the first request
    Hang,
    /// Approves with an empty account list
    Empty,
    /// No wallet installed
    NoWallet,
}

impl WalletScenario {
    /// Builds the provider for this scenario, `None` when no wallet exists.
    pub fn build(self) -> Option<DemoWallet> {
        let provider = MockProvider::new();
        let provider = match self {
            WalletScenario::NoWallet => return None,
            WalletScenario::Approve => provider,
            WalletScenario::Slow => provider.with_latency(Duration::from_secs(3)),
            WalletScenario::Reject => {
                provider.with_response(MockResponse::Error(ProviderError::user_rejected()))
            }
            WalletScenario::Locked => {
                provider.with_response(MockResponse::Error(ProviderError::locked()))
            }
            WalletScenario::Pending => {
                provider.with_response(MockResponse::Error(ProviderError::request_pending()))
            }
            WalletScenario::Broken => provider.with_fallback(MockResponse::Error(
                ProviderError::internal("Internal JSON-RPC error."),
            )),
            WalletScenario::Hang => provider.with_response(MockResponse::Hang),
            WalletScenario::Empty => provider.with_response(MockResponse::Accounts(vec![])),
        };
        Some(DemoWallet {
            provider: Arc::new(provider),
        })
    }
}

/// Handle to the running demo wallet.
#[derive(Clone)]
pub struct DemoWallet {
    provider: Arc<MockProvider>,
}

impl PartialEq for DemoWallet {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.provider, &other.provider)
    }
}

impl DemoWallet {
    /// The provider handed to the wallet session.
    pub fn provider(&self) -> Arc<dyn WalletProvider> {
        self.provider.clone()
    }

    /// Switches between the two demo accounts.
    pub fn switch_account(&self, current: Option<&Account>) {
        let next = match current.map(Account::as_str) {
            Some(MOCK_ACCOUNT) => DEMO_ALT_ACCOUNT,
            _ => MOCK_ACCOUNT,
        };
        let accounts: Vec<Account> = Account::new(next).into_iter().collect();
        self.provider.set_authorized(accounts.clone());
        self.provider.emit(ProviderEvent::AccountsChanged(accounts));
    }

    /// Moves to the next chain in the demo rotation.
    pub fn switch_chain(&self, current: Option<u64>) {
        let position = DEMO_CHAINS
            .iter()
            .position(|hex| fluxora_core::parse_chain_id(hex).ok() == current);
        let next = DEMO_CHAINS[position.map_or(0, |i| (i + 1) % DEMO_CHAINS.len())];
        self.provider.set_chain_id(next);
        self.provider.emit(ProviderEvent::ChainChanged(next.to_string()));
    }

    /// Revokes the app's access, as locking the wallet would.
    pub fn revoke(&self) {
        self.provider.set_authorized(Vec::new());
        self.provider.emit(ProviderEvent::AccountsChanged(Vec::new()));
    }

    /// Simulates the wallet dropping the connection.
    pub fn drop_connection(&self) {
        self.provider.emit(ProviderEvent::Disconnect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_scenario_has_no_wallet() {
        assert!(WalletScenario::NoWallet.build().is_none());
        assert!(WalletScenario::Approve.build().is_some());
    }

    #[tokio::test]
    async fn test_reject_scenario_rejects_once() {
        let wallet = WalletScenario::Reject.build().unwrap();
        let provider = wallet.provider();
        assert_eq!(
            provider.request_accounts().await.unwrap_err().code,
            ProviderError::USER_REJECTED
        );
        assert!(provider.request_accounts().await.is_ok());
    }

    #[tokio::test]
    async fn test_switch_chain_rotates() {
        let wallet = WalletScenario::Approve.build().unwrap();
        wallet.switch_chain(Some(1));
        assert_eq!(wallet.provider().chain_id().await.unwrap(), "0x89");
        wallet.switch_chain(Some(11155111));
        assert_eq!(wallet.provider().chain_id().await.unwrap(), "0x1");
        wallet.switch_chain(None);
        assert_eq!(wallet.provider().chain_id().await.unwrap(), "0x1");
    }

    #[tokio::test]
    async fn test_switch_account_alternates() {
        let wallet = WalletScenario::Approve.build().unwrap();
        let first = Account::new(MOCK_ACCOUNT).unwrap();
        wallet.switch_account(Some(&first));
        let accounts = wallet.provider().get_accounts().await.unwrap();
        assert_eq!(accounts[0].as_str(), DEMO_ALT_ACCOUNT);
    }
}

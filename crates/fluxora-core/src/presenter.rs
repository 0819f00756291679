//! Projection of wallet session state onto the page.
//!
//! [`ConnectionView::project`] is a pure function of a [`SessionSnapshot`];
//! [`ConnectionPresenter::render`] writes the view into whichever regions
//! are mounted. Rendering the same snapshot twice produces the same regions.

use tracing::debug;

use crate::address::format_address;
use crate::config::PlatformHint;
use crate::error::WalletError;
use crate::regions::{ElementAccessor, RegionContent, RegionId};
use crate::session::{ConnectActivity, ConnectionState, SessionNotice, SessionSnapshot};

/// What pressing the wallet button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Connect,
    Disconnect,
    None,
}

/// The wallet action button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub label: &'static str,
    pub icon: &'static str,
    pub css_class: &'static str,
    pub disabled: bool,
    pub action: ButtonAction,
}

impl ButtonView {
    fn connect(label: &'static str, css_class: &'static str) -> Self {
        Self {
            label,
            icon: "🔗",
            css_class,
            disabled: false,
            action: ButtonAction::Connect,
        }
    }

    fn busy(label: &'static str, icon: &'static str, css_class: &'static str) -> Self {
        Self {
            label,
            icon,
            css_class,
            disabled: true,
            action: ButtonAction::None,
        }
    }
}

/// Visual tone of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Neutral,
    Progress,
    Success,
    Error,
}

impl StatusTone {
    pub fn css_class(&self) -> &'static str {
        match self {
            StatusTone::Neutral => "",
            StatusTone::Progress => "connecting",
            StatusTone::Success => "connected",
            StatusTone::Error => "error",
        }
    }
}

/// The status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub tone: StatusTone,
}

impl StatusLine {
    fn new(text: impl Into<String>, tone: StatusTone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

/// Connected account panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPanel {
    pub address: String,
    pub short_address: String,
}

/// Current network panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPanel {
    pub name: String,
    pub chain_id: u64,
    pub is_testnet: bool,
}

/// Everything the wallet regions show for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionView {
    pub button: ButtonView,
    pub status: StatusLine,
    pub account: Option<AccountPanel>,
    pub network: Option<NetworkPanel>,
}

impl ConnectionView {
    /// Projects a snapshot into display form.
    pub fn project(snapshot: &SessionSnapshot, platform: PlatformHint) -> Self {
        match snapshot.state {
            ConnectionState::Connected => Self::connected(snapshot),
            ConnectionState::Connecting => Self::connecting(snapshot, platform),
            ConnectionState::Error(_) => Self::failed(snapshot, platform),
            ConnectionState::Disconnected => Self::disconnected(snapshot, platform),
        }
    }

    fn connected(snapshot: &SessionSnapshot) -> Self {
        let account = snapshot.account.as_ref().map(|account| AccountPanel {
            address: account.to_string(),
            short_address: format_address(account.as_str()),
        });
        let network = snapshot.network.as_ref().map(|network| NetworkPanel {
            name: network.display_name.clone(),
            chain_id: network.chain_id,
            is_testnet: network.is_testnet,
        });

        Self {
            button: ButtonView {
                label: "Disconnect Wallet",
                icon: "🔗",
                css_class: "disconnect-btn",
                disabled: false,
                action: ButtonAction::Disconnect,
            },
            status: StatusLine::new("✅ Wallet Connected Successfully", StatusTone::Success),
            account,
            network,
        }
    }

    fn connecting(snapshot: &SessionSnapshot, platform: PlatformHint) -> Self {
        let (button, status) = match snapshot.activity {
            ConnectActivity::AwaitingWallet => (
                ButtonView::busy("Check Wallet", "👀", "connect-btn pending"),
                StatusLine::new(
                    if platform.is_mobile() {
                        "Please check your wallet app for pending requests"
                    } else {
                        "Please check your wallet for pending requests"
                    },
                    StatusTone::Progress,
                ),
            ),
            ConnectActivity::RetryScheduled { delay } => {
                let reason = snapshot
                    .last_error
                    .as_ref()
                    .map(|err| error_message(err, platform))
                    .unwrap_or_default();
                let seconds = delay.as_millis().div_ceil(1000);
                (
                    ButtonView::busy("Retrying...", "🔄", "connect-btn retrying"),
                    StatusLine::new(
                        format!("{reason} Retrying in {seconds}s...").trim_start().to_string(),
                        StatusTone::Error,
                    ),
                )
            }
            ConnectActivity::Requesting | ConnectActivity::Idle => (
                ButtonView::busy("Connecting...", "⏳", "connect-btn connecting"),
                StatusLine::new(
                    if platform.is_mobile() {
                        "Connecting to wallet app..."
                    } else {
                        "Connecting to wallet..."
                    },
                    StatusTone::Progress,
                ),
            ),
        };

        Self {
            button,
            status,
            account: None,
            network: None,
        }
    }

    fn failed(snapshot: &SessionSnapshot, platform: PlatformHint) -> Self {
        let Some(err) = &snapshot.last_error else {
            return Self::disconnected(snapshot, platform);
        };

        let css_class = match err {
            WalletError::UserRejected => "connect-btn rejected",
            WalletError::RequestPending => "connect-btn pending",
            WalletError::ProviderInternal(_) => "connect-btn wallet-error",
            WalletError::AttemptLimitReached(_) => "connect-btn retry",
            _ => "connect-btn error",
        };
        let label = match err {
            WalletError::UserRejected | WalletError::NoProviderFound => "Connect Wallet",
            _ => "Try Again",
        };

        Self {
            button: ButtonView::connect(label, css_class),
            status: StatusLine::new(error_message(err, platform), StatusTone::Error),
            account: None,
            network: None,
        }
    }

    fn disconnected(snapshot: &SessionSnapshot, platform: PlatformHint) -> Self {
        let status = match snapshot.notice {
            Some(SessionNotice::Disconnected) => {
                StatusLine::new("Wallet disconnected", StatusTone::Neutral)
            }
            None if platform.is_mobile() => {
                StatusLine::new("Ready to connect wallet app...", StatusTone::Neutral)
            }
            None => StatusLine::new("Ready to connect your wallet", StatusTone::Neutral),
        };

        Self {
            button: ButtonView::connect("Connect Wallet", "connect-btn"),
            status,
            account: None,
            network: None,
        }
    }
}

/// User-facing text for a connection failure.
pub fn error_message(err: &WalletError, platform: PlatformHint) -> String {
    let mobile = platform.is_mobile();
    match err {
        WalletError::NoProviderFound if mobile => {
            "No Ethereum wallet found. Please install a mobile Web3 wallet like MetaMask.".into()
        }
        WalletError::NoProviderFound => {
            "No Ethereum wallet found. Please install MetaMask or another Web3 wallet extension."
                .into()
        }
        WalletError::UserRejected if mobile => {
            "Connection cancelled. Tap 'Connect Wallet' to try again.".into()
        }
        WalletError::UserRejected => {
            "Connection rejected. Please click 'Connect Wallet' to try again.".into()
        }
        WalletError::RequestPending if mobile => {
            "Check your wallet app for pending requests. Switch to your wallet app and approve the connection."
                .into()
        }
        WalletError::RequestPending => {
            "Please check your wallet extension for pending connection requests.".into()
        }
        WalletError::ProviderInternal(_) => {
            "Wallet error occurred. Please restart your wallet and try again.".into()
        }
        WalletError::ProviderLocked => {
            "Wallet is locked. Please unlock your wallet and try again.".into()
        }
        WalletError::Timeout(_) if mobile => {
            "Connection timed out. Please ensure your wallet app is running and try again.".into()
        }
        WalletError::Timeout(_) => {
            "Connection timed out. Please check your wallet and try again.".into()
        }
        WalletError::NoAccounts => {
            "No accounts found. Please unlock your wallet and try again.".into()
        }
        WalletError::AttemptLimitReached(_) => {
            "Connection limit reached. Click to try again.".into()
        }
        WalletError::Provider { message, .. } => format!("Connection failed: {message}"),
        other => other.to_string(),
    }
}

/// Renders session snapshots into display regions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionPresenter {
    platform: PlatformHint,
}

impl ConnectionPresenter {
    pub fn new(platform: PlatformHint) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> PlatformHint {
        self.platform
    }

    /// Returns the view for a snapshot without rendering it.
    pub fn view(&self, snapshot: &SessionSnapshot) -> ConnectionView {
        ConnectionView::project(snapshot, self.platform)
    }

    /// Writes the four wallet regions. Missing regions are skipped.
    ///
    /// Returns the number of regions written.
    pub fn render(&self, snapshot: &SessionSnapshot, regions: &mut impl ElementAccessor) -> usize {
        let view = self.view(snapshot);
        let contents = [
            (RegionId::ConnectButton, RegionContent::Button(view.button)),
            (RegionId::Status, RegionContent::Status(view.status)),
            (
                RegionId::AccountInfo,
                view.account.map(RegionContent::Account).unwrap_or_default(),
            ),
            (
                RegionId::NetworkInfo,
                view.network.map(RegionContent::Network).unwrap_or_default(),
            ),
        ];

        let mut written = 0;
        for (id, content) in contents {
            match regions.element(id) {
                Some(slot) => {
                    *slot = content;
                    written += 1;
                }
                None => debug!(region = id.element_id(), "Region not mounted, skipping"),
            }
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::address::Account;
    use crate::error::WalletErrorKind;
    use crate::network::NetworkInfo;
    use crate::regions::RegionMap;

    fn connected_snapshot() -> SessionSnapshot {
        SessionSnapshot {
            state: ConnectionState::Connected,
            account: Account::new("0x1234567890abcdef1234"),
            network: Some(NetworkInfo::resolve(11155111)),
            max_attempts: 3,
            has_provider: true,
            ..SessionSnapshot::default()
        }
    }

    fn failed_snapshot(err: WalletError) -> SessionSnapshot {
        SessionSnapshot {
            state: ConnectionState::Error(err.kind()),
            last_error: Some(err),
            max_attempts: 3,
            has_provider: true,
            ..SessionSnapshot::default()
        }
    }

    #[test]
    fn test_connected_view() {
        let view = ConnectionView::project(&connected_snapshot(), PlatformHint::Desktop);
        assert_eq!(view.button.action, ButtonAction::Disconnect);
        assert_eq!(view.status.tone, StatusTone::Success);

        let account = view.account.unwrap();
        assert_eq!(account.short_address, "0x1234...1234");

        let network = view.network.unwrap();
        assert_eq!(network.name, "Sepolia");
        assert!(network.is_testnet);
    }

    #[test]
    fn test_connecting_button_is_disabled() {
        let snapshot = SessionSnapshot {
            state: ConnectionState::Connecting,
            activity: ConnectActivity::Requesting,
            ..SessionSnapshot::default()
        };
        let view = ConnectionView::project(&snapshot, PlatformHint::Desktop);
        assert!(view.button.disabled);
        assert_eq!(view.button.label, "Connecting...");
        assert!(view.account.is_none());
    }

    #[test]
    fn test_retry_view_mentions_delay() {
        let snapshot = SessionSnapshot {
            state: ConnectionState::Connecting,
            activity: ConnectActivity::RetryScheduled {
                delay: Duration::from_millis(3000),
            },
            last_error: Some(WalletError::ProviderLocked),
            ..SessionSnapshot::default()
        };
        let view = ConnectionView::project(&snapshot, PlatformHint::Desktop);
        assert_eq!(view.button.label, "Retrying...");
        assert!(view.status.text.starts_with("Wallet is locked."));
        assert!(view.status.text.ends_with("Retrying in 3s..."));
    }

    #[test]
    fn test_platform_specific_messages() {
        let snapshot = failed_snapshot(WalletError::UserRejected);
        let mobile = ConnectionView::project(&snapshot, PlatformHint::Mobile);
        let desktop = ConnectionView::project(&snapshot, PlatformHint::Desktop);
        assert!(mobile.status.text.starts_with("Connection cancelled."));
        assert!(desktop.status.text.starts_with("Connection rejected."));
        assert_eq!(desktop.button.action, ButtonAction::Connect);
    }

    #[test]
    fn test_limit_and_no_accounts_messages() {
        let limit = ConnectionView::project(
            &failed_snapshot(WalletError::AttemptLimitReached(3)),
            PlatformHint::Desktop,
        );
        assert!(limit.status.text.contains("limit reached"));

        let empty = ConnectionView::project(
            &failed_snapshot(WalletError::NoAccounts),
            PlatformHint::Desktop,
        );
        assert!(empty.status.text.starts_with("No accounts found"));
        assert_eq!(empty.status.tone, StatusTone::Error);
    }

    #[test]
    fn test_error_state_without_error_falls_back() {
        let snapshot = SessionSnapshot {
            state: ConnectionState::Error(WalletErrorKind::Timeout),
            ..SessionSnapshot::default()
        };
        let view = ConnectionView::project(&snapshot, PlatformHint::Desktop);
        assert_eq!(view.status.text, "Ready to connect your wallet");
    }

    #[test]
    fn test_render_skips_missing_regions() {
        let presenter = ConnectionPresenter::new(PlatformHint::Desktop);
        let mut regions = RegionMap::with_regions([RegionId::Status]);

        let written = presenter.render(&connected_snapshot(), &mut regions);
        assert_eq!(written, 1);
        assert!(matches!(
            regions.get(RegionId::Status),
            Some(RegionContent::Status(line)) if line.tone == StatusTone::Success
        ));
        assert!(regions.get(RegionId::ConnectButton).is_none());
    }

    #[test]
    fn test_render_is_idempotent_and_clears_panels() {
        let presenter = ConnectionPresenter::new(PlatformHint::Desktop);
        let mut regions = RegionMap::all();

        assert_eq!(presenter.render(&connected_snapshot(), &mut regions), 4);
        let first = regions.clone();
        presenter.render(&connected_snapshot(), &mut regions);
        assert_eq!(first, regions);
        assert!(matches!(
            regions.get(RegionId::AccountInfo),
            Some(RegionContent::Account(_))
        ));

        presenter.render(&SessionSnapshot::default(), &mut regions);
        assert_eq!(regions.get(RegionId::AccountInfo), Some(&RegionContent::Empty));
        assert_eq!(regions.get(RegionId::NetworkInfo), Some(&RegionContent::Empty));
    }
}

//! Wallet session
//!
//! [`WalletSession`] owns the single connection to an external wallet
//! provider. It runs the connect handshake, classifies provider failures,
//! schedules retries with exponential backoff, keeps the active account in
//! step with provider notifications, and publishes an immutable
//! [`SessionSnapshot`] after every mutation.
//!
//! ## State machine
//!
//! ```text
//! Disconnected ──connect──▶ Connecting ──ok──▶ Connected
//!       ▲                    │    ▲               │
//!       │                    │    └──retry────────┤ (same attempt cycle)
//!       └────failure─────────┘                    │
//!       └──────disconnect / empty accounts────────┘
//! ```
//!
//! `Error(kind)` is the disconnected state annotated with the failure that
//! ended the last attempt.
//!
//! ## Attempt tokens
//!
//! Every `connect` and `disconnect` advances an epoch. Work that completes
//! for an older epoch (a provider answer arriving after a disconnect, a
//! retry timer that fired after a manual attempt) is discarded.

use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::address::Account;
use crate::config::SessionConfig;
use crate::error::{WalletError, WalletErrorKind};
use crate::network::NetworkInfo;
use crate::provider::{
    EventHandler, ProviderError, ProviderEvent, ProviderEventKind, SubscriptionId, WalletProvider,
};

/// Provider notifications the session listens to while connected.
const SUBSCRIBED_EVENTS: [ProviderEventKind; 3] = [
    ProviderEventKind::AccountsChanged,
    ProviderEventKind::ChainChanged,
    ProviderEventKind::Disconnect,
];

/// Connection state of a [`WalletSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Disconnected after a failed attempt.
    Error(WalletErrorKind),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self, ConnectionState::Connecting)
    }

    /// True for `Disconnected` and `Error(_)`.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, ConnectionState::Disconnected | ConnectionState::Error(_))
    }
}

/// What a `Connecting` session is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectActivity {
    #[default]
    Idle,
    /// A provider round trip is in flight.
    Requesting,
    /// The wallet reported a pending request; polling for its resolution.
    AwaitingWallet,
    /// An automatic retry fires after `delay`.
    RetryScheduled { delay: Duration },
}

/// One-shot notices for the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionNotice {
    Disconnected,
}

/// Immutable view of the session published after every mutation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub state: ConnectionState,
    pub activity: ConnectActivity,
    pub account: Option<Account>,
    pub network: Option<NetworkInfo>,
    pub attempts: u32,
    pub max_attempts: u32,
    pub last_error: Option<WalletError>,
    pub notice: Option<SessionNotice>,
    pub has_provider: bool,
}

/// Outcome of one health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthCheck {
    /// The session was not connected.
    Skipped,
    Healthy,
    /// The provider reports a different first account, which was adopted.
    AccountChanged,
    /// The provider reports no accounts or is broken; the session disconnected.
    Disconnected,
    /// The query failed in a way that does not warrant a disconnect.
    Inconclusive,
}

#[derive(Default)]
struct SessionCore {
    state: ConnectionState,
    activity: ConnectActivity,
    account: Option<Account>,
    network: Option<NetworkInfo>,
    attempts: u32,
    last_error: Option<WalletError>,
    notice: Option<SessionNotice>,
    in_flight: bool,
    epoch: u64,
    subscriptions: Vec<SubscriptionId>,
    retry_task: Option<JoinHandle<()>>,
    health_task: Option<JoinHandle<()>>,
    network_task: Option<JoinHandle<()>>,
    notice_task: Option<JoinHandle<()>>,
}

impl SessionCore {
    fn abort_timers(&mut self) {
        for task in [
            self.retry_task.take(),
            self.health_task.take(),
            self.network_task.take(),
            self.notice_task.take(),
        ]
        .into_iter()
        .flatten()
        {
            task.abort();
        }
    }
}

struct SessionInner {
    provider: Option<Arc<dyn WalletProvider>>,
    config: SessionConfig,
    core: Mutex<SessionCore>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.core.get_mut().abort_timers();
    }
}

/// Handle to the wallet session.
///
/// Cloning is cheap; all clones share one session. A page (or process)
/// creates exactly one session at startup and keeps it for its lifetime.
#[derive(Clone)]
pub struct WalletSession {
    inner: Arc<SessionInner>,
}

impl WalletSession {
    /// Create a session talking to `provider`.
    pub fn new(provider: Arc<dyn WalletProvider>, config: SessionConfig) -> Self {
        Self::build(Some(provider), config)
    }

    /// Create a session for an environment without an injected wallet.
    ///
    /// Every `connect` fails with [`WalletError::NoProviderFound`].
    pub fn without_provider(config: SessionConfig) -> Self {
        Self::build(None, config)
    }

    fn build(provider: Option<Arc<dyn WalletProvider>>, config: SessionConfig) -> Self {
        let initial = SessionSnapshot {
            max_attempts: config.max_attempts,
            has_provider: provider.is_some(),
            ..SessionSnapshot::default()
        };
        let (snapshots, _) = watch::channel(initial);
        Self {
            inner: Arc::new(SessionInner {
                provider,
                config,
                core: Mutex::new(SessionCore::default()),
                snapshots,
            }),
        }
    }

    fn from_weak(weak: &Weak<SessionInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Returns the latest snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.snapshots.borrow().clone()
    }

    /// Subscribe to snapshots. The receiver starts with the current one.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshots.subscribe()
    }

    /// Returns the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.inner.core.lock().state
    }

    /// Returns the active account, if connected.
    pub fn account(&self) -> Option<Account> {
        self.inner.core.lock().account.clone()
    }

    /// Returns the number of consecutive failed attempts.
    pub fn attempts(&self) -> u32 {
        self.inner.core.lock().attempts
    }

    /// Returns whether the session is connected.
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Applies a mutation and publishes the resulting snapshot.
    ///
    /// Publishing happens under the state lock so snapshots are observed in
    /// mutation order.
    fn update<R>(&self, f: impl FnOnce(&mut SessionCore) -> R) -> R {
        let mut core = self.inner.core.lock();
        let result = f(&mut core);
        let snapshot = SessionSnapshot {
            state: core.state,
            activity: core.activity,
            account: core.account.clone(),
            network: core.network.clone(),
            attempts: core.attempts,
            max_attempts: self.inner.config.max_attempts,
            last_error: core.last_error.clone(),
            notice: core.notice,
            has_provider: self.inner.provider.is_some(),
        };
        self.inner.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
        result
    }

    fn current_epoch(&self) -> u64 {
        self.inner.core.lock().epoch
    }

    /// Connect to the provider.
    ///
    /// Resolves with the active account, or with the classified failure.
    /// A call made while another attempt is in flight is rejected with
    /// [`WalletError::AlreadyConnecting`]; a call made after `max_attempts`
    /// consecutive failures is refused with
    /// [`WalletError::AttemptLimitReached`] without contacting the provider.
    pub fn connect(&self) -> BoxFuture<'static, Result<Account, WalletError>> {
        let session = self.clone();
        Box::pin(async move { session.run_connect().await })
    }

    async fn run_connect(&self) -> Result<Account, WalletError> {
        let (provider, epoch) = match self.begin_attempt()? {
            Attempt::Start { provider, epoch } => (provider, epoch),
            Attempt::AlreadyConnected(account) => return Ok(account),
        };

        match self.handshake(&provider, epoch).await {
            Ok(accounts) => self.finish_success(&provider, epoch, accounts),
            Err(err) => self.finish_failure(epoch, err),
        }
    }

    fn begin_attempt(&self) -> Result<Attempt, WalletError> {
        let max_attempts = self.inner.config.max_attempts;
        let provider = self.inner.provider.clone();

        self.update(|core| {
            if core.in_flight {
                debug!("Connection already in progress");
                return Err(WalletError::AlreadyConnecting);
            }
            if core.state.is_connected() {
                if let Some(account) = &core.account {
                    return Ok(Attempt::AlreadyConnected(account.clone()));
                }
            }

            if let Some(retry) = core.retry_task.take() {
                retry.abort();
            }
            core.notice = None;

            let Some(provider) = provider else {
                warn!("No wallet provider available");
                let err = WalletError::NoProviderFound;
                core.state = ConnectionState::Error(err.kind());
                core.activity = ConnectActivity::Idle;
                core.last_error = Some(err.clone());
                return Err(err);
            };

            if core.attempts >= max_attempts {
                warn!(attempts = core.attempts, "Connection limit reached");
                let err = WalletError::AttemptLimitReached(max_attempts);
                core.state = ConnectionState::Error(err.kind());
                core.activity = ConnectActivity::Idle;
                core.last_error = Some(err.clone());
                core.attempts = 0;
                return Err(err);
            }

            core.epoch += 1;
            core.in_flight = true;
            core.state = ConnectionState::Connecting;
            core.activity = ConnectActivity::Requesting;
            core.last_error = None;
            debug!(epoch = core.epoch, attempts = core.attempts, "Connecting wallet");
            Ok(Attempt::Start {
                provider,
                epoch: core.epoch,
            })
        })
    }

    /// Races one provider call against the request timeout.
    async fn round_trip<T>(
        &self,
        call: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, WalletError> {
        let timeout = self.inner.config.request_timeout;
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result.map_err(WalletError::from),
            Err(_) => Err(WalletError::Timeout(timeout)),
        }
    }

    async fn handshake(
        &self,
        provider: &Arc<dyn WalletProvider>,
        epoch: u64,
    ) -> Result<Vec<Account>, WalletError> {
        match self.round_trip(provider.get_accounts()).await {
            Ok(accounts) if !accounts.is_empty() => {
                debug!("Using already-authorized accounts");
                return Ok(accounts);
            }
            Ok(_) => {}
            Err(err) => debug!(%err, "Authorized account pre-check failed"),
        }

        match self.round_trip(provider.request_accounts()).await {
            Err(WalletError::RequestPending) => self.await_pending(provider, epoch).await,
            other => other,
        }
    }

    /// Waits for a pending wallet request to resolve on its own.
    async fn await_pending(
        &self,
        provider: &Arc<dyn WalletProvider>,
        epoch: u64,
    ) -> Result<Vec<Account>, WalletError> {
        let still_current = self.update(|core| {
            if core.epoch != epoch {
                return false;
            }
            core.activity = ConnectActivity::AwaitingWallet;
            true
        });
        if !still_current {
            return Err(WalletError::Superseded);
        }

        tokio::time::sleep(self.inner.config.pending_poll_delay).await;
        if self.current_epoch() != epoch {
            return Err(WalletError::Superseded);
        }

        match self.round_trip(provider.get_accounts()).await {
            Ok(accounts) if !accounts.is_empty() => Ok(accounts),
            Ok(_) => Err(WalletError::RequestPending),
            Err(err) => {
                warn!(%err, "Could not get existing accounts");
                Err(WalletError::RequestPending)
            }
        }
    }

    fn finish_success(
        &self,
        provider: &Arc<dyn WalletProvider>,
        epoch: u64,
        accounts: Vec<Account>,
    ) -> Result<Account, WalletError> {
        let Some(account) = accounts.into_iter().next() else {
            return self.finish_failure(epoch, WalletError::NoAccounts);
        };

        let connected = self.update(|core| {
            if core.epoch != epoch {
                return false;
            }
            core.in_flight = false;
            core.state = ConnectionState::Connected;
            core.activity = ConnectActivity::Idle;
            core.account = Some(account.clone());
            core.attempts = 0;
            core.last_error = None;
            core.notice = None;

            core.network_task = Some(self.spawn_network_fetch(provider.clone(), epoch));
            if let Some(interval) = self.inner.config.health_check_interval {
                core.health_task = Some(self.spawn_health_check(epoch, interval));
            }
            true
        });

        if !connected {
            debug!(epoch, "Discarding stale connection result");
            return Err(WalletError::Superseded);
        }

        self.register_listeners(provider, epoch);
        info!(account = %account, "Wallet connected");
        Ok(account)
    }

    fn finish_failure(&self, epoch: u64, err: WalletError) -> Result<Account, WalletError> {
        let config = &self.inner.config;

        let current = self.update(|core| {
            if core.epoch != epoch {
                return false;
            }
            core.in_flight = false;
            if err.is_recoverable() {
                core.attempts += 1;
            }
            core.state = ConnectionState::Error(err.kind());
            core.activity = ConnectActivity::Idle;
            core.last_error = Some(err.clone());

            if err.should_auto_retry() && core.attempts < config.max_attempts {
                let delay = config.retry_delay(core.attempts);
                debug!(?delay, attempts = core.attempts, "Scheduling connection retry");
                core.state = ConnectionState::Connecting;
                core.activity = ConnectActivity::RetryScheduled { delay };
                core.retry_task = Some(self.spawn_retry(epoch, delay));
            }
            true
        });

        if !current {
            debug!(epoch, %err, "Discarding stale connection failure");
            return Err(WalletError::Superseded);
        }

        warn!(%err, "Wallet connection failed");
        Err(err)
    }

    fn spawn_retry(&self, epoch: u64, delay: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(session) = WalletSession::from_weak(&weak) else {
                return;
            };

            let due = {
                let mut core = session.inner.core.lock();
                // Detach our own handle so the retry's connect does not abort us.
                core.epoch == epoch && core.retry_task.take().is_some()
            };
            if !due {
                return;
            }

            debug!("Retrying wallet connection");
            if let Err(err) = session.connect().await {
                debug!(%err, "Automatic retry failed");
            }
        })
    }

    fn spawn_network_fetch(&self, provider: Arc<dyn WalletProvider>, epoch: u64) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        let retry_delay = self.inner.config.network_retry_delay;
        tokio::spawn(async move {
            for attempt in 0..2 {
                if attempt > 0 {
                    tokio::time::sleep(retry_delay).await;
                }
                let Some(session) = WalletSession::from_weak(&weak) else {
                    return;
                };
                match session.round_trip(provider.chain_id()).await {
                    Ok(chain_id) => {
                        if session.current_epoch() == epoch {
                            session.on_chain_changed(&chain_id);
                        }
                        return;
                    }
                    Err(err) => warn!(attempt, %err, "Could not get network info"),
                }
            }
        })
    }

    /// Clears the status notice after the configured duration.
    ///
    /// Outside a Tokio runtime the notice stays until the next transition.
    fn spawn_notice_expiry(&self, epoch: u64) -> Option<JoinHandle<()>> {
        let handle = tokio::runtime::Handle::try_current().ok()?;
        let weak = Arc::downgrade(&self.inner);
        let duration = self.inner.config.notice_duration;
        Some(handle.spawn(async move {
            tokio::time::sleep(duration).await;
            let Some(session) = WalletSession::from_weak(&weak) else {
                return;
            };
            session.update(|core| {
                if core.epoch == epoch {
                    core.notice = None;
                    core.notice_task = None;
                }
            });
        }))
    }

    fn spawn_health_check(&self, epoch: u64, interval: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(session) = WalletSession::from_weak(&weak) else {
                    return;
                };
                if session.current_epoch() != epoch {
                    return;
                }
                session.check_health().await;
            }
        })
    }

    /// Re-query authorized accounts and reconcile with the stored account.
    pub async fn check_health(&self) -> HealthCheck {
        let Some(provider) = self.inner.provider.clone() else {
            return HealthCheck::Skipped;
        };
        let (epoch, expected) = {
            let core = self.inner.core.lock();
            if !core.state.is_connected() {
                return HealthCheck::Skipped;
            }
            (core.epoch, core.account.clone())
        };

        let timeout = self.inner.config.request_timeout;
        let result = tokio::time::timeout(timeout, provider.get_accounts()).await;
        if self.current_epoch() != epoch {
            return HealthCheck::Skipped;
        }

        match result {
            Ok(Ok(accounts)) => match accounts.first() {
                Some(first) if Some(first) == expected.as_ref() => HealthCheck::Healthy,
                Some(_) => {
                    info!("Account changed, updating session");
                    self.on_accounts_changed(accounts);
                    HealthCheck::AccountChanged
                }
                None => {
                    info!("Wallet no longer reports accounts");
                    self.on_accounts_changed(accounts);
                    HealthCheck::Disconnected
                }
            },
            Ok(Err(err)) if err.is_provider_failure() => {
                warn!(%err, "Health check failed, disconnecting");
                self.disconnect();
                HealthCheck::Disconnected
            }
            Ok(Err(err)) => {
                warn!(%err, "Health check failed");
                HealthCheck::Inconclusive
            }
            Err(_) => {
                warn!(?timeout, "Health check timed out");
                HealthCheck::Inconclusive
            }
        }
    }

    /// Subscribes to provider events for the connection made under `epoch`.
    ///
    /// The provider is called with the core lock released, so a handler it
    /// runs from inside `subscribe` can re-enter the session.
    fn register_listeners(&self, provider: &Arc<dyn WalletProvider>, epoch: u64) {
        {
            let core = self.inner.core.lock();
            if core.epoch != epoch || !core.subscriptions.is_empty() {
                return;
            }
        }

        let weak = Arc::downgrade(&self.inner);
        let ids: Vec<SubscriptionId> = SUBSCRIBED_EVENTS
            .into_iter()
            .map(|kind| {
                let weak = weak.clone();
                let handler: EventHandler = Arc::new(move |event| {
                    if let Some(session) = WalletSession::from_weak(&weak) {
                        session.handle_event(event);
                    }
                });
                provider.subscribe(kind, handler)
            })
            .collect();

        let stale = {
            let mut core = self.inner.core.lock();
            if core.epoch == epoch && core.subscriptions.is_empty() {
                debug!(count = ids.len(), "Registered provider listeners");
                core.subscriptions = ids;
                return;
            }
            ids
        };

        // Torn down while subscribing.
        debug!(count = stale.len(), "Dropping listeners of a closed connection");
        for id in stale {
            provider.unsubscribe(id);
        }
    }

    /// Dispatch a provider notification.
    pub fn handle_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => self.on_accounts_changed(accounts),
            ProviderEvent::ChainChanged(chain_id) => self.on_chain_changed(&chain_id),
            ProviderEvent::Disconnect => self.on_disconnect(),
        }
    }

    /// The provider reported a new account list.
    ///
    /// An empty list disconnects; a different first account is adopted
    /// without re-running the handshake.
    pub fn on_accounts_changed(&self, accounts: Vec<Account>) {
        let Some(first) = accounts.into_iter().next() else {
            info!("Wallet reported no accounts, disconnecting");
            self.disconnect();
            return;
        };

        self.update(|core| {
            if !core.state.is_connected() {
                debug!("Ignoring account change while not connected");
                return;
            }
            if core.account.as_ref() != Some(&first) {
                info!(account = %first, "Active account changed");
                core.account = Some(first);
            }
        });
    }

    /// The provider switched networks. Connection state is unaffected.
    pub fn on_chain_changed(&self, chain_id: &str) {
        match NetworkInfo::from_hex(chain_id) {
            Ok(network) => self.update(|core| {
                if core.state.is_connected() {
                    debug!(network = %network.display_name, "Network updated");
                    core.network = Some(network);
                }
            }),
            Err(err) => warn!(%err, "Ignoring chain change"),
        }
    }

    /// Provider-initiated teardown.
    pub fn on_disconnect(&self) {
        info!("Provider disconnected");
        self.disconnect();
    }

    /// Tear the session down to `Disconnected`.
    ///
    /// Clears the account, removes the provider listeners this session
    /// registered, and cancels retry, network, and health timers. Never fails.
    pub fn disconnect(&self) {
        let subscriptions = self.update(|core| {
            core.epoch += 1;
            core.abort_timers();

            core.state = ConnectionState::Disconnected;
            core.activity = ConnectActivity::Idle;
            core.account = None;
            core.network = None;
            core.attempts = 0;
            core.in_flight = false;
            core.last_error = None;
            core.notice = Some(SessionNotice::Disconnected);
            core.notice_task = self.spawn_notice_expiry(core.epoch);

            std::mem::take(&mut core.subscriptions)
        });

        if let Some(provider) = &self.inner.provider {
            for id in subscriptions {
                if !provider.unsubscribe(id) {
                    debug!(?id, "Listener was already removed");
                }
            }
        }
        info!("Wallet disconnected");
    }
}

enum Attempt {
    Start {
        provider: Arc<dyn WalletProvider>,
        epoch: u64,
    },
    AlreadyConnected(Account),
}

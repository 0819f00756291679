//! Entry point for the Fluxora quest board.
//!
//! Launches the Dioxus desktop app with one wallet session shared by every
//! component for the lifetime of the process.

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dioxus::desktop::{Config, LogicalSize, WindowBuilder};
use dioxus::prelude::*;
use tracing_subscriber::EnvFilter;

use fluxora_app::components::App;
use fluxora_app::demo_wallet::{DemoWallet, WalletScenario};
use fluxora_app::state::AppState;
use fluxora_core::{
    FileSlot, FormTimings, PlatformHint, QuestStore, SessionConfig, WalletSession,
};

/// CSS styles embedded at compile time.
const STYLES_CSS: &str = include_str!("../assets/styles.css");

/// Everything the root component needs, set once before launch.
struct Launch {
    session: WalletSession,
    demo: Option<DemoWallet>,
    platform: PlatformHint,
    data_dir: PathBuf,
}

static LAUNCH: OnceLock<Launch> = OnceLock::new();

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "fluxora")]
#[command(about = "Desktop quest board with wallet connection")]
struct Args {
    /// How the demo wallet answers connection requests
    #[arg(short, long, value_enum, default_value_t = WalletScenario::Approve)]
    wallet: WalletScenario,

    /// User-agent string used to guess the platform
    #[arg(long)]
    user_agent: Option<String>,

    /// Force mobile timeouts and wording
    #[arg(long)]
    mobile: bool,

    /// Provider round-trip timeout in milliseconds (platform default if unset)
    #[arg(long)]
    request_timeout_ms: Option<u64>,

    /// Failed attempts allowed before connecting is refused
    #[arg(long, default_value = "3")]
    max_attempts: u32,

    /// Seconds between connection health checks, 0 disables them
    #[arg(long, default_value = "5")]
    health_check_secs: u64,

    /// Directory holding the saved quest list
    #[arg(short, long, default_value = "fluxora-data")]
    data_dir: PathBuf,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn platform(&self) -> PlatformHint {
        if self.mobile {
            return PlatformHint::Mobile;
        }
        self.user_agent
            .as_deref()
            .map(PlatformHint::detect)
            .unwrap_or_default()
    }

    fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::for_platform(self.platform())
            .with_max_attempts(self.max_attempts)
            .with_health_check(
                (self.health_check_secs > 0).then(|| Duration::from_secs(self.health_check_secs)),
            );
        if let Some(ms) = self.request_timeout_ms {
            config = config.with_request_timeout(Duration::from_millis(ms));
        }
        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let platform = args.platform();
    let config = args.session_config();
    tracing::info!(?platform, wallet = ?args.wallet, "Starting Fluxora");

    let demo = args.wallet.build();
    let session = match &demo {
        Some(wallet) => WalletSession::new(wallet.provider(), config),
        None => WalletSession::without_provider(config),
    };

    if LAUNCH
        .set(Launch {
            session,
            demo,
            platform,
            data_dir: args.data_dir,
        })
        .is_err()
    {
        anyhow::bail!("launch state already initialized");
    }

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            Config::new()
                .with_window(
                    WindowBuilder::new()
                        .with_title("Fluxora - Crypto Quest Board")
                        .with_inner_size(LogicalSize::new(1100, 860))
                        .with_resizable(true),
                )
                .with_custom_head(format!(r#"<style>{}</style>"#, STYLES_CSS)),
        )
        .launch(RootApp);

    Ok(())
}

/// Root component: provides the session and mirrors its snapshots into state.
#[component]
fn RootApp() -> Element {
    let Some(launch) = LAUNCH.get() else {
        return rsx! { p { "Fluxora failed to start." } };
    };

    let session = use_context_provider(|| launch.session.clone());
    use_context_provider(|| launch.demo.clone());

    let state = use_signal(|| {
        let quests = QuestStore::open(FileSlot::in_dir(&launch.data_dir));
        AppState::new(launch.platform, quests, FormTimings::default())
    });

    use_future(move || {
        let session = session.clone();
        let mut state = state;
        async move {
            let mut snapshots = session.subscribe();
            loop {
                let snapshot = snapshots.borrow_and_update().clone();
                state.write().apply_snapshot(snapshot);
                if snapshots.changed().await.is_err() {
                    break;
                }
            }
        }
    });

    use_drop(move || {
        tracing::info!("Shutting down Fluxora");
        if let Some(launch) = LAUNCH.get() {
            launch.session.disconnect();
        }
    });

    rsx! {
        App { state }
    }
}

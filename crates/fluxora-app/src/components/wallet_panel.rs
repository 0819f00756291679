//! Wallet connection panel.
//!
//! Reads the four wallet regions rendered by the presenter. A region that
//! holds no content is simply not drawn.

use dioxus::prelude::*;
use fluxora_core::{ButtonAction, RegionId, WalletSession};

use crate::state::AppState;

#[component]
pub fn WalletPanel(state: Signal<AppState>) -> Element {
    let session = use_context::<WalletSession>();
    let state_read = state.read();

    let button_view = state_read.button().cloned();
    let status = state_read.status().cloned();
    let account = state_read.account_panel().cloned();
    let network = state_read.network_panel().cloned();

    let action = button_view.as_ref().map(|view| view.action);
    let on_wallet_click = move |_: MouseEvent| match action {
        Some(ButtonAction::Connect) => {
            let connect = session.connect();
            spawn(async move {
                if let Err(err) = connect.await {
                    tracing::debug!(%err, "Connect button attempt failed");
                }
            });
        }
        Some(ButtonAction::Disconnect) => session.disconnect(),
        Some(ButtonAction::None) | None => {}
    };

    rsx! {
        section {
            class: "wallet-panel",

            if let Some(view) = button_view {
                button {
                    id: RegionId::ConnectButton.element_id(),
                    class: "{view.css_class}",
                    disabled: view.disabled,
                    onclick: on_wallet_click,
                    span { class: "btn-icon", "{view.icon}" }
                    " {view.label}"
                }
            }

            if let Some(status) = status {
                div {
                    id: RegionId::Status.element_id(),
                    class: "status {status.tone.css_class()}",
                    "{status.text}"
                }
            }

            if let Some(account) = account {
                div {
                    id: RegionId::AccountInfo.element_id(),
                    class: "account-info",
                    title: "{account.address}",
                    span { class: "info-label", "Account" }
                    span { class: "info-value mono", "{account.short_address}" }
                }
            }

            if let Some(network) = network {
                div {
                    id: RegionId::NetworkInfo.element_id(),
                    class: "network-info",
                    span { class: "info-label", "Network" }
                    span { class: "info-value", "{network.name}" }
                    if network.is_testnet {
                        span { class: "testnet-badge", "Testnet" }
                    }
                }
            }
        }
    }
}

//! Buttons that make the demo wallet push provider events.
//!
//! Only drawn when the app runs against a demo wallet.

use dioxus::prelude::*;

use crate::demo_wallet::DemoWallet;
use crate::state::AppState;

#[component]
pub fn DemoControls(state: Signal<AppState>) -> Element {
    let Some(wallet) = try_use_context::<Option<DemoWallet>>().flatten() else {
        return rsx! {};
    };

    let state_read = state.read();
    if !state_read.snapshot.state.is_connected() {
        return rsx! {};
    }
    let account = state_read.snapshot.account.clone();
    let chain_id = state_read.snapshot.network.as_ref().map(|network| network.chain_id);

    let switch_account = {
        let wallet = wallet.clone();
        move |_: MouseEvent| wallet.switch_account(account.as_ref())
    };
    let switch_chain = {
        let wallet = wallet.clone();
        move |_: MouseEvent| wallet.switch_chain(chain_id)
    };
    let revoke = {
        let wallet = wallet.clone();
        move |_: MouseEvent| wallet.revoke()
    };
    let drop_connection = move |_: MouseEvent| wallet.drop_connection();

    rsx! {
        div {
            class: "demo-controls",
            span { class: "demo-label", "Demo wallet" }
            button { class: "demo-btn", onclick: switch_account, "Switch account" }
            button { class: "demo-btn", onclick: switch_chain, "Switch network" }
            button { class: "demo-btn", onclick: revoke, "Lock wallet" }
            button { class: "demo-btn", onclick: drop_connection, "Drop connection" }
        }
    }
}

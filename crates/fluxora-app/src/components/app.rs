//! Root application component for the quest board.

use dioxus::prelude::*;

use crate::state::AppState;
use crate::theme::{ThemeToggle, ThemedRoot};

use super::{DemoControls, QuestForm, QuestList, WalletPanel};

/// Root application component.
#[component]
pub fn App(state: Signal<AppState>) -> Element {
    rsx! {
        ThemedRoot {
            div {
                class: "container",

                Header {}

                WalletPanel { state }
                DemoControls { state }

                main {
                    class: "board",

                    QuestList { state }
                    QuestForm { state }
                }
            }
        }
    }
}

#[component]
fn Header() -> Element {
    rsx! {
        header {
            class: "header",
            div {
                class: "header-left",
                h1 { class: "header-title", "⚡ Fluxora" }
                span { class: "header-tagline", "Crypto Quest Board" }
            }
            ThemeToggle {}
        }
    }
}

//! Quest board listing.

use std::time::Instant;

use dioxus::prelude::*;
use fluxora_core::{ClaimOutcome, DisplayQuest, EMPTY_BOARD_MESSAGE, RegionId};

use crate::state::AppState;

/// The list of posted quests.
#[component]
pub fn QuestList(state: Signal<AppState>) -> Element {
    let state_read = state.read();
    let quests: Vec<DisplayQuest> = state_read.quests.to_display_list().collect();
    let open = state_read.quests.open_count();
    let claim_notice = state_read.claim_notice.as_ref().map(|notice| notice.message.clone());

    rsx! {
        section {
            id: RegionId::QuestList.element_id(),
            class: "quest-list",

            div {
                class: "panel-header",
                h2 { class: "panel-title", "Available Quests" }
                span { class: "panel-count", "{open} open" }
            }

            if let Some(message) = claim_notice {
                div { class: "claim-notice", "{message}" }
            }

            if quests.is_empty() {
                p { class: "quests-empty", "{EMPTY_BOARD_MESSAGE}" }
            } else {
                for quest in quests {
                    QuestCard { key: "{quest.id}", state, quest }
                }
            }
        }
    }
}

/// One quest. Title and description arrive HTML-escaped and are injected as
/// markup so entities render as text.
#[component]
fn QuestCard(mut state: Signal<AppState>, quest: DisplayQuest) -> Element {
    let id = quest.id;
    let card_class = if quest.claimable {
        "quest-card"
    } else {
        "quest-card quest-card-claimed"
    };

    rsx! {
        div {
            class: card_class,

            div {
                class: "quest-header",
                h3 { class: "quest-title", dangerous_inner_html: "{quest.title}" }
                span { class: "quest-status", "{quest.status.display_name()}" }
            }

            if let Some(description) = &quest.description {
                p { class: "quest-description", dangerous_inner_html: "{description}" }
            }

            div {
                class: "quest-footer",
                span { class: "quest-reward", "💰 {quest.reward}" }
                button {
                    class: "claim-btn",
                    disabled: !quest.claimable,
                    onclick: move |_| {
                        let outcome = state.write().claim(id, Instant::now());
                        match outcome {
                            ClaimOutcome::Claimed => {
                                let flash = state.read().form.timings().claim_flash;
                                spawn(async move {
                                    tokio::time::sleep(flash).await;
                                    state.write().expire_claim_notice(Instant::now());
                                });
                            }
                            ClaimOutcome::NotFound => {
                                tracing::warn!(%id, "Claimed quest vanished from the board");
                            }
                            ClaimOutcome::AlreadyClaimed => {}
                        }
                    },
                    "{quest.claim_label}"
                }
            }
        }
    }
}

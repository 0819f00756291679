//! Form for posting a new quest.

use std::time::Instant;

use dioxus::prelude::*;
use fluxora_core::{FeedbackKind, RegionId};

use crate::state::AppState;

#[component]
pub fn QuestForm(mut state: Signal<AppState>) -> Element {
    let state_read = state.read();
    let form = &state_read.form;
    let title = form.title().to_string();
    let description = form.description().to_string();
    let reward = form.reward().to_string();
    let submit_label = form.submit_label();
    let feedback = form.feedback().cloned();

    let on_submit = move |_: MouseEvent| {
        let now = Instant::now();
        let result = state.write().post_quest(now);
        let timings = state.read().form.timings();
        let flash = match result {
            Ok(_) => timings.success_flash,
            Err(_) => timings.error_flash,
        };
        spawn(async move {
            tokio::time::sleep(flash).await;
            state.write().form.expire_feedback(Instant::now());
        });
    };

    rsx! {
        section {
            id: RegionId::QuestForm.element_id(),
            class: "quest-form",

            h2 { class: "panel-title", "Post a Quest" }

            div {
                class: "form-field",
                label { r#for: "quest-title", "Title" }
                input {
                    id: "quest-title",
                    r#type: "text",
                    maxlength: 100,
                    placeholder: "What needs doing?",
                    value: "{title}",
                    oninput: move |e| state.write().form.set_title(e.value()),
                }
            }

            div {
                class: "form-field",
                label { r#for: "quest-description", "Description" }
                textarea {
                    id: "quest-description",
                    maxlength: 500,
                    placeholder: "Describe the task...",
                    value: "{description}",
                    oninput: move |e| state.write().form.set_description(e.value()),
                }
            }

            div {
                class: "form-field",
                label { r#for: "quest-reward", "Reward (ETH)" }
                input {
                    id: "quest-reward",
                    r#type: "number",
                    step: "0.001",
                    min: "0",
                    max: "10",
                    placeholder: "0.01",
                    value: "{reward}",
                    oninput: move |e| state.write().form.set_reward(e.value()),
                }
            }

            button {
                class: "submit-btn",
                onclick: on_submit,
                "{submit_label}"
            }

            if let Some(feedback) = feedback {
                div {
                    class: feedback_class(feedback.kind),
                    "{feedback.message}"
                }
            }
        }
    }
}

fn feedback_class(kind: FeedbackKind) -> &'static str {
    match kind {
        FeedbackKind::Success => "form-feedback success",
        FeedbackKind::Error => "form-feedback error",
    }
}

//! Posting and claiming quests through the form and a file-backed store.

use std::time::Instant;

use fluxora_core::{
    Account, ClaimOutcome, FeedbackKind, FileSlot, MemorySlot, QuestFormController, QuestInput,
    QuestSlot, QuestStatus, QuestStore, ValidationError,
};
use tempfile::TempDir;

fn creator() -> Account {
    Account::new("0x71C7656EC7ab88b098defB751B7401B5f6d8976F").unwrap()
}

#[test]
fn test_form_posts_into_store_and_survives_reload() {
    let dir = TempDir::new().unwrap();
    let mut store = QuestStore::open(FileSlot::in_dir(dir.path()));
    assert_eq!(store.len(), 4);

    let mut form = QuestFormController::default();
    form.set_title("Translate the docs");
    form.set_description("Spanish and Portuguese");
    form.set_reward("0.3");

    let account = creator();
    let mut posted = None;
    form.submit(Instant::now(), |quest| {
        posted = Some(store.add_quest(&quest.into(), Some(&account)).unwrap());
    })
    .unwrap();
    let id = posted.unwrap();
    assert_eq!(form.feedback().unwrap().kind, FeedbackKind::Success);

    let quest = store.get(id).unwrap();
    assert_eq!(quest.reward, 0.3);
    assert_eq!(quest.creator, account.to_string());
    assert_eq!(quest.status, QuestStatus::Open);

    assert_eq!(store.claim_quest(id), ClaimOutcome::Claimed);

    let reloaded = QuestStore::open(FileSlot::in_dir(dir.path()));
    assert_eq!(reloaded.quests(), store.quests());
    let display = reloaded.to_display_list().find(|quest| quest.id == id).unwrap();
    assert_eq!(display.claim_label, "Claimed ✓");
    assert!(!display.claimable);
    assert_eq!(display.reward, "0.3000 ETH");
}

#[test]
fn test_rejected_input_leaves_store_untouched() {
    let slot = MemorySlot::new();
    let mut store = QuestStore::open(slot.clone());
    let before = store.quests().to_vec();
    let revision = store.revision();

    for input in [
        QuestInput::new("", "desc", "1"),
        QuestInput::new("Title", "", "0"),
        QuestInput::new("Title", "", "eleven"),
        QuestInput::new("Title", "", "11"),
    ] {
        assert!(store.add_quest(&input, None).is_err());
    }

    assert_eq!(store.quests(), before.as_slice());
    assert_eq!(store.revision(), revision);
    assert_eq!(slot.contents(), None);
}

#[test]
fn test_claim_is_idempotent() {
    let mut store = QuestStore::in_memory();
    let id = store.quests()[0].id;

    assert_eq!(store.claim_quest(id), ClaimOutcome::Claimed);
    let revision = store.revision();
    assert_eq!(store.claim_quest(id), ClaimOutcome::AlreadyClaimed);
    assert_eq!(store.revision(), revision);
    assert_eq!(store.open_count(), 3);

    let unknown = QuestStore::in_memory().quests()[0].id;
    assert_eq!(store.claim_quest(unknown), ClaimOutcome::NotFound);
}

#[test]
fn test_anonymous_creator_and_stored_reward() {
    let mut store = QuestStore::in_memory();
    let id = store
        .add_quest(&QuestInput::new("  Audit  ", "", 0.0125), None)
        .unwrap();
    let quest = store.get(id).unwrap();
    assert_eq!(quest.title, "Audit");
    assert_eq!(quest.reward, 0.0125);
    assert_eq!(quest.creator, "anonymous");
    assert_eq!(store.len(), 5);
}

#[test]
fn test_corrupt_slot_falls_back_to_defaults() {
    let store = QuestStore::open(MemorySlot::with_contents("{not json"));
    assert_eq!(store.len(), 4);
    assert!(store.quests().iter().all(|quest| quest.status == QuestStatus::Open));
}

#[test]
fn test_stored_records_breaking_quest_rules_are_dropped_or_truncated() {
    let record = |title: &str, description: &str, reward: f64| {
        serde_json::json!({
            "id": uuid::Uuid::new_v4(),
            "title": title,
            "description": description,
            "reward": reward,
            "status": "open",
            "timestamp": "2024-01-01T00:00:00Z",
            "creator": "0x71C7656EC7ab88b098defB751B7401B5f6d8976F",
        })
    };
    let long_title = "t".repeat(150);
    let long_description = "d".repeat(700);
    let saved = serde_json::json!([
        record("Negative reward", "", -5.0),
        record("Huge reward", "", 5000.0),
        record("Zero reward", "", 0.0),
        record("   ", "blank title", 1.0),
        record(&long_title, &long_description, 10.0),
        record("Review a PR", "", 0.25),
    ]);

    let store = QuestStore::open(MemorySlot::with_contents(saved.to_string()));

    assert_eq!(store.len(), 2);
    assert!(
        store
            .quests()
            .iter()
            .all(|quest| quest.reward > 0.0 && quest.reward <= 10.0)
    );
    let long = &store.quests()[0];
    assert_eq!(long.title.chars().count(), 100);
    assert_eq!(long.description.chars().count(), 500);
    assert_eq!(store.quests()[1].title, "Review a PR");
}

#[test]
fn test_saved_list_is_json_under_quests_key() {
    let slot = MemorySlot::new();
    let mut store = QuestStore::open(slot.clone());
    store
        .add_quest(&QuestInput::new("Title", "", "2"), None)
        .unwrap();

    assert_eq!(slot.key(), "fluxora_quests");
    let saved: serde_json::Value = serde_json::from_str(&slot.contents().unwrap()).unwrap();
    let entries = saved.as_array().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[4]["status"], "open");
    assert_eq!(entries[4]["reward"], 2.0);
}

#[test]
fn test_validation_error_shown_in_form() {
    let mut form = QuestFormController::default();
    form.set_title("Title");
    let err = form.submit(Instant::now(), |_| {}).unwrap_err();
    assert_eq!(err, ValidationError::MissingReward);
    assert_eq!(form.feedback().unwrap().message, "❌ Please enter a reward amount");
}

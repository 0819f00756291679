//! Quest records and the quest store
//!
//! [`QuestStore`] owns the quest list. Records are only created through
//! [`QuestStore::add_quest`] and only change through
//! [`QuestStore::claim_quest`]; every mutation is mirrored to the
//! persistence slot and counted by the store's revision number.

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::address::Account;
use crate::error::{StorageError, ValidationError};
use crate::sanitize::escape_html;
use crate::storage::{MemorySlot, QuestSlot};

/// Titles longer than this are truncated.
pub const MAX_TITLE_CHARS: usize = 100;
/// Descriptions longer than this are truncated.
pub const MAX_DESCRIPTION_CHARS: usize = 500;
/// Largest accepted reward, in ETH.
pub const MAX_REWARD: f64 = 10.0;
/// Creator recorded when no wallet is connected.
pub const ANONYMOUS_CREATOR: &str = "anonymous";

/// Unique quest identifier.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestId(Uuid);

impl QuestId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Quest lifecycle. Only `Open -> Claimed` is possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestStatus {
    #[default]
    Open,
    Claimed,
}

impl QuestStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            QuestStatus::Open => "Open",
            QuestStatus::Claimed => "Claimed",
        }
    }
}

/// A bounty posted on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub id: QuestId,
    pub title: String,
    pub description: String,
    pub reward: f64,
    pub status: QuestStatus,
    pub timestamp: DateTime<Utc>,
    pub creator: String,
}

/// Reward as entered: a number, or raw text from an input field.
#[derive(Debug, Clone, PartialEq)]
pub enum RewardInput {
    Amount(f64),
    Text(String),
}

impl From<f64> for RewardInput {
    fn from(amount: f64) -> Self {
        RewardInput::Amount(amount)
    }
}

impl From<&str> for RewardInput {
    fn from(text: &str) -> Self {
        RewardInput::Text(text.to_string())
    }
}

impl From<String> for RewardInput {
    fn from(text: String) -> Self {
        RewardInput::Text(text)
    }
}

/// Unvalidated quest fields.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestInput {
    pub title: String,
    pub description: String,
    pub reward: RewardInput,
}

impl QuestInput {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        reward: impl Into<RewardInput>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            reward: reward.into(),
        }
    }
}

/// Validated and normalized quest fields.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuest {
    pub title: String,
    pub description: String,
    pub reward: f64,
}

impl From<NewQuest> for QuestInput {
    fn from(quest: NewQuest) -> Self {
        QuestInput::new(quest.title, quest.description, quest.reward)
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Validates quest input and normalizes it for storage.
///
/// Titles and descriptions are trimmed and truncated; the reward must be a
/// finite number in `(0, 10]`.
pub fn validate_quest(input: &QuestInput) -> Result<NewQuest, ValidationError> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    let reward = match &input.reward {
        RewardInput::Amount(amount) => *amount,
        RewardInput::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(ValidationError::MissingReward);
            }
            text.parse::<f64>()
                .map_err(|_| ValidationError::InvalidReward)?
        }
    };

    if !reward.is_finite() || reward <= 0.0 {
        return Err(ValidationError::InvalidReward);
    }
    if reward > MAX_REWARD {
        return Err(ValidationError::RewardTooLarge {
            max: MAX_REWARD as u32,
        });
    }

    Ok(NewQuest {
        title: truncate_chars(title, MAX_TITLE_CHARS),
        description: truncate_chars(input.description.trim(), MAX_DESCRIPTION_CHARS),
        reward,
    })
}

/// Result of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed,
    AlreadyClaimed,
    NotFound,
}

/// A quest prepared for rendering; text fields are HTML-escaped.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayQuest {
    pub id: QuestId,
    pub title: String,
    pub description: Option<String>,
    pub reward: String,
    pub status: QuestStatus,
    pub claim_label: &'static str,
    pub claimable: bool,
}

impl DisplayQuest {
    fn from_quest(quest: &Quest) -> Self {
        let title = if quest.title.trim().is_empty() {
            "Untitled Quest".to_string()
        } else {
            escape_html(&quest.title)
        };
        let description = (!quest.description.is_empty()).then(|| escape_html(&quest.description));
        let claimed = quest.status == QuestStatus::Claimed;

        Self {
            id: quest.id,
            title,
            description,
            reward: format!("{:.4} ETH", quest.reward),
            status: quest.status,
            claim_label: if claimed { "Claimed ✓" } else { "Claim Quest" },
            claimable: !claimed,
        }
    }
}

/// Message shown when the board is empty.
pub const EMPTY_BOARD_MESSAGE: &str =
    "No quests available yet. Connect your wallet to post new quests!";

fn default_quests() -> Vec<Quest> {
    let now = Utc::now();
    [
        (
            "📣 Share Fluxora on 3 Telegram Groups",
            "Help us grow by sharing Fluxora in active crypto groups.",
            0.01,
        ),
        (
            "📝 Write a Blog Post About Fluxora",
            "Write and publish a blog post explaining Fluxora's features.",
            0.02,
        ),
        (
            "🐞 Report a Bug",
            "Found a bug or issue? Report it and help improve the dApp.",
            0.005,
        ),
        (
            "🎥 Make a YouTube Short",
            "Create a short 30s YouTube video about how Fluxora works.",
            0.015,
        ),
    ]
    .into_iter()
    .map(|(title, description, reward)| Quest {
        id: QuestId::generate(),
        title: title.to_string(),
        description: description.to_string(),
        reward,
        status: QuestStatus::Open,
        timestamp: now,
        creator: "fluxora".to_string(),
    })
    .collect()
}

/// The quest board.
pub struct QuestStore {
    quests: Vec<Quest>,
    slot: Box<dyn QuestSlot>,
    revision: u64,
}

impl QuestStore {
    /// Opens the store, seeding it from the slot.
    ///
    /// A missing or unreadable slot falls back to the built-in quests.
    /// Stored records that break the quest rules are truncated or dropped.
    pub fn open(slot: impl QuestSlot + 'static) -> Self {
        let quests = match slot.load() {
            Ok(Some(contents)) => match serde_json::from_str::<Vec<Quest>>(&contents) {
                Ok(quests) => {
                    debug!(count = quests.len(), key = slot.key(), "Loaded quests");
                    normalize_loaded(dedup_by_id(quests))
                }
                Err(err) => {
                    let err = StorageError::deserialization(err.to_string());
                    warn!(%err, "Stored quests are corrupt, using defaults");
                    default_quests()
                }
            },
            Ok(None) => default_quests(),
            Err(err) => {
                warn!(%err, "Could not read stored quests, using defaults");
                default_quests()
            }
        };

        Self {
            quests,
            slot: Box::new(slot),
            revision: 0,
        }
    }

    /// Opens a store backed by a fresh in-memory slot.
    pub fn in_memory() -> Self {
        Self::open(MemorySlot::new())
    }

    /// Returns all quests in insertion order.
    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    /// Looks a quest up by id.
    pub fn get(&self, id: QuestId) -> Option<&Quest> {
        self.quests.iter().find(|quest| quest.id == id)
    }

    /// Returns the number of open quests.
    pub fn open_count(&self) -> usize {
        self.quests
            .iter()
            .filter(|quest| quest.status == QuestStatus::Open)
            .count()
    }

    /// Returns the current revision; it advances on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Validates `input` and appends a new open quest.
    ///
    /// On failure the store is left untouched.
    pub fn add_quest(
        &mut self,
        input: &QuestInput,
        creator: Option<&Account>,
    ) -> Result<QuestId, ValidationError> {
        let quest = validate_quest(input)?;

        let id = loop {
            let candidate = QuestId::generate();
            if self.get(candidate).is_none() {
                break candidate;
            }
        };

        let creator = creator
            .map(|account| account.to_string())
            .unwrap_or_else(|| ANONYMOUS_CREATOR.to_string());

        info!(%id, title = %quest.title, reward = quest.reward, "New quest added");
        self.quests.push(Quest {
            id,
            title: quest.title,
            description: quest.description,
            reward: quest.reward,
            status: QuestStatus::Open,
            timestamp: Utc::now(),
            creator,
        });
        self.commit();
        Ok(id)
    }

    /// Marks a quest as claimed. Unknown ids are ignored.
    pub fn claim_quest(&mut self, id: QuestId) -> ClaimOutcome {
        let Some(quest) = self.quests.iter_mut().find(|quest| quest.id == id) else {
            debug!(%id, "Claim for unknown quest ignored");
            return ClaimOutcome::NotFound;
        };

        if quest.status == QuestStatus::Claimed {
            return ClaimOutcome::AlreadyClaimed;
        }
        quest.status = QuestStatus::Claimed;
        info!(%id, title = %quest.title, "Quest claimed");
        self.commit();
        ClaimOutcome::Claimed
    }

    /// Sanitized records for rendering.
    ///
    /// The iterator is lazy and can be cloned to start over.
    pub fn to_display_list(&self) -> impl Iterator<Item = DisplayQuest> + Clone + '_ {
        self.quests.iter().map(DisplayQuest::from_quest)
    }

    fn commit(&mut self) {
        self.persist();
        self.revision += 1;
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.quests)
            .map_err(|err| StorageError::serialization(err.to_string()))
            .and_then(|json| self.slot.save(&json));
        if let Err(err) = result {
            warn!(%err, "Could not save quests");
        }
    }
}

/// Applies the quest rules to records read back from a slot.
fn normalize_loaded(quests: Vec<Quest>) -> Vec<Quest> {
    let before = quests.len();
    let valid: Vec<Quest> = quests
        .into_iter()
        .filter(|quest| {
            !quest.title.trim().is_empty()
                && quest.reward.is_finite()
                && quest.reward > 0.0
                && quest.reward <= MAX_REWARD
        })
        .map(|mut quest| {
            quest.title = truncate_chars(&quest.title, MAX_TITLE_CHARS);
            quest.description = truncate_chars(&quest.description, MAX_DESCRIPTION_CHARS);
            quest
        })
        .collect();
    if valid.len() != before {
        warn!(dropped = before - valid.len(), "Dropped stored quests that break the quest rules");
    }
    valid
}

fn dedup_by_id(quests: Vec<Quest>) -> Vec<Quest> {
    let mut seen = std::collections::HashSet::new();
    let before = quests.len();
    let unique: Vec<Quest> = quests
        .into_iter()
        .filter(|quest| seen.insert(quest.id))
        .collect();
    if unique.len() != before {
        warn!(dropped = before - unique.len(), "Dropped quests with duplicate ids");
    }
    unique
}

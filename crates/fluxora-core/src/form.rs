//! Quest form controller
//!
//! Holds the raw text of the three form fields, validates on submit and
//! keeps a short-lived feedback message. Expiry is driven by the caller's
//! clock so the controller stays synchronous.

use std::time::Instant;

use tracing::debug;

use crate::config::FormTimings;
use crate::error::ValidationError;
use crate::quest::{NewQuest, QuestInput, validate_quest};

/// Label of the submit control.
pub const SUBMIT_LABEL: &str = "Post Quest";
/// Feedback shown after a successful submit.
pub const SUCCESS_MESSAGE: &str = "✅ Quest Posted!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Error,
}

/// Transient message shown next to the submit control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFeedback {
    pub kind: FeedbackKind,
    pub message: String,
    pub expires_at: Instant,
}

impl FormFeedback {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// State behind the "post a quest" form.
#[derive(Debug, Clone, Default)]
pub struct QuestFormController {
    title: String,
    description: String,
    reward: String,
    feedback: Option<FormFeedback>,
    timings: FormTimings,
}

impl QuestFormController {
    pub fn new(timings: FormTimings) -> Self {
        Self {
            timings,
            ..Self::default()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn reward(&self) -> &str {
        &self.reward
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_reward(&mut self, reward: impl Into<String>) {
        self.reward = reward.into();
    }

    pub fn timings(&self) -> FormTimings {
        self.timings
    }

    pub fn submit_label(&self) -> &'static str {
        SUBMIT_LABEL
    }

    /// Current feedback, if any. Call [`expire_feedback`](Self::expire_feedback)
    /// to drop it once its time is up.
    pub fn feedback(&self) -> Option<&FormFeedback> {
        self.feedback.as_ref()
    }

    /// Validates the fields and hands the result to `on_submit`.
    ///
    /// On success the fields are cleared and a success message is shown; on
    /// failure the fields are kept and the validation message is shown.
    pub fn submit(
        &mut self,
        now: Instant,
        on_submit: impl FnOnce(NewQuest),
    ) -> Result<(), ValidationError> {
        let input = QuestInput::new(
            self.title.as_str(),
            self.description.as_str(),
            self.reward.as_str(),
        );

        match validate_quest(&input) {
            Ok(quest) => {
                on_submit(quest);
                self.title.clear();
                self.description.clear();
                self.reward.clear();
                self.feedback = Some(FormFeedback {
                    kind: FeedbackKind::Success,
                    message: SUCCESS_MESSAGE.to_string(),
                    expires_at: now + self.timings.success_flash,
                });
                Ok(())
            }
            Err(err) => {
                debug!(%err, "Quest form rejected");
                self.feedback = Some(FormFeedback {
                    kind: FeedbackKind::Error,
                    message: format!("❌ {err}"),
                    expires_at: now + self.timings.error_flash,
                });
                Err(err)
            }
        }
    }

    /// Clears feedback whose time is up. Returns true if something changed.
    pub fn expire_feedback(&mut self, now: Instant) -> bool {
        if self
            .feedback
            .as_ref()
            .is_some_and(|feedback| feedback.is_expired(now))
        {
            self.feedback = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_submit_success_clears_fields() {
        let mut form = QuestFormController::default();
        form.set_title("  Translate docs ");
        form.set_description("Into Spanish");
        form.set_reward("0.25");

        let now = Instant::now();
        let mut submitted = None;
        form.submit(now, |quest| submitted = Some(quest)).unwrap();

        let quest = submitted.unwrap();
        assert_eq!(quest.title, "Translate docs");
        assert_eq!(quest.reward, 0.25);
        assert_eq!(form.title(), "");
        assert_eq!(form.reward(), "");

        let feedback = form.feedback().unwrap();
        assert_eq!(feedback.kind, FeedbackKind::Success);
        assert_eq!(feedback.message, "✅ Quest Posted!");
        assert_eq!(feedback.expires_at, now + Duration::from_secs(2));
    }

    #[test]
    fn test_submit_error_keeps_fields() {
        let mut form = QuestFormController::default();
        form.set_title("Bounty");
        form.set_reward("12");

        let now = Instant::now();
        let err = form
            .submit(now, |_| panic!("invalid quest submitted"))
            .unwrap_err();
        assert_eq!(err, ValidationError::RewardTooLarge { max: 10 });
        assert_eq!(form.title(), "Bounty");
        assert_eq!(form.reward(), "12");

        let feedback = form.feedback().unwrap();
        assert_eq!(feedback.kind, FeedbackKind::Error);
        assert_eq!(feedback.message, "❌ Reward amount cannot exceed 10 ETH");
        assert_eq!(feedback.expires_at, now + Duration::from_secs(3));
    }

    #[test]
    fn test_feedback_expiry() {
        let mut form = QuestFormController::default();
        let now = Instant::now();
        let _ = form.submit(now, |_| {});

        assert!(!form.expire_feedback(now + Duration::from_secs(1)));
        assert!(form.feedback().is_some());
        assert!(form.expire_feedback(now + Duration::from_secs(3)));
        assert!(form.feedback().is_none());
        assert!(!form.expire_feedback(now + Duration::from_secs(10)));
    }
}

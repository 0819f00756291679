//! Main application state for the quest board.

use std::time::Instant;

use fluxora_core::{
    AccountPanel, ButtonView, ClaimOutcome, ConnectionPresenter, FormTimings, NetworkPanel,
    PlatformHint, QuestFormController, QuestId, QuestStore, RegionContent, RegionId, RegionMap,
    SessionSnapshot, StatusLine, ValidationError,
};

/// Confirmation shown after a quest is claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimNotice {
    pub message: String,
    pub expires_at: Instant,
}

impl ClaimNotice {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Everything the components read.
pub struct AppState {
    pub platform: PlatformHint,
    pub presenter: ConnectionPresenter,
    pub regions: RegionMap,
    pub snapshot: SessionSnapshot,
    pub quests: QuestStore,
    pub form: QuestFormController,
    pub claim_notice: Option<ClaimNotice>,
}

impl AppState {
    pub fn new(platform: PlatformHint, quests: QuestStore, timings: FormTimings) -> Self {
        let mut state = Self {
            platform,
            presenter: ConnectionPresenter::new(platform),
            regions: RegionMap::all(),
            snapshot: SessionSnapshot::default(),
            quests,
            form: QuestFormController::new(timings),
            claim_notice: None,
        };
        state.apply_snapshot(SessionSnapshot::default());
        state
    }

    /// Stores a session snapshot and re-renders the wallet regions.
    pub fn apply_snapshot(&mut self, snapshot: SessionSnapshot) -> usize {
        self.snapshot = snapshot;
        self.presenter.render(&self.snapshot, &mut self.regions)
    }

    pub fn button(&self) -> Option<&ButtonView> {
        match self.regions.get(RegionId::ConnectButton) {
            Some(RegionContent::Button(button)) => Some(button),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<&StatusLine> {
        match self.regions.get(RegionId::Status) {
            Some(RegionContent::Status(status)) => Some(status),
            _ => None,
        }
    }

    pub fn account_panel(&self) -> Option<&AccountPanel> {
        match self.regions.get(RegionId::AccountInfo) {
            Some(RegionContent::Account(account)) => Some(account),
            _ => None,
        }
    }

    pub fn network_panel(&self) -> Option<&NetworkPanel> {
        match self.regions.get(RegionId::NetworkInfo) {
            Some(RegionContent::Network(network)) => Some(network),
            _ => None,
        }
    }

    /// Submits the quest form into the store.
    ///
    /// The connected account, if any, is recorded as the creator.
    pub fn post_quest(&mut self, now: Instant) -> Result<Option<QuestId>, ValidationError> {
        let creator = self.snapshot.account.clone();
        let quests = &mut self.quests;
        let mut posted = None;
        self.form.submit(now, |quest| {
            posted = Some(quests.add_quest(&quest.into(), creator.as_ref()));
        })?;
        posted.transpose()
    }

    /// Claims a quest and, on success, raises a notice naming it.
    pub fn claim(&mut self, id: QuestId, now: Instant) -> ClaimOutcome {
        let outcome = self.quests.claim_quest(id);
        if outcome == ClaimOutcome::Claimed {
            if let Some(quest) = self.quests.get(id) {
                self.claim_notice = Some(ClaimNotice {
                    message: format!("✅ Quest \"{}\" claimed successfully!", quest.title),
                    expires_at: now + self.form.timings().claim_flash,
                });
            }
        }
        outcome
    }

    /// Drops the claim notice once it is due. Returns whether it was cleared.
    pub fn expire_claim_notice(&mut self, now: Instant) -> bool {
        if self
            .claim_notice
            .as_ref()
            .is_some_and(|notice| notice.is_expired(now))
        {
            self.claim_notice = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use fluxora_core::{Account, ConnectionState, QuestStore};

    use super::*;

    fn state() -> AppState {
        AppState::new(PlatformHint::Desktop, QuestStore::in_memory(), FormTimings::default())
    }

    #[test]
    fn test_initial_regions() {
        let state = state();
        assert_eq!(state.button().unwrap().label, "Connect Wallet");
        assert_eq!(state.status().unwrap().text, "Ready to connect your wallet");
        assert!(state.account_panel().is_none());
    }

    #[test]
    fn test_connected_snapshot_fills_account_region() {
        let mut state = state();
        let account = Account::new("0x71C7656EC7ab88b098defB751B7401B5f6d8976F").unwrap();
        let written = state.apply_snapshot(SessionSnapshot {
            state: ConnectionState::Connected,
            account: Some(account),
            ..SessionSnapshot::default()
        });
        assert_eq!(written, 4);
        assert_eq!(state.account_panel().unwrap().short_address, "0x71C7...976F");
        assert_eq!(state.button().unwrap().label, "Disconnect Wallet");
    }

    #[test]
    fn test_post_quest_records_creator() {
        let mut state = state();
        let account = Account::new("0x71C7656EC7ab88b098defB751B7401B5f6d8976F").unwrap();
        state.apply_snapshot(SessionSnapshot {
            state: ConnectionState::Connected,
            account: Some(account.clone()),
            ..SessionSnapshot::default()
        });

        state.form.set_title("Design a logo");
        state.form.set_reward("0.2");
        let id = state.post_quest(Instant::now()).unwrap().unwrap();
        assert_eq!(state.quests.get(id).unwrap().creator, account.to_string());
        assert_eq!(state.claim(id, Instant::now()), ClaimOutcome::Claimed);
    }

    #[test]
    fn test_claim_raises_notice_until_expiry() {
        let mut state = state();
        let quest = state.quests.quests()[0].clone();
        let now = Instant::now();

        assert_eq!(state.claim(quest.id, now), ClaimOutcome::Claimed);
        let notice = state.claim_notice.clone().unwrap();
        assert_eq!(
            notice.message,
            format!("✅ Quest \"{}\" claimed successfully!", quest.title)
        );
        assert_eq!(notice.expires_at, now + Duration::from_secs(3));

        assert!(!state.expire_claim_notice(now + Duration::from_millis(2999)));
        assert!(state.claim_notice.is_some());
        assert!(state.expire_claim_notice(now + Duration::from_secs(3)));
        assert!(state.claim_notice.is_none());
    }

    #[test]
    fn test_repeat_or_unknown_claim_keeps_board_quiet() {
        let mut state = state();
        let id = state.quests.quests()[0].id;
        let now = Instant::now();
        state.claim(id, now);
        state.expire_claim_notice(now + Duration::from_secs(3));

        assert_eq!(state.claim(id, now), ClaimOutcome::AlreadyClaimed);
        assert!(state.claim_notice.is_none());

        let unknown = QuestStore::in_memory().quests()[0].id;
        assert_eq!(state.claim(unknown, now), ClaimOutcome::NotFound);
        assert!(state.claim_notice.is_none());
    }

    #[test]
    fn test_post_quest_rejects_bad_reward() {
        let mut state = state();
        state.form.set_title("Design a logo");
        state.form.set_reward("-1");
        assert_eq!(
            state.post_quest(Instant::now()),
            Err(ValidationError::InvalidReward)
        );
        assert_eq!(state.quests.len(), 4);
    }
}

// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Study sessions.
//!
//! A [`SessionContext`] is owned by whatever drives a learner's session and
//! passed around explicitly. Only its settings are persisted; the review
//! and focus sessions inside it are discarded on reload.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::db::ProgressStore;
use crate::error::ErrorReport;
use crate::focus::timer::FocusSession;
use crate::prioritize::select_session;
use crate::progression::Tier;
use crate::progression::TierStatus;
use crate::progression::tier_advanced;
use crate::progression::tier_for_xp;
use crate::scheduler::DifficultyPreference;
use crate::scheduler::Schedule;
use crate::settings::Settings;
use crate::types::card::Card;
use crate::types::session_record::SessionKind;
use crate::types::session_record::SessionOutcome;
use crate::types::session_record::SessionRecord;
use crate::types::timestamp::Timestamp;

/// A bounded run through the most urgent cards.
#[derive(Clone, Debug)]
pub struct ReviewSession {
    cards: Vec<Card>,
    position: usize,
    correct: u32,
    incorrect: u32,
    started_at: Timestamp,
}

/// A card after it was answered, ready to be written back.
#[derive(Clone, Debug)]
pub struct AnsweredCard {
    pub card: Card,
    pub schedule: Schedule,
}

impl ReviewSession {
    /// Pick the first `cap` cards of `pool` by priority.
    pub fn new(pool: Vec<Card>, now: Timestamp, cap: usize) -> Self {
        let cards = select_session(pool, now, cap);
        log::debug!("Review session with {} cards.", cards.len());
        Self {
            cards,
            position: 0,
            correct: 0,
            incorrect: 0,
            started_at: now,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn current(&self) -> Option<&Card> {
        self.cards.get(self.position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.cards.len()
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    /// Answer the current card and move to the next. `None` if the session
    /// is already finished.
    pub fn answer(
        &mut self,
        correct: bool,
        preference: DifficultyPreference,
        now: Timestamp,
    ) -> Option<AnsweredCard> {
        let card = self.cards.get_mut(self.position)?;
        let schedule = card.answer(correct, preference, now);
        log::debug!(
            "{} {} D={} next in {}d",
            card.id,
            if correct { "correct" } else { "incorrect" },
            schedule.new_difficulty,
            schedule.next_interval_days
        );
        let answered = AnsweredCard {
            card: card.clone(),
            schedule,
        };
        if correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
        self.position += 1;
        Some(answered)
    }

    /// The outcome of the session. Only a finished session is scored.
    pub fn outcome(&self, now: Timestamp) -> SessionOutcome {
        let minutes = now.seconds_since(self.started_at).max(0) / 60;
        SessionOutcome {
            kind: SessionKind::Cards,
            duration_minutes: u32::try_from(minutes).unwrap_or(u32::MAX),
            cards_studied: self.correct + self.incorrect,
            correct_cards: self.correct,
            focus_interrupted: false,
        }
    }
}

/// The state of one learner's study sessions.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "Settings", into = "Settings")]
pub struct SessionContext {
    settings: Settings,
    focus: FocusSession,
    review: Option<ReviewSession>,
}

impl From<Settings> for SessionContext {
    fn from(settings: Settings) -> Self {
        let focus = FocusSession::new(settings.focus_duration().unwrap_or_default());
        Self {
            settings,
            focus,
            review: None,
        }
    }
}

impl From<SessionContext> for Settings {
    fn from(context: SessionContext) -> Self {
        context.settings
    }
}

impl SessionContext {
    pub fn new(settings: Settings) -> Self {
        Self::from(settings)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn focus(&self) -> &FocusSession {
        &self.focus
    }

    pub fn focus_mut(&mut self) -> &mut FocusSession {
        &mut self.focus
    }

    /// Start a review session over `pool`, replacing any current one.
    pub fn start_review(
        &mut self,
        pool: Vec<Card>,
        now: Timestamp,
        single_deck: bool,
    ) -> &mut ReviewSession {
        let cap = self.settings.session_cap(single_deck);
        self.review.insert(ReviewSession::new(pool, now, cap))
    }

    pub fn review(&self) -> Option<&ReviewSession> {
        self.review.as_ref()
    }

    pub fn review_mut(&mut self) -> Option<&mut ReviewSession> {
        self.review.as_mut()
    }

    /// End the review session, returning it.
    pub fn take_review(&mut self) -> Option<ReviewSession> {
        self.review.take()
    }

    /// Discard the review and focus sessions. Stored cards are untouched.
    pub fn reset(&mut self) {
        self.review = None;
        self.focus.reset();
    }
}

/// A session that was recorded and scored.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub record: SessionRecord,
    pub total_xp: u64,
    pub tier: TierStatus,
    /// Set if this session's XP unlocked a new tier.
    pub level_up: Option<Tier>,
}

#[derive(Debug)]
pub enum CompletionError {
    /// The session could not be stored. No XP was added.
    SessionNotRecorded(ErrorReport),
    /// The session was stored, but its XP was not added to the total.
    XpNotRecorded { xp: u64, source: ErrorReport },
}

impl Display for CompletionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionError::SessionNotRecorded(e) => {
                write!(f, "session not recorded: {}", e.message())
            }
            CompletionError::XpNotRecorded { xp, source } => {
                write!(f, "{xp} XP not recorded: {}", source.message())
            }
        }
    }
}

impl Error for CompletionError {}

impl From<CompletionError> for ErrorReport {
    fn from(value: CompletionError) -> Self {
        ErrorReport::new(value.to_string())
    }
}

/// Store a finished session and add its XP to the user's total.
///
/// This is the only way XP is awarded.
pub fn complete_session(
    store: &impl ProgressStore,
    user_id: &str,
    outcome: &SessionOutcome,
    now: Timestamp,
) -> Result<Completion, CompletionError> {
    let record = SessionRecord::from_outcome(outcome, now);
    let xp = record.xp_earned;
    store
        .record_session(user_id, &record)
        .map_err(CompletionError::SessionNotRecorded)?;
    let total_xp = store
        .add_xp(user_id, xp)
        .map_err(|source| CompletionError::XpNotRecorded { xp, source })?;
    let level_up = tier_advanced(total_xp.saturating_sub(xp), total_xp);
    if let Some(tier) = level_up {
        log::info!("Reached level {}: {}.", tier.level, tier.name);
    }
    Ok(Completion {
        record,
        total_xp,
        tier: tier_for_xp(total_xp),
        level_up,
    })
}

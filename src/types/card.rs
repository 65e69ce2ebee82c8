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

use serde::Deserialize;
use serde::Serialize;

use crate::scheduler::DifficultyPreference;
use crate::scheduler::ReviewOutcome;
use crate::scheduler::Schedule;
use crate::scheduler::compute_next_review;
use crate::types::card_id::CardId;
use crate::types::difficulty::Difficulty;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    /// The name of the deck this card belongs to.
    pub deck_name: String,
    pub question: String,
    pub answer: String,
    pub review: ReviewState,
}

/// The part of a card the scheduler reads and writes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    pub difficulty: Difficulty,
    /// The card is due once this moment has passed.
    pub next_review: Timestamp,
    /// Absent if the card has never been reviewed.
    pub last_reviewed: Option<Timestamp>,
    pub correct_count: u32,
    pub incorrect_count: u32,
}

impl ReviewState {
    /// A card that has never been reviewed: easiest difficulty, due at
    /// `created_at`.
    pub fn new(created_at: Timestamp) -> Self {
        Self {
            difficulty: Difficulty::easiest(),
            next_review: created_at,
            last_reviewed: None,
            correct_count: 0,
            incorrect_count: 0,
        }
    }

    pub fn is_due(&self, now: Timestamp) -> bool {
        now >= self.next_review
    }

    /// Answered correctly more often than not.
    pub fn is_mastered(&self) -> bool {
        self.correct_count > self.incorrect_count
    }

    /// The interval the card was last scheduled on, in days: the time since
    /// its last review rounded up, or 1 for a card never reviewed.
    pub fn previous_interval_days(&self, now: Timestamp) -> u32 {
        match self.last_reviewed {
            None => 1,
            Some(last) => {
                let days = now.ceil_days_since(last).max(1);
                u32::try_from(days).unwrap_or(u32::MAX)
            }
        }
    }
}

impl Card {
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.review.is_due(now)
    }

    /// Record an answer given at `now`, rescheduling the card.
    pub fn answer(
        &mut self,
        correct: bool,
        preference: DifficultyPreference,
        now: Timestamp,
    ) -> Schedule {
        let outcome = ReviewOutcome {
            correct,
            difficulty: self.review.difficulty,
        };
        let previous = self.review.previous_interval_days(now);
        let schedule = compute_next_review(outcome, previous, preference.multiplier(), now);
        self.review.difficulty = schedule.new_difficulty;
        self.review.next_review = schedule.next_review;
        self.review.last_reviewed = Some(now);
        if correct {
            self.review.correct_count += 1;
        } else {
            self.review.incorrect_count += 1;
        }
        schedule
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;

    fn at(day: u32) -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 5, day, 12, 0, 0).unwrap())
    }

    fn card(created_at: Timestamp) -> Card {
        Card {
            id: CardId::new(1),
            deck_name: "Biology".to_string(),
            question: "What is the powerhouse of the cell?".to_string(),
            answer: "The mitochondria".to_string(),
            review: ReviewState::new(created_at),
        }
    }

    #[test]
    fn test_new_card_is_due() {
        let card = card(at(1));
        assert!(card.is_due(at(1)));
        assert_eq!(card.review.previous_interval_days(at(3)), 1);
    }

    #[test]
    fn test_previous_interval_rounds_up() {
        let mut state = ReviewState::new(at(1));
        state.last_reviewed = Some(at(1));
        assert_eq!(state.previous_interval_days(at(1)), 1);
        assert_eq!(state.previous_interval_days(at(7)), 6);
        assert_eq!(state.previous_interval_days(at(7).plus_seconds(60)), 7);
    }

    #[test]
    fn test_mastery() {
        let mut card = card(at(1));
        assert!(!card.review.is_mastered());
        card.answer(true, DifficultyPreference::Medium, at(1));
        assert!(card.review.is_mastered());
        card.answer(false, DifficultyPreference::Medium, at(7));
        assert!(!card.review.is_mastered());
    }

    #[test]
    fn test_answer_updates_state() {
        let mut card = card(at(1));
        let schedule = card.answer(true, DifficultyPreference::Medium, at(2));
        assert_eq!(schedule.next_interval_days, 6);
        assert_eq!(card.review.next_review, at(8));
        assert_eq!(card.review.last_reviewed, Some(at(2)));
        assert_eq!(card.review.correct_count, 1);
        assert!(!card.is_due(at(7)));

        let schedule = card.answer(false, DifficultyPreference::Medium, at(8));
        assert_eq!(schedule.next_interval_days, 1);
        assert_eq!(card.review.difficulty.value(), 1.5);
        assert_eq!(card.review.incorrect_count, 1);
        assert_eq!(card.review.correct_count, 1);
    }
}

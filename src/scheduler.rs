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

//! Review scheduling.
//!
//! A simplified SM-2: a correct answer grows the interval (6 days after the
//! first success, then by a factor of 2.5) and eases the card slightly; an
//! incorrect answer resets the interval to one day and makes the card harder.

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use serde::Deserialize;
use serde::Serialize;

use crate::types::difficulty::Difficulty;
use crate::types::timestamp::Timestamp;

pub const MIN_INTERVAL_DAYS: u32 = 1;

pub const MAX_INTERVAL_DAYS: u32 = 180;

/// Interval after the first correct answer.
const FIRST_SUCCESS_INTERVAL_DAYS: u32 = 6;

const GROWTH_FACTOR: f64 = 2.5;

const CORRECT_DIFFICULTY_STEP: f64 = 0.1;

const INCORRECT_DIFFICULTY_STEP: f64 = 0.5;

/// The result of answering a card once.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ReviewOutcome {
    pub correct: bool,
    /// The card's difficulty before this review.
    pub difficulty: Difficulty,
}

#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub next_interval_days: u32,
    pub next_review: Timestamp,
    pub new_difficulty: Difficulty,
}

/// The user's preferred pace. Scales the growth of intervals after correct
/// answers; never affects the reset after an incorrect one.
#[derive(ValueEnum, Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyPreference {
    /// Longer gaps between reviews.
    Easy,
    /// Standard intervals.
    #[default]
    Medium,
    /// Shorter gaps between reviews.
    Hard,
}

impl DifficultyPreference {
    pub fn multiplier(self) -> f64 {
        match self {
            DifficultyPreference::Easy => 1.5,
            DifficultyPreference::Medium => 1.0,
            DifficultyPreference::Hard => 0.7,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyPreference::Easy => "easy",
            DifficultyPreference::Medium => "medium",
            DifficultyPreference::Hard => "hard",
        }
    }
}

impl Display for DifficultyPreference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compute when a card is next due, and its new difficulty.
///
/// `previous_interval_days` is expected to be at least 1. The returned
/// interval is always within [`MIN_INTERVAL_DAYS`, `MAX_INTERVAL_DAYS`] and
/// the returned review date is `now` plus that many days.
pub fn compute_next_review(
    outcome: ReviewOutcome,
    previous_interval_days: u32,
    difficulty_multiplier: f64,
    now: Timestamp,
) -> Schedule {
    let (interval, new_difficulty) = if outcome.correct {
        let grown = if previous_interval_days <= 1 {
            f64::from(FIRST_SUCCESS_INTERVAL_DAYS)
        } else {
            (f64::from(previous_interval_days) * GROWTH_FACTOR).ceil()
        };
        let scaled = (grown * difficulty_multiplier).ceil();
        (
            clamp_interval(scaled),
            outcome.difficulty.eased(CORRECT_DIFFICULTY_STEP),
        )
    } else {
        (
            MIN_INTERVAL_DAYS,
            outcome.difficulty.hardened(INCORRECT_DIFFICULTY_STEP),
        )
    };
    Schedule {
        next_interval_days: interval,
        next_review: now.plus_days(i64::from(interval)),
        new_difficulty,
    }
}

fn clamp_interval(days: f64) -> u32 {
    if days.is_nan() {
        return MIN_INTERVAL_DAYS;
    }
    days.clamp(f64::from(MIN_INTERVAL_DAYS), f64::from(MAX_INTERVAL_DAYS)) as u32
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;

    fn now() -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 1, 10, 18, 30, 0).unwrap())
    }

    fn outcome(correct: bool, difficulty: f64) -> ReviewOutcome {
        ReviewOutcome {
            correct,
            difficulty: Difficulty::new(difficulty),
        }
    }

    #[test]
    fn test_first_correct_answer() {
        let s = compute_next_review(outcome(true, 1.0), 1, 1.0, now());
        assert_eq!(s.next_interval_days, 6);
        assert_eq!(s.new_difficulty.value(), 1.0);
        assert_eq!(s.next_review, now().plus_days(6));
    }

    #[test]
    fn test_then_incorrect() {
        let s = compute_next_review(outcome(true, 1.0), 1, 1.0, now());
        let s = compute_next_review(outcome(false, s.new_difficulty.value()), 6, 1.0, now());
        assert_eq!(s.next_interval_days, 1);
        assert_eq!(s.new_difficulty.value(), 1.5);
        assert_eq!(s.next_review, now().plus_days(1));
    }

    #[test]
    fn test_growth() {
        assert_eq!(
            compute_next_review(outcome(true, 3.0), 6, 1.0, now()).next_interval_days,
            15
        );
        assert_eq!(
            compute_next_review(outcome(true, 3.0), 15, 1.0, now()).next_interval_days,
            38
        );
        // ceil(ceil(6 * 2.5) * 0.7) = ceil(10.5) = 11
        assert_eq!(
            compute_next_review(outcome(true, 3.0), 6, 0.7, now()).next_interval_days,
            11
        );
        // First success with the easy preference: ceil(6 * 1.5) = 9.
        assert_eq!(
            compute_next_review(outcome(true, 3.0), 1, 1.5, now()).next_interval_days,
            9
        );
    }

    #[test]
    fn test_interval_capped() {
        let s = compute_next_review(outcome(true, 2.0), 100, 1.5, now());
        assert_eq!(s.next_interval_days, MAX_INTERVAL_DAYS);
        assert_eq!(s.next_review, now().plus_days(180));
    }

    #[test]
    fn test_correct_interval_always_in_range() {
        for previous in 1..=400 {
            for multiplier in [0.0, 0.3, 0.7, 1.0, 1.5, 3.0] {
                for difficulty in [1.0, 2.2, 5.0] {
                    let s =
                        compute_next_review(outcome(true, difficulty), previous, multiplier, now());
                    assert!((1..=180).contains(&s.next_interval_days));
                    assert!((1.0..=5.0).contains(&s.new_difficulty.value()));
                    assert!(s.next_review > now());
                }
            }
        }
    }

    #[test]
    fn test_incorrect_ignores_multiplier() {
        for previous in [1, 2, 6, 90, 180] {
            for multiplier in [0.7, 1.0, 1.5, 10.0] {
                let s = compute_next_review(outcome(false, 2.0), previous, multiplier, now());
                assert_eq!(s.next_interval_days, 1);
                assert_eq!(s.new_difficulty.value(), 2.5);
            }
        }
    }

    #[test]
    fn test_difficulty_clamped_at_bounds() {
        let s = compute_next_review(outcome(false, 5.0), 3, 1.0, now());
        assert_eq!(s.new_difficulty.value(), 5.0);
        let s = compute_next_review(outcome(false, 4.8), 3, 1.0, now());
        assert_eq!(s.new_difficulty.value(), 5.0);
        let s = compute_next_review(outcome(true, 1.0), 3, 1.0, now());
        assert_eq!(s.new_difficulty.value(), 1.0);
    }

    #[test]
    fn test_preference_multipliers() {
        assert_eq!(DifficultyPreference::Easy.multiplier(), 1.5);
        assert_eq!(DifficultyPreference::Medium.multiplier(), 1.0);
        assert_eq!(DifficultyPreference::Hard.multiplier(), 0.7);
        assert_eq!(DifficultyPreference::default(), DifficultyPreference::Medium);
    }
}

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

use std::collections::BTreeMap;

use chrono::Days;
use chrono::NaiveDate;
use serde::Serialize;

use crate::types::card::Card;
use crate::types::session_record::SessionKind;
use crate::types::session_record::SessionRecord;
use crate::types::timestamp::Timestamp;

/// How far back the streak is counted.
const STREAK_WINDOW_DAYS: u64 = 30;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub total_minutes: u64,
    pub cards_studied: u64,
    pub focus_sessions: u64,
    pub total_xp: u64,
}

/// Totals over the seven days ending `today`, by local date.
pub fn weekly_stats(sessions: &[SessionRecord], today: NaiveDate) -> WeeklyStats {
    let start = today - Days::new(6);
    let mut stats = WeeklyStats::default();
    for session in sessions {
        let date = session.created_at.local_date();
        if date < start || date > today {
            continue;
        }
        stats.total_minutes += u64::from(session.duration_minutes);
        stats.cards_studied += u64::from(session.cards_studied);
        stats.total_xp += session.xp_earned;
        if session.kind == SessionKind::Focus {
            stats.focus_sessions += 1;
        }
    }
    stats
}

/// Consecutive days with at least one session, counting back from `today`.
/// A day without sessions so far today does not break the streak.
pub fn study_streak(sessions: &[SessionRecord], today: NaiveDate) -> u32 {
    let studied = |date: NaiveDate| {
        sessions
            .iter()
            .any(|session| session.created_at.local_date() == date)
    };
    let mut streak = 0;
    for offset in 0..STREAK_WINDOW_DAYS {
        let date = today - Days::new(offset);
        if studied(date) {
            streak += 1;
        } else if offset > 0 {
            break;
        }
    }
    streak
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub minutes: u64,
}

/// Minutes studied on each of the seven days ending `today`, oldest first.
pub fn daily_minutes(sessions: &[SessionRecord], today: NaiveDate) -> Vec<DayActivity> {
    (0..7)
        .rev()
        .map(|offset| {
            let date = today - Days::new(offset);
            let minutes = sessions
                .iter()
                .filter(|session| session.created_at.local_date() == date)
                .map(|session| u64::from(session.duration_minutes))
                .sum();
            DayActivity { date, minutes }
        })
        .collect()
}

const FIRST_WEEK_STREAK: u32 = 7;

const CARD_MASTER_CARDS: u64 = 100;

const FOCUS_CHAMPION_SESSIONS: usize = 50;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct Achievement {
    pub name: &'static str,
    pub description: &'static str,
    pub earned: bool,
}

/// The fixed achievements, earned or not. Card and session counts are
/// all-time; the week is the current streak.
pub fn achievements(sessions: &[SessionRecord], today: NaiveDate) -> Vec<Achievement> {
    let streak = study_streak(sessions, today);
    let cards_studied: u64 = sessions
        .iter()
        .map(|session| u64::from(session.cards_studied))
        .sum();
    let focus_sessions = sessions
        .iter()
        .filter(|session| session.kind == SessionKind::Focus)
        .count();
    vec![
        Achievement {
            name: "Első hét",
            description: "Study 7 days in a row",
            earned: streak >= FIRST_WEEK_STREAK,
        },
        Achievement {
            name: "Kártya mester",
            description: "Study 100 cards",
            earned: cards_studied >= CARD_MASTER_CARDS,
        },
        Achievement {
            name: "Fókusz bajnok",
            description: "Complete 50 focus sessions",
            earned: focus_sessions >= FOCUS_CHAMPION_SESSIONS,
        },
    ]
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSummary {
    pub deck_name: String,
    pub card_count: u32,
    pub due_count: u32,
    pub mastered_count: u32,
}

impl DeckSummary {
    /// Share of mastered cards, rounded to a whole percent.
    pub fn mastery_percent(&self) -> u32 {
        if self.card_count == 0 {
            return 0;
        }
        let (mastered, total) = (u64::from(self.mastered_count), u64::from(self.card_count));
        // Round half up.
        ((mastered * 200 + total) / (2 * total)) as u32
    }
}

/// Card, due and mastered counts per deck, ordered by deck name.
pub fn deck_summaries(cards: &[Card], now: Timestamp) -> Vec<DeckSummary> {
    let mut decks: BTreeMap<&str, DeckSummary> = BTreeMap::new();
    for card in cards {
        let summary = decks
            .entry(card.deck_name.as_str())
            .or_insert_with(|| DeckSummary {
                deck_name: card.deck_name.clone(),
                card_count: 0,
                due_count: 0,
                mastered_count: 0,
            });
        summary.card_count += 1;
        if card.is_due(now) {
            summary.due_count += 1;
        }
        if card.review.is_mastered() {
            summary.mastered_count += 1;
        }
    }
    decks.into_values().collect()
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::types::card::ReviewState;
    use crate::types::card_id::CardId;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 20).unwrap()
    }

    fn session(days_ago: u64, kind: SessionKind, minutes: u32, xp: u64) -> SessionRecord {
        let date = today() - Days::new(days_ago);
        let local = Local
            .from_local_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
            .unwrap();
        SessionRecord {
            kind,
            duration_minutes: minutes,
            xp_earned: xp,
            cards_studied: 2,
            correct_cards: 2,
            focus_interrupted: false,
            created_at: Timestamp::new(local.with_timezone(&Utc)),
        }
    }

    #[test]
    fn test_weekly_stats() {
        let sessions = vec![
            session(0, SessionKind::Focus, 25, 50),
            session(3, SessionKind::Cards, 0, 10),
            session(6, SessionKind::Focus, 15, 30),
            session(7, SessionKind::Focus, 60, 120),
        ];
        let stats = weekly_stats(&sessions, today());
        assert_eq!(
            stats,
            WeeklyStats {
                total_minutes: 40,
                cards_studied: 6,
                focus_sessions: 2,
                total_xp: 90,
            }
        );
    }

    #[test]
    fn test_streak() {
        let sessions = vec![
            session(0, SessionKind::Focus, 25, 50),
            session(1, SessionKind::Cards, 0, 10),
            session(2, SessionKind::Cards, 0, 10),
            session(4, SessionKind::Cards, 0, 10),
        ];
        assert_eq!(study_streak(&sessions, today()), 3);
    }

    #[test]
    fn test_streak_tolerates_empty_today() {
        let sessions = vec![
            session(1, SessionKind::Cards, 0, 10),
            session(2, SessionKind::Cards, 0, 10),
        ];
        assert_eq!(study_streak(&sessions, today()), 2);
        assert_eq!(study_streak(&[], today()), 0);
    }

    #[test]
    fn test_daily_minutes() {
        let sessions = vec![
            session(0, SessionKind::Focus, 25, 50),
            session(0, SessionKind::Focus, 5, 10),
            session(6, SessionKind::Focus, 15, 30),
        ];
        let days = daily_minutes(&sessions, today());
        assert_eq!(days.len(), 7);
        assert_eq!(
            days[0],
            DayActivity {
                date: today() - Days::new(6),
                minutes: 15
            }
        );
        assert_eq!(
            days[6],
            DayActivity {
                date: today(),
                minutes: 30
            }
        );
        assert_eq!(days[3].minutes, 0);
    }

    fn earned(sessions: &[SessionRecord]) -> Vec<&'static str> {
        achievements(sessions, today())
            .into_iter()
            .filter(|achievement| achievement.earned)
            .map(|achievement| achievement.name)
            .collect()
    }

    #[test]
    fn test_first_week() {
        let week: Vec<SessionRecord> = (0..7)
            .map(|days_ago| session(days_ago, SessionKind::Cards, 0, 10))
            .collect();
        assert_eq!(earned(&week), vec!["Első hét"]);
        assert!(earned(&week[..6]).is_empty());
    }

    #[test]
    fn test_all_time_achievements() {
        // Old sessions count toward the totals.
        let mut sessions: Vec<SessionRecord> = (0..49)
            .map(|_| session(100, SessionKind::Focus, 25, 50))
            .collect();
        assert!(earned(&sessions).is_empty());
        sessions.push(session(200, SessionKind::Focus, 25, 50));
        let names = earned(&sessions);
        // 50 sessions of 2 cards each.
        assert_eq!(names, vec!["Kártya mester", "Fókusz bajnok"]);
        let three = achievements(&[], today());
        assert_eq!(three.len(), 3);
        assert!(three.iter().all(|achievement| !achievement.earned));
    }

    fn card(id: i64, deck: &str, correct: u32, incorrect: u32, due: Timestamp) -> Card {
        let mut review = ReviewState::new(due);
        review.correct_count = correct;
        review.incorrect_count = incorrect;
        Card {
            id: CardId::new(id),
            deck_name: deck.to_string(),
            question: format!("Question {id}"),
            answer: format!("Answer {id}"),
            review,
        }
    }

    #[test]
    fn test_deck_summaries() {
        let now = Timestamp::new(Utc.with_ymd_and_hms(2025, 8, 20, 12, 0, 0).unwrap());
        let later = now.plus_days(3);
        let cards = vec![
            card(1, "History", 2, 1, now),
            card(2, "Chemistry", 1, 1, later),
            card(3, "History", 0, 0, later),
            card(4, "History", 3, 0, now),
            card(5, "Chemistry", 4, 2, now),
        ];
        let decks = deck_summaries(&cards, now);
        assert_eq!(
            decks,
            vec![
                DeckSummary {
                    deck_name: "Chemistry".to_string(),
                    card_count: 2,
                    due_count: 1,
                    mastered_count: 1,
                },
                DeckSummary {
                    deck_name: "History".to_string(),
                    card_count: 3,
                    due_count: 2,
                    mastered_count: 2,
                },
            ]
        );
        assert_eq!(decks[0].mastery_percent(), 50);
        // 2/3 rounds to 67.
        assert_eq!(decks[1].mastery_percent(), 67);
        assert!(deck_summaries(&[], now).is_empty());
    }
}

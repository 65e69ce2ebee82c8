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

use std::cmp::Ordering;

use crate::types::card::Card;
use crate::types::timestamp::Timestamp;

/// Cap for a short, casual review session.
pub const SHORT_SESSION_CAP: usize = 12;

/// Cap for a dedicated deck-study session.
pub const DECK_SESSION_CAP: usize = 20;

/// Order cards so the most urgent come first.
///
/// Overdue cards come before cards not yet due. Overdue cards are ordered by
/// how many whole days they are overdue, most overdue first; the rest by
/// difficulty, hardest first. Remaining ties are broken by card ID, so the
/// result does not depend on the input order.
pub fn prioritize(mut cards: Vec<Card>, now: Timestamp) -> Vec<Card> {
    cards.sort_by(|a, b| compare_priority(a, b, now));
    cards
}

/// Build the card pool of a bounded session: the first `cap` cards by
/// priority.
pub fn select_session(cards: Vec<Card>, now: Timestamp, cap: usize) -> Vec<Card> {
    let mut cards = prioritize(cards, now);
    cards.truncate(cap);
    cards
}

fn compare_priority(a: &Card, b: &Card, now: Timestamp) -> Ordering {
    let a_overdue = a.is_due(now);
    let b_overdue = b.is_due(now);
    let by_key = match (a_overdue, b_overdue) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => days_overdue(b, now).cmp(&days_overdue(a, now)),
        (false, false) => b.review.difficulty.total_cmp(&a.review.difficulty),
    };
    by_key.then_with(|| a.id.cmp(&b.id))
}

fn days_overdue(card: &Card, now: Timestamp) -> i64 {
    now.whole_days_since(card.review.next_review)
}

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

use serde::Serialize;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::types::card::Card;
use crate::types::card_id::CardId;
use crate::types::difficulty::Difficulty;
use crate::types::session_record::SessionKind;
use crate::types::session_record::SessionRecord;
use crate::types::timestamp::Timestamp;

pub fn export_collection(directory: Option<String>) -> Fallible<()> {
    let coll: Collection = Collection::new(directory)?;
    let export: Export = get_export(&coll)?;
    let json: String = serde_json::to_string_pretty(&export)?;
    println!("{json}");
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Export {
    xp: u64,
    cards: Vec<CardExport>,
    sessions: Vec<SessionExport>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CardExport {
    id: CardId,
    deck_name: String,
    question: String,
    answer: String,
    review: ReviewExport,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewExport {
    difficulty: Difficulty,
    next_review: Timestamp,
    last_reviewed: Option<Timestamp>,
    correct_count: u32,
    incorrect_count: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionExport {
    kind: SessionKind,
    created_at: Timestamp,
    duration_minutes: u32,
    xp_earned: u64,
    cards_studied: u32,
    correct_cards: u32,
    focus_interrupted: bool,
}

fn get_export(coll: &Collection) -> Fallible<Export> {
    let xp = coll.db.xp(&coll.user_id)?;
    let cards: Vec<CardExport> = coll.db.cards(None)?.into_iter().map(card_export).collect();
    let sessions: Vec<SessionExport> = coll
        .db
        .sessions(&coll.user_id)?
        .into_iter()
        .map(session_export)
        .collect();
    Ok(Export {
        xp,
        cards,
        sessions,
    })
}

fn card_export(card: Card) -> CardExport {
    CardExport {
        id: card.id,
        deck_name: card.deck_name,
        question: card.question,
        answer: card.answer,
        review: ReviewExport {
            difficulty: card.review.difficulty,
            next_review: card.review.next_review,
            last_reviewed: card.review.last_reviewed,
            correct_count: card.review.correct_count,
            incorrect_count: card.review.incorrect_count,
        },
    }
}

fn session_export(record: SessionRecord) -> SessionExport {
    SessionExport {
        kind: record.kind,
        created_at: record.created_at,
        duration_minutes: record.duration_minutes,
        xp_earned: record.xp_earned,
        cards_studied: record.cards_studied,
        correct_cards: record.correct_cards,
        focus_interrupted: record.focus_interrupted,
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::db::ProgressStore;
    use crate::types::session_record::SessionOutcome;

    #[test]
    fn test_export() -> Fallible<()> {
        let dir = tempdir()?;
        let coll = Collection::new(Some(dir.path().display().to_string()))?;
        let now = Timestamp::now();
        coll.db.add_card("Chemistry", "Symbol for gold?", "Au", now)?;
        let outcome = SessionOutcome {
            kind: SessionKind::Focus,
            duration_minutes: 25,
            cards_studied: 3,
            correct_cards: 3,
            focus_interrupted: false,
        };
        coll.db
            .record_session(&coll.user_id, &SessionRecord::from_outcome(&outcome, now))?;
        coll.db.add_xp(&coll.user_id, 65)?;

        let json = serde_json::to_value(get_export(&coll)?)?;
        assert_eq!(json["xp"], 65);
        assert_eq!(json["cards"][0]["deckName"], "Chemistry");
        assert_eq!(json["cards"][0]["review"]["correctCount"], 0);
        assert_eq!(json["sessions"][0]["kind"], "focus");
        assert_eq!(json["sessions"][0]["xpEarned"], 65);
        Ok(())
    }
}

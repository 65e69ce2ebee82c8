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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;
use rusqlite::types::Type;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::card::Card;
use crate::types::card::ReviewState;
use crate::types::card_id::CardId;
use crate::types::session_record::SessionRecord;
use crate::types::timestamp::Timestamp;

/// The storage operations a completed session needs.
pub trait ProgressStore {
    /// Store a completed session.
    fn record_session(&self, user_id: &str, record: &SessionRecord) -> Fallible<()>;

    /// Atomically add `delta` to the user's XP total, returning the new
    /// total. Implementations must not read the total and write it back.
    fn add_xp(&self, user_id: &str, delta: u64) -> Fallible<u64>;
}

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

const CARD_COLUMNS: &str = "card_id, deck_name, question, answer, difficulty, next_review, last_reviewed, correct_count, incorrect_count";

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !schema_exists(&tx)? {
                log::debug!("Creating database schema.");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// Create the user if they don't exist yet, with no XP.
    pub fn ensure_user(&self, user_id: &str) -> Fallible<()> {
        let conn = self.acquire()?;
        conn.execute(
            "insert into users (user_id) values (?) on conflict (user_id) do nothing;",
            [user_id],
        )?;
        Ok(())
    }

    /// Add a new card, due immediately.
    pub fn add_card(
        &self,
        deck_name: &str,
        question: &str,
        answer: &str,
        created_at: Timestamp,
    ) -> Fallible<Card> {
        let review = ReviewState::new(created_at);
        let conn = self.acquire()?;
        let sql = "insert into cards (deck_name, question, answer, difficulty, next_review, created_at) values (?, ?, ?, ?, ?, ?) returning card_id;";
        let id: CardId = conn.query_row(
            sql,
            (
                deck_name,
                question,
                answer,
                review.difficulty,
                review.next_review,
                created_at,
            ),
            |row| row.get(0),
        )?;
        log::debug!("Added card {id} to deck {deck_name}.");
        Ok(Card {
            id,
            deck_name: deck_name.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            review,
        })
    }

    pub fn get_card(&self, id: CardId) -> Fallible<Card> {
        let conn = self.acquire()?;
        let sql = format!("select {CARD_COLUMNS} from cards where card_id = ?;");
        let card = conn.query_row(&sql, [id], read_card).optional()?;
        match card {
            Some(card) => Ok(card),
            None => fail(format!("no card with ID {id}.")),
        }
    }

    /// All cards, optionally restricted to one deck.
    pub fn cards(&self, deck_name: Option<&str>) -> Fallible<Vec<Card>> {
        let conn = self.acquire()?;
        let sql = format!(
            "select {CARD_COLUMNS} from cards where (?1 is null or deck_name = ?1) order by card_id;"
        );
        let mut stmt = conn.prepare(&sql)?;
        let cards = stmt
            .query_map([deck_name], read_card)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    }

    /// Cards due at `now`, optionally restricted to one deck.
    pub fn due_cards(&self, now: Timestamp, deck_name: Option<&str>) -> Fallible<Vec<Card>> {
        let conn = self.acquire()?;
        let sql = format!(
            "select {CARD_COLUMNS} from cards where next_review <= ?1 and (?2 is null or deck_name = ?2) order by card_id;"
        );
        let mut stmt = conn.prepare(&sql)?;
        let cards = stmt
            .query_map((now, deck_name), read_card)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    }

    /// Write back a card's review state.
    pub fn update_card(&self, card: &Card) -> Fallible<()> {
        let conn = self.acquire()?;
        let sql = "update cards set difficulty = ?, next_review = ?, last_reviewed = ?, correct_count = ?, incorrect_count = ? where card_id = ?;";
        let review = &card.review;
        let changed = conn.execute(
            sql,
            (
                review.difficulty,
                review.next_review,
                review.last_reviewed,
                review.correct_count,
                review.incorrect_count,
                card.id,
            ),
        )?;
        if changed == 0 {
            return fail(format!("no card with ID {}.", card.id));
        }
        Ok(())
    }

    /// Replace a card's question and answer. Its review state is kept.
    pub fn edit_card(&self, id: CardId, question: &str, answer: &str) -> Fallible<()> {
        let conn = self.acquire()?;
        let sql = "update cards set question = ?, answer = ? where card_id = ?;";
        let changed = conn.execute(sql, (question, answer, id))?;
        if changed == 0 {
            return fail(format!("no card with ID {id}."));
        }
        log::debug!("Edited card {id}.");
        Ok(())
    }

    pub fn delete_card(&self, id: CardId) -> Fallible<()> {
        let conn = self.acquire()?;
        let changed = conn.execute("delete from cards where card_id = ?;", [id])?;
        if changed == 0 {
            return fail(format!("no card with ID {id}."));
        }
        log::debug!("Deleted card {id}.");
        Ok(())
    }

    /// Delete every card in the deck. Returns how many were deleted.
    pub fn delete_deck(&self, deck_name: &str) -> Fallible<usize> {
        let conn = self.acquire()?;
        let deleted = conn.execute("delete from cards where deck_name = ?;", [deck_name])?;
        log::debug!("Deleted {deleted} cards from deck {deck_name}.");
        Ok(deleted)
    }

    pub fn xp(&self, user_id: &str) -> Fallible<u64> {
        let conn = self.acquire()?;
        let xp: Option<u64> = conn
            .query_row("select xp from users where user_id = ?;", [user_id], |row| {
                read_xp(row, 0)
            })
            .optional()?;
        xp.ok_or_else(|| ErrorReport::new(format!("no user {user_id}.")))
    }

    /// The user's sessions, most recent first.
    pub fn sessions(&self, user_id: &str) -> Fallible<Vec<SessionRecord>> {
        let conn = self.acquire()?;
        let sql = "select kind, duration, xp_earned, cards_studied, correct_cards, focus_interrupted, created_at from sessions where user_id = ? order by created_at desc, session_id desc;";
        let mut stmt = conn.prepare(sql)?;
        let sessions = stmt
            .query_map([user_id], |row| {
                Ok(SessionRecord {
                    kind: row.get(0)?,
                    duration_minutes: row.get(1)?,
                    xp_earned: read_xp(row, 2)?,
                    cards_studied: row.get(3)?,
                    correct_cards: row.get(4)?,
                    focus_interrupted: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sessions)
    }

    fn acquire(&self) -> Fallible<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ErrorReport::new("database connection lock poisoned."))
    }
}

impl ProgressStore for Database {
    fn record_session(&self, user_id: &str, record: &SessionRecord) -> Fallible<()> {
        let conn = self.acquire()?;
        let sql = "insert into sessions (user_id, kind, duration, xp_earned, cards_studied, correct_cards, focus_interrupted, created_at) values (?, ?, ?, ?, ?, ?, ?, ?);";
        conn.execute(
            sql,
            (
                user_id,
                record.kind,
                record.duration_minutes,
                xp_to_sql(record.xp_earned)?,
                record.cards_studied,
                record.correct_cards,
                record.focus_interrupted,
                record.created_at,
            ),
        )?;
        Ok(())
    }

    fn add_xp(&self, user_id: &str, delta: u64) -> Fallible<u64> {
        let conn = self.acquire()?;
        let sql = "update users set xp = xp + ?1 where user_id = ?2 returning xp;";
        let total: Option<u64> = conn
            .query_row(sql, (xp_to_sql(delta)?, user_id), |row| read_xp(row, 0))
            .optional()?;
        match total {
            Some(total) => {
                log::debug!("Added {delta} XP to {user_id}, total {total}.");
                Ok(total)
            }
            None => fail(format!("no user {user_id}.")),
        }
    }
}

/// SQLite integers are signed; XP is stored as `i64` and never negative.
fn xp_to_sql(xp: u64) -> Fallible<i64> {
    i64::try_from(xp)
        .map_err(|_| ErrorReport::new(format!("XP value {xp} is too large to store.")))
}

fn read_xp(row: &Row<'_>, index: usize) -> rusqlite::Result<u64> {
    let xp: i64 = row.get(index)?;
    u64::try_from(xp)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(e)))
}

fn read_card(row: &Row<'_>) -> rusqlite::Result<Card> {
    Ok(Card {
        id: row.get(0)?,
        deck_name: row.get(1)?,
        question: row.get(2)?,
        answer: row.get(3)?,
        review: ReviewState {
            difficulty: row.get(4)?,
            next_review: row.get(5)?,
            last_reviewed: row.get(6)?,
            correct_count: row.get(7)?,
            incorrect_count: row.get(8)?,
        },
    })
}

fn schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["cards"], |row| row.get(0))?;
    Ok(count > 0)
}

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

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;
use crate::types::timestamp::Timestamp;
use crate::xp::calculate_xp;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// A timed focus block.
    Focus,
    /// A batch of card reviews.
    Cards,
}

impl SessionKind {
    pub fn as_str(&self) -> &str {
        match self {
            SessionKind::Focus => "focus",
            SessionKind::Cards => "cards",
        }
    }
}

impl TryFrom<String> for SessionKind {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "focus" => Ok(SessionKind::Focus),
            "cards" => Ok(SessionKind::Cards),
            _ => fail(format!("Invalid session kind: {}", value)),
        }
    }
}

impl ToSql for SessionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for SessionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        SessionKind::try_from(string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// What a completed session achieved, before it is scored.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOutcome {
    pub kind: SessionKind,
    pub duration_minutes: u32,
    pub cards_studied: u32,
    pub correct_cards: u32,
    pub focus_interrupted: bool,
}

impl SessionOutcome {
    /// The session's XP award. Only focus sessions earn XP for time.
    pub fn xp(&self) -> u64 {
        let focus_minutes = match self.kind {
            SessionKind::Focus => self.duration_minutes,
            SessionKind::Cards => 0,
        };
        calculate_xp(focus_minutes, self.correct_cards, self.focus_interrupted)
    }
}

/// A session as stored.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub kind: SessionKind,
    pub duration_minutes: u32,
    pub xp_earned: u64,
    pub cards_studied: u32,
    pub correct_cards: u32,
    pub focus_interrupted: bool,
    pub created_at: Timestamp,
}

impl SessionRecord {
    pub fn from_outcome(outcome: &SessionOutcome, created_at: Timestamp) -> Self {
        Self {
            kind: outcome.kind,
            duration_minutes: outcome.duration_minutes,
            xp_earned: outcome.xp(),
            cards_studied: outcome.cards_studied,
            correct_cards: outcome.correct_cards,
            focus_interrupted: outcome.focus_interrupted,
            created_at,
        }
    }
}

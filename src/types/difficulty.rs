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
use std::fmt::Display;
use std::fmt::Formatter;

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;

pub const MIN_DIFFICULTY: f64 = 1.0;

pub const MAX_DIFFICULTY: f64 = 5.0;

/// A card's difficulty, on a scale from 1 (easiest) to 5 (hardest).
///
/// Every constructor clamps, so a value outside the scale cannot exist.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Difficulty(f64);

impl Difficulty {
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(MIN_DIFFICULTY);
        }
        Self(value.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY))
    }

    pub fn easiest() -> Self {
        Self(MIN_DIFFICULTY)
    }

    pub fn hardest() -> Self {
        Self(MAX_DIFFICULTY)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn eased(self, step: f64) -> Self {
        Self::new(self.0 - step)
    }

    pub fn hardened(self, step: f64) -> Self {
        Self::new(self.0 + step)
    }

    /// Total order over difficulties. Values are never NaN, so this agrees
    /// with the numeric order.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::easiest()
    }
}

impl From<f64> for Difficulty {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Difficulty> for f64 {
    fn from(value: Difficulty) -> Self {
        value.0
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

impl ToSql for Difficulty {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for Difficulty {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let value: f64 = FromSql::column_result(value)?;
        Ok(Difficulty::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_on_construction() {
        assert_eq!(Difficulty::new(0.2).value(), 1.0);
        assert_eq!(Difficulty::new(7.0).value(), 5.0);
        assert_eq!(Difficulty::new(f64::NAN).value(), 1.0);
        assert_eq!(Difficulty::new(3.3).value(), 3.3);
    }

    #[test]
    fn test_steps_stay_in_range() {
        assert_eq!(Difficulty::easiest().eased(0.1), Difficulty::easiest());
        assert_eq!(Difficulty::hardest().hardened(0.5), Difficulty::hardest());
        assert_eq!(Difficulty::easiest().hardened(0.5).value(), 1.5);
    }

    #[test]
    fn test_deserialize_clamps() -> Result<(), serde_json::Error> {
        let d: Difficulty = serde_json::from_str("9.5")?;
        assert_eq!(d, Difficulty::hardest());
        Ok(())
    }
}
